//! Fixtures shared by unit tests across modules.

use crate::content::{
    Comparison, ComparisonGroup, ContentData, ContentEntry, Item, Section, Table,
};
use crate::error::StoreError;
use crate::model::{Answer, Category, Difficulty, Question, QuestionType};
use crate::storage::KeyValueStore;

/// A store where every operation fails.
pub struct FailingStore;

impl KeyValueStore for FailingStore {
    fn get(&self, _: &str) -> Result<Option<String>, StoreError> {
        Err(StoreError::Unavailable("offline".into()))
    }
    fn set(&self, _: &str, _: &str) -> Result<(), StoreError> {
        Err(StoreError::Unavailable("offline".into()))
    }
    fn remove(&self, _: &str) -> Result<(), StoreError> {
        Err(StoreError::Unavailable("offline".into()))
    }
}

/// A multiple-choice question whose correct answer is `"a"`.
pub fn question(id: &str, category: Category, topic: &str) -> Question {
    Question {
        id: id.into(),
        question_type: QuestionType::MultipleChoice,
        difficulty: Difficulty::Beginner,
        category,
        topic: topic.into(),
        question_text: format!("Question {id}?"),
        options: vec!["a".into(), "b".into(), "c".into(), "d".into()],
        correct_answer: Answer::Single("a".into()),
        explanation: None,
        source_ref: None,
        matching_pairs: vec![],
    }
}

pub fn questions(n: usize, category: Category) -> Vec<Question> {
    (0..n)
        .map(|i| question(&format!("q{i}"), category, &format!("Topic {i}")))
        .collect()
}

fn strings(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}

/// A fundamentals entry with a table, valued items, an example list, and a
/// three-group comparison.
pub fn sample_entry() -> ContentEntry {
    ContentEntry {
        id: "hardness".into(),
        data: ContentData {
            title: "Hardness".into(),
            description: "Resistance to scratching".into(),
            category: Category::Fundamentals,
            difficulty: Some(Difficulty::Beginner),
            sections: vec![
                Section {
                    title: "Mohs scale".into(),
                    table: Some(Table {
                        headers: strings(&["Gem", "Hardness", "Luster"]),
                        rows: vec![
                            strings(&["Diamond", "10", "Adamantine"]),
                            strings(&["Corundum", "9.0", "Sub-adamantine"]),
                            strings(&["Topaz", "8.0", "Vitreous"]),
                            strings(&["Quartz", "7.0", "Greasy"]),
                        ],
                    }),
                    ..Default::default()
                },
                Section {
                    title: "Reference minerals".into(),
                    items: vec![
                        Item {
                            name: "Diamond hardness".into(),
                            value: Some("10".into()),
                            ..Default::default()
                        },
                        Item {
                            name: "Quartz hardness".into(),
                            value: Some("7".into()),
                            description: Some("Quartz scratches glass".into()),
                            ..Default::default()
                        },
                        Item {
                            name: "corundum gem".into(),
                            examples: strings(&["Ruby", "Sapphire", "Padparadscha"]),
                            ..Default::default()
                        },
                    ],
                    subsections: vec![Section {
                        title: "Toughness versus hardness".into(),
                        comparison: Some(Comparison {
                            groups: vec![
                                ComparisonGroup {
                                    title: "Hardness".into(),
                                    points: strings(&["Resists scratching"]),
                                },
                                ComparisonGroup {
                                    title: "Toughness".into(),
                                    points: strings(&["Resists breaking"]),
                                },
                                ComparisonGroup {
                                    title: "Stability".into(),
                                    points: strings(&["Resists chemical change"]),
                                },
                            ],
                        }),
                        ..Default::default()
                    }],
                    ..Default::default()
                },
            ],
        },
    }
}
