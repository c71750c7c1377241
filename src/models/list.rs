use serde::{Deserialize, Serialize};

pub const DEFAULT_LIST_ID: &str = "personal";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ListColor {
    Red,
    Blue,
    Green,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskList {
    pub id: String,
    pub name: String,
    pub color: ListColor,
}

impl TaskList {
    /// The built-in list every task falls back to.
    pub fn personal() -> Self {
        Self {
            id: DEFAULT_LIST_ID.to_string(),
            name: "Personal".to_string(),
            color: ListColor::Red,
        }
    }
}
