use serde::{Deserialize, Deserializer, Serialize};
use sqlx::FromRow;

use crate::models::list::DEFAULT_LIST_ID;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Task {
    pub id: String,
    pub title: String,
    pub completed: bool,
    pub important: bool,
    pub my_day: bool,
    pub list: String,
    pub date: Option<String>,
    pub time: Option<String>,
    pub user_id: String,
    pub created_at: String,
    pub updated_at: String,
}

impl Task {
    /// A task counts as planned once it carries a non-empty date.
    pub fn is_planned(&self) -> bool {
        self.date.as_deref().is_some_and(|d| !d.is_empty())
    }
}

/// Fully resolved fields for a task that has not been stored yet.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewTask {
    pub title: String,
    pub completed: bool,
    pub important: bool,
    pub my_day: bool,
    pub list: String,
    pub date: Option<String>,
    pub time: Option<String>,
    pub user_id: String,
}

impl NewTask {
    pub fn new(user_id: impl Into<String>, title: &str) -> Self {
        Self {
            title: title.trim().to_string(),
            completed: false,
            important: false,
            my_day: false,
            list: DEFAULT_LIST_ID.to_string(),
            date: None,
            time: None,
            user_id: user_id.into(),
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewTaskRequest {
    pub title: Option<String>,
    pub completed: Option<bool>,
    pub important: Option<bool>,
    pub my_day: Option<bool>,
    pub list: Option<String>,
    pub date: Option<String>,
    pub time: Option<String>,
}

impl NewTaskRequest {
    /// Applies defaults and trims the title. Returns `None` when the title is
    /// missing or blank.
    pub fn into_new_task(self, user_id: &str) -> Option<NewTask> {
        let title = self.title.as_deref().map(str::trim).unwrap_or_default();
        if title.is_empty() {
            return None;
        }

        Some(NewTask {
            title: title.to_string(),
            completed: self.completed.unwrap_or(false),
            important: self.important.unwrap_or(false),
            my_day: self.my_day.unwrap_or(false),
            list: self
                .list
                .filter(|l| !l.is_empty())
                .unwrap_or_else(|| DEFAULT_LIST_ID.to_string()),
            date: non_empty(self.date),
            time: non_empty(self.time),
            user_id: user_id.to_string(),
        })
    }
}

/// Partial update. `date`/`time` distinguish "absent" (`None`) from an
/// explicit `null` (`Some(None)`), which clears the field.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskPatch {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub completed: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub important: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub my_day: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub list: Option<String>,
    #[serde(default, deserialize_with = "nullable", skip_serializing_if = "Option::is_none")]
    pub date: Option<Option<String>>,
    #[serde(default, deserialize_with = "nullable", skip_serializing_if = "Option::is_none")]
    pub time: Option<Option<String>>,
}

impl TaskPatch {
    pub fn title(title: &str) -> Self {
        Self {
            title: Some(title.trim().to_string()),
            ..Self::default()
        }
    }

    pub fn completed(completed: bool) -> Self {
        Self {
            completed: Some(completed),
            ..Self::default()
        }
    }

    pub fn important(important: bool) -> Self {
        Self {
            important: Some(important),
            ..Self::default()
        }
    }

    /// True when the patch would set a blank title.
    pub fn has_blank_title(&self) -> bool {
        self.title.as_deref().is_some_and(|t| t.trim().is_empty())
    }

    pub fn trimmed_title(&self) -> Option<&str> {
        self.title.as_deref().map(str::trim)
    }

    /// The list to move the task to. An empty id means the default list.
    pub fn list_id(&self) -> Option<&str> {
        self.list
            .as_deref()
            .map(|l| if l.is_empty() { DEFAULT_LIST_ID } else { l })
    }

    /// `Some(None)` clears the date; blank dates count as a clear.
    pub fn date_value(&self) -> Option<Option<String>> {
        self.date.clone().map(non_empty)
    }

    pub fn time_value(&self) -> Option<Option<String>> {
        self.time.clone().map(non_empty)
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

fn nullable<'de, D, T>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}
