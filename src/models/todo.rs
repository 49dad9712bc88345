use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use sqlx::FromRow;

pub const NAME_MAX_CHARS: usize = 100;
pub const DETAIL_MAX_CHARS: usize = 500;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "snake_case")]
#[sqlx(rename_all = "snake_case")]
pub enum ProgressStatus {
    #[default]
    NotStarted,
    InProgress,
    Completed,
}

impl ProgressStatus {
    pub fn is_completed(self) -> bool {
        self == ProgressStatus::Completed
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "snake_case")]
#[sqlx(rename_all = "snake_case")]
pub enum RecurrenceType {
    #[default]
    None,
    Daily,
    Weekly,
    Monthly,
}

impl RecurrenceType {
    pub fn is_recurring(self) -> bool {
        self != RecurrenceType::None
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Todo {
    pub id: i64,
    #[serde(rename = "owner")]
    pub owner_id: i64,
    pub name: String,
    pub detail: String,
    pub due_date: Option<NaiveDate>,
    pub progress_status: ProgressStatus,
    pub recurrence_type: RecurrenceType,
    pub parent_id: Option<i64>,
    pub previous_todo_id: Option<i64>,
    pub created_at: DateTime<Utc>,
}

/// A task record that has not been persisted yet; `id` and `created_at`
/// are assigned on insert.
#[derive(Debug, Clone, PartialEq)]
pub struct NewTodo {
    pub owner_id: i64,
    pub name: String,
    pub detail: String,
    pub due_date: Option<NaiveDate>,
    pub progress_status: ProgressStatus,
    pub recurrence_type: RecurrenceType,
    pub parent_id: Option<i64>,
    pub previous_todo_id: Option<i64>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct NewTodoRequest {
    pub name: String,
    #[serde(default)]
    pub detail: Option<String>,
    #[serde(default)]
    pub due_date: Option<NaiveDate>,
    #[serde(default)]
    pub progress_status: ProgressStatus,
    #[serde(default)]
    pub recurrence_type: RecurrenceType,
    #[serde(default)]
    pub parent_id: Option<i64>,
}

/// Partial update payload.
///
/// `None` means the field was absent and stays unchanged. Nullable fields
/// carry a second `Option` so that an explicit `null` (clear the value) is
/// distinguishable from absence; non-nullable fields reject `null` while
/// deserializing.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct UpdateTodoRequest {
    #[serde(default, deserialize_with = "non_null")]
    pub name: Option<String>,
    #[serde(default, deserialize_with = "non_null")]
    pub detail: Option<String>,
    #[serde(default, deserialize_with = "nullable")]
    pub due_date: Option<Option<NaiveDate>>,
    #[serde(default, deserialize_with = "non_null")]
    pub progress_status: Option<ProgressStatus>,
    #[serde(default, deserialize_with = "non_null")]
    pub recurrence_type: Option<RecurrenceType>,
    #[serde(default, deserialize_with = "nullable")]
    pub parent_id: Option<Option<i64>>,
}

/// Full replacement: every field becomes present, omitted ones take their
/// creation defaults.
impl From<NewTodoRequest> for UpdateTodoRequest {
    fn from(req: NewTodoRequest) -> Self {
        Self {
            name: Some(req.name),
            detail: Some(req.detail.unwrap_or_default()),
            due_date: Some(req.due_date),
            progress_status: Some(req.progress_status),
            recurrence_type: Some(req.recurrence_type),
            parent_id: Some(req.parent_id),
        }
    }
}

fn non_null<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    T::deserialize(deserializer).map(Some)
}

fn nullable<'de, D, T>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StatusFilter {
    #[default]
    All,
    NotStarted,
    InProgress,
    Completed,
    Incomplete,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DueDateFilter {
    #[default]
    All,
    Today,
    ThisWeek,
    Overdue,
    #[serde(rename = "none")]
    NoDueDate,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct TodoFilter {
    pub keyword: Option<String>,
    #[serde(default)]
    pub progress_status: StatusFilter,
    #[serde(default)]
    pub due_date: DueDateFilter,
}
