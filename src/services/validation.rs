//! Business rules checked before any todo is built or mutated.
//!
//! Every check runs against the same transaction the write will use, so a
//! rule that passes here is evaluated against the state the write sees.

use chrono::NaiveDate;

use crate::db::TodoRepository;
use crate::error::AppError;
use crate::models::todo::{DETAIL_MAX_CHARS, NAME_MAX_CHARS};
use crate::models::{NewTodoRequest, RecurrenceType, Todo, UpdateTodoRequest};

/// Trims `name` and checks it is non-blank and within the length limit.
pub fn normalize_name(name: &str) -> Result<String, AppError> {
    let trimmed = name.trim();
    if trimmed.is_empty() {
        return Err(AppError::validation("name", "must not be blank"));
    }
    if trimmed.chars().count() > NAME_MAX_CHARS {
        return Err(AppError::validation(
            "name",
            format!("must be at most {} characters", NAME_MAX_CHARS),
        ));
    }
    Ok(trimmed.to_string())
}

pub fn validate_detail(detail: &str) -> Result<(), AppError> {
    if detail.chars().count() > DETAIL_MAX_CHARS {
        return Err(AppError::validation(
            "detail",
            format!("must be at most {} characters", DETAIL_MAX_CHARS),
        ));
    }
    Ok(())
}

/// Fails when the owner already has another incomplete todo named `name`.
/// The match is exact and case-sensitive.
pub async fn ensure_name_unique(
    repo: &mut TodoRepository,
    owner_id: i64,
    name: &str,
    exclude_id: Option<i64>,
) -> Result<(), AppError> {
    if repo.exists_by_owner_and_name(owner_id, name, exclude_id).await? {
        return Err(AppError::Duplicate { field: "name" });
    }
    Ok(())
}

/// A recurring todo needs a due date to recur from.
pub fn validate_recurrence_due_date(
    due_date: Option<NaiveDate>,
    recurrence_type: RecurrenceType,
) -> Result<(), AppError> {
    if recurrence_type.is_recurring() && due_date.is_none() {
        return Err(AppError::RequiredField { field: "due_date" });
    }
    Ok(())
}

/// Resolves the prospective parent. Subtasks cannot themselves be parents.
pub async fn validate_parent(
    repo: &mut TodoRepository,
    owner_id: i64,
    parent_id: Option<i64>,
) -> Result<Option<Todo>, AppError> {
    let Some(parent_id) = parent_id else {
        return Ok(None);
    };

    let parent = repo
        .find_by_id_and_owner(parent_id, owner_id)
        .await?
        .ok_or(AppError::NotFound)?;

    if parent.parent_id.is_some() {
        return Err(AppError::Conflict(
            "A subtask cannot have subtasks".to_string(),
        ));
    }
    Ok(Some(parent))
}

pub async fn validate_create(
    repo: &mut TodoRepository,
    owner_id: i64,
    req: &NewTodoRequest,
) -> Result<(), AppError> {
    let name = normalize_name(&req.name)?;
    if let Some(detail) = &req.detail {
        validate_detail(detail)?;
    }

    if !req.progress_status.is_completed() {
        ensure_name_unique(repo, owner_id, &name, None).await?;
    }
    validate_recurrence_due_date(req.due_date, req.recurrence_type)?;
    validate_parent(repo, owner_id, req.parent_id).await?;
    Ok(())
}

/// Checks an update against the values the todo will hold afterwards: any
/// field absent from `req` keeps its stored value.
pub async fn validate_update(
    repo: &mut TodoRepository,
    todo: &Todo,
    req: &UpdateTodoRequest,
) -> Result<(), AppError> {
    let name = match &req.name {
        Some(name) => normalize_name(name)?,
        None => todo.name.clone(),
    };
    if let Some(detail) = &req.detail {
        validate_detail(detail)?;
    }

    if req.name.is_some() || req.progress_status.is_some() {
        let status = req.progress_status.unwrap_or(todo.progress_status);
        if !status.is_completed() {
            ensure_name_unique(repo, todo.owner_id, &name, Some(todo.id)).await?;
        }
    }

    if req.due_date.is_some() || req.recurrence_type.is_some() {
        let due_date = req.due_date.unwrap_or(todo.due_date);
        let recurrence_type = req.recurrence_type.unwrap_or(todo.recurrence_type);
        validate_recurrence_due_date(due_date, recurrence_type)?;
    }

    if let Some(Some(parent_id)) = req.parent_id {
        if parent_id == todo.id {
            return Err(AppError::Conflict(
                "A task cannot be its own parent".to_string(),
            ));
        }
        validate_parent(repo, todo.owner_id, Some(parent_id)).await?;
        if repo.has_subtasks(todo.id).await? {
            return Err(AppError::Conflict(
                "A task with subtasks cannot become a subtask".to_string(),
            ));
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[rstest]
    #[case(RecurrenceType::Daily)]
    #[case(RecurrenceType::Weekly)]
    #[case(RecurrenceType::Monthly)]
    fn test_recurring_without_due_date_is_required_field(#[case] recurrence: RecurrenceType) {
        let err = validate_recurrence_due_date(None, recurrence).unwrap_err();
        assert!(matches!(err, AppError::RequiredField { field: "due_date" }));
        assert!(validate_recurrence_due_date(Some(date(2024, 1, 1)), recurrence).is_ok());
    }

    #[test]
    fn test_non_recurring_needs_no_due_date() {
        assert!(validate_recurrence_due_date(None, RecurrenceType::None).is_ok());
    }

    #[rstest]
    #[case("  Buy milk  ", "Buy milk")]
    #[case("宿題", "宿題")]
    fn test_normalize_name_trims(#[case] input: &str, #[case] expected: &str) {
        assert_eq!(normalize_name(input).unwrap(), expected);
    }

    #[rstest]
    #[case("")]
    #[case("   ")]
    fn test_blank_name_is_rejected(#[case] input: &str) {
        let err = normalize_name(input).unwrap_err();
        assert!(matches!(err, AppError::Validation { field: "name", .. }));
    }

    #[test]
    fn test_name_length_counts_characters() {
        assert!(normalize_name(&"あ".repeat(100)).is_ok());
        assert!(normalize_name(&"a".repeat(101)).is_err());
    }

    #[test]
    fn test_detail_length_limit() {
        assert!(validate_detail(&"x".repeat(500)).is_ok());
        let err = validate_detail(&"x".repeat(501)).unwrap_err();
        assert!(matches!(err, AppError::Validation { field: "detail", .. }));
    }
}
