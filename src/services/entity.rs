use crate::models::{NewTodo, NewTodoRequest, Todo, UpdateTodoRequest};

/// Builds an unsaved todo from a validated create payload.
pub fn build(req: NewTodoRequest, owner_id: i64) -> NewTodo {
    NewTodo {
        owner_id,
        name: req.name.trim().to_string(),
        detail: req.detail.unwrap_or_default(),
        due_date: req.due_date,
        progress_status: req.progress_status,
        recurrence_type: req.recurrence_type,
        parent_id: req.parent_id,
        previous_todo_id: None,
    }
}

/// Writes only the fields present in `req` onto `todo`.
pub fn apply(todo: &mut Todo, req: UpdateTodoRequest) {
    if let Some(name) = req.name {
        todo.name = name.trim().to_string();
    }
    if let Some(detail) = req.detail {
        todo.detail = detail;
    }
    if let Some(due_date) = req.due_date {
        todo.due_date = due_date;
    }
    if let Some(progress_status) = req.progress_status {
        todo.progress_status = progress_status;
    }
    if let Some(recurrence_type) = req.recurrence_type {
        todo.recurrence_type = recurrence_type;
    }
    if let Some(parent_id) = req.parent_id {
        todo.parent_id = parent_id;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{ProgressStatus, RecurrenceType};
    use chrono::{NaiveDate, Utc};

    fn stored() -> Todo {
        Todo {
            id: 7,
            owner_id: 42,
            name: "Buy milk".to_string(),
            detail: "2 litres".to_string(),
            due_date: NaiveDate::from_ymd_opt(2024, 1, 1),
            progress_status: ProgressStatus::NotStarted,
            recurrence_type: RecurrenceType::Weekly,
            parent_id: None,
            previous_todo_id: None,
            created_at: Utc::now(),
        }
    }

    #[test]
    fn test_build_applies_defaults() {
        let req = NewTodoRequest {
            name: " Buy milk ".to_string(),
            detail: None,
            due_date: None,
            progress_status: ProgressStatus::default(),
            recurrence_type: RecurrenceType::default(),
            parent_id: None,
        };
        let todo = build(req, 42);
        assert_eq!(todo.owner_id, 42);
        assert_eq!(todo.name, "Buy milk");
        assert_eq!(todo.detail, "");
        assert_eq!(todo.progress_status, ProgressStatus::NotStarted);
        assert_eq!(todo.recurrence_type, RecurrenceType::None);
        assert_eq!(todo.previous_todo_id, None);
    }

    #[test]
    fn test_apply_leaves_absent_fields_untouched() {
        let mut todo = stored();
        let before = todo.clone();
        apply(
            &mut todo,
            UpdateTodoRequest {
                name: Some("Buy oat milk".to_string()),
                ..Default::default()
            },
        );
        assert_eq!(todo.name, "Buy oat milk");
        assert_eq!(todo.detail, before.detail);
        assert_eq!(todo.due_date, before.due_date);
        assert_eq!(todo.recurrence_type, before.recurrence_type);
        assert_eq!(todo.progress_status, before.progress_status);
    }

    #[test]
    fn test_apply_explicit_null_clears_due_date() {
        let mut todo = stored();
        todo.recurrence_type = RecurrenceType::None;
        apply(
            &mut todo,
            UpdateTodoRequest {
                due_date: Some(None),
                ..Default::default()
            },
        );
        assert_eq!(todo.due_date, None);
    }

    #[test]
    fn test_apply_never_touches_identity() {
        let mut todo = stored();
        let before = todo.clone();
        apply(
            &mut todo,
            UpdateTodoRequest {
                progress_status: Some(ProgressStatus::Completed),
                parent_id: Some(Some(3)),
                ..Default::default()
            },
        );
        assert_eq!(todo.id, before.id);
        assert_eq!(todo.owner_id, before.owner_id);
        assert_eq!(todo.created_at, before.created_at);
        assert_eq!(todo.parent_id, Some(3));
        assert_eq!(todo.progress_status, ProgressStatus::Completed);
    }
}
