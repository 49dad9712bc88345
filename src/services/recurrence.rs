use chrono::{Days, Months, NaiveDate};

use crate::models::{RecurrenceType, Todo};

/// True when this update moved a recurring, dated todo into `completed`.
pub fn is_completion_transition(todo: &Todo, was_completed_before_update: bool) -> bool {
    !was_completed_before_update
        && todo.progress_status.is_completed()
        && todo.recurrence_type.is_recurring()
        && todo.due_date.is_some()
}

/// Next occurrence counted from `base_date`. Monthly steps clamp to the last
/// day of a shorter target month.
pub fn next_due_date(recurrence_type: RecurrenceType, base_date: NaiveDate) -> NaiveDate {
    match recurrence_type {
        RecurrenceType::Daily => base_date + Days::new(1),
        RecurrenceType::Weekly => base_date + Days::new(7),
        RecurrenceType::Monthly => base_date + Months::new(1),
        RecurrenceType::None => base_date,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::ProgressStatus;
    use chrono::Utc;
    use rstest::rstest;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[rstest]
    #[case(RecurrenceType::Monthly, date(2024, 1, 31), date(2024, 2, 29))]
    #[case(RecurrenceType::Monthly, date(2023, 1, 31), date(2023, 2, 28))]
    #[case(RecurrenceType::Monthly, date(2024, 3, 31), date(2024, 4, 30))]
    #[case(RecurrenceType::Monthly, date(2024, 12, 15), date(2025, 1, 15))]
    #[case(RecurrenceType::Weekly, date(2024, 1, 1), date(2024, 1, 8))]
    #[case(RecurrenceType::Weekly, date(2024, 3, 1), date(2024, 3, 8))]
    #[case(RecurrenceType::Daily, date(2024, 12, 31), date(2025, 1, 1))]
    #[case(RecurrenceType::Daily, date(2024, 2, 28), date(2024, 2, 29))]
    #[case(RecurrenceType::None, date(2024, 5, 5), date(2024, 5, 5))]
    fn test_next_due_date(
        #[case] recurrence: RecurrenceType,
        #[case] base: NaiveDate,
        #[case] expected: NaiveDate,
    ) {
        assert_eq!(next_due_date(recurrence, base), expected);
    }

    fn todo(status: ProgressStatus, recurrence: RecurrenceType, due: Option<NaiveDate>) -> Todo {
        Todo {
            id: 1,
            owner_id: 1,
            name: "Water plants".to_string(),
            detail: String::new(),
            due_date: due,
            progress_status: status,
            recurrence_type: recurrence,
            parent_id: None,
            previous_todo_id: None,
            created_at: Utc::now(),
        }
    }

    #[rstest]
    #[case(ProgressStatus::Completed, RecurrenceType::Weekly, Some(date(2024, 1, 1)), false, true)]
    #[case(ProgressStatus::Completed, RecurrenceType::Weekly, Some(date(2024, 1, 1)), true, false)]
    #[case(ProgressStatus::Completed, RecurrenceType::None, Some(date(2024, 1, 1)), false, false)]
    #[case(ProgressStatus::Completed, RecurrenceType::Daily, None, false, false)]
    #[case(ProgressStatus::InProgress, RecurrenceType::Monthly, Some(date(2024, 1, 1)), false, false)]
    fn test_is_completion_transition(
        #[case] status: ProgressStatus,
        #[case] recurrence: RecurrenceType,
        #[case] due: Option<NaiveDate>,
        #[case] was_completed: bool,
        #[case] expected: bool,
    ) {
        let todo = todo(status, recurrence, due);
        assert_eq!(is_completion_transition(&todo, was_completed), expected);
    }
}
