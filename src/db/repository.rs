use chrono::{Days, NaiveDate, SecondsFormat, Utc};
use sqlx::{QueryBuilder, Sqlite, SqlitePool, Transaction};

use crate::error::AppError;
use crate::models::{DueDateFilter, NewTodo, ProgressStatus, StatusFilter, Todo, TodoFilter};

/// Data access for todos, scoped to one database transaction.
///
/// Writes become visible to later statements on the same repository at once;
/// nothing is durable until [`TodoRepository::commit`]. Dropping the
/// repository without committing rolls everything back.
pub struct TodoRepository {
    tx: Transaction<'static, Sqlite>,
}

impl TodoRepository {
    pub async fn begin(db: &SqlitePool) -> Result<Self, AppError> {
        let tx = db.begin().await?;
        Ok(Self { tx })
    }

    pub async fn find_by_id_and_owner(
        &mut self,
        id: i64,
        owner_id: i64,
    ) -> Result<Option<Todo>, AppError> {
        let todo = sqlx::query_as::<_, Todo>("SELECT * FROM todos WHERE id = ? AND owner_id = ?")
            .bind(id)
            .bind(owner_id)
            .fetch_optional(&mut *self.tx)
            .await?;
        Ok(todo)
    }

    /// Lists an owner's todos, newest first. `today` anchors the due-date
    /// buckets.
    pub async fn find_by_owner(
        &mut self,
        owner_id: i64,
        filter: &TodoFilter,
        today: NaiveDate,
    ) -> Result<Vec<Todo>, AppError> {
        let mut qb: QueryBuilder<Sqlite> = QueryBuilder::new("SELECT * FROM todos WHERE owner_id = ");
        qb.push_bind(owner_id);

        if let Some(keyword) = filter
            .keyword
            .as_deref()
            .map(str::trim)
            .filter(|k| !k.is_empty())
        {
            let pattern = format!("%{}%", escape_like(keyword));
            qb.push(" AND (name LIKE ")
                .push_bind(pattern.clone())
                .push(" ESCAPE '\\' OR detail LIKE ")
                .push_bind(pattern)
                .push(" ESCAPE '\\')");
        }

        match filter.progress_status {
            StatusFilter::All => {}
            StatusFilter::NotStarted => {
                qb.push(" AND progress_status = ")
                    .push_bind(ProgressStatus::NotStarted);
            }
            StatusFilter::InProgress => {
                qb.push(" AND progress_status = ")
                    .push_bind(ProgressStatus::InProgress);
            }
            StatusFilter::Completed => {
                qb.push(" AND progress_status = ")
                    .push_bind(ProgressStatus::Completed);
            }
            StatusFilter::Incomplete => {
                qb.push(" AND progress_status <> ")
                    .push_bind(ProgressStatus::Completed);
            }
        }

        match filter.due_date {
            DueDateFilter::All => {}
            DueDateFilter::Today => {
                qb.push(" AND due_date = ").push_bind(today);
            }
            DueDateFilter::ThisWeek => {
                qb.push(" AND due_date >= ")
                    .push_bind(today)
                    .push(" AND due_date <= ")
                    .push_bind(today + Days::new(6));
            }
            DueDateFilter::Overdue => {
                qb.push(" AND due_date < ").push_bind(today);
            }
            DueDateFilter::NoDueDate => {
                qb.push(" AND due_date IS NULL");
            }
        }

        qb.push(" ORDER BY created_at DESC, id DESC");

        let todos = qb
            .build_query_as::<Todo>()
            .fetch_all(&mut *self.tx)
            .await?;
        Ok(todos)
    }

    /// Whether the owner already has an incomplete todo with exactly this
    /// name. Completed todos release their name.
    pub async fn exists_by_owner_and_name(
        &mut self,
        owner_id: i64,
        name: &str,
        exclude_id: Option<i64>,
    ) -> Result<bool, AppError> {
        let found: Option<i64> = sqlx::query_scalar(
            r#"
            SELECT id FROM todos
            WHERE owner_id = ?1
              AND name = ?2
              AND progress_status <> 'completed'
              AND (?3 IS NULL OR id <> ?3)
            LIMIT 1
            "#,
        )
        .bind(owner_id)
        .bind(name)
        .bind(exclude_id)
        .fetch_optional(&mut *self.tx)
        .await?;
        Ok(found.is_some())
    }

    pub async fn has_subtasks(&mut self, id: i64) -> Result<bool, AppError> {
        let found: Option<i64> = sqlx::query_scalar("SELECT id FROM todos WHERE parent_id = ? LIMIT 1")
            .bind(id)
            .fetch_optional(&mut *self.tx)
            .await?;
        Ok(found.is_some())
    }

    pub async fn find_successor(&mut self, predecessor_id: i64) -> Result<Option<Todo>, AppError> {
        let todo = sqlx::query_as::<_, Todo>("SELECT * FROM todos WHERE previous_todo_id = ?")
            .bind(predecessor_id)
            .fetch_optional(&mut *self.tx)
            .await?;
        Ok(todo)
    }

    pub async fn insert(&mut self, todo: NewTodo) -> Result<Todo, AppError> {
        // fixed-width timestamps keep text ordering chronological
        let now = Utc::now().to_rfc3339_opts(SecondsFormat::Micros, true);

        let inserted = sqlx::query_as::<_, Todo>(
            r#"
            INSERT INTO todos
                (owner_id, name, detail, due_date, progress_status, recurrence_type,
                parent_id, previous_todo_id, created_at)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)
            RETURNING *
            "#,
        )
        .bind(todo.owner_id)
        .bind(&todo.name)
        .bind(&todo.detail)
        .bind(todo.due_date)
        .bind(todo.progress_status)
        .bind(todo.recurrence_type)
        .bind(todo.parent_id)
        .bind(todo.previous_todo_id)
        .bind(&now)
        .fetch_one(&mut *self.tx)
        .await?;

        Ok(inserted)
    }

    /// Inserts the next occurrence of a recurring todo, linked back to it.
    pub async fn insert_successor(
        &mut self,
        predecessor: &Todo,
        due_date: NaiveDate,
    ) -> Result<Todo, AppError> {
        self.insert(NewTodo {
            owner_id: predecessor.owner_id,
            name: predecessor.name.clone(),
            detail: predecessor.detail.clone(),
            due_date: Some(due_date),
            progress_status: ProgressStatus::NotStarted,
            recurrence_type: predecessor.recurrence_type,
            parent_id: None,
            previous_todo_id: Some(predecessor.id),
        })
        .await
    }

    /// Writes the in-memory state of `todo` inside the transaction.
    /// `owner_id`, `created_at` and the back-reference are never rewritten.
    pub async fn flush(&mut self, todo: &Todo) -> Result<(), AppError> {
        let result = sqlx::query(
            r#"
            UPDATE todos
            SET name = ?1,
                detail = ?2,
                due_date = ?3,
                progress_status = ?4,
                recurrence_type = ?5,
                parent_id = ?6
            WHERE id = ?7 AND owner_id = ?8
            "#,
        )
        .bind(&todo.name)
        .bind(&todo.detail)
        .bind(todo.due_date)
        .bind(todo.progress_status)
        .bind(todo.recurrence_type)
        .bind(todo.parent_id)
        .bind(todo.id)
        .bind(todo.owner_id)
        .execute(&mut *self.tx)
        .await?
        .rows_affected();

        if result == 0 {
            return Err(AppError::NotFound);
        }
        Ok(())
    }

    pub async fn remove(&mut self, todo: &Todo) -> Result<(), AppError> {
        let result = sqlx::query("DELETE FROM todos WHERE id = ? AND owner_id = ?")
            .bind(todo.id)
            .bind(todo.owner_id)
            .execute(&mut *self.tx)
            .await?
            .rows_affected();

        if result == 0 {
            return Err(AppError::NotFound);
        }
        Ok(())
    }

    pub async fn commit(self) -> Result<(), AppError> {
        self.tx.commit().await?;
        Ok(())
    }
}

fn escape_like(value: &str) -> String {
    value
        .replace('\\', "\\\\")
        .replace('%', "\\%")
        .replace('_', "\\_")
}
