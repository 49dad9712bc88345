use std::sync::Arc;

use chrono::NaiveDate;
use mockable::Clock;
use sqlx::SqlitePool;
use tracing::{debug, info};

use crate::db::TodoRepository;
use crate::error::AppError;
use crate::models::{NewTodoRequest, Todo, TodoFilter, UpdateTodoRequest};
use crate::services::{entity, recurrence, validation};

/// Runs each todo lifecycle operation inside a single transaction.
///
/// Nothing is committed unless the whole operation succeeds; an early
/// return drops the repository and rolls the transaction back.
pub struct TodoService {
    db: SqlitePool,
    clock: Arc<dyn Clock + Send + Sync>,
}

impl TodoService {
    pub fn new(db: SqlitePool, clock: Arc<dyn Clock + Send + Sync>) -> Self {
        Self { db, clock }
    }

    fn today(&self) -> NaiveDate {
        self.clock.local().date_naive()
    }

    pub async fn list_todos(&self, owner_id: i64, filter: &TodoFilter) -> Result<Vec<Todo>, AppError> {
        let mut repo = TodoRepository::begin(&self.db).await?;
        let todos = repo.find_by_owner(owner_id, filter, self.today()).await?;
        repo.commit().await?;
        Ok(todos)
    }

    pub async fn create_todo(&self, owner_id: i64, req: NewTodoRequest) -> Result<Todo, AppError> {
        let mut repo = TodoRepository::begin(&self.db).await?;

        validation::validate_create(&mut repo, owner_id, &req).await?;
        let todo = repo.insert(entity::build(req, owner_id)).await?;

        repo.commit().await?;
        info!("created todo {} for owner {}", todo.id, owner_id);
        Ok(todo)
    }

    pub async fn get_todo(&self, id: i64, owner_id: i64) -> Result<Todo, AppError> {
        let mut repo = TodoRepository::begin(&self.db).await?;
        let todo = repo
            .find_by_id_and_owner(id, owner_id)
            .await?
            .ok_or(AppError::NotFound)?;
        repo.commit().await?;
        Ok(todo)
    }

    /// Partial update. Completing a recurring todo also schedules its next
    /// occurrence, counted from today.
    pub async fn update_todo(
        &self,
        id: i64,
        owner_id: i64,
        req: UpdateTodoRequest,
    ) -> Result<Todo, AppError> {
        let mut repo = TodoRepository::begin(&self.db).await?;

        let mut todo = repo
            .find_by_id_and_owner(id, owner_id)
            .await?
            .ok_or(AppError::NotFound)?;
        let was_completed = todo.progress_status.is_completed();

        validation::validate_update(&mut repo, &todo, &req).await?;
        entity::apply(&mut todo, req);
        repo.flush(&todo).await?;

        if recurrence::is_completion_transition(&todo, was_completed) {
            match repo.find_successor(todo.id).await? {
                Some(existing) => {
                    debug!(
                        "todo {} already has successor {}, not scheduling another",
                        todo.id, existing.id
                    );
                }
                None => {
                    let due_date = recurrence::next_due_date(todo.recurrence_type, self.today());
                    let successor = repo.insert_successor(&todo, due_date).await?;
                    info!(
                        "scheduled todo {} due {} as successor of {}",
                        successor.id, due_date, todo.id
                    );
                }
            }
        }

        let todo = repo
            .find_by_id_and_owner(id, owner_id)
            .await?
            .ok_or(AppError::NotFound)?;
        repo.commit().await?;
        Ok(todo)
    }

    /// Full replacement: fields missing from `req` are reset to their
    /// creation defaults rather than kept.
    pub async fn replace_todo(
        &self,
        id: i64,
        owner_id: i64,
        req: NewTodoRequest,
    ) -> Result<Todo, AppError> {
        self.update_todo(id, owner_id, UpdateTodoRequest::from(req)).await
    }

    pub async fn delete_todo(&self, id: i64, owner_id: i64) -> Result<(), AppError> {
        let mut repo = TodoRepository::begin(&self.db).await?;
        let todo = repo
            .find_by_id_and_owner(id, owner_id)
            .await?
            .ok_or(AppError::NotFound)?;
        repo.remove(&todo).await?;
        repo.commit().await?;
        info!("deleted todo {} for owner {}", id, owner_id);
        Ok(())
    }
}
