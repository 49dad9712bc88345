use axum::Json;
use axum::extract::rejection::{JsonRejection, QueryRejection};
use axum::extract::{Path, Query};
use axum::routing::post;
use axum::{Router, extract::State, http::StatusCode, routing::get};
use tower::ServiceBuilder;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::auth::{self, CurrentAccount};
use crate::error::AppError;
use crate::models::*;
use crate::services::TodoService;
use crate::state::AppState;

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/api/auth/register", post(register))
        .route("/api/auth/user", get(current_user))
        .route("/api/todos", get(list_todos).post(create_todo))
        .route(
            "/api/todos/{id}",
            get(get_todo)
                .put(replace_todo)
                .patch(update_todo)
                .delete(delete_todo),
        )
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(CorsLayer::permissive()),
        )
        .with_state(state)
}

fn todo_service(state: &AppState) -> TodoService {
    TodoService::new(state.db.clone(), state.clock.clone())
}

async fn health(State(state): State<AppState>) -> Result<StatusCode, AppError> {
    sqlx::query("select 1").execute(&state.db).await?;
    Ok(StatusCode::OK)
}

async fn register(
    State(state): State<AppState>,
    payload: Result<Json<RegisterAccountRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<RegisterAccountResponse>), AppError> {
    let Json(req) = payload?;
    let (account, token) = auth::register_account(&state.db, &req.username).await?;
    Ok((
        StatusCode::CREATED,
        Json(RegisterAccountResponse { account, token }),
    ))
}

async fn current_user(
    State(state): State<AppState>,
    CurrentAccount(account_id): CurrentAccount,
) -> Result<Json<Account>, AppError> {
    let account = auth::find_account(&state.db, account_id).await?;
    Ok(Json(account))
}

async fn list_todos(
    State(state): State<AppState>,
    CurrentAccount(owner_id): CurrentAccount,
    query: Result<Query<TodoFilter>, QueryRejection>,
) -> Result<Json<Vec<Todo>>, AppError> {
    let Query(filter) = query?;
    let todos = todo_service(&state).list_todos(owner_id, &filter).await?;
    Ok(Json(todos))
}

async fn create_todo(
    State(state): State<AppState>,
    CurrentAccount(owner_id): CurrentAccount,
    payload: Result<Json<NewTodoRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<Todo>), AppError> {
    let Json(req) = payload?;
    let todo = todo_service(&state).create_todo(owner_id, req).await?;
    Ok((StatusCode::CREATED, Json(todo)))
}

async fn get_todo(
    State(state): State<AppState>,
    CurrentAccount(owner_id): CurrentAccount,
    Path(id): Path<i64>,
) -> Result<Json<Todo>, AppError> {
    let todo = todo_service(&state).get_todo(id, owner_id).await?;
    Ok(Json(todo))
}

async fn replace_todo(
    State(state): State<AppState>,
    CurrentAccount(owner_id): CurrentAccount,
    Path(id): Path<i64>,
    payload: Result<Json<NewTodoRequest>, JsonRejection>,
) -> Result<Json<Todo>, AppError> {
    let Json(req) = payload?;
    let todo = todo_service(&state).replace_todo(id, owner_id, req).await?;
    Ok(Json(todo))
}

async fn update_todo(
    State(state): State<AppState>,
    CurrentAccount(owner_id): CurrentAccount,
    Path(id): Path<i64>,
    payload: Result<Json<UpdateTodoRequest>, JsonRejection>,
) -> Result<Json<Todo>, AppError> {
    let Json(req) = payload?;
    let todo = todo_service(&state).update_todo(id, owner_id, req).await?;
    Ok(Json(todo))
}

async fn delete_todo(
    State(state): State<AppState>,
    CurrentAccount(owner_id): CurrentAccount,
    Path(id): Path<i64>,
) -> Result<StatusCode, AppError> {
    todo_service(&state).delete_todo(id, owner_id).await?;
    Ok(StatusCode::NO_CONTENT)
}
