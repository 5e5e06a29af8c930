use super::models::{CreateTodoRequest, Todo, TodoListResponse, TodoResponse, UpdateTodoRequest};
use super::services::TodosService;
use crate::common::{ApiError, AppState};
use axum::{
    extract::{rejection::JsonRejection, Extension, Path},
    Json,
};
use std::sync::Arc;
use tokio::sync::RwLock;

/// POST /todos - Create a todo, responding with the stored document
pub async fn create_todo(
    Extension(state): Extension<Arc<RwLock<AppState>>>,
    body: Result<Json<CreateTodoRequest>, JsonRejection>,
) -> Result<Json<Todo>, ApiError> {
    let Json(request) = body?;
    let db = state.read().await.db.clone();
    let todo = TodosService::new(db).create_todo(request).await?;

    Ok(Json(todo))
}

/// GET /todos - List all todos
pub async fn list_todos(
    Extension(state): Extension<Arc<RwLock<AppState>>>,
) -> Result<Json<TodoListResponse>, ApiError> {
    let db = state.read().await.db.clone();
    let todos = TodosService::new(db).list_todos().await?;

    Ok(Json(TodoListResponse { todos }))
}

/// GET /todos/:id - Get todo by ID
pub async fn get_todo(
    Extension(state): Extension<Arc<RwLock<AppState>>>,
    Path(todo_id): Path<String>,
) -> Result<Json<TodoResponse>, ApiError> {
    let db = state.read().await.db.clone();
    let todo = TodosService::new(db).get_todo(&todo_id).await?;

    Ok(Json(TodoResponse { todo }))
}

/// PATCH /todos/:id - Update text and/or completion
pub async fn update_todo(
    Extension(state): Extension<Arc<RwLock<AppState>>>,
    Path(todo_id): Path<String>,
    body: Result<Json<UpdateTodoRequest>, JsonRejection>,
) -> Result<Json<TodoResponse>, ApiError> {
    let Json(request) = body?;
    let db = state.read().await.db.clone();
    let todo = TodosService::new(db).update_todo(&todo_id, request).await?;

    Ok(Json(TodoResponse { todo }))
}

/// DELETE /todos/:id - Delete todo, echoing the removed document
pub async fn delete_todo(
    Extension(state): Extension<Arc<RwLock<AppState>>>,
    Path(todo_id): Path<String>,
) -> Result<Json<TodoResponse>, ApiError> {
    let db = state.read().await.db.clone();
    let todo = TodosService::new(db).delete_todo(&todo_id).await?;

    Ok(Json(TodoResponse { todo }))
}
