use sqlx::SqlitePool;
use tracing::info;

use super::models::{CreateTodoRequest, Todo, UpdateTodoRequest};
use super::validators::TodoValidator;
use crate::common::helpers::now_millis;
use crate::common::{generate_todo_id, is_valid_id, ApiError, EntityPrefix, Validator};

pub struct TodosService {
    db: SqlitePool,
}

impl TodosService {
    pub fn new(db: SqlitePool) -> Self {
        Self { db }
    }

    /// Get all todos, oldest first
    pub async fn list_todos(&self) -> Result<Vec<Todo>, ApiError> {
        let todos = sqlx::query_as::<_, Todo>(
            r#"
            SELECT id, text, completed, completed_at
            FROM todos
            ORDER BY created_at ASC, rowid ASC
            "#,
        )
        .fetch_all(&self.db)
        .await?;

        Ok(todos)
    }

    /// Get todo by ID
    ///
    /// Malformed ids are reported as not found without querying.
    pub async fn get_todo(&self, todo_id: &str) -> Result<Todo, ApiError> {
        if !is_valid_id(EntityPrefix::Todo, todo_id) {
            return Err(not_found());
        }

        sqlx::query_as::<_, Todo>(
            "SELECT id, text, completed, completed_at FROM todos WHERE id = ?",
        )
        .bind(todo_id)
        .fetch_optional(&self.db)
        .await?
        .ok_or_else(not_found)
    }

    /// Create a new todo; text is trimmed, `completed` starts false
    pub async fn create_todo(&self, request: CreateTodoRequest) -> Result<Todo, ApiError> {
        TodoValidator.validate(&request).into_result()?;

        let todo_id = generate_todo_id();
        let text = request.text.trim();

        sqlx::query("INSERT INTO todos (id, text, completed, completed_at) VALUES (?, ?, 0, NULL)")
            .bind(&todo_id)
            .bind(text)
            .execute(&self.db)
            .await?;

        info!(todo_id = %todo_id, "Created todo");

        self.get_todo(&todo_id).await
    }

    /// Apply a partial update
    ///
    /// `completed: true` stamps `completedAt` with the current time. Anything
    /// else marks the todo incomplete and clears `completedAt`.
    pub async fn update_todo(
        &self,
        todo_id: &str,
        request: UpdateTodoRequest,
    ) -> Result<Todo, ApiError> {
        let existing = self.get_todo(todo_id).await?;
        TodoValidator.validate(&request).into_result()?;

        let text = request
            .text
            .as_deref()
            .map(str::trim)
            .unwrap_or(existing.text.as_str())
            .to_string();

        let (completed, completed_at) = match request.completed {
            Some(true) => (true, Some(now_millis())),
            _ => (false, None),
        };

        sqlx::query("UPDATE todos SET text = ?, completed = ?, completed_at = ? WHERE id = ?")
            .bind(&text)
            .bind(completed)
            .bind(completed_at)
            .bind(todo_id)
            .execute(&self.db)
            .await?;

        info!(todo_id = %todo_id, completed = completed, "Updated todo");

        self.get_todo(todo_id).await
    }

    /// Delete a todo, returning the removed record
    pub async fn delete_todo(&self, todo_id: &str) -> Result<Todo, ApiError> {
        let existing = self.get_todo(todo_id).await?;

        let result = sqlx::query("DELETE FROM todos WHERE id = ?")
            .bind(todo_id)
            .execute(&self.db)
            .await?;

        if result.rows_affected() == 0 {
            return Err(not_found());
        }

        info!(todo_id = %todo_id, "Deleted todo");

        Ok(existing)
    }
}

fn not_found() -> ApiError {
    ApiError::NotFound("Todo not found".to_string())
}
