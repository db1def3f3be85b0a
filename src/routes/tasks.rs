use crate::{
    db::with_deadline,
    error::AppError,
    models::{
        task::{TaskRow, TaskView},
        Task, TaskInput,
    },
};
use actix_web::{delete, get, post, put, web, HttpResponse, Responder};
use chrono::Utc;
use serde_json::json;
use sqlx::PgPool;
use uuid::Uuid;
use validator::Validate;

/// Columns for the task/user LEFT JOIN used by the read endpoints.
/// A dangling `assigned_to` reference yields NULL assignee columns, which
/// map to a null `assignedTo` in the response rather than failing the read.
const TASK_VIEW_COLUMNS: &str = "t.id, t.title, t.description, t.status, t.created_at, t.updated_at, \
     u.id AS assignee_id, u.username AS assignee_username, u.email AS assignee_email, \
     u.role AS assignee_role, u.created_at AS assignee_created_at";

/// Creates a new task.
///
/// ## Responses:
/// - `201 Created`: Returns the newly created task.
/// - `400 Bad Request`: Empty title, overlong fields, or a malformed `assignedTo` id.
/// - `401 Unauthorized` / `403 Forbidden`: From the route scope's middleware.
#[post("")]
pub async fn create_task(
    pool: web::Data<PgPool>,
    task_data: web::Json<TaskInput>,
) -> Result<impl Responder, AppError> {
    task_data.validate()?;

    let task = Task::new(task_data.into_inner());

    let created = with_deadline(
        sqlx::query_as::<_, Task>(
            "INSERT INTO tasks (id, title, description, status, assigned_to, created_at, updated_at)
             VALUES ($1, $2, $3, $4, $5, $6, $7)
             RETURNING id, title, description, status, assigned_to, created_at, updated_at",
        )
        .bind(task.id)
        .bind(task.title)
        .bind(task.description)
        .bind(task.status)
        .bind(task.assigned_to)
        .bind(task.created_at)
        .bind(task.updated_at)
        .fetch_one(&**pool),
    )
    .await?;

    Ok(HttpResponse::Created().json(json!({
        "success": true,
        "message": "Task created successfully",
        "task": created,
    })))
}

/// Lists all tasks, newest first, with `assignedTo` populated.
#[get("")]
pub async fn get_tasks(pool: web::Data<PgPool>) -> Result<impl Responder, AppError> {
    let sql = format!(
        "SELECT {} FROM tasks t LEFT JOIN users u ON u.id = t.assigned_to \
         ORDER BY t.created_at DESC",
        TASK_VIEW_COLUMNS
    );

    let rows = with_deadline(sqlx::query_as::<_, TaskRow>(&sql).fetch_all(&**pool)).await?;
    let tasks: Vec<TaskView> = rows.into_iter().map(TaskView::from).collect();

    Ok(HttpResponse::Ok().json(json!({
        "success": true,
        "tasks": tasks,
    })))
}

/// Retrieves a single task by id, with `assignedTo` populated.
///
/// ## Responses:
/// - `200 OK`: The task.
/// - `400 Bad Request`: Malformed id in the path.
/// - `404 Not Found`: No task with that id.
#[get("/{id}")]
pub async fn get_task(
    pool: web::Data<PgPool>,
    task_id: web::Path<Uuid>,
) -> Result<impl Responder, AppError> {
    let sql = format!(
        "SELECT {} FROM tasks t LEFT JOIN users u ON u.id = t.assigned_to WHERE t.id = $1",
        TASK_VIEW_COLUMNS
    );

    let row = with_deadline(
        sqlx::query_as::<_, TaskRow>(&sql)
            .bind(task_id.into_inner())
            .fetch_optional(&**pool),
    )
    .await?;

    match row {
        Some(row) => Ok(HttpResponse::Ok().json(json!({
            "success": true,
            "task": TaskView::from(row),
        }))),
        None => Err(AppError::NotFound("Task not found".into())),
    }
}

/// Replaces a task's fields.
///
/// ## Responses:
/// - `200 OK`: The updated task.
/// - `400 Bad Request`: Malformed id or invalid field values.
/// - `404 Not Found`: No task with that id.
#[put("/{id}")]
pub async fn update_task(
    pool: web::Data<PgPool>,
    task_id: web::Path<Uuid>,
    task_data: web::Json<TaskInput>,
) -> Result<impl Responder, AppError> {
    task_data.validate()?;
    let input = task_data.into_inner();

    let updated = with_deadline(
        sqlx::query_as::<_, Task>(
            "UPDATE tasks
             SET title = $1, description = $2, status = $3, assigned_to = $4, updated_at = $5
             WHERE id = $6
             RETURNING id, title, description, status, assigned_to, created_at, updated_at",
        )
        .bind(&input.title)
        .bind(&input.description)
        .bind(input.status)
        .bind(input.assigned_to)
        .bind(Utc::now())
        .bind(task_id.into_inner())
        .fetch_optional(&**pool),
    )
    .await?;

    match updated {
        Some(task) => Ok(HttpResponse::Ok().json(json!({
            "success": true,
            "message": "Task updated successfully",
            "task": task,
        }))),
        None => Err(AppError::NotFound("Task not found".into())),
    }
}

/// Deletes a task by id.
///
/// ## Responses:
/// - `200 OK`: On successful deletion.
/// - `400 Bad Request`: Malformed id in the path.
/// - `404 Not Found`: No task with that id.
#[delete("/{id}")]
pub async fn delete_task(
    pool: web::Data<PgPool>,
    task_id: web::Path<Uuid>,
) -> Result<impl Responder, AppError> {
    let result = with_deadline(
        sqlx::query("DELETE FROM tasks WHERE id = $1")
            .bind(task_id.into_inner())
            .execute(&**pool),
    )
    .await?;

    if result.rows_affected() == 0 {
        return Err(AppError::NotFound("Task not found".into()));
    }

    Ok(HttpResponse::Ok().json(json!({
        "success": true,
        "message": "Task deleted successfully",
    })))
}
