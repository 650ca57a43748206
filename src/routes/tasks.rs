use crate::{
    auth::AuthenticatedUser,
    error::AppError,
    models::{Task, TaskChanges, TaskInput, TaskQuery, TaskStatus, TaskStatusInput, TaskUpdateInput},
    state::AppState,
};
use actix_web::{delete, get, post, put, web, HttpResponse, Responder};
use uuid::Uuid;
use validator::{Validate, ValidationErrors};

fn task_not_found() -> AppError {
    AppError::NotFound("Task not found".into())
}

/// Re-reports a status that passed validation but failed to parse as a field error.
fn status_field_error(err: validator::ValidationError) -> AppError {
    let mut errors = ValidationErrors::new();
    errors.add("status", err);
    errors.into()
}

/// Retrieves the authenticated user's tasks, newest first.
///
/// ## Query Parameters:
/// - `status` (optional): one of `to-do`, `in-progress`, `done`.
///
/// ## Responses:
/// - `200 OK`: a JSON array of `Task` objects.
/// - `400 Bad Request`: unknown `status` value.
/// - `401 Unauthorized`: missing or invalid token.
#[get("")]
pub async fn get_tasks(
    state: web::Data<AppState>,
    query: web::Query<TaskQuery>,
    user: AuthenticatedUser,
) -> Result<impl Responder, AppError> {
    let tasks = state.tasks.list_for_owner(user.id, query.status).await?;
    Ok(HttpResponse::Ok().json(tasks))
}

/// Creates a new task for the authenticated user.
///
/// ## Request Body:
/// - `title`: required, 1 to 200 characters.
/// - `desc` (optional): up to 1000 characters.
///
/// The task starts in the `to-do` state and is owned by the caller.
///
/// ## Responses:
/// - `201 Created`: the newly created `Task`.
/// - `400 Bad Request`: field-level validation errors.
/// - `401 Unauthorized`: missing or invalid token.
#[post("")]
pub async fn create_task(
    state: web::Data<AppState>,
    task_data: web::Json<TaskInput>,
    user: AuthenticatedUser,
) -> Result<impl Responder, AppError> {
    task_data.validate()?;

    let task = Task::new(task_data.into_inner(), user.id);
    let created = state.tasks.create(task).await?;

    Ok(HttpResponse::Created().json(created))
}

/// Retrieves a specific task by its ID.
///
/// ## Responses:
/// - `200 OK`: the `Task` if it exists and is owned by the caller.
/// - `404 Not Found`: the task does not exist or belongs to someone else.
#[get("/{id}")]
pub async fn get_task(
    state: web::Data<AppState>,
    task_id: web::Path<Uuid>,
    user: AuthenticatedUser,
) -> Result<impl Responder, AppError> {
    let task = state
        .tasks
        .find_for_owner(task_id.into_inner(), user.id)
        .await?
        .ok_or_else(task_not_found)?;
    Ok(HttpResponse::Ok().json(task))
}

/// Changes only the status of a task.
///
/// ## Request Body:
/// - `status`: one of `to-do`, `in-progress`, `done`.
///
/// ## Responses:
/// - `200 OK`: the updated `Task`.
/// - `400 Bad Request`: missing or unknown status.
/// - `404 Not Found`: the task does not exist or belongs to someone else.
#[put("/status/{id}")]
pub async fn update_task_status(
    state: web::Data<AppState>,
    task_id: web::Path<Uuid>,
    input: web::Json<TaskStatusInput>,
    user: AuthenticatedUser,
) -> Result<impl Responder, AppError> {
    input.validate()?;
    let status: TaskStatus = input.status.parse().map_err(status_field_error)?;

    let task = state
        .tasks
        .set_status_for_owner(task_id.into_inner(), user.id, status)
        .await?
        .ok_or_else(task_not_found)?;
    Ok(HttpResponse::Ok().json(task))
}

/// Replaces the editable fields of a task.
///
/// ## Request Body:
/// - `title`: required.
/// - `desc` (optional): cleared when omitted.
/// - `status`: required, one of `to-do`, `in-progress`, `done`.
///
/// ## Responses:
/// - `200 OK`: the updated `Task`.
/// - `400 Bad Request`: field-level validation errors.
/// - `404 Not Found`: the task does not exist or belongs to someone else.
#[put("/{id}")]
pub async fn update_task(
    state: web::Data<AppState>,
    task_id: web::Path<Uuid>,
    task_data: web::Json<TaskUpdateInput>,
    user: AuthenticatedUser,
) -> Result<impl Responder, AppError> {
    task_data.validate()?;
    let changes = TaskChanges::try_from(task_data.into_inner()).map_err(status_field_error)?;

    let task = state
        .tasks
        .update_for_owner(task_id.into_inner(), user.id, changes)
        .await?
        .ok_or_else(task_not_found)?;
    Ok(HttpResponse::Ok().json(task))
}

/// Deletes a task by its ID.
///
/// ## Responses:
/// - `204 No Content`: on successful deletion.
/// - `404 Not Found`: the task does not exist or belongs to someone else.
#[delete("/{id}")]
pub async fn delete_task(
    state: web::Data<AppState>,
    task_id: web::Path<Uuid>,
    user: AuthenticatedUser,
) -> Result<impl Responder, AppError> {
    if !state
        .tasks
        .delete_for_owner(task_id.into_inner(), user.id)
        .await?
    {
        return Err(task_not_found());
    }

    Ok(HttpResponse::NoContent().finish())
}
