pub mod health;
pub mod tasks;
pub mod uploads;
pub mod users;

use actix_web::web;

use crate::error::AppError;

/// Registers every route. Authentication is applied by `AuthMiddleware`, which the
/// caller wraps around the whole app.
pub fn config(cfg: &mut web::ServiceConfig) {
    cfg.service(health::index)
        .service(health::health)
        .service(
            web::scope("/users")
                .service(users::register)
                .service(users::login)
                .service(users::list_users)
                // `/profile` must be matched before `/{id}`.
                .service(users::profile)
                .service(users::get_user)
                .service(users::update_user)
                .service(users::delete_user),
        )
        .service(
            web::scope("/tasks")
                .service(tasks::get_tasks)
                .service(tasks::create_task)
                // `/status/{id}` must be matched before `/{id}`.
                .service(tasks::update_task_status)
                .service(tasks::get_task)
                .service(tasks::update_task)
                .service(tasks::delete_task),
        )
        .service(uploads::upload_file);
}

/// Reports unparsable JSON bodies with the usual `{"msg": ..}` shape.
pub fn json_config() -> web::JsonConfig {
    web::JsonConfig::default().error_handler(|err, _req| {
        AppError::BadRequest(err.to_string()).into()
    })
}

/// Rejects unknown query values, such as `?status=blocked`, with a 400.
pub fn query_config() -> web::QueryConfig {
    web::QueryConfig::default().error_handler(|err, _req| {
        AppError::BadRequest(err.to_string()).into()
    })
}
