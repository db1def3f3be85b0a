pub mod auth;
pub mod health;
pub mod tasks;

use crate::auth::{AuthMiddleware, RequireAdmin};
use crate::error::AppError;
use actix_web::web;

/// Extractor configuration mapping malformed JSON bodies and malformed path
/// identifiers to the standard 400 envelope instead of actix's plain-text
/// default.
fn extractor_configs(cfg: &mut web::ServiceConfig) {
    cfg.app_data(web::JsonConfig::default().error_handler(|err, _req| {
        AppError::Validation(format!("Invalid request body: {}", err)).into()
    }))
    .app_data(web::PathConfig::default().error_handler(|err, _req| {
        AppError::Validation(format!("Invalid identifier in path: {}", err)).into()
    }));
}

/// Route table.
///
/// `/auth`: register, login, and logout are open; check-auth and the user
/// listing/detail endpoints require a valid token.
///
/// `/tasks`: every route requires a valid token and the admin role,
/// including reads. Middleware registered last runs first, so each request
/// authenticates before the role gate sees it.
pub fn config(cfg: &mut web::ServiceConfig) {
    extractor_configs(cfg);
    cfg.service(
        web::scope("/auth")
            .service(auth::register)
            .service(auth::login)
            .service(auth::logout)
            .service(
                web::scope("")
                    .wrap(AuthMiddleware)
                    .service(auth::check_auth)
                    .service(auth::list_users)
                    .service(auth::get_user),
            ),
    )
    .service(
        web::scope("/tasks")
            .wrap(RequireAdmin)
            .wrap(AuthMiddleware)
            .service(tasks::get_tasks)
            .service(tasks::create_task)
            .service(tasks::get_task)
            .service(tasks::update_task)
            .service(tasks::delete_task),
    );
}
