//! Request filters for the protected route scopes.
//!
//! [`AuthMiddleware`] authenticates: it pulls the session token out of the
//! `token` cookie (bearer header as fallback), verifies it, and stashes the
//! decoded [`Claims`] in request extensions. [`RequireAdmin`] authorizes: it
//! runs inside an authenticated scope and checks the role claim. Both
//! answer rejected requests directly with the standard error envelope.

use actix_web::{
    body::EitherBody,
    dev::{forward_ready, Service, ServiceRequest, ServiceResponse, Transform},
    error::ResponseError,
    http::header,
    Error, HttpMessage,
};
use futures::future::{ready, LocalBoxFuture, Ready};

use crate::auth::token::{verify_token, Claims};
use crate::auth::TOKEN_COOKIE;
use crate::error::AppError;
use crate::models::user::Role;

/// A request with no token and a request with a bad token both get this
/// exact message, so the response does not disclose which case occurred.
const UNAUTHORIZED_MSG: &str = "Unauthorized";

fn reject<B>(req: ServiceRequest, err: AppError) -> ServiceResponse<EitherBody<B>> {
    let response = err.error_response().map_into_right_body();
    let (req, _payload) = req.into_parts();
    ServiceResponse::new(req, response)
}

pub struct AuthMiddleware;

impl<S, B> Transform<S, ServiceRequest> for AuthMiddleware
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error>,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<EitherBody<B>>;
    type Error = Error;
    type Transform = AuthMiddlewareService<S>;
    type InitError = ();
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ready(Ok(AuthMiddlewareService { service }))
    }
}

pub struct AuthMiddlewareService<S> {
    service: S,
}

impl<S, B> Service<ServiceRequest> for AuthMiddlewareService<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error>,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<EitherBody<B>>;
    type Error = Error;
    type Future = LocalBoxFuture<'static, Result<Self::Response, Self::Error>>;

    forward_ready!(service);

    fn call(&self, req: ServiceRequest) -> Self::Future {
        // Cookie first, Authorization header as fallback.
        let token = req
            .cookie(TOKEN_COOKIE)
            .map(|cookie| cookie.value().to_string())
            .or_else(|| {
                req.headers()
                    .get(header::AUTHORIZATION)
                    .and_then(|value| value.to_str().ok())
                    .and_then(|value| value.strip_prefix("Bearer "))
                    .map(String::from)
            });

        match token.as_deref().map(verify_token) {
            Some(Ok(claims)) => {
                req.extensions_mut().insert(claims);
                let fut = self.service.call(req);
                Box::pin(async move { fut.await.map(|res| res.map_into_left_body()) })
            }
            // Absent and invalid collapse into one uniform rejection.
            Some(Err(_)) | None => {
                let res = reject(req, AppError::Authentication(UNAUTHORIZED_MSG.into()));
                Box::pin(async move { Ok(res) })
            }
        }
    }
}

/// Role gate for admin-only scopes. Must run after [`AuthMiddleware`];
/// a request that reaches it without claims is treated as unauthenticated.
pub struct RequireAdmin;

impl<S, B> Transform<S, ServiceRequest> for RequireAdmin
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error>,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<EitherBody<B>>;
    type Error = Error;
    type Transform = RequireAdminService<S>;
    type InitError = ();
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ready(Ok(RequireAdminService { service }))
    }
}

pub struct RequireAdminService<S> {
    service: S,
}

impl<S, B> Service<ServiceRequest> for RequireAdminService<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error>,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<EitherBody<B>>;
    type Error = Error;
    type Future = LocalBoxFuture<'static, Result<Self::Response, Self::Error>>;

    forward_ready!(service);

    fn call(&self, req: ServiceRequest) -> Self::Future {
        let role = req.extensions().get::<Claims>().map(|claims| claims.role);

        match role {
            Some(Role::Admin) => {
                let fut = self.service.call(req);
                Box::pin(async move { fut.await.map(|res| res.map_into_left_body()) })
            }
            Some(role) => {
                // The 403 names both roles; acceptable exposure for an
                // internal admin check.
                let res = reject(
                    req,
                    AppError::Authorization(format!(
                        "Access denied. Required role: admin, your role: {}",
                        role
                    )),
                );
                Box::pin(async move { Ok(res) })
            }
            None => {
                let res = reject(req, AppError::Authentication(UNAUTHORIZED_MSG.into()));
                Box::pin(async move { Ok(res) })
            }
        }
    }
}
