use crate::{
    auth::{
        generate_token, hash_password, verify_password, AuthResponse, AuthenticatedUser,
        LoginRequest, RegisterRequest, TOKEN_COOKIE,
    },
    db::with_deadline,
    error::AppError,
    models::{PublicUser, User},
};
use actix_web::{cookie::Cookie, get, post, web, HttpResponse, Responder};
use chrono::Utc;
use serde_json::json;
use sqlx::PgPool;
use uuid::Uuid;
use validator::Validate;

/// Register a new user
///
/// Validates the payload (all missing fields reported together, then shape
/// checks in order), rejects duplicate emails with 409, hashes the password,
/// and returns the created user's public projection. The digest is never
/// part of the response.
#[post("/register")]
pub async fn register(
    pool: web::Data<PgPool>,
    register_data: web::Json<RegisterRequest>,
) -> Result<impl Responder, AppError> {
    let input = register_data.validated().map_err(|e| {
        log::warn!("Registration validation failed: {}", e);
        e
    })?;

    // Uniqueness check. A race that slips past it still surfaces as 409
    // through the unique index on insert.
    let existing = with_deadline(
        sqlx::query_scalar::<_, Uuid>("SELECT id FROM users WHERE email = $1")
            .bind(&input.email)
            .fetch_optional(&**pool),
    )
    .await?;

    if existing.is_some() {
        return Err(AppError::Conflict(
            "User already exists with the same email".into(),
        ));
    }

    let password_hash = hash_password(input.password).await?;

    let user = with_deadline(
        sqlx::query_as::<_, User>(
            "INSERT INTO users (id, username, email, password_hash, role, created_at)
             VALUES ($1, $2, $3, $4, $5, $6)
             RETURNING id, username, email, password_hash, role, created_at",
        )
        .bind(Uuid::new_v4())
        .bind(&input.username)
        .bind(&input.email)
        .bind(&password_hash)
        .bind(input.role)
        .bind(Utc::now())
        .fetch_one(&**pool),
    )
    .await?;

    log::info!(
        "Registered user {} ({}) with role {}",
        user.username,
        user.id,
        user.role
    );

    Ok(HttpResponse::Created().json(json!({
        "success": true,
        "message": "Registration successful",
        "data": {
            "userId": user.id,
            "username": user.username,
            "email": user.email,
            "role": user.role,
            "createdAt": user.created_at,
        }
    })))
}

/// Login user
///
/// Authenticates by email and password. Unknown email and wrong password
/// produce the identical 401 so the response never reveals which check
/// failed. On success the session token travels both as an httpOnly cookie
/// and in the JSON body.
#[post("/login")]
pub async fn login(
    pool: web::Data<PgPool>,
    login_data: web::Json<LoginRequest>,
) -> Result<impl Responder, AppError> {
    login_data.validate()?;

    let user = with_deadline(
        sqlx::query_as::<_, User>(
            "SELECT id, username, email, password_hash, role, created_at
             FROM users WHERE email = $1",
        )
        .bind(&login_data.email)
        .fetch_optional(&**pool),
    )
    .await?;

    let user = match user {
        Some(user) => user,
        None => {
            log::warn!("Login failed for {}: unknown email", login_data.email);
            return Err(AppError::Authentication("Invalid credentials".into()));
        }
    };

    let password = login_data.into_inner().password;
    if !verify_password(password, user.password_hash.clone()).await? {
        log::warn!("Login failed for {}: bad password", user.email);
        return Err(AppError::Authentication("Invalid credentials".into()));
    }

    let token = generate_token(&user)?;

    // secure(false) because local development runs without TLS; set to true
    // behind an HTTPS terminator.
    let cookie = Cookie::build(TOKEN_COOKIE, token.clone())
        .path("/")
        .http_only(true)
        .secure(false)
        .finish();

    Ok(HttpResponse::Ok().cookie(cookie).json(AuthResponse {
        success: true,
        message: "Login successful".into(),
        token,
        user: user.into(),
    }))
}

/// Logout user
///
/// Clears the session cookie. Tokens are not tracked server-side, so a
/// previously issued token stays verifiable until it expires.
#[post("/logout")]
pub async fn logout() -> impl Responder {
    let mut cookie = Cookie::new(TOKEN_COOKIE, "");
    cookie.set_path("/");
    cookie.make_removal();

    HttpResponse::Ok().cookie(cookie).json(json!({
        "success": true,
        "message": "Logged out successfully",
    }))
}

/// Returns the authenticated caller's decoded claims.
#[get("/check-auth")]
pub async fn check_auth(user: AuthenticatedUser) -> impl Responder {
    HttpResponse::Ok().json(json!({
        "success": true,
        "message": "Authenticated user",
        "user": user.0,
    }))
}

/// Lists every user, password digest excluded.
#[get("")]
pub async fn list_users(pool: web::Data<PgPool>) -> Result<impl Responder, AppError> {
    let users = with_deadline(
        sqlx::query_as::<_, PublicUser>(
            "SELECT id, username, email, role, created_at FROM users ORDER BY created_at DESC",
        )
        .fetch_all(&**pool),
    )
    .await?;

    Ok(HttpResponse::Ok().json(json!({
        "success": true,
        "users": users,
    })))
}

/// Fetches a single user by id, password digest excluded.
#[get("/{id}")]
pub async fn get_user(
    pool: web::Data<PgPool>,
    user_id: web::Path<Uuid>,
) -> Result<impl Responder, AppError> {
    let user = with_deadline(
        sqlx::query_as::<_, PublicUser>(
            "SELECT id, username, email, role, created_at FROM users WHERE id = $1",
        )
        .bind(user_id.into_inner())
        .fetch_optional(&**pool),
    )
    .await?;

    match user {
        Some(user) => Ok(HttpResponse::Ok().json(json!({
            "success": true,
            "user": user,
        }))),
        None => Err(AppError::NotFound("User not found".into())),
    }
}
