use crate::{
    auth::{login::login as run_login, AuthenticatedUser, LoginMethod, LoginRequest},
    error::AppError,
    models::{NewUser, UserChanges, UserInput, UserProfile, UserUpdateInput},
    state::AppState,
};
use actix_web::{delete, get, post, put, web, HttpResponse, Responder};
use uuid::Uuid;
use validator::Validate;

/// Register a new user
///
/// Validates the payload, rejects an email that is already registered, hashes the
/// password and returns the stored profile.
///
/// ## Responses:
/// - `201 Created`: the new `UserProfile`.
/// - `400 Bad Request`: field-level validation errors, or the email is taken.
#[post("")]
pub async fn register(
    state: web::Data<AppState>,
    input: web::Json<UserInput>,
) -> Result<impl Responder, AppError> {
    input.validate()?;
    let input = input.into_inner();

    if state.users.find_by_email(&input.email).await?.is_some() {
        return Err(AppError::BadRequest("Email already registered".into()));
    }

    let password_hash = state.hasher.hash(&input.password).await?;
    let user = state
        .users
        .create(NewUser {
            name: input.name,
            email: input.email,
            password_hash,
            age: input.age,
        })
        .await?;

    Ok(HttpResponse::Created().json(UserProfile::from(user)))
}

/// Login user
///
/// `type: "email"` authenticates with `email` + `password`; `type: "refresh"`
/// exchanges a refresh token for a new pair.
///
/// ## Responses:
/// - `200 OK`: profile plus `accessToken` and `refreshToken`.
/// - `400 Bad Request`: missing or unknown `type`, or missing credentials.
/// - `401 Unauthorized`: wrong password, or an invalid, expired or missing refresh token.
/// - `404 Not Found`: no user with that email.
#[post("/login")]
pub async fn login(
    state: web::Data<AppState>,
    request: web::Json<LoginRequest>,
) -> Result<impl Responder, AppError> {
    let method = LoginMethod::try_from(request.into_inner())?;
    let response = run_login(
        state.users.as_ref(),
        &state.hasher,
        &state.tokens,
        method,
    )
    .await?;
    Ok(HttpResponse::Ok().json(response))
}

/// Lists every user.
#[get("")]
pub async fn list_users(
    state: web::Data<AppState>,
    _user: AuthenticatedUser,
) -> Result<impl Responder, AppError> {
    let users: Vec<UserProfile> = state
        .users
        .list()
        .await?
        .into_iter()
        .map(UserProfile::from)
        .collect();
    Ok(HttpResponse::Ok().json(users))
}

/// Returns the caller's own profile.
#[get("/profile")]
pub async fn profile(
    state: web::Data<AppState>,
    user: AuthenticatedUser,
) -> Result<impl Responder, AppError> {
    let found = state
        .users
        .find_by_id(user.id)
        .await?
        .ok_or_else(|| AppError::NotFound("User not found".into()))?;
    Ok(HttpResponse::Ok().json(UserProfile::from(found)))
}

#[get("/{id}")]
pub async fn get_user(
    state: web::Data<AppState>,
    user_id: web::Path<Uuid>,
    _user: AuthenticatedUser,
) -> Result<impl Responder, AppError> {
    let found = state
        .users
        .find_by_id(user_id.into_inner())
        .await?
        .ok_or_else(|| AppError::NotFound("User not found".into()))?;
    Ok(HttpResponse::Ok().json(UserProfile::from(found)))
}

/// Partially updates a user. A new password is hashed before it reaches the store.
#[put("/{id}")]
pub async fn update_user(
    state: web::Data<AppState>,
    user_id: web::Path<Uuid>,
    input: web::Json<UserUpdateInput>,
    _user: AuthenticatedUser,
) -> Result<impl Responder, AppError> {
    input.validate()?;
    let input = input.into_inner();

    let password_hash = match input.password {
        Some(password) => Some(state.hasher.hash(&password).await?),
        None => None,
    };
    let changes = UserChanges {
        name: input.name,
        email: input.email,
        age: input.age,
        password_hash,
    };

    let updated = state
        .users
        .update(user_id.into_inner(), changes)
        .await?
        .ok_or_else(|| AppError::NotFound("User not found".into()))?;
    Ok(HttpResponse::Ok().json(UserProfile::from(updated)))
}

/// Deletes a user together with their tasks and returns the removed profile.
#[delete("/{id}")]
pub async fn delete_user(
    state: web::Data<AppState>,
    user_id: web::Path<Uuid>,
    _user: AuthenticatedUser,
) -> Result<impl Responder, AppError> {
    let removed = state
        .users
        .delete(user_id.into_inner())
        .await?
        .ok_or_else(|| AppError::NotFound("User not found".into()))?;
    Ok(HttpResponse::Ok().json(UserProfile::from(removed)))
}
