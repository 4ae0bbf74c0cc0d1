//! Registration, login and the caller's own account.

use axum::{extract::State, http::StatusCode, Form, Json};
use serde_json::{json, Value};
use tracing::info;
use uuid::Uuid;

use crate::models::{ChangePassword, LoginForm, RegisterUser, Token, UpdateProfile, User};
use crate::{now, Account, ApiError, CurrentUser, Db};

const MIN_PASSWORD_LEN: usize = 6;

pub async fn register(State(db): State<Db>, Json(input): Json<RegisterUser>) -> Result<Json<User>, ApiError> {
    if input.password.len() < MIN_PASSWORD_LEN {
        return Err(ApiError::bad_request("Password must be at least 6 characters"));
    }
    let mut store = db.write().await;
    let email = input.email.trim().to_lowercase();
    if store.accounts.values().any(|account| account.user.email == email) {
        return Err(ApiError::bad_request("Email already registered"));
    }
    let id = store.next_id();
    let timestamp = now();
    let user = User {
        id,
        email,
        first_name: input.first_name,
        last_name: input.last_name,
        phone: input.phone,
        location: input.location,
        preferred_language: input.preferred_language,
        is_active: true,
        created_at: timestamp,
        updated_at: timestamp,
    };
    store.accounts.insert(
        id,
        Account {
            user: user.clone(),
            password: input.password,
        },
    );
    info!(user_id = id, "account registered");
    Ok(Json(user))
}

/// OAuth2 password form: the email travels as `username`.
pub async fn login(State(db): State<Db>, Form(form): Form<LoginForm>) -> Result<Json<Token>, ApiError> {
    let mut store = db.write().await;
    let email = form.username.trim().to_lowercase();
    let user_id = store
        .accounts
        .values()
        .find(|account| account.user.email == email && account.password == form.password)
        .map(|account| account.user.id)
        .ok_or_else(|| ApiError::new(StatusCode::UNAUTHORIZED, "Incorrect email or password"))?;
    let token = Uuid::new_v4();
    store.sessions.insert(token, user_id);
    Ok(Json(Token {
        access_token: token.to_string(),
        token_type: "bearer".to_string(),
    }))
}

pub async fn me(State(db): State<Db>, CurrentUser(user_id): CurrentUser) -> Result<Json<User>, ApiError> {
    let store = db.read().await;
    store
        .accounts
        .get(&user_id)
        .map(|account| Json(account.user.clone()))
        .ok_or_else(ApiError::unauthorized)
}

pub async fn update_me(
    State(db): State<Db>,
    CurrentUser(user_id): CurrentUser,
    Json(input): Json<UpdateProfile>,
) -> Result<Json<User>, ApiError> {
    let mut store = db.write().await;
    let account = store.accounts.get_mut(&user_id).ok_or_else(ApiError::unauthorized)?;
    let user = &mut account.user;
    if let Some(first_name) = input.first_name {
        user.first_name = Some(first_name);
    }
    if let Some(last_name) = input.last_name {
        user.last_name = Some(last_name);
    }
    if let Some(phone) = input.phone {
        user.phone = Some(phone);
    }
    if let Some(location) = input.location {
        user.location = Some(location);
    }
    if let Some(language) = input.preferred_language {
        user.preferred_language = language;
    }
    user.updated_at = now();
    Ok(Json(user.clone()))
}

pub async fn change_password(
    State(db): State<Db>,
    CurrentUser(user_id): CurrentUser,
    Json(input): Json<ChangePassword>,
) -> Result<Json<Value>, ApiError> {
    let mut store = db.write().await;
    let account = store.accounts.get_mut(&user_id).ok_or_else(ApiError::unauthorized)?;
    if account.password != input.current_password {
        return Err(ApiError::bad_request("Incorrect password"));
    }
    if input.new_password.len() < MIN_PASSWORD_LEN {
        return Err(ApiError::bad_request("Password must be at least 6 characters"));
    }
    account.password = input.new_password;
    Ok(Json(json!({ "message": "Password updated successfully" })))
}

/// Remove the account, its sessions and everything it owns.
pub async fn delete_me(State(db): State<Db>, CurrentUser(user_id): CurrentUser) -> StatusCode {
    let mut store = db.write().await;
    store.accounts.remove(&user_id);
    store.sessions.retain(|_, owner| *owner != user_id);

    let children: Vec<_> = store
        .children
        .values()
        .filter(|child| child.user_id == user_id)
        .map(|child| child.id)
        .collect();
    store.children.retain(|_, child| child.user_id != user_id);
    store.vaccinations.retain(|_, v| !children.contains(&v.child_id));
    store.growth.retain(|_, g| !children.contains(&g.child_id));
    store.milestones.retain(|_, m| !children.contains(&m.child_id));
    store.pregnancies.retain(|_, p| p.user_id != user_id);
    store.appointments.retain(|_, a| a.user_id != user_id);
    store.records.retain(|_, r| r.user_id != user_id);
    store.assessments.retain(|_, a| a.user_id != user_id);
    store.contacts.retain(|_, c| c.user_id != user_id);
    info!(user_id, "account deleted");
    StatusCode::NO_CONTENT
}
