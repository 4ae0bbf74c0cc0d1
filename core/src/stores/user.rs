//! Session store: the signed-in user and the bearer token.
//!
//! Two states, anonymous and authenticated. A failed profile fetch is
//! treated as "the session is invalid" and always drops back to anonymous.

use tracing::{info, warn};

use crate::cache::RequestState;
use crate::error::ApiError;
use crate::models::{NewUser, PasswordChange, ProfileUpdate, Token, User};
use crate::storage::TokenStorage;
use crate::transport::Backend;

use super::track;

pub struct UserStore {
    user: Option<User>,
    authenticated: bool,
    token: Option<String>,
    storage: Box<dyn TokenStorage>,
    pub status: RequestState,
}

impl UserStore {
    /// Reads any persisted token. Nothing is validated until
    /// `initialize_auth`.
    pub fn new(storage: impl TokenStorage + 'static) -> Self {
        let token = storage.load().unwrap_or_else(|e| {
            warn!(error = %e, "could not read persisted token");
            None
        });
        Self {
            user: None,
            authenticated: false,
            token,
            storage: Box::new(storage),
            status: RequestState::default(),
        }
    }

    pub fn user(&self) -> Option<&User> {
        self.user.as_ref()
    }

    pub fn is_authenticated(&self) -> bool {
        self.authenticated
    }

    pub fn token(&self) -> Option<&str> {
        self.token.as_deref()
    }

    pub fn error(&self) -> Option<&str> {
        self.status.error.as_deref()
    }

    pub fn is_busy(&self) -> bool {
        self.status.busy
    }

    /// Exchange credentials for a token, persist it and load the profile.
    pub fn login(&mut self, backend: &mut Backend, email: &str, password: &str) -> Result<(), ApiError> {
        self.status.begin();
        let result = self.authenticate(backend, email, password);
        self.status.finish(&result, "Login failed");
        result
    }

    fn authenticate(&mut self, backend: &mut Backend, email: &str, password: &str) -> Result<(), ApiError> {
        let request = backend
            .client()
            .post_form("/auth/login", &[("username", email), ("password", password)]);
        let token: Token = backend.send_json(request)?;

        self.storage.save(&token.access_token)?;
        backend.client_mut().set_token(Some(token.access_token.clone()));
        self.token = Some(token.access_token);
        self.authenticated = true;
        info!("session authenticated");

        self.fetch_user_data(backend);
        Ok(())
    }

    /// Create the account, then log in with the same credentials.
    pub fn register(&mut self, backend: &mut Backend, new_user: &NewUser) -> Result<(), ApiError> {
        self.status.begin();
        let result = backend
            .post_json::<_, User>("/auth/register", new_user)
            .and_then(|_| self.authenticate(backend, &new_user.email, &new_user.password));
        self.status.finish(&result, "Registration failed");
        result
    }

    /// Load the profile. Any failure ends the session instead of being
    /// reported, and `None` is returned.
    pub fn fetch_user_data(&mut self, backend: &mut Backend) -> Option<&User> {
        match backend.get_json::<User>("/auth/me") {
            Ok(user) => {
                self.user = Some(user);
                self.user.as_ref()
            }
            Err(e) => {
                warn!(error = %e, "profile fetch failed, ending session");
                self.logout(backend);
                None
            }
        }
    }

    pub fn update_profile(&mut self, backend: &Backend, update: &ProfileUpdate) -> Result<&User, ApiError> {
        let user = track(&mut self.status, "Profile update failed", || {
            backend.put_json::<_, User>("/auth/me", update)
        })?;
        Ok(self.user.insert(user))
    }

    pub fn change_password(&mut self, backend: &Backend, change: &PasswordChange) -> Result<(), ApiError> {
        track(&mut self.status, "Password change failed", || {
            let request = backend.client().put_json("/auth/change-password", change)?;
            backend.send_json::<serde_json::Value>(request).map(|_| ())
        })
    }

    /// Delete the account on the backend and end the local session.
    pub fn delete_account(&mut self, backend: &mut Backend) -> Result<(), ApiError> {
        track(&mut self.status, "Account deletion failed", || backend.delete("/auth/me"))?;
        self.logout(backend);
        Ok(())
    }

    /// Forget the profile and token. No network call.
    pub fn logout(&mut self, backend: &mut Backend) {
        self.user = None;
        self.authenticated = false;
        self.token = None;
        backend.client_mut().set_token(None);
        if let Err(e) = self.storage.clear() {
            warn!(error = %e, "could not clear persisted token");
        }
        info!("session ended");
    }

    pub fn clear_error(&mut self) {
        self.status.clear_error();
    }

    /// On startup: trust a persisted token optimistically, then validate it
    /// by loading the profile.
    pub fn initialize_auth(&mut self, backend: &mut Backend) {
        let Some(token) = self.token.clone() else {
            return;
        };
        backend.client_mut().set_token(Some(token));
        self.authenticated = true;
        self.fetch_user_data(backend);
    }

    /// "First Last", trimmed; empty when signed out.
    pub fn full_name(&self) -> String {
        let Some(user) = &self.user else {
            return String::new();
        };
        format!(
            "{} {}",
            user.first_name.as_deref().unwrap_or_default(),
            user.last_name.as_deref().unwrap_or_default()
        )
        .trim()
        .to_string()
    }

    /// Upper-cased first letters of first and last name.
    pub fn initials(&self) -> String {
        let Some(user) = &self.user else {
            return String::new();
        };
        [&user.first_name, &user.last_name]
            .into_iter()
            .filter_map(|name| name.as_deref().and_then(|n| n.chars().next()))
            .flat_map(char::to_uppercase)
            .collect()
    }
}
