//! The application context: one backend, one of each store, one guard.
//!
//! Domain stores are plain fields so callers can borrow a store mutably and
//! the backend immutably at the same time:
//!
//! ```no_run
//! # use mamatoto_core::{AppContext, ClientConfig, MemoryTokenStorage};
//! # fn demo(ctx: &mut AppContext) -> Result<(), mamatoto_core::ApiError> {
//! ctx.children.fetch_all(&ctx.backend)?;
//! # Ok(())
//! # }
//! ```
//!
//! The session store is private. Signing in and out goes through the
//! context, which drops every cached domain record whenever the session
//! ends or changes hands.

use tracing::info;

use crate::client::ApiClient;
use crate::config::ClientConfig;
use crate::error::ApiError;
use crate::models::{NewUser, PasswordChange, ProfileUpdate, User};
use crate::router::{Navigation, NavigationGuard, RouteTable};
use crate::storage::{FileTokenStorage, MemoryTokenStorage, TokenStorage};
use crate::stores::{ChildrenStore, HealthStore, PregnancyStore, UserStore};
use crate::transport::{Backend, Transport};

/// Guard redirects chain at most this many times.
const MAX_REDIRECTS: usize = 4;

/// Where a navigation ended up.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Transition {
    pub path: String,
    pub title: String,
    pub redirected: bool,
}

pub struct AppContext {
    pub backend: Backend,
    user: UserStore,
    pub pregnancy: PregnancyStore,
    pub children: ChildrenStore,
    pub health: HealthStore,
    pub guard: NavigationGuard,
}

impl AppContext {
    pub fn new(config: &ClientConfig, transport: impl Transport + 'static, storage: impl TokenStorage + 'static) -> Self {
        Self {
            backend: Backend::new(ApiClient::new(&config.base_url), transport),
            user: UserStore::new(storage),
            pregnancy: PregnancyStore::new(),
            children: ChildrenStore::new(),
            health: HealthStore::new(),
            guard: NavigationGuard::new(RouteTable::standard(), config.app_title.clone()),
        }
    }

    /// Token storage follows `config.token_file`: a file when set, memory
    /// otherwise.
    pub fn from_config(config: &ClientConfig, transport: impl Transport + 'static) -> Self {
        match &config.token_file {
            Some(path) => Self::new(config, transport, FileTokenStorage::new(path.clone())),
            None => Self::new(config, transport, MemoryTokenStorage::new()),
        }
    }

    /// Restore a persisted session, if any.
    pub fn initialize(&mut self) {
        self.user.initialize_auth(&mut self.backend);
        self.drop_records_if_signed_out();
        info!(authenticated = self.user.is_authenticated(), "context initialized");
    }

    pub fn is_authenticated(&self) -> bool {
        self.user.is_authenticated()
    }

    /// The session store, read-only.
    pub fn user(&self) -> &UserStore {
        &self.user
    }

    /// Sign in. Records cached for an earlier session are dropped.
    pub fn login(&mut self, email: &str, password: &str) -> Result<(), ApiError> {
        let result = self.user.login(&mut self.backend, email, password);
        self.after_sign_in(&result);
        result
    }

    /// Create an account and sign in with it.
    pub fn register(&mut self, new_user: &NewUser) -> Result<(), ApiError> {
        let result = self.user.register(&mut self.backend, new_user);
        self.after_sign_in(&result);
        result
    }

    /// Reload the profile. A rejected session ends here too.
    pub fn refresh_user(&mut self) -> Option<&User> {
        self.user.fetch_user_data(&mut self.backend);
        self.drop_records_if_signed_out();
        self.user.user()
    }

    pub fn update_profile(&mut self, update: &ProfileUpdate) -> Result<&User, ApiError> {
        self.user.update_profile(&self.backend, update)
    }

    pub fn change_password(&mut self, change: &PasswordChange) -> Result<(), ApiError> {
        self.user.change_password(&self.backend, change)
    }

    /// Delete the account; on success the session and its records are gone.
    pub fn delete_account(&mut self) -> Result<(), ApiError> {
        let result = self.user.delete_account(&mut self.backend);
        self.drop_records_if_signed_out();
        result
    }

    pub fn clear_user_error(&mut self) {
        self.user.clear_error();
    }

    /// Run the guard for `path`, following redirects, and return the final
    /// destination with its page title.
    pub fn navigate(&self, path: &str) -> Transition {
        let authenticated = self.user.is_authenticated();
        let mut target = path.to_string();
        let mut redirected = false;
        for _ in 0..MAX_REDIRECTS {
            match self.guard.before_each(&target, authenticated) {
                Navigation::Proceed => break,
                Navigation::Redirect(next) => {
                    redirected = true;
                    target = next;
                }
            }
        }
        Transition {
            title: self.guard.title_for(&target),
            path: target,
            redirected,
        }
    }

    /// End the session and drop every cached domain record with it.
    pub fn logout(&mut self) {
        self.user.logout(&mut self.backend);
        self.drop_records();
    }

    fn after_sign_in(&mut self, result: &Result<(), ApiError>) {
        if result.is_ok() {
            self.drop_records();
        }
        self.drop_records_if_signed_out();
    }

    fn drop_records_if_signed_out(&mut self) {
        if !self.user.is_authenticated() {
            self.drop_records();
        }
    }

    fn drop_records(&mut self) {
        self.pregnancy = PregnancyStore::new();
        self.children = ChildrenStore::new();
        self.health = HealthStore::new();
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::transport::testing::ScriptedTransport;

    fn user_json() -> serde_json::Value {
        json!({
            "id": 1,
            "email": "mama@example.com",
            "first_name": "Neema",
            "is_active": true,
            "created_at": "2024-01-01T08:00:00",
            "updated_at": "2024-01-01T08:00:00"
        })
    }

    #[test]
    fn anonymous_navigation_redirects_to_login() {
        let ctx = AppContext::new(&ClientConfig::default(), ScriptedTransport::default(), MemoryTokenStorage::new());
        let transition = ctx.navigate("/children");
        assert_eq!(transition.path, "/login");
        assert_eq!(transition.title, "Login - Mamatoto");
        assert!(transition.redirected);
    }

    #[test]
    fn initialize_restores_persisted_session() {
        let transport = ScriptedTransport::default();
        transport.reply(200, user_json());
        let mut ctx = AppContext::new(
            &ClientConfig::default(),
            transport.clone(),
            MemoryTokenStorage::with_token("persisted"),
        );
        ctx.initialize();
        assert!(ctx.is_authenticated());
        assert_eq!(
            transport.last_request().header("authorization"),
            Some("Bearer persisted")
        );
        assert_eq!(transport.last_request().path, "http://localhost:8000/auth/me");

        let transition = ctx.navigate("/login");
        assert_eq!(transition.path, "/");
        assert_eq!(transition.title, "Dashboard - Mamatoto");
    }

    #[test]
    fn rejected_token_leaves_session_anonymous() {
        let transport = ScriptedTransport::default();
        transport.reply(401, json!({"detail": "Could not validate credentials"}));
        let storage = MemoryTokenStorage::with_token("stale");
        let mut ctx = AppContext::new(&ClientConfig::default(), transport, storage.clone());
        ctx.initialize();
        assert!(!ctx.is_authenticated());
        assert!(storage.peek().is_none());
        assert_eq!(ctx.navigate("/profile").path, "/login");
    }

    #[test]
    fn logout_drops_cached_records() {
        let transport = ScriptedTransport::default();
        transport.reply(200, user_json()).reply(
            200,
            json!([{
                "id": 3,
                "user_id": 1,
                "name": "Amani",
                "birth_date": "2023-06-01",
                "is_active": true,
                "created_at": "2023-06-02T09:00:00",
                "updated_at": "2023-06-02T09:00:00"
            }]),
        );
        let mut ctx = AppContext::new(
            &ClientConfig::default(),
            transport.clone(),
            MemoryTokenStorage::with_token("t"),
        );
        ctx.initialize();
        ctx.children.fetch_all(&ctx.backend).unwrap();
        assert_eq!(ctx.children.children().len(), 1);

        ctx.logout();
        assert!(ctx.children.children().is_empty());
        assert!(!ctx.is_authenticated());
        assert!(ctx.backend.client().token().is_none());
        assert_eq!(transport.request_count(), 2);
    }

    fn child_listing() -> serde_json::Value {
        json!([{
            "id": 3,
            "user_id": 1,
            "name": "Amani",
            "birth_date": "2023-06-01",
            "created_at": "2023-06-02T09:00:00",
            "updated_at": "2023-06-02T09:00:00"
        }])
    }

    fn signed_in_with_children(transport: &ScriptedTransport) -> AppContext {
        transport.reply(200, user_json()).reply(200, child_listing());
        let mut ctx = AppContext::new(
            &ClientConfig::default(),
            transport.clone(),
            MemoryTokenStorage::with_token("t"),
        );
        ctx.initialize();
        ctx.children.fetch_all(&ctx.backend).unwrap();
        assert_eq!(ctx.children.children().len(), 1);
        ctx
    }

    #[test]
    fn delete_account_drops_cached_records() {
        let transport = ScriptedTransport::default();
        let mut ctx = signed_in_with_children(&transport);
        transport.reply(204, serde_json::Value::Null);

        ctx.delete_account().unwrap();
        assert!(!ctx.is_authenticated());
        assert!(ctx.children.children().is_empty());
    }

    #[test]
    fn failed_account_deletion_keeps_the_session() {
        let transport = ScriptedTransport::default();
        let mut ctx = signed_in_with_children(&transport);
        transport.reply(500, json!({"detail": "Try again later"}));

        assert!(ctx.delete_account().is_err());
        assert!(ctx.is_authenticated());
        assert_eq!(ctx.user().error(), Some("Try again later"));
        assert_eq!(ctx.children.children().len(), 1);
    }

    #[test]
    fn rejected_profile_refresh_drops_cached_records() {
        let transport = ScriptedTransport::default();
        let mut ctx = signed_in_with_children(&transport);
        transport.reply(401, json!({"detail": "Token expired"}));

        assert!(ctx.refresh_user().is_none());
        assert!(!ctx.is_authenticated());
        assert!(ctx.children.children().is_empty());
    }

    #[test]
    fn signing_in_again_starts_with_empty_caches() {
        let transport = ScriptedTransport::default();
        let mut ctx = signed_in_with_children(&transport);
        transport
            .reply(200, json!({"access_token": "other"}))
            .reply(200, user_json());

        ctx.login("someone@example.com", "secret").unwrap();
        assert!(ctx.is_authenticated());
        assert!(ctx.children.children().is_empty());
        assert_eq!(ctx.backend.client().token(), Some("other"));
    }

    #[test]
    fn failed_login_keeps_current_session() {
        let transport = ScriptedTransport::default();
        let mut ctx = signed_in_with_children(&transport);
        transport.reply(401, json!({"detail": "Incorrect email or password"}));

        assert!(ctx.login("someone@example.com", "wrong").is_err());
        assert!(ctx.is_authenticated());
        assert_eq!(ctx.user().error(), Some("Incorrect email or password"));
        assert_eq!(ctx.children.children().len(), 1);
        ctx.clear_user_error();
        assert!(ctx.user().error().is_none());
    }

    #[test]
    fn from_config_uses_token_file() {
        let dir = tempfile::tempdir().unwrap();
        let config = ClientConfig {
            token_file: Some(dir.path().join("session.json")),
            ..ClientConfig::default()
        };
        let ctx = AppContext::from_config(&config, ScriptedTransport::default());
        assert!(!ctx.is_authenticated());
        assert_eq!(ctx.backend.client().base_url(), "http://localhost:8000");
    }
}
