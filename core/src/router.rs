//! Route metadata and the authentication guard run before every navigation.

use std::fmt;

pub const LOGIN_PATH: &str = "/login";
pub const HOME_PATH: &str = "/";

/// Named destinations in the application.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RouteName {
    Dashboard,
    Login,
    Register,
    Pregnancy,
    Children,
    HealthRecords,
    Chatbot,
    Profile,
}

impl RouteName {
    pub fn as_str(self) -> &'static str {
        match self {
            RouteName::Dashboard => "Dashboard",
            RouteName::Login => "Login",
            RouteName::Register => "Register",
            RouteName::Pregnancy => "Pregnancy",
            RouteName::Children => "Children",
            RouteName::HealthRecords => "HealthRecords",
            RouteName::Chatbot => "Chatbot",
            RouteName::Profile => "Profile",
        }
    }

    /// Login and registration are only for anonymous sessions.
    fn is_guest_only(self) -> bool {
        matches!(self, RouteName::Login | RouteName::Register)
    }
}

impl fmt::Display for RouteName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Route {
    pub name: RouteName,
    pub path: &'static str,
    pub requires_auth: bool,
    pub title: &'static str,
}

#[derive(Debug, Clone)]
pub struct RouteTable {
    routes: Vec<Route>,
}

impl RouteTable {
    pub fn new(routes: Vec<Route>) -> Self {
        Self { routes }
    }

    /// The application's routes.
    pub fn standard() -> Self {
        const fn route(name: RouteName, path: &'static str, requires_auth: bool, title: &'static str) -> Route {
            Route {
                name,
                path,
                requires_auth,
                title,
            }
        }
        Self::new(vec![
            route(RouteName::Dashboard, "/", true, "Dashboard"),
            route(RouteName::Login, "/login", false, "Login"),
            route(RouteName::Register, "/register", false, "Register"),
            route(RouteName::Pregnancy, "/pregnancy", true, "Pregnancy Tracker"),
            route(RouteName::Children, "/children", true, "Children"),
            route(RouteName::HealthRecords, "/health", true, "Health Records"),
            route(RouteName::Chatbot, "/chat", true, "Health Assistant"),
            route(RouteName::Profile, "/profile", true, "Profile"),
        ])
    }

    pub fn routes(&self) -> &[Route] {
        &self.routes
    }

    /// Match `path` ignoring any query, fragment or trailing slash.
    pub fn resolve(&self, path: &str) -> Option<&Route> {
        let path = normalize(path);
        self.routes.iter().find(|route| route.path == path)
    }

    pub fn by_name(&self, name: RouteName) -> Option<&Route> {
        self.routes.iter().find(|route| route.name == name)
    }
}

fn normalize(path: &str) -> &str {
    let end = path.find(['?', '#']).unwrap_or(path.len());
    let path = &path[..end];
    match path.trim_end_matches('/') {
        "" => HOME_PATH,
        trimmed => trimmed,
    }
}

/// Outcome of the guard for one transition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Navigation {
    Proceed,
    Redirect(String),
}

#[derive(Debug, Clone)]
pub struct NavigationGuard {
    table: RouteTable,
    app_title: String,
}

impl Default for NavigationGuard {
    fn default() -> Self {
        Self::new(RouteTable::standard(), "Mamatoto")
    }
}

impl NavigationGuard {
    pub fn new(table: RouteTable, app_title: impl Into<String>) -> Self {
        Self {
            table,
            app_title: app_title.into(),
        }
    }

    pub fn table(&self) -> &RouteTable {
        &self.table
    }

    /// Anonymous sessions are sent to login from protected routes;
    /// authenticated sessions are sent home from login and registration.
    /// Unknown paths proceed.
    pub fn before_each(&self, to: &str, is_authenticated: bool) -> Navigation {
        let Some(route) = self.table.resolve(to) else {
            return Navigation::Proceed;
        };
        if route.requires_auth && !is_authenticated {
            tracing::debug!(route = %route.name, "anonymous session redirected to login");
            Navigation::Redirect(LOGIN_PATH.to_string())
        } else if route.name.is_guest_only() && is_authenticated {
            Navigation::Redirect(HOME_PATH.to_string())
        } else {
            Navigation::Proceed
        }
    }

    /// `"<title> - Mamatoto"`, or the bare app title without route metadata.
    pub fn page_title(&self, route: Option<&Route>) -> String {
        match route {
            Some(route) if !route.title.is_empty() => format!("{} - {}", route.title, self.app_title),
            _ => self.app_title.clone(),
        }
    }

    pub fn title_for(&self, path: &str) -> String {
        self.page_title(self.table.resolve(path))
    }
}
