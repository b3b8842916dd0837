//! HTTP request, as seen by a layout controller.
use std::sync::Arc;

use time::OffsetDateTime;

use super::Cookies;

/// The controller and action selected by the router.
///
/// Views are found by convention from the route: `<directory>/<controller>/<action>`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Route {
    directory: String,
    controller: String,
    action: Option<String>,
}

impl Route {
    /// Route to a controller, using the default action.
    pub fn new(controller: impl ToString) -> Self {
        Self {
            controller: controller.to_string(),
            ..Default::default()
        }
    }

    /// Set the directory the controller lives in, e.g. `"admin"`.
    pub fn directory(mut self, directory: impl ToString) -> Self {
        self.directory = directory.to_string();
        self
    }

    /// Set the action.
    pub fn action(mut self, action: impl ToString) -> Self {
        self.action = Some(action.to_string());
        self
    }

    pub fn directory_name(&self) -> &str {
        &self.directory
    }

    pub fn controller_name(&self) -> &str {
        &self.controller
    }

    /// The requested action. `None` or empty means the default action.
    pub fn action_name(&self) -> Option<&str> {
        self.action.as_deref().filter(|action| !action.is_empty())
    }
}

/// HTTP request.
///
/// It's safe and cheap to clone, the contents are behind an [`std::sync::Arc`].
#[derive(Debug, Clone)]
pub struct Request {
    route: Route,
    inner: Arc<Inner>,
    received_at: OffsetDateTime,
}

#[derive(Debug, Default)]
struct Inner {
    path: String,
    cookies: Cookies,
}

impl Default for Request {
    fn default() -> Self {
        Self::new("/", Route::default())
    }
}

impl Request {
    /// Create a request for a path, routed to a controller.
    pub fn new(path: impl ToString, route: Route) -> Self {
        Self {
            route,
            inner: Arc::new(Inner {
                path: path.to_string(),
                cookies: Cookies::new(),
            }),
            received_at: OffsetDateTime::now_utc(),
        }
    }

    /// Attach the cookies sent by the client in the `Cookie` header.
    pub fn with_cookie_header(self, header: &str) -> Self {
        self.with_cookies(Cookies::parse(header))
    }

    pub fn with_cookies(mut self, cookies: Cookies) -> Self {
        self.inner = Arc::new(Inner {
            path: self.inner.path.clone(),
            cookies,
        });
        self
    }

    pub fn path(&self) -> &str {
        &self.inner.path
    }

    pub fn route(&self) -> &Route {
        &self.route
    }

    pub fn directory(&self) -> &str {
        self.route.directory_name()
    }

    pub fn controller(&self) -> &str {
        self.route.controller_name()
    }

    pub fn action(&self) -> Option<&str> {
        self.route.action_name()
    }

    pub fn cookies(&self) -> &Cookies {
        &self.inner.cookies
    }

    /// When the request was received.
    pub fn received_at(&self) -> OffsetDateTime {
        self.received_at
    }
}
