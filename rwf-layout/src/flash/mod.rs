//! Flash messages, data passed from one request to the next.
//!
//! Flash data set during a request is available for the rest of that request and during the
//! next one. Reading a value with [`Flash::get`] consumes it: it stays readable for the
//! rest of the current request, but the next request won't see it. Anything not read
//! is gone after the next request, unless it's set again.
//!
//! The typical use is a notice shown after a redirect:
//!
//! ```
//! use rwf_layout::flash::{Flash, Notice};
//! use rwf_layout::http::{Request, Response};
//! use rwf_layout::session::{Sessions, SessionStores};
//! use rwf_layout::view::Views;
//! use std::sync::Arc;
//!
//! # fn main() -> Result<(), rwf_layout::Error> {
//! let views = Arc::new(Views::new("templates"));
//!
//! // Request 1: save a post, then redirect.
//! let request = Request::default();
//! let mut sessions = Sessions::new(&request, SessionStores::default());
//! let mut flash = Flash::new(&mut sessions, views.clone())?;
//! flash.set("notice", Notice::confirm("Post saved"))?;
//!
//! let mut response = Response::new().redirect("/posts");
//! sessions.save(&mut response)?;
//!
//! // Request 2: the browser sends the session cookie back.
//! let request = Request::default().with_cookies(response.set_cookies().clone());
//! let mut sessions = Sessions::new(&request, SessionStores::default());
//! let mut flash = Flash::new(&mut sessions, views.clone())?;
//! let notice = flash.get("notice")?;
//!
//! assert_eq!(notice, Some(serde_json::json!({"confirm": "Post saved"})));
//! # Ok(())
//! # }
//! ```
//!
//! Flash state belongs to a single request, it's never shared between requests handled
//! at the same time.
use std::sync::Arc;

use serde::Serialize;
use serde_json::{Map, Value};

use crate::config::{get_config, Config, FlashConfig};
use crate::session::Sessions;
use crate::view::{to_map, Views};
use crate::Error;

pub mod notice;
pub use notice::Notice;

/// Source of the default flash view, shipped as `templates/_flash.html`.
pub const DEFAULT_VIEW: &str = include_str!("../../templates/_flash.html");

/// Flash messages for the current request.
///
/// The flash state itself lives in the request's [`Sessions`], so any number of `Flash`
/// values created during a request share it.
pub struct Flash<'a> {
    sessions: &'a mut Sessions,
    views: Arc<Views>,
    config: FlashConfig,
}

impl<'a> Flash<'a> {
    /// Flash messages stored in the request's sessions, configured globally.
    ///
    /// Fails if the config file couldn't be loaded.
    pub fn new(sessions: &'a mut Sessions, views: Arc<Views>) -> Result<Self, Error> {
        Self::from_config(sessions, views, get_config())
    }

    /// Flash messages using the flash settings of this configuration.
    pub fn from_config(
        sessions: &'a mut Sessions,
        views: Arc<Views>,
        config: &Config,
    ) -> Result<Self, Error> {
        let config = config.flash()?.clone();
        Ok(Self::with_config(sessions, views, config))
    }

    /// Flash messages with specific settings.
    pub fn with_config(sessions: &'a mut Sessions, views: Arc<Views>, config: FlashConfig) -> Self {
        Self {
            sessions,
            views,
            config,
        }
    }

    pub fn config(&self) -> &FlashConfig {
        &self.config
    }

    /// Register the shipped flash view under the configured default view name,
    /// unless the application has its own view with that name.
    pub fn register_default_view(views: &Views, config: &FlashConfig) -> Result<(), Error> {
        if !views.exists(&config.default_view) {
            views.register(&config.default_view, DEFAULT_VIEW)?;
        }

        Ok(())
    }

    /// Data readable during this request, and the session slot read by the next one.
    fn state(&mut self) -> Result<(&mut Map<String, Value>, &mut Map<String, Value>), Error> {
        self.sessions
            .flash(&self.config.session_group, &self.config.session_key)
    }

    /// Get a variable and remove it from the next request.
    /// It stays available for the rest of this request.
    pub fn get(&mut self, key: &str) -> Result<Option<Value>, Error> {
        let (data, next) = self.state()?;
        next.remove(key);

        Ok(data.get(key).cloned())
    }

    /// Get a variable, or `default` if it's not set.
    pub fn get_or(&mut self, key: &str, default: impl Into<Value>) -> Result<Value, Error> {
        Ok(self.get(key)?.unwrap_or_else(|| default.into()))
    }

    /// Get all variables and remove them from the next request.
    ///
    /// Returns `None` if there are no variables.
    pub fn get_all(&mut self) -> Result<Option<Map<String, Value>>, Error> {
        let (data, next) = self.state()?;
        next.clear();

        if data.is_empty() {
            Ok(None)
        } else {
            Ok(Some(data.clone()))
        }
    }

    /// Get all variables as a map, or `default` if there are none.
    pub fn get_all_or(&mut self, default: impl Into<Value>) -> Result<Value, Error> {
        Ok(self
            .get_all()?
            .map(Value::Object)
            .unwrap_or_else(|| default.into()))
    }

    /// Set a variable for this request and the next one.
    pub fn set(&mut self, key: &str, value: impl Serialize) -> Result<(), Error> {
        let value = serde_json::to_value(value)?;
        let (data, next) = self.state()?;

        next.insert(key.to_string(), value.clone());
        data.insert(key.to_string(), value);

        Ok(())
    }

    /// Set multiple variables from anything that serializes to a map.
    pub fn set_many(&mut self, values: impl Serialize) -> Result<(), Error> {
        let values = to_map(values)?;
        let (data, next) = self.state()?;

        for (key, value) in values {
            next.insert(key.clone(), value.clone());
            data.insert(key, value);
        }

        Ok(())
    }

    /// Set a notice. Same as [`Flash::set`].
    pub fn notice(&mut self, key: &str, notice: Notice) -> Result<(), Error> {
        self.set(key, notice)
    }

    /// Remove a variable from this request and the next one.
    pub fn delete(&mut self, key: &str) -> Result<(), Error> {
        let (data, next) = self.state()?;
        data.remove(key);
        next.remove(key);

        Ok(())
    }

    /// Keep a variable for the next request, even if it was read.
    ///
    /// Returns `false` if the variable isn't set.
    pub fn keep(&mut self, key: &str) -> Result<bool, Error> {
        let (data, next) = self.state()?;

        match data.get(key) {
            Some(value) => {
                next.insert(key.to_string(), value.clone());
                Ok(true)
            }
            None => Ok(false),
        }
    }

    /// No variables are available during this request.
    pub fn is_empty(&mut self) -> Result<bool, Error> {
        let (data, _) = self.state()?;
        Ok(data.is_empty())
    }

    /// Render a variable, removing it from the next request.
    ///
    /// Maps are rendered with the view named in their `view` key, or the configured default view.
    /// Anything else is converted to text. Missing variables render as an empty string.
    pub fn render(&mut self, key: &str) -> Result<String, Error> {
        let value = self.get_or(key, "")?;
        self.render_value(value)
    }

    /// Render all variables with the default view, removing them from the next request.
    pub fn render_all(&mut self) -> Result<String, Error> {
        let value = self.get_all_or("")?;
        self.render_value(value)
    }

    fn render_value(&self, value: Value) -> Result<String, Error> {
        match value {
            Value::Object(data) => {
                let view = match data.get("view") {
                    Some(Value::String(view)) => view.clone(),
                    _ => self.config.default_view.clone(),
                };

                Ok(self.views.render(&view, &data)?)
            }
            Value::String(text) => Ok(text),
            Value::Null => Ok(String::new()),
            value => Ok(value.to_string()),
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::http::{Cookies, Request, Response};
    use crate::session::{MemoryStore, SessionStores};
    use serde_json::json;

    /// Sends requests and keeps cookies between them, like a browser.
    struct Browser {
        cookies: Cookies,
        stores: SessionStores,
        views: Arc<Views>,
    }

    impl Browser {
        fn new() -> Self {
            Self::with_stores(SessionStores::default())
        }

        fn with_stores(stores: SessionStores) -> Self {
            let views = Views::new("templates");
            Flash::register_default_view(&views, &FlashConfig::default()).expect("default view");
            views.register("notices/custom", "custom: {{text}}").expect("view");

            Self {
                cookies: Cookies::new(),
                stores,
                views: Arc::new(views),
            }
        }

        fn request<T>(&mut self, f: impl FnOnce(&mut Flash<'_>) -> Result<T, Error>) -> T {
            let request = Request::default().with_cookies(self.cookies.clone());
            let mut sessions = Sessions::new(&request, self.stores.clone());

            let result = {
                let mut flash =
                    Flash::with_config(&mut sessions, self.views.clone(), FlashConfig::default());
                f(&mut flash).expect("flash")
            };

            let mut response = Response::new();
            sessions.save(&mut response).expect("save");
            self.cookies.extend(response.set_cookies());

            result
        }
    }

    #[test]
    fn test_set_then_get_same_request() {
        let mut browser = Browser::new();

        browser.request(|flash| {
            flash.set("notice", "saved")?;
            assert_eq!(flash.get("notice")?, Some(json!("saved")));
            assert_eq!(flash.get("notice")?, Some(json!("saved")));
            Ok(())
        });

        // Read during the first request, so gone now.
        let value = browser.request(|flash| flash.get_or("notice", "none"));
        assert_eq!(value, json!("none"));
    }

    #[test]
    fn test_survives_one_request() {
        let mut browser = Browser::new();

        browser.request(|flash| flash.set("notice", "saved"));

        let value = browser.request(|flash| flash.get("notice"));
        assert_eq!(value, Some(json!("saved")));

        let value = browser.request(|flash| flash.get("notice"));
        assert_eq!(value, None);
    }

    #[test]
    fn test_unread_expires_after_next_request() {
        let mut browser = Browser::new();

        browser.request(|flash| flash.set("notice", "saved"));
        // Touch the flash without reading the notice.
        let empty = browser.request(|flash| flash.is_empty());
        assert!(!empty);

        let value = browser.request(|flash| flash.get("notice"));
        assert_eq!(value, None);
    }

    #[test]
    fn test_untouched_flash_waits() {
        let mut browser = Browser::new();

        browser.request(|flash| flash.set("notice", "saved"));
        // Requests that never use the flash don't consume it.
        browser.request(|_| Ok(()));

        let value = browser.request(|flash| flash.get("notice"));
        assert_eq!(value, Some(json!("saved")));
    }

    #[test]
    fn test_delete() {
        let mut browser = Browser::new();

        browser.request(|flash| {
            flash.set("notice", "saved")?;
            flash.delete("notice")?;
            assert_eq!(flash.get_or("notice", "default")?, json!("default"));
            Ok(())
        });

        let value = browser.request(|flash| flash.get_or("notice", "default"));
        assert_eq!(value, json!("default"));
    }

    #[test]
    fn test_delete_previous_request_value() {
        let mut browser = Browser::new();

        browser.request(|flash| flash.set("notice", "saved"));
        browser.request(|flash| {
            flash.delete("notice")?;
            assert_eq!(flash.get("notice")?, None);
            Ok(())
        });
    }

    #[test]
    fn test_get_all() {
        let mut browser = Browser::new();

        browser.request(|flash| flash.set_many(json!({"notice": "saved", "count": 3})));

        browser.request(|flash| {
            let all = flash.get_all()?.expect("flash data");
            assert_eq!(Value::Object(all), json!({"notice": "saved", "count": 3}));

            // Still readable during this request.
            assert_eq!(flash.get("count")?, Some(json!(3)));

            // Set after clearing, visible next time.
            flash.set("error", "oops")
        });

        let all = browser.request(|flash| flash.get_all_or(json!({})));
        assert_eq!(all, json!({"error": "oops"}));
    }

    #[test]
    fn test_get_all_empty() {
        let mut browser = Browser::new();
        let value = browser.request(|flash| flash.get_all_or("nothing"));
        assert_eq!(value, json!("nothing"));
    }

    #[test]
    fn test_overwrite() {
        let mut browser = Browser::new();

        browser.request(|flash| flash.set("notice", "first"));
        browser.request(|flash| {
            assert_eq!(flash.get("notice")?, Some(json!("first")));
            flash.set("notice", "second")?;
            assert_eq!(flash.get("notice")?, Some(json!("second")));
            flash.set("notice", "third")
        });

        let value = browser.request(|flash| flash.get("notice"));
        assert_eq!(value, Some(json!("third")));
    }

    #[test]
    fn test_keep() {
        let mut browser = Browser::new();

        browser.request(|flash| flash.set("notice", "saved"));
        browser.request(|flash| {
            assert_eq!(flash.get("notice")?, Some(json!("saved")));
            assert!(flash.keep("notice")?);
            assert!(!flash.keep("missing")?);
            Ok(())
        });

        let value = browser.request(|flash| flash.get("notice"));
        assert_eq!(value, Some(json!("saved")));
    }

    #[test]
    fn test_render_scalar() {
        let mut browser = Browser::new();

        browser.request(|flash| flash.set_many(json!({"notice": "saved", "count": 3})));

        let (notice, count, missing) = browser.request(|flash| {
            Ok((
                flash.render("notice")?,
                flash.render("count")?,
                flash.render("missing")?,
            ))
        });

        assert_eq!(notice, "saved");
        assert_eq!(count, "3");
        assert_eq!(missing, "");
    }

    #[test]
    fn test_render_notice() {
        let mut browser = Browser::new();

        browser.request(|flash| {
            flash.notice(
                "errors",
                Notice::error("Post not saved").list(["Title is blank", "<b>Body</b> is blank"]),
            )?;
            flash.notice("custom", Notice::confirm("Saved").text("done").view("notices/custom"))
        });

        let (errors, custom) =
            browser.request(|flash| Ok((flash.render("errors")?, flash.render("custom")?)));

        assert!(errors.contains(r#"<div id="notices" class="error">"#));
        assert!(errors.contains("<h3>Post not saved</h3>"));
        assert!(errors.contains("<li>Title is blank</li>"));
        assert!(errors.contains("<li>&lt;b&gt;Body&lt;/b&gt; is blank</li>"));
        assert_eq!(custom, "custom: done");
    }

    #[test]
    fn test_render_notice_text() {
        let mut browser = Browser::new();

        browser.request(|flash| {
            flash.notice("plain", Notice::confirm("Saved").text("Tom & Jerry"))?;
            flash.notice("markup", Notice::confirm("Saved").text("<ul><li>one</li></ul>"))
        });

        let (plain, markup) =
            browser.request(|flash| Ok((flash.render("plain")?, flash.render("markup")?)));

        assert!(plain.contains("<p>Tom &amp; Jerry</p>"));
        assert!(markup.contains("<ul><li>one</li></ul>"));
        assert!(!markup.contains("<p>"));
    }

    #[test]
    fn test_render_all() {
        let mut browser = Browser::new();

        browser.request(|flash| {
            flash.set("confirm", "Welcome back")?;
            flash.set("id", "welcome")
        });

        let html = browser.request(|flash| flash.render_all());
        assert!(html.contains(r#"<div id="welcome" class="confirmation">"#));
        assert!(html.contains("<h3>Welcome back</h3>"));

        let html = browser.request(|flash| flash.render_all());
        assert_eq!(html, "");
    }

    #[test]
    fn test_memory_store_group() {
        let stores = SessionStores::empty().group("native", MemoryStore::new());
        let mut browser = Browser::with_stores(stores);
        let config = FlashConfig {
            session_group: "native".into(),
            ..Default::default()
        };

        let views = browser.views.clone();
        let request = Request::default();
        let mut sessions = Sessions::new(&request, browser.stores.clone());
        let mut flash = Flash::with_config(&mut sessions, views.clone(), config.clone());
        flash.set("notice", "saved").unwrap();

        let mut response = Response::new();
        sessions.save(&mut response).unwrap();
        browser.cookies.extend(response.set_cookies());
        assert!(browser.cookies.get("rwf_sid_native").is_some());

        let request = Request::default().with_cookies(browser.cookies.clone());
        let mut sessions = Sessions::new(&request, browser.stores.clone());
        let mut flash = Flash::with_config(&mut sessions, views, config);
        assert_eq!(flash.get("notice").unwrap(), Some(json!("saved")));
    }

    #[test]
    fn test_shared_state_within_request() {
        let mut browser = Browser::new();
        let request = Request::default();
        let mut sessions = Sessions::new(&request, browser.stores.clone());

        {
            let mut first =
                Flash::with_config(&mut sessions, browser.views.clone(), FlashConfig::default());
            first.set("notice", "saved").unwrap();
        }

        {
            let mut second =
                Flash::with_config(&mut sessions, browser.views.clone(), FlashConfig::default());
            assert_eq!(second.get("other").unwrap(), None);
            assert!(!second.is_empty().unwrap());
        }

        let mut response = Response::new();
        sessions.save(&mut response).unwrap();
        browser.cookies.extend(response.set_cookies());

        let value = browser.request(|flash| flash.get("notice"));
        assert_eq!(value, Some(json!("saved")));
    }

    #[test]
    fn test_config_failed_to_load() {
        let err = Config::from_str("[flash]\nsession_group = \"native\"\n").unwrap_err();
        let config = Config::fallback(&err);

        let views = Arc::new(Views::new("templates"));
        let request = Request::default();
        let mut sessions = Sessions::new(&request, SessionStores::default());

        assert!(matches!(
            Flash::from_config(&mut sessions, views.clone(), &config),
            Err(Error::Config(_))
        ));

        let config = Config::from_str("").unwrap();
        assert!(Flash::from_config(&mut sessions, views, &config).is_ok());
    }

    #[test]
    fn test_unknown_group() {
        let views = Arc::new(Views::new("templates"));
        let request = Request::default();
        let mut sessions = Sessions::new(&request, SessionStores::empty());
        let mut flash = Flash::with_config(&mut sessions, views, FlashConfig::default());

        assert!(matches!(
            flash.set("notice", "saved"),
            Err(Error::UnknownSessionGroup(_))
        ));
    }
}
