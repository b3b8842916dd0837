//! Page layouts and flash messages for web applications.
//!
//! A controller action fills in the content of a page; the page is then wrapped in a template
//! shared by the whole application, e.g. the `<html>` document with navigation and footer.
//! Templates can be nested: a section of the site can insert its own template, like a sidebar,
//! between the outer template and the content.
//!
//! Flash messages carry data across a redirect, typically a notice like "Post saved".
//!
//! Everything needed to write controllers can be imported at once:
//!
//! ```
//! use rwf_layout::prelude::*;
//! ```
//!
//! ### Controllers
//!
//! Implement [`controller::LayoutController`] for a struct. The content view is picked by
//! convention from the route, e.g. `templates/posts/list.html` for the `list` action of
//! the `posts` controller, and rendered inside `templates/template.html`:
//!
//! ```rust
//! use rwf_layout::prelude::*;
//!
//! struct Posts;
//!
//! #[async_trait]
//! impl LayoutController for Posts {
//!     async fn action(
//!         &self,
//!         request: &Request,
//!         layout: &mut Layout,
//!         flash: &mut Flash<'_>,
//!     ) -> Result<(), Error> {
//!         match request.action() {
//!             Some("create") => {
//!                 flash.notice("notice", Notice::confirm("Post saved"))?;
//!                 layout.redirect("/posts/list");
//!             }
//!
//!             _ => {
//!                 layout.extend_template("sidebar")?;
//!                 layout.render_data(serde_json::json!({"posts": ["Hello"]}))?;
//!             }
//!         }
//!
//!         Ok(())
//!     }
//! }
//! ```
//!
//! ### Views
//!
//! Views are [Handlebars](https://handlebarsjs.com/) templates. Every template prints the
//! view it wraps with `{{{content}}}`.
//!
//! ### Configuration
//!
//! Settings are read from `rwf.toml` in the working directory, see [`config`].
pub mod colors;
pub mod config;
pub mod controller;
pub mod crypto;
pub mod error;
pub mod flash;
pub mod http;
pub mod logging;
pub mod prelude;
pub mod session;
pub mod view;

pub use error::Error;

/// Wrapper around async traits to make them easy to use.
pub use async_trait::async_trait;
/// Serde is used for (de)serialization.
pub use serde;
/// Tokio is an asynchronous runtime for Rust.
pub use tokio;

/// Remove unsafe characters from a string printed
/// inside an HTML page.
pub fn safe_html(string: &str) -> String {
    handlebars::html_escape(string)
}
