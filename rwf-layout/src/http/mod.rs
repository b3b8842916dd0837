//! The slice of HTTP that layouts and flash messages rely on.
//!
//! Requests carry the route that selected the controller (used to find views by convention)
//! and the client's cookies (used by session stores). Responses carry the rendered page
//! and the cookies to send back.
pub mod cookies;
pub mod error;
pub mod request;
pub mod response;

pub use cookies::{Cookie, CookieBuilder, Cookies, ToCookie};
pub use error::Error;
pub use request::{Request, Route};
pub use response::{Response, Status};
