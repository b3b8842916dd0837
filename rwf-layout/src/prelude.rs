//! Types and traits used in most controllers.
//!
//! ```
//! use rwf_layout::prelude::*;
//! ```
pub use crate::config::Config;
pub use crate::controller::{Layout, LayoutController, Output};
pub use crate::flash::{Flash, Notice};
pub use crate::http::{Cookie, CookieBuilder, Request, Response, Route};
pub use crate::logging::Logger;
pub use crate::session::{MemoryStore, SessionStores, Sessions};
pub use crate::view::{View, Views};
pub use crate::Error;

/// A macro to easily implement async traits methods.
pub use async_trait::async_trait;

pub use serde::{Deserialize, Serialize};
pub use time::{Duration, OffsetDateTime};
pub use tokio;
