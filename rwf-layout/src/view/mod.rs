//! Views, the **V** in MVC.
//!
//! A [`View`] pairs a view file with the variables it's rendered with, and can nest other views.
//! [`Views`] finds view files by name and renders them with Handlebars, caching compiled
//! templates in production.
pub mod cache;
pub mod error;
pub mod node;
pub mod views;

pub use cache::Templates;
pub use error::Error;
pub use node::{to_map, View};
pub use views::Views;
