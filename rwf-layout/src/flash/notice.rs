//! Notices, the most common kind of flash message.
use serde::{Deserialize, Serialize};

/// A notice shown to the user on the next page, e.g. "Post saved".
///
/// Notices serialize to the variables expected by the default flash view
/// (`templates/_flash.html`).
///
/// # Example
///
/// ```
/// use rwf_layout::flash::Notice;
///
/// let notice = Notice::error("Post not saved")
///     .text("Please fix the errors below.")
///     .list(["Title can't be blank"]);
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Notice {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub errors: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub confirm: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    /// HTML id of the notice element.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    /// View used instead of the configured default.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub view: Option<String>,
}

impl Notice {
    /// Error notice with a heading.
    pub fn error(heading: impl ToString) -> Self {
        Self {
            error: Some(heading.to_string()),
            ..Default::default()
        }
    }

    /// Confirmation notice with a heading.
    pub fn confirm(heading: impl ToString) -> Self {
        Self {
            confirm: Some(heading.to_string()),
            ..Default::default()
        }
    }

    /// Error notice listing several errors, e.g. form validation failures.
    pub fn errors(errors: impl IntoIterator<Item = impl ToString>) -> Self {
        Self::default().list(errors)
    }

    pub fn text(mut self, text: impl ToString) -> Self {
        self.text = Some(text.to_string());
        self
    }

    pub fn list(mut self, errors: impl IntoIterator<Item = impl ToString>) -> Self {
        self.errors
            .extend(errors.into_iter().map(|error| error.to_string()));
        self
    }

    pub fn id(mut self, id: impl ToString) -> Self {
        self.id = Some(id.to_string());
        self
    }

    pub fn view(mut self, view: impl ToString) -> Self {
        self.view = Some(view.to_string());
        self
    }
}
