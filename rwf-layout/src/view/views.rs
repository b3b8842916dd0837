//! View files lookup and rendering.
use std::path::{Path, PathBuf};
use std::sync::Arc;

use once_cell::sync::Lazy;
use parking_lot::RwLock;
use serde_json::{Map, Value};
use tracing::debug;

use super::{cache::Templates, Error};
use crate::colors::MaybeColorize;
use crate::config::get_config;

static VIEWS: Lazy<Arc<Views>> = Lazy::new(|| Arc::new(Views::from_config()));

/// Finds view files by name and renders them with Handlebars.
///
/// A view named `posts/list` lives in `<root>/posts/list.<extension>`.
///
/// # Example
///
/// ```
/// use rwf_layout::view::Views;
/// use serde_json::json;
///
/// let views = Views::new("templates");
/// views.register("hello", "<h1>{{title}}</h1>").unwrap();
///
/// let data = json!({"title": "Hello"}).as_object().cloned().unwrap();
/// assert_eq!(views.render("hello", &data).unwrap(), "<h1>Hello</h1>");
/// ```
pub struct Views {
    root: PathBuf,
    extension: String,
    templates: RwLock<Templates>,
}

impl std::fmt::Debug for Views {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Views")
            .field("root", &self.root)
            .field("extension", &self.extension)
            .finish()
    }
}

impl Views {
    /// Views stored in this directory, using the configured file extension and cache setting.
    pub fn new(root: impl AsRef<Path>) -> Self {
        let general = &get_config().general;

        Self {
            root: root.as_ref().to_owned(),
            extension: general.view_extension.clone(),
            templates: RwLock::new(Templates::new(general.cache_templates)),
        }
    }

    /// Views stored in the configured directory.
    pub fn from_config() -> Self {
        Self::new(&get_config().general.views)
    }

    /// Shared views engine built from the global configuration.
    pub fn global() -> Arc<Views> {
        VIEWS.clone()
    }

    /// Change the extension of view files.
    pub fn extension(mut self, extension: &str) -> Self {
        self.extension = extension.trim_start_matches('.').to_string();
        self
    }

    /// Enable or disable the templates cache.
    pub fn cache(self, cache: bool) -> Self {
        Self {
            templates: RwLock::new(Templates::new(cache)),
            ..self
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Where the view file with this name would be.
    pub fn path(&self, name: &str) -> PathBuf {
        self.root.join(format!("{}.{}", name, self.extension))
    }

    /// Find the file backing a view, if it exists.
    pub fn find_file(&self, name: &str) -> Option<PathBuf> {
        let path = self.path(name);

        if path.is_file() {
            Some(path)
        } else {
            None
        }
    }

    /// The view exists, either as a file or registered from a string.
    pub fn exists(&self, name: &str) -> bool {
        self.templates.read().inline(name) || self.find_file(name).is_some()
    }

    /// Register a view from a string. It takes precedence over files with the same name.
    pub fn register(&self, name: &str, source: &str) -> Result<(), Error> {
        self.templates.write().insert_inline(name, source)
    }

    /// Render a view with the provided variables.
    pub fn render(&self, name: &str, data: &Map<String, Value>) -> Result<String, Error> {
        self.load(name)?;
        self.templates.read().render(name, data)
    }

    /// Forget templates loaded from disk, they will be read again on next use.
    pub fn reload(&self) {
        self.templates.write().clear();
    }

    fn load(&self, name: &str) -> Result<(), Error> {
        if self.templates.read().loaded(name) {
            return Ok(());
        }

        let path = self
            .find_file(name)
            .ok_or_else(|| Error::TemplateDoesNotExist(self.path(name)))?;
        let source = std::fs::read_to_string(&path)?;

        debug!("{} {}", "loading view".purple(), path.display());

        self.templates.write().insert(name, &source)
    }
}
