//! Compiled templates cache.
//!
//! Using the cache ensures that templates are only read from disk and compiled once.
//! The cache is enabled by default in production (`release`), and disabled
//! in development (`debug`) so edits to view files show up on the next request.
//!
//! Templates registered from strings are never reloaded, regardless of the setting.
use std::collections::HashSet;

use handlebars::{
    html_escape, Context, Handlebars, Helper, HelperResult, JsonRender, Output, RenderContext,
};
use serde::Serialize;

use super::Error;

/// Templates cache.
pub struct Templates {
    registry: Handlebars<'static>,
    inline: HashSet<String>,
    cache: bool,
}

impl Templates {
    /// Create new empty template cache.
    pub fn new(cache: bool) -> Self {
        let mut registry = Handlebars::new();
        registry.register_helper("paragraph", Box::new(paragraph));

        Self {
            registry,
            inline: HashSet::new(),
            cache,
        }
    }

    /// The template is compiled and doesn't need to be read from disk.
    pub fn loaded(&self, name: &str) -> bool {
        self.inline.contains(name) || (self.cache && self.registry.has_template(name))
    }

    /// The template was registered from a string.
    pub fn inline(&self, name: &str) -> bool {
        self.inline.contains(name)
    }

    /// Compile a template read from disk, replacing any previous version.
    pub fn insert(&mut self, name: &str, source: &str) -> Result<(), Error> {
        self.registry
            .register_template_string(name, source)
            .map_err(|err| Error::syntax(name, err))
    }

    /// Compile a template that doesn't live on disk.
    pub fn insert_inline(&mut self, name: &str, source: &str) -> Result<(), Error> {
        self.insert(name, source)?;
        self.inline.insert(name.to_string());
        Ok(())
    }

    /// Render a compiled template.
    pub fn render(&self, name: &str, data: &impl Serialize) -> Result<String, Error> {
        self.registry
            .render(name, data)
            .map_err(|err| Error::render(name, err))
    }

    /// Forget templates loaded from disk.
    pub fn clear(&mut self) {
        let inline = &self.inline;
        let stale = self
            .registry
            .get_templates()
            .keys()
            .filter(|name| !inline.contains(name.as_str()))
            .cloned()
            .collect::<Vec<_>>();

        for name in stale {
            self.registry.unregister_template(&name);
        }
    }

    pub fn len(&self) -> usize {
        self.registry.get_templates().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// `{{paragraph text}}`: text starting with a tag is printed as is,
/// anything else is escaped and wrapped in `<p>`.
fn paragraph(
    h: &Helper,
    _: &Handlebars,
    _: &Context,
    _: &mut RenderContext,
    out: &mut dyn Output,
) -> HelperResult {
    let text = h.param(0).map(|param| param.value().render()).unwrap_or_default();

    if text.is_empty() {
        return Ok(());
    }

    if text.starts_with('<') {
        out.write(&text)?;
    } else {
        out.write(&format!("<p>{}</p>", html_escape(&text)))?;
    }

    Ok(())
}
