//! A renderable view: a template file, its variables, and nested views.
use std::collections::BTreeMap;

use serde::Serialize;
use serde_json::{Map, Value};

use super::{Error, Views};

/// A view file with the variables it will be rendered with.
///
/// Other views can be bound to a view under a variable name. They are rendered first and
/// their output is available to the parent template under that name. Since rendered views
/// contain HTML, parents should print them unescaped, e.g. `{{{content}}}`.
///
/// # Example
///
/// ```
/// use rwf_layout::view::{View, Views};
///
/// let views = Views::new("templates");
/// views.register("layout", "<main>{{{content}}}</main>").unwrap();
/// views.register("hello", "<h1>{{title}}</h1>").unwrap();
///
/// let mut hello = View::new("hello");
/// hello.set("title", "Hello").unwrap();
///
/// let mut layout = View::new("layout");
/// layout.bind("content", hello);
///
/// assert_eq!(layout.render(&views).unwrap(), "<main><h1>Hello</h1></main>");
/// ```
#[derive(Debug, Clone, Default, PartialEq)]
pub struct View {
    filename: Option<String>,
    data: Map<String, Value>,
    children: BTreeMap<String, View>,
}

impl View {
    /// Create a view backed by the named view file.
    pub fn new(filename: impl ToString) -> Self {
        Self {
            filename: Some(filename.to_string()),
            ..Default::default()
        }
    }

    /// Create a view without a file. One has to be set before rendering.
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn filename(&self) -> Option<&str> {
        self.filename.as_deref()
    }

    pub fn set_filename(&mut self, filename: impl ToString) -> &mut Self {
        self.filename = Some(filename.to_string());
        self
    }

    /// Set a variable. Replaces any view bound under the same name.
    pub fn set(&mut self, name: &str, value: impl Serialize) -> Result<&mut Self, Error> {
        self.children.remove(name);
        self.data
            .insert(name.to_string(), serde_json::to_value(value)?);
        Ok(self)
    }

    /// Set multiple variables at once from anything that serializes to a map,
    /// e.g. a struct or `serde_json::json!({ ... })`.
    pub fn set_many(&mut self, data: impl Serialize) -> Result<&mut Self, Error> {
        Ok(self.merge(to_map(data)?))
    }

    /// Merge variables into the view.
    pub fn merge(&mut self, data: Map<String, Value>) -> &mut Self {
        for (name, value) in data {
            self.children.remove(&name);
            self.data.insert(name, value);
        }

        self
    }

    /// Get a variable.
    pub fn get(&self, name: &str) -> Option<&Value> {
        self.data.get(name)
    }

    /// All variables set on the view.
    pub fn data(&self) -> &Map<String, Value> {
        &self.data
    }

    /// Bind another view under a variable name.
    pub fn bind(&mut self, name: &str, view: View) -> &mut Self {
        self.data.remove(name);
        self.children.insert(name.to_string(), view);
        self
    }

    /// Remove a bound view.
    pub fn unbind(&mut self, name: &str) -> Option<View> {
        self.children.remove(name)
    }

    pub fn child(&self, name: &str) -> Option<&View> {
        self.children.get(name)
    }

    pub fn child_mut(&mut self, name: &str) -> Option<&mut View> {
        self.children.get_mut(name)
    }

    /// Render the view and, before it, all the views bound to it.
    pub fn render(&self, views: &Views) -> Result<String, Error> {
        self.render_with(views, Map::new())
    }

    /// Render the view with extra variables that take precedence over its own.
    pub fn render_with(&self, views: &Views, extra: Map<String, Value>) -> Result<String, Error> {
        let filename = self.filename.as_deref().ok_or(Error::NoFilename)?;
        let mut data = self.data.clone();

        for (name, child) in &self.children {
            data.insert(name.clone(), Value::String(child.render(views)?));
        }

        data.extend(extra);

        views.render(filename, &data)
    }
}

/// Serialize view variables into a map.
///
/// `null` (e.g. `()` or `None`) is an empty map, anything that isn't a map is an error.
pub fn to_map(data: impl Serialize) -> Result<Map<String, Value>, Error> {
    match serde_json::to_value(data)? {
        Value::Object(map) => Ok(map),
        Value::Null => Ok(Map::new()),
        Value::Bool(_) => Err(Error::NotAMapping("a boolean")),
        Value::Number(_) => Err(Error::NotAMapping("a number")),
        Value::String(_) => Err(Error::NotAMapping("a string")),
        Value::Array(_) => Err(Error::NotAMapping("a list")),
    }
}
