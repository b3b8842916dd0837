//! Page layouts: a template wrapping the content rendered by the controller action.
//!
//! Each request gets a [`Layout`] with an outer template and an empty content view.
//! The content view gets its file when the page is rendered, chosen by convention from the
//! route: `<directory>/<controller>/<action>`. More templates can be inserted between the
//! outer template and the content with [`Layout::extend_template`], e.g. a section sidebar.
//!
//! Every template prints the view it wraps with `{{{content}}}`.
//!
//! # Example
//!
//! ```
//! use rwf_layout::controller::Layout;
//! use rwf_layout::http::{Request, Route};
//! use rwf_layout::view::Views;
//! use std::sync::Arc;
//!
//! let views = Arc::new(Views::new("templates"));
//! views.register("layout", "<body>{{{content}}}</body>").unwrap();
//! views.register("posts/sidebar", "<aside></aside>{{{content}}}").unwrap();
//! views.register("posts/list", "<ul></ul>").unwrap();
//!
//! let request = Request::new("/posts/list", Route::new("posts").action("list"));
//! let mut layout = Layout::before(&request, views, Some("layout"), true);
//!
//! layout.extend_template("sidebar").unwrap();
//! layout.render().unwrap();
//!
//! assert_eq!(
//!     layout.output_text().unwrap().as_deref(),
//!     Some("<body><aside></aside><ul></ul></body>")
//! );
//! ```
use std::sync::Arc;

use serde::Serialize;
use serde_json::{Map, Value};
use tracing::debug;

use crate::colors::MaybeColorize;
use crate::config::get_config;
use crate::http::{Request, Response, Route};
use crate::view::{to_map, View, Views};
use crate::Error;

/// Name of the variable each template prints the wrapped view with.
pub const CONTENT: &str = "content";

/// What the request responds with.
#[derive(Debug, Clone)]
pub enum Output {
    /// The outer template, wrapping every inserted template and the content.
    Template,
    /// The content view alone.
    Content,
    /// Plain text, no views.
    Text(String),
    /// A response built by the controller, e.g. a redirect.
    Response(Response),
}

/// A view to insert into the layout: a view name, relative to the controller, or a view.
#[derive(Debug, Clone)]
pub enum Layer {
    Name(String),
    View(View),
}

impl From<&str> for Layer {
    fn from(name: &str) -> Self {
        Layer::Name(name.to_string())
    }
}

impl From<String> for Layer {
    fn from(name: String) -> Self {
        Layer::Name(name)
    }
}

impl From<View> for Layer {
    fn from(view: View) -> Self {
        Layer::View(view)
    }
}

/// Template and content views for a request.
#[derive(Debug)]
pub struct Layout {
    route: Route,
    default_action: String,
    views: Arc<Views>,
    auto_render: bool,
    template: Option<View>,
    // Inserted templates, outermost first. The last one wraps the content.
    layers: Vec<View>,
    content: View,
    output: Option<Output>,
}

impl Layout {
    /// Set up the layout before the controller action runs.
    ///
    /// With `auto_render`, the content view is created without a file, and if a template
    /// is given, it wraps the content. Without `auto_render`, there is no template.
    pub fn before(
        request: &Request,
        views: Arc<Views>,
        template: Option<&str>,
        auto_render: bool,
    ) -> Self {
        let template = match template {
            Some(template) if auto_render && !template.is_empty() => Some(View::new(template)),
            _ => None,
        };

        Self {
            route: request.route().clone(),
            default_action: get_config().general.default_action.clone(),
            views,
            auto_render,
            template,
            layers: vec![],
            content: View::empty(),
            output: None,
        }
    }

    /// Use a different default action than the configured one.
    pub fn default_action(mut self, action: impl ToString) -> Self {
        self.default_action = action.to_string();
        self
    }

    /// Render the page after the controller action ran, unless the action
    /// already decided what to respond with.
    pub fn after(&mut self) -> Result<(), Error> {
        if self.auto_render && self.output.is_none() {
            self.render()?;
        }

        Ok(())
    }

    /// Pick the content view file by convention and respond with the template.
    pub fn render(&mut self) -> Result<(), Error> {
        self.render_with(None, Map::new())
    }

    /// Set content variables, pick the content view file by convention, and respond with the template.
    pub fn render_data(&mut self, data: impl Serialize) -> Result<(), Error> {
        self.render_with(None, to_map(data)?)
    }

    /// Respond with the template, using the named content view, relative to the controller.
    pub fn render_view(&mut self, view_name: &str) -> Result<(), Error> {
        self.render_with(Some(view_name), Map::new())
    }

    /// Set content variables and respond with the template.
    ///
    /// Without a view name, the content view is `<directory>/<controller>/<action>`. For the
    /// default action, if that view doesn't exist, `<directory>/<controller>` is used instead.
    pub fn render_with(
        &mut self,
        view_name: Option<&str>,
        data: Map<String, Value>,
    ) -> Result<(), Error> {
        if !data.is_empty() {
            self.content.merge(data);
        }

        let path = match view_name {
            Some(view_name) => self.add_controller_path(view_name),
            None => {
                let action = self
                    .route
                    .action_name()
                    .unwrap_or(&self.default_action)
                    .to_string();
                let path = self.add_controller_path(&action);

                if action == self.default_action && !self.views.exists(&path) {
                    self.add_controller_path("")
                } else {
                    path
                }
            }
        };

        debug!("{} {}", "content".purple(), path);

        self.content.set_filename(path);
        self.output = Some(if self.template.is_some() {
            Output::Template
        } else {
            Output::Content
        });

        Ok(())
    }

    /// Insert a template between the innermost template and the content.
    ///
    /// View names are relative to the controller; start the name with a slash to refer to
    /// the same view regardless of which controller uses it. Returns the inserted view.
    pub fn extend_template(&mut self, layer: impl Into<Layer>) -> Result<&mut View, Error> {
        self.extend_template_with(layer, Map::new())
    }

    /// Insert a template with variables. See [`Layout::extend_template`].
    pub fn extend_template_with(
        &mut self,
        layer: impl Into<Layer>,
        data: impl Serialize,
    ) -> Result<&mut View, Error> {
        if self.template.is_none() {
            return Err(Error::NoTemplate);
        }

        let mut view = match layer.into() {
            Layer::Name(name) => View::new(self.add_controller_path(&name)),
            Layer::View(view) => view,
        };

        let data = to_map(data)?;
        if !data.is_empty() {
            view.merge(data);
        }

        debug!(
            "{} {} => {}",
            "layout".purple(),
            self.innermost().and_then(|view| view.filename()).unwrap_or(""),
            view.filename().unwrap_or("").green()
        );

        self.layers.push(view);

        let len = self.layers.len();
        Ok(&mut self.layers[len - 1])
    }

    /// Prefix the path with the controller directory and name.
    ///
    /// Paths starting with a slash are returned as is, without the slashes.
    ///
    /// # Example
    ///
    /// ```
    /// # use rwf_layout::controller::Layout;
    /// # use rwf_layout::http::{Request, Route};
    /// # use rwf_layout::view::Views;
    /// # use std::sync::Arc;
    /// let request = Request::new("/", Route::new("posts").directory("admin"));
    /// let layout = Layout::before(&request, Arc::new(Views::new("templates")), None, true);
    ///
    /// assert_eq!(layout.add_controller_path("list"), "admin/posts/list");
    /// assert_eq!(layout.add_controller_path(""), "admin/posts");
    /// assert_eq!(layout.add_controller_path("/shared/footer"), "shared/footer");
    /// ```
    pub fn add_controller_path(&self, path: &str) -> String {
        if path.starts_with('/') {
            path.trim_matches('/').to_string()
        } else {
            format!(
                "{}/{}/{}",
                self.route.directory_name(),
                self.route.controller_name(),
                path
            )
            .trim_matches('/')
            .to_string()
        }
    }

    /// The outer template.
    pub fn template(&self) -> Option<&View> {
        self.template.as_ref()
    }

    pub fn template_mut(&mut self) -> Option<&mut View> {
        self.template.as_mut()
    }

    /// The content view.
    pub fn content(&self) -> &View {
        &self.content
    }

    pub fn content_mut(&mut self) -> &mut View {
        &mut self.content
    }

    /// Templates inserted with [`Layout::extend_template`], outermost first.
    pub fn layers(&self) -> &[View] {
        &self.layers
    }

    /// The template wrapping the content directly.
    pub fn innermost(&self) -> Option<&View> {
        self.layers.last().or(self.template.as_ref())
    }

    /// Every view, from the outer template to the content.
    pub fn chain(&self) -> Vec<&View> {
        self.template
            .iter()
            .chain(self.layers.iter())
            .chain(std::iter::once(&self.content))
            .collect()
    }

    /// The view wrapped by the view at this position in the [`Layout::chain`].
    pub fn wrapped_by(&self, index: usize) -> Option<&View> {
        self.chain().get(index + 1).copied()
    }

    /// The page will be rendered automatically after the action.
    pub fn auto_render(&self) -> bool {
        self.auto_render
    }

    pub fn set_auto_render(&mut self, auto_render: bool) {
        self.auto_render = auto_render;
    }

    pub fn output(&self) -> Option<&Output> {
        self.output.as_ref()
    }

    /// Respond with something else than the layout. Prevents automatic rendering.
    pub fn set_output(&mut self, output: Output) {
        self.output = Some(output);
    }

    /// Respond with a redirect.
    pub fn redirect(&mut self, to: impl ToString) {
        self.set_output(Output::Response(Response::new().redirect(to)));
    }

    /// Respond with plain text.
    pub fn text(&mut self, text: impl ToString) {
        self.set_output(Output::Text(text.to_string()));
    }

    /// Render the layout, starting with the content and finishing with the outer template.
    fn render_chain(&self) -> Result<String, Error> {
        let mut rendered = self.content.render(&self.views)?;

        for view in self.layers.iter().rev().chain(self.template.iter()) {
            let mut content = Map::new();
            content.insert(CONTENT.to_string(), Value::String(rendered));
            rendered = view.render_with(&self.views, content)?;
        }

        Ok(rendered)
    }

    /// Render the output as text. `None` if there is nothing to render.
    pub fn output_text(&self) -> Result<Option<String>, Error> {
        match self.output {
            Some(Output::Template) => Ok(Some(self.render_chain()?)),
            Some(Output::Content) => Ok(Some(self.content.render(&self.views)?)),
            Some(Output::Text(ref text)) => Ok(Some(text.clone())),
            Some(Output::Response(_)) | None => Ok(None),
        }
    }

    /// Build the HTTP response.
    pub fn into_response(self) -> Result<Response, Error> {
        let html = match self.output {
            Some(Output::Template) | Some(Output::Content) => self.output_text()?,
            _ => None,
        };

        match (html, self.output) {
            (Some(html), _) => Ok(Response::new().html(html)),
            (None, Some(Output::Response(response))) => Ok(response),
            (None, Some(Output::Text(text))) => Ok(Response::new().text(text)),
            (None, _) => Ok(Response::new()),
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use serde_json::json;
    use std::fs::{create_dir_all, write};
    use tempdir::TempDir;

    fn views() -> Arc<Views> {
        let views = Views::new("templates");
        views.register("layout", "<html>{{{content}}}</html>").unwrap();
        views.register("posts/list", "<ul>{{#each posts}}<li>{{this}}</li>{{/each}}</ul>").unwrap();
        views.register("posts/sidebar", "<aside>{{title}}</aside>{{{content}}}").unwrap();
        views.register("shared/box", "<div>{{{content}}}</div>").unwrap();
        Arc::new(views)
    }

    fn posts_list() -> Request {
        Request::new("/posts/list", Route::new("posts").action("list"))
    }

    fn filenames(layout: &Layout) -> Vec<Option<&str>> {
        layout.chain().iter().map(|view| view.filename()).collect()
    }

    #[test]
    fn test_before() {
        let layout = Layout::before(&posts_list(), views(), Some("layout"), true);

        assert_eq!(layout.template().and_then(|t| t.filename()), Some("layout"));
        assert_eq!(layout.content().filename(), None);
        assert_eq!(filenames(&layout), vec![Some("layout"), None]);
        assert_eq!(layout.wrapped_by(0), Some(layout.content()));
        assert!(layout.output().is_none());
    }

    #[test]
    fn test_before_without_template() {
        let layout = Layout::before(&posts_list(), views(), None, true);
        assert!(layout.template().is_none());

        let layout = Layout::before(&posts_list(), views(), Some(""), true);
        assert!(layout.template().is_none());

        let layout = Layout::before(&posts_list(), views(), Some("layout"), false);
        assert!(layout.template().is_none());
    }

    #[test]
    fn test_render_by_convention() {
        let mut layout = Layout::before(&posts_list(), views(), Some("layout"), true);
        layout.render().unwrap();

        assert_eq!(layout.content().filename(), Some("posts/list"));
        assert!(matches!(layout.output(), Some(Output::Template)));
    }

    #[test]
    fn test_render_data() {
        let mut layout = Layout::before(&posts_list(), views(), Some("layout"), true);
        layout.render_data(json!({"posts": ["one", "two"]})).unwrap();

        assert_eq!(
            layout.output_text().unwrap().as_deref(),
            Some("<html><ul><li>one</li><li>two</li></ul></html>")
        );
    }

    #[test]
    fn test_render_view() {
        let request = Request::new("/admin/posts", Route::new("posts").directory("admin"));
        let mut layout = Layout::before(&request, views(), Some("layout"), true);

        layout.render_view("edit").unwrap();
        assert_eq!(layout.content().filename(), Some("admin/posts/edit"));

        layout.render_view("/posts/list").unwrap();
        assert_eq!(layout.content().filename(), Some("posts/list"));
    }

    #[test]
    fn test_render_without_template() {
        let mut layout = Layout::before(&posts_list(), views(), None, true);
        layout.render_data(json!({"posts": ["one"]})).unwrap();

        assert!(matches!(layout.output(), Some(Output::Content)));
        assert_eq!(
            layout.output_text().unwrap().as_deref(),
            Some("<ul><li>one</li></ul>")
        );
    }

    #[test]
    fn test_default_action_fallback() {
        let dir = TempDir::new("views").expect("tempdir");
        write(dir.path().join("posts.html"), "all posts").unwrap();
        let views = Arc::new(Views::new(dir.path()).extension("html"));

        let request = Request::new("/posts", Route::new("posts"));
        let mut layout = Layout::before(&request, views.clone(), None, true).default_action("index");
        layout.render().unwrap();
        assert_eq!(layout.content().filename(), Some("posts"));
        assert_eq!(layout.output_text().unwrap().as_deref(), Some("all posts"));

        // Once the action view exists, it's preferred.
        create_dir_all(dir.path().join("posts")).unwrap();
        write(dir.path().join("posts/index.html"), "index").unwrap();

        let mut layout = Layout::before(&request, views.clone(), None, true).default_action("index");
        layout.render().unwrap();
        assert_eq!(layout.content().filename(), Some("posts/index"));

        // Named default action behaves the same.
        let request = Request::new("/posts/index", Route::new("posts").action("index"));
        let mut layout = Layout::before(&request, views, None, true).default_action("index");
        layout.render().unwrap();
        assert_eq!(layout.content().filename(), Some("posts/index"));
    }

    #[test]
    fn test_no_fallback_for_other_actions() {
        let dir = TempDir::new("views").expect("tempdir");
        write(dir.path().join("posts.html"), "all posts").unwrap();
        let views = Arc::new(Views::new(dir.path()).extension("html"));

        let request = Request::new("/posts/show", Route::new("posts").action("show"));
        let mut layout = Layout::before(&request, views, None, true).default_action("index");
        layout.render().unwrap();

        assert_eq!(layout.content().filename(), Some("posts/show"));
        assert!(matches!(
            layout.output_text(),
            Err(Error::View(crate::view::Error::TemplateDoesNotExist(_)))
        ));
    }

    #[test]
    fn test_extend_template() {
        let mut layout = Layout::before(&posts_list(), views(), Some("layout"), true);

        let sidebar = layout.extend_template("sidebar").unwrap();
        sidebar.set("title", "Archive").unwrap();

        assert_eq!(
            filenames(&layout),
            vec![Some("layout"), Some("posts/sidebar"), None]
        );
        assert_eq!(layout.wrapped_by(0).and_then(|v| v.filename()), Some("posts/sidebar"));
        assert_eq!(layout.wrapped_by(1), Some(layout.content()));
        assert_eq!(
            layout.innermost().and_then(|v| v.filename()),
            Some("posts/sidebar")
        );

        layout.render_data(json!({"posts": ["one"]})).unwrap();
        assert_eq!(
            layout.output_text().unwrap().as_deref(),
            Some("<html><aside>Archive</aside><ul><li>one</li></ul></html>")
        );
    }

    #[test]
    fn test_extend_template_nearest_content() {
        let mut layout = Layout::before(&posts_list(), views(), Some("layout"), true);

        layout.extend_template("/shared/box").unwrap();
        layout
            .extend_template_with("sidebar", json!({"title": "Tags"}))
            .unwrap();
        let mut boxed = View::new("shared/box");
        boxed.set("ignored", true).unwrap();
        layout.extend_template(boxed).unwrap();

        assert_eq!(
            filenames(&layout),
            vec![
                Some("layout"),
                Some("shared/box"),
                Some("posts/sidebar"),
                Some("shared/box"),
                None
            ]
        );

        layout.render().unwrap();
        assert_eq!(
            layout.output_text().unwrap().as_deref(),
            Some("<html><div><aside>Tags</aside><div><ul></ul></div></div></html>")
        );
    }

    #[test]
    fn test_extend_without_template() {
        let mut layout = Layout::before(&posts_list(), views(), None, true);

        assert!(matches!(
            layout.extend_template("sidebar"),
            Err(Error::NoTemplate)
        ));
        assert!(layout.layers().is_empty());
    }

    #[test]
    fn test_render_extend_render() {
        let mut layout = Layout::before(&posts_list(), views(), Some("layout"), true);

        layout.render().unwrap();
        assert_eq!(layout.output_text().unwrap().as_deref(), Some("<html><ul></ul></html>"));

        layout.extend_template("sidebar").unwrap();
        layout.render().unwrap();

        assert!(matches!(layout.output(), Some(Output::Template)));
        assert_eq!(layout.wrapped_by(1), Some(layout.content()));
        assert_eq!(
            layout.output_text().unwrap().as_deref(),
            Some("<html><aside></aside><ul></ul></html>")
        );
    }

    #[test]
    fn test_after() {
        let mut layout = Layout::before(&posts_list(), views(), Some("layout"), true);
        layout.after().unwrap();
        assert_eq!(layout.content().filename(), Some("posts/list"));

        // Explicit output is kept.
        let mut layout = Layout::before(&posts_list(), views(), Some("layout"), true);
        layout.redirect("/posts");
        layout.after().unwrap();
        assert_eq!(layout.content().filename(), None);

        let response = layout.into_response().unwrap();
        assert_eq!(response.get_header("location"), Some("/posts"));

        // Auto render disabled.
        let mut layout = Layout::before(&posts_list(), views(), Some("layout"), false);
        layout.after().unwrap();
        assert!(layout.output().is_none());
        assert_eq!(layout.into_response().unwrap().text_body(), "");
    }

    #[test]
    fn test_into_response() {
        let mut layout = Layout::before(&posts_list(), views(), Some("layout"), true);
        layout.render().unwrap();

        let response = layout.into_response().unwrap();
        assert_eq!(response.text_body(), "<html><ul></ul></html>");
        assert_eq!(
            response.get_header("content-type"),
            Some("text/html; charset=utf-8")
        );

        let mut layout = Layout::before(&posts_list(), views(), Some("layout"), true);
        layout.text("pong");
        assert_eq!(layout.into_response().unwrap().text_body(), "pong");
    }

    #[test]
    fn test_add_controller_path() {
        let layout = Layout::before(&posts_list(), views(), Some("layout"), true);

        assert_eq!(layout.add_controller_path("list"), "posts/list");
        assert_eq!(layout.add_controller_path(""), "posts");
        assert_eq!(layout.add_controller_path("/shared/footer"), "shared/footer");
        assert_eq!(layout.add_controller_path("//shared/footer/"), "shared/footer");
        assert_eq!(layout.add_controller_path("partials/"), "posts/partials");
    }
}
