use thiserror::Error;

use std::path::PathBuf;

#[derive(Error, Debug)]
pub enum Error {
    #[error("template \"{0}\" does not exist")]
    TemplateDoesNotExist(PathBuf),

    #[error("view has no template file assigned")]
    NoFilename,

    #[error("syntax error in template \"{0}\": {1}")]
    Syntax(String, String),

    #[error("failed to render template \"{0}\": {1}")]
    Render(String, String),

    #[error("view data must be a map of variables, got {0}")]
    NotAMapping(&'static str),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    pub(crate) fn syntax(name: &str, err: handlebars::TemplateError) -> Self {
        Error::Syntax(name.to_string(), err.to_string())
    }

    pub(crate) fn render(name: &str, err: handlebars::RenderError) -> Self {
        Error::Render(name.to_string(), err.to_string())
    }
}
