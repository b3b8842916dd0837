//! HTTP response.
use std::collections::BTreeMap;

use super::Cookies;

/// Response status, e.g. 404, 200, etc.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Status {
    Ok,
    Found,
    NotFound,
    InternalServerError,
    Code(u16),
}

impl Status {
    pub fn code(&self) -> u16 {
        use Status::*;

        match self {
            Ok => 200,
            Found => 302,
            NotFound => 404,
            InternalServerError => 500,
            Code(code) => *code,
        }
    }

    pub fn ok(&self) -> bool {
        self.code() < 300
    }
}

impl From<u16> for Status {
    fn from(code: u16) -> Status {
        use Status::*;

        match code {
            200 => Ok,
            302 => Found,
            404 => NotFound,
            500 => InternalServerError,
            code => Code(code),
        }
    }
}

/// HTTP response.
#[derive(Debug, Clone)]
pub struct Response {
    code: u16,
    headers: BTreeMap<String, String>,
    body: String,
    cookies: Cookies,
}

impl Default for Response {
    fn default() -> Self {
        Self::new()
    }
}

impl Response {
    /// Create empty response.
    pub fn new() -> Self {
        Self {
            code: 200,
            headers: BTreeMap::from([
                ("content-type".to_string(), "text/plain".to_string()),
                ("server".to_string(), "rwf".to_string()),
            ]),
            body: String::new(),
            cookies: Cookies::new(),
        }
    }

    /// Set response code.
    ///
    /// # Example
    ///
    /// ```
    /// use rwf_layout::http::Response;
    ///
    /// let response = Response::new().text("OK").code(200);
    /// ```
    pub fn code(mut self, code: u16) -> Self {
        self.code = code;
        self
    }

    /// Response status, e.g. 200 OK.
    pub fn status(&self) -> Status {
        self.code.into()
    }

    fn body(mut self, body: String, mime_type: &str) -> Self {
        self.headers
            .insert("content-length".to_string(), body.len().to_string());
        self.headers
            .insert("content-type".to_string(), mime_type.to_string());
        self.body = body;
        self
    }

    /// Create a response with an HTML body.
    pub fn html(self, body: impl ToString) -> Self {
        self.body(body.to_string(), "text/html; charset=utf-8")
    }

    /// Create a response with a plain text body.
    pub fn text(self, body: impl ToString) -> Self {
        self.body(body.to_string(), "text/plain; charset=utf-8")
    }

    /// Add a header to the response. The name is lowercased.
    pub fn header(mut self, name: impl ToString, value: impl ToString) -> Self {
        self.headers
            .insert(name.to_string().to_lowercase(), value.to_string());
        self
    }

    /// Get a header set on the response.
    pub fn get_header(&self, name: &str) -> Option<&str> {
        self.headers
            .get(&name.to_lowercase())
            .map(|value| value.as_str())
    }

    /// The response body.
    pub fn text_body(&self) -> &str {
        &self.body
    }

    /// Mutable reference to response cookies.
    pub fn cookies(&mut self) -> &mut Cookies {
        &mut self.cookies
    }

    /// Cookies that will be sent to the client.
    pub fn set_cookies(&self) -> &Cookies {
        &self.cookies
    }

    /// Serialize status line and headers, including `Set-Cookie`, as sent on the wire.
    pub fn head(&self) -> String {
        let mut head = format!("HTTP/1.1 {}\r\n", self.code);

        for (name, value) in &self.headers {
            head.push_str(&format!("{}: {}\r\n", name, value));
        }

        for cookie in self.cookies.to_headers() {
            head.push_str(&format!("set-cookie: {}\r\n", cookie));
        }

        head.push_str("\r\n");
        head
    }

    /// Default not found (404) error.
    pub fn not_found() -> Self {
        Self::new()
            .html("<h3><center>404 - Not Found</center></h3>")
            .code(404)
    }

    pub fn internal_error(err: impl std::error::Error) -> Self {
        Self::new()
            .html(format!(
                "<h3><center>500 - Internal Server Error</center></h3>\n<center><code style=\"padding: 25px;\">{}</code></center>",
                crate::safe_html(&err.to_string())
            ))
            .code(500)
    }

    /// Redirect the client to another URL, e.g. after saving a form.
    pub fn redirect(self, to: impl ToString) -> Self {
        self.html("")
            .header("location", to)
            .code(302)
            .header("cache-control", "no-cache")
    }
}
