//! HTTP cookies.
//!
//! Decodes the `Cookie` request header and renders `Set-Cookie` response headers.
//! Session stores keep their data in private (encrypted) cookies.
use std::collections::HashMap;
use time::{format_description::well_known::Rfc2822, Duration, OffsetDateTime};

use super::Error;
use crate::crypto::{decrypt, encrypt};

/// Cookies storage.
///
/// Supports both plain text and encrypted (private) cookies.
#[derive(Debug, Clone, Default)]
pub struct Cookies {
    cookies: HashMap<String, Cookie>,
}

impl Cookies {
    /// Create new empty cookies storage.
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse cookies from the `Cookie` header.
    ///
    /// # Example
    ///
    /// ```
    /// # use rwf_layout::http::Cookies;
    /// let cookies = Cookies::parse("rwf_sid=1234; theme=dark");
    /// assert_eq!(cookies.get("theme").unwrap().value(), "dark");
    /// ```
    pub fn parse(value: &str) -> Cookies {
        let cookies = value
            .split(';')
            .filter_map(|part| Cookie::parse(part.trim()))
            .map(|cookie| (cookie.name.clone(), cookie))
            .collect();

        Cookies { cookies }
    }

    /// Add an encrypted cookie.
    pub fn add_private(&mut self, cookie: impl ToCookie) -> Result<(), Error> {
        let mut cookie = cookie.to_cookie();
        cookie.value = encrypt(cookie.value.as_bytes())?;
        self.add(cookie);

        Ok(())
    }

    /// Get an encrypted cookie, decrypting its value.
    ///
    /// If decryption fails, `None` is returned: the cookie was tampered with
    /// or encrypted with a different secret key.
    pub fn get_private(&self, name: &str) -> Result<Option<Cookie>, Error> {
        let cookie = match self.cookies.get(name) {
            Some(cookie) => cookie,
            None => return Ok(None),
        };

        let plaintext = match decrypt(&cookie.value) {
            Ok(plaintext) => plaintext,
            Err(_) => return Ok(None),
        };

        let mut cookie = cookie.clone();
        cookie.value = String::from_utf8(plaintext)?;

        Ok(Some(cookie))
    }

    /// Add a cookie.
    pub fn add(&mut self, cookie: impl ToCookie) {
        let cookie = cookie.to_cookie();
        self.cookies.insert(cookie.name.clone(), cookie);
    }

    /// Add all cookies from another storage, replacing cookies with the same name.
    /// This is what a browser does with the cookies it receives.
    pub fn extend(&mut self, other: &Cookies) {
        for cookie in other.iter() {
            self.add(cookie.clone());
        }
    }

    /// Get a cookie.
    pub fn get(&self, name: &str) -> Option<&Cookie> {
        self.cookies.get(name)
    }

    pub fn is_empty(&self) -> bool {
        self.cookies.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Cookie> {
        self.cookies.values()
    }

    /// Render the cookies as `Set-Cookie` header values.
    pub fn to_headers(&self) -> Vec<String> {
        let mut headers = self.iter().map(|cookie| cookie.to_string()).collect::<Vec<_>>();
        headers.sort();
        headers
    }

    /// Render the cookies as a `Cookie` request header, the way a browser sends them back.
    pub fn to_header(&self) -> String {
        let mut pairs = self
            .iter()
            .map(|cookie| format!("{}={}", cookie.name, cookie.value))
            .collect::<Vec<_>>();
        pairs.sort();
        pairs.join("; ")
    }
}

/// Convert a value to a cookie.
pub trait ToCookie {
    fn to_cookie(self) -> Cookie;
}

impl ToCookie for (&str, &str) {
    fn to_cookie(self) -> Cookie {
        CookieBuilder::new().name(self.0).value(self.1).build()
    }
}

impl ToCookie for (String, String) {
    fn to_cookie(self) -> Cookie {
        CookieBuilder::new().name(self.0).value(self.1).build()
    }
}

impl ToCookie for Cookie {
    fn to_cookie(self) -> Cookie {
        self
    }
}

/// A browser cookie.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Cookie {
    name: String,
    value: String,
    expiration: Option<OffsetDateTime>,
    max_age: Option<Duration>,
    path: Option<String>,
    http_only: bool,
    secure: bool,
}

impl Cookie {
    /// Parse a single `name=value` pair.
    fn parse(value: &str) -> Option<Self> {
        let (name, value) = match value.split_once('=') {
            Some((name, value)) => (name.trim(), value.trim()),
            None => (value.trim(), ""),
        };

        if name.is_empty() {
            return None;
        }

        Some(CookieBuilder::new().name(name).value(value).build())
    }

    /// Get cookie value.
    pub fn value(&self) -> &str {
        &self.value
    }

    /// Get cookie name.
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn expiration(&self) -> Option<OffsetDateTime> {
        self.expiration
    }

    pub fn max_age(&self) -> Option<Duration> {
        self.max_age
    }
}

impl std::fmt::Display for Cookie {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(f, "{}={}", self.name, self.value)?;

        if let Some(ref max_age) = self.max_age {
            write!(f, "; Max-Age={}", max_age.whole_seconds())?;
        }

        if self.secure {
            write!(f, "; Secure")?;
        }

        if self.http_only {
            write!(f, "; HttpOnly")?;
        }

        write!(f, "; Path={}", self.path.as_deref().unwrap_or("/"))?;
        write!(f, "; SameSite=Lax")?;

        if let Some(ref expiration) = self.expiration {
            let expiration = expiration.format(&Rfc2822).map_err(|_| std::fmt::Error)?;
            write!(f, "; Expires={}", expiration)?;
        }

        Ok(())
    }
}

/// Cookie builder.
///
/// # Example
///
/// ```
/// # use rwf_layout::http::CookieBuilder;
/// use time::Duration;
///
/// let cookie = CookieBuilder::new()
///     .name("rwf_sid")
///     .value("1234")
///     .max_age(Duration::days(4))
///     .http_only()
///     .build();
///
/// assert_eq!(cookie.to_string(), "rwf_sid=1234; Max-Age=345600; HttpOnly; Path=/; SameSite=Lax");
/// ```
#[derive(Clone, Debug, Default)]
pub struct CookieBuilder {
    cookie: Cookie,
}

impl CookieBuilder {
    /// Create new cookie builder.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn name(mut self, name: impl ToString) -> Self {
        self.cookie.name = name.to_string();
        self
    }

    pub fn value(mut self, value: impl ToString) -> Self {
        self.cookie.value = value.to_string();
        self
    }

    pub fn expiration(mut self, expiration: OffsetDateTime) -> Self {
        self.cookie.expiration = Some(expiration);
        self
    }

    pub fn max_age(mut self, max_age: Duration) -> Self {
        self.cookie.max_age = Some(max_age);
        self
    }

    pub fn path(mut self, path: impl ToString) -> Self {
        self.cookie.path = Some(path.to_string());
        self
    }

    /// Hide the cookie from JavaScript.
    pub fn http_only(mut self) -> Self {
        self.cookie.http_only = true;
        self
    }

    /// Send the cookie over HTTPS only.
    pub fn secure(mut self) -> Self {
        self.cookie.secure = true;
        self
    }

    pub fn build(self) -> Cookie {
        self.cookie
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_parsing_cookies() {
        let cookies = Cookies::parse("name=some_value; empty; =broken; padded = yes ");
        assert_eq!(cookies.get("name").unwrap().value(), "some_value");
        assert_eq!(cookies.get("empty").unwrap().value(), "");
        assert_eq!(cookies.get("padded").unwrap().value(), "yes");
        assert!(cookies.get("").is_none());
    }

    #[test]
    fn test_private_cookies() {
        let mut cookies = Cookies::new();
        cookies.add(("hello", "world"));
        cookies
            .add_private(("session", "super_secret_key"))
            .expect("private");

        let cookies = Cookies::parse(&cookies.to_header());
        assert_eq!(cookies.get("hello").unwrap().value(), "world");
        assert_ne!(cookies.get("session").unwrap().value(), "super_secret_key");
        assert_eq!(
            cookies
                .get_private("session")
                .expect("decrypt")
                .expect("session cookie")
                .value(),
            "super_secret_key"
        );

        // Plain cookies can't be read as private ones.
        assert!(cookies.get_private("hello").expect("utf-8").is_none());
    }

    #[test]
    fn test_set_cookie_header() {
        let expiration = OffsetDateTime::from_unix_timestamp(0).unwrap();
        let cookie = CookieBuilder::new()
            .name("a")
            .value("b")
            .path("/app")
            .secure()
            .expiration(expiration)
            .build();

        assert_eq!(
            cookie.to_string(),
            "a=b; Secure; Path=/app; SameSite=Lax; Expires=Thu, 01 Jan 1970 00:00:00 +0000"
        );
    }
}
