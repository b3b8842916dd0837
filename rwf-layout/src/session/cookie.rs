//! Sessions stored in the client's browser.
use time::OffsetDateTime;

use super::{cookie_name, Session, SessionStore};
use crate::http::{CookieBuilder, Request, Response};
use crate::Error;

/// Keeps the whole session in an encrypted cookie.
///
/// Nothing is stored on the server, which makes this store a good default. Browsers limit
/// cookies to about 4KB, so sessions should stay small, which flash messages are.
#[derive(Debug, Clone, Copy, Default)]
pub struct CookieStore;

impl CookieStore {
    const PREFIX: &'static str = "rwf_session";
}

impl SessionStore for CookieStore {
    fn read(&self, group: &str, request: &Request) -> Result<Option<Session>, Error> {
        let name = cookie_name(Self::PREFIX, group);

        match request.cookies().get_private(&name)? {
            Some(cookie) => Ok(Some(serde_json::from_str(cookie.value())?)),
            None => Ok(None),
        }
    }

    fn write(&self, group: &str, session: &Session, response: &mut Response) -> Result<(), Error> {
        let value = serde_json::to_string(session)?;
        let expiration = OffsetDateTime::from_unix_timestamp(session.expiration())
            .map_err(crate::http::Error::from)?;

        response.cookies().add_private(
            CookieBuilder::new()
                .name(cookie_name(Self::PREFIX, group))
                .value(value)
                .expiration(expiration)
                .http_only()
                .build(),
        )?;

        Ok(())
    }
}
