//! Controllers rendering pages through a [`Layout`], with [`Flash`] messages.
//!
//! Implement [`LayoutController::action`]; the provided [`LayoutController::handle`]
//! takes care of the rest:
//!
//! 1. load the client's sessions,
//! 2. create the layout (template and empty content view),
//! 3. run the action,
//! 4. render the page by convention, unless the action responded with something else,
//! 5. save the sessions, and with them the flash, into the response.
use std::sync::Arc;

use async_trait::async_trait;
use time::OffsetDateTime;
use tracing::{error, info};

use crate::colors::MaybeColorize;
use crate::flash::Flash;
use crate::http::{Request, Response};
use crate::session::{SessionStores, Sessions};
use crate::view::Views;
use crate::Error;

pub mod layout;

pub use layout::{Layer, Layout, Output};

/// Controller rendering its pages inside a layout.
#[async_trait]
#[allow(unused_variables)]
pub trait LayoutController: Sync + Send {
    /// Outer template wrapping every page. `None` renders the content view alone.
    fn template(&self) -> Option<&str> {
        Some("template")
    }

    /// Render the page after the action automatically.
    fn auto_render(&self) -> bool {
        true
    }

    /// Where the views are.
    fn views(&self) -> Arc<Views> {
        Views::global()
    }

    /// Session groups available to the controller.
    fn session_stores(&self) -> SessionStores {
        SessionStores::global()
    }

    /// Handle the request. Set variables, extend the template, render a view, set flash
    /// messages or respond with something else, e.g. a redirect.
    async fn action(
        &self,
        request: &Request,
        layout: &mut Layout,
        flash: &mut Flash<'_>,
    ) -> Result<(), Error>;

    /// Run the action and build the response.
    async fn handle(&self, request: &Request) -> Result<Response, Error> {
        let views = self.views();
        let mut sessions = Sessions::new(request, self.session_stores());
        let mut layout = Layout::before(request, views.clone(), self.template(), self.auto_render());

        {
            let mut flash = Flash::new(&mut sessions, views.clone())?;
            Flash::register_default_view(&views, flash.config())?;

            self.action(request, &mut layout, &mut flash).await?;
        }

        layout.after()?;

        let mut response = layout.into_response()?;
        sessions.save(&mut response)?;

        Ok(response)
    }

    /// Handle the request, turning errors into an error page. Do not implement this
    /// unless you're looking to do something really custom.
    async fn handle_internal(&self, request: Request) -> Response {
        let response = match self.handle(&request).await {
            Ok(response) => response,
            Err(err) => {
                error!("{}", err);
                Response::internal_error(err)
            }
        };

        let duration = (OffsetDateTime::now_utc() - request.received_at()).as_seconds_f64() * 1000.0;

        info!(
            "{} {} {} ({:.3} ms)",
            request.path().purple(),
            self.controller_name().green(),
            response.status().code(),
            duration,
        );

        response
    }

    /// The name of this controller. Used for logging.
    fn controller_name(&self) -> &'static str {
        std::any::type_name::<Self>()
    }
}
