//! Prowl notification dispatch.

mod dispatcher;
mod request;
mod transport;

pub use dispatcher::Dispatcher;
pub use request::{NotificationRequest, render_template, resolve_text};
pub use transport::{NotificationTransport, PROWL_ADD_URL, ProwlClient};
