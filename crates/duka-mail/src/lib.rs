//! Transactional email for Duka.
//!
//! Templates render domain events into [`EmailMessage`]s; a [`Mailer`]
//! delivers them. [`HttpMailer`] posts to a provider API, [`LogMailer`] only
//! logs. Callers go through [`dispatch`], which never fails: delivery errors
//! are logged and swallowed so email can't break the request that caused it.

mod error;
mod http;
mod log;
mod mailer;
pub mod templates;

pub use error::MailError;
pub use http::HttpMailer;
pub use log::LogMailer;
pub use mailer::{dispatch, EmailMessage, Mailer};
