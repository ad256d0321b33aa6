//! # cmi5-client — Assignable Unit session runtime
//!
//! Drives an AU through the cmi5 launch protocol: the one-time fetch
//! exchange, the launch data and learner preference loads, and the
//! statement-emitting lifecycle transitions, in the strict order the
//! protocol mandates.
//!
//! ```no_run
//! use std::sync::Arc;
//! # use cmi5_client::Cmi5Builder;
//! # async fn run(xapi: Arc<dyn cmi5_protocol::XapiClient>) -> cmi5_protocol::Cmi5Result<()> {
//! let mut session = Cmi5Builder::from_launch_url(
//!     "https://content.example/au/index.html?endpoint=https%3A%2F%2Flrs.example%2F&\
//!      fetch=https%3A%2F%2Flms.example%2Ffetch&actor=%7B%22mbox%22%3A%22mailto%3Aa%40b.com%22%7D&\
//!      activityId=https%3A%2F%2Fexample.com%2Fau&registration=reg-1",
//! )?
//! .build(xapi)?;
//!
//! session.start().await?;
//! session.passed().await?;
//! session.terminate().await?;
//! # Ok(())
//! # }
//! ```

mod auth;
pub mod session;

pub use session::{Cmi5Builder, Cmi5Session, StartObservers, StepObserver};

// The contract and transport layers are part of the public surface.
pub use cmi5_protocol as protocol;
pub use cmi5_transport as transport;
