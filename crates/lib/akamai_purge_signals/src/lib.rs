//! Turn "this content changed" events into Akamai purges.
//!
//! A [`PurgeSubject`] describes what changed: a URL, a list of URLs, or
//! objects implementing [`CanonicalUrl`]. [`PurgeSignals`] normalizes it
//! into URLs and either purges right away or hands them to a
//! [`PurgeTaskQueue`] when one was configured.
mod config;
mod metrics;
mod signals;
mod subject;
mod tasks;

pub use config::Config;
pub use signals::{PurgeSignals, SignalError};
pub use subject::{BoxedObject, CanonicalUrl, PurgeSubject, SubjectError};
pub use tasks::{BackgroundPurgeQueue, PurgeTaskQueue, QueueError, TaskId};
