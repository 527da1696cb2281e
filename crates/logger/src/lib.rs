//! Core of the fanlog pipeline
//!
//! This crate defines the [`Sink`] trait every destination implements, the
//! [`FanoutWriter`] that delivers one record to several sinks, and a small
//! record builder ([`Logger`], [`Event`]) that produces one JSON object per
//! log call.
//!
//! ```text
//! [Logger] --bytes--> [FanoutWriter] --> [console sink]
//!                                    \-> [rotating file sink]
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![warn(clippy::nursery)]
#![forbid(unsafe_code)]

mod error;
mod fanout;
pub mod fields;
mod level;
mod logger;
mod record;
mod sink;
pub mod time;

#[cfg(any(test, feature = "test-support"))]
pub mod test_support;

pub use error::{Error, Result};
pub use fanout::FanoutWriter;
pub use fields::ReservedKeys;
pub use level::Level;
pub use logger::{Event, Logger};
pub use record::Record;
pub use sink::Sink;
pub use time::{TimeFieldFormat, set_time_field_format, time_field_format};
