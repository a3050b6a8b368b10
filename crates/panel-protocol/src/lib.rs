//! `panel-protocol`: JSON wire format of the panel's client API for
//! schedules and tasks.
//!
//! Every response object is wrapped in an `{ "object": ..., "attributes": ... }`
//! envelope with snake_case attribute keys; lists are
//! `{ "object": "list", "data": [envelope, ...] }`. The `Raw*` types mirror
//! that shape exactly and convert into the records in `panel_core::types`.

pub mod envelope;
pub mod error;
pub mod paths;
pub mod schedule;

pub use envelope::{Envelope, ListEnvelope};
pub use error::{ErrorBody, ProtocolError};
pub use schedule::{RawSchedule, RawServer, RawTask, ScheduleBody, TaskBody};
