//! Alert deduplication, severity gating, multi-sink fan-out dispatch, and
//! the three notification sink implementations.

pub mod dedup;
pub mod dispatcher;
pub mod sink;
pub mod sinks;

pub use dispatcher::AlertDispatcher;
pub use sink::NotificationSink;
