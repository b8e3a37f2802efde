//! Query modules operating on a borrowed connection.

pub mod counter_ops;
pub mod queue_ops;
pub mod snapshot_ops;
