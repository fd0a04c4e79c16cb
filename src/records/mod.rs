//! Normalized daily records: combined timestamps, desired measurement columns and
//! the maturity of each row.

pub mod builder;
pub mod timestamp;
