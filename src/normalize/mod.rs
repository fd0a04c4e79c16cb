//! Column label normalization and fuzzy column resolution.

pub mod canonical;
pub mod columns;
