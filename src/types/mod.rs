pub mod date_range;
pub mod maturity;
pub mod raw_table;
pub mod vocabulary;
