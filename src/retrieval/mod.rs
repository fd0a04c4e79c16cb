pub mod daily_file;
pub mod error;
pub mod loader;
pub mod source;
