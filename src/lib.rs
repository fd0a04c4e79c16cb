mod aggregate;
mod eco2mix;
mod error;
mod normalize;
mod parser;
mod records;
mod report;
mod retrieval;
mod types;
mod utils;

pub use eco2mix::*;
pub use error::Eco2mixError;

pub use parser::error::ParseError;
pub use parser::parse;

pub use normalize::canonical::canonicalize;
pub use normalize::columns::ColumnMatcher;

pub use records::builder::{DailyRecordBuilder, DailyRecords, DATE_COLUMN};
pub use records::timestamp::{parse_timestamps, DateOrder, DEFAULT_DAY_FIRST_THRESHOLD};

pub use retrieval::daily_file::{aggregated_file_name, daily_file_name, find_daily_files, DailyFile, LookupError};
pub use retrieval::error::{ErrorKind, RetrievalError};
pub use retrieval::loader::{CacheEntry, DailyCache};
pub use retrieval::source::{DataSource, HttpSource, BASE_URL, NATIONAL_REGION};

pub use aggregate::aggregator::{aggregate_region, RangeAggregator, RegionAggregate, DTYPE_COLUMN};
pub use aggregate::error::AggregateError;

pub use report::{AggregateStatus, BatchReport, DayOutcome, DayStatus};

pub use types::date_range::DateRange;
pub use types::maturity::Maturity;
pub use types::raw_table::RawTable;
pub use types::vocabulary::{ColumnRole, Vocabulary, DESIRED_COLS, MATURITY_LABELS};

pub use utils::{read_string_csv, CSV_SEPARATOR};
