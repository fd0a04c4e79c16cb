use chrono::NaiveDateTime;

/// Output format of the combined `date` column.
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Share of unparseable timestamps above which the month-first reading is dropped.
pub const DEFAULT_DAY_FIRST_THRESHOLD: f64 = 0.5;

// Year-first forms are unambiguous and accepted by both passes.
const ISO_FORMATS: [&str; 4] = [
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%d %H:%M",
    "%Y/%m/%d %H:%M:%S",
    "%Y/%m/%d %H:%M",
];

const MONTH_FIRST_FORMATS: [&str; 4] = [
    "%m/%d/%Y %H:%M:%S",
    "%m/%d/%Y %H:%M",
    "%m-%d-%Y %H:%M:%S",
    "%m-%d-%Y %H:%M",
];

const DAY_FIRST_FORMATS: [&str; 6] = [
    "%d/%m/%Y %H:%M:%S",
    "%d/%m/%Y %H:%M",
    "%d-%m-%Y %H:%M:%S",
    "%d-%m-%Y %H:%M",
    "%d.%m.%Y %H:%M:%S",
    "%d.%m.%Y %H:%M",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DateOrder {
    MonthFirst,
    DayFirst,
}

impl DateOrder {
    fn formats(&self) -> impl Iterator<Item = &'static str> {
        let specific: &'static [&'static str] = match self {
            DateOrder::MonthFirst => &MONTH_FIRST_FORMATS,
            DateOrder::DayFirst => &DAY_FIRST_FORMATS,
        };
        ISO_FORMATS.iter().chain(specific.iter()).copied()
    }
}

pub fn parse_timestamp(value: &str, order: DateOrder) -> Option<NaiveDateTime> {
    let value = value.trim();
    order
        .formats()
        .find_map(|format| NaiveDateTime::parse_from_str(value, format).ok())
}

/// Parses a whole column of combined "date time" strings.
///
/// The column is read month-first; when the number of failures is strictly greater
/// than `day_first_threshold × len`, the whole column is read again day-first so a
/// file never mixes both interpretations. Returns the order that was kept.
pub fn parse_timestamps(
    values: &[String],
    day_first_threshold: f64,
) -> (Vec<Option<NaiveDateTime>>, DateOrder) {
    let month_first: Vec<_> = values
        .iter()
        .map(|v| parse_timestamp(v, DateOrder::MonthFirst))
        .collect();
    let failures = month_first.iter().filter(|t| t.is_none()).count();
    if failures as f64 > day_first_threshold * values.len() as f64 {
        let day_first = values
            .iter()
            .map(|v| parse_timestamp(v, DateOrder::DayFirst))
            .collect();
        (day_first, DateOrder::DayFirst)
    } else {
        (month_first, DateOrder::MonthFirst)
    }
}
