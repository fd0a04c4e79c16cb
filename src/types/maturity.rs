//! Defines the `Maturity` enum, mapping eco2mix data revision levels to the short
//! codes used in cache file names.

use chrono::{Datelike, NaiveDate};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::Serialize;
use std::fmt;
use std::str::FromStr;

static DAILY_FILE_MATURITY: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"_(TR|CONS|DEF)_\d{4}-\d{2}-\d{2}\.csv$").expect("static regex is valid")
});

/// The revision level ("nature") of a day of eco2mix data.
///
/// RTE publishes the same day several times: first as real-time data, later as
/// consolidated data and finally as definitive data. A later revision supersedes
/// an earlier one, which is what [`Maturity::priority`] encodes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum Maturity {
    /// `TR`: "Données temps réel", published during the current year.
    #[serde(rename = "TR")]
    RealTime,
    /// `CONS`: "Données consolidées", typically the previous year.
    #[serde(rename = "CONS")]
    Consolidated,
    /// `DEF`: "Données définitives", older years.
    #[serde(rename = "DEF")]
    Definitive,
}

impl Maturity {
    pub const ALL: [Maturity; 3] = [
        Maturity::RealTime,
        Maturity::Consolidated,
        Maturity::Definitive,
    ];

    /// The short code embedded in daily cache file names.
    ///
    /// # Examples
    ///
    /// ```
    /// use eco2mix::Maturity;
    ///
    /// assert_eq!(Maturity::Consolidated.code(), "CONS");
    /// ```
    pub fn code(&self) -> &'static str {
        match self {
            Maturity::RealTime => "TR",
            Maturity::Consolidated => "CONS",
            Maturity::Definitive => "DEF",
        }
    }

    /// Ranking used to choose between several cached files of the same day.
    /// Higher wins: DEF(3) > CONS(2) > TR(1).
    pub fn priority(&self) -> u8 {
        match self {
            Maturity::RealTime => 1,
            Maturity::Consolidated => 2,
            Maturity::Definitive => 3,
        }
    }

    /// Attempts to convert a short code (`TR`, `CONS`, `DEF`) into a `Maturity`.
    ///
    /// Returns `None` for anything else, including lowercase codes.
    pub fn from_code(code: &str) -> Option<Self> {
        match code {
            "TR" => Some(Maturity::RealTime),
            "CONS" => Some(Maturity::Consolidated),
            "DEF" => Some(Maturity::Definitive),
            _ => None,
        }
    }

    /// Extracts the maturity from a daily cache file name such as
    /// `eco2mix_ARA_DEF_2021-03-04.csv`.
    ///
    /// Aggregated files (`eco2mix_ARA_2021-03-01_2021-03-04.csv`) and any other
    /// name yield `None`.
    ///
    /// # Examples
    ///
    /// ```
    /// use eco2mix::Maturity;
    ///
    /// assert_eq!(
    ///     Maturity::from_file_name("eco2mix_FR_TR_2024-05-01.csv"),
    ///     Some(Maturity::RealTime)
    /// );
    /// assert_eq!(Maturity::from_file_name("eco2mix_FR_2024-05-01_2024-05-03.csv"), None);
    /// ```
    pub fn from_file_name(file_name: &str) -> Option<Self> {
        DAILY_FILE_MATURITY
            .captures(file_name)
            .and_then(|caps| caps.get(1))
            .and_then(|m| Self::from_code(m.as_str()))
    }

    /// The revision RTE is expected to serve for `date` when running on `run_date`:
    /// same year → real-time, previous year → consolidated, anything older → definitive.
    pub fn expected_for(date: NaiveDate, run_date: NaiveDate) -> Self {
        let run_year = run_date.year();
        match date.year() {
            y if y >= run_year => Maturity::RealTime,
            y if y == run_year - 1 => Maturity::Consolidated,
            _ => Maturity::Definitive,
        }
    }
}

impl fmt::Display for Maturity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}

impl FromStr for Maturity {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_code(s).ok_or_else(|| format!("unknown maturity code '{s}'"))
    }
}
