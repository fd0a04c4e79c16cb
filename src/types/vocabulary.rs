//! The column and label vocabulary of the eco2mix exports.
//!
//! Kept as plain data handed to the normalizer and record builder so tests (or a
//! different portal) can swap in their own names.

use crate::types::maturity::Maturity;

/// The measurement columns extracted from every export, in output order.
pub const DESIRED_COLS: [&str; 12] = [
    "Consommation",
    "Thermique",
    "Nucléaire",
    "Eolien",
    "Solaire",
    "Hydraulique",
    "Pompage",
    "Bioénergies",
    "Stockage batterie",
    "Déstockage batterie",
    "Eolien terrestre",
    "Eolien offshore",
];

/// Raw "Nature" values and the maturity each one denotes.
pub const MATURITY_LABELS: [(&str, Maturity); 3] = [
    ("Données temps réel", Maturity::RealTime),
    ("Données consolidées", Maturity::Consolidated),
    ("Données définitives", Maturity::Definitive),
];

/// Columns with a structural role, as opposed to measurement columns.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ColumnRole {
    Date,
    Time,
    Maturity,
}

impl ColumnRole {
    /// Keyword searched for inside canonical labels when no candidate matches exactly.
    pub(crate) fn keyword(&self) -> &'static str {
        match self {
            ColumnRole::Date => "date",
            ColumnRole::Time => "heure",
            ColumnRole::Maturity => "nature",
        }
    }
}

impl std::fmt::Display for ColumnRole {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            ColumnRole::Date => "date",
            ColumnRole::Time => "time",
            ColumnRole::Maturity => "maturity",
        };
        write!(f, "{}", name)
    }
}

/// Everything the pipeline needs to know about the names used by the source.
///
/// `Vocabulary::default()` describes the eco2mix exports. Candidate names are
/// compared in their canonical form (see [`crate::canonicalize`]).
#[derive(Debug, Clone, PartialEq)]
pub struct Vocabulary {
    /// Measurement columns to keep, in output order.
    pub desired_columns: Vec<String>,
    /// Raw maturity labels and their meaning.
    pub maturity_labels: Vec<(String, Maturity)>,
    /// Canonical names of the date column, in priority order.
    pub date_candidates: Vec<String>,
    /// Canonical names of the time column, in priority order.
    pub time_candidates: Vec<String>,
    /// Canonical names of the maturity column, in priority order.
    pub maturity_candidates: Vec<String>,
}

impl Vocabulary {
    pub(crate) fn candidates(&self, role: ColumnRole) -> &[String] {
        match role {
            ColumnRole::Date => &self.date_candidates,
            ColumnRole::Time => &self.time_candidates,
            ColumnRole::Maturity => &self.maturity_candidates,
        }
    }
}

impl Default for Vocabulary {
    fn default() -> Self {
        let owned = |names: &[&str]| names.iter().map(|n| n.to_string()).collect();
        Self {
            desired_columns: owned(&DESIRED_COLS),
            maturity_labels: MATURITY_LABELS
                .iter()
                .map(|(label, maturity)| (label.to_string(), *maturity))
                .collect(),
            date_candidates: owned(&["date", "date_jour", "date_heure"]),
            time_candidates: owned(&["heures", "heure", "heures_utc"]),
            maturity_candidates: owned(&["nature"]),
        }
    }
}
