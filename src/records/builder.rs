use crate::normalize::canonical::canonicalize;
use crate::normalize::columns::ColumnMatcher;
use crate::records::timestamp::{parse_timestamps, DateOrder, TIMESTAMP_FORMAT};
use crate::retrieval::error::RetrievalError;
use crate::types::maturity::Maturity;
use crate::types::raw_table::RawTable;
use crate::types::vocabulary::{ColumnRole, Vocabulary};
use log::debug;
use polars::prelude::*;

/// Name of the combined timestamp column.
pub const DATE_COLUMN: &str = "date";

/// One day of normalized records.
///
/// `frame` holds the `date` column followed by the desired measurement columns,
/// all as strings. The maturity of each row is kept apart because daily files
/// carry it in their name rather than in their content.
#[derive(Debug, Clone)]
pub struct DailyRecords {
    pub frame: DataFrame,
    pub maturities: Option<Vec<Option<Maturity>>>,
    pub date_order: DateOrder,
}

impl DailyRecords {
    /// The maturity observed in the data: the first mapped value, since one
    /// export only ever carries one revision level.
    pub fn observed_maturity(&self) -> Option<Maturity> {
        self.maturities
            .as_ref()
            .and_then(|values| values.iter().flatten().next().copied())
    }
}

/// Builds [`DailyRecords`] out of a parsed export.
#[derive(Debug, Clone)]
pub struct DailyRecordBuilder<'a> {
    vocabulary: &'a Vocabulary,
    day_first_threshold: f64,
}

impl<'a> DailyRecordBuilder<'a> {
    pub fn new(vocabulary: &'a Vocabulary, day_first_threshold: f64) -> Self {
        Self {
            vocabulary,
            day_first_threshold,
        }
    }

    /// Normalizes `table` into the canonical layout.
    ///
    /// # Errors
    ///
    /// [`RetrievalError::ColumnNotFound`] when the date or time column cannot be
    /// resolved; [`RetrievalError::DataFrameProcessing`] if the frame cannot be assembled.
    pub fn build(&self, mut table: RawTable) -> Result<DailyRecords, RetrievalError> {
        let dropped = table.drop_trailing_notes();
        if dropped > 0 {
            debug!("Dropped {} trailing note rows", dropped);
        }

        let matcher = ColumnMatcher::new(self.vocabulary);
        let labels = table.labels();
        let date_index = self.resolve(&matcher, &table, ColumnRole::Date)?;
        let time_index = self.resolve(&matcher, &table, ColumnRole::Time)?;

        let combined: Vec<String> = table
            .column(date_index)
            .zip(table.column(time_index))
            .map(|(date, time)| format!("{} {}", date.trim(), time.trim()))
            .collect();
        let (timestamps, date_order) = parse_timestamps(&combined, self.day_first_threshold);
        let dates: Vec<Option<String>> = timestamps
            .iter()
            .map(|t| t.map(|t| t.format(TIMESTAMP_FORMAT).to_string()))
            .collect();

        let mut columns = vec![Column::new(DATE_COLUMN.into(), dates)];
        for (name, raw) in matcher.match_desired_pairs(labels) {
            if name == DATE_COLUMN {
                continue;
            }
            let Some(index) = table.column_index(raw) else {
                continue;
            };
            let values: Vec<Option<String>> = table
                .column(index)
                .map(|cell| {
                    let cell = cell.trim();
                    (!cell.is_empty()).then(|| cell.to_string())
                })
                .collect();
            columns.push(Column::new(name.into(), values));
        }
        let frame = DataFrame::new(columns)?;

        let maturities = matcher
            .find(labels, ColumnRole::Maturity)
            .and_then(|label| table.column_index(label))
            .map(|index| {
                table
                    .column(index)
                    .map(|value| self.map_maturity(value))
                    .collect()
            });

        Ok(DailyRecords {
            frame,
            maturities,
            date_order,
        })
    }

    fn resolve(
        &self,
        matcher: &ColumnMatcher<'_>,
        table: &RawTable,
        role: ColumnRole,
    ) -> Result<usize, RetrievalError> {
        matcher
            .find(table.labels(), role)
            .and_then(|label| table.column_index(label))
            .ok_or_else(|| RetrievalError::ColumnNotFound {
                role,
                labels: table.labels().to_vec(),
            })
    }

    fn map_maturity(&self, value: &str) -> Option<Maturity> {
        let value = canonicalize(value);
        if value.is_empty() {
            return None;
        }
        self.vocabulary
            .maturity_labels
            .iter()
            .find(|(label, _)| canonicalize(label) == value)
            .map(|(_, maturity)| *maturity)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::records::timestamp::DEFAULT_DAY_FIRST_THRESHOLD;

    fn table(labels: &[&str], rows: &[&[&str]]) -> RawTable {
        let mut table = RawTable::new(labels.iter().map(|l| l.to_string()).collect());
        for row in rows {
            table.push_row(row.iter().map(|c| c.to_string()).collect());
        }
        table
    }

    fn strings(frame: &DataFrame, name: &str) -> Vec<Option<String>> {
        frame
            .column(name)
            .unwrap()
            .str()
            .unwrap()
            .into_iter()
            .map(|v| v.map(str::to_string))
            .collect()
    }

    #[test]
    fn test_build_regional_export() {
        let raw = table(
            &["Périmètre", "Nature", "Date", "Heures", "Consommation", "Nucléaire", "Taux de CO2"],
            &[
                &["Bretagne", "Données consolidées", "2023-03-04", "00:00", "3100", "", "20"],
                &["Bretagne", "Données consolidées", "2023-03-04", "00:30", "3050", "", "21"],
                &["RTE ne pourra être tenu responsable"],
            ],
        );
        let vocabulary = Vocabulary::default();
        let records = DailyRecordBuilder::new(&vocabulary, DEFAULT_DAY_FIRST_THRESHOLD)
            .build(raw)
            .unwrap();

        assert_eq!(
            records.frame.get_column_names_str(),
            vec!["date", "Consommation", "Nucléaire"]
        );
        assert_eq!(records.frame.height(), 2);
        assert_eq!(
            strings(&records.frame, "date"),
            vec![
                Some("2023-03-04 00:00:00".to_string()),
                Some("2023-03-04 00:30:00".to_string())
            ]
        );
        assert_eq!(strings(&records.frame, "Nucléaire"), vec![None, None]);
        assert_eq!(records.observed_maturity(), Some(Maturity::Consolidated));
        assert_eq!(records.date_order, DateOrder::MonthFirst);
    }

    #[test]
    fn test_measurements_renamed_to_vocabulary() {
        let raw = table(
            &["Date", "Heures", "Consommation (MW)", "Eolien terrestre"],
            &[&["2024-06-01", "12:00", "5000", "300"]],
        );
        let vocabulary = Vocabulary::default();
        let records = DailyRecordBuilder::new(&vocabulary, DEFAULT_DAY_FIRST_THRESHOLD)
            .build(raw)
            .unwrap();
        // The onshore column keeps its own name rather than standing in for "Eolien".
        assert_eq!(
            records.frame.get_column_names_str(),
            vec!["date", "Consommation", "Eolien terrestre"]
        );
        assert_eq!(records.observed_maturity(), None);
        assert!(records.maturities.is_none());
    }

    #[test]
    fn test_discharge_values_keep_their_name() {
        let raw = table(
            &["Date", "Heures", "Déstockage batterie"],
            &[&["2024-06-01", "12:00", "42"]],
        );
        let vocabulary = Vocabulary::default();
        let records = DailyRecordBuilder::new(&vocabulary, DEFAULT_DAY_FIRST_THRESHOLD)
            .build(raw)
            .unwrap();
        assert_eq!(
            records.frame.get_column_names_str(),
            vec!["date", "Déstockage batterie"]
        );
        assert_eq!(
            strings(&records.frame, "Déstockage batterie"),
            vec![Some("42".to_string())]
        );
    }

    #[test]
    fn test_day_first_dates() {
        let raw = table(
            &["Date", "Heures", "Solaire"],
            &[
                &["28/07/2022", "13:00", "900"],
                &["28/07/2022", "13:15", "910"],
                &["05/07/2022", "13:30", "920"],
            ],
        );
        let vocabulary = Vocabulary::default();
        let records = DailyRecordBuilder::new(&vocabulary, DEFAULT_DAY_FIRST_THRESHOLD)
            .build(raw)
            .unwrap();
        assert_eq!(records.date_order, DateOrder::DayFirst);
        assert_eq!(
            strings(&records.frame, "date")[2],
            Some("2022-07-05 13:30:00".to_string())
        );
    }

    #[test]
    fn test_unmapped_maturity_is_null() {
        let raw = table(
            &["Nature", "Date", "Heures"],
            &[
                &["Données provisoires", "2024-01-01", "00:00"],
                &["Données temps réel", "2024-01-01", "00:15"],
            ],
        );
        let vocabulary = Vocabulary::default();
        let records = DailyRecordBuilder::new(&vocabulary, DEFAULT_DAY_FIRST_THRESHOLD)
            .build(raw)
            .unwrap();
        assert_eq!(
            records.maturities,
            Some(vec![None, Some(Maturity::RealTime)])
        );
        assert_eq!(records.observed_maturity(), Some(Maturity::RealTime));
    }

    #[test]
    fn test_missing_time_column() {
        let raw = table(&["Date", "Consommation"], &[&["2024-01-01", "1"]]);
        let vocabulary = Vocabulary::default();
        let result = DailyRecordBuilder::new(&vocabulary, DEFAULT_DAY_FIRST_THRESHOLD).build(raw);
        assert!(matches!(
            result,
            Err(RetrievalError::ColumnNotFound {
                role: ColumnRole::Time,
                ..
            })
        ));
    }
}
