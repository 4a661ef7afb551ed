//! Turns field sequences into records keyed by the header

use log::{debug, trace};
use serde_json::Value;

use crate::record::Record;

use super::Transform;

/// Pairs each row with the header, which is taken from (or named after) the first row
pub struct RowMaterializer {
    header: Option<Vec<String>>,
    headers_enabled: bool,
    separator: Option<char>,
}

impl RowMaterializer {
    pub fn new(headers_enabled: bool, separator: Option<char>) -> Self {
        Self {
            header: None,
            headers_enabled,
            separator,
        }
    }

    /// A row made only of the separator character (empty fields included) divides the header
    /// from the data, as in markdown's `---|---`
    fn is_separator_row(&self, row: &[String]) -> bool {
        match self.separator {
            Some(separator) => row
                .iter()
                .all(|field| field.chars().all(|c| c == separator)),
            None => false,
        }
    }
}

impl Transform for RowMaterializer {
    type Input = Vec<String>;
    type Output = Record;

    fn step(&mut self, row: Vec<String>) -> Option<Record> {
        if self.header.is_none() {
            if self.headers_enabled {
                debug!("Header: {:?}", row);
                self.header = Some(row);
                return None;
            }
            // placeholder names, the row itself is still data
            let header = (0..row.len()).map(|i| format!("col_{i}")).collect();
            self.header = Some(header);
        }
        if self.is_separator_row(&row) {
            debug!("Skipping separator row: {:?}", row);
            return None;
        }
        let header = self.header.as_ref()?;
        let mut record = Record::with_capacity(header.len().min(row.len()));
        // zip stops at the shorter of the two, so short rows miss keys and long rows lose fields
        for (name, value) in header.iter().zip(row) {
            // a repeated header name keeps the value of its first occurrence
            record
                .entry(name.clone())
                .or_insert(Value::String(value));
        }
        trace!("Record: {:?}", record);
        Some(record)
    }
}
