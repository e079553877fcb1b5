//! Rendered tables ready for a tabular store.

use serde::{Deserialize, Serialize};

/// A single sheet cell.
///
/// Serializes untagged so a row becomes a plain JSON array of strings and
/// numbers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Cell {
    /// Text value.
    Text(String),
    /// Numeric value.
    Number(f64),
}

impl Cell {
    /// Creates a text cell.
    pub fn text(value: impl Into<String>) -> Self {
        Cell::Text(value.into())
    }

    /// Numeric value of the cell; text that parses as a number counts, anything
    /// else is zero.
    pub fn as_number(&self) -> f64 {
        let value = match self {
            Cell::Number(n) => *n,
            Cell::Text(s) => s.trim().parse::<f64>().unwrap_or(0.0),
        };
        if value.is_finite() {
            value
        } else {
            0.0
        }
    }
}

/// Header plus data rows for one sheet.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Table {
    /// Column names.
    pub header: Vec<String>,
    /// Data rows, each as wide as the header.
    pub rows: Vec<Vec<Cell>>,
}

impl Table {
    /// Creates a table.
    pub fn new(header: Vec<String>, rows: Vec<Vec<Cell>>) -> Self {
        Self { header, rows }
    }

    /// Number of columns.
    pub fn width(&self) -> usize {
        self.header.len()
    }

    /// Number of data rows.
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// Returns true if there are no data rows.
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Iterates over data rows in fixed-size batches, preserving order.
    ///
    /// A zero batch size is treated as one.
    pub fn batches(&self, batch_size: usize) -> std::slice::Chunks<'_, Vec<Cell>> {
        self.rows.chunks(batch_size.max(1))
    }
}
