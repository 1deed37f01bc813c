//! In-memory tabular data.
//!
//! A [`Table`] is a header plus rows of nullable string cells. All values
//! stay string-typed until the sink decides on SQL column types; a `None`
//! cell is a null.

/// A single row of nullable string cells.
pub type Row = Vec<Option<String>>;

/// An ordered, string-typed table with named columns.
#[derive(Debug, Clone, PartialEq)]
pub struct Table {
    columns: Vec<String>,
    rows: Vec<Row>,
}

impl Table {
    /// Create an empty table with the given column names.
    pub fn new(columns: Vec<String>) -> Self {
        Self {
            columns,
            rows: Vec::new(),
        }
    }

    /// Column names in declaration order.
    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    /// Index of the named column, if present.
    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c == name)
    }

    /// Append a row. The cell count must match the header.
    ///
    /// # Panics
    /// Panics if the row arity differs from the column count; rows only
    /// enter a table through readers and transforms that build them from
    /// the same header.
    pub fn push_row(&mut self, row: Row) {
        assert_eq!(
            row.len(),
            self.columns.len(),
            "row arity does not match header"
        );
        self.rows.push(row);
    }

    /// Rows in insertion order.
    pub fn rows(&self) -> &[Row] {
        &self.rows
    }

    pub fn num_rows(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Cell at `(row, col)`; `None` if out of range or null.
    pub fn cell(&self, row: usize, col: usize) -> Option<&str> {
        self.rows.get(row)?.get(col)?.as_deref()
    }
}
