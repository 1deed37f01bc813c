//! In-memory transformations: cleansing and aggregation.
//!
//! Both operate on [`Table`] values and return fresh tables. Dedup and
//! group-by both keep first-seen input order, so repeated runs over the
//! same input produce identical output.

use snafu::prelude::*;
use std::collections::{HashMap, HashSet};

use crate::error::{MissingColumnSnafu, ProcessingError};
use crate::table::Table;

/// Sentinel substituted for a missing `sku`.
pub const UNDEFINED_SKU: &str = "undefined-sku";

/// Column holding the product identifier.
pub const SKU_COLUMN: &str = "sku";

/// Column holding the product name.
pub const NAME_COLUMN: &str = "name";

/// Column holding per-name counts in the aggregate output.
pub const COUNT_COLUMN: &str = "no_of_products";

/// Cleanse a source table.
///
/// Null `sku` cells are replaced with [`UNDEFINED_SKU`], then rows with a
/// duplicate `(sku, name)` pair are dropped. The first-seen row in input
/// order survives each duplicate group.
pub fn cleanse(source: &Table) -> Result<Table, ProcessingError> {
    let sku_idx = column(source, SKU_COLUMN)?;
    let name_idx = column(source, NAME_COLUMN)?;

    let mut cleansed = Table::new(source.columns().to_vec());
    let mut seen: HashSet<(String, Option<String>)> = HashSet::new();

    for row in source.rows() {
        let mut row = row.clone();
        if row[sku_idx].is_none() {
            row[sku_idx] = Some(UNDEFINED_SKU.to_string());
        }

        let key = (
            row[sku_idx].clone().unwrap_or_default(),
            row[name_idx].clone(),
        );
        if seen.insert(key) {
            cleansed.push_row(row);
        }
    }

    Ok(cleansed)
}

/// Aggregate a cleansed table by product name.
///
/// Produces a `(name, no_of_products)` table with one row per distinct
/// `name`, in first-seen order. Counts are emitted as cells so the result
/// flows through the same sink path as the description table; the sink
/// stores the count column as BIGINT.
pub fn aggregate(cleansed: &Table) -> Result<Table, ProcessingError> {
    let name_idx = column(cleansed, NAME_COLUMN)?;

    let mut order: Vec<Option<String>> = Vec::new();
    let mut counts: HashMap<Option<String>, u64> = HashMap::new();

    for row in cleansed.rows() {
        let name = row[name_idx].clone();
        let entry = counts.entry(name.clone()).or_insert(0);
        if *entry == 0 {
            order.push(name);
        }
        *entry += 1;
    }

    let mut result = Table::new(vec![NAME_COLUMN.to_string(), COUNT_COLUMN.to_string()]);
    for name in order {
        let count = counts[&name];
        result.push_row(vec![name, Some(count.to_string())]);
    }

    Ok(result)
}

fn column(table: &Table, name: &str) -> Result<usize, ProcessingError> {
    table.column_index(name).context(MissingColumnSnafu {
        column: name.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn products(rows: &[(Option<&str>, Option<&str>)]) -> Table {
        let mut t = Table::new(vec![SKU_COLUMN.to_string(), NAME_COLUMN.to_string()]);
        for (sku, name) in rows {
            t.push_row(vec![
                sku.map(str::to_string),
                name.map(str::to_string),
            ]);
        }
        t
    }

    #[test]
    fn test_null_sku_gets_sentinel_and_duplicates_drop() {
        // Scenario: one null sku, one exact duplicate
        let source = products(&[
            (Some("A1"), Some("Widget")),
            (None, Some("Widget")),
            (Some("A1"), Some("Widget")),
        ]);
        let cleansed = cleanse(&source).unwrap();

        assert_eq!(cleansed.num_rows(), 2);
        assert_eq!(cleansed.cell(0, 0), Some("A1"));
        assert_eq!(cleansed.cell(1, 0), Some(UNDEFINED_SKU));
        assert_eq!(cleansed.cell(1, 1), Some("Widget"));
    }

    #[test]
    fn test_no_null_sku_survives() {
        let source = products(&[(None, Some("Widget")), (None, Some("Gadget"))]);
        let cleansed = cleanse(&source).unwrap();
        for row in 0..cleansed.num_rows() {
            assert!(cleansed.cell(row, 0).is_some());
        }
    }

    #[test]
    fn test_dedup_key_is_sku_name_pair() {
        // Same sku, different names: both survive
        let source = products(&[(Some("A1"), Some("Widget")), (Some("A1"), Some("Gadget"))]);
        let cleansed = cleanse(&source).unwrap();
        assert_eq!(cleansed.num_rows(), 2);
    }

    #[test]
    fn test_first_seen_row_survives() {
        let mut source = Table::new(vec![
            SKU_COLUMN.to_string(),
            NAME_COLUMN.to_string(),
            "price".to_string(),
        ]);
        source.push_row(vec![
            Some("A1".into()),
            Some("Widget".into()),
            Some("9.99".into()),
        ]);
        source.push_row(vec![
            Some("A1".into()),
            Some("Widget".into()),
            Some("19.99".into()),
        ]);

        let cleansed = cleanse(&source).unwrap();
        assert_eq!(cleansed.num_rows(), 1);
        assert_eq!(cleansed.cell(0, 2), Some("9.99"));
    }

    #[test]
    fn test_null_sku_collapses_with_sentinel_sku() {
        // A literal "undefined-sku" and a null sku are the same key after
        // substitution, matching the original substitute-then-dedup order.
        let source = products(&[(Some(UNDEFINED_SKU), Some("Widget")), (None, Some("Widget"))]);
        let cleansed = cleanse(&source).unwrap();
        assert_eq!(cleansed.num_rows(), 1);
    }

    #[test]
    fn test_cleanse_missing_column() {
        let mut source = Table::new(vec!["id".to_string()]);
        source.push_row(vec![Some("1".into())]);
        let err = cleanse(&source).unwrap_err();
        assert!(matches!(err, ProcessingError::MissingColumn { .. }));
    }

    #[test]
    fn test_aggregate_counts_per_name() {
        let cleansed = products(&[
            (Some("A1"), Some("Widget")),
            (Some("B2"), Some("Widget")),
            (Some("C3"), Some("Gadget")),
        ]);
        let agg = aggregate(&cleansed).unwrap();

        assert_eq!(
            agg.columns(),
            &[NAME_COLUMN.to_string(), COUNT_COLUMN.to_string()]
        );
        assert_eq!(agg.num_rows(), 2);
        // First-seen order
        assert_eq!(agg.cell(0, 0), Some("Widget"));
        assert_eq!(agg.cell(0, 1), Some("2"));
        assert_eq!(agg.cell(1, 0), Some("Gadget"));
        assert_eq!(agg.cell(1, 1), Some("1"));
    }

    #[test]
    fn test_aggregate_empty_input() {
        let cleansed = products(&[]);
        let agg = aggregate(&cleansed).unwrap();
        assert!(agg.is_empty());
        assert_eq!(agg.columns().len(), 2);
    }

    #[test]
    fn test_aggregate_count_matches_row_count() {
        let cleansed = cleanse(&products(&[
            (Some("A1"), Some("Widget")),
            (Some("B2"), Some("Widget")),
            (Some("B2"), Some("Widget")),
            (None, Some("Gadget")),
        ]))
        .unwrap();
        let agg = aggregate(&cleansed).unwrap();

        for row in 0..agg.num_rows() {
            let name = agg.cell(row, 0);
            let count: usize = agg.cell(row, 1).unwrap().parse().unwrap();
            let matching = cleansed
                .rows()
                .iter()
                .filter(|r| r[1].as_deref() == name)
                .count();
            assert_eq!(count, matching);
            assert!(count >= 1);
        }
    }
}
