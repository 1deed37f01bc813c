//! PostgreSQL overwrite writer.
//!
//! Each [`PostgresSink::write_table`] call runs one transaction: create the
//! target if it does not exist, truncate it, then reload it with multi-row
//! inserts of `batch_size` rows. There is no merge or upsert path.

use regex::Regex;
use snafu::prelude::*;
use sqlx::postgres::PgPoolOptions;
use sqlx::{PgPool, Postgres, QueryBuilder};
use std::sync::LazyLock;
use std::time::Duration;
use tracing::{debug, info};

use crate::config::ConnectionSettings;
use crate::emit;
use crate::error::{ConnectSnafu, InvalidIdentifierSnafu, SinkError, WriteSnafu};
use crate::metrics::events::{TableWritten, WriteFailed};
use crate::table::Table;

/// Postgres caps bind parameters per statement at u16::MAX.
const MAX_BIND_PARAMS: usize = 65_535;

static IDENTIFIER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Za-z_][A-Za-z0-9_]*$").expect("Invalid regex pattern"));

/// SQL type chosen for a column when creating the target table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ColumnType {
    Text,
    BigInt,
}

impl ColumnType {
    fn as_sql(self) -> &'static str {
        match self {
            ColumnType::Text => "TEXT",
            ColumnType::BigInt => "BIGINT",
        }
    }
}

/// A writer that overwrites PostgreSQL tables from in-memory [`Table`]s.
pub struct PostgresSink {
    pool: PgPool,
    batch_size: usize,
}

impl PostgresSink {
    /// Open a connection pool from the run's connection settings.
    pub async fn connect(settings: &ConnectionSettings) -> Result<Self, SinkError> {
        let pool = PgPoolOptions::new()
            .max_connections(4)
            .acquire_timeout(Duration::from_secs(30))
            .connect(&settings.url())
            .await
            .context(ConnectSnafu)?;

        debug!("Connected to {}", settings.display_url());
        Ok(Self {
            pool,
            batch_size: settings.batch_size,
        })
    }

    /// Build a sink around an existing pool, for tests.
    pub fn with_pool(pool: PgPool, batch_size: usize) -> Self {
        Self { pool, batch_size }
    }

    /// Overwrite `target` with the contents of `table`.
    ///
    /// Returns the number of rows written. An empty table still creates and
    /// truncates the target, leaving an empty relation behind.
    pub async fn write_table(&self, table: &Table, target: &str) -> Result<u64, SinkError> {
        let result = self.write_table_inner(table, target).await;
        match &result {
            Ok(rows) => {
                emit!(TableWritten {
                    table: target.to_string(),
                    rows: *rows,
                });
                info!("Wrote {} rows into table {} successfully", rows, target);
            }
            Err(_) => {
                emit!(WriteFailed {
                    table: target.to_string(),
                });
            }
        }
        result
    }

    async fn write_table_inner(&self, table: &Table, target: &str) -> Result<u64, SinkError> {
        let target_ident = quote_identifier(target)?;
        let column_idents: Vec<String> = table
            .columns()
            .iter()
            .map(|c| quote_identifier(c))
            .collect::<Result<_, _>>()?;
        let types = column_types(table);

        let mut tx = self.pool.begin().await.context(WriteSnafu {
            table: target.to_string(),
        })?;

        let column_defs: Vec<String> = column_idents
            .iter()
            .zip(&types)
            .map(|(ident, ty)| format!("{ident} {}", ty.as_sql()))
            .collect();
        let ddl = format!(
            "CREATE TABLE IF NOT EXISTS {target_ident} ({})",
            column_defs.join(", ")
        );
        sqlx::query(&ddl)
            .execute(&mut *tx)
            .await
            .context(WriteSnafu {
                table: target.to_string(),
            })?;

        sqlx::query(&format!("TRUNCATE TABLE {target_ident}"))
            .execute(&mut *tx)
            .await
            .context(WriteSnafu {
                table: target.to_string(),
            })?;

        let chunk_rows = rows_per_statement(self.batch_size, table.columns().len());
        let mut written = 0u64;
        for chunk in table.rows().chunks(chunk_rows) {
            let mut builder: QueryBuilder<Postgres> = QueryBuilder::new(format!(
                "INSERT INTO {target_ident} ({}) ",
                column_idents.join(", ")
            ));
            builder.push_values(chunk, |mut b, row| {
                for (cell, ty) in row.iter().zip(&types) {
                    match ty {
                        ColumnType::BigInt => {
                            b.push_bind(cell.as_deref().and_then(|v| v.parse::<i64>().ok()));
                        }
                        ColumnType::Text => {
                            b.push_bind(cell.clone());
                        }
                    }
                }
            });
            let result = builder
                .build()
                .execute(&mut *tx)
                .await
                .context(WriteSnafu {
                    table: target.to_string(),
                })?;
            written += result.rows_affected();
        }

        tx.commit().await.context(WriteSnafu {
            table: target.to_string(),
        })?;

        debug!(
            rows = written,
            batch_size = chunk_rows,
            "Committed overwrite of {}",
            target
        );
        Ok(written)
    }
}

/// Validate and double-quote a SQL identifier.
fn quote_identifier(name: &str) -> Result<String, SinkError> {
    ensure!(
        IDENTIFIER.is_match(name) && name.len() <= 63,
        InvalidIdentifierSnafu {
            name: name.to_string(),
        }
    );
    Ok(format!("\"{name}\""))
}

/// Choose a SQL type per column.
///
/// Source columns arrived as text and stay TEXT: a sku like "007" must read
/// back byte-for-byte, not as the integer 7. Only the generated count
/// column is typed BIGINT, and only when every non-null cell parses as an
/// i64 (so a hand-made table with a bogus count still lands as text rather
/// than silently binding nulls).
fn column_types(table: &Table) -> Vec<ColumnType> {
    (0..table.columns().len())
        .map(|col| {
            if table.columns()[col] != crate::transform::COUNT_COLUMN {
                return ColumnType::Text;
            }
            let all_integers = table
                .rows()
                .iter()
                .filter_map(|row| row[col].as_deref())
                .all(|v| v.parse::<i64>().is_ok());
            if all_integers {
                ColumnType::BigInt
            } else {
                ColumnType::Text
            }
        })
        .collect()
}

/// Rows per INSERT statement: the configured batch size, clamped so the
/// statement stays under the bind-parameter limit.
fn rows_per_statement(batch_size: usize, num_columns: usize) -> usize {
    batch_size.min(MAX_BIND_PARAMS / num_columns.max(1)).max(1)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_quote_identifier_accepts_plain_names() {
        assert_eq!(quote_identifier("prod_desc").unwrap(), "\"prod_desc\"");
        assert_eq!(quote_identifier("_tmp").unwrap(), "\"_tmp\"");
    }

    #[test]
    fn test_quote_identifier_rejects_injection() {
        for bad in ["", "1st", "a b", "x;drop table y", "a\"b", "café"] {
            assert!(
                matches!(
                    quote_identifier(bad),
                    Err(SinkError::InvalidIdentifier { .. })
                ),
                "expected rejection for {bad:?}"
            );
        }
    }

    #[test]
    fn test_count_column_is_bigint() {
        let mut t = Table::new(vec!["name".into(), "no_of_products".into()]);
        t.push_row(vec![Some("Widget".into()), Some("2".into())]);
        t.push_row(vec![Some("Gadget".into()), Some("1".into())]);

        assert_eq!(column_types(&t), vec![ColumnType::Text, ColumnType::BigInt]);
    }

    #[test]
    fn test_numeric_looking_source_text_stays_text() {
        // Skus with leading zeros must read back byte-for-byte
        let mut t = Table::new(vec!["sku".into(), "name".into()]);
        t.push_row(vec![Some("007".into()), Some("Widget".into())]);
        t.push_row(vec![Some("042".into()), Some("Gadget".into())]);

        assert_eq!(column_types(&t), vec![ColumnType::Text, ColumnType::Text]);
    }

    #[test]
    fn test_count_column_with_non_integer_cell_stays_text() {
        let mut t = Table::new(vec!["no_of_products".into()]);
        t.push_row(vec![Some("2".into())]);
        t.push_row(vec![Some("many".into())]);

        assert_eq!(column_types(&t), vec![ColumnType::Text]);
    }

    #[test]
    fn test_empty_count_column_is_bigint() {
        let t = Table::new(vec!["name".into(), "no_of_products".into()]);
        assert_eq!(column_types(&t), vec![ColumnType::Text, ColumnType::BigInt]);
    }

    #[test]
    fn test_rows_per_statement_clamps_to_bind_limit() {
        assert_eq!(rows_per_statement(1000, 2), 1000);
        assert_eq!(rows_per_statement(100_000, 2), MAX_BIND_PARAMS / 2);
        assert_eq!(rows_per_statement(100_000, 0), MAX_BIND_PARAMS);
        assert_eq!(rows_per_statement(1, 70_000), 1);
    }
}
