use crate::{Error, Result, ScanTarget, Value};
use anyhow::{Context, bail};
use futures::{Stream, StreamExt};
use std::{collections::VecDeque, mem, pin::pin, sync::Arc};

/// Shared reference-counted column name list.
pub type RowNames = Arc<[String]>;
/// Owned row value slice matching `RowNames` length.
pub type Row = Box<[Value]>;

/// A result row with its corresponding column labels.
#[derive(Debug, Clone, PartialEq)]
pub struct RowLabeled {
    /// Column names.
    pub labels: RowNames,
    /// Data values (aligned by index with `labels`).
    pub values: Row,
}

impl RowLabeled {
    pub fn new(names: RowNames, values: Row) -> Self {
        Self {
            labels: names,
            values,
        }
    }
}

/// Outcome of a statement that does not return rows.
#[derive(Default, Debug, Clone, Copy, PartialEq, Eq)]
pub struct RowsAffected {
    /// Total number of rows impacted.
    pub rows_affected: u64,
    /// Backend-specific last inserted / affected identifier when available.
    pub last_affected_id: Option<i64>,
}

impl Extend<RowsAffected> for RowsAffected {
    fn extend<T: IntoIterator<Item = RowsAffected>>(&mut self, iter: T) {
        for elem in iter {
            self.rows_affected += elem.rows_affected;
            if elem.last_affected_id.is_some() {
                self.last_affected_id = elem.last_affected_id;
            }
        }
    }
}

/// Cursor over the rows returned by a query, provided by the database driver.
pub trait ResultSet {
    /// Column names, in the order [`ResultSet::scan`] fills the targets.
    fn columns(&self) -> Result<RowNames>;
    /// Move to the next row. `false` when exhausted or after a fetch error, see
    /// [`ResultSet::error`].
    fn advance(&mut self) -> bool;
    /// Error that stopped the iteration, reported once.
    fn error(&mut self) -> Result<()>;
    /// Fill `targets` with the current row, one target per column.
    fn scan(&mut self, targets: &mut [ScanTarget]) -> Result<()>;
    fn close(&mut self) -> Result<()>;
}

impl<R: ResultSet + ?Sized> ResultSet for &mut R {
    fn columns(&self) -> Result<RowNames> {
        (**self).columns()
    }
    fn advance(&mut self) -> bool {
        (**self).advance()
    }
    fn error(&mut self) -> Result<()> {
        (**self).error()
    }
    fn scan(&mut self, targets: &mut [ScanTarget]) -> Result<()> {
        (**self).scan(targets)
    }
    fn close(&mut self) -> Result<()> {
        (**self).close()
    }
}

/// Result set held in memory.
///
/// Used by drivers that fetch the whole result eagerly. A fetch error is kept as
/// the trailing error, rows received before it stay readable.
#[derive(Debug, Default)]
pub struct RowSet {
    labels: RowNames,
    rows: VecDeque<Row>,
    current: Option<Row>,
    error: Option<Error>,
    closed: bool,
}

impl RowSet {
    pub fn new(labels: RowNames, rows: impl IntoIterator<Item = Row>) -> Self {
        Self {
            labels,
            rows: rows.into_iter().collect(),
            ..Default::default()
        }
    }

    /// Rows sharing the labels of the first one.
    pub fn from_rows(rows: impl IntoIterator<Item = RowLabeled>) -> Self {
        let mut result = Self::default();
        for row in rows {
            if result.rows.is_empty() {
                result.labels = row.labels;
            }
            result.rows.push_back(row.values);
        }
        result
    }

    /// Drains `stream`, stopping at the first error.
    pub async fn collect(stream: impl Stream<Item = Result<RowLabeled>>) -> Self {
        let mut stream = pin!(stream);
        let mut result = Self::default();
        while let Some(row) = stream.next().await {
            match row {
                Ok(row) => {
                    if result.rows.is_empty() {
                        result.labels = row.labels;
                    }
                    result.rows.push_back(row.values);
                }
                Err(error) => {
                    result.error = Some(error);
                    break;
                }
            }
        }
        result
    }

    /// Sets the error reported once the rows are consumed.
    pub fn with_error(mut self, error: Error) -> Self {
        self.error = Some(error);
        self
    }

    pub fn is_closed(&self) -> bool {
        self.closed
    }

    /// Rows not yet advanced to.
    pub fn remaining(&self) -> usize {
        self.rows.len()
    }
}

impl ResultSet for RowSet {
    fn columns(&self) -> Result<RowNames> {
        if self.closed {
            bail!("The result set is closed");
        }
        Ok(self.labels.clone())
    }

    fn advance(&mut self) -> bool {
        if self.closed {
            self.current = None;
            return false;
        }
        self.current = self.rows.pop_front();
        self.current.is_some()
    }

    fn error(&mut self) -> Result<()> {
        if self.current.is_some() || !self.rows.is_empty() {
            return Ok(());
        }
        self.error.take().map_or(Ok(()), Err)
    }

    fn scan(&mut self, targets: &mut [ScanTarget]) -> Result<()> {
        let Some(row) = self.current.as_mut() else {
            bail!("Scan called without a current row");
        };
        if row.len() != targets.len() {
            bail!(
                "Expected {} scan targets, the row has {} columns",
                targets.len(),
                row.len()
            );
        }
        for (i, (target, value)) in targets.iter_mut().zip(row.iter_mut()).enumerate() {
            target
                .scan(mem::take(value))
                .with_context(|| format!("While scanning column `{}`", self.labels[i]))?;
        }
        Ok(())
    }

    fn close(&mut self) -> Result<()> {
        self.closed = true;
        self.rows.clear();
        self.current = None;
        Ok(())
    }
}
