use crate::{Record, Result, ResultSet, RowsAffected, Value, scan_all, scan_row, truncate_long};
use anyhow::Context;
use std::future::Future;

/// Database handle running statements, provided by the driver.
pub trait Executor: Send {
    type Rows: ResultSet + Send;

    /// Run a statement that does not return rows.
    fn execute(
        &mut self,
        sql: &str,
        args: &[Value],
    ) -> impl Future<Output = Result<RowsAffected>> + Send;

    /// Run a query and return its rows.
    fn query(&mut self, sql: &str, args: &[Value])
    -> impl Future<Output = Result<Self::Rows>> + Send;
}

/// Run `sql` and read the single row it returns into `dst`.
///
/// Returns [`NoRows`](crate::NoRows) when the query returns nothing.
pub async fn query_row<E: Executor, T: Record>(
    executor: &mut E,
    dst: &mut T,
    sql: &str,
    args: &[Value],
) -> Result<()> {
    let mut rows = executor
        .query(sql, args)
        .await
        .with_context(|| format!("While running the query:\n{}", truncate_long!(sql)))?;
    scan_row(&mut rows, dst)
}

/// Run `sql` and append every row it returns to `dst`.
pub async fn query_all<E: Executor, T: Record + Default>(
    executor: &mut E,
    dst: &mut Vec<T>,
    sql: &str,
    args: &[Value],
) -> Result<()> {
    let mut rows = executor
        .query(sql, args)
        .await
        .with_context(|| format!("While running the query:\n{}", truncate_long!(sql)))?;
    scan_all(&mut rows, dst)
}
