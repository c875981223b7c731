#![allow(dead_code)]
use log::LevelFilter;
use meddler::{Executor, Result, Row, RowNames, RowSet, RowsAffected, Value};
use std::env;

pub fn init_logs() {
    let mut logger = env_logger::builder();
    logger
        .is_test(true)
        .format_file(true)
        .format_line_number(true);
    if env::var("RUST_LOG").is_err() {
        logger.filter_level(LevelFilter::Warn);
    }
    let _ = logger.try_init();
}

/// Single table kept in memory. Statements are not parsed: `execute` appends a row
/// made of a new id followed by the arguments, `query` returns every row, or the
/// row whose id is the first argument.
#[derive(Debug)]
pub struct MemoryTable {
    pub columns: RowNames,
    pub rows: Vec<Row>,
    pub statements: Vec<String>,
    next_id: i64,
}

impl MemoryTable {
    pub fn new(columns: &[&str]) -> Self {
        Self {
            columns: columns.iter().map(|v| v.to_string()).collect(),
            rows: Vec::new(),
            statements: Vec::new(),
            next_id: 1,
        }
    }

    /// Row stored under `id`.
    pub fn row(&self, id: i64) -> Option<&Row> {
        self.rows
            .iter()
            .find(|row| row.first() == Some(&Value::Int64(Some(id))))
    }
}

impl Executor for MemoryTable {
    type Rows = RowSet;

    async fn execute(&mut self, sql: &str, args: &[Value]) -> Result<RowsAffected> {
        self.statements.push(sql.to_string());
        let id = self.next_id;
        self.next_id += 1;
        let row = [Value::Int64(Some(id))]
            .into_iter()
            .chain(args.iter().cloned())
            .collect::<Vec<_>>();
        if row.len() != self.columns.len() {
            return Err(meddler::Error::msg(format!(
                "Expected {} values, got {}",
                self.columns.len() - 1,
                args.len()
            )));
        }
        self.rows.push(row.into_boxed_slice());
        Ok(RowsAffected {
            rows_affected: 1,
            last_affected_id: Some(id),
        })
    }

    async fn query(&mut self, sql: &str, args: &[Value]) -> Result<RowSet> {
        self.statements.push(sql.to_string());
        let rows = match args.first() {
            Some(id) => self
                .rows
                .iter()
                .filter(|row| row.first() == Some(id))
                .cloned()
                .collect::<Vec<_>>(),
            None => self.rows.clone(),
        };
        Ok(RowSet::new(self.columns.clone(), rows))
    }
}
