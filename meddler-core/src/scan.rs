use crate::{
    ConversionError, Metadata, NoRows, Record, Result, ResultSet, ScanTarget, SchemaError,
    is_no_rows, metadata,
};
use anyhow::{Context, bail};
use log::{debug, error};

fn not_accessible(metadata: &Metadata, column: &'static str) -> SchemaError {
    SchemaError::NotAccessible {
        record: metadata.record(),
        column,
    }
}

/// Scan targets for a row with the given `columns`.
///
/// Mapped columns get the target produced by their meddler, the others are
/// discarded so `SELECT *` can return columns the struct does not have.
pub fn targets<T: Record>(src: &T, columns: &[impl AsRef<str>]) -> Result<Vec<ScanTarget>> {
    let metadata = metadata::<T>()?;
    columns
        .iter()
        .map(|name| {
            let name = name.as_ref();
            let Some(column) = metadata.column(name) else {
                debug!(
                    "Column `{name}` has no field in {}, its value is discarded",
                    metadata.record()
                );
                return Ok(ScanTarget::Discard);
            };
            src.with_field(column.field, |field| column.meddler.pre_read(field))
                .ok_or_else(|| not_accessible(&metadata, column.name))?
                .map_err(|e| ConversionError::wrap(name, e))
        })
        .collect()
}

/// Move the scanned `targets` into the fields mapped by `columns`.
///
/// Stops at the first failure, fields converted before it keep their new value.
pub fn write_targets<T: Record>(
    dst: &mut T,
    columns: &[impl AsRef<str>],
    targets: Vec<ScanTarget>,
) -> Result<()> {
    if columns.len() != targets.len() {
        bail!(
            "Got {} columns but {} scan targets",
            columns.len(),
            targets.len()
        );
    }
    let metadata = metadata::<T>()?;
    for (name, target) in columns.iter().zip(targets) {
        let name = name.as_ref();
        let Some(column) = metadata.column(name) else {
            continue;
        };
        dst.with_field_mut(column.field, |field| column.meddler.post_read(field, target))
            .ok_or_else(|| not_accessible(&metadata, column.name))?
            .map_err(|e| ConversionError::wrap(name, e))?;
    }
    Ok(())
}

/// Read the next row into `dst`, leaving the result set open.
///
/// Returns [`NoRows`] when there is no row left, or the error that ended the
/// iteration if there is one.
pub fn scan<T: Record, R: ResultSet + ?Sized>(rows: &mut R, dst: &mut T) -> Result<()> {
    metadata::<T>()?;
    if !rows.advance() {
        rows.error()?;
        return Err(NoRows.into());
    }
    let columns = rows.columns().context("While reading the column names")?;
    let mut targets = targets(dst, &*columns)?;
    rows.scan(&mut targets)?;
    write_targets(dst, &*columns, targets)?;
    rows.error()
}

fn close<R: ResultSet + ?Sized>(rows: &mut R, result: Result<()>) -> Result<()> {
    let closed = rows.close();
    match result {
        Ok(()) => closed.context("While closing the result set"),
        Err(e) => {
            if let Err(close) = closed {
                error!("While closing the result set after an error: {close:#}");
            }
            Err(e)
        }
    }
}

/// Read exactly one row into `dst` and close the result set.
pub fn scan_row<T: Record, R: ResultSet + ?Sized>(rows: &mut R, dst: &mut T) -> Result<()> {
    let result = scan(rows, dst);
    close(rows, result)
}

/// Append every remaining row to `dst` and close the result set. No rows is not an
/// error.
pub fn scan_all<T: Record + Default, R: ResultSet + ?Sized>(
    rows: &mut R,
    dst: &mut Vec<T>,
) -> Result<()> {
    scan_all_with(rows, dst, T::default)
}

/// Like [`scan_all`] with each row read into a value created by `factory`.
pub fn scan_all_with<T: Record, R: ResultSet + ?Sized>(
    rows: &mut R,
    dst: &mut Vec<T>,
    mut factory: impl FnMut() -> T,
) -> Result<()> {
    let mut result = metadata::<T>().map(|_| ());
    while result.is_ok() {
        let mut item = factory();
        match scan(rows, &mut item) {
            Ok(()) => dst.push(item),
            Err(e) if is_no_rows(&e) => break,
            Err(e) => {
                result = Err(e);
                break;
            }
        }
    }
    close(rows, result)
}
