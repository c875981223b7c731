use crate::{
    Column, ConversionError, Dialect, Error, Metadata, Record, Result, SchemaError, Value, metadata,
    separated_by,
};
use anyhow::Context;
use log::debug;

fn mapped(metadata: &Metadata, include_pk: bool) -> impl Iterator<Item = &Column> {
    metadata
        .columns()
        .iter()
        .filter(move |c| include_pk || !c.primary_key)
}

fn write_value<T: Record>(src: &T, metadata: &Metadata, column: &Column) -> Result<Value> {
    src.with_field(column.field, |field| column.meddler.pre_write(field))
        .ok_or_else(|| SchemaError::NotAccessible {
            record: metadata.record(),
            column: column.name,
        })?
        .map_err(|e| ConversionError::wrap(column.name, e))
}

/// Column names of `T` in declaration order.
pub fn columns<T: Record>(include_pk: bool) -> Result<Vec<&'static str>> {
    let metadata = metadata::<T>()?;
    Ok(mapped(&metadata, include_pk).map(|c| c.name).collect())
}

/// Quoted, comma separated column names of `T`.
pub fn columns_quoted<T: Record>(dialect: &Dialect, include_pk: bool) -> Result<String> {
    let metadata = metadata::<T>()?;
    let mut out = String::new();
    separated_by(
        &mut out,
        mapped(&metadata, include_pk),
        |out, c| dialect.write_quoted(out, c.name),
        ",",
    );
    Ok(out)
}

/// Primary key column and value of `src`, `None` when `T` has no primary key.
pub fn primary_key<T: Record>(src: &T) -> Result<Option<(&'static str, i64)>> {
    let metadata = metadata::<T>()?;
    let Some(column) = metadata.primary_key() else {
        return Ok(None);
    };
    let value = src
        .with_field(column.field, |field| field.value())
        .ok_or_else(|| SchemaError::NotAccessible {
            record: metadata.record(),
            column: column.name,
        })??;
    let id = value
        .to_i64()
        .with_context(|| format!("While reading the primary key `{}`", column.name))?;
    Ok(Some((column.name, id)))
}

/// Store `id` in the primary key field of `dst`.
pub fn set_primary_key<T: Record>(dst: &mut T, id: i64) -> Result<()> {
    let metadata = metadata::<T>()?;
    let Some(column) = metadata.primary_key() else {
        return Err(Error::msg(format!(
            "{} has no primary key",
            metadata.record()
        )));
    };
    dst.with_field_mut(column.field, |field| field.assign(Value::Int64(Some(id))))
        .ok_or_else(|| SchemaError::NotAccessible {
            record: metadata.record(),
            column: column.name,
        })?
        .with_context(|| format!("While setting the primary key `{}`", column.name))
}

/// Values of `src` to bind in a statement, converted by the meddlers, in
/// [`columns`] order.
pub fn values<T: Record>(src: &T, include_pk: bool) -> Result<Vec<Value>> {
    let metadata = metadata::<T>()?;
    mapped(&metadata, include_pk)
        .map(|c| write_value(src, &metadata, c))
        .collect()
}

/// Like [`values`] for an explicit list of columns. Columns `T` does not map are
/// written as NULL.
pub fn some_values<T: Record>(src: &T, columns: &[impl AsRef<str>]) -> Result<Vec<Value>> {
    let metadata = metadata::<T>()?;
    columns
        .iter()
        .map(|name| {
            let name = name.as_ref();
            match metadata.column(name) {
                Some(column) => write_value(src, &metadata, column),
                None => {
                    debug!(
                        "Column `{name}` has no field in {}, written as NULL",
                        metadata.record()
                    );
                    Ok(Value::Null)
                }
            }
        })
        .collect()
}

/// One placeholder per column, numbered from 1 when the dialect needs it.
pub fn placeholders<T: Record>(dialect: &Dialect, include_pk: bool) -> Result<Vec<String>> {
    let metadata = metadata::<T>()?;
    Ok((1..=mapped(&metadata, include_pk).count())
        .map(|i| dialect.placeholder(i))
        .collect())
}

/// [`placeholders`] joined by commas.
pub fn placeholders_string<T: Record>(dialect: &Dialect, include_pk: bool) -> Result<String> {
    let metadata = metadata::<T>()?;
    let mut out = String::new();
    separated_by(
        &mut out,
        1..=mapped(&metadata, include_pk).count(),
        |out, i| dialect.write_placeholder(out, i),
        ",",
    );
    Ok(out)
}
