/// Writes each value with `f`, putting `separator` between two non empty writes.
pub fn separated_by<T, F>(
    out: &mut String,
    values: impl IntoIterator<Item = T>,
    mut f: F,
    separator: &str,
) where
    F: FnMut(&mut String, T),
{
    let mut len = out.len();
    for v in values {
        if out.len() > len {
            out.push_str(separator);
        }
        len = out.len();
        f(out, v);
    }
}

/// Shortens a query to a size suitable for error messages.
#[macro_export]
macro_rules! truncate_long {
    ($query:expr) => {{
        let query: &str = &$query;
        match query.char_indices().nth(497) {
            Some((i, _)) => format!("{}...", query[..i].trim_end()),
            None => query.to_string(),
        }
    }};
}
