use convert_case::{Case, Casing};
use std::{
    collections::HashSet,
    sync::{LazyLock, PoisonError, RwLock},
};

/// Column name of a field whose annotation does not name the column.
pub type Mapper = fn(&str) -> String;

static MAPPER: RwLock<Mapper> = RwLock::new(identity_case);

static NAMES: LazyLock<RwLock<HashSet<&'static str>>> = LazyLock::new(Default::default);

/// Keeps the field name as it is. The default mapper.
pub fn identity_case(name: &str) -> String {
    name.to_string()
}

/// `UserID` becomes `user_id`, `COLUMN_NAME` becomes `column_name`.
pub fn snake_case(name: &str) -> String {
    name.to_case(Case::Snake)
}

/// `UserID` becomes `userid`.
pub fn lower_case(name: &str) -> String {
    name.to_lowercase()
}

/// Replace the process-wide mapper.
///
/// Call at startup: metadata already derived keeps the names resolved at its first
/// use.
pub fn set_mapper(mapper: Mapper) {
    *MAPPER.write().unwrap_or_else(PoisonError::into_inner) = mapper;
}

pub fn mapper() -> Mapper {
    *MAPPER.read().unwrap_or_else(PoisonError::into_inner)
}

/// Apply `mapper` to `field`, interning the result so columns keep static names.
pub(crate) fn column_name(field: &'static str, mapper: Mapper) -> &'static str {
    let mapped = mapper(field);
    if mapped == field {
        return field;
    }
    if let Some(name) = NAMES
        .read()
        .unwrap_or_else(PoisonError::into_inner)
        .get(mapped.as_str())
        .copied()
    {
        return name;
    }
    let mut names = NAMES.write().unwrap_or_else(PoisonError::into_inner);
    if let Some(name) = names.get(mapped.as_str()).copied() {
        return name;
    }
    let name: &'static str = Box::leak(mapped.into_boxed_str());
    names.insert(name);
    name
}
