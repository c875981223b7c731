use crate::{Identity, Meddler, Result, SchemaError, Serde, Time, ZeroIsNull};
use std::{
    collections::HashMap,
    sync::{Arc, LazyLock, PoisonError, RwLock},
};

/// Annotation token marking the primary key, never a meddler name.
pub const PRIMARY_KEY: &str = "pk";

/// Name of the meddler used by fields without a meddler token.
pub const DEFAULT_MEDDLER: &str = "identity";

static REGISTRY: LazyLock<RwLock<HashMap<String, Arc<dyn Meddler>>>> = LazyLock::new(|| {
    let builtin: [(&str, Arc<dyn Meddler>); 10] = [
        (DEFAULT_MEDDLER, Arc::new(Identity)),
        (Time::LOCAL.name(), Arc::new(Time::LOCAL)),
        (Time::LOCAL_ZERO_IS_NULL.name(), Arc::new(Time::LOCAL_ZERO_IS_NULL)),
        (Time::UTC.name(), Arc::new(Time::UTC)),
        (Time::UTC_ZERO_IS_NULL.name(), Arc::new(Time::UTC_ZERO_IS_NULL)),
        ("zeroisnull", Arc::new(ZeroIsNull)),
        ("json", Arc::new(Serde::JSON)),
        ("jsongzip", Arc::new(Serde::JSON_GZIP)),
        ("bincode", Arc::new(Serde::BINCODE)),
        ("bincodegzip", Arc::new(Serde::BINCODE_GZIP)),
    ];
    RwLock::new(
        builtin
            .into_iter()
            .map(|(name, meddler)| (name.to_string(), meddler))
            .collect(),
    )
});

/// Register `meddler` under `name`, replacing any previous registration.
///
/// Call at startup, before the first use of a record relying on `name`: metadata
/// already derived keeps the meddler it resolved.
pub fn register(name: impl Into<String>, meddler: impl Meddler + 'static) -> Result<()> {
    let name = name.into();
    if name == PRIMARY_KEY {
        return Err(SchemaError::ReservedName(name).into());
    }
    REGISTRY
        .write()
        .unwrap_or_else(PoisonError::into_inner)
        .insert(name, Arc::new(meddler));
    Ok(())
}

pub fn lookup(name: &str) -> Option<Arc<dyn Meddler>> {
    REGISTRY
        .read()
        .unwrap_or_else(PoisonError::into_inner)
        .get(name)
        .cloned()
}
