use crate::{
    DEFAULT_MEDDLER, FieldKind, Mapper, Meddler, PRIMARY_KEY, Record, Result, SchemaError,
    column_name, lookup, mapper,
};
use log::trace;
use std::{
    any::{self, TypeId},
    collections::HashMap,
    fmt::{self, Debug, Formatter},
    sync::{Arc, LazyLock, PoisonError, RwLock},
};

/// Mapping between a struct field and a column.
#[derive(Clone)]
pub struct Column {
    pub name: &'static str,
    /// Index of the field in [`Record::fields`].
    pub field: usize,
    pub primary_key: bool,
    pub meddler_name: String,
    pub meddler: Arc<dyn Meddler>,
    pub kind: FieldKind,
}

impl Debug for Column {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.debug_struct("Column")
            .field("name", &self.name)
            .field("field", &self.field)
            .field("primary_key", &self.primary_key)
            .field("meddler", &self.meddler_name)
            .field("kind", &self.kind)
            .finish()
    }
}

/// Columns of a record type, derived once and cached for the process lifetime.
#[derive(Debug)]
pub struct Metadata {
    record: &'static str,
    columns: Vec<Column>,
    by_name: HashMap<&'static str, usize>,
    primary_key: Option<usize>,
}

static CACHE: LazyLock<RwLock<HashMap<TypeId, Arc<Metadata>>>> =
    LazyLock::new(Default::default);

/// Metadata of `T`, derived on first use.
///
/// Failures are not cached, every call on a malformed type reports the same error.
pub fn metadata<T: Record>() -> Result<Arc<Metadata>> {
    let id = TypeId::of::<T>();
    if let Some(metadata) = CACHE
        .read()
        .unwrap_or_else(PoisonError::into_inner)
        .get(&id)
    {
        trace!("Metadata cache hit for {}", any::type_name::<T>());
        return Ok(metadata.clone());
    }
    trace!("Metadata cache miss for {}", any::type_name::<T>());
    let metadata = Arc::new(Metadata::derive::<T>(mapper())?);
    Ok(CACHE
        .write()
        .unwrap_or_else(PoisonError::into_inner)
        .entry(id)
        .or_insert(metadata)
        .clone())
}

impl Metadata {
    fn derive<T: Record>(mapper: Mapper) -> Result<Metadata> {
        let record = any::type_name::<T>();
        let mut result = Metadata {
            record,
            columns: Vec::new(),
            by_name: HashMap::new(),
            primary_key: None,
        };
        for (index, decl) in T::fields().iter().enumerate() {
            if !decl.exported {
                continue;
            }
            let mut tokens = decl.tag.unwrap_or_default().split(',');
            let name = match tokens.next() {
                Some("-") => continue,
                Some(name) if !name.is_empty() => name,
                _ => column_name(decl.name, mapper),
            };
            if decl.kind == FieldKind::Unmapped {
                return Err(SchemaError::NotAccessible {
                    record,
                    column: name,
                }
                .into());
            }
            let mut primary_key = false;
            let mut meddler_name = DEFAULT_MEDDLER;
            for token in tokens {
                if token == PRIMARY_KEY {
                    primary_key = true;
                } else if lookup(token).is_some() {
                    meddler_name = token;
                } else {
                    return Err(SchemaError::UnknownMeddler {
                        record,
                        field: decl.name,
                        meddler: token.to_string(),
                    }
                    .into());
                }
            }
            let meddler = lookup(meddler_name).ok_or_else(|| SchemaError::UnknownMeddler {
                record,
                field: decl.name,
                meddler: meddler_name.to_string(),
            })?;
            meddler
                .validate(&decl.kind)
                .map_err(|e| SchemaError::Unsupported {
                    field: decl.name.to_string(),
                    meddler: meddler_name.to_string(),
                    reason: e.to_string(),
                })?;
            if primary_key {
                match &decl.kind {
                    FieldKind::Scalar { nullable: true, .. } => {
                        return Err(SchemaError::NullablePrimaryKey {
                            record,
                            field: decl.name,
                        }
                        .into());
                    }
                    FieldKind::Scalar { value, .. } if value.is_signed_integer() => {}
                    _ => {
                        return Err(SchemaError::NonIntegerPrimaryKey {
                            record,
                            field: decl.name,
                        }
                        .into());
                    }
                }
                if let Some(first) = result.primary_key() {
                    return Err(SchemaError::DuplicatePrimaryKey {
                        record,
                        first: first.name,
                        second: name,
                    }
                    .into());
                }
                result.primary_key = Some(result.columns.len());
            }
            if result.by_name.insert(name, result.columns.len()).is_some() {
                return Err(SchemaError::DuplicateColumn {
                    record,
                    column: name,
                }
                .into());
            }
            result.columns.push(Column {
                name,
                field: index,
                primary_key,
                meddler_name: meddler_name.to_string(),
                meddler,
                kind: decl.kind.clone(),
            });
        }
        Ok(result)
    }

    /// Type name of the record.
    pub fn record(&self) -> &'static str {
        self.record
    }

    /// Mapped columns, in field declaration order.
    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    pub fn column(&self, name: &str) -> Option<&Column> {
        self.by_name.get(name).map(|i| &self.columns[*i])
    }

    pub fn primary_key(&self) -> Option<&Column> {
        self.primary_key.map(|i| &self.columns[i])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        Value, register,
        testing::{Person, record},
    };
    use std::ptr;

    #[test]
    fn person() {
        let metadata = metadata::<Person>().unwrap();
        let names: Vec<_> = metadata.columns().iter().map(|c| c.name).collect();
        assert_eq!(
            names,
            ["id", "name", "Email", "Age", "opened", "closed", "updated", "height"]
        );
        let pk = metadata.primary_key().unwrap();
        assert_eq!(pk.name, "id");
        assert_eq!(pk.field, 0);
        assert_eq!(metadata.column("Age").unwrap().meddler_name, "zeroisnull");
        assert_eq!(metadata.column("closed").unwrap().meddler_name, "utctimez");
        assert_eq!(metadata.column("name").unwrap().meddler_name, "identity");
        assert_eq!(metadata.column("height").unwrap().field, 10);
        assert!(metadata.column("private").is_none());
        assert!(metadata.column("ephemeral").is_none());
        assert!(metadata.column("Ephemeral").is_none());
        assert!(metadata.record().ends_with("Person"));
    }

    #[test]
    fn mapped_names() {
        let metadata = Metadata::derive::<Person>(|name| name.to_uppercase()).unwrap();
        let names: Vec<_> = metadata.columns().iter().map(|c| c.name).collect();
        assert_eq!(
            names,
            ["id", "NAME", "Email", "Age", "opened", "closed", "updated", "HEIGHT"]
        );
        assert_eq!(metadata.column("HEIGHT").unwrap().field, 10);
        assert!(metadata.column("height").is_none());
    }

    #[test]
    fn cached() {
        let first = metadata::<Person>().unwrap();
        let second = metadata::<Person>().unwrap();
        assert!(ptr::eq(Arc::as_ptr(&first), Arc::as_ptr(&second)));
    }

    #[test]
    fn pk_with_meddler() {
        record!(Row {
            id: i64 = Some("id,pk,zeroisnull"),
            n: i64 = Some("n,zeroisnull,identity"),
        });
        let metadata = metadata::<Row>().unwrap();
        let pk = metadata.primary_key().unwrap();
        assert_eq!(pk.name, "id");
        assert_eq!(pk.meddler_name, "zeroisnull");
        assert_eq!(metadata.column("n").unwrap().meddler_name, "identity");
        assert!(!metadata.column("n").unwrap().primary_key);
    }

    fn schema_error<T: Record>() -> SchemaError {
        metadata::<T>()
            .unwrap_err()
            .downcast::<SchemaError>()
            .unwrap()
    }

    #[test]
    fn duplicate_column() {
        record!(Row {
            a: i32 = Some("x"),
            x: i32 = None,
        });
        assert!(matches!(
            schema_error::<Row>(),
            SchemaError::DuplicateColumn { column: "x", .. }
        ));
        // Not cached
        assert!(metadata::<Row>().is_err());
    }

    #[test]
    fn primary_keys() {
        record!(Two {
            a: i64 = Some("a,pk"),
            b: i64 = Some("b,pk"),
        });
        assert!(matches!(
            schema_error::<Two>(),
            SchemaError::DuplicatePrimaryKey {
                first: "a",
                second: "b",
                ..
            }
        ));
        record!(Nullable {
            id: Option<i64> = Some(",pk"),
        });
        assert!(matches!(
            schema_error::<Nullable>(),
            SchemaError::NullablePrimaryKey { field: "id", .. }
        ));
        record!(Text { id: String = Some(",pk") });
        assert!(matches!(
            schema_error::<Text>(),
            SchemaError::NonIntegerPrimaryKey { field: "id", .. }
        ));
        record!(Unsigned { id: u32 = Some(",pk") });
        assert!(matches!(
            schema_error::<Unsigned>(),
            SchemaError::NonIntegerPrimaryKey { .. }
        ));
        record!(Small { id: i16 = Some(",pk") });
        assert_eq!(metadata::<Small>().unwrap().primary_key().unwrap().name, "id");
    }

    #[test]
    fn unknown_meddler() {
        record!(Row {
            a: i32 = None,
            b: i32 = Some("b,metadata_test_never_registered"),
        });
        assert!(matches!(
            schema_error::<Row>(),
            SchemaError::UnknownMeddler { field: "b", ref meddler, .. }
                if meddler == "metadata_test_never_registered"
        ));
    }

    #[test]
    fn registered_before_first_use() {
        record!(Row {
            a: i32 = Some("a,metadata_test_late"),
        });
        assert!(metadata::<Row>().is_err());
        register("metadata_test_late", crate::ZeroIsNull).unwrap();
        let metadata = metadata::<Row>().unwrap();
        assert_eq!(metadata.columns()[0].meddler_name, "metadata_test_late");
    }

    #[test]
    fn unsupported() {
        record!(Row {
            flag: bool = Some("flag,zeroisnull"),
        });
        assert!(matches!(
            schema_error::<Row>(),
            SchemaError::Unsupported { ref field, ref meddler, .. }
                if field == "flag" && meddler == "zeroisnull"
        ));
        record!(At {
            at: i64 = Some("at,utctime"),
        });
        assert!(matches!(
            schema_error::<At>(),
            SchemaError::Unsupported { .. }
        ));
    }

    #[test]
    fn field_kinds() {
        let metadata = metadata::<Person>().unwrap();
        assert_eq!(
            metadata.column("height").unwrap().kind,
            FieldKind::Scalar {
                value: Value::Int64(None),
                nullable: true,
            }
        );
        assert_eq!(metadata.column("tags").map(|c| &c.kind), None);
    }
}
