use crate::{FieldDecl, FieldKind, FieldMut, FieldRef, Record, Scalar, ZERO_TIME};
use log::LevelFilter;
use std::{env, sync::LazyLock};
use time::OffsetDateTime;

pub(crate) fn init_logs() {
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

/// Record written the way the derive expands it.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct Person {
    pub id: i64,
    pub name: String,
    /// Not exported, as a private field of a derived record.
    pub private: i32,
    pub email: String,
    pub ephemeral: i32,
    pub age: i32,
    pub opened: OffsetDateTime,
    pub closed: OffsetDateTime,
    pub updated: Option<OffsetDateTime>,
    pub tags: Vec<String>,
    pub height: Option<i64>,
}

impl Default for Person {
    fn default() -> Self {
        Self {
            id: 0,
            name: String::new(),
            private: 0,
            email: String::new(),
            ephemeral: 0,
            age: 0,
            opened: ZERO_TIME,
            closed: ZERO_TIME,
            updated: None,
            tags: Vec::new(),
            height: None,
        }
    }
}

impl Record for Person {
    fn fields() -> &'static [FieldDecl] {
        static FIELDS: LazyLock<Vec<FieldDecl>> = LazyLock::new(|| {
            let field = |name, tag, kind| FieldDecl {
                name,
                tag,
                exported: true,
                kind,
            };
            vec![
                field("id", Some("id,pk"), FieldKind::scalar::<i64>()),
                field("name", None, FieldKind::scalar::<String>()),
                FieldDecl {
                    name: "private",
                    tag: Some("private"),
                    exported: false,
                    kind: FieldKind::Unmapped,
                },
                field("email", Some("Email"), FieldKind::scalar::<String>()),
                field("ephemeral", Some("-"), FieldKind::Unmapped),
                field("age", Some("Age,zeroisnull"), FieldKind::scalar::<i32>()),
                field(
                    "opened",
                    Some("opened,utctime"),
                    FieldKind::scalar::<OffsetDateTime>(),
                ),
                field(
                    "closed",
                    Some("closed,utctimez"),
                    FieldKind::scalar::<OffsetDateTime>(),
                ),
                field(
                    "updated",
                    Some("updated,localtime"),
                    FieldKind::scalar::<Option<OffsetDateTime>>(),
                ),
                field("tags", Some("-,json"), FieldKind::Unmapped),
                field("height", None, FieldKind::scalar::<Option<i64>>()),
            ]
        });
        &FIELDS
    }

    fn with_field<R>(&self, index: usize, f: impl FnOnce(&dyn FieldRef) -> R) -> Option<R> {
        Some(match index {
            0 => f(&Scalar(&self.id)),
            1 => f(&Scalar(&self.name)),
            3 => f(&Scalar(&self.email)),
            5 => f(&Scalar(&self.age)),
            6 => f(&Scalar(&self.opened)),
            7 => f(&Scalar(&self.closed)),
            8 => f(&Scalar(&self.updated)),
            10 => f(&Scalar(&self.height)),
            _ => return None,
        })
    }

    fn with_field_mut<R>(
        &mut self,
        index: usize,
        f: impl FnOnce(&mut dyn FieldMut) -> R,
    ) -> Option<R> {
        Some(match index {
            0 => f(&mut Scalar(&mut self.id)),
            1 => f(&mut Scalar(&mut self.name)),
            3 => f(&mut Scalar(&mut self.email)),
            5 => f(&mut Scalar(&mut self.age)),
            6 => f(&mut Scalar(&mut self.opened)),
            7 => f(&mut Scalar(&mut self.closed)),
            8 => f(&mut Scalar(&mut self.updated)),
            10 => f(&mut Scalar(&mut self.height)),
            _ => return None,
        })
    }
}

/// Declares a struct with exported scalar fields and implements [`Record`] for it.
macro_rules! record {
    ($name:ident { $($field:ident: $ty:ty = $tag:expr),* $(,)? }) => {
        #[derive(Debug, Default, Clone, PartialEq)]
        struct $name {
            $($field: $ty,)*
        }
        impl $crate::Record for $name {
            fn fields() -> &'static [$crate::FieldDecl] {
                static FIELDS: ::std::sync::LazyLock<Vec<$crate::FieldDecl>> =
                    ::std::sync::LazyLock::new(|| {
                        vec![$($crate::FieldDecl {
                            name: stringify!($field),
                            tag: $tag,
                            exported: true,
                            kind: $crate::FieldKind::scalar::<$ty>(),
                        },)*]
                    });
                &FIELDS
            }
            fn with_field<R>(
                &self,
                index: usize,
                f: impl FnOnce(&dyn $crate::FieldRef) -> R,
            ) -> Option<R> {
                match Self::fields().get(index)?.name {
                    $(stringify!($field) => Some(f(&$crate::Scalar(&self.$field))),)*
                    _ => None,
                }
            }
            fn with_field_mut<R>(
                &mut self,
                index: usize,
                f: impl FnOnce(&mut dyn $crate::FieldMut) -> R,
            ) -> Option<R> {
                match Self::fields().get(index)?.name {
                    $(stringify!($field) => Some(f(&mut $crate::Scalar(&mut self.$field))),)*
                    _ => None,
                }
            }
        }
    };
}
pub(crate) use record;
