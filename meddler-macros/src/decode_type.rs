use std::cmp::min;
use syn::{GenericArgument, Path, PathArguments, Type, TypePath, TypeSlice};

/// True when the trailing segments of `path` match the trailing items of `expect`.
pub fn matches_path(path: &Path, expect: &[&str]) -> bool {
    let len = min(path.segments.len(), expect.len());
    path.segments
        .iter()
        .rev()
        .take(len)
        .map(|v| &v.ident)
        .eq(expect.iter().rev().take(len))
}

fn first_generic(path: &Path) -> Option<&Type> {
    let PathArguments::AngleBracketed(bracketed) = &path.segments.last()?.arguments else {
        return None;
    };
    match bracketed.args.first()? {
        GenericArgument::Type(ty) => Some(ty),
        _ => None,
    }
}

fn is_u8(ty: &Type) -> bool {
    matches!(ty, Type::Path(TypePath { path, .. }) if path.is_ident("u8"))
}

/// Whether the field type converts to a single database value. Decided on the
/// type as written, any other type goes through its serde encoding.
pub fn is_scalar(ty: &Type) -> bool {
    let ty = match ty {
        Type::Group(group) => &*group.elem,
        Type::Paren(paren) => &*paren.elem,
        ty => ty,
    };
    let Type::Path(TypePath { qself: None, path }) = ty else {
        return false;
    };
    if let Some(ident) = path.get_ident() {
        if [
            "bool", "i8", "i16", "i32", "i64", "isize", "u8", "u16", "u32", "u64", "usize", "f32",
            "f64",
        ]
        .iter()
        .any(|v| ident == v)
        {
            return true;
        }
    }
    if matches_path(path, &["std", "string", "String"])
        || matches_path(path, &["rust_decimal", "Decimal"])
        || matches_path(path, &["uuid", "Uuid"])
        || matches_path(path, &["time", "OffsetDateTime"])
        || matches_path(path, &["time", "PrimitiveDateTime"])
    {
        return true;
    }
    if matches_path(path, &["std", "option", "Option"]) {
        return first_generic(path).is_some_and(is_scalar);
    }
    if matches_path(path, &["std", "vec", "Vec"]) {
        return first_generic(path).is_some_and(is_u8);
    }
    if matches_path(path, &["std", "boxed", "Box"]) {
        return first_generic(path)
            .is_some_and(|v| matches!(v, Type::Slice(TypeSlice { elem, .. }) if is_u8(elem)));
    }
    false
}
