use crate::decode_type::is_scalar;
use syn::{Field, Ident, LitStr, Type, Visibility};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum FieldShape {
    Scalar,
    Serialized,
    Unmapped,
}

pub(crate) struct FieldMetadata {
    pub(crate) ident: Ident,
    pub(crate) ty: Type,
    pub(crate) name: String,
    pub(crate) tag: Option<String>,
    pub(crate) exported: bool,
    pub(crate) shape: FieldShape,
}

pub(crate) fn decode_field(field: &Field) -> syn::Result<FieldMetadata> {
    let Some(ident) = field.ident.clone() else {
        return Err(syn::Error::new_spanned(field, "Record fields must have a name"));
    };
    let mut name = ident.to_string();
    if let Some(stripped) = name.strip_prefix("r#") {
        name = stripped.to_string();
    }
    let mut tag = None;
    for attr in &field.attrs {
        let meta = &attr.meta;
        if meta.path().is_ident("meddler") {
            let Ok(v) = meta.require_list().and_then(|v| v.parse_args::<LitStr>()) else {
                return Err(syn::Error::new_spanned(
                    meta,
                    "Error while parsing `meddler`, use it like #[meddler(\"column,pk,meddler\")]",
                ));
            };
            if tag.is_some() {
                return Err(syn::Error::new_spanned(
                    meta,
                    "The `meddler` attribute can be used only once per field",
                ));
            }
            tag = Some(v.value());
        }
    }
    let exported = matches!(field.vis, Visibility::Public(..) | Visibility::Restricted(..));
    let skipped = tag.as_deref().is_some_and(|v| v.split(',').next() == Some("-"));
    let shape = if !exported || skipped {
        FieldShape::Unmapped
    } else if is_scalar(&field.ty) {
        FieldShape::Scalar
    } else {
        FieldShape::Serialized
    };
    Ok(FieldMetadata {
        ident,
        ty: field.ty.clone(),
        name,
        tag,
        exported,
        shape,
    })
}
