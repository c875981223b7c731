mod decode_field;
mod decode_type;

use decode_field::{FieldMetadata, FieldShape, decode_field};
use proc_macro::TokenStream;
use proc_macro2::Literal;
use quote::quote;
use syn::{Fields, ItemStruct, parse_macro_input};

/// Derives `meddler::Record` for a struct with named fields.
///
/// Public fields are mapped to columns, the column name and the meddlers come from
/// `#[meddler("column,pk,meddler")]`. Fields whose type is not a plain value
/// (numbers, text, bytes, time, uuid, decimal or an `Option` of those) are only
/// reachable through a serialization meddler like `json` or `bincode`.
#[proc_macro_derive(Record, attributes(meddler))]
pub fn derive_record(input: TokenStream) -> TokenStream {
    let item: ItemStruct = parse_macro_input!(input as ItemStruct);
    match record_trait(&item) {
        Ok(v) => v.into(),
        Err(e) => e.to_compile_error().into(),
    }
}

fn record_trait(item: &ItemStruct) -> syn::Result<proc_macro2::TokenStream> {
    if !item.generics.params.is_empty() {
        return Err(syn::Error::new_spanned(
            &item.generics,
            "Record cannot be derived for a generic struct",
        ));
    }
    let Fields::Named(named) = &item.fields else {
        return Err(syn::Error::new_spanned(
            &item.ident,
            "Record can only be derived for a struct with named fields",
        ));
    };
    let fields = named
        .named
        .iter()
        .map(decode_field)
        .collect::<syn::Result<Vec<_>>>()?;
    let name = &item.ident;
    let decls = fields.iter().map(field_decl);
    let (refs, muts): (Vec<_>, Vec<_>) = fields
        .iter()
        .enumerate()
        .filter_map(|(i, f)| {
            let i = Literal::usize_unsuffixed(i);
            let ident = &f.ident;
            let accessor = match f.shape {
                FieldShape::Scalar => quote!(::meddler::Scalar),
                FieldShape::Serialized => quote!(::meddler::Serialized),
                FieldShape::Unmapped => return None,
            };
            Some((
                quote!(#i => ::std::option::Option::Some(f(&#accessor(&self.#ident))),),
                quote!(#i => ::std::option::Option::Some(f(&mut #accessor(&mut self.#ident))),),
            ))
        })
        .unzip();
    Ok(quote! {
        impl ::meddler::Record for #name {
            fn fields() -> &'static [::meddler::FieldDecl] {
                static FIELDS: ::std::sync::LazyLock<::std::boxed::Box<[::meddler::FieldDecl]>> =
                    ::std::sync::LazyLock::new(|| {
                        ::std::vec![#(#decls),*].into_boxed_slice()
                    });
                &FIELDS
            }
            #[allow(unused_variables)]
            fn with_field<R>(
                &self,
                index: usize,
                f: impl ::std::ops::FnOnce(&dyn ::meddler::FieldRef) -> R,
            ) -> ::std::option::Option<R> {
                match index {
                    #(#refs)*
                    _ => ::std::option::Option::None,
                }
            }
            #[allow(unused_variables)]
            fn with_field_mut<R>(
                &mut self,
                index: usize,
                f: impl ::std::ops::FnOnce(&mut dyn ::meddler::FieldMut) -> R,
            ) -> ::std::option::Option<R> {
                match index {
                    #(#muts)*
                    _ => ::std::option::Option::None,
                }
            }
        }
    })
}

fn field_decl(field: &FieldMetadata) -> proc_macro2::TokenStream {
    let name = &field.name;
    let tag = match &field.tag {
        Some(v) => quote!(::std::option::Option::Some(#v)),
        None => quote!(::std::option::Option::None),
    };
    let exported = field.exported;
    let ty = &field.ty;
    let kind = match field.shape {
        FieldShape::Scalar => quote!(::meddler::FieldKind::scalar::<#ty>()),
        FieldShape::Serialized => quote!(::meddler::FieldKind::Serialized),
        FieldShape::Unmapped => quote!(::meddler::FieldKind::Unmapped),
    };
    quote! {
        ::meddler::FieldDecl {
            name: #name,
            tag: #tag,
            exported: #exported,
            kind: #kind,
        }
    }
}
