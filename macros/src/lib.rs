//! Derive macro generating `lamina::Configurable` implementations.
//!
//! Fields carry `#[config(...)]` attributes:
//!
//! - `#[config(key = "segment")]` marks a field configurable under that key
//!   segment; fields without a key are skipped by the schema reflector.
//! - `#[config(required)]` fails resolution when no value and no default is
//!   available.
//! - `#[config(default = "literal")]` attaches a default literal, coerced
//!   with the same rules as supplied values.
//! - `#[config(embed)]` splices a nested record's fields into the parent
//!   level (pair with `#[serde(flatten)]`).
//!
//! Field types are classified syntactically: the supported scalar kinds,
//! `Option<T>`, `Vec<T>`, `HashMap<String, T>` / `BTreeMap<String, T>`, and
//! anything else as a nested record via its own `Configurable` impl.

use proc_macro::TokenStream;
use proc_macro2::{Span, TokenStream as TokenStream2};
use quote::quote;
use syn::{
    Data, DeriveInput, Field, Fields, GenericArgument, Ident, LitStr, PathArguments, PathSegment,
    Type, parse_macro_input,
};

#[proc_macro_derive(Configurable, attributes(config))]
pub fn derive_configurable(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as DeriveInput);
    expand(&input)
        .unwrap_or_else(|e| e.to_compile_error())
        .into()
}

fn expand(input: &DeriveInput) -> syn::Result<TokenStream2> {
    let fields = match &input.data {
        Data::Struct(data) => match &data.fields {
            Fields::Named(named) => &named.named,
            other => {
                return Err(syn::Error::new_spanned(
                    other,
                    "Configurable requires named fields",
                ));
            }
        },
        _ => {
            return Err(syn::Error::new_spanned(
                &input.ident,
                "Configurable can only be derived for structs",
            ));
        }
    };

    let decls = fields
        .iter()
        .map(field_decl)
        .collect::<syn::Result<Vec<_>>>()?;

    let name = &input.ident;
    let (impl_generics, ty_generics, where_clause) = input.generics.split_for_impl();

    Ok(quote! {
        impl #impl_generics ::lamina::Configurable for #name #ty_generics #where_clause {
            fn shape() -> ::lamina::Shape {
                ::lamina::Shape::Record(|| ::std::vec![ #(#decls),* ])
            }
        }
    })
}

#[derive(Default)]
struct FieldOpts {
    present: bool,
    key: Option<String>,
    required: bool,
    default: Option<String>,
    embed: bool,
}

fn field_opts(field: &Field) -> syn::Result<FieldOpts> {
    let mut opts = FieldOpts::default();
    for attr in &field.attrs {
        if !attr.path().is_ident("config") {
            continue;
        }
        opts.present = true;
        attr.parse_nested_meta(|meta| {
            if meta.path.is_ident("key") {
                let value: LitStr = meta.value()?.parse()?;
                opts.key = Some(value.value());
                Ok(())
            } else if meta.path.is_ident("default") {
                let value: LitStr = meta.value()?.parse()?;
                opts.default = Some(value.value());
                Ok(())
            } else if meta.path.is_ident("required") {
                opts.required = true;
                Ok(())
            } else if meta.path.is_ident("embed") {
                opts.embed = true;
                Ok(())
            } else {
                Err(meta.error(
                    "unknown attribute, expected `key`, `required`, `default`, or `embed`",
                ))
            }
        })?;
    }
    Ok(opts)
}

fn field_decl(field: &Field) -> syn::Result<TokenStream2> {
    let opts = field_opts(field)?;
    let ident = field
        .ident
        .as_ref()
        .expect("named fields always have an ident");
    let field_name = ident.to_string();
    let ty = &field.ty;

    if opts.embed {
        if opts.key.is_some() || opts.required || opts.default.is_some() {
            return Err(syn::Error::new_spanned(
                field,
                "`embed` cannot be combined with `key`, `required`, or `default`",
            ));
        }
        return Ok(quote! {
            ::lamina::FieldDecl {
                field: #field_name,
                key: ::core::option::Option::None,
                embedded: true,
                shape: <#ty as ::lamina::Configurable>::shape(),
                required: false,
                default: ::core::option::Option::None,
            }
        });
    }

    let Some(key) = opts.key else {
        if opts.present {
            return Err(syn::Error::new_spanned(
                field,
                "`#[config(...)]` without a `key` does nothing; add `key = \"...\"` or `embed`",
            ));
        }
        return Ok(quote! { ::lamina::FieldDecl::skipped(#field_name) });
    };

    let shape = shape_for_type(ty);
    let required = opts.required;
    let default = match &opts.default {
        Some(literal) => quote! { ::core::option::Option::Some(#literal) },
        None => quote! { ::core::option::Option::None },
    };

    Ok(quote! {
        ::lamina::FieldDecl {
            field: #field_name,
            key: ::core::option::Option::Some(#key),
            embedded: false,
            shape: #shape,
            required: #required,
            default: #default,
        }
    })
}

fn shape_for_type(ty: &Type) -> TokenStream2 {
    if let Type::Path(type_path) = ty {
        if let Some(segment) = type_path.path.segments.last() {
            let ident = segment.ident.to_string();
            if let Some(kind) = scalar_kind(&ident) {
                let kind = Ident::new(kind, Span::call_site());
                return quote! { ::lamina::Shape::Scalar(::lamina::ScalarKind::#kind) };
            }
            match ident.as_str() {
                "Option" => {
                    if let Some(inner) = generic_arg(segment, 0) {
                        let inner = shape_for_type(inner);
                        return quote! {
                            ::lamina::Shape::Optional(::std::boxed::Box::new(#inner))
                        };
                    }
                }
                "Vec" => {
                    if let Some(element) = generic_arg(segment, 0) {
                        let element = shape_for_type(element);
                        return quote! {
                            ::lamina::Shape::Seq(::std::boxed::Box::new(#element))
                        };
                    }
                }
                "HashMap" | "BTreeMap" => {
                    if let Some(value) = generic_arg(segment, 1) {
                        let value = shape_for_type(value);
                        return quote! {
                            ::lamina::Shape::Map(::std::boxed::Box::new(#value))
                        };
                    }
                }
                _ => {}
            }
        }
    }
    // Anything unrecognized is a nested record describing itself.
    quote! { <#ty as ::lamina::Configurable>::shape() }
}

fn scalar_kind(ident: &str) -> Option<&'static str> {
    Some(match ident {
        "String" => "Text",
        "i8" => "I8",
        "i16" => "I16",
        "i32" => "I32",
        "i64" => "I64",
        "isize" => "Isize",
        "u8" => "U8",
        "u16" => "U16",
        "u32" => "U32",
        "u64" => "U64",
        "usize" => "Usize",
        "f32" => "F32",
        "f64" => "F64",
        "bool" => "Bool",
        "Duration" => "Duration",
        "MetricInt" => "MetricInt",
        "MetricFloat" => "MetricFloat",
        _ => return None,
    })
}

fn generic_arg(segment: &PathSegment, index: usize) -> Option<&Type> {
    match &segment.arguments {
        PathArguments::AngleBracketed(args) => args
            .args
            .iter()
            .filter_map(|arg| match arg {
                GenericArgument::Type(ty) => Some(ty),
                _ => None,
            })
            .nth(index),
        _ => None,
    }
}
