use crate::utils::{apply_derives, derive_list};
use proc_macro::TokenStream;
use quote::quote;
use syn::spanned::Spanned;
use syn::{Fields, ItemStruct, Type, parse_macro_input};

/// #[entity_id] 宏实现
///
/// 作用于单字段 tuple struct，把它变成可作为存储键使用的标识类型：
/// 补齐比较、哈希、序列化等派生，并提供 `new`、`into_inner` 以及
/// 与内部类型之间的 Display / FromStr / AsRef / From 转换。
pub(crate) fn expand(_attr: TokenStream, item: TokenStream) -> TokenStream {
    let mut st = parse_macro_input!(item as ItemStruct);

    let inner = match single_field(&st) {
        Ok(ty) => ty,
        Err(err) => return err.to_compile_error().into(),
    };

    apply_derives(
        &mut st.attrs,
        derive_list(&[
            "Default",
            "Clone",
            "Debug",
            "PartialEq",
            "Eq",
            "Hash",
            "PartialOrd",
            "Ord",
            "serde::Serialize",
            "serde::Deserialize",
        ]),
    );

    let name = &st.ident;
    let (impl_g, ty_g, where_g) = st.generics.split_for_impl();

    quote! {
        #st

        impl #impl_g #name #ty_g #where_g {
            pub fn new(value: impl ::core::convert::Into<#inner>) -> Self {
                Self(value.into())
            }

            pub fn into_inner(self) -> #inner {
                self.0
            }
        }

        impl #impl_g ::core::fmt::Display for #name #ty_g #where_g {
            fn fmt(&self, f: &mut ::core::fmt::Formatter<'_>) -> ::core::fmt::Result {
                ::core::fmt::Display::fmt(&self.0, f)
            }
        }

        impl #impl_g ::core::str::FromStr for #name #ty_g #where_g {
            type Err = <#inner as ::core::str::FromStr>::Err;

            fn from_str(s: &str) -> ::core::result::Result<Self, Self::Err> {
                s.parse::<#inner>().map(Self)
            }
        }

        impl #impl_g ::core::convert::AsRef<#inner> for #name #ty_g #where_g {
            fn as_ref(&self) -> &#inner {
                &self.0
            }
        }

        impl #impl_g ::core::convert::From<#inner> for #name #ty_g #where_g {
            fn from(value: #inner) -> Self {
                Self(value)
            }
        }

        impl #impl_g ::core::convert::From<#name #ty_g> for #inner #where_g {
            fn from(id: #name #ty_g) -> Self {
                id.0
            }
        }
    }
    .into()
}

fn single_field(st: &ItemStruct) -> syn::Result<Type> {
    match &st.fields {
        Fields::Unnamed(fields) if fields.unnamed.len() == 1 => fields
            .unnamed
            .first()
            .map(|f| f.ty.clone())
            .ok_or_else(|| syn::Error::new(fields.span(), "missing field")),
        other => Err(syn::Error::new(
            other.span(),
            "#[entity_id] expects a single-field tuple struct, e.g. struct VenId(String);",
        )),
    }
}
