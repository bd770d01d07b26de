use crate::utils::{AttrArgs, apply_derives, derive_list, prepend_field, take_marker};
use proc_macro::TokenStream;
use quote::quote;
use syn::spanned::Spanned;
use syn::{Item, Result, parse::Parse, parse::ParseStream, parse_macro_input};

/// #[entity] 宏实现
/// - 前置 `metadata` 字段（不允许用户自行声明），序列化时展开为 `id/createdDateTime/modificationDateTime`
/// - 收集 `#[search]` 字段生成 `search_text`
/// - 实现 `::vtn_domain::entity::Entity`
pub(crate) fn expand(attr: TokenStream, item: TokenStream) -> TokenStream {
    let cfg = parse_macro_input!(attr as EntityAttrConfig);
    let input = parse_macro_input!(item as Item);

    let mut st = match input {
        Item::Struct(s) => s,
        other => {
            return syn::Error::new(other.span(), "#[entity] only on struct")
                .to_compile_error()
                .into();
        }
    };

    let Some(kind) = cfg.kind else {
        return syn::Error::new(
            proc_macro2::Span::call_site(),
            "#[entity] requires 'kind', e.g. #[entity(kind = Program)]",
        )
        .to_compile_error()
        .into();
    };

    let fields_named = match &mut st.fields {
        syn::Fields::Named(f) => f,
        _ => {
            return syn::Error::new(st.span(), "only supports named-field struct")
                .to_compile_error()
                .into();
        }
    };

    let mut search_fields: Vec<syn::Ident> = Vec::new();
    for field in fields_named.named.iter_mut() {
        if take_marker(field, "search") {
            if let Some(ident) = &field.ident {
                search_fields.push(ident.clone());
            }
        }
    }

    // 元数据字段由宏独占，序列化时展开为顶层的 id / 时间戳
    if let Err(err) = prepend_field(
        fields_named,
        syn::parse_quote! {
            #[serde(flatten)]
            pub metadata: ::vtn_domain::entity::ObjectMetadata
        },
    ) {
        return err.to_compile_error().into();
    }

    let mut required =
        derive_list(&["Clone", "Default", "PartialEq", "serde::Serialize", "serde::Deserialize"]);
    if cfg.derive_debug.unwrap_or(true) {
        required.insert(0, syn::parse_quote!(Debug));
    }
    apply_derives(&mut st.attrs, required);

    let validate_fn = cfg.validate.map(|path| {
        quote! {
            fn validate(&self) -> ::vtn_domain::error::StoreResult<()> {
                #path(self)
            }
        }
    });

    let ident = &st.ident;
    let (impl_generics, ty_generics, where_clause) = st.generics.split_for_impl();

    let expanded = quote! {
        #st

        impl #impl_generics ::vtn_domain::entity::Entity for #ident #ty_generics #where_clause {
            const KIND: ::vtn_domain::entity::EntityKind = ::vtn_domain::entity::EntityKind::#kind;

            fn metadata(&self) -> &::vtn_domain::entity::ObjectMetadata { &self.metadata }

            fn metadata_mut(&mut self) -> &mut ::vtn_domain::entity::ObjectMetadata { &mut self.metadata }

            #[allow(unused_mut)]
            fn search_text(&self) -> ::std::vec::Vec<&str> {
                let mut out = ::std::vec::Vec::new();
                #( ::vtn_domain::entity::SearchText::collect_text(&self.#search_fields, &mut out); )*
                out
            }

            #validate_fn
        }
    };

    TokenStream::from(expanded)
}

// -------- parsing --------

struct EntityAttrConfig {
    kind: Option<syn::Ident>,
    validate: Option<syn::Path>,
    derive_debug: Option<bool>,
}

impl Parse for EntityAttrConfig {
    fn parse(input: ParseStream) -> Result<Self> {
        let mut args: AttrArgs = input.parse()?;
        args.ensure_known(&["kind", "validate", "debug"])?;

        let kind = match args.take_path("kind")? {
            Some(path) => match path.get_ident() {
                Some(ident) => Some(ident.clone()),
                None => {
                    return Err(syn::Error::new(
                        path.span(),
                        "'kind' must be a bare EntityKind variant, e.g. kind = Program",
                    ));
                }
            },
            None => None,
        };

        Ok(Self {
            kind,
            validate: args.take_path("validate")?,
            derive_debug: args.take_bool("debug")?,
        })
    }
}
