use crate::utils::{AttrArgs, apply_derives, derive_list};
use proc_macro::TokenStream;
use quote::ToTokens;
use syn::spanned::Spanned;
use syn::{Attribute, Item, Result, parse::Parse, parse::ParseStream, parse_macro_input};

const DERIVES: &[&str] = &[
    "Default",
    "Clone",
    "PartialEq",
    "serde::Serialize",
    "serde::Deserialize",
];

/// #[value_object] 宏实现
///
/// 结构体与枚举都可用。不派生 `Eq`，OpenADR 的数值载荷常含浮点。
/// `debug = false` 时不派生 `Debug`，由使用方自行实现。
pub(crate) fn expand(attr: TokenStream, item: TokenStream) -> TokenStream {
    let cfg = parse_macro_input!(attr as ValueObjectAttrConfig);
    let mut input = parse_macro_input!(item as Item);

    let mut derives = derive_list(DERIVES);
    if cfg.derive_debug.unwrap_or(true) {
        derives.insert(0, syn::parse_quote!(Debug));
    }

    let span = input.span();
    match attrs_of(&mut input) {
        Some(attrs) => apply_derives(attrs, derives),
        None => {
            return syn::Error::new(span, "#[value_object] expects a struct or an enum")
                .to_compile_error()
                .into();
        }
    }
    input.into_token_stream().into()
}

fn attrs_of(item: &mut Item) -> Option<&mut Vec<Attribute>> {
    match item {
        Item::Struct(st) => Some(&mut st.attrs),
        Item::Enum(en) => Some(&mut en.attrs),
        _ => None,
    }
}

// -------- parsing --------

struct ValueObjectAttrConfig {
    derive_debug: Option<bool>,
}

impl Parse for ValueObjectAttrConfig {
    fn parse(input: ParseStream) -> Result<Self> {
        let mut args: AttrArgs = input.parse()?;
        args.ensure_known(&["debug"])?;
        Ok(Self {
            derive_debug: args.take_bool("debug")?,
        })
    }
}
