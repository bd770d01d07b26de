use quote::ToTokens;
use syn::parse::{Parse, ParseStream};
use syn::{Attribute, Expr, Field, FieldsNamed, Ident, Token, punctuated::Punctuated};

// 拆分出 derive 列表与其余属性
fn split_derives(attrs: &[Attribute]) -> (Vec<Attribute>, Vec<syn::Path>) {
    let mut retained = Vec::new();
    let mut existing = Vec::new();
    for attr in attrs {
        if attr.path().is_ident("derive") {
            if let Ok(list) =
                attr.parse_args_with(Punctuated::<syn::Path, Token![,]>::parse_terminated)
            {
                existing.extend(list);
            }
        } else {
            retained.push(attr.clone());
        }
    }
    (retained, existing)
}

// serde 的 Serialize/Deserialize 无论是否带路径都视为同一项
fn derive_key(p: &syn::Path) -> String {
    match p.segments.last() {
        Some(last) => {
            let ident = last.ident.to_string();
            match ident.as_str() {
                "Serialize" | "Deserialize" => format!("serde::{ident}"),
                _ => ident,
            }
        }
        None => p.to_token_stream().to_string(),
    }
}

/// 合并宏要求的 derive 与用户已声明的 derive（去重，required 在前）
pub(crate) fn apply_derives(attrs: &mut Vec<Attribute>, required: Vec<syn::Path>) {
    let (retained, existing) = split_derives(attrs);

    let mut seen = std::collections::HashSet::<String>::new();
    let merged: Vec<syn::Path> = required
        .into_iter()
        .chain(existing)
        .filter(|p| seen.insert(derive_key(p)))
        .collect();

    let derive: Attribute = syn::parse_quote!(#[derive(#(#merged),*)]);
    *attrs = std::iter::once(derive).chain(retained).collect();
}

/// 把 `"serde::Serialize"` 这类名字解析为 derive 路径
pub(crate) fn derive_list(names: &[&str]) -> Vec<syn::Path> {
    names.iter().filter_map(|name| syn::parse_str(name).ok()).collect()
}

/// 移除字段上的标记属性（如 `#[search]`），返回是否存在
pub(crate) fn take_marker(field: &mut Field, marker: &str) -> bool {
    let before = field.attrs.len();
    field.attrs.retain(|a| !a.path().is_ident(marker));
    field.attrs.len() != before
}

/// 把宏生成的字段插入到最前；用户已声明同名字段时报错
pub(crate) fn prepend_field(fields: &mut FieldsNamed, field: Field) -> syn::Result<()> {
    let clash = fields
        .named
        .iter()
        .find(|f| f.ident.is_some() && f.ident == field.ident);
    if let Some(existing) = clash {
        return Err(syn::Error::new_spanned(
            existing,
            "this field is generated by the macro and must not be declared",
        ));
    }
    let rest = std::mem::take(&mut fields.named);
    fields.named = std::iter::once(field).chain(rest).collect();
    Ok(())
}

/// 解析 `key = true|false`
fn parse_bool(expr: syn::Expr, key: &str) -> syn::Result<bool> {
    match expr {
        syn::Expr::Lit(syn::ExprLit {
            lit: syn::Lit::Bool(b),
            ..
        }) => Ok(b.value()),
        other => Err(syn::Error::new_spanned(
            other,
            format!("expected boolean literal for '{key}'"),
        )),
    }
}

/// 属性参数：`key = value, ...`，键不可重复
pub(crate) struct AttrArgs {
    pairs: Vec<(Ident, Expr)>,
}

impl Parse for AttrArgs {
    fn parse(input: ParseStream) -> syn::Result<Self> {
        let list = Punctuated::<syn::MetaNameValue, Token![,]>::parse_terminated(input)?;
        let mut pairs: Vec<(Ident, Expr)> = Vec::with_capacity(list.len());
        for nv in list {
            let Some(key) = nv.path.get_ident().cloned() else {
                return Err(syn::Error::new_spanned(nv.path, "expected a plain key"));
            };
            if pairs.iter().any(|(k, _)| *k == key) {
                return Err(syn::Error::new(
                    key.span(),
                    format!("duplicate key '{key}' in attribute"),
                ));
            }
            pairs.push((key, nv.value));
        }
        Ok(Self { pairs })
    }
}

impl AttrArgs {
    /// 存在 `allowed` 之外的键时报错
    pub(crate) fn ensure_known(&self, allowed: &[&str]) -> syn::Result<()> {
        match self.pairs.iter().find(|(k, _)| !allowed.iter().any(|a| k == a)) {
            Some((key, _)) => Err(syn::Error::new(
                key.span(),
                format!("unknown key '{key}'; expected one of: {}", allowed.join(", ")),
            )),
            None => Ok(()),
        }
    }

    pub(crate) fn take(&mut self, key: &str) -> Option<Expr> {
        let pos = self.pairs.iter().position(|(k, _)| k == key)?;
        Some(self.pairs.remove(pos).1)
    }

    pub(crate) fn take_bool(&mut self, key: &str) -> syn::Result<Option<bool>> {
        self.take(key).map(|e| parse_bool(e, key)).transpose()
    }

    pub(crate) fn take_path(&mut self, key: &str) -> syn::Result<Option<syn::Path>> {
        self.take(key)
            .map(|expr| match expr {
                Expr::Path(p) => Ok(p.path),
                other => Err(syn::Error::new_spanned(
                    other,
                    format!("expected a path for '{key}'"),
                )),
            })
            .transpose()
    }
}
