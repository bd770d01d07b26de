//! VTN 过程宏（vtn-macros）
//!
//! - `#[entity]`：为 OpenADR 实体追加 `metadata` 字段并实现 `vtn_domain::entity::Entity`
//! - `#[entity_id]`：为单字段 tuple struct 形式的标识生成常用实现
//! - `#[value_object]`：为值对象合并常用派生
//!
use proc_macro::TokenStream;

mod entity;
mod entity_id;
mod utils;
mod value_object;

/// 实体宏
/// - 若缺失则追加 `metadata: ::vtn_domain::entity::ObjectMetadata`（`#[serde(flatten)]`）并置于最前
/// - 标记了 `#[search]` 的字段参与文本匹配（支持 `String`、`Option<String>`、`Vec<String>`、`ObjectId`）
/// - 参数：`#[entity(kind = Program, validate = path::to_fn, debug = true|false)]`
///   - `kind` 必填，取值为 `EntityKind` 的变体名
///   - `validate` 可选，签名为 `fn(&Self) -> StoreResult<()>`
#[proc_macro_attribute]
pub fn entity(attr: TokenStream, item: TokenStream) -> TokenStream {
    entity::expand(attr, item)
}

/// 实体 ID 宏
/// 用于 `struct ObjectId(String);` 这类包装类型，
/// 生成 `new`、`Display`、`FromStr`、`AsRef`、`From` 等实现。
#[proc_macro_attribute]
pub fn entity_id(attr: TokenStream, item: TokenStream) -> TokenStream {
    entity_id::expand(attr, item)
}

/// 值对象宏：合并 Debug/Default/Clone/PartialEq/Serialize/Deserialize 派生
#[proc_macro_attribute]
pub fn value_object(attr: TokenStream, item: TokenStream) -> TokenStream {
    value_object::expand(attr, item)
}
