//! 实体（Entity）基础抽象
//!
//! 所有 OpenADR 对象共享同一组元数据：标识、创建时间与最后修改时间。
//! 存储层只依赖这三项，业务载荷对其不透明。
//!
use crate::error::StoreResult;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use vtn_macros::entity_id;

/// 对象标识（同一实体种类内唯一）
#[entity_id]
pub struct ObjectId(String);

impl ObjectId {
    /// 生成新的标识（UUID v4）
    pub fn generate() -> Self {
        Self(uuid::Uuid::new_v4().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// 实体种类
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum EntityKind {
    Program,
    Report,
    Event,
    Subscription,
    Ven,
    Resource,
}

impl EntityKind {
    pub const ALL: [EntityKind; 6] = [
        EntityKind::Program,
        EntityKind::Report,
        EntityKind::Event,
        EntityKind::Subscription,
        EntityKind::Ven,
        EntityKind::Resource,
    ];

    /// OpenADR 对象类型名
    pub const fn as_str(&self) -> &'static str {
        match self {
            EntityKind::Program => "PROGRAM",
            EntityKind::Report => "REPORT",
            EntityKind::Event => "EVENT",
            EntityKind::Subscription => "SUBSCRIPTION",
            EntityKind::Ven => "VEN",
            EntityKind::Resource => "RESOURCE",
        }
    }
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// 对象元数据
///
/// 字段名与 OpenADR 线上格式一致；均可缺省，由存储在首次写入时补齐。
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ObjectMetadata {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<ObjectId>,
    #[serde(
        rename = "createdDateTime",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub created: Option<DateTime<Utc>>,
    #[serde(
        rename = "modificationDateTime",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub last_modification: Option<DateTime<Utc>>,
}

impl ObjectMetadata {
    pub fn with_id(id: impl Into<String>) -> Self {
        Self {
            id: Some(ObjectId::new(id)),
            ..Default::default()
        }
    }

    pub fn last_modified_at(mut self, at: DateTime<Utc>) -> Self {
        self.last_modification = Some(at);
        self
    }

    pub fn created_at(mut self, at: DateTime<Utc>) -> Self {
        self.created = Some(at);
        self
    }
}

/// 存储中的实体抽象
///
/// 通常由 `#[entity(kind = ...)]` 宏实现。
pub trait Entity: Clone + PartialEq + Send + Sync + 'static {
    const KIND: EntityKind;

    fn metadata(&self) -> &ObjectMetadata;

    fn metadata_mut(&mut self) -> &mut ObjectMetadata;

    /// 参与文本匹配的字段值
    fn search_text(&self) -> Vec<&str>;

    /// 载荷校验，在任何变更开始前执行
    fn validate(&self) -> StoreResult<()> {
        Ok(())
    }

    fn id(&self) -> Option<&ObjectId> {
        self.metadata().id.as_ref()
    }

    fn created(&self) -> Option<DateTime<Utc>> {
        self.metadata().created
    }

    fn last_modification(&self) -> Option<DateTime<Utc>> {
        self.metadata().last_modification
    }
}

/// 可参与文本匹配的字段类型
pub trait SearchText {
    fn collect_text<'a>(&'a self, out: &mut Vec<&'a str>);
}

impl SearchText for String {
    fn collect_text<'a>(&'a self, out: &mut Vec<&'a str>) {
        out.push(self.as_str());
    }
}

impl SearchText for ObjectId {
    fn collect_text<'a>(&'a self, out: &mut Vec<&'a str>) {
        out.push(self.as_str());
    }
}

impl<T: SearchText> SearchText for Option<T> {
    fn collect_text<'a>(&'a self, out: &mut Vec<&'a str>) {
        if let Some(v) = self {
            v.collect_text(out);
        }
    }
}

impl<T: SearchText> SearchText for Vec<T> {
    fn collect_text<'a>(&'a self, out: &mut Vec<&'a str>) {
        for v in self {
            v.collect_text(out);
        }
    }
}
