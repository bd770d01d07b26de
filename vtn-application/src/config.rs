//! 运行配置（VtnConfig）
//!
//! JSON 格式，所有字段均可缺省：
//! ```json
//! {
//!   "max_page_size": 50,
//!   "change_feed_capacity": 256,
//!   "stores": { "events": { "allow_downgrades": true } }
//! }
//! ```
//!
use crate::error::{AppError, AppResult};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use vtn_domain::entity::EntityKind;
use vtn_domain::query::DEFAULT_MAX_PAGE_SIZE;
use vtn_domain::store::StoreConfig;

const DEFAULT_FEED_CAPACITY: usize = 256;

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct VtnConfig {
    /// 列表接口单页上限
    pub max_page_size: usize,
    /// 变更广播流的缓冲区容量
    pub change_feed_capacity: usize,
    pub stores: StoresConfig,
}

impl Default for VtnConfig {
    fn default() -> Self {
        Self {
            max_page_size: DEFAULT_MAX_PAGE_SIZE,
            change_feed_capacity: DEFAULT_FEED_CAPACITY,
            stores: StoresConfig::default(),
        }
    }
}

/// 各实体种类的存储配置
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StoresConfig {
    pub programs: StoreConfig,
    pub reports: StoreConfig,
    pub events: StoreConfig,
    pub subscriptions: StoreConfig,
    pub vens: StoreConfig,
    pub resources: StoreConfig,
}

impl StoresConfig {
    pub fn for_kind(&self, kind: EntityKind) -> StoreConfig {
        match kind {
            EntityKind::Program => self.programs,
            EntityKind::Report => self.reports,
            EntityKind::Event => self.events,
            EntityKind::Subscription => self.subscriptions,
            EntityKind::Ven => self.vens,
            EntityKind::Resource => self.resources,
        }
    }
}

impl VtnConfig {
    pub fn from_json_str(raw: &str) -> AppResult<Self> {
        let config: VtnConfig =
            serde_json::from_str(raw).map_err(|err| AppError::Config(err.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_path(path: impl AsRef<Path>) -> AppResult<Self> {
        let path = path.as_ref();
        let raw = fs::read_to_string(path)
            .map_err(|err| AppError::Config(format!("read {}: {err}", path.display())))?;
        Self::from_json_str(&raw)
    }

    fn validate(&self) -> AppResult<()> {
        if self.max_page_size == 0 {
            return Err(AppError::Config("max_page_size must be positive".into()));
        }
        if self.change_feed_capacity == 0 {
            return Err(AppError::Config(
                "change_feed_capacity must be positive".into(),
            ));
        }
        Ok(())
    }
}
