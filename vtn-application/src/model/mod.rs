//! OpenADR 实体模型
//!
//! 只保留注册表关心的字段：标识、时间戳由 `#[entity]` 注入的 `metadata` 承载，
//! 其余为各实体的载荷；`#[search]` 标注的字段参与列表接口的文本匹配。
//!
mod common;
mod event;
mod program;
mod report;
mod subscription;
mod ven;

pub use common::{Interval, IntervalPeriod, PayloadDescriptor, ValuesMap};
pub use event::Event;
pub use program::Program;
pub use report::{Report, ReportResource};
pub use subscription::{ObjectOperation, Operation, Subscription};
pub use ven::{Resource, Ven};

use vtn_domain::error::{StoreError, StoreResult};

/// 必填字符串字段检查
pub(crate) fn require(value: &str, field: &str) -> StoreResult<()> {
    if value.trim().is_empty() {
        return Err(StoreError::validation(format!("{field} must not be empty")));
    }
    Ok(())
}
