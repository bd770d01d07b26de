//! 存储层统一错误定义
//!
//! 所有预期内的失败（未找到、冲突、校验）都以 `StoreError` 作为
//! `MutationOutcome::Failed` 的载荷返回，而不是 panic。
//!
use crate::entity::{EntityKind, ObjectId};
use chrono::{DateTime, Utc};
use thiserror::Error;

#[non_exhaustive]
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StoreError {
    // --- 标识 ---
    #[error("identifier required: kind={kind}")]
    IdentifierRequired { kind: EntityKind },
    #[error("identifier unknown: kind={kind}, id={id}")]
    IdentifierUnknown { kind: EntityKind, id: ObjectId },
    #[error("identifier already exists: kind={kind}, id={id}")]
    AlreadyExists { kind: EntityKind, id: ObjectId },

    // --- 冲突 ---
    #[error(
        "stale update would downgrade: kind={kind}, id={id}, stored={stored:?}, incoming={incoming:?}"
    )]
    StaleUpdate {
        kind: EntityKind,
        id: ObjectId,
        stored: Option<DateTime<Utc>>,
        incoming: Option<DateTime<Utc>>,
    },
    #[error("concurrent write lost the race: kind={kind}, id={id}")]
    ConcurrentWrite { kind: EntityKind, id: ObjectId },

    // --- 其它 ---
    #[error("validation failed: {reason}")]
    Validation { reason: String },
    #[error("operation cancelled before commit: kind={kind}")]
    Cancelled { kind: EntityKind },
}

impl StoreError {
    pub fn validation(reason: impl Into<String>) -> Self {
        StoreError::Validation {
            reason: reason.into(),
        }
    }

    /// 冲突类错误（过期更新或并发写失败），调用方需重新读取后再决定是否重试
    pub fn is_conflict(&self) -> bool {
        matches!(
            self,
            StoreError::AlreadyExists { .. }
                | StoreError::StaleUpdate { .. }
                | StoreError::ConcurrentWrite { .. }
        )
    }
}

pub type StoreResult<T> = Result<T, StoreError>;
