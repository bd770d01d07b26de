//! 变更结果（MutationOutcome）
//!
//! 带判别标签与载荷的结果类型，调用方据此决定对外的响应语义。
//!
use crate::error::StoreError;

#[derive(Debug, Clone, PartialEq)]
pub enum MutationOutcome<E> {
    /// 变更已提交（Add/Update/Remove）；Remove 时载荷为被删除的值
    Success(E),
    /// AddOrUpdate 走了新增分支
    Created(E),
    /// AddOrUpdate 走了更新分支
    Updated(E),
    /// 状态已满足预期，未做任何变更；载荷为当前存储的值
    NoOperation(E),
    Failed(StoreError),
}

/// 结果判别标签
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OutcomeKind {
    Success,
    Created,
    Updated,
    NoOperation,
    Failed,
}

impl<E> MutationOutcome<E> {
    pub fn kind(&self) -> OutcomeKind {
        match self {
            MutationOutcome::Success(_) => OutcomeKind::Success,
            MutationOutcome::Created(_) => OutcomeKind::Created,
            MutationOutcome::Updated(_) => OutcomeKind::Updated,
            MutationOutcome::NoOperation(_) => OutcomeKind::NoOperation,
            MutationOutcome::Failed(_) => OutcomeKind::Failed,
        }
    }

    pub fn is_failed(&self) -> bool {
        matches!(self, MutationOutcome::Failed(_))
    }

    /// 是否改变了存储状态
    pub fn is_committed(&self) -> bool {
        matches!(
            self,
            MutationOutcome::Success(_) | MutationOutcome::Created(_) | MutationOutcome::Updated(_)
        )
    }

    pub fn entity(&self) -> Option<&E> {
        match self {
            MutationOutcome::Success(e)
            | MutationOutcome::Created(e)
            | MutationOutcome::Updated(e)
            | MutationOutcome::NoOperation(e) => Some(e),
            MutationOutcome::Failed(_) => None,
        }
    }

    pub fn error(&self) -> Option<&StoreError> {
        match self {
            MutationOutcome::Failed(err) => Some(err),
            _ => None,
        }
    }

    pub fn into_result(self) -> Result<E, StoreError> {
        match self {
            MutationOutcome::Success(e)
            | MutationOutcome::Created(e)
            | MutationOutcome::Updated(e)
            | MutationOutcome::NoOperation(e) => Ok(e),
            MutationOutcome::Failed(err) => Err(err),
        }
    }
}

impl<E> From<StoreError> for MutationOutcome<E> {
    fn from(err: StoreError) -> Self {
        MutationOutcome::Failed(err)
    }
}
