//! 审计监听器：把每次已提交的变更写入结构化日志
//!
use std::sync::atomic::{AtomicU64, Ordering};
use tracing::info;
use vtn_domain::entity::{Entity, ObjectId};
use vtn_domain::listener::{ChangeListener, EntityChange, HandledChanges};

pub struct AuditListener {
    name: String,
    handled: HandledChanges,
    recorded: AtomicU64,
}

impl Default for AuditListener {
    fn default() -> Self {
        Self::new("audit")
    }
}

impl AuditListener {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            handled: HandledChanges::All,
            recorded: AtomicU64::new(0),
        }
    }

    pub fn with_handled_changes(mut self, handled: HandledChanges) -> Self {
        self.handled = handled;
        self
    }

    /// 已记录的变更数
    pub fn recorded(&self) -> u64 {
        self.recorded.load(Ordering::Relaxed)
    }
}

impl<E: Entity> ChangeListener<E> for AuditListener {
    fn listener_name(&self) -> &str {
        &self.name
    }

    fn handled_changes(&self) -> HandledChanges {
        self.handled.clone()
    }

    fn on_change(&self, change: &EntityChange<'_, E>) -> anyhow::Result<()> {
        info!(
            kind = %E::KIND,
            id = change.entity.id().map(ObjectId::as_str).unwrap_or("-"),
            change = ?change.kind,
            modified = ?change.entity.last_modification(),
            tracking = change.tracking.unwrap_or("-"),
            "entity change committed"
        );
        self.recorded.fetch_add(1, Ordering::Relaxed);
        Ok(())
    }
}
