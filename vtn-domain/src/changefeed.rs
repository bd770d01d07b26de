//! 变更广播流（BroadcastChangeFeed）
//!
//! 作为普通监听器注册到存储上，把已提交的变更转发到 `tokio::sync::broadcast`，
//! 再以 `'static` 事件流交给外发通知等异步消费者。
//!
//! 无订阅者时发送被忽略；消费过慢的订阅者会在流中收到 `FeedError::Lagged`。
//!
use crate::entity::Entity;
use crate::listener::{ChangeKind, ChangeListener, EntityChange, HandledChanges};
use chrono::{DateTime, Utc};
use futures_core::stream::BoxStream;
use futures_util::StreamExt;
use thiserror::Error;
use tokio::sync::broadcast;
use tokio_stream::wrappers::BroadcastStream;
use tokio_stream::wrappers::errors::BroadcastStreamRecvError;

/// 转发到流中的变更（拥有所有权的副本）
#[derive(Debug, Clone, PartialEq)]
pub struct StoreEvent<E> {
    pub kind: ChangeKind,
    pub entity: E,
    pub previous: Option<E>,
    pub tracking: Option<String>,
    pub occurred_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FeedError {
    #[error("change feed lagged: skipped={skipped}")]
    Lagged { skipped: u64 },
}

#[derive(Clone)]
pub struct BroadcastChangeFeed<E> {
    name: String,
    handled: HandledChanges,
    tx: broadcast::Sender<StoreEvent<E>>,
}

impl<E: Entity> BroadcastChangeFeed<E> {
    /// `capacity` 为广播缓冲区容量
    pub fn new(name: impl Into<String>, capacity: usize) -> Self {
        let (tx, _rx) = broadcast::channel(capacity);
        Self {
            name: name.into(),
            handled: HandledChanges::All,
            tx,
        }
    }

    pub fn with_handled_changes(mut self, handled: HandledChanges) -> Self {
        self.handled = handled;
        self
    }

    pub fn subscribe(&self) -> BoxStream<'static, Result<StoreEvent<E>, FeedError>> {
        let stream = BroadcastStream::new(self.tx.subscribe()).map(|r| {
            r.map_err(|BroadcastStreamRecvError::Lagged(skipped)| FeedError::Lagged { skipped })
        });
        Box::pin(stream)
    }

    pub fn subscriber_count(&self) -> usize {
        self.tx.receiver_count()
    }
}

impl<E: Entity> ChangeListener<E> for BroadcastChangeFeed<E> {
    fn listener_name(&self) -> &str {
        &self.name
    }

    fn handled_changes(&self) -> HandledChanges {
        self.handled.clone()
    }

    fn on_change(&self, change: &EntityChange<'_, E>) -> anyhow::Result<()> {
        // 没有订阅者时 send 返回错误，这里视为非致命并忽略
        let _ = self.tx.send(StoreEvent {
            kind: change.kind,
            entity: change.entity.clone(),
            previous: change.previous.cloned(),
            tracking: change.tracking.map(str::to_owned),
            occurred_at: Utc::now(),
        });
        Ok(())
    }
}
