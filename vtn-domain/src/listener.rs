//! 变更监听（ChangeListener）
//!
//! 存储在提交成功后同步通知已注册的监听器：
//! - 按注册顺序逐个调用，仅调用关注该变更类型的监听器；
//! - 单个监听器返回错误或 panic 时记录日志并计数，后续监听器照常执行；
//! - 监听器失败不会回滚、也不会改变触发它的变更结果。
//!
use crate::entity::Entity;
use std::any::Any;
use std::panic::{self, AssertUnwindSafe};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, RwLock};
use tracing::warn;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ChangeKind {
    Added,
    Changed,
    Removed,
}

#[derive(Clone, Debug)]
pub enum HandledChanges {
    One(ChangeKind),
    Many(Vec<ChangeKind>),
    All,
}

impl HandledChanges {
    pub fn accepts(&self, kind: ChangeKind) -> bool {
        match self {
            HandledChanges::One(k) => *k == kind,
            HandledChanges::Many(ks) => ks.contains(&kind),
            HandledChanges::All => true,
        }
    }
}

/// 一次已提交的变更
#[derive(Debug)]
pub struct EntityChange<'a, E> {
    pub kind: ChangeKind,
    /// 提交后的值；Removed 时为被删除的值
    pub entity: &'a E,
    /// Changed 时为被替换的旧值
    pub previous: Option<&'a E>,
    /// 调用方传入的追踪标记，原样透传
    pub tracking: Option<&'a str>,
}

pub trait ChangeListener<E>: Send + Sync {
    /// 监听器名称（用于日志）
    fn listener_name(&self) -> &str;

    fn handled_changes(&self) -> HandledChanges {
        HandledChanges::All
    }

    fn on_change(&self, change: &EntityChange<'_, E>) -> anyhow::Result<()>;
}

/// 只增不减的监听器列表
pub struct ListenerRegistry<E> {
    listeners: RwLock<Vec<Arc<dyn ChangeListener<E>>>>,
    failures: AtomicU64,
}

impl<E> Default for ListenerRegistry<E> {
    fn default() -> Self {
        Self {
            listeners: RwLock::new(Vec::new()),
            failures: AtomicU64::new(0),
        }
    }
}

impl<E: Entity> ListenerRegistry<E> {
    pub fn new(listeners: Vec<Arc<dyn ChangeListener<E>>>) -> Self {
        Self {
            listeners: RwLock::new(listeners),
            failures: AtomicU64::new(0),
        }
    }

    pub fn register(&self, listener: Arc<dyn ChangeListener<E>>) {
        self.listeners
            .write()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .push(listener);
    }

    pub fn len(&self) -> usize {
        self.listeners
            .read()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// 累计失败（返回错误或 panic）的监听器调用次数
    pub fn failures(&self) -> u64 {
        self.failures.load(Ordering::Relaxed)
    }

    pub(crate) fn dispatch(&self, change: &EntityChange<'_, E>) {
        // 先复制出列表再调用，监听器内部可再次访问存储或注册新监听器
        let matching: Vec<Arc<dyn ChangeListener<E>>> = self
            .listeners
            .read()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .iter()
            .filter(|l| l.handled_changes().accepts(change.kind))
            .cloned()
            .collect();

        for listener in matching {
            match panic::catch_unwind(AssertUnwindSafe(|| listener.on_change(change))) {
                Ok(Ok(())) => {}
                Ok(Err(err)) => {
                    self.failures.fetch_add(1, Ordering::Relaxed);
                    warn!(
                        listener = listener.listener_name(),
                        kind = %E::KIND,
                        change = ?change.kind,
                        error = %err,
                        "change listener failed"
                    );
                }
                Err(payload) => {
                    self.failures.fetch_add(1, Ordering::Relaxed);
                    warn!(
                        listener = listener.listener_name(),
                        kind = %E::KIND,
                        change = ?change.kind,
                        panic = panic_message(payload.as_ref()),
                        "change listener panicked"
                    );
                }
            }
        }
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> &str {
    if let Some(s) = payload.downcast_ref::<&'static str>() {
        s
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.as_str()
    } else {
        "non-string panic payload"
    }
}
