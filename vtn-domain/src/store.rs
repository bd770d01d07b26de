//! 版本化实体存储（VersionedStore）
//!
//! 每种实体一个实例，是该种实体当前值的唯一持有者：
//! - 以 `ObjectId` 为键的并发映射（`DashMap`），单键插入/替换/删除均为原子操作；
//! - 更新以 `last_modification` 作为版本标记，默认拒绝不更新的时间戳（降级保护），
//!   之后对读取时的快照做比较交换，失败即返回，不自动重试；
//! - 提交成功后同步通知监听器，监听器失败被隔离。
//!
//! 每个条目带有插入序号，替换时保留；`get_all` 按插入顺序返回，
//! 查询引擎据此让创建时间相同的实体保持插入顺序。
//!
//! `remove_all` 与 `get_all_matching` 只在谓词求值时刻一致：
//! 快照之后插入的实体不会被包含，这是有意保留的行为。
//!
use crate::entity::{Entity, ObjectId};
use crate::error::{StoreError, StoreResult};
use crate::listener::{ChangeKind, ChangeListener, EntityChange, ListenerRegistry};
use crate::outcome::MutationOutcome;
use bon::Builder;
use chrono::Utc;
use dashmap::DashMap;
use dashmap::mapref::entry::Entry;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

/// 单个存储的配置
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoreConfig {
    /// 是否允许以不更新的时间戳覆盖已有值
    #[serde(default)]
    pub allow_downgrades: bool,
}

/// 变更调用选项
#[derive(Builder, Clone, Debug, Default)]
pub struct MutationOptions {
    /// 为 true 时提交后不通知监听器
    #[builder(default)]
    skip_notifications: bool,
    /// 透传给监听器的追踪标记
    #[builder(into)]
    tracking: Option<String>,
    /// 仅在提交之前生效
    cancellation: Option<CancellationToken>,
}

impl MutationOptions {
    pub fn skip_notifications(&self) -> bool {
        self.skip_notifications
    }

    pub fn tracking(&self) -> Option<&str> {
        self.tracking.as_deref()
    }

    fn is_cancelled(&self) -> bool {
        self.cancellation
            .as_ref()
            .is_some_and(CancellationToken::is_cancelled)
    }
}

#[derive(Clone, Copy)]
enum InsertMode {
    Add,
    AddIfNotExists,
    Upsert,
}

// 值与其插入序号
struct Slot<E> {
    seq: u64,
    value: E,
}

pub struct VersionedStore<E: Entity> {
    entries: DashMap<ObjectId, Slot<E>>,
    next_seq: AtomicU64,
    listeners: ListenerRegistry<E>,
    config: StoreConfig,
}

impl<E: Entity> Default for VersionedStore<E> {
    fn default() -> Self {
        Self::new(StoreConfig::default())
    }
}

impl<E: Entity> VersionedStore<E> {
    pub fn new(config: StoreConfig) -> Self {
        Self {
            entries: DashMap::new(),
            next_seq: AtomicU64::new(0),
            listeners: ListenerRegistry::default(),
            config,
        }
    }

    pub fn with_listeners(config: StoreConfig, listeners: Vec<Arc<dyn ChangeListener<E>>>) -> Self {
        Self {
            entries: DashMap::new(),
            next_seq: AtomicU64::new(0),
            listeners: ListenerRegistry::new(listeners),
            config,
        }
    }

    pub fn config(&self) -> StoreConfig {
        self.config
    }

    /// 注册监听器（只增不减，通常在启动时完成）
    pub fn subscribe(&self, listener: Arc<dyn ChangeListener<E>>) {
        self.listeners.register(listener);
    }

    pub fn listeners(&self) -> &ListenerRegistry<E> {
        &self.listeners
    }

    // ---- 变更 ----

    /// 标识不存在时插入；已存在时返回 `Failed(AlreadyExists)`
    pub fn add(&self, entity: E, opts: &MutationOptions) -> MutationOutcome<E> {
        self.insert(entity, opts, InsertMode::Add)
    }

    /// 与 `add` 相同，但标识已存在时返回 `NoOperation`
    pub fn add_if_not_exists(&self, entity: E, opts: &MutationOptions) -> MutationOutcome<E> {
        self.insert(entity, opts, InsertMode::AddIfNotExists)
    }

    /// 替换已有值：标识缺失或未知时失败；受降级保护与比较交换约束
    pub fn update(&self, entity: E, opts: &MutationOptions) -> MutationOutcome<E> {
        if let Err(err) = entity.validate() {
            return self.reject(err);
        }
        let Some(id) = entity.id().cloned() else {
            return self.reject(StoreError::IdentifierRequired { kind: E::KIND });
        };
        let Some(existing) = self.try_get(&id) else {
            return self.reject(StoreError::IdentifierUnknown { kind: E::KIND, id });
        };

        self.replace(entity, id, existing, self.config.allow_downgrades, opts, false)
    }

    /// 不存在时新增（`Created`），存在时更新（`Updated`）；
    /// `allow_downgrades` 为 `None` 时使用存储配置
    pub fn add_or_update(
        &self,
        entity: E,
        allow_downgrades: Option<bool>,
        opts: &MutationOptions,
    ) -> MutationOutcome<E> {
        if let Err(err) = entity.validate() {
            return self.reject(err);
        }
        let allow = allow_downgrades.unwrap_or(self.config.allow_downgrades);

        let existing = entity
            .id()
            .and_then(|id| self.try_get(id).map(|e| (id.clone(), e)));

        match existing {
            Some((id, existing)) => self.replace(entity, id, existing, allow, opts, true),
            None => self.insert(entity, opts, InsertMode::Upsert),
        }
    }

    /// 按标识删除，返回被删除的值
    pub fn remove(&self, id: &ObjectId, opts: &MutationOptions) -> MutationOutcome<E> {
        if opts.is_cancelled() {
            return self.reject(StoreError::Cancelled { kind: E::KIND });
        }

        match self.entries.remove(id) {
            Some((_, Slot { value: removed, .. })) => {
                debug!(kind = %E::KIND, id = %id, "entity removed");
                self.notify(opts, ChangeKind::Removed, &removed, None);
                MutationOutcome::Success(removed)
            }
            None => self.reject(StoreError::IdentifierUnknown {
                kind: E::KIND,
                id: id.clone(),
            }),
        }
    }

    pub fn remove_entity(&self, entity: &E, opts: &MutationOptions) -> MutationOutcome<E> {
        match entity.id() {
            Some(id) => self.remove(id, opts),
            None => self.reject(StoreError::IdentifierRequired { kind: E::KIND }),
        }
    }

    /// 删除所有满足谓词的实体，返回被删除的值
    ///
    /// 谓词在快照上求值，然后逐个删除；快照之后插入的实体不受影响。
    /// 取消信号在两次删除之间检查。
    pub fn remove_all<P>(&self, predicate: P, opts: &MutationOptions) -> Vec<E>
    where
        P: Fn(&E) -> bool,
    {
        let keys: Vec<ObjectId> = self
            .entries
            .iter()
            .filter(|r| predicate(&r.value().value))
            .map(|r| r.key().clone())
            .collect();
        self.remove_keys(keys, opts)
    }

    pub fn remove_all_ids<P>(&self, predicate: P, opts: &MutationOptions) -> Vec<E>
    where
        P: Fn(&ObjectId) -> bool,
    {
        let keys: Vec<ObjectId> = self
            .entries
            .iter()
            .filter(|r| predicate(r.key()))
            .map(|r| r.key().clone())
            .collect();
        self.remove_keys(keys, opts)
    }

    // ---- 读取 ----

    pub fn exists(&self, id: &ObjectId) -> bool {
        self.entries.contains_key(id)
    }

    pub fn get(&self, id: &ObjectId) -> StoreResult<E> {
        self.try_get(id).ok_or_else(|| StoreError::IdentifierUnknown {
            kind: E::KIND,
            id: id.clone(),
        })
    }

    pub fn try_get(&self, id: &ObjectId) -> Option<E> {
        self.entries.get(id).map(|r| r.value().value.clone())
    }

    /// 当前所有值的副本（按插入顺序），调用之后的变更不会反映到返回值中
    pub fn get_all(&self) -> Vec<E> {
        self.get_all_matching(|_| true)
    }

    pub fn get_all_matching<P>(&self, predicate: P) -> Vec<E>
    where
        P: Fn(&E) -> bool,
    {
        let mut found: Vec<(u64, E)> = self
            .entries
            .iter()
            .filter(|r| predicate(&r.value().value))
            .map(|r| (r.value().seq, r.value().value.clone()))
            .collect();
        found.sort_unstable_by_key(|(seq, _)| *seq);
        found.into_iter().map(|(_, value)| value).collect()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    // ---- 内部 ----

    fn insert(&self, mut entity: E, opts: &MutationOptions, mode: InsertMode) -> MutationOutcome<E> {
        if let Err(err) = entity.validate() {
            return self.reject(err);
        }

        // 补齐元数据：标识、创建时间；未给出修改时间时与创建时间一致
        let now = Utc::now();
        let meta = entity.metadata_mut();
        let id = meta.id.get_or_insert_with(ObjectId::generate).clone();
        let created = *meta.created.get_or_insert(now);
        meta.last_modification.get_or_insert(created);

        if opts.is_cancelled() {
            return self.reject(StoreError::Cancelled { kind: E::KIND });
        }

        // entry 持有分片写锁，离开作用域后再通知
        let collided = match self.entries.entry(id.clone()) {
            Entry::Occupied(o) => Some(o.get().value.clone()),
            Entry::Vacant(v) => {
                v.insert(Slot {
                    seq: self.next_seq.fetch_add(1, Ordering::Relaxed),
                    value: entity.clone(),
                });
                None
            }
        };

        if let Some(existing) = collided {
            return match mode {
                InsertMode::Add => self.reject(StoreError::AlreadyExists { kind: E::KIND, id }),
                InsertMode::AddIfNotExists => {
                    debug!(kind = %E::KIND, id = %id, "entity already present, nothing to do");
                    MutationOutcome::NoOperation(existing)
                }
                InsertMode::Upsert => {
                    self.reject(StoreError::ConcurrentWrite { kind: E::KIND, id })
                }
            };
        }

        debug!(kind = %E::KIND, id = %id, "entity added");
        self.notify(opts, ChangeKind::Added, &entity, None);

        match mode {
            InsertMode::Upsert => MutationOutcome::Created(entity),
            InsertMode::Add | InsertMode::AddIfNotExists => MutationOutcome::Success(entity),
        }
    }

    fn replace(
        &self,
        mut entity: E,
        id: ObjectId,
        existing: E,
        allow_downgrades: bool,
        opts: &MutationOptions,
        report_updated: bool,
    ) -> MutationOutcome<E> {
        // 创建时间只在首次插入时设置
        let meta = entity.metadata_mut();
        meta.created = existing.created();
        let incoming = *meta.last_modification.get_or_insert_with(Utc::now);
        let stored = existing.last_modification();

        if !allow_downgrades && stored.is_some_and(|s| incoming <= s) {
            return self.reject(StoreError::StaleUpdate {
                kind: E::KIND,
                id,
                stored,
                incoming: Some(incoming),
            });
        }

        if opts.is_cancelled() {
            return self.reject(StoreError::Cancelled { kind: E::KIND });
        }

        // 比较交换：仅当存储值仍是守卫检查时读到的快照才替换
        let swapped = match self.entries.get_mut(&id) {
            Some(mut slot) if slot.value == existing => {
                slot.value = entity.clone();
                true
            }
            _ => false,
        };

        if !swapped {
            return self.reject(StoreError::ConcurrentWrite { kind: E::KIND, id });
        }

        debug!(kind = %E::KIND, id = %id, "entity updated");
        self.notify(opts, ChangeKind::Changed, &entity, Some(&existing));

        if report_updated {
            MutationOutcome::Updated(entity)
        } else {
            MutationOutcome::Success(entity)
        }
    }

    fn remove_keys(&self, keys: Vec<ObjectId>, opts: &MutationOptions) -> Vec<E> {
        let mut removed = Vec::with_capacity(keys.len());
        for key in keys {
            if opts.is_cancelled() {
                debug!(kind = %E::KIND, removed = removed.len(), "bulk removal cancelled");
                break;
            }
            // 快照之后已被他人删除的键直接跳过
            if let Some((_, Slot { value, .. })) = self.entries.remove(&key) {
                self.notify(opts, ChangeKind::Removed, &value, None);
                removed.push(value);
            }
        }
        debug!(kind = %E::KIND, removed = removed.len(), "bulk removal finished");
        removed
    }

    fn notify(&self, opts: &MutationOptions, kind: ChangeKind, entity: &E, previous: Option<&E>) {
        if opts.skip_notifications() {
            return;
        }
        self.listeners.dispatch(&EntityChange {
            kind,
            entity,
            previous,
            tracking: opts.tracking(),
        });
    }

    fn reject(&self, err: StoreError) -> MutationOutcome<E> {
        if err.is_conflict() {
            warn!(kind = %E::KIND, error = %err, "mutation rejected");
        } else {
            debug!(kind = %E::KIND, error = %err, "mutation rejected");
        }
        MutationOutcome::Failed(err)
    }
}
