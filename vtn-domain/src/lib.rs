//! VTN 领域层基础库（vtn-domain）
//!
//! 为 OpenADR 实体（Program、Report、Event、Subscription、VEN 及其 Resource）
//! 提供统一的内存存储与查询构件：
//! - 实体抽象与元数据（`entity`）
//! - 版本化实体存储（`store`）：原子的新增/更新/删除、降级保护与比较交换
//! - 变更结果（`outcome`）与错误（`error`）
//! - 变更监听（`listener`）与广播流（`changefeed`，需 `eventing` 特性）
//! - 规约（`specification`）与集合查询引擎（`query`）
//!
//! 本 crate 不做持久化，也不涉及传输层；每种实体由调用方显式构造一个存储实例并注入使用。
//!
//! 典型用法：
//! 1. 用 `#[entity(kind = ...)]` 定义实体；
//! 2. 为每种实体创建 `VersionedStore`，启动时注册监听器；
//! 3. 写接口调用 `add/update/add_or_update/remove`，根据 `MutationOutcome` 生成响应；
//! 4. 列表接口以 `get_all` 快照交给 `QueryEngine` 得到分页与计数。
//!
#[cfg(feature = "eventing")]
pub mod changefeed;
pub mod entity;
pub mod error;
pub mod listener;
pub mod outcome;
pub mod query;
pub mod specification;
pub mod store;

// 允许在本 crate 内部通过 ::vtn_domain 进行自引用，
// 以便过程宏在本 crate 的单元测试中也能解析到 ::vtn_domain 路径。
extern crate self as vtn_domain;
