//! VTN 应用层（vtn-application）
//!
//! 在 `vtn-domain` 之上组装 OpenADR VTN 的各类对象：
//! - `model`：Program、Report、Event、Subscription、VEN 与 Resource
//! - `service`：单种实体的接口语义（状态码、计数头、查询参数）
//! - `registry`：按配置构造全部存储，集中注册监听器
//! - `filters`：列表接口的种类专属过滤条件
//! - `audit`：审计日志监听器
//! - `config` / `context` / `error`：配置、请求上下文与错误
//!
pub mod audit;
pub mod config;
pub mod context;
pub mod error;
pub mod filters;
pub mod model;
pub mod registry;
pub mod service;

pub use registry::VtnRegistry;
