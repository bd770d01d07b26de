//! 列表接口的种类专属过滤条件
//!
//! 每个过滤器把查询参数转换为 `AllOf` 规约，交给查询引擎与文本匹配一起执行，
//! 因此 `filtered_count` 已经包含这些条件的影响。未给出的条件不参与过滤。
//!
use crate::model::{Event, Program, Report, Resource, Subscription, ValuesMap, Ven};
use serde::Deserialize;
use serde_json::Value;
use vtn_domain::entity::ObjectId;
use vtn_domain::specification::{AllOf, predicate};

pub trait ListFilter<E> {
    fn specification(&self) -> AllOf<E>;
}

/// 无额外条件
impl<E> ListFilter<E> for () {
    fn specification(&self) -> AllOf<E> {
        AllOf::default()
    }
}

/// 按 targets 过滤：存在类型为 `target_type` 且包含任一 `target_values` 的目标
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TargetFilter {
    pub target_type: Option<String>,
    #[serde(default)]
    pub target_values: Vec<String>,
}

impl TargetFilter {
    fn matches(&self, targets: &[ValuesMap]) -> bool {
        let Some(kind) = self.target_type.as_deref() else {
            return true;
        };
        targets.iter().any(|t| {
            t.kind == kind
                && (self.target_values.is_empty()
                    || self
                        .target_values
                        .iter()
                        .any(|v| t.values.contains(&Value::String(v.clone()))))
        })
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct ProgramFilter {
    #[serde(flatten)]
    pub targets: TargetFilter,
}

impl ListFilter<Program> for ProgramFilter {
    fn specification(&self) -> AllOf<Program> {
        let mut all = AllOf::default();
        if self.targets.target_type.is_some() {
            let targets = self.targets.clone();
            all.push(Box::new(predicate(move |p: &Program| {
                targets.matches(&p.targets)
            })));
        }
        all
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct EventFilter {
    #[serde(rename = "programID")]
    pub program_id: Option<ObjectId>,
    #[serde(flatten)]
    pub targets: TargetFilter,
}

impl ListFilter<Event> for EventFilter {
    fn specification(&self) -> AllOf<Event> {
        let mut all = AllOf::default();
        if let Some(program_id) = self.program_id.clone() {
            all.push(Box::new(predicate(move |e: &Event| {
                e.program_id == program_id
            })));
        }
        if self.targets.target_type.is_some() {
            let targets = self.targets.clone();
            all.push(Box::new(predicate(move |e: &Event| {
                targets.matches(&e.targets)
            })));
        }
        all
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReportFilter {
    #[serde(rename = "programID")]
    pub program_id: Option<ObjectId>,
    #[serde(rename = "eventID")]
    pub event_id: Option<ObjectId>,
    pub client_name: Option<String>,
}

impl ListFilter<Report> for ReportFilter {
    fn specification(&self) -> AllOf<Report> {
        let mut all = AllOf::default();
        if let Some(program_id) = self.program_id.clone() {
            all.push(Box::new(predicate(move |r: &Report| {
                r.program_id == program_id
            })));
        }
        if let Some(event_id) = self.event_id.clone() {
            all.push(Box::new(predicate(move |r: &Report| r.event_id == event_id)));
        }
        if let Some(client_name) = self.client_name.clone() {
            all.push(Box::new(predicate(move |r: &Report| {
                r.client_name == client_name
            })));
        }
        all
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubscriptionFilter {
    #[serde(rename = "programID")]
    pub program_id: Option<ObjectId>,
    pub client_name: Option<String>,
}

impl ListFilter<Subscription> for SubscriptionFilter {
    fn specification(&self) -> AllOf<Subscription> {
        let mut all = AllOf::default();
        if let Some(program_id) = self.program_id.clone() {
            all.push(Box::new(predicate(move |s: &Subscription| {
                s.program_id == program_id
            })));
        }
        if let Some(client_name) = self.client_name.clone() {
            all.push(Box::new(predicate(move |s: &Subscription| {
                s.client_name == client_name
            })));
        }
        all
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VenFilter {
    pub ven_name: Option<String>,
    #[serde(flatten)]
    pub targets: TargetFilter,
}

impl ListFilter<Ven> for VenFilter {
    fn specification(&self) -> AllOf<Ven> {
        let mut all = AllOf::default();
        if let Some(ven_name) = self.ven_name.clone() {
            all.push(Box::new(predicate(move |v: &Ven| v.ven_name == ven_name)));
        }
        if self.targets.target_type.is_some() {
            let targets = self.targets.clone();
            all.push(Box::new(predicate(move |v: &Ven| targets.matches(&v.targets))));
        }
        all
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResourceFilter {
    #[serde(rename = "venID")]
    pub ven_id: Option<ObjectId>,
    pub resource_name: Option<String>,
}

impl ListFilter<Resource> for ResourceFilter {
    fn specification(&self) -> AllOf<Resource> {
        let mut all = AllOf::default();
        if let Some(ven_id) = self.ven_id.clone() {
            all.push(Box::new(predicate(move |r: &Resource| r.ven_id == ven_id)));
        }
        if let Some(resource_name) = self.resource_name.clone() {
            all.push(Box::new(predicate(move |r: &Resource| {
                r.resource_name == resource_name
            })));
        }
        all
    }
}
