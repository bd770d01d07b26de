use super::common::{IntervalPeriod, PayloadDescriptor, ValuesMap};
use vtn_domain::error::StoreResult;
use vtn_macros::entity;

/// 需求响应计划
#[entity(kind = Program, validate = Program::check)]
#[serde(rename_all = "camelCase")]
pub struct Program {
    #[search]
    pub program_name: String,
    #[search]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub program_long_name: Option<String>,
    #[search]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub retailer_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub program_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub country: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub interval_period: Option<IntervalPeriod>,
    #[serde(default)]
    pub binding_events: bool,
    #[serde(default)]
    pub local_price: bool,
    #[serde(default)]
    pub payload_descriptors: Vec<PayloadDescriptor>,
    #[serde(default)]
    pub targets: Vec<ValuesMap>,
}

impl Program {
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            program_name: name.into(),
            ..Default::default()
        }
    }

    fn check(&self) -> StoreResult<()> {
        super::require(&self.program_name, "programName")
    }
}
