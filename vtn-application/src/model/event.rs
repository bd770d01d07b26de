use super::common::{Interval, IntervalPeriod, PayloadDescriptor, ValuesMap};
use vtn_domain::entity::ObjectId;
use vtn_domain::error::{StoreError, StoreResult};
use vtn_macros::entity;

/// 某计划下发的需求响应事件
#[entity(kind = Event, validate = Event::check)]
#[serde(rename_all = "camelCase")]
pub struct Event {
    #[serde(rename = "programID")]
    pub program_id: ObjectId,
    #[search]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub event_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub priority: Option<u32>,
    #[serde(default)]
    pub targets: Vec<ValuesMap>,
    #[serde(default)]
    pub payload_descriptors: Vec<PayloadDescriptor>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub interval_period: Option<IntervalPeriod>,
    pub intervals: Vec<Interval>,
}

impl Event {
    fn check(&self) -> StoreResult<()> {
        super::require(self.program_id.as_str(), "programID")?;
        if self.intervals.is_empty() {
            return Err(StoreError::validation("intervals must not be empty"));
        }
        Ok(())
    }
}
