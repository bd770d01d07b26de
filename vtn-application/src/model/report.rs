use super::common::{Interval, IntervalPeriod, PayloadDescriptor};
use vtn_domain::entity::ObjectId;
use vtn_domain::error::StoreResult;
use vtn_macros::{entity, value_object};

/// VEN 针对事件上报的数据
#[entity(kind = Report, validate = Report::check)]
#[serde(rename_all = "camelCase")]
pub struct Report {
    #[serde(rename = "programID")]
    pub program_id: ObjectId,
    #[serde(rename = "eventID")]
    pub event_id: ObjectId,
    #[search]
    pub client_name: String,
    #[search]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub report_name: Option<String>,
    #[serde(default)]
    pub payload_descriptors: Vec<PayloadDescriptor>,
    #[serde(default)]
    pub resources: Vec<ReportResource>,
}

#[value_object]
#[serde(rename_all = "camelCase")]
pub struct ReportResource {
    pub resource_name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub interval_period: Option<IntervalPeriod>,
    #[serde(default)]
    pub intervals: Vec<Interval>,
}

impl Report {
    fn check(&self) -> StoreResult<()> {
        super::require(self.program_id.as_str(), "programID")?;
        super::require(self.event_id.as_str(), "eventID")?;
        super::require(&self.client_name, "clientName")
    }
}
