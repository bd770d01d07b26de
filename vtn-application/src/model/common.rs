use chrono::{DateTime, Utc};
use serde_json::Value;
use vtn_macros::value_object;

/// 时间区间：起点与 ISO 8601 时长（如 `PT1H`）
#[value_object]
#[serde(rename_all = "camelCase")]
pub struct IntervalPeriod {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub start: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub duration: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub randomize_start: Option<String>,
}

/// 类型标签加取值列表，用于 targets、attributes 与 payload
#[value_object]
pub struct ValuesMap {
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(default)]
    pub values: Vec<Value>,
}

impl ValuesMap {
    pub fn new(kind: impl Into<String>, values: Vec<Value>) -> Self {
        Self {
            kind: kind.into(),
            values,
        }
    }

    /// 是否为给定类型且包含给定取值
    pub fn contains(&self, kind: &str, value: &Value) -> bool {
        self.kind == kind && self.values.contains(value)
    }
}

#[value_object]
#[serde(rename_all = "camelCase")]
pub struct PayloadDescriptor {
    pub payload_type: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub units: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub currency: Option<String>,
}

#[value_object]
#[serde(rename_all = "camelCase")]
pub struct Interval {
    pub id: i32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub interval_period: Option<IntervalPeriod>,
    #[serde(default)]
    pub payloads: Vec<ValuesMap>,
}
