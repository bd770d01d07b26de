use super::common::ValuesMap;
use vtn_domain::entity::{EntityKind, ObjectId};
use vtn_domain::error::{StoreError, StoreResult};
use vtn_macros::{entity, value_object};

/// 客户端对对象变更的回调订阅
#[entity(kind = Subscription, validate = Subscription::check)]
#[serde(rename_all = "camelCase")]
pub struct Subscription {
    #[search]
    pub client_name: String,
    #[serde(rename = "programID")]
    pub program_id: ObjectId,
    pub object_operations: Vec<ObjectOperation>,
    #[serde(default)]
    pub targets: Vec<ValuesMap>,
}

#[value_object]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Operation {
    #[default]
    Get,
    Post,
    Put,
    Delete,
}

#[value_object]
#[serde(rename_all = "camelCase")]
pub struct ObjectOperation {
    pub objects: Vec<EntityKind>,
    pub operations: Vec<Operation>,
    pub callback_url: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bearer_token: Option<String>,
}

impl ObjectOperation {
    pub fn covers(&self, kind: EntityKind, operation: &Operation) -> bool {
        self.objects.contains(&kind) && self.operations.contains(operation)
    }
}

impl Subscription {
    /// 订阅了给定对象与操作的回调地址
    pub fn callbacks_for(&self, kind: EntityKind, operation: &Operation) -> Vec<&str> {
        self.object_operations
            .iter()
            .filter(|op| op.covers(kind, operation))
            .map(|op| op.callback_url.as_str())
            .collect()
    }

    fn check(&self) -> StoreResult<()> {
        super::require(&self.client_name, "clientName")?;
        super::require(self.program_id.as_str(), "programID")?;
        if self.object_operations.is_empty() {
            return Err(StoreError::validation("objectOperations must not be empty"));
        }
        for op in &self.object_operations {
            super::require(&op.callback_url, "callbackUrl")?;
        }
        Ok(())
    }
}
