use super::common::ValuesMap;
use vtn_domain::entity::ObjectId;
use vtn_domain::error::StoreResult;
use vtn_macros::entity;

/// 虚拟终端节点（VEN）
#[entity(kind = Ven, validate = Ven::check)]
#[serde(rename_all = "camelCase")]
pub struct Ven {
    #[search]
    pub ven_name: String,
    #[serde(default)]
    pub attributes: Vec<ValuesMap>,
    #[serde(default)]
    pub targets: Vec<ValuesMap>,
}

impl Ven {
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            ven_name: name.into(),
            ..Default::default()
        }
    }

    fn check(&self) -> StoreResult<()> {
        super::require(&self.ven_name, "venName")
    }
}

/// VEN 下的资源，独立存储，以 `ven_id` 关联所属 VEN
#[entity(kind = Resource, validate = Resource::check)]
#[serde(rename_all = "camelCase")]
pub struct Resource {
    #[search]
    pub resource_name: String,
    #[serde(rename = "venID")]
    pub ven_id: ObjectId,
    #[serde(default)]
    pub attributes: Vec<ValuesMap>,
    #[serde(default)]
    pub targets: Vec<ValuesMap>,
}

impl Resource {
    fn check(&self) -> StoreResult<()> {
        super::require(&self.resource_name, "resourceName")?;
        super::require(self.ven_id.as_str(), "venID")
    }
}
