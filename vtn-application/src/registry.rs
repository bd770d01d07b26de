//! VTN 注册表：按配置构造每种实体的存储与服务，并集中注册监听器
//!
use crate::audit::AuditListener;
use crate::config::VtnConfig;
use crate::context::RequestContext;
use crate::error::{AppError, AppResult};
use crate::filters::ResourceFilter;
use crate::model::{Event, Program, Report, Resource, Subscription, Ven};
use crate::service::{EntityResponse, EntityService, ListParams, ListResponse};
use std::sync::Arc;
use tracing::{debug, info};
use vtn_domain::entity::{Entity, EntityKind, ObjectId};
use vtn_domain::error::StoreError;
use vtn_domain::query::QueryEngine;
use vtn_domain::store::VersionedStore;

pub struct VtnRegistry {
    config: VtnConfig,
    programs: EntityService<Program>,
    reports: EntityService<Report>,
    events: EntityService<Event>,
    subscriptions: EntityService<Subscription>,
    vens: EntityService<Ven>,
    resources: EntityService<Resource>,
}

impl Default for VtnRegistry {
    fn default() -> Self {
        Self::from_config(VtnConfig::default())
    }
}

impl VtnRegistry {
    pub fn from_config(config: VtnConfig) -> Self {
        let engine = QueryEngine::new(config.max_page_size);
        info!(
            max_page_size = config.max_page_size,
            feed_capacity = config.change_feed_capacity,
            "building registry"
        );
        Self {
            programs: service(&config, engine),
            reports: service(&config, engine),
            events: service(&config, engine),
            subscriptions: service(&config, engine),
            vens: service(&config, engine),
            resources: service(&config, engine),
            config,
        }
    }

    pub fn config(&self) -> &VtnConfig {
        &self.config
    }

    pub fn programs(&self) -> &EntityService<Program> {
        &self.programs
    }

    pub fn reports(&self) -> &EntityService<Report> {
        &self.reports
    }

    pub fn events(&self) -> &EntityService<Event> {
        &self.events
    }

    pub fn subscriptions(&self) -> &EntityService<Subscription> {
        &self.subscriptions
    }

    pub fn vens(&self) -> &EntityService<Ven> {
        &self.vens
    }

    pub fn resources(&self) -> &EntityService<Resource> {
        &self.resources
    }

    /// 在所有存储上注册同一个审计监听器
    pub fn attach_audit(&self, audit: Arc<AuditListener>) {
        self.programs.subscribe(audit.clone());
        self.reports.subscribe(audit.clone());
        self.events.subscribe(audit.clone());
        self.subscriptions.subscribe(audit.clone());
        self.vens.subscribe(audit.clone());
        self.resources.subscribe(audit);
    }

    /// 各种实体的当前数量
    pub fn counts(&self) -> Vec<(EntityKind, usize)> {
        vec![
            (EntityKind::Program, self.programs.store().len()),
            (EntityKind::Report, self.reports.store().len()),
            (EntityKind::Event, self.events.store().len()),
            (EntityKind::Subscription, self.subscriptions.store().len()),
            (EntityKind::Ven, self.vens.store().len()),
            (EntityKind::Resource, self.resources.store().len()),
        ]
    }

    // ---- VEN 资源 ----

    /// 在 VEN 下创建资源，VEN 不存在时 404
    pub fn create_resource(
        &self,
        ctx: &RequestContext,
        ven_id: &ObjectId,
        mut resource: Resource,
    ) -> AppResult<EntityResponse<Resource>> {
        self.vens.get(ven_id)?;
        resource.ven_id = ven_id.clone();
        self.resources.create(ctx, resource)
    }

    /// 列出 VEN 下的资源，VEN 不存在时 404
    pub fn list_resources(
        &self,
        ven_id: &ObjectId,
        params: ListParams,
        resource_name: Option<String>,
    ) -> AppResult<ListResponse<Resource>> {
        self.vens.get(ven_id)?;
        let filter = ResourceFilter {
            ven_id: Some(ven_id.clone()),
            resource_name,
        };
        Ok(self.resources.list(params, &filter))
    }

    /// 删除 VEN 下的单个资源；资源属于其它 VEN 时视为不存在
    pub fn delete_resource(
        &self,
        ctx: &RequestContext,
        ven_id: &ObjectId,
        resource_id: &ObjectId,
    ) -> AppResult<EntityResponse<Resource>> {
        let resource = self.resources.get(resource_id)?;
        if &resource.ven_id != ven_id {
            return Err(AppError::Store(StoreError::IdentifierUnknown {
                kind: Resource::KIND,
                id: resource_id.clone(),
            }));
        }
        self.resources.delete(ctx, resource_id)
    }

    /// 删除 VEN，并删除其名下全部资源
    ///
    /// 资源的删除不是原子的：删除过程中新建的资源可能被保留。
    pub fn delete_ven(&self, ctx: &RequestContext, id: &ObjectId) -> AppResult<EntityResponse<Ven>> {
        let removed = self.vens.delete(ctx, id)?;
        let orphans = self
            .resources
            .store()
            .remove_all(|r| &r.ven_id == id, &ctx.mutation_options());
        debug!(ven = %id, resources = orphans.len(), "ven resources removed");
        Ok(removed)
    }
}

fn service<E: Entity>(config: &VtnConfig, engine: QueryEngine) -> EntityService<E> {
    let store = VersionedStore::new(config.stores.for_kind(E::KIND));
    EntityService::new(Arc::new(store), engine, config.change_feed_capacity)
}
