//! 实体服务（EntityService）
//!
//! 一种实体的全部接口语义：写操作调用存储并把 `MutationOutcome` 映射为
//! HTTP 状态码；列表操作取存储快照交给查询引擎，并把三个计数放入响应头。
//! 路由分发与请求体的 JSON 解析由外层完成，这里只接收已解析的实体与标识。
//!
use crate::context::RequestContext;
use crate::error::{AppError, AppResult};
use crate::filters::ListFilter;
use chrono::{DateTime, Utc};
use http::header::{HeaderMap, HeaderName, HeaderValue};
use http::StatusCode;
use serde::Deserialize;
use std::sync::Arc;
use tracing::debug;
use vtn_domain::changefeed::BroadcastChangeFeed;
use vtn_domain::entity::{Entity, ObjectId};
use vtn_domain::listener::ChangeListener;
use vtn_domain::outcome::MutationOutcome;
use vtn_domain::query::{CollectionQuery, QueryEngine, QueryPage};
use vtn_domain::store::VersionedStore;

pub const TOTAL_COUNT: &str = "x-total-count";
pub const FILTERED_COUNT: &str = "x-filtered-count";
pub const MAX_PAGE_SIZE: &str = "x-max-page-size";

/// 单个实体的响应
#[derive(Debug, Clone, PartialEq)]
pub struct EntityResponse<E> {
    pub status: StatusCode,
    pub body: E,
}

/// 列表响应：一页实体与计数头
#[derive(Debug, Clone)]
pub struct ListResponse<E> {
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub items: Vec<E>,
}

impl<E> From<QueryPage<E>> for ListResponse<E> {
    fn from(page: QueryPage<E>) -> Self {
        let mut headers = HeaderMap::new();
        for (name, value) in [
            (TOTAL_COUNT, page.total_count),
            (FILTERED_COUNT, page.filtered_count),
            (MAX_PAGE_SIZE, page.max_page_size),
        ] {
            headers.insert(HeaderName::from_static(name), HeaderValue::from(value));
        }
        Self {
            status: StatusCode::OK,
            headers,
            items: page.items,
        }
    }
}

/// 列表接口的通用查询参数
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct ListParams {
    pub skip: Option<usize>,
    pub limit: Option<usize>,
    pub search: Option<String>,
    pub from: Option<DateTime<Utc>>,
    pub to: Option<DateTime<Utc>>,
}

impl From<ListParams> for CollectionQuery {
    fn from(params: ListParams) -> Self {
        CollectionQuery::builder()
            .maybe_pattern(params.search)
            .maybe_from(params.from)
            .maybe_to(params.to)
            .maybe_offset(params.skip)
            .maybe_limit(params.limit)
            .build()
    }
}

/// 把变更结果映射为响应
pub fn respond<E>(outcome: MutationOutcome<E>) -> AppResult<EntityResponse<E>> {
    let (status, body) = match outcome {
        MutationOutcome::Created(e) => (StatusCode::CREATED, e),
        MutationOutcome::Success(e)
        | MutationOutcome::Updated(e)
        | MutationOutcome::NoOperation(e) => (StatusCode::OK, e),
        MutationOutcome::Failed(err) => return Err(err.into()),
    };
    Ok(EntityResponse { status, body })
}

#[derive(Clone)]
pub struct EntityService<E: Entity> {
    store: Arc<VersionedStore<E>>,
    engine: QueryEngine,
    feed_capacity: usize,
}

impl<E: Entity> EntityService<E> {
    pub fn new(store: Arc<VersionedStore<E>>, engine: QueryEngine, feed_capacity: usize) -> Self {
        Self {
            store,
            engine,
            feed_capacity,
        }
    }

    pub fn store(&self) -> &Arc<VersionedStore<E>> {
        &self.store
    }

    pub fn subscribe(&self, listener: Arc<dyn ChangeListener<E>>) {
        self.store.subscribe(listener);
    }

    /// 创建并注册一个变更广播流
    pub fn change_feed(&self, name: impl Into<String>) -> Arc<BroadcastChangeFeed<E>> {
        let feed = Arc::new(BroadcastChangeFeed::new(name, self.feed_capacity));
        self.store.subscribe(feed.clone());
        feed
    }

    /// POST：新增，标识已存在时 409
    pub fn create(&self, ctx: &RequestContext, entity: E) -> AppResult<EntityResponse<E>> {
        debug!(kind = %E::KIND, client = ?ctx.client_name, "create");
        respond(self.store.add(entity, &ctx.mutation_options()))
    }

    /// PUT（集合路径）：不存在时新增（201），存在时更新（200）
    pub fn put(&self, ctx: &RequestContext, entity: E) -> AppResult<EntityResponse<E>> {
        debug!(kind = %E::KIND, client = ?ctx.client_name, "put");
        respond(self.store.add_or_update(entity, None, &ctx.mutation_options()))
    }

    /// PUT（对象路径）：以路径中的标识更新已有对象
    ///
    /// 请求体可以不带标识；带了且与路径不一致时返回 400。
    pub fn replace(
        &self,
        ctx: &RequestContext,
        id: &ObjectId,
        mut entity: E,
    ) -> AppResult<EntityResponse<E>> {
        debug!(kind = %E::KIND, id = %id, client = ?ctx.client_name, "replace");
        match entity.id().cloned() {
            Some(body_id) if &body_id != id => {
                return Err(AppError::BadRequest(format!(
                    "body id {body_id} does not match path id {id}"
                )));
            }
            Some(_) => {}
            None => entity.metadata_mut().id = Some(id.clone()),
        }
        respond(self.store.update(entity, &ctx.mutation_options()))
    }

    /// DELETE：返回被删除的对象
    pub fn delete(&self, ctx: &RequestContext, id: &ObjectId) -> AppResult<EntityResponse<E>> {
        debug!(kind = %E::KIND, id = %id, client = ?ctx.client_name, "delete");
        respond(self.store.remove(id, &ctx.mutation_options()))
    }

    pub fn get(&self, id: &ObjectId) -> AppResult<E> {
        Ok(self.store.get(id)?)
    }

    /// GET（集合路径）
    pub fn list<F>(&self, params: ListParams, filter: &F) -> ListResponse<E>
    where
        F: ListFilter<E> + ?Sized,
    {
        let query = CollectionQuery::from(params);
        let page = self
            .engine
            .execute_with(self.store.get_all(), &query, &filter.specification());
        debug!(
            kind = %E::KIND,
            total = page.total_count,
            filtered = page.filtered_count,
            returned = page.items.len(),
            "list"
        );
        ListResponse::from(page)
    }
}
