//! 集合查询引擎（QueryEngine）
//!
//! 把存储某一时刻的快照变成一页结果及计数，供所有列表接口使用。
//! 处理顺序固定：
//! 1. 文本匹配（区分大小写的子串，任一可搜索字段命中即可；空模式匹配全部）
//! 2. 修改时间窗口：`last_modification > from` 且 `last_modification <= to`
//! 3. 按创建时间升序的稳定排序
//! 4. `offset` / `limit` 分页：缺省即不设界；给出的 `limit` 不超过服务端上限
//!
use crate::entity::Entity;
use crate::specification::{Everything, Specification};
use bon::Builder;
use chrono::{DateTime, Utc};

pub const DEFAULT_MAX_PAGE_SIZE: usize = 50;

/// 列表查询参数，均可缺省
#[derive(Builder, Clone, Debug, Default, PartialEq, Eq)]
pub struct CollectionQuery {
    #[builder(into)]
    pattern: Option<String>,
    /// 不含
    from: Option<DateTime<Utc>>,
    /// 包含
    to: Option<DateTime<Utc>>,
    offset: Option<usize>,
    limit: Option<usize>,
}

impl CollectionQuery {
    pub fn pattern(&self) -> Option<&str> {
        self.pattern.as_deref()
    }

    /// 修改时间下界（不含）
    pub fn modified_after(&self) -> Option<DateTime<Utc>> {
        self.from
    }

    /// 修改时间上界（包含）
    pub fn modified_until(&self) -> Option<DateTime<Utc>> {
        self.to
    }

    pub fn offset(&self) -> Option<usize> {
        self.offset
    }

    pub fn limit(&self) -> Option<usize> {
        self.limit
    }
}

/// 文本匹配规约
#[derive(Debug, Clone, Copy)]
pub struct TextMatch<'a> {
    pattern: Option<&'a str>,
}

impl<'a> TextMatch<'a> {
    pub fn new(pattern: Option<&'a str>) -> Self {
        Self { pattern }
    }
}

impl<E: Entity> Specification<E> for TextMatch<'_> {
    fn is_satisfied_by(&self, candidate: &E) -> bool {
        match self.pattern {
            None | Some("") => true,
            Some(p) => candidate.search_text().iter().any(|text| text.contains(p)),
        }
    }
}

/// 修改时间窗口规约：`(from, to]`
#[derive(Debug, Clone, Copy, Default)]
pub struct ModifiedWithin {
    from: Option<DateTime<Utc>>,
    to: Option<DateTime<Utc>>,
}

impl ModifiedWithin {
    pub fn new(from: Option<DateTime<Utc>>, to: Option<DateTime<Utc>>) -> Self {
        Self { from, to }
    }
}

impl<E: Entity> Specification<E> for ModifiedWithin {
    fn is_satisfied_by(&self, candidate: &E) -> bool {
        if self.from.is_none() && self.to.is_none() {
            return true;
        }
        let Some(modified) = candidate.last_modification() else {
            return false;
        };
        self.from.is_none_or(|from| modified > from) && self.to.is_none_or(|to| modified <= to)
    }
}

/// 一页查询结果与计数
#[derive(Debug, Clone, PartialEq)]
pub struct QueryPage<E> {
    pub items: Vec<E>,
    /// 未过滤快照的大小
    pub total_count: usize,
    /// 过滤后、分页前的大小
    pub filtered_count: usize,
    /// 服务端单页上限
    pub max_page_size: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QueryEngine {
    max_page_size: usize,
}

impl Default for QueryEngine {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_PAGE_SIZE)
    }
}

impl QueryEngine {
    pub fn new(max_page_size: usize) -> Self {
        Self { max_page_size }
    }

    pub fn max_page_size(&self) -> usize {
        self.max_page_size
    }

    pub fn execute<E: Entity>(&self, snapshot: Vec<E>, query: &CollectionQuery) -> QueryPage<E> {
        self.execute_with(snapshot, query, &Everything)
    }

    /// 与 `execute` 相同，额外的 `filter` 与文本匹配一起参与第 1 步
    pub fn execute_with<E, S>(
        &self,
        snapshot: Vec<E>,
        query: &CollectionQuery,
        filter: &S,
    ) -> QueryPage<E>
    where
        E: Entity,
        S: Specification<E> + ?Sized,
    {
        let total_count = snapshot.len();
        let text = TextMatch::new(query.pattern());
        let window = ModifiedWithin::new(query.modified_after(), query.modified_until());

        let mut filtered: Vec<E> = snapshot
            .into_iter()
            .filter(|e| filter.is_satisfied_by(e) && text.is_satisfied_by(e))
            .filter(|e| window.is_satisfied_by(e))
            .collect();
        let filtered_count = filtered.len();

        // sort_by_key 为稳定排序，创建时间相同的保持快照中的相对顺序
        filtered.sort_by_key(|e| e.created());

        let limit = query
            .limit()
            .map_or(usize::MAX, |l| l.min(self.max_page_size));
        let items = filtered
            .into_iter()
            .skip(query.offset().unwrap_or(0))
            .take(limit)
            .collect();

        QueryPage {
            items,
            total_count,
            filtered_count,
            max_page_size: self.max_page_size,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entity::ObjectMetadata;
    use crate::specification::predicate;
    use chrono::{Duration, TimeZone};
    use vtn_macros::entity;

    #[entity(kind = Report)]
    struct Note {
        #[search]
        title: String,
        #[search]
        author: Option<String>,
        rank: u32,
    }

    fn base() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 3, 1, 0, 0, 0).unwrap()
    }

    fn note(id: &str, title: &str, minutes: i64, rank: u32) -> Note {
        let at = base() + Duration::minutes(minutes);
        Note {
            metadata: ObjectMetadata::with_id(id).created_at(at).last_modified_at(at),
            title: title.into(),
            author: None,
            rank,
        }
    }

    fn ids(page: &QueryPage<Note>) -> Vec<String> {
        page.items
            .iter()
            .map(|n| n.metadata.id.clone().unwrap().to_string())
            .collect()
    }

    #[test]
    fn empty_query_returns_everything_ordered_by_created() {
        let snapshot = vec![
            note("c", "gamma", 30, 0),
            note("a", "alpha", 10, 0),
            note("b", "beta", 20, 0),
        ];
        let page = QueryEngine::default().execute(snapshot, &CollectionQuery::default());
        assert_eq!(ids(&page), vec!["a", "b", "c"]);
        assert_eq!(page.total_count, 3);
        assert_eq!(page.filtered_count, 3);
        assert_eq!(page.max_page_size, DEFAULT_MAX_PAGE_SIZE);
    }

    #[test]
    fn pattern_is_case_sensitive_substring_over_any_field() {
        let mut with_author = note("x", "unrelated", 5, 0);
        with_author.author = Some("Peak Shaving Team".into());
        let snapshot = vec![note("a", "peak-price", 1, 0), note("b", "Peak", 2, 0), with_author];

        let q = CollectionQuery::builder().pattern("Peak").build();
        let page = QueryEngine::default().execute(snapshot.clone(), &q);
        assert_eq!(ids(&page), vec!["b", "x"]);

        let q = CollectionQuery::builder().pattern("").build();
        let page = QueryEngine::default().execute(snapshot, &q);
        assert_eq!(page.filtered_count, 3);
    }

    #[test]
    fn window_is_exclusive_from_inclusive_to() {
        let snapshot: Vec<Note> = (0..5).map(|i| note(&i.to_string(), "n", i, 0)).collect();
        let q = CollectionQuery::builder()
            .from(base() + Duration::minutes(1))
            .to(base() + Duration::minutes(3))
            .build();
        let page = QueryEngine::default().execute(snapshot.clone(), &q);
        assert_eq!(ids(&page), vec!["2", "3"]);

        let same = base() + Duration::minutes(2);
        let q = CollectionQuery::builder().from(same).to(same).build();
        let page = QueryEngine::default().execute(snapshot, &q);
        assert!(page.items.is_empty());
        assert_eq!(page.filtered_count, 0);
        assert_eq!(page.total_count, 5);
    }

    #[test]
    fn zero_limit_and_large_offset_keep_counts() {
        let snapshot: Vec<Note> = (0..8).map(|i| note(&i.to_string(), "n", i, 0)).collect();

        let q = CollectionQuery::builder().limit(0).build();
        let page = QueryEngine::default().execute(snapshot.clone(), &q);
        assert!(page.items.is_empty());
        assert_eq!(page.filtered_count, 8);
        assert_eq!(page.total_count, 8);

        let q = CollectionQuery::builder().offset(20).build();
        let page = QueryEngine::default().execute(snapshot, &q);
        assert!(page.items.is_empty());
        assert_eq!(page.filtered_count, 8);
    }

    #[test]
    fn limit_is_capped_by_max_page_size() {
        let snapshot: Vec<Note> = (0..10).map(|i| note(&i.to_string(), "n", i, 0)).collect();
        let engine = QueryEngine::new(4);

        let page = engine.execute(snapshot.clone(), &CollectionQuery::builder().limit(9).build());
        assert_eq!(page.items.len(), 4);

        // 未给出 limit 时不截断
        let page = engine.execute(snapshot.clone(), &CollectionQuery::default());
        assert_eq!(page.items.len(), 10);
        assert_eq!(page.max_page_size, 4);

        let q = CollectionQuery::builder().limit(7).offset(8).build();
        let page = engine.execute(snapshot, &q);
        assert_eq!(ids(&page), vec!["8", "9"]);
        assert_eq!(page.max_page_size, 4);
    }

    #[test]
    fn ties_on_created_keep_snapshot_order() {
        let snapshot = vec![note("z", "n", 0, 0), note("y", "n", 0, 0), note("x", "n", 0, 0)];
        let first = QueryEngine::default().execute(snapshot.clone(), &CollectionQuery::default());
        let second = QueryEngine::default().execute(snapshot, &CollectionQuery::default());
        assert_eq!(ids(&first), vec!["z", "y", "x"]);
        assert_eq!(first, second);
    }

    #[test]
    fn extra_filter_narrows_filtered_count_not_total() {
        let snapshot: Vec<Note> = (0..6)
            .map(|i| note(&i.to_string(), "n", i, i as u32 % 2))
            .collect();
        let odd = predicate(|n: &Note| n.rank == 1);
        let page = QueryEngine::default().execute_with(snapshot, &CollectionQuery::default(), &odd);
        assert_eq!(ids(&page), vec!["1", "3", "5"]);
        assert_eq!(page.filtered_count, 3);
        assert_eq!(page.total_count, 6);
    }
}
