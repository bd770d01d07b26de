use chrono::{Duration, Utc};
use futures_util::StreamExt;
use http::StatusCode;
use serde_json::json;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use vtn_application::VtnRegistry;
use vtn_application::audit::AuditListener;
use vtn_application::config::VtnConfig;
use vtn_application::context::RequestContext;
use vtn_application::filters::{EventFilter, ReportFilter, VenFilter};
use vtn_application::model::{
    Event, Interval, ObjectOperation, Operation, Program, Report, Resource, Subscription, Ven,
};
use vtn_application::service::{FILTERED_COUNT, ListParams, MAX_PAGE_SIZE, TOTAL_COUNT};
use vtn_domain::entity::{Entity, EntityKind, ObjectId};
use vtn_domain::listener::ChangeKind;

fn ctx() -> RequestContext {
    RequestContext::builder()
        .correlation_id("it-1")
        .client_name("bl-client")
        .build()
}

fn event_for(program: &ObjectId, name: &str) -> Event {
    Event {
        program_id: program.clone(),
        event_name: Some(name.into()),
        intervals: vec![Interval::default()],
        ..Default::default()
    }
}

#[test]
fn program_and_events_lifecycle() {
    let registry = VtnRegistry::default();
    let audit = Arc::new(AuditListener::default());
    registry.attach_audit(audit.clone());

    let program = registry
        .programs()
        .create(&ctx(), Program::named("Peak Saver"))
        .unwrap()
        .body;
    let program_id = program.metadata.id.clone().unwrap();
    let other = registry
        .programs()
        .create(&ctx(), Program::named("Off Peak"))
        .unwrap()
        .body;
    let other_id = other.metadata.id.clone().unwrap();

    for i in 0..3 {
        registry
            .events()
            .create(&ctx(), event_for(&program_id, &format!("peak-{i}")))
            .unwrap();
    }
    registry
        .events()
        .create(&ctx(), event_for(&other_id, "night"))
        .unwrap();

    let filter = EventFilter {
        program_id: Some(program_id.clone()),
        ..Default::default()
    };
    let page = registry.events().list(ListParams::default(), &filter);
    assert_eq!(page.items.len(), 3);
    assert_eq!(page.headers[TOTAL_COUNT], "4");
    assert_eq!(page.headers[FILTERED_COUNT], "3");
    assert_eq!(page.headers[MAX_PAGE_SIZE], "50");

    let params = ListParams {
        search: Some("peak-2".into()),
        ..Default::default()
    };
    let page = registry.events().list(params, &filter);
    assert_eq!(page.items.len(), 1);
    assert_eq!(page.items[0].event_name.as_deref(), Some("peak-2"));

    // 6 次新增都经过审计
    assert_eq!(audit.recorded(), 6);
}

#[test]
fn put_creates_then_updates_and_rejects_stale() {
    let registry = VtnRegistry::default();
    let now = Utc::now();

    let mut ven = Ven::named("ven-42");
    ven.metadata.id = Some(ObjectId::new("ven-42"));
    ven.metadata.last_modification = Some(now);

    let created = registry.vens().put(&ctx(), ven.clone()).unwrap();
    assert_eq!(created.status, StatusCode::CREATED);

    ven.metadata.last_modification = Some(now + Duration::seconds(1));
    ven.attributes = vec![vtn_application::model::ValuesMap::new(
        "LOCATION",
        vec![json!(51.5), json!(-0.1)],
    )];
    let updated = registry.vens().put(&ctx(), ven.clone()).unwrap();
    assert_eq!(updated.status, StatusCode::OK);
    assert_eq!(updated.body.created(), created.body.created());

    ven.metadata.last_modification = Some(now);
    let err = registry.vens().put(&ctx(), ven).unwrap_err();
    assert_eq!(err.status_code(), StatusCode::CONFLICT);

    let stored = registry.vens().get(&ObjectId::new("ven-42")).unwrap();
    assert_eq!(stored.attributes.len(), 1);
}

#[test]
fn validation_failures_are_bad_requests() {
    let registry = VtnRegistry::default();

    let err = registry.programs().create(&ctx(), Program::default()).unwrap_err();
    assert_eq!(err.status_code(), StatusCode::BAD_REQUEST);

    let no_intervals = Event {
        program_id: ObjectId::new("p1"),
        ..Default::default()
    };
    let err = registry.events().create(&ctx(), no_intervals).unwrap_err();
    assert_eq!(err.status_code(), StatusCode::BAD_REQUEST);

    let subscription = Subscription {
        client_name: "ven-a".into(),
        program_id: ObjectId::new("p1"),
        object_operations: vec![ObjectOperation {
            objects: vec![EntityKind::Event],
            operations: vec![Operation::Post],
            callback_url: String::new(),
            bearer_token: None,
        }],
        ..Default::default()
    };
    let err = registry.subscriptions().create(&ctx(), subscription).unwrap_err();
    assert_eq!(err.status_code(), StatusCode::BAD_REQUEST);
    assert!(registry.counts().iter().all(|(_, n)| *n == 0));
}

#[test]
fn deleting_a_ven_removes_its_resources() {
    let registry = VtnRegistry::default();
    let ven = registry.vens().create(&ctx(), Ven::named("ven-a")).unwrap().body;
    let ven_id = ven.metadata.id.clone().unwrap();
    let keep = registry.vens().create(&ctx(), Ven::named("ven-b")).unwrap().body;
    let keep_id = keep.metadata.id.clone().unwrap();

    for (owner, name) in [(&ven_id, "meter-1"), (&ven_id, "meter-2"), (&keep_id, "meter-3")] {
        let resource = Resource {
            resource_name: name.into(),
            ..Default::default()
        };
        registry.create_resource(&ctx(), owner, resource).unwrap();
    }

    let page = registry
        .list_resources(&ven_id, ListParams::default(), None)
        .unwrap();
    assert_eq!(page.items.len(), 2);
    assert_eq!(page.headers[TOTAL_COUNT], "3");

    let foreign = registry
        .list_resources(&keep_id, ListParams::default(), Some("meter-3".into()))
        .unwrap()
        .items
        .remove(0);
    let err = registry
        .delete_resource(&ctx(), &ven_id, foreign.metadata.id.as_ref().unwrap())
        .unwrap_err();
    assert_eq!(err.status_code(), StatusCode::NOT_FOUND);

    let removed = registry.delete_ven(&ctx(), &ven_id).unwrap();
    assert_eq!(removed.body.ven_name, "ven-a");
    assert_eq!(registry.resources().store().len(), 1);

    let err = registry
        .list_resources(&ven_id, ListParams::default(), None)
        .unwrap_err();
    assert_eq!(err.status_code(), StatusCode::NOT_FOUND);

    let page = registry.vens().list(
        ListParams::default(),
        &VenFilter {
            ven_name: Some("ven-b".into()),
            ..Default::default()
        },
    );
    assert_eq!(page.items.len(), 1);
}

#[test]
fn cancelled_request_is_unavailable_and_leaves_store_untouched() {
    let registry = VtnRegistry::default();
    let token = CancellationToken::new();
    token.cancel();
    let cancelled = RequestContext::builder().cancellation(token).build();

    let err = registry
        .programs()
        .create(&cancelled, Program::named("late"))
        .unwrap_err();
    assert_eq!(err.status_code(), StatusCode::SERVICE_UNAVAILABLE);
    assert!(registry.programs().store().is_empty());
}

#[test]
fn per_kind_config_allows_downgrades() {
    let config = VtnConfig::from_json_str(
        r#"{ "max_page_size": 2, "stores": { "reports": { "allow_downgrades": true } } }"#,
    )
    .unwrap();
    let registry = VtnRegistry::from_config(config);
    let now = Utc::now();

    let mut report = Report {
        program_id: ObjectId::new("p1"),
        event_id: ObjectId::new("e1"),
        client_name: "ven-a".into(),
        ..Default::default()
    };
    report.metadata.id = Some(ObjectId::new("r1"));
    report.metadata.last_modification = Some(now);
    registry.reports().create(&ctx(), report.clone()).unwrap();

    report.metadata.last_modification = Some(now - Duration::hours(1));
    report.report_name = Some("corrected".into());
    let resp = registry
        .reports()
        .replace(&ctx(), &ObjectId::new("r1"), report)
        .unwrap();
    assert_eq!(resp.status, StatusCode::OK);

    let page = registry.reports().list(
        ListParams::default(),
        &ReportFilter {
            client_name: Some("ven-a".into()),
            ..Default::default()
        },
    );
    assert_eq!(page.headers[MAX_PAGE_SIZE], "2");
    assert_eq!(page.items[0].report_name.as_deref(), Some("corrected"));
}

#[tokio::test]
async fn change_feed_carries_correlation_ids() {
    let registry = VtnRegistry::default();
    let feed = registry.events().change_feed("notifier");
    let mut stream = feed.subscribe();

    let program_id = ObjectId::new("p1");
    let created = registry
        .events()
        .create(&ctx(), event_for(&program_id, "peak"))
        .unwrap()
        .body;

    let quiet = RequestContext::builder().suppress_notifications(true).build();
    registry
        .events()
        .delete(&quiet, created.metadata.id.as_ref().unwrap())
        .unwrap();
    registry
        .events()
        .create(&ctx(), event_for(&program_id, "second"))
        .unwrap();

    let first = stream.next().await.unwrap().unwrap();
    assert_eq!(first.kind, ChangeKind::Added);
    assert_eq!(first.tracking.as_deref(), Some("it-1"));
    assert_eq!(first.entity.event_name.as_deref(), Some("peak"));

    // 静默删除不会出现在流中
    let second = stream.next().await.unwrap().unwrap();
    assert_eq!(second.kind, ChangeKind::Added);
    assert_eq!(second.entity.event_name.as_deref(), Some("second"));
}

#[test]
fn subscriptions_resolve_callbacks() {
    let registry = VtnRegistry::default();
    let subscription = Subscription {
        client_name: "ven-a".into(),
        program_id: ObjectId::new("p1"),
        object_operations: vec![ObjectOperation {
            objects: vec![EntityKind::Event, EntityKind::Program],
            operations: vec![Operation::Post, Operation::Put],
            callback_url: "https://ven-a.example/callbacks".into(),
            bearer_token: None,
        }],
        ..Default::default()
    };
    let stored = registry
        .subscriptions()
        .create(&ctx(), subscription)
        .unwrap()
        .body;

    assert_eq!(
        stored.callbacks_for(EntityKind::Event, &Operation::Post),
        vec!["https://ven-a.example/callbacks"]
    );
    assert!(stored.callbacks_for(EntityKind::Report, &Operation::Post).is_empty());
    assert!(stored.callbacks_for(EntityKind::Event, &Operation::Delete).is_empty());
}
