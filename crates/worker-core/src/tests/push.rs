use serde_json::json;

use crate::push::{DEFAULT_BODY, DEFAULT_TAG, DEFAULT_TITLE, PayloadStatus, PushEvent};
use crate::testutil::Harness;
use crate::worker::{Dispatched, WorkerEvent};
use crate::{PlatformError, WorkerError};

fn push(h: &Harness, event: PushEvent) -> crate::push::PushDelivery {
    match h.worker.dispatch(WorkerEvent::Push(event)).unwrap() {
        Dispatched::Pushed(delivery) => delivery,
        other => panic!("unexpected dispatch result: {other:?}"),
    }
}

#[test]
fn push_with_full_payload() {
    let h = Harness::new();
    let body = json!({
        "title": "Majlis tonight",
        "body": "Hussainiya, 8pm",
        "tag": "majlis-1",
        "data": { "url": "/piece/12" }
    });
    let delivery = push(&h, PushEvent::with_body(body.to_string()));
    assert_eq!(delivery.payload, PayloadStatus::Applied);

    let shown = h.tray.displayed();
    assert_eq!(shown.len(), 1);
    let n = &shown[0];
    assert_eq!(n.title, "Majlis tonight");
    assert_eq!(n.options.body, "Hussainiya, 8pm");
    assert_eq!(n.tag(), "majlis-1");
    assert_eq!(n.url(), Some("/piece/12"));
    assert_eq!(n.options.icon, "/main.png");
    assert_eq!(n.options.badge, "/main.png");
    assert_eq!(n.options.vibrate, vec![200, 100, 200]);
    assert!(n.has_action("view"));
    assert!(n.has_action("dismiss"));
}

#[test]
fn push_without_payload_uses_defaults() {
    let h = Harness::new();
    let delivery = push(&h, PushEvent::empty());
    assert_eq!(delivery.payload, PayloadStatus::Absent);

    let n = &h.tray.displayed()[0];
    assert_eq!(n.title, DEFAULT_TITLE);
    assert_eq!(n.options.body, DEFAULT_BODY);
    assert_eq!(n.tag(), DEFAULT_TAG);
    assert!(n.options.data.is_empty());
}

#[test]
fn malformed_payload_still_shows_defaults() {
    let h = Harness::new();
    let delivery = push(&h, PushEvent::with_body("not json {"));
    assert!(matches!(delivery.payload, PayloadStatus::Malformed(_)));
    assert_eq!(h.tray.displayed()[0].title, DEFAULT_TITLE);

    let h = Harness::new();
    let delivery = push(&h, PushEvent::with_body("[1, 2, 3]"));
    assert!(matches!(delivery.payload, PayloadStatus::Malformed(_)));
    assert_eq!(h.tray.displayed()[0].tag(), DEFAULT_TAG);
}

#[test]
fn partial_payload_fills_missing_fields() {
    let h = Harness::new();
    push(&h, PushEvent::with_body(r#"{"title":"Wiladat","body":""}"#));
    let n = &h.tray.displayed()[0];
    assert_eq!(n.title, "Wiladat");
    assert_eq!(n.options.body, DEFAULT_BODY);
    assert_eq!(n.tag(), DEFAULT_TAG);
}

#[test]
fn wrong_typed_field_falls_back_alone() {
    let h = Harness::new();
    let delivery = push(
        &h,
        PushEvent::with_body(r#"{"title":"Majlis tonight","tag":7,"body":null,"data":"x"}"#),
    );
    assert_eq!(delivery.payload, PayloadStatus::Applied);

    let n = &h.tray.displayed()[0];
    assert_eq!(n.title, "Majlis tonight");
    assert_eq!(n.options.body, DEFAULT_BODY);
    assert_eq!(n.tag(), DEFAULT_TAG);
    assert!(n.options.data.is_empty());
}

#[test]
fn same_tag_replaces_displayed_notification() {
    let h = Harness::new();
    push(&h, PushEvent::with_body(r#"{"title":"first"}"#));
    push(&h, PushEvent::with_body(r#"{"title":"second"}"#));

    let shown = h.tray.displayed();
    assert_eq!(shown.len(), 1);
    assert_eq!(shown[0].title, "second");
    assert_eq!(h.tray.shown().len(), 2);
}

#[test]
fn denied_permission_surfaces_as_error() {
    let h = Harness::new();
    h.tray.deny_permission();
    let err = h.worker.dispatch(WorkerEvent::Push(PushEvent::empty())).unwrap_err();
    assert!(matches!(
        err,
        WorkerError::Platform(PlatformError::PermissionDenied)
    ));
    assert!(h.tray.displayed().is_empty());
}
