use serde_json::json;

use super::data;
use crate::click::{ClickOutcome, NotificationClick};
use crate::message::PageMessage;
use crate::notification::{Notification, NotificationOptions};
use crate::testutil::{Harness, TEST_ORIGIN};
use crate::worker::{Dispatched, WorkerEvent};

fn notification(tag: &str, url: Option<&str>) -> Notification {
    let data = match url {
        Some(url) => data(json!({ "url": url })),
        None => data(json!({})),
    };
    Notification {
        title: "Reminder".into(),
        options: NotificationOptions {
            tag: tag.into(),
            data,
            ..Default::default()
        },
    }
}

fn click(h: &Harness, click: NotificationClick) -> ClickOutcome {
    match h.worker.dispatch(WorkerEvent::NotificationClick(click)).unwrap() {
        Dispatched::Clicked(outcome) => outcome,
        other => panic!("unexpected dispatch result: {other:?}"),
    }
}

#[test]
fn click_focuses_existing_window_and_navigates() {
    let h = Harness::new();
    h.clients.add_window("w1", &format!("{TEST_ORIGIN}/home"), true);

    let outcome = click(&h, NotificationClick::body(notification("t1", Some("/piece/42"))));
    assert_eq!(
        outcome,
        ClickOutcome::Navigated {
            client_id: "w1".into(),
            url: "/piece/42".into()
        }
    );
    assert_eq!(
        h.clients.posted(),
        vec![(
            "w1".to_string(),
            PageMessage::Navigate {
                url: "/piece/42".into()
            }
        )]
    );
    assert_eq!(h.clients.focused(), vec!["w1".to_string()]);
    assert!(h.clients.opened().is_empty());
    assert_eq!(h.tray.closed(), vec!["t1".to_string()]);
}

#[test]
fn click_considers_uncontrolled_windows() {
    let h = Harness::new();
    h.clients.add_window("w1", &format!("{TEST_ORIGIN}/"), false);

    let outcome = click(&h, NotificationClick::body(notification("t1", None)));
    assert!(matches!(outcome, ClickOutcome::Navigated { ref client_id, .. } if client_id == "w1"));
}

#[test]
fn click_without_windows_opens_default_url() {
    let h = Harness::new();
    let outcome = click(&h, NotificationClick::body(notification("t1", None)));
    assert_eq!(
        outcome,
        ClickOutcome::OpenedWindow {
            url: "/calendar".into()
        }
    );
    assert_eq!(h.clients.opened(), vec!["/calendar".to_string()]);
}

#[test]
fn click_ignores_foreign_origin_windows() {
    let h = Harness::new();
    h.clients.add_window("other", "https://elsewhere.example/", true);

    let outcome = click(&h, NotificationClick::body(notification("t1", Some("/piece/3"))));
    assert_eq!(
        outcome,
        ClickOutcome::OpenedWindow {
            url: "/piece/3".into()
        }
    );
    assert!(h.clients.posted().is_empty());
}

#[test]
fn view_action_behaves_like_body_click() {
    let h = Harness::new();
    let outcome = click(&h, NotificationClick::action(notification("t1", Some("/x")), "view"));
    assert_eq!(outcome, ClickOutcome::OpenedWindow { url: "/x".into() });
}

#[test]
fn dismiss_only_closes() {
    let h = Harness::new();
    h.clients.add_window("w1", &format!("{TEST_ORIGIN}/"), true);

    let outcome = click(&h, NotificationClick::action(notification("t9", Some("/x")), "dismiss"));
    assert_eq!(outcome, ClickOutcome::Dismissed);
    assert_eq!(h.tray.closed(), vec!["t9".to_string()]);
    assert!(h.clients.posted().is_empty());
    assert!(h.clients.focused().is_empty());
    assert!(h.clients.opened().is_empty());
}

#[test]
fn empty_url_falls_back_to_default() {
    let h = Harness::new();
    let outcome = click(&h, NotificationClick::body(notification("t1", Some(""))));
    assert_eq!(
        outcome,
        ClickOutcome::OpenedWindow {
            url: "/calendar".into()
        }
    );
}
