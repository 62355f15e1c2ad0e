//! Notification wire-format vector tests.

#![allow(clippy::unwrap_used)]
#![allow(clippy::expect_used)]
#![allow(clippy::panic)]

use authnotify_core::protocol::event::{Notification, NEW_USER, NEW_USER_MESSAGE};


#[test]
fn event_vectors() {
    let files = [
        "event_new_user.json",
        "event_data_key_order.json",
        "event_missing_data.json",
        "event_empty_data.json",
        "event_unknown_field.json",
        "event_missing_type.json",
    ];

    for f in files {
        let v = vector_loader::load(f);
        let res = Notification::from_json(&v.input_text());

        if let Some(err) = v.expect_error {
            let e = res.expect_err("expected error");
            assert_eq!(e.client_code().as_str(), err.code, "vector={}", v.description);
            continue;
        }

        let event = res.expect("expected ok event");
        let wire = v.expect_wire.expect("missing expect_wire");
        assert_eq!(event.to_json().unwrap(), wire, "vector={}", v.description);
    }
}

#[test]
fn new_user_helper_matches_registration_payload() {
    let event = Notification::new_user("a@b.com");
    assert_eq!(event.kind(), NEW_USER);
    assert_eq!(event.message(), NEW_USER_MESSAGE);
    assert_eq!(
        event.to_json().unwrap(),
        r#"{"type":"NEW_USER","message":"A new user has registered","data":{"email":"a@b.com"}}"#
    );
}

#[test]
fn encoding_is_stable_across_insertion_order() {
    let a = Notification::new("X", "m").with_field("b", 2).with_field("a", 1);
    let b = Notification::new("X", "m").with_field("a", 1).with_field("b", 2);
    assert_eq!(a, b);
    assert_eq!(a.to_json().unwrap(), b.to_json().unwrap());
}

#[test]
fn repeated_key_keeps_last_value() {
    let event = Notification::new("X", "m")
        .with_field("email", "old@example.com")
        .with_field("email", "new@example.com");
    assert_eq!(event.data().len(), 1);
    assert_eq!(event.data()["email"], "new@example.com");
}

#[test]
fn blank_type_fails_check() {
    assert!(Notification::new("  ", "m").check().is_err());
    assert!(Notification::new("NEW_USER", "").check().is_ok());
}
