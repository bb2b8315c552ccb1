#![allow(clippy::unwrap_used)]
#![allow(clippy::expect_used)]
#![allow(clippy::panic)]

use pulsegate_core::marker::{HandlerDescriptor, HttpVerb};
use pulsegate_core::naming;
use pulsegate_core::PulsegateError;

fn hello_handler() -> HandlerDescriptor {
    HandlerDescriptor::new("MyResource")
        .resource_path("/myresource")
        .method_path("test")
        .verb(HttpVerb::Get)
}

#[test]
fn relative_name_is_suffixed_onto_base_name() {
    let id = naming::resolve("resource-meter", false, &hello_handler()).unwrap();
    assert_eq!(id, "GET - /myresource/test.resource-meter");
}

#[test]
fn absolute_name_is_used_verbatim() {
    let id = naming::resolve("global-meter", true, &hello_handler()).unwrap();
    assert_eq!(id, "global-meter");
}

#[test]
fn empty_name_falls_back_to_base_name() {
    let id = naming::resolve("", false, &hello_handler()).unwrap();
    assert_eq!(id, "GET - /myresource/test");
}

#[test]
fn resource_segment_alone() {
    let desc = HandlerDescriptor::new("Root")
        .resource_path("/status")
        .verb(HttpVerb::Get);
    assert_eq!(naming::base_name(&desc).unwrap(), "GET - /status");
}

#[test]
fn method_segment_alone() {
    let desc = HandlerDescriptor::new("Root")
        .method_path("ping")
        .verb(HttpVerb::Head);
    assert_eq!(naming::base_name(&desc).unwrap(), "HEAD - ping");
}

#[test]
fn verb_scan_follows_priority_order() {
    // declaration order does not matter; GET always wins over POST
    let desc = HandlerDescriptor::new("Multi")
        .resource_path("/multi")
        .verb(HttpVerb::Post)
        .verb(HttpVerb::Get);
    assert_eq!(naming::base_name(&desc).unwrap(), "GET - /multi");

    let desc = HandlerDescriptor::new("Multi")
        .resource_path("/multi")
        .verb(HttpVerb::Head)
        .verb(HttpVerb::Delete);
    assert_eq!(naming::base_name(&desc).unwrap(), "DELETE - /multi");
}

#[test]
fn missing_verb_is_a_configuration_error() {
    let desc = HandlerDescriptor::new("NoVerb").resource_path("/x");
    let err = naming::base_name(&desc).expect_err("must fail");
    assert!(matches!(err, PulsegateError::Configuration(_)));
    assert!(err.to_string().contains("NoVerb"));
}

#[test]
fn resolution_is_deterministic() {
    let desc = hello_handler();
    let first = naming::resolve("resource-timer", false, &desc).unwrap();
    let second = naming::resolve("resource-timer", false, &desc).unwrap();
    assert_eq!(first, second);
}
