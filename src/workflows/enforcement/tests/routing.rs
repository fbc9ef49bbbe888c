use std::sync::Arc;

use axum::body::Body;
use axum::http::{header, Request, StatusCode};
use serde_json::{json, Value};
use tower::ServiceExt;

use super::common::*;
use crate::workflows::enforcement::domain::ViolationReport;
use crate::workflows::enforcement::router::enforcement_router;

fn build_router() -> (
    axum::Router,
    Arc<crate::workflows::enforcement::repository::MemoryPropertyDirectory>,
) {
    let (service, _, _, _, properties) = build_service();
    (enforcement_router(Arc::new(service)), properties)
}

fn post_json(uri: &str, payload: &Value) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(serde_json::to_vec(payload).expect("serialize")))
        .expect("request")
}

fn post_report(report: &ViolationReport) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri("/api/v1/violations")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(serde_json::to_vec(report).expect("serialize")))
        .expect("request")
}

fn get(uri: &str) -> Request<Body> {
    Request::builder()
        .method("GET")
        .uri(uri)
        .body(Body::empty())
        .expect("request")
}

#[tokio::test]
async fn post_violation_returns_created_record() {
    let (router, _) = build_router();

    let response = router
        .oneshot(post_report(&report("WASTE-002")))
        .await
        .expect("router dispatch");

    assert_eq!(response.status(), StatusCode::CREATED);
    let payload = read_json_body(response).await;
    assert!(payload.get("id").is_some());
    assert_eq!(payload.get("status"), Some(&json!("AWAITING_OWNER")));
    assert_eq!(
        payload.pointer("/decision/decision"),
        Some(&json!("FINE"))
    );
    assert_eq!(payload.pointer("/decision/amount"), Some(&json!(500.0)));
}

#[tokio::test]
async fn post_violation_without_type_is_unprocessable() {
    let (router, _) = build_router();
    let mut bad_report = report("WASTE-002");
    bad_report.violation_type = "".to_string();

    let response = router
        .oneshot(post_report(&bad_report))
        .await
        .expect("router dispatch");

    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    let payload = read_json_body(response).await;
    assert!(payload
        .get("error")
        .and_then(Value::as_str)
        .unwrap_or_default()
        .contains("violation type"));
}

#[tokio::test]
async fn unknown_violation_returns_not_found() {
    let (router, _) = build_router();

    let response = router
        .oneshot(get("/api/v1/violations/vio-999999"))
        .await
        .expect("router dispatch");

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn second_accept_conflicts() {
    let (router, _) = build_router();

    let created = router
        .clone()
        .oneshot(post_report(&report("WASTE-002")))
        .await
        .expect("router dispatch");
    let created = read_json_body(created).await;
    let id = created
        .get("id")
        .and_then(Value::as_str)
        .expect("id present")
        .to_string();

    let accept_body = json!({ "actingOwner": "owner-9" });
    let first = router
        .clone()
        .oneshot(post_json(
            &format!("/api/v1/violations/{id}/accept"),
            &accept_body,
        ))
        .await
        .expect("router dispatch");
    assert_eq!(first.status(), StatusCode::OK);
    let settled = read_json_body(first).await;
    assert_eq!(settled.get("status"), Some(&json!("PAID")));

    let second = router
        .oneshot(post_json(
            &format!("/api/v1/violations/{id}/accept"),
            &accept_body,
        ))
        .await
        .expect("router dispatch");
    assert_eq!(second.status(), StatusCode::CONFLICT);
}

#[tokio::test]
async fn accept_by_the_wrong_owner_is_forbidden() {
    let (router, properties) = build_router();
    properties.register(active_property("p-12", "owner-9"));

    let created = router
        .clone()
        .oneshot(post_report(&property_report("WASTE-002", "p-12")))
        .await
        .expect("router dispatch");
    let created = read_json_body(created).await;
    let id = created
        .get("id")
        .and_then(Value::as_str)
        .expect("id present")
        .to_string();

    let response = router
        .oneshot(post_json(
            &format!("/api/v1/violations/{id}/accept"),
            &json!({ "actingOwner": "owner-2" }),
        ))
        .await
        .expect("router dispatch");
    assert_eq!(response.status(), StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn objection_flow_feeds_the_officer_queue() {
    let (router, _) = build_router();

    let created = router
        .clone()
        .oneshot(post_report(&report("WASTE-002")))
        .await
        .expect("router dispatch");
    let created = read_json_body(created).await;
    let id = created
        .get("id")
        .and_then(Value::as_str)
        .expect("id present")
        .to_string();

    let objected = router
        .clone()
        .oneshot(post_json(
            &format!("/api/v1/violations/{id}/object"),
            &json!({ "actingOwner": "owner-9", "reason": "not my property" }),
        ))
        .await
        .expect("router dispatch");
    assert_eq!(objected.status(), StatusCode::OK);
    let objected = read_json_body(objected).await;
    assert_eq!(objected.get("status"), Some(&json!("OBJECTED")));
    assert_eq!(
        objected.get("objectionReason"),
        Some(&json!("not my property"))
    );

    let queue = router
        .clone()
        .oneshot(get("/api/v1/violations/objected"))
        .await
        .expect("router dispatch");
    assert_eq!(queue.status(), StatusCode::OK);
    let queue = read_json_body(queue).await;
    assert_eq!(queue.as_array().map(Vec::len), Some(1));

    let overridden = router
        .oneshot(post_json(
            &format!("/api/v1/violations/{id}/override"),
            &json!({ "reason": "insufficient evidence" }),
        ))
        .await
        .expect("router dispatch");
    assert_eq!(overridden.status(), StatusCode::OK);
    let overridden = read_json_body(overridden).await;
    assert_eq!(overridden.get("status"), Some(&json!("CLOSED")));
    assert_eq!(
        overridden.pointer("/decision/decision"),
        Some(&json!("OVERRIDDEN"))
    );
    assert_eq!(overridden.pointer("/decision/amount"), Some(&json!(0.0)));
}

#[tokio::test]
async fn payments_endpoint_lists_the_settlement_receipt() {
    let (router, _) = build_router();

    let created = router
        .clone()
        .oneshot(post_report(&report("WASTE-002")))
        .await
        .expect("router dispatch");
    let created = read_json_body(created).await;
    let id = created
        .get("id")
        .and_then(Value::as_str)
        .expect("id present")
        .to_string();

    router
        .clone()
        .oneshot(post_json(
            &format!("/api/v1/violations/{id}/accept"),
            &json!({ "actingOwner": "owner-9" }),
        ))
        .await
        .expect("router dispatch");

    let payments = router
        .oneshot(get(&format!("/api/v1/violations/{id}/payments")))
        .await
        .expect("router dispatch");
    assert_eq!(payments.status(), StatusCode::OK);
    let payments = read_json_body(payments).await;
    let entries = payments.as_array().expect("array payload");
    assert_eq!(entries.len(), 1);
    assert_eq!(entries[0].get("amount"), Some(&json!(500.0)));
    assert!(entries[0]
        .get("receiptNumber")
        .and_then(Value::as_str)
        .unwrap_or_default()
        .starts_with("RCPT-"));
}

#[tokio::test]
async fn awaiting_owner_list_shows_open_notices() {
    let (router, _) = build_router();

    router
        .clone()
        .oneshot(post_report(&report("NOISE-001")))
        .await
        .expect("router dispatch");

    let listing = router
        .oneshot(get("/api/v1/violations/awaiting-owner"))
        .await
        .expect("router dispatch");
    assert_eq!(listing.status(), StatusCode::OK);
    let listing = read_json_body(listing).await;
    assert_eq!(listing.as_array().map(Vec::len), Some(1));
}
