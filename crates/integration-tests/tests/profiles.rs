//! End-to-end tests for profile management and the doctor directory.

#![allow(clippy::unwrap_used, clippy::expect_used)]

use medibook_integration_tests::TestContext;
use serde_json::{Value, json};

#[tokio::test]
async fn test_registration_seeds_profile() {
    let ctx = TestContext::new().await;
    ctx.register_and_login("Dr. Osei", "osei@clinic.example", "doctor")
        .await;

    let resp = ctx.client.get(ctx.url("/profile")).send().await.unwrap();
    assert_eq!(resp.status(), 200);
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["role"], "doctor");
    assert_eq!(body["profile"]["name"], "Dr. Osei");
    // Form fields the user hasn't filled in yet read as empty
    assert_eq!(body["profile"]["specialization"], "");
}

#[tokio::test]
async fn test_update_profile_merges() {
    let ctx = TestContext::new().await;
    ctx.register_and_login("Dr. Osei", "osei@clinic.example", "doctor")
        .await;

    let resp = ctx
        .client
        .put(ctx.url("/profile"))
        .json(&json!({
            "name": "Dr. A. Osei",
            "specialization": "cardiology",
            "contactInfo": "ext. 12",
        }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 204);

    let resp = ctx.client.get(ctx.url("/profile")).send().await.unwrap();
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["profile"]["name"], "Dr. A. Osei");
    assert_eq!(body["profile"]["specialization"], "cardiology");
    assert_eq!(body["profile"]["contactInfo"], "ext. 12");
}

#[tokio::test]
async fn test_update_profile_rejects_blank_field() {
    let ctx = TestContext::new().await;
    ctx.register_and_login("Ama", "ama@example.com", "patient")
        .await;

    let resp = ctx
        .client
        .put(ctx.url("/profile"))
        .json(&json!({
            "name": "Ama",
            "contactDetails": "   ",
            "medicalHistory": "none",
        }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 400);
    let body: Value = resp.json().await.unwrap();
    assert!(
        body["error"].as_str().unwrap().contains("contactDetails"),
        "error should name the offending field: {body}"
    );
}

#[tokio::test]
async fn test_update_profile_rejects_wrong_shape_for_role() {
    let ctx = TestContext::new().await;
    ctx.register_and_login("Ama", "ama@example.com", "patient")
        .await;

    // Doctor-shaped body against a patient account
    let resp = ctx
        .client
        .put(ctx.url("/profile"))
        .json(&json!({
            "name": "Ama",
            "specialization": "cardiology",
            "contactInfo": "ext. 12",
        }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 400);
}

#[tokio::test]
async fn test_delete_profile_revokes_role_in_live_session() {
    let ctx = TestContext::new().await;
    ctx.register_and_login("Ama", "ama@example.com", "patient")
        .await;

    let resp = ctx.client.delete(ctx.url("/profile")).send().await.unwrap();
    assert_eq!(resp.status(), 204);

    // The session survives but the role is gone
    let resp = ctx.client.get(ctx.url("/auth/me")).send().await.unwrap();
    assert_eq!(resp.status(), 200);
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["role"], Value::Null);

    // Role-gated endpoints now refuse
    let resp = ctx.client.get(ctx.url("/profile")).send().await.unwrap();
    assert_eq!(resp.status(), 403);
}

#[tokio::test]
async fn test_doctor_directory_lists_doctors_only() {
    let ctx = TestContext::new().await;

    let doctor_client = ctx.fresh_client();
    ctx.register_and_login_with(&doctor_client, "Dr. Osei", "osei@clinic.example", "doctor")
        .await;
    ctx.register_and_login("Ama", "ama@example.com", "patient")
        .await;

    // The patient sees the directory
    let resp = ctx.client.get(ctx.url("/doctors")).send().await.unwrap();
    assert_eq!(resp.status(), 200);
    let body: Value = resp.json().await.unwrap();
    let doctors = body.as_array().unwrap();
    assert_eq!(doctors.len(), 1);
    assert_eq!(doctors.first().unwrap()["name"], "Dr. Osei");
}
