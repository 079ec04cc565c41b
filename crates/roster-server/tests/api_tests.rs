//! HTTP surface tests: the real router over a scripted connection source
//!
//! Coverage includes:
//! - Response envelopes and error codes
//! - Login steps and mail delivery failures
//! - Member search, listing, detail, create, delete and photo upload
//! - Instructor named-parameter calls and detail lookups

mod common;

use axum::{
    body::Body,
    http::{header, Request, StatusCode},
    Router,
};
use common::{init_test_tracing, ScriptedSet, ScriptedSource};
use roster_server::{
    config::Config,
    create_router,
    db::{ProcedureError, SqlValue},
    features::{auth::LoginFlow, FeatureState},
    mail::MockMailer,
};
use serde_json::{json, Value};
use std::sync::Arc;
use std::time::Duration;
use tower::ServiceExt;

// ============================================================================
// Helper Functions
// ============================================================================

fn app_with_mailer(source: &ScriptedSource, mailer: Arc<MockMailer>) -> Router {
    init_test_tracing();
    let invoker = source.invoker();
    let login = LoginFlow::new(invoker.clone(), mailer, Duration::from_secs(300))
        .with_code_generator(|| "123456".to_string());
    create_router(FeatureState { invoker, login }, &Config::default())
}

fn app(source: &ScriptedSource) -> Router {
    app_with_mailer(source, Arc::new(MockMailer::new()))
}

async fn send(app: &Router, request: Request<Body>) -> (StatusCode, Value) {
    let response = app.clone().oneshot(request).await.unwrap();

    let status = response.status();
    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let json = if body.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&body).unwrap()
    };

    (status, json)
}

fn get(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
}

fn with_json(method: &str, uri: &str, body: Value) -> Request<Body> {
    Request::builder()
        .uri(uri)
        .method(method)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

fn multipart_photo(uri: &str, content_type: &str, bytes: &[u8]) -> Request<Body> {
    const BOUNDARY: &str = "roster-test-boundary";
    let mut body = Vec::new();
    body.extend_from_slice(format!("--{}\r\n", BOUNDARY).as_bytes());
    body.extend_from_slice(
        b"Content-Disposition: form-data; name=\"photo\"; filename=\"photo.bin\"\r\n",
    );
    body.extend_from_slice(format!("Content-Type: {}\r\n\r\n", content_type).as_bytes());
    body.extend_from_slice(bytes);
    body.extend_from_slice(format!("\r\n--{}--\r\n", BOUNDARY).as_bytes());

    Request::builder()
        .uri(uri)
        .method("PUT")
        .header(
            header::CONTENT_TYPE,
            format!("multipart/form-data; boundary={}", BOUNDARY),
        )
        .body(Body::from(body))
        .unwrap()
}

// ============================================================================
// Health
// ============================================================================

#[tokio::test]
async fn test_health_reports_database() {
    let source = ScriptedSource::silent();
    let (status, body) = send(&app(&source), get("/health")).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({"status": "healthy", "database": "connected"}));
    assert_eq!(source.releases(), 1);
}

#[tokio::test]
async fn test_health_unavailable_database() {
    let (status, _) = send(&app(&ScriptedSource::unavailable()), get("/health")).await;
    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
}

// ============================================================================
// Auth
// ============================================================================

fn credential_check(admin_id: Option<i32>) -> ScriptedSource {
    ScriptedSource::new(move |sql, _| {
        if sql.contains("sp_validate_admin_login(") {
            return Ok(vec![match admin_id {
                Some(id) => ScriptedSet::new(&["status", "admin_id"], vec![vec!["SUCCESS".into(), id.into()]]),
                None => ScriptedSet::status("ERROR", "Invalid credentials"),
            }]);
        }
        Ok(Vec::new())
    })
}

#[tokio::test]
async fn test_login_requires_second_factor() {
    let source = credential_check(Some(7));
    let mailer = Arc::new(MockMailer::new());
    let app = app_with_mailer(&source, mailer.clone());

    let (status, body) = send(
        &app,
        with_json("POST", "/api/v1/auth/login", json!({"email": "admin@example.org", "password": "secret"})),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], json!(true));
    assert_eq!(body["data"]["status"], json!("2FA_REQUIRED"));
    assert_eq!(body["data"]["admin_id"], json!(7));
    // the code only travels by mail
    assert!(!body.to_string().contains("123456"));
    assert!(mailer.sent()[0].body.contains("123456"));
}

#[tokio::test]
async fn test_login_bad_credentials() {
    let source = credential_check(None);
    let (status, body) = send(
        &app(&source),
        with_json("POST", "/api/v1/auth/login", json!({"email": "admin@example.org", "password": "nope"})),
    )
    .await;

    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["success"], json!(false));
    assert_eq!(body["error"]["code"], json!("UNAUTHORIZED"));
}

#[tokio::test]
async fn test_login_delivery_failure() {
    let source = credential_check(Some(7));
    let app = app_with_mailer(&source, Arc::new(MockMailer::failing()));

    let (status, body) = send(
        &app,
        with_json("POST", "/api/v1/auth/login", json!({"email": "admin@example.org", "password": "secret"})),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_GATEWAY);
    assert_eq!(body["error"]["code"], json!("DELIVERY_FAILED"));
    assert_eq!(source.calls_to("sp_save_admin_otp(").len(), 1);
}

#[tokio::test]
async fn test_verify_rejects_malformed_code_before_database() {
    let source = ScriptedSource::silent();
    let (status, body) = send(
        &app(&source),
        with_json("POST", "/api/v1/auth/login/verify-otp", json!({"admin_id": 7, "code": "12a"})),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"]["code"], json!("VALIDATION_ERROR"));
    assert!(source.calls().is_empty());
}

#[tokio::test]
async fn test_list_admins_without_rows_is_empty() {
    let source = ScriptedSource::silent();
    let (status, body) = send(&app(&source), get("/api/v1/auth/admins")).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"], json!([]));
    assert_eq!(source.calls()[0].params, vec![SqlValue::Bool(Some(true))]);
}

// ============================================================================
// Members
// ============================================================================

#[tokio::test]
async fn test_search_adds_hash() {
    let source = ScriptedSource::new(|_, _| {
        Ok(vec![ScriptedSet::new(
            &["id", "full_name"],
            vec![vec![1.into(), "Rosa Diaz".into()]],
        )])
    });

    let (status, body) = send(
        &app(&source),
        with_json("POST", "/api/v1/members/search", json!({"criteria": " Diaz "})),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["status"], json!("SUCCESS"));
    assert_eq!(
        body["data"]["results"][0]["hash"],
        json!("06d49632c9dc9bcb62aeaef99612ba6b")
    );
    let call = &source.calls()[0];
    assert_eq!(call.sql, "SELECT * FROM sp_search_member(p_criteria => $1)");
    assert_eq!(call.params, vec![SqlValue::from("Diaz")]);
}

#[tokio::test]
async fn test_search_without_matches() {
    let source = ScriptedSource::silent();
    let (status, body) = send(
        &app(&source),
        with_json("POST", "/api/v1/members/search", json!({"criteria": "nobody"})),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"], json!({"status": "NO_MATCHES", "results": []}));
}

#[tokio::test]
async fn test_search_by_hash_validation_and_not_found() {
    let source = ScriptedSource::silent();
    let app = app(&source);

    let (status, _) = send(
        &app,
        with_json("POST", "/api/v1/members/search-by-hash", json!({"hash": "XYZ"})),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(source.calls().is_empty());

    let (status, body) = send(
        &app,
        with_json(
            "POST",
            "/api/v1/members/search-by-hash",
            json!({"hash": "06d49632c9dc9bcb62aeaef99612ba6b"}),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"]["code"], json!("NOT_FOUND"));
}

#[tokio::test]
async fn test_list_members_with_filters_and_total() {
    let source = ScriptedSource::new(|sql, _| {
        if sql.contains("sp_count_members(") {
            return Ok(vec![ScriptedSet::new(&["total"], vec![vec![SqlValue::BigInt(Some(11))]])]);
        }
        Ok(vec![ScriptedSet::new(
            &["id", "full_name"],
            vec![vec![6.into(), "Amy Santiago".into()]],
        )])
    });

    let (status, body) = send(
        &app(&source),
        get("/api/v1/members?page=2&per_page=5&state=Active&search="),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["total"], json!(11));
    assert_eq!(body["data"]["data"][0]["full_name"], json!("Amy Santiago"));
    assert_eq!(body["meta"]["pages"], json!(3));

    let list = &source.calls_to("sp_list_members(")[0];
    assert_eq!(
        list.params,
        vec![
            SqlValue::Text(None),
            SqlValue::from("Active"),
            SqlValue::Text(None),
            SqlValue::Text(None),
            SqlValue::Int(Some(2)),
            SqlValue::Int(Some(5)),
        ]
    );
    assert_eq!(source.calls_to("sp_count_members(")[0].params.len(), 4);
}

#[tokio::test]
async fn test_list_members_rejects_large_pages() {
    let source = ScriptedSource::silent();
    let (status, _) = send(&app(&source), get("/api/v1/members?per_page=500")).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(source.calls().is_empty());
}

#[tokio::test]
async fn test_member_detail_sets() {
    let source = ScriptedSource::new(|_, _| {
        Ok(vec![
            ScriptedSet::new(
                &["id", "full_name", "profile_photo"],
                vec![vec![
                    42.into(),
                    "Rosa Diaz".into(),
                    SqlValue::from(vec![0x89u8, 0x50, 0x4E, 0x47]),
                ]],
            ),
            ScriptedSet::new(&["course"], vec![vec!["BLS".into()]]),
            ScriptedSet::new(&["event"], Vec::new()),
        ])
    });

    let (status, body) = send(&app(&source), get("/api/v1/members/42")).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["member"]["id"], json!(42));
    assert_eq!(
        body["data"]["member"]["profile_photo"],
        json!("data:image/png;base64,iVBORw==")
    );
    assert_eq!(body["data"]["courses"], json!([{"course": "BLS"}]));
    assert_eq!(body["data"]["events"], json!([]));
}

#[tokio::test]
async fn test_member_detail_not_found() {
    let (status, body) = send(&app(&ScriptedSource::silent()), get("/api/v1/members/42")).await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"]["message"], json!("Member 42 not found"));
}

#[tokio::test]
async fn test_create_member() {
    let source = ScriptedSource::new(|_, _| {
        Ok(vec![ScriptedSet::new(
            &["status", "message", "member_id", "file_number"],
            vec![vec!["SUCCESS".into(), "Member created".into(), 12.into(), "F-0012".into()]],
        )])
    });

    let (status, body) = send(
        &app(&source),
        with_json(
            "POST",
            "/api/v1/members",
            json!({"first_name": "Rosa", "last_name": "Diaz", "national_id": "40112233", "admin_id": 1}),
        ),
    )
    .await;

    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(
        body["data"],
        json!({"message": "Member created", "member_id": 12, "file_number": "F-0012"})
    );
    assert_eq!(source.calls()[0].params.len(), 15);
}

#[tokio::test]
async fn test_create_member_rejected_by_procedure() {
    let source = ScriptedSource::new(|_, _| {
        Ok(vec![ScriptedSet::status("ERROR", "National id already registered")])
    });

    let (status, body) = send(
        &app(&source),
        with_json(
            "POST",
            "/api/v1/members",
            json!({"first_name": "Rosa", "last_name": "Diaz", "national_id": "40112233", "admin_id": 1}),
        ),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"]["code"], json!("REJECTED"));
    assert_eq!(body["error"]["message"], json!("National id already registered"));
}

#[tokio::test]
async fn test_edit_member_requires_placement_fields() {
    let source = ScriptedSource::silent();
    let app = app(&source);

    let partial = json!({
        "first_name": "Rosa",
        "last_name": "Diaz",
        "national_id": "40112233",
        "admin_id": 1
    });
    let response = app
        .clone()
        .oneshot(with_json("PUT", "/api/v1/members/5", partial))
        .await
        .unwrap();
    assert!(response.status().is_client_error());
    assert!(source.calls().is_empty());

    let full = json!({
        "first_name": "Rosa",
        "last_name": "Diaz",
        "national_id": "40112233",
        "gender": "F",
        "rank": "Sergeant",
        "command_unit": "North",
        "state": "Suspended",
        "admin_id": 1
    });
    let (status, body) = send(&app, with_json("PUT", "/api/v1/members/5", full)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["member_id"], json!(5));

    let calls = source.calls_to("sp_edit_member");
    let params = &calls[0].params;
    assert_eq!(params.len(), 16);
    assert_eq!(params[0], SqlValue::Int(Some(5)));
    assert_eq!(params[12], SqlValue::from("Sergeant"));
    assert_eq!(params[14], SqlValue::from("Suspended"));
}

#[tokio::test]
async fn test_delete_member_requires_confirmation() {
    let source = ScriptedSource::silent();
    let app = app(&source);

    let (status, _) = send(&app, with_json("DELETE", "/api/v1/members/3", json!({"confirm": false}))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(source.calls().is_empty());

    let (status, _) = send(&app, with_json("DELETE", "/api/v1/members/3", json!({"confirm": true}))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        source.calls()[0].params,
        vec![SqlValue::Int(Some(3)), SqlValue::Int(Some(1))]
    );
}

#[tokio::test]
async fn test_photo_upload() {
    let source = ScriptedSource::silent();
    let png = [0x89u8, 0x50, 0x4E, 0x47, 0x0D, 0x0A, 0x1A, 0x0A];

    let (status, _) = send(
        &app(&source),
        multipart_photo("/api/v1/members/3/photo", "image/png", &png),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    let call = &source.calls_to("sp_update_member_photo(")[0];
    assert_eq!(
        call.params,
        vec![
            SqlValue::Int(Some(3)),
            SqlValue::from(png.to_vec()),
            SqlValue::Int(Some(1)),
        ]
    );
}

#[tokio::test]
async fn test_photo_upload_rejects_other_types() {
    let source = ScriptedSource::silent();

    let (status, body) = send(
        &app(&source),
        multipart_photo("/api/v1/members/3/photo?admin_id=4", "image/gif", b"GIF89a"),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"]["code"], json!("VALIDATION_ERROR"));
    assert!(source.calls().is_empty());
}

#[tokio::test]
async fn test_procedure_failure_is_not_leaked() {
    let source = ScriptedSource::new(|_, _| {
        Err(ProcedureError::execution("relation \"members\" does not exist"))
    });

    let (status, body) = send(&app(&source), get("/api/v1/members/export")).await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body["error"]["code"], json!("INTERNAL_ERROR"));
    assert!(!body.to_string().contains("relation"));
}

// ============================================================================
// Instructors
// ============================================================================

#[tokio::test]
async fn test_update_instructor_uses_named_parameters() {
    let source = ScriptedSource::silent();

    let (status, body) = send(
        &app(&source),
        with_json(
            "PUT",
            "/api/v1/instructors",
            json!({"instructor_id": 4, "full_name": "Ana Ruiz", "specialty": "Rescue", "admin_id": 1}),
        ),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"], json!({"status": "SUCCESS"}));
    let call = &source.calls()[0];
    assert!(call
        .sql
        .starts_with("SELECT * FROM sp_update_instructor(p_instructor_id => $1, p_full_name => $2"));
    assert_eq!(call.params.len(), 12);
}

#[tokio::test]
async fn test_list_instructors_counts_rows() {
    let source = ScriptedSource::new(|_, _| {
        Ok(vec![ScriptedSet::new(
            &["id", "full_name"],
            vec![vec![1.into(), "Ana Ruiz".into()], vec![2.into(), "Leo Paz".into()]],
        )])
    });

    let (status, body) = send(&app(&source), get("/api/v1/instructors?specialty=Rescue")).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["total"], json!(2));
    assert_eq!(
        source.calls()[0].params,
        vec![SqlValue::Text(None), SqlValue::from("Rescue"), SqlValue::Text(None)]
    );
}

#[tokio::test]
async fn test_instructor_detail_not_found() {
    let (status, body) = send(&app(&ScriptedSource::silent()), get("/api/v1/instructors/5")).await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"]["message"], json!("Instructor 5 not found"));
}
