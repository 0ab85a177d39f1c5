//! Integration tests for the pets REST API.
//!
//! Drives the router through tower::ServiceExt (no TCP listener needed)
//! on the in-memory backend unless a test says otherwise.

use axum::body::Body;
use axum::http::{header, Method, Request, StatusCode};
use axum::Router;
use http_body_util::BodyExt;
use serde_json::{json, Value};
use tower::ServiceExt;

use kennel_adapter::controller::{router, AppState};
use kennel_adapter::repository::open_pet_service;
use shared::StorageConfig;

const PUBLIC_URL: &str = "http://testserver";

fn app_with(storage: StorageConfig, page_size: usize) -> Router {
    let service = open_pet_service(&storage, page_size).unwrap();
    router(AppState::new(service, PUBLIC_URL).unwrap())
}

fn app() -> Router {
    app_with(StorageConfig::Memory, 10)
}

async fn send(app: &Router, method: Method, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
    let mut builder = Request::builder().method(method).uri(uri);
    let body = match body {
        Some(json) => {
            builder = builder.header(header::CONTENT_TYPE, "application/json");
            Body::from(json.to_string())
        }
        None => Body::empty(),
    };
    send_request(app, builder.body(body).unwrap()).await
}

async fn send_request(app: &Router, request: Request<Body>) -> (StatusCode, Value) {
    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let value = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, value)
}

fn pet(name: &str, group: &str, traits: &[&str]) -> Value {
    json!({
        "name": name,
        "age": 3,
        "weight": 12.5,
        "sex": "Male",
        "group": { "scientific_name": group },
        "traits": traits.iter().map(|t| json!({ "name": t })).collect::<Vec<_>>(),
    })
}

async fn create(app: &Router, body: Value) -> Value {
    let (status, value) = send(app, Method::POST, "/pets", Some(body)).await;
    assert_eq!(status, StatusCode::CREATED, "{value}");
    value
}

fn names(list: &Value) -> Vec<&str> {
    list["results"]
        .as_array()
        .unwrap()
        .iter()
        .map(|p| p["name"].as_str().unwrap())
        .collect()
}

// ---------------------------------------------------------------------------
// Health
// ---------------------------------------------------------------------------

#[tokio::test]
async fn test_health() {
    let (status, body) = send(&app(), Method::GET, "/health", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({ "status": "ok" }));
}

// ---------------------------------------------------------------------------
// Create
// ---------------------------------------------------------------------------

#[tokio::test]
async fn test_create_returns_resolved_associations() {
    let app = app();
    let body = create(&app, pet("Rex", "Canis lupus", &["Loyal", "Calm"])).await;

    assert_eq!(
        body,
        json!({
            "id": 1,
            "name": "Rex",
            "age": 3,
            "weight": 12.5,
            "sex": "Male",
            "group": { "id": 1, "scientific_name": "Canis lupus" },
            "traits": [ { "id": 1, "name": "Loyal" }, { "id": 2, "name": "Calm" } ],
        })
    );
}

#[tokio::test]
async fn test_create_reuses_group_across_case() {
    let app = app();
    let rex = create(&app, pet("Rex", "Canis lupus", &["Loyal"])).await;
    let fido = create(&app, pet("Fido", "CANIS LUPUS", &["loyal"])).await;

    assert_eq!(fido["group"], rex["group"]);
    assert_eq!(fido["group"]["scientific_name"], "Canis lupus");
    assert_eq!(fido["traits"], json!([{ "id": 1, "name": "Loyal" }]));
}

#[tokio::test]
async fn test_create_collapses_duplicate_traits() {
    let app = app();
    let body = create(&app, pet("Rex", "Canis lupus", &["Calm", "CALM", "calm"])).await;
    assert_eq!(body["traits"], json!([{ "id": 1, "name": "Calm" }]));
}

#[tokio::test]
async fn test_create_defaults_sex() {
    let app = app();
    let mut body = pet("Tom", "Felis catus", &[]);
    body.as_object_mut().unwrap().remove("sex");

    let created = create(&app, body).await;
    assert_eq!(created["sex"], "Not Informed");
    assert_eq!(created["traits"], json!([]));
}

#[tokio::test]
async fn test_create_validation_errors() {
    let app = app();
    let body = json!({
        "name": "",
        "age": -1,
        "weight": "heavy",
        "sex": "Unknown",
        "group": { "scientific_name": "x".repeat(51) },
        "traits": [ { "name": "Calm" }, { "name": "" } ],
    });

    let (status, errors) = send(&app, Method::POST, "/pets", Some(body)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(errors["name"], json!(["This field may not be blank."]));
    assert_eq!(
        errors["age"],
        json!(["Ensure this value is greater than or equal to 0."])
    );
    assert_eq!(errors["weight"], json!(["A valid number is required."]));
    assert_eq!(errors["sex"], json!(["\"Unknown\" is not a valid choice."]));
    assert_eq!(
        errors["group"]["scientific_name"],
        json!(["Ensure this field has no more than 50 characters."])
    );
    assert_eq!(
        errors["traits"],
        json!([{}, { "name": ["This field may not be blank."] }])
    );

    let (_, list) = send(&app, Method::GET, "/pets", None).await;
    assert_eq!(list["count"], 0);
}

#[tokio::test]
async fn test_create_missing_fields() {
    let (status, errors) = send(&app(), Method::POST, "/pets", Some(json!({}))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    for field in ["name", "age", "weight", "group", "traits"] {
        assert_eq!(errors[field], json!(["This field is required."]), "{field}");
    }
    assert!(errors.get("sex").is_none());
}

#[tokio::test]
async fn test_create_rejects_non_object_body() {
    let (status, errors) = send(&app(), Method::POST, "/pets", Some(json!([1, 2]))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(errors["non_field_errors"][0]
        .as_str()
        .unwrap()
        .starts_with("Invalid data. Expected a dictionary"));
}

#[tokio::test]
async fn test_create_malformed_json() {
    let app = app();
    let request = Request::builder()
        .method(Method::POST)
        .uri("/pets")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from("{\"name\": "))
        .unwrap();

    let response = app.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let body: Value = serde_json::from_slice(&bytes).unwrap();
    assert!(body["detail"].as_str().unwrap().starts_with("JSON parse error"));
}

#[tokio::test]
async fn test_create_without_content_type() {
    let request = Request::builder()
        .method(Method::POST)
        .uri("/pets")
        .body(Body::from(pet("Rex", "Canis lupus", &[]).to_string()))
        .unwrap();

    let (status, body) = send_request(&app(), request).await;
    assert_eq!(status, StatusCode::UNSUPPORTED_MEDIA_TYPE);
    assert!(body["detail"]
        .as_str()
        .unwrap()
        .starts_with("Unsupported media type"));
}

// ---------------------------------------------------------------------------
// Retrieve / delete
// ---------------------------------------------------------------------------

#[tokio::test]
async fn test_get_unknown_and_non_numeric_ids() {
    let app = app();
    let (status, body) = send(&app, Method::GET, "/pets/99", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body, json!({ "detail": "Not found." }));

    let (status, _) = send(&app, Method::GET, "/pets/rex", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_delete_then_get() {
    let app = app();
    let created = create(&app, pet("Rex", "Canis lupus", &["Loyal"])).await;
    let uri = format!("/pets/{}", created["id"]);

    let (status, body) = send(&app, Method::DELETE, &uri, None).await;
    assert_eq!(status, StatusCode::NO_CONTENT);
    assert_eq!(body, Value::Null);

    let (status, _) = send(&app, Method::GET, &uri, None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _) = send(&app, Method::DELETE, &uri, None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    // the shared group outlives the pet
    let again = create(&app, pet("Fido", "canis lupus", &[])).await;
    assert_eq!(again["group"], created["group"]);
    assert_eq!(again["id"], 2);
}

// ---------------------------------------------------------------------------
// Partial update
// ---------------------------------------------------------------------------

#[tokio::test]
async fn test_patch_scalar_keeps_associations() {
    let app = app();
    let created = create(&app, pet("Rex", "Canis lupus", &["Loyal"])).await;

    let (status, body) = send(&app, Method::PATCH, "/pets/1", Some(json!({ "age": 4 }))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["age"], 4);
    assert_eq!(body["name"], "Rex");
    assert_eq!(body["group"], created["group"]);
    assert_eq!(body["traits"], created["traits"]);
}

#[tokio::test]
async fn test_patch_replaces_traits() {
    let app = app();
    create(&app, pet("Rex", "Canis lupus", &["Loyal", "Calm"])).await;

    let patch = json!({ "traits": [ { "name": "calm" }, { "name": "Playful" } ] });
    let (status, body) = send(&app, Method::PATCH, "/pets/1", Some(patch)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        body["traits"],
        json!([{ "id": 2, "name": "Calm" }, { "id": 3, "name": "Playful" }])
    );

    let (_, fetched) = send(&app, Method::GET, "/pets/1", None).await;
    assert_eq!(fetched["traits"], body["traits"]);
}

#[tokio::test]
async fn test_patch_empty_traits_clears() {
    let app = app();
    create(&app, pet("Rex", "Canis lupus", &["Loyal"])).await;

    let (status, body) =
        send(&app, Method::PATCH, "/pets/1", Some(json!({ "traits": [] }))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["traits"], json!([]));
}

#[tokio::test]
async fn test_patch_moves_group() {
    let app = app();
    create(&app, pet("Rex", "Canis lupus", &[])).await;

    let patch = json!({ "group": { "scientific_name": "Canis familiaris" } });
    let (_, body) = send(&app, Method::PATCH, "/pets/1", Some(patch)).await;
    assert_eq!(
        body["group"],
        json!({ "id": 2, "scientific_name": "Canis familiaris" })
    );
}

#[tokio::test]
async fn test_patch_empty_body_is_noop() {
    let app = app();
    let created = create(&app, pet("Rex", "Canis lupus", &["Loyal"])).await;

    let (status, body) = send(&app, Method::PATCH, "/pets/1", Some(json!({}))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, created);
}

#[tokio::test]
async fn test_patch_errors() {
    let app = app();
    let (status, _) = send(&app, Method::PATCH, "/pets/7", Some(json!({ "age": 1 }))).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    create(&app, pet("Rex", "Canis lupus", &[])).await;
    let (status, errors) =
        send(&app, Method::PATCH, "/pets/1", Some(json!({ "name": null }))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(errors["name"], json!(["This field may not be null."]));
}

#[tokio::test]
async fn test_patch_missing_pet_ignores_body() {
    let app = app();
    let (status, body) =
        send(&app, Method::PATCH, "/pets/999", Some(json!({ "age": -5 }))).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body, json!({ "detail": "Not found." }));

    let request = Request::builder()
        .method(Method::PATCH)
        .uri("/pets/999")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from("{\"age\": "))
        .unwrap();
    let (status, _) = send_request(&app, request).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

// ---------------------------------------------------------------------------
// List / filter / pagination
// ---------------------------------------------------------------------------

#[tokio::test]
async fn test_list_filter_is_case_sensitive() {
    let app = app();
    create(&app, pet("Rex", "Canis lupus", &["Friendly"])).await;
    create(&app, pet("Tom", "Felis catus", &["Calm"])).await;

    let (_, list) = send(&app, Method::GET, "/pets?trait=Friendly", None).await;
    assert_eq!(names(&list), vec!["Rex"]);

    let (status, list) = send(&app, Method::GET, "/pets?trait=friendly", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(list["count"], 0);

    let (_, list) = send(&app, Method::GET, "/pets?trait=Unknown", None).await;
    assert_eq!(
        list,
        json!({ "count": 0, "next": null, "previous": null, "results": [] })
    );
}

#[tokio::test]
async fn test_pagination_links() {
    let app = app_with(StorageConfig::Memory, 2);
    for name in ["A", "B", "C", "D", "E"] {
        create(&app, pet(name, "Canis lupus", &["Good boy"])).await;
    }

    let (_, first) = send(&app, Method::GET, "/pets?trait=Good%20boy", None).await;
    assert_eq!(first["count"], 5);
    assert_eq!(names(&first), vec!["A", "B"]);
    assert_eq!(first["previous"], Value::Null);
    assert_eq!(first["next"], "http://testserver/pets?page=2&trait=Good+boy");

    let (_, second) = send(&app, Method::GET, "/pets?page=2&trait=Good%20boy", None).await;
    assert_eq!(names(&second), vec!["C", "D"]);
    assert_eq!(second["previous"], "http://testserver/pets?trait=Good+boy");

    let (_, last) = send(&app, Method::GET, "/pets?page=last", None).await;
    assert_eq!(names(&last), vec!["E"]);
    assert_eq!(last["next"], Value::Null);
    assert_eq!(last["previous"], "http://testserver/pets?page=2");
}

#[tokio::test]
async fn test_invalid_page() {
    let app = app();
    let (status, _) = send(&app, Method::GET, "/pets?page=1", None).await;
    assert_eq!(status, StatusCode::OK);

    for page in ["0", "2", "abc"] {
        let (status, body) = send(&app, Method::GET, &format!("/pets?page={page}"), None).await;
        assert_eq!(status, StatusCode::NOT_FOUND, "page={page}");
        assert_eq!(body, json!({ "detail": "Invalid page." }));
    }
}

#[tokio::test]
async fn test_empty_trait_param_is_no_filter() {
    let app = app_with(StorageConfig::Memory, 1);
    create(&app, pet("Rex", "Canis lupus", &["Friendly"])).await;
    create(&app, pet("Tom", "Felis catus", &[])).await;

    let (status, list) = send(&app, Method::GET, "/pets?trait=", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(list["count"], 2);
    assert_eq!(names(&list), vec!["Rex"]);
    assert_eq!(list["next"], "http://testserver/pets?page=2");
}

#[tokio::test]
async fn test_repeated_query_param() {
    let (status, body) = send(&app(), Method::GET, "/pets?page=1&page=2", None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["detail"].as_str().is_some());
}

// ---------------------------------------------------------------------------
// SQLite backend
// ---------------------------------------------------------------------------

#[tokio::test]
async fn test_sqlite_round_trip() {
    let dir = tempfile::tempdir().unwrap();
    let storage = StorageConfig::Sqlite {
        path: dir.path().join("kennel.db"),
    };

    let app = app_with(storage.clone(), 10);
    create(&app, pet("Rex", "Canis lupus", &["Loyal"])).await;
    create(&app, pet("Fido", "CANIS LUPUS", &["LOYAL", "Calm"])).await;
    drop(app);

    let reopened = app_with(storage, 10);
    let (_, list) = send(&reopened, Method::GET, "/pets?trait=Loyal", None).await;
    assert_eq!(names(&list), vec!["Rex", "Fido"]);
    assert_eq!(list["results"][1]["group"]["id"], 1);

    let (status, _) = send(&reopened, Method::DELETE, "/pets/1", None).await;
    assert_eq!(status, StatusCode::NO_CONTENT);
    let (_, list) = send(&reopened, Method::GET, "/pets", None).await;
    assert_eq!(list["count"], 1);
}
