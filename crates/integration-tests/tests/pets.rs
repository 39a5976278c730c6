//! Pet endpoints end to end.

use axum::body::Body;
use axum::http::{Method, Request, StatusCode, header};
use petstore_core::PetId;
use petstore_integration_tests::{TestApp, rex};
use petstore_server::db::PetRow;
use serde_json::{Value, json};

#[tokio::test]
async fn test_create_then_fetch_round_trips_the_payload() {
    let app = TestApp::new();
    let token = app.login_as("alice", "secret123").await;

    let created = app.json(Method::POST, "/pet", Some(&rex()), Some(&token)).await;
    assert_eq!(created.status, StatusCode::CREATED);
    assert_eq!(created.body, rex());

    let fetched = app.json(Method::GET, "/pet/1", None, Some(&token)).await;
    assert_eq!(fetched.status, StatusCode::OK);
    assert_eq!(fetched.body, rex());
}

#[tokio::test]
async fn test_invalid_pets_are_rejected_with_400() {
    let app = TestApp::new();
    let token = app.login_as("alice", "secret123").await;

    let mut unnamed = rex();
    unnamed["name"] = json!("");
    let mut zero_id = rex();
    zero_id["id"] = json!(0);
    let mut bad_status = rex();
    bad_status["status"] = json!("Available");

    for body in [unnamed, zero_id, bad_status] {
        let response = app.json(Method::POST, "/pet", Some(&body), Some(&token)).await;
        assert_eq!(response.status, StatusCode::BAD_REQUEST, "{body}");
        assert_eq!(response.body["code"], 400);
        assert_eq!(response.body["type"], "error");
    }

    let missing = app.json(Method::GET, "/pet/1", None, Some(&token)).await;
    assert_eq!(missing.status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_malformed_json_is_400() {
    let app = TestApp::new();
    let token = app.login_as("alice", "secret123").await;

    let response = app
        .send(
            Request::post("/pet")
                .header(header::AUTHORIZATION, format!("Bearer {token}"))
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from("{\"name\": "))
                .unwrap(),
        )
        .await;
    assert_eq!(response.status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_update_requires_existing_pet() {
    let app = TestApp::new();
    let token = app.login_as("alice", "secret123").await;

    let response = app.json(Method::PUT, "/pet", Some(&rex()), Some(&token)).await;
    assert_eq!(response.status, StatusCode::NOT_FOUND);

    app.json(Method::POST, "/pet", Some(&rex()), Some(&token)).await;
    let mut renamed = rex();
    renamed["name"] = json!("Max");
    let response = app.json(Method::PUT, "/pet", Some(&renamed), Some(&token)).await;
    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.body["name"], "Max");
}

#[tokio::test]
async fn test_form_update() {
    let app = TestApp::new();
    let token = app.login_as("alice", "secret123").await;
    app.json(Method::POST, "/pet", Some(&rex()), Some(&token)).await;

    let form = |body: &'static str| {
        Request::post("/pet/1")
            .header(header::AUTHORIZATION, format!("Bearer {token}"))
            .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
            .body(Body::from(body))
            .unwrap()
    };

    let response = app.send(form("name=Max&status=sold")).await;
    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.body["name"], "Max");
    assert_eq!(response.body["status"], "sold");
    assert_eq!(response.body["tags"], rex()["tags"]);

    let response = app.send(form("name=Max&status=lost")).await;
    assert_eq!(response.status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_find_by_status() {
    let app = TestApp::new();
    let token = app.login_as("alice", "secret123").await;
    app.json(Method::POST, "/pet", Some(&rex()), Some(&token)).await;

    let found = app
        .json(Method::GET, "/pet/findByStatus?status=available,sold", None, Some(&token))
        .await;
    assert_eq!(found.status, StatusCode::OK);
    assert_eq!(found.body.as_array().map(Vec::len), Some(1));

    let none = app
        .json(Method::GET, "/pet/findByStatus?status=pending", None, Some(&token))
        .await;
    assert_eq!(none.status, StatusCode::NOT_FOUND);

    let invalid = app
        .json(Method::GET, "/pet/findByStatus?status=lost", None, Some(&token))
        .await;
    assert_eq!(invalid.status, StatusCode::BAD_REQUEST);

    let missing = app
        .json(Method::GET, "/pet/findByStatus", None, Some(&token))
        .await;
    assert_eq!(missing.status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_find_by_tags() {
    let app = TestApp::new();
    let token = app.login_as("alice", "secret123").await;

    let mut tagged = rex();
    tagged["tags"] = json!([{ "id": 1, "name": "tag1" }, { "id": 2, "name": "tag2" }]);
    app.json(Method::POST, "/pet", Some(&tagged), Some(&token)).await;
    app.json(Method::POST, "/pet", Some(&rex()), Some(&token)).await;

    let found = app
        .json(Method::GET, "/pet/findByTags?tags=tag1", None, Some(&token))
        .await;
    assert_eq!(found.status, StatusCode::OK);
    let pets = found.body.as_array().cloned().unwrap_or_default();
    assert_eq!(pets.len(), 1);
    assert_eq!(pets[0]["id"], 1);

    let none = app
        .json(Method::GET, "/pet/findByTags?tags=tag9", None, Some(&token))
        .await;
    assert_eq!(none.status, StatusCode::NOT_FOUND);

    let empty_token = app
        .json(Method::GET, "/pet/findByTags?tags=tag1,", None, Some(&token))
        .await;
    assert_eq!(empty_token.status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_delete_pet() {
    let app = TestApp::new();
    let token = app.login_as("alice", "secret123").await;
    app.json(Method::POST, "/pet", Some(&rex()), Some(&token)).await;

    let deleted = app.json(Method::DELETE, "/pet/1", None, Some(&token)).await;
    assert_eq!(deleted.status, StatusCode::NO_CONTENT);

    let again = app.json(Method::DELETE, "/pet/1", None, Some(&token)).await;
    assert_eq!(again.status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_non_numeric_id_is_400() {
    let app = TestApp::new();
    let token = app.login_as("alice", "secret123").await;

    let response = app.json(Method::GET, "/pet/rex", None, Some(&token)).await;
    assert_eq!(response.status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_corrupt_stored_pet_is_500_without_details() {
    let app = TestApp::new();
    let token = app.login_as("alice", "secret123").await;
    app.store.pets.insert_row(PetRow {
        id: PetId::new(7),
        name: "Rex".to_owned(),
        status: "available".to_owned(),
        category: "{\"id\":1,\"name\":\"Dog\"}".to_owned(),
        photo_urls: "[]".to_owned(),
        tags: "[{broken".to_owned(),
    });

    let response = app.json(Method::GET, "/pet/7", None, Some(&token)).await;
    assert_eq!(response.status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(response.body["message"], "Internal server error");
}

fn multipart(token: &str, parts: &[(&str, &str)]) -> Request<Body> {
    const BOUNDARY: &str = "petstore-boundary";
    let mut body = String::new();
    for (name, value) in parts {
        let filename = if *name == "file" {
            "; filename=\"rex.png\""
        } else {
            ""
        };
        body.push_str(&format!(
            "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"{name}\"{filename}\r\n\r\n{value}\r\n"
        ));
    }
    body.push_str(&format!("--{BOUNDARY}--\r\n"));

    Request::post("/pet/1/uploadImage")
        .header(header::AUTHORIZATION, format!("Bearer {token}"))
        .header(
            header::CONTENT_TYPE,
            format!("multipart/form-data; boundary={BOUNDARY}"),
        )
        .body(Body::from(body))
        .unwrap()
}

#[tokio::test]
async fn test_upload_image_stub() {
    let app = TestApp::new();
    let token = app.login_as("alice", "secret123").await;

    let response = app
        .send(multipart(
            &token,
            &[("additionalMetadata", "front view"), ("file", "PNGDATA")],
        ))
        .await;
    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(
        response.body["message"],
        Value::from("Image uploaded for pet ID 1 (stub)")
    );

    let response = app
        .send(multipart(&token, &[("additionalMetadata", "no file")]))
        .await;
    assert_eq!(response.status, StatusCode::BAD_REQUEST);
    assert_eq!(response.body["message"], "file is required");
}
