#[path = "../common/mod.rs"]
mod common;

use axum::body::Body;
use axum::http::{Request, StatusCode, header};
use common::*;
use serde_json::json;
use tower::ServiceExt;

#[tokio::test]
async fn test_admin_routes_require_cookie() {
    let state = create_test_app_state();

    for (method, uri) in [
        ("GET", "/api/admin/products"),
        ("POST", "/api/admin/categories"),
        ("GET", "/api/admin/deals"),
        ("GET", "/api/admin/orders"),
        ("DELETE", "/api/admin/products/pw_prod_00000000000000000000000000000000"),
    ] {
        let response = app(&state)
            .oneshot(
                Request::builder()
                    .method(method)
                    .uri(uri)
                    .header("content-type", "application/json")
                    .body(Body::from("{}"))
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED, "{} {}", method, uri);
        let body = body_text(response).await;
        assert!(!body.contains(ADMIN_TOKEN), "token must not leak");
        assert_eq!(body, r#"{"error":"Unauthorized"}"#);
    }

    assert!(state.backend().repo::<Category>().list().unwrap().is_empty());
}

#[tokio::test]
async fn test_wrong_cookie_is_rejected() {
    let state = create_test_app_state();
    let response = app(&state)
        .oneshot(
            Request::builder()
                .uri("/api/admin/products")
                .header("cookie", "admin_token=guess")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_unconfigured_token_disables_admin() {
    let mut state = create_test_app_state();
    state.admin_token = None;

    let response = app(&state)
        .oneshot(
            Request::builder()
                .uri("/api/admin/products")
                .header("cookie", "admin_token=")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    let response = app(&state)
        .oneshot(json_request("POST", "/api/admin/login", &json!({ "token": "" })))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_login_sets_http_only_cookie() {
    let state = create_test_app_state();

    let response = app(&state)
        .oneshot(json_request("POST", "/api/admin/login", &json!({ "token": ADMIN_TOKEN })))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let cookie = response
        .headers()
        .get(header::SET_COOKIE)
        .expect("login should set a cookie")
        .to_str()
        .unwrap()
        .to_string();
    assert!(cookie.starts_with(&format!("admin_token={}", ADMIN_TOKEN)));
    assert!(cookie.contains("HttpOnly"));
    assert!(cookie.contains("Path=/"));
    assert!(cookie.contains("Max-Age=604800"));

    assert_eq!(body_json(response).await, json!({ "ok": true }));
}

#[tokio::test]
async fn test_login_cookie_keeps_whole_token() {
    let token = "tok;Path=/evil";
    let state = AppState {
        admin_token: Some(token.to_string()),
        ..create_test_app_state()
    };

    let response = app(&state)
        .oneshot(json_request("POST", "/api/admin/login", &json!({ "token": token })))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let cookie = response
        .headers()
        .get(header::SET_COOKIE)
        .expect("login should set a cookie")
        .to_str()
        .unwrap()
        .to_string();
    assert!(cookie.starts_with(&format!("admin_token={};", token)));
    assert!(cookie.contains("HttpOnly"));
    assert!(cookie.contains("Max-Age=604800"));
}

#[tokio::test]
async fn test_login_with_wrong_token() {
    let state = create_test_app_state();

    let response = app(&state)
        .oneshot(json_request("POST", "/api/admin/login", &json!({ "token": "nope" })))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    assert!(response.headers().get(header::SET_COOKIE).is_none());
    assert_eq!(
        body_json(response).await,
        json!({ "ok": false, "error": "Invalid token" })
    );
}

#[tokio::test]
async fn test_product_crud() {
    for state in [create_test_app_state(), create_memory_app_state()] {
        let response = app(&state)
            .oneshot(admin_request(
                "POST",
                "/api/admin/products",
                Some(&json!({ "name": "Steam Iron", "price": 49.99, "categorySlug": "household-appliances" })),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::CREATED);
        let created = body_json(response).await;
        let id = created["_id"].as_str().unwrap().to_string();
        assert_eq!(created["price"], 49.99);
        assert_eq!(created["featured"], false);

        let response = app(&state)
            .oneshot(admin_request(
                "PATCH",
                &format!("/api/admin/products/{}", id),
                Some(&json!({ "featured": true, "description": "2000W" })),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let updated = body_json(response).await;
        assert_eq!(updated["featured"], true);
        assert_eq!(updated["name"], "Steam Iron");
        assert_eq!(updated["description"], "2000W");
        assert_eq!(updated["createdAt"], created["createdAt"]);

        let response = app(&state)
            .oneshot(admin_request("GET", "/api/admin/products", None))
            .await
            .unwrap();
        let listed = body_json(response).await;
        assert_eq!(listed.as_array().unwrap().len(), 1);
        assert_eq!(listed[0]["featured"], true);

        let response = app(&state)
            .oneshot(admin_request("DELETE", &format!("/api/admin/products/{}", id), None))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(body_json(response).await, json!({ "ok": true }));

        let response = app(&state)
            .oneshot(admin_request("DELETE", &format!("/api/admin/products/{}", id), None))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }
}

#[tokio::test]
async fn test_create_with_empty_body_uses_defaults() {
    let state = create_test_app_state();

    let response = app(&state)
        .oneshot(admin_request("POST", "/api/admin/categories", Some(&json!({}))))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);
    let body = body_json(response).await;
    assert_eq!(body["label"], "Untitled");
    assert!(body["slug"].as_str().unwrap().starts_with("cat-"));

    let response = app(&state)
        .oneshot(admin_request("POST", "/api/admin/deals", Some(&json!({ "_id": "mine" }))))
        .await
        .unwrap();
    let body = body_json(response).await;
    assert_eq!(body["title"], "New Deal");
    assert_ne!(body["_id"], "mine");
}

#[tokio::test]
async fn test_patch_unknown_record_is_not_found() {
    let state = create_test_app_state();
    let missing = pricewar::id::EntityType::Deal.gen_id();

    for uri in [
        format!("/api/admin/deals/{}", missing),
        "/api/admin/deals/garbage".to_string(),
    ] {
        let response = app(&state)
            .oneshot(admin_request("PATCH", &uri, Some(&json!({ "title": "x" }))))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND, "{}", uri);
        assert_eq!(
            body_json(response).await["details"],
            pricewar::error::msg::DEAL_NOT_FOUND
        );
    }
}

#[tokio::test]
async fn test_patch_with_invalid_field_is_bad_request() {
    let state = create_test_app_state();
    let category = state
        .backend()
        .repo::<Category>()
        .create(CreateCategory::labelled("Utensils"))
        .unwrap();

    let response = app(&state)
        .oneshot(admin_request(
            "PATCH",
            &format!("/api/admin/categories/{}", category.id),
            Some(&json!({ "label": "" })),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let stored = state.backend().repo::<Category>().get(&category.id).unwrap().unwrap();
    assert_eq!(stored.label, "Utensils");
}

#[tokio::test]
async fn test_list_orders_newest_first() {
    let state = create_memory_app_state();
    let backend = state.backend();
    create_pending_order(&backend, "cs_first");
    create_pending_order(&backend, "cs_second");

    let response = app(&state)
        .oneshot(admin_request("GET", "/api/admin/orders", None))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body[0]["externalSessionId"], "cs_second");
    assert_eq!(body[1]["externalSessionId"], "cs_first");
    assert_eq!(body[0]["status"], "pending");
    assert_eq!(body[0]["amountTotal"], 3998);
    assert_eq!(body[0]["items"][0]["productId"], "pw_prod_test");
}
