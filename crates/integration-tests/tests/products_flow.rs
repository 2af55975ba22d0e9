//! Product and admin user collections over HTTP.
//!
//! Run with: cargo test -p shopper-integration-tests

use axum::http::{Method, StatusCode};
use secrecy::SecretString;
use serde_json::{Value, json};
use shopper_core::{Attributes, Credentials, Email, ProductId, UserId};
use shopper_integration_tests::{MockBackend, TestClient};

async fn backend() -> MockBackend {
    MockBackend::spawn().await.expect("Failed to start mock backend")
}

fn attributes(value: Value) -> Attributes {
    serde_json::from_value(value).expect("JSON object")
}

fn local_product_ids(client: &TestClient) -> Vec<i32> {
    client
        .ctx
        .store()
        .read(|s| s.products.iter().map(|p| p.id.as_i32()).collect())
}

async fn sign_in(client: &TestClient, email: &str, password: &str) {
    let credentials = Credentials::new(
        Email::parse(email).expect("valid email"),
        SecretString::from(password.to_string()),
    );
    client.ctx.auth().login(&credentials).await;
}

#[tokio::test]
async fn test_fetch_all_mirrors_backend() {
    let backend = backend().await;
    let a = backend.seed_product(&json!({ "title": "Papaya" }));
    let b = backend.seed_product(&json!({ "title": "Mango" }));
    let client = backend.client().expect("Failed to build client");

    client.ctx.products().fetch_all().await;

    assert_eq!(local_product_ids(&client), vec![a, b]);
    let state = client.ctx.store().snapshot();
    assert_eq!(state.products[1].attributes.get("title"), Some(&json!("Mango")));
}

#[tokio::test]
async fn test_create_prepends_server_representation() {
    let backend = backend().await;
    let existing = backend.seed_product(&json!({ "title": "Papaya" }));
    let client = backend.client().expect("Failed to build client");
    client.ctx.products().fetch_all().await;

    client
        .ctx
        .products()
        .create(&attributes(json!({ "title": "Mango" })))
        .await;

    let state = client.ctx.store().snapshot();
    let created = state.products[0].id.as_i32();
    assert_ne!(created, existing);
    assert_eq!(local_product_ids(&client), vec![created, existing]);
    assert_eq!(state.products[0].attributes.get("price"), Some(&json!("0.00")));
    assert!(backend.product_ids().contains(&created));
}

#[tokio::test]
async fn test_update_applies_merged_record() {
    let backend = backend().await;
    let id = backend.seed_product(&json!({ "title": "Papaya", "price": "2.00" }));
    let client = backend.client().expect("Failed to build client");
    client.ctx.products().fetch_all().await;

    client
        .ctx
        .products()
        .update(ProductId::new(id), &attributes(json!({ "price": "3.50" })))
        .await;

    let product = client.ctx.store().snapshot().products[0].clone();
    assert_eq!(product.attributes.get("title"), Some(&json!("Papaya")));
    assert_eq!(product.attributes.get("price"), Some(&json!("3.50")));
    assert!(client.errors.is_empty());
}

#[tokio::test]
async fn test_update_of_missing_product_is_reported() {
    let backend = backend().await;
    let client = backend.client().expect("Failed to build client");

    client
        .ctx
        .products()
        .update(ProductId::new(9), &Attributes::new())
        .await;

    assert_eq!(client.errors.messages(), vec!["Not Found"]);
    assert!(local_product_ids(&client).is_empty());
}

#[tokio::test]
async fn test_rejected_remove_is_not_rolled_back_until_refetch() {
    let backend = backend().await;
    let id = backend.seed_product(&json!({ "title": "Papaya" }));
    let client = backend.client().expect("Failed to build client");
    client.ctx.products().fetch_all().await;

    let path = format!("/api/products/{id}");
    backend.fail_next(Method::DELETE, &path, StatusCode::FORBIDDEN);
    client.ctx.products().remove(ProductId::new(id)).await;

    assert!(local_product_ids(&client).is_empty());
    assert_eq!(backend.product_ids(), vec![id]);
    assert_eq!(client.errors.messages(), vec!["Forbidden"]);

    client.ctx.products().fetch_all().await;
    assert_eq!(local_product_ids(&client), vec![id]);
}

#[tokio::test]
async fn test_remove_deletes_on_backend() {
    let backend = backend().await;
    let keep = backend.seed_product(&json!({ "title": "Papaya" }));
    let gone = backend.seed_product(&json!({ "title": "Mango" }));
    let client = backend.client().expect("Failed to build client");
    client.ctx.products().fetch_all().await;

    client.ctx.products().remove(ProductId::new(gone)).await;

    assert_eq!(local_product_ids(&client), vec![keep]);
    assert_eq!(backend.product_ids(), vec![keep]);
    assert!(client.errors.is_empty());
}

#[tokio::test]
async fn test_admin_users_require_admin() {
    let backend = backend().await;
    backend.seed_account("shopper@b.com", "x", false);
    let client = backend.client().expect("Failed to build client");
    sign_in(&client, "shopper@b.com", "x").await;

    client.ctx.users().fetch_all().await;

    assert!(client.ctx.store().snapshot().users.is_empty());
    assert_eq!(client.errors.messages(), vec!["Unauthorized"]);
}

#[tokio::test]
async fn test_admin_manages_users() {
    let backend = backend().await;
    let admin = backend.seed_account("admin@b.com", "x", true);
    let other = backend.seed_account("c@d.com", "y", false);
    let removed = backend.seed_account("e@f.com", "z", false);
    let client = backend.client().expect("Failed to build client");
    sign_in(&client, "admin@b.com", "x").await;

    let users = client.ctx.users();
    users.fetch_all().await;
    users
        .update(UserId::new(other), &attributes(json!({ "isAdmin": true })))
        .await;
    users.remove(UserId::new(removed)).await;

    let state = client.ctx.store().snapshot();
    let ids: Vec<i32> = state.users.iter().map(|u| u.id.as_i32()).collect();
    assert_eq!(ids, vec![admin, other]);
    assert_eq!(state.users[1].attributes.get("isAdmin"), Some(&json!(true)));
    assert_eq!(backend.user_ids(), vec![admin, other]);
    assert!(client.errors.is_empty());
    assert!(
        backend
            .requests()
            .contains(&format!("DELETE /api/admin/users/{removed}"))
    );
}
