use std::sync::Arc;

use httpmock::prelude::*;
use serde_json::json;

use gymbuddy_rs::{
    CredentialStore, GymBuddy, MemoryStore, NewUser, RequestError, KEY_ACCESS_TOKEN,
    KEY_REFRESH_TOKEN, KEY_USER,
};

fn client_for(server: &MockServer) -> (GymBuddy, Arc<MemoryStore>) {
    let store = Arc::new(MemoryStore::new());
    let client = GymBuddy::with_store(&format!("http://{}", server.address()), store.clone());
    (client, store)
}

#[tokio::test]
async fn login_persists_token_pair_and_user_snapshot() {
    let server = MockServer::start_async().await;
    let (client, store) = client_for(&server);

    let mock = server
        .mock_async(|when, then| {
            when.method(POST).path("/auth/login").json_body(json!({
                "emailAddress": "louise@example.com",
                "password": "hunter2",
            }));
            then.status(200).json_body(json!({
                "success": true,
                "data": {
                    "accessToken": "A",
                    "refreshToken": "R",
                    "id": "42",
                    "username": "lift_louise",
                    "emailAddress": "louise@example.com",
                },
                "msg": null,
            }));
        })
        .await;

    let session = client
        .auth()
        .login("louise@example.com", "hunter2")
        .await
        .unwrap();

    mock.assert_async().await;
    assert_eq!(session.username, "lift_louise");

    // The store reads back exactly the pair the server issued.
    assert_eq!(
        store.get(KEY_ACCESS_TOKEN).await.unwrap(),
        Some("A".to_string())
    );
    assert_eq!(
        store.get(KEY_REFRESH_TOKEN).await.unwrap(),
        Some("R".to_string())
    );

    assert_eq!(client.token().await.unwrap(), Some("A".to_string()));

    let cached = client.cached_user().await.unwrap().unwrap();
    assert_eq!(cached.id, "42");
    assert_eq!(cached.username, "lift_louise");
    assert_eq!(cached.email_address, "louise@example.com");
}

#[tokio::test]
async fn login_failure_surfaces_server_message_and_stores_nothing() {
    let server = MockServer::start_async().await;
    let (client, store) = client_for(&server);

    server
        .mock_async(|when, then| {
            when.method(POST).path("/auth/login");
            then.status(401).json_body(json!({
                "success": false,
                "data": null,
                "msg": "Invalid email address or password.",
            }));
        })
        .await;

    let result = client.auth().login("louise@example.com", "nope").await;

    match result {
        Err(RequestError::Api(msg)) => assert_eq!(msg, "Invalid email address or password."),
        other => panic!("expected Api error, got {other:?}"),
    }

    assert_eq!(store.get(KEY_ACCESS_TOKEN).await.unwrap(), None);
    assert_eq!(store.get(KEY_REFRESH_TOKEN).await.unwrap(), None);
    assert_eq!(store.get(KEY_USER).await.unwrap(), None);
}

#[tokio::test]
async fn register_signs_the_new_account_in() {
    let server = MockServer::start_async().await;
    let (client, store) = client_for(&server);

    let mock = server
        .mock_async(|when, then| {
            when.method(POST).path("/auth/register").json_body(json!({
                "username": "lift_louise",
                "emailAddress": "louise@example.com",
                "password": "hunter2",
                "city": "Rotterdam",
            }));
            then.status(200).json_body(json!({
                "success": true,
                "data": {
                    "accessToken": "A",
                    "refreshToken": "R",
                    "id": "42",
                    "username": "lift_louise",
                    "emailAddress": "louise@example.com",
                },
                "msg": null,
            }));
        })
        .await;

    client
        .auth()
        .register(NewUser {
            username: "lift_louise".to_string(),
            email_address: "louise@example.com".to_string(),
            password: "hunter2".to_string(),
            city: Some("Rotterdam".to_string()),
            ..NewUser::default()
        })
        .await
        .unwrap();

    mock.assert_async().await;
    assert_eq!(
        store.get(KEY_ACCESS_TOKEN).await.unwrap(),
        Some("A".to_string())
    );
    assert_eq!(
        store.get(KEY_REFRESH_TOKEN).await.unwrap(),
        Some("R".to_string())
    );
}

#[tokio::test]
async fn logout_clears_the_session_and_is_idempotent() {
    let server = MockServer::start_async().await;
    let (client, store) = client_for(&server);

    store.set(KEY_ACCESS_TOKEN, "A").await.unwrap();
    store.set(KEY_REFRESH_TOKEN, "R").await.unwrap();
    store.set(KEY_USER, r#"{"id":"42","username":"lift_louise","emailAddress":"louise@example.com"}"#).await.unwrap();

    let mock = server
        .mock_async(|when, then| {
            when.method(POST)
                .path("/auth/logout")
                .header("authorization", "Bearer A");
            then.status(200).json_body(json!({
                "success": true,
                "data": null,
                "msg": null,
            }));
        })
        .await;

    client.auth().logout().await.unwrap();

    mock.assert_async().await;
    assert_eq!(store.get(KEY_ACCESS_TOKEN).await.unwrap(), None);
    assert_eq!(store.get(KEY_REFRESH_TOKEN).await.unwrap(), None);
    assert_eq!(store.get(KEY_USER).await.unwrap(), None);

    // A second logout has no session left to revoke: no network call, no
    // error, store still empty.
    client.auth().logout().await.unwrap();

    assert_eq!(mock.hits_async().await, 1);
    assert_eq!(store.get(KEY_ACCESS_TOKEN).await.unwrap(), None);
}

#[tokio::test]
async fn logout_clears_the_session_even_when_the_server_rejects_it() {
    let server = MockServer::start_async().await;
    let (client, store) = client_for(&server);

    store.set(KEY_ACCESS_TOKEN, "A").await.unwrap();
    store.set(KEY_REFRESH_TOKEN, "R").await.unwrap();

    server
        .mock_async(|when, then| {
            when.method(POST).path("/auth/logout");
            then.status(500).body("internal server error");
        })
        .await;

    client.auth().logout().await.unwrap();

    assert_eq!(store.get(KEY_ACCESS_TOKEN).await.unwrap(), None);
    assert_eq!(store.get(KEY_REFRESH_TOKEN).await.unwrap(), None);
}

#[tokio::test]
async fn unreachable_server_maps_to_a_network_error() {
    // Port 9 (discard) has no listener; the connection is refused outright.
    let client = GymBuddy::new("http://127.0.0.1:9");

    let result = client.auth().login("louise@example.com", "hunter2").await;

    assert!(matches!(result, Err(RequestError::Network(_))));
}
