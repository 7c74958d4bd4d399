use pretty_assertions::assert_eq;
use serde_json::json;
use sync_worker::marketplace::{
    AuthError, HttpMarketplace, Marketplace, MarketplaceSession, PublishError, WithdrawError,
};
use sync_worker::types::{AdDraft, Credentials, ExternalId, ImageAsset};
use wiremock::matchers::{body_json, body_partial_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn credentials() -> Credentials {
    Credentials {
        username: "seller".to_string(),
        password: "hunter2".to_string(),
    }
}

async fn server_with_session() -> MockServer {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/api/v1/sessions"))
        .and(body_json(json!({"username": "seller", "password": "hunter2"})))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"token": "tok-1"})))
        .expect(1)
        .mount(&server)
        .await;

    server
}

async fn open_session(server: &MockServer) -> Box<dyn MarketplaceSession> {
    HttpMarketplace::new(format!("{}/", server.uri()))
        .authenticate(&credentials())
        .await
        .unwrap()
}

fn bike() -> AdDraft {
    AdDraft {
        title: "Bike".to_string(),
        description: "City bike".to_string(),
        price_minor: 15000,
        category_id: 42,
        image_refs: vec!["bike/front.jpg".to_string(), "bike/side.jpg".to_string()],
    }
}

#[tokio::test]
async fn test_publish_sends_listing_with_positional_images() {
    let server = server_with_session().await;
    Mock::given(method("POST"))
        .and(path("/api/v1/listings"))
        .and(header("authorization", "Bearer tok-1"))
        .and(body_partial_json(json!({
            "title": "Bike",
            "price": 15000,
            "categoryId": 42,
            "images": [
                {"position": 0, "contentBase64": "AQI="},
                {"position": 1, "contentBase64": "AwQF"},
            ],
        })))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!({"id": 987})))
        .expect(1)
        .mount(&server)
        .await;

    let session = open_session(&server).await;
    let images = vec![
        ImageAsset {
            image_ref: "bike/front.jpg".to_string(),
            bytes: vec![1, 2],
        },
        ImageAsset {
            image_ref: "bike/side.jpg".to_string(),
            bytes: vec![3, 4, 5],
        },
    ];

    let external_id = session.publish(&bike(), &images).await.unwrap();

    assert_eq!(external_id, ExternalId(987));
}

#[tokio::test]
async fn test_rejected_credentials() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/v1/sessions"))
        .respond_with(ResponseTemplate::new(401))
        .mount(&server)
        .await;

    let result = HttpMarketplace::new(server.uri())
        .authenticate(&credentials())
        .await;

    assert!(matches!(result, Err(AuthError::InvalidCredentials(user)) if user == "seller"));
}

#[tokio::test]
async fn test_session_server_error_is_transport() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/v1/sessions"))
        .respond_with(ResponseTemplate::new(503))
        .mount(&server)
        .await;

    let result = HttpMarketplace::new(server.uri())
        .authenticate(&credentials())
        .await;

    assert!(matches!(result, Err(AuthError::Transport(_))));
}

#[tokio::test]
async fn test_publish_client_error_is_rejected() {
    let server = server_with_session().await;
    Mock::given(method("POST"))
        .and(path("/api/v1/listings"))
        .respond_with(ResponseTemplate::new(422))
        .mount(&server)
        .await;

    let session = open_session(&server).await;
    let result = session.publish(&bike(), &[]).await;

    assert!(matches!(result, Err(PublishError::Rejected { status: 422 })));
}

#[tokio::test]
async fn test_withdraw_deletes_listing() {
    let server = server_with_session().await;
    Mock::given(method("DELETE"))
        .and(path("/api/v1/listings/987"))
        .and(header("authorization", "Bearer tok-1"))
        .respond_with(ResponseTemplate::new(204))
        .expect(1)
        .mount(&server)
        .await;

    let session = open_session(&server).await;

    session.withdraw(ExternalId(987)).await.unwrap();
}

#[tokio::test]
async fn test_withdraw_of_missing_listing_succeeds() {
    let server = server_with_session().await;
    Mock::given(method("DELETE"))
        .and(path("/api/v1/listings/987"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;

    let session = open_session(&server).await;

    assert!(session.withdraw(ExternalId(987)).await.is_ok());
}

#[tokio::test]
async fn test_withdraw_server_error_is_transport() {
    let server = server_with_session().await;
    Mock::given(method("DELETE"))
        .and(path("/api/v1/listings/987"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;

    let session = open_session(&server).await;
    let result = session.withdraw(ExternalId(987)).await;

    assert!(matches!(result, Err(WithdrawError::Transport(_))));
}
