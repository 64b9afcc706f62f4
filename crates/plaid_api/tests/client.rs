use plaid_api::model::*;
use plaid_api::{Builder, ClientError, Credentials, Environment};
use serde_json::json;
use wiremock::matchers::{body_partial_json, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn test_client(server: &MockServer) -> plaid_api::Plaid {
    Builder::new()
        .with_credentials(Credentials {
            client_id: "test-client".into(),
            secret: "test-secret".into(),
        })
        .with_env(Environment::Custom(server.uri()))
        .build()
}

#[tokio::test]
async fn create_link_token_posts_credentials_and_decodes_response() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/link/token/create"))
        .and(body_partial_json(json!({
            "client_id": "test-client",
            "secret": "test-secret",
            "client_name": "passbook",
            "user": { "client_user_id": "user-id" },
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "link_token": "link-sandbox-abc123",
            "expiration": "2024-01-01T00:04:00Z",
            "request_id": "req-1",
        })))
        .expect(1)
        .mount(&server)
        .await;

    let res = test_client(&server)
        .create_link_token(&LinkTokenCreateRequest {
            client_name: "passbook",
            language: "en",
            country_codes: &["US"],
            user: LinkUser::new("user-id"),
            products: Some(&["auth", "transactions"]),
            ..LinkTokenCreateRequest::default()
        })
        .await
        .unwrap();

    assert_eq!(res.link_token, "link-sandbox-abc123");
}

#[tokio::test]
async fn exchange_public_token_returns_access_token() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/item/public_token/exchange"))
        .and(body_partial_json(
            json!({ "public_token": "public-sandbox-xyz" }),
        ))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "access_token": "access-sandbox-123",
            "item_id": "item-1",
            "request_id": "req-2",
        })))
        .mount(&server)
        .await;

    let res = test_client(&server)
        .exchange_public_token("public-sandbox-xyz")
        .await
        .unwrap();

    assert_eq!(res.access_token, "access-sandbox-123");
    assert_eq!(res.item_id, "item-1");
}

#[tokio::test]
async fn transactions_get_sends_range_and_page_options() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/transactions/get"))
        .and(body_partial_json(json!({
            "access_token": "access-sandbox-123",
            "start_date": "2022-01-01",
            "end_date": "2024-12-31",
            "options": { "count": 100, "offset": 0 },
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "accounts": [],
            "transactions": [{
                "transaction_id": "txn-1",
                "account_id": "acct-1",
                "amount": 12.5,
                "date": "2023-06-15",
                "name": "COFFEE SHOP",
                "pending": false,
                "category": ["Food and Drink", "Coffee"],
            }],
            "total_transactions": 1,
            "item": { "item_id": "item-1" },
            "request_id": "req-3",
        })))
        .mount(&server)
        .await;

    let res = test_client(&server)
        .transactions_get(&TransactionsGetRequest {
            access_token: "access-sandbox-123",
            start_date: "2022-01-01".parse().unwrap(),
            end_date: "2024-12-31".parse().unwrap(),
            options: Some(TransactionsGetOptions {
                count: Some(100),
                offset: Some(0),
                ..TransactionsGetOptions::default()
            }),
        })
        .await
        .unwrap();

    assert_eq!(res.total_transactions, 1);
    assert_eq!(res.transactions[0].name, "COFFEE SHOP");
    assert_eq!(
        res.transactions[0].category.as_deref(),
        Some(&["Food and Drink".to_string(), "Coffee".to_string()][..])
    );
}

#[tokio::test]
async fn item_remove_hits_remove_endpoint() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/item/remove"))
        .and(body_partial_json(
            json!({ "access_token": "access-sandbox-123" }),
        ))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!({ "request_id": "req-4" })),
        )
        .mount(&server)
        .await;

    let res = test_client(&server)
        .item_remove("access-sandbox-123")
        .await
        .unwrap();

    assert_eq!(res.request_id, "req-4");
}

#[tokio::test]
async fn api_errors_decode_plaid_error_envelope() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/item/get"))
        .respond_with(ResponseTemplate::new(400).set_body_json(json!({
            "error_type": "INVALID_INPUT",
            "error_code": "INVALID_ACCESS_TOKEN",
            "error_message": "could not find matching access token",
            "display_message": null,
            "request_id": "req-5",
        })))
        .mount(&server)
        .await;

    let err = test_client(&server).item("bogus").await.unwrap_err();

    match err {
        ClientError::Api { status, error } => {
            assert_eq!(status, 400);
            assert_eq!(error.error_code, "INVALID_ACCESS_TOKEN");
        }
        other => panic!("expected api error, got {:?}", other),
    }
}
