use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Result;
use axum::{
    extract::Extension,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use chrono::NaiveDate;
use clap::ArgMatches;
use plaid_api::model::*;
use plaid_api::{Builder, ClientError, Credentials, Plaid};
use serde::Deserialize;
use thiserror::Error;
use tokio::signal;
use tokio::sync::RwLock;
use tracing::info;

use crate::settings::Settings;
use crate::{CLIENT_NAME, COUNTRY_CODES, LINK_USER_ID, PRODUCTS};

const DEFAULT_LISTEN: &str = "127.0.0.1:3003";

/// The access token for the most recently exchanged public token. A single
/// slot is all the linking flow needs; the lock keeps a concurrent exchange
/// and read from tearing.
type AccessToken = Arc<RwLock<Option<String>>>;

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("{0}")]
    Upstream(#[from] ClientError),
    #[error("no access token has been exchanged yet")]
    NoLinkedItem,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (StatusCode::INTERNAL_SERVER_ERROR, self.to_string()).into_response()
    }
}

pub(crate) fn router(client: Plaid) -> Router {
    Router::new()
        .route("/api/create_link_token", post(create_link_token))
        .route("/api/exchange_public_token", post(exchange_public_token))
        .route("/api/transactions", get(transactions))
        .route("/api/item", get(item))
        .route("/api/item/remove", post(item_remove))
        .layer(Extension(Arc::new(client)))
        .layer(Extension(AccessToken::default()))
}

async fn create_link_token(
    Extension(client): Extension<Arc<Plaid>>,
) -> Result<Json<LinkTokenCreateResponse>, ApiError> {
    let res = client
        .create_link_token(&LinkTokenCreateRequest {
            client_name: CLIENT_NAME,
            language: "en",
            country_codes: &COUNTRY_CODES,
            user: LinkUser::new(LINK_USER_ID),
            products: Some(&PRODUCTS),
            ..LinkTokenCreateRequest::default()
        })
        .await?;

    Ok(Json(res))
}

#[derive(Debug, Deserialize)]
struct ExchangeRequest {
    public_token: String,
}

async fn exchange_public_token(
    Extension(client): Extension<Arc<Plaid>>,
    Extension(token): Extension<AccessToken>,
    Json(req): Json<ExchangeRequest>,
) -> Result<Json<ExchangePublicTokenResponse>, ApiError> {
    let res = client.exchange_public_token(&req.public_token).await?;

    *token.write().await = Some(res.access_token.clone());
    info!("exchanged public token for item {}", res.item_id);

    Ok(Json(res))
}

// Window served by the transactions route.
fn transactions_window() -> (NaiveDate, NaiveDate) {
    (
        NaiveDate::from_ymd_opt(2023, 1, 1).unwrap(),
        NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
    )
}

async fn transactions(
    Extension(client): Extension<Arc<Plaid>>,
    Extension(token): Extension<AccessToken>,
) -> Result<Json<TransactionsGetResponse>, ApiError> {
    let access_token = linked_token(&token).await?;
    let (start_date, end_date) = transactions_window();

    let res = client
        .transactions_get(&TransactionsGetRequest {
            access_token: &access_token,
            start_date,
            end_date,
            options: None,
        })
        .await?;

    Ok(Json(res))
}

async fn item(
    Extension(client): Extension<Arc<Plaid>>,
    Extension(token): Extension<AccessToken>,
) -> Result<Json<ItemGetResponse>, ApiError> {
    let access_token = linked_token(&token).await?;

    Ok(Json(client.item(&access_token).await?))
}

async fn item_remove(
    Extension(client): Extension<Arc<Plaid>>,
    Extension(token): Extension<AccessToken>,
) -> Result<Json<ItemRemoveResponse>, ApiError> {
    let access_token = linked_token(&token).await?;

    Ok(Json(client.item_remove(&access_token).await?))
}

async fn linked_token(slot: &AccessToken) -> Result<String, ApiError> {
    slot.read().await.clone().ok_or(ApiError::NoLinkedItem)
}

async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    info!("signal received, starting graceful shutdown");
}

pub(crate) async fn run(matches: &ArgMatches, settings: Settings) -> Result<()> {
    let addr: SocketAddr = matches
        .value_of("listen")
        .unwrap_or(DEFAULT_LISTEN)
        .parse()?;

    let client = Builder::new()
        .with_credentials(Credentials {
            client_id: settings.client_id.clone(),
            secret: settings.secret.clone(),
        })
        .with_env(settings.env.clone())
        .build();

    info!("listening on http://{}", addr);
    axum::Server::bind(&addr)
        .serve(router(client).into_make_service())
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}
