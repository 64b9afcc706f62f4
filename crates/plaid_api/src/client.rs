use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use thiserror::Error;

use crate::model::*;

/// The Plaid environment requests are issued against. `Custom` carries a
/// full base URL and exists so tests can point the client at a local mock.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Environment {
    Sandbox,
    Development,
    Production,
    Custom(String),
}

impl Environment {
    pub fn base_url(&self) -> String {
        match self {
            Environment::Sandbox => "https://sandbox.plaid.com".to_string(),
            Environment::Development => "https://development.plaid.com".to_string(),
            Environment::Production => "https://production.plaid.com".to_string(),
            Environment::Custom(url) => url.trim_end_matches('/').to_string(),
        }
    }
}

impl Default for Environment {
    fn default() -> Self {
        Environment::Sandbox
    }
}

impl Serialize for Environment {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let name = match self {
            Environment::Sandbox => "sandbox",
            Environment::Development => "development",
            Environment::Production => "production",
            Environment::Custom(url) => url.as_str(),
        };

        serializer.serialize_str(name)
    }
}

impl<'de> Deserialize<'de> for Environment {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;

        Ok(match s.to_lowercase().as_str() {
            "sandbox" => Environment::Sandbox,
            "development" => Environment::Development,
            "production" => Environment::Production,
            _ => Environment::Custom(s),
        })
    }
}

#[derive(Debug, Error)]
pub enum ClientError {
    #[error("request to Plaid failed: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("Plaid returned {status}: {error}")]
    Api { status: u16, error: ErrorResponse },
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Credentials {
    pub client_id: String,
    pub secret: String,
}

#[derive(Debug, Default)]
pub struct Builder {
    credentials: Credentials,
    env: Environment,
    http: Option<reqwest::Client>,
}

impl Builder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_credentials(mut self, credentials: Credentials) -> Self {
        self.credentials = credentials;
        self
    }

    pub fn with_env(mut self, env: Environment) -> Self {
        self.env = env;
        self
    }

    pub fn with_http_client(mut self, http: reqwest::Client) -> Self {
        self.http = Some(http);
        self
    }

    pub fn build(self) -> Plaid {
        Plaid {
            http: self.http.unwrap_or_default(),
            credentials: self.credentials,
            base_url: self.env.base_url(),
        }
    }
}

/// Credentials are merged into each request body alongside the
/// endpoint-specific fields.
#[derive(Serialize)]
struct Authenticated<'a, T: Serialize> {
    client_id: &'a str,
    secret: &'a str,
    #[serde(flatten)]
    request: &'a T,
}

pub struct Plaid {
    http: reqwest::Client,
    credentials: Credentials,
    base_url: String,
}

impl Plaid {
    async fn post<T, R>(&self, path: &str, request: &T) -> Result<R, ClientError>
    where
        T: Serialize,
        R: DeserializeOwned,
    {
        let res = self
            .http
            .post(format!("{}{}", self.base_url, path))
            .json(&Authenticated {
                client_id: &self.credentials.client_id,
                secret: &self.credentials.secret,
                request,
            })
            .send()
            .await?;

        let status = res.status();
        if !status.is_success() {
            return Err(ClientError::Api {
                status: status.as_u16(),
                error: res.json().await?,
            });
        }

        Ok(res.json().await?)
    }

    pub async fn create_link_token(
        &self,
        request: &LinkTokenCreateRequest<'_>,
    ) -> Result<LinkTokenCreateResponse, ClientError> {
        self.post("/link/token/create", request).await
    }

    pub async fn exchange_public_token(
        &self,
        public_token: &str,
    ) -> Result<ExchangePublicTokenResponse, ClientError> {
        #[derive(Serialize)]
        struct Exchange<'a> {
            public_token: &'a str,
        }

        self.post("/item/public_token/exchange", &Exchange { public_token })
            .await
    }

    pub async fn transactions_get(
        &self,
        request: &TransactionsGetRequest<'_>,
    ) -> Result<TransactionsGetResponse, ClientError> {
        self.post("/transactions/get", request).await
    }

    pub async fn item(&self, access_token: &str) -> Result<ItemGetResponse, ClientError> {
        #[derive(Serialize)]
        struct ItemGet<'a> {
            access_token: &'a str,
        }

        self.post("/item/get", &ItemGet { access_token }).await
    }

    pub async fn item_remove(&self, access_token: &str) -> Result<ItemRemoveResponse, ClientError> {
        #[derive(Serialize)]
        struct ItemRemove<'a> {
            access_token: &'a str,
        }

        self.post("/item/remove", &ItemRemove { access_token })
            .await
    }
}
