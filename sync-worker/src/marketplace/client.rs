use std::time::Duration;

use base64::{engine::general_purpose::STANDARD, Engine as _};
use reqwest::{Client, StatusCode};
use reqwest_middleware::{ClientBuilder, ClientWithMiddleware};
use reqwest_tracing::TracingMiddleware;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use super::{AuthError, Marketplace, MarketplaceSession, PublishError, WithdrawError};
use crate::types::{AdDraft, Credentials, ExternalId, ImageAsset};

/// Default request timeout in seconds
const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 30;
/// Maximum number of idle connections to maintain per host
const MAX_IDLE_CONNECTIONS_PER_HOST: usize = 10;

#[derive(Serialize)]
struct SessionRequest<'a> {
    username: &'a str,
    password: &'a str,
}

#[derive(Deserialize)]
struct SessionResponse {
    token: String,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct CreateListingRequest<'a> {
    title: &'a str,
    description: &'a str,
    price: i64,
    category_id: i64,
    images: Vec<ListingImage>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct ListingImage {
    position: usize,
    content_base64: String,
}

#[derive(Deserialize)]
struct CreateListingResponse {
    id: i64,
}

/// Marketplace REST API client
///
/// Holds no credentials itself; every authentication yields an independent
/// [`HttpSession`] bearing its own token.
pub struct HttpMarketplace {
    base_url: String,
    http_client: ClientWithMiddleware,
}

impl HttpMarketplace {
    /// Creates a new marketplace client
    ///
    /// # Panics
    ///
    /// If the HTTP client fails to be created
    #[must_use]
    pub fn new(base_url: String) -> Self {
        let reqwest_client = Client::builder()
            .timeout(Duration::from_secs(DEFAULT_REQUEST_TIMEOUT_SECS))
            .pool_max_idle_per_host(MAX_IDLE_CONNECTIONS_PER_HOST)
            .build()
            .expect("Failed to create HTTP client");

        let http_client = ClientBuilder::new(reqwest_client)
            .with(TracingMiddleware::default())
            .build();

        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            http_client,
        }
    }
}

#[async_trait::async_trait]
impl Marketplace for HttpMarketplace {
    async fn authenticate(
        &self,
        credentials: &Credentials,
    ) -> Result<Box<dyn MarketplaceSession>, AuthError> {
        let url = format!("{}/api/v1/sessions", self.base_url);
        let response = self
            .http_client
            .post(url)
            .json(&SessionRequest {
                username: &credentials.username,
                password: &credentials.password,
            })
            .send()
            .await?;

        match response.status() {
            StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => {
                return Err(AuthError::InvalidCredentials(credentials.username.clone()));
            }
            status if !status.is_success() => {
                return Err(AuthError::Transport(format!("HTTP {status}")));
            }
            _ => {}
        }

        let session = response
            .json::<SessionResponse>()
            .await
            .map_err(|e| AuthError::Transport(e.to_string()))?;

        debug!(username = %credentials.username, "Opened marketplace session");

        Ok(Box::new(HttpSession {
            base_url: self.base_url.clone(),
            http_client: self.http_client.clone(),
            token: session.token,
        }))
    }
}

/// Session bound to one authenticated user
struct HttpSession {
    base_url: String,
    http_client: ClientWithMiddleware,
    token: String,
}

#[async_trait::async_trait]
impl MarketplaceSession for HttpSession {
    async fn publish(
        &self,
        draft: &AdDraft,
        images: &[ImageAsset],
    ) -> Result<ExternalId, PublishError> {
        let request = CreateListingRequest {
            title: &draft.title,
            description: &draft.description,
            price: draft.price_minor,
            category_id: draft.category_id,
            images: images
                .iter()
                .enumerate()
                .map(|(position, image)| ListingImage {
                    position,
                    content_base64: STANDARD.encode(&image.bytes),
                })
                .collect(),
        };

        let url = format!("{}/api/v1/listings", self.base_url);
        let response = self
            .http_client
            .post(url)
            .bearer_auth(&self.token)
            .json(&request)
            .send()
            .await?;

        let status = response.status();
        if status.is_client_error() {
            return Err(PublishError::Rejected {
                status: status.as_u16(),
            });
        }
        if !status.is_success() {
            return Err(PublishError::Transport(format!("HTTP {status}")));
        }

        let created = response
            .json::<CreateListingResponse>()
            .await
            .map_err(|e| PublishError::Transport(e.to_string()))?;

        Ok(ExternalId(created.id))
    }

    async fn withdraw(&self, external_id: ExternalId) -> Result<(), WithdrawError> {
        let url = format!("{}/api/v1/listings/{}", self.base_url, external_id);
        let response = self
            .http_client
            .delete(url)
            .bearer_auth(&self.token)
            .send()
            .await?;

        let status = response.status();
        if status == StatusCode::NOT_FOUND {
            warn!(%external_id, "Listing already gone from marketplace");
            return Ok(());
        }
        if status.is_client_error() {
            return Err(WithdrawError::Rejected {
                external_id: external_id.0,
                status: status.as_u16(),
            });
        }
        if !status.is_success() {
            return Err(WithdrawError::Transport(format!("HTTP {status}")));
        }

        Ok(())
    }
}
