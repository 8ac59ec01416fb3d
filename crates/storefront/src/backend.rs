//! HTTP client for the Vitrina backend.
//!
//! Covers authentication, order notifications, the customer list and push
//! subscriptions. Calls are never retried. A failure carries its route and
//! status so the caller can turn it into a toast or a redirect.

use std::fmt;

use chrono::{DateTime, Utc};
use reqwest::Method;
use reqwest::header::{AUTHORIZATION, HeaderMap, HeaderValue};
use secrecy::{ExposeSecret, SecretString};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, instrument};
use url::Url;
use vitrina_core::{Email, Order, UserSession};

use crate::config::BackendConfig;
use crate::notifications::{Toast, ToastLevel};

// =============================================================================
// Routes
// =============================================================================

/// Backend endpoints, relative to the configured base URL.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BackendRoute {
    AuthStatus,
    Login,
    Logout,
    Register,
    Orders,
    Customers,
    PushSubscribe,
}

impl BackendRoute {
    #[must_use]
    pub const fn path(self) -> &'static str {
        match self {
            Self::AuthStatus => "api/auth/status",
            Self::Login => "api/auth/login",
            Self::Logout => "api/auth/logout",
            Self::Register => "api/auth/register",
            Self::Orders => "api/orders",
            Self::Customers => "api/customers",
            Self::PushSubscribe => "api/push/subscribe",
        }
    }

    #[must_use]
    pub fn method(self) -> Method {
        match self {
            Self::AuthStatus | Self::Customers => Method::GET,
            Self::Login | Self::Logout | Self::Register | Self::Orders | Self::PushSubscribe => {
                Method::POST
            }
        }
    }
}

impl fmt::Display for BackendRoute {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "/{}", self.path())
    }
}

/// Where the user should be sent after a failed call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Redirect {
    Login,
    Home,
}

// =============================================================================
// Errors
// =============================================================================

/// Errors that can occur when talking to the backend.
#[derive(Debug, Error)]
pub enum BackendError {
    /// The HTTP client could not be built.
    #[error("HTTP client error: {0}")]
    Client(#[source] reqwest::Error),

    /// The request never got a response.
    #[error("HTTP error on {route}: {source}")]
    Http {
        route: BackendRoute,
        #[source]
        source: reqwest::Error,
    },

    /// The backend answered with a non-success status.
    #[error("API error on {route}: {status} - {message}")]
    Status {
        route: BackendRoute,
        status: u16,
        message: String,
    },

    /// The response body was not what the route returns.
    #[error("Parse error on {route}: {message}")]
    Parse { route: BackendRoute, message: String },

    #[error("Invalid backend URL: {0}")]
    Url(#[from] url::ParseError),

    #[error("Invalid header: {0}")]
    Header(String),
}

impl BackendError {
    /// The route that failed, when the failure belongs to a request.
    #[must_use]
    pub const fn route(&self) -> Option<BackendRoute> {
        match self {
            Self::Http { route, .. } | Self::Status { route, .. } | Self::Parse { route, .. } => {
                Some(*route)
            }
            Self::Client(_) | Self::Url(_) | Self::Header(_) => None,
        }
    }

    /// HTTP status of the failed response, if there was one.
    #[must_use]
    pub const fn status(&self) -> Option<u16> {
        match self {
            Self::Status { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// 401 sends the user to sign in; 404 sends them home.
    #[must_use]
    pub const fn redirect(&self) -> Option<Redirect> {
        match self.status() {
            Some(401) => Some(Redirect::Login),
            Some(404) => Some(Redirect::Home),
            _ => None,
        }
    }

    /// Login failures are reported by the login form itself, not globally.
    #[must_use]
    pub fn is_suppressed(&self) -> bool {
        self.route() == Some(BackendRoute::Login)
    }

    /// The toast shown for this failure, `None` when suppressed.
    #[must_use]
    pub fn toast(&self, now: DateTime<Utc>, ttl: chrono::Duration) -> Option<Toast> {
        if self.is_suppressed() {
            return None;
        }
        let message = match self {
            Self::Status { status: 401, .. } => "Please sign in to continue.".to_string(),
            Self::Status { status: 403, .. } => "You do not have access to this.".to_string(),
            Self::Status { status: 404, .. } => "That page could not be found.".to_string(),
            Self::Status { status, .. } if *status >= 500 => {
                "The server had a problem. Please try again later.".to_string()
            }
            Self::Status { message, .. } if !message.trim().is_empty() => message.trim().to_string(),
            Self::Http { .. } => "Could not reach the server.".to_string(),
            _ => "Something went wrong.".to_string(),
        };
        Some(Toast::new(ToastLevel::Error, "Error", message, now + ttl))
    }
}

// =============================================================================
// Payloads
// =============================================================================

/// Result of the auth status check.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct AuthStatus {
    pub authenticated: bool,
    #[serde(default)]
    pub user: Option<UserSession>,
}

/// A customer as listed by the backend.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RemoteCustomer {
    pub email: Email,
    pub name: String,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
}

/// A browser push subscription.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PushSubscription {
    pub endpoint: String,
    pub keys: PushKeys,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PushKeys {
    pub p256dh: String,
    pub auth: String,
}

// =============================================================================
// Client
// =============================================================================

/// Backend API client.
#[derive(Clone)]
pub struct BackendClient {
    client: reqwest::Client,
    base_url: Url,
}

impl fmt::Debug for BackendClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BackendClient")
            .field("base_url", &self.base_url.as_str())
            .finish_non_exhaustive()
    }
}

impl BackendClient {
    /// Create a client for the configured backend.
    ///
    /// # Errors
    ///
    /// Returns error if the token is not a valid header value or the HTTP
    /// client fails to build.
    pub fn new(config: &BackendConfig) -> Result<Self, BackendError> {
        let mut headers = HeaderMap::new();
        if let Some(token) = &config.token {
            let value = format!("Bearer {}", token.expose_secret());
            let mut value = HeaderValue::from_str(&value)
                .map_err(|e| BackendError::Header(format!("Invalid backend token: {e}")))?;
            value.set_sensitive(true);
            headers.insert(AUTHORIZATION, value);
        }

        let client = reqwest::Client::builder()
            .default_headers(headers)
            .build()
            .map_err(BackendError::Client)?;

        Ok(Self {
            client,
            base_url: config.base_url.clone(),
        })
    }

    /// Absolute URL for a route.
    ///
    /// # Errors
    ///
    /// Returns `BackendError::Url` if the route cannot be joined to the base.
    pub fn url_for(&self, route: BackendRoute) -> Result<Url, BackendError> {
        Ok(self.base_url.join(route.path())?)
    }

    /// Ask whether the current credentials belong to a signed-in customer.
    ///
    /// # Errors
    ///
    /// Returns error if the request fails.
    #[instrument(skip(self))]
    pub async fn auth_status(&self) -> Result<AuthStatus, BackendError> {
        let response = self.send(BackendRoute::AuthStatus, None::<&()>).await?;
        read_json(BackendRoute::AuthStatus, response).await
    }

    /// Sign in with email and password.
    ///
    /// # Errors
    ///
    /// Returns error if the request fails or the credentials are rejected.
    #[instrument(skip(self, password), fields(email = %email))]
    pub async fn login(
        &self,
        email: &Email,
        password: &SecretString,
    ) -> Result<UserSession, BackendError> {
        let body = serde_json::json!({
            "email": email.as_str(),
            "password": password.expose_secret(),
        });
        let response = self.send(BackendRoute::Login, Some(&body)).await?;
        read_json(BackendRoute::Login, response).await
    }

    /// End the backend session.
    ///
    /// # Errors
    ///
    /// Returns error if the request fails.
    #[instrument(skip(self))]
    pub async fn logout(&self) -> Result<(), BackendError> {
        self.send(BackendRoute::Logout, None::<&()>).await?;
        Ok(())
    }

    /// Create a customer account.
    ///
    /// # Errors
    ///
    /// Returns error if the request fails or the account is refused.
    #[instrument(skip(self, password), fields(email = %email))]
    pub async fn register(
        &self,
        name: &str,
        email: &Email,
        password: &SecretString,
    ) -> Result<UserSession, BackendError> {
        let body = serde_json::json!({
            "name": name,
            "email": email.as_str(),
            "password": password.expose_secret(),
        });
        let response = self.send(BackendRoute::Register, Some(&body)).await?;
        read_json(BackendRoute::Register, response).await
    }

    /// Tell the backend an order was placed.
    ///
    /// # Errors
    ///
    /// Returns error if the request fails.
    #[instrument(skip(self, order), fields(order_id = %order.id))]
    pub async fn notify_order_created(&self, order: &Order) -> Result<(), BackendError> {
        self.send(BackendRoute::Orders, Some(order)).await?;
        debug!("Backend notified of order");
        Ok(())
    }

    /// Fetch the registered customers.
    ///
    /// # Errors
    ///
    /// Returns error if the request fails or the body is malformed.
    #[instrument(skip(self))]
    pub async fn fetch_customers(&self) -> Result<Vec<RemoteCustomer>, BackendError> {
        let response = self.send(BackendRoute::Customers, None::<&()>).await?;
        read_json(BackendRoute::Customers, response).await
    }

    /// Register a push subscription for back-office alerts.
    ///
    /// # Errors
    ///
    /// Returns error if the request fails.
    #[instrument(skip_all)]
    pub async fn register_push_subscription(
        &self,
        subscription: &PushSubscription,
    ) -> Result<(), BackendError> {
        self.send(BackendRoute::PushSubscribe, Some(subscription))
            .await?;
        Ok(())
    }

    async fn send<B: Serialize + ?Sized>(
        &self,
        route: BackendRoute,
        body: Option<&B>,
    ) -> Result<reqwest::Response, BackendError> {
        let mut request = self.client.request(route.method(), self.url_for(route)?);
        if let Some(body) = body {
            request = request.json(body);
        }

        let response = request
            .send()
            .await
            .map_err(|source| BackendError::Http { route, source })?;
        let status = response.status();

        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(BackendError::Status {
                route,
                status: status.as_u16(),
                message,
            });
        }

        Ok(response)
    }
}

async fn read_json<T: DeserializeOwned>(
    route: BackendRoute,
    response: reqwest::Response,
) -> Result<T, BackendError> {
    response.json().await.map_err(|e| BackendError::Parse {
        route,
        message: e.to_string(),
    })
}
