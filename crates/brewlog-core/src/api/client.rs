//! API client for the brewing journal backend.
//!
//! Every backend call goes through `ApiClient::dispatch`, which reads the
//! session's credential immediately before sending and sets the
//! `Authorization` header from it.

use std::sync::Arc;
use std::time::Duration;

use reqwest::{header, Client, Method, Request, RequestBuilder, Response, Url};
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use tracing::{debug, warn};

use crate::auth::{Credential, SessionHandle};
use crate::models::{
    Brewing, BrewingUpdate, CoffeeBrand, CoffeeDetail, NewBrewing, NewCoffee, NewCoffeeBrand,
};

use super::ApiError;

// ============================================================================
// Constants
// ============================================================================

/// HTTP request timeout in seconds.
/// 30s allows for slow API responses while failing fast enough for good UX.
const REQUEST_TIMEOUT_SECS: u64 = 30;

#[derive(Debug, Serialize)]
struct Credentials<'a> {
    email: &'a str,
    password: &'a str,
}

/// Body of a successful `POST /auth/login`
#[derive(Debug, Clone, Deserialize)]
pub struct TokenResponse {
    pub access_token: String,
    #[serde(default = "default_token_type")]
    pub token_type: String,
}

fn default_token_type() -> String {
    "bearer".to_string()
}

/// Body of a successful `POST /auth/register`
#[derive(Debug, Clone, Deserialize)]
pub struct RegisteredUser {
    pub id: i64,
    pub email: String,
}

/// API client for the brewing journal backend.
/// Clone is cheap - reqwest::Client uses Arc internally for connection pooling.
#[derive(Clone)]
pub struct ApiClient {
    client: Client,
    base_url: Arc<str>,
    session: SessionHandle,
}

impl ApiClient {
    /// Create a client for `base_url`. The base URL is fixed for the life of
    /// the client; the credential is not, and is read from `session` per request.
    pub fn new(base_url: &str, session: SessionHandle) -> Result<Self, ApiError> {
        let base_url = base_url.trim_end_matches('/');
        Url::parse(base_url).map_err(|e| ApiError::Config(format!("{}: {}", base_url, e)))?;

        let mut headers = header::HeaderMap::new();
        headers.insert(
            header::CONTENT_TYPE,
            header::HeaderValue::from_static("application/json"),
        );

        let client = Client::builder()
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .default_headers(headers)
            .build()
            .map_err(|e| ApiError::Config(e.to_string()))?;

        Ok(Self {
            client,
            base_url: Arc::from(base_url),
            session,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Session whose credential this client attaches
    pub fn session(&self) -> &SessionHandle {
        &self.session
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    fn request(&self, method: Method, path: &str) -> RequestBuilder {
        self.client.request(method, self.url(path))
    }

    /// Finish building a request and attach the credential current right now.
    ///
    /// Without a credential any `Authorization` header is removed, so an
    /// unauthenticated request never carries one. Returns the credential that
    /// was attached.
    fn authorize(
        &self,
        builder: RequestBuilder,
    ) -> Result<(Request, Option<Credential>), ApiError> {
        let mut request = builder.build()?;
        let credential = self.session.credential();

        match credential {
            Some(ref c) => {
                let mut value = header::HeaderValue::from_str(&c.authorization())
                    .map_err(|_| ApiError::Config("token is not a valid header value".to_string()))?;
                value.set_sensitive(true);
                request.headers_mut().insert(header::AUTHORIZATION, value);
            }
            None => {
                request.headers_mut().remove(header::AUTHORIZATION);
            }
        }

        Ok((request, credential))
    }

    /// Build a request exactly as it would be sent, without sending it.
    pub fn build_request(&self, method: Method, path: &str) -> Result<Request, ApiError> {
        self.authorize(self.request(method, path)).map(|(request, _)| request)
    }

    /// Send a request. A 401 answered to a request that carried a credential
    /// is reported to the session, which decides whether to log out.
    async fn dispatch(&self, builder: RequestBuilder) -> Result<Response, ApiError> {
        let (request, credential) = self.authorize(builder)?;
        debug!(
            method = %request.method(),
            path = request.url().path(),
            authenticated = credential.is_some(),
            "Dispatching request"
        );

        let response = self.client.execute(request).await?;

        if response.status() == reqwest::StatusCode::UNAUTHORIZED {
            if let Some(c) = credential {
                warn!("Backend rejected the session token");
                self.session.report_rejected(c.token());
            }
        }

        Self::check_response(response).await
    }

    /// Check if response is successful, returning an error with body if not.
    async fn check_response(response: Response) -> Result<Response, ApiError> {
        if response.status().is_success() {
            Ok(response)
        } else {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            Err(ApiError::from_status(status, &body))
        }
    }

    async fn parse<T: DeserializeOwned>(response: Response, path: &str) -> Result<T, ApiError> {
        let text = response.text().await?;
        serde_json::from_str(&text)
            .map_err(|e| ApiError::InvalidResponse(format!("{}: {}", path, e)))
    }

    async fn get<T: DeserializeOwned>(&self, path: &str) -> Result<T, ApiError> {
        let response = self.dispatch(self.request(Method::GET, path)).await?;
        Self::parse(response, path).await
    }

    async fn post<T: DeserializeOwned, B: Serialize + ?Sized>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<T, ApiError> {
        let response = self
            .dispatch(self.request(Method::POST, path).json(body))
            .await?;
        Self::parse(response, path).await
    }

    async fn put<T: DeserializeOwned, B: Serialize + ?Sized>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<T, ApiError> {
        let response = self
            .dispatch(self.request(Method::PUT, path).json(body))
            .await?;
        Self::parse(response, path).await
    }

    async fn delete(&self, path: &str) -> Result<(), ApiError> {
        self.dispatch(self.request(Method::DELETE, path)).await?;
        Ok(())
    }

    // ===== Authentication =====

    /// Exchange email and password for an access token
    pub async fn login(&self, email: &str, password: &str) -> Result<TokenResponse, ApiError> {
        self.post("/auth/login", &Credentials { email, password }).await
    }

    /// Create an account. No token is issued.
    pub async fn register(&self, email: &str, password: &str) -> Result<RegisteredUser, ApiError> {
        self.post("/auth/register", &Credentials { email, password }).await
    }

    // ===== Brewings =====

    /// Fetch all brewings, newest first
    pub async fn list_brewings(&self) -> Result<Vec<Brewing>, ApiError> {
        self.get("/brewings").await
    }

    pub async fn get_brewing(&self, id: i64) -> Result<Brewing, ApiError> {
        self.get(&format!("/brewings/{}", id)).await
    }

    pub async fn create_brewing(&self, brewing: &NewBrewing) -> Result<Brewing, ApiError> {
        self.post("/brewings", brewing).await
    }

    pub async fn update_brewing(&self, id: i64, update: &BrewingUpdate) -> Result<Brewing, ApiError> {
        self.put(&format!("/brewings/{}", id), update).await
    }

    pub async fn delete_brewing(&self, id: i64) -> Result<(), ApiError> {
        self.delete(&format!("/brewings/{}", id)).await
    }

    // ===== Coffee catalog =====

    /// Fetch the coffee catalog, optionally only one brand's coffees
    pub async fn list_coffees(&self, brand_id: Option<i64>) -> Result<Vec<CoffeeDetail>, ApiError> {
        match brand_id {
            Some(id) => self.get(&format!("/coffees?brand_id={}", id)).await,
            None => self.get("/coffees").await,
        }
    }

    pub async fn get_coffee(&self, id: i64) -> Result<CoffeeDetail, ApiError> {
        self.get(&format!("/coffees/{}", id)).await
    }

    pub async fn create_coffee(&self, coffee: &NewCoffee) -> Result<CoffeeDetail, ApiError> {
        self.post("/coffees", coffee).await
    }

    pub async fn list_coffee_brands(&self) -> Result<Vec<CoffeeBrand>, ApiError> {
        self.get("/coffee-brands").await
    }

    pub async fn create_coffee_brand(&self, brand: &NewCoffeeBrand) -> Result<CoffeeBrand, ApiError> {
        self.post("/coffee-brands", brand).await
    }
}
