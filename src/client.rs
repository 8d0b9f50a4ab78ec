//! OnApp API client.
//!
//! Low-level HTTP client that handles authentication, raw requests and the
//! envelope convention. Resource operations are implemented via traits on
//! the model types.

use std::env;
use std::sync::Arc;
use std::time::Duration;

use reqwest::header::{HeaderMap, HeaderValue, ACCEPT};
use reqwest::{Client, Response, StatusCode};
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use url::Url;

use crate::envelope;
use crate::error::{OnAppError, Result};

const USER_AGENT: &str = concat!("onapp-rs/", env!("CARGO_PKG_VERSION"));
const DEFAULT_TIMEOUT_SECS: u64 = 300;

/// Low-level OnApp API client.
///
/// Authenticates with HTTP basic auth (user login and API key). Entity
/// operations are implemented via the `Get`, `List`, `Create`, `Edit` and
/// `Delete` traits on model types.
///
/// This struct is cheaply cloneable; clones reference the same underlying
/// connection pool.
///
/// # Example
///
/// ```no_run
/// use onapp::OnAppClient;
///
/// # fn example() -> onapp::Result<()> {
/// // Create from environment variables
/// let client = OnAppClient::from_env()?;
///
/// // Or configure manually
/// let client = OnAppClient::new("admin", "api-key", "https://cp.example.com")?;
/// # Ok(())
/// # }
/// ```
#[derive(Clone)]
pub struct OnAppClient {
    http: Client,
    base_url: Arc<Url>,
    user: String,
    api_key: String,
}

impl std::fmt::Debug for OnAppClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OnAppClient")
            .field("base_url", &self.base_url.as_str())
            .field("user", &self.user)
            .finish_non_exhaustive()
    }
}

impl OnAppClient {
    /// Create a client from environment variables.
    ///
    /// Reads `ONAPP_URL`, `ONAPP_USER` and `ONAPP_API_KEY` (`ONAPP_PASSWORD`
    /// is accepted in place of the key). `ONAPP_TIMEOUT_SECS` optionally
    /// overrides the request timeout.
    ///
    /// # Errors
    ///
    /// Returns an error if a required variable is not set or the URL is invalid.
    pub fn from_env() -> Result<Self> {
        let base_url = required_env("ONAPP_URL")?;
        let user = required_env("ONAPP_USER")?;
        let api_key = env::var("ONAPP_API_KEY")
            .or_else(|_| env::var("ONAPP_PASSWORD"))
            .map_err(|_| {
                OnAppError::ConfigMissing(
                    "ONAPP_API_KEY environment variable not set".to_string(),
                )
            })?;

        let client = Self::new(&user, &api_key, &base_url)?;

        match env::var("ONAPP_TIMEOUT_SECS") {
            Ok(raw) => {
                let secs: u64 = raw.parse().map_err(|_| {
                    OnAppError::ConfigMissing(format!("ONAPP_TIMEOUT_SECS is not a number: {raw}"))
                })?;
                client.with_timeout(Duration::from_secs(secs))
            }
            Err(_) => Ok(client),
        }
    }

    /// Create a new client with the provided credentials and base URL.
    ///
    /// # Arguments
    ///
    /// * `user` - OnApp user login or e-mail
    /// * `api_key` - The user's API key
    /// * `base_url` - Control panel URL (e.g., `https://cp.example.com`)
    ///
    /// # Errors
    ///
    /// Returns an error if the base URL is invalid.
    pub fn new(user: &str, api_key: &str, base_url: &str) -> Result<Self> {
        let base_url_str = if base_url.ends_with('/') {
            base_url.to_string()
        } else {
            format!("{base_url}/")
        };

        let base_url = Url::parse(&base_url_str)?;

        Ok(Self {
            http: build_http(Duration::from_secs(DEFAULT_TIMEOUT_SECS))?,
            base_url: Arc::new(base_url),
            user: user.to_string(),
            api_key: api_key.to_string(),
        })
    }

    /// Return a copy of this client using a different request timeout.
    pub fn with_timeout(self, timeout: Duration) -> Result<Self> {
        Ok(Self {
            http: build_http(timeout)?,
            ..self
        })
    }

    /// Get the base URL.
    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Make a GET request.
    #[tracing::instrument(skip(self))]
    pub async fn get(&self, path: &str) -> Result<Response> {
        let url = self.base_url.join(path)?;

        let response = self
            .http
            .get(url)
            .basic_auth(&self.user, Some(&self.api_key))
            .send()
            .await
            .map_err(OnAppError::HttpError)?;

        Self::check_response(response).await
    }

    /// Make a GET request with query parameters.
    #[tracing::instrument(skip(self, query))]
    pub async fn get_with_query<Q: Serialize + ?Sized>(
        &self,
        path: &str,
        query: &Q,
    ) -> Result<Response> {
        let url = self.base_url.join(path)?;

        let response = self
            .http
            .get(url)
            .basic_auth(&self.user, Some(&self.api_key))
            .query(query)
            .send()
            .await
            .map_err(OnAppError::HttpError)?;

        Self::check_response(response).await
    }

    /// Make a PUT request with JSON body.
    #[tracing::instrument(skip(self, body))]
    pub async fn put<B: Serialize + ?Sized>(&self, path: &str, body: &B) -> Result<Response> {
        let url = self.base_url.join(path)?;

        let response = self
            .http
            .put(url)
            .basic_auth(&self.user, Some(&self.api_key))
            .json(body)
            .send()
            .await
            .map_err(OnAppError::HttpError)?;

        Self::check_response(response).await
    }

    /// Make a POST request with JSON body.
    #[tracing::instrument(skip(self, body))]
    pub async fn post<B: Serialize + ?Sized>(&self, path: &str, body: &B) -> Result<Response> {
        let url = self.base_url.join(path)?;

        let response = self
            .http
            .post(url)
            .basic_auth(&self.user, Some(&self.api_key))
            .json(body)
            .send()
            .await
            .map_err(OnAppError::HttpError)?;

        Self::check_response(response).await
    }

    /// Make a POST request without a body (used by action endpoints).
    #[tracing::instrument(skip(self))]
    pub async fn post_empty(&self, path: &str) -> Result<Response> {
        let url = self.base_url.join(path)?;

        let response = self
            .http
            .post(url)
            .basic_auth(&self.user, Some(&self.api_key))
            .send()
            .await
            .map_err(OnAppError::HttpError)?;

        Self::check_response(response).await
    }

    /// Make a DELETE request with query parameters.
    #[tracing::instrument(skip(self, query))]
    pub async fn delete<Q: Serialize + ?Sized>(&self, path: &str, query: &Q) -> Result<Response> {
        let url = self.base_url.join(path)?;

        let response = self
            .http
            .delete(url)
            .basic_auth(&self.user, Some(&self.api_key))
            .query(query)
            .send()
            .await
            .map_err(OnAppError::HttpError)?;

        Self::check_response(response).await
    }

    /// GET a single enveloped resource.
    pub async fn fetch<T: DeserializeOwned>(&self, path: &str, key: &'static str) -> Result<T> {
        let value: Value = self.get(path).await?.json().await?;
        envelope::unwrap_one(key, value)
    }

    /// GET a collection of enveloped resources.
    pub async fn fetch_list<T, Q>(&self, path: &str, key: &'static str, query: &Q) -> Result<Vec<T>>
    where
        T: DeserializeOwned,
        Q: Serialize + ?Sized,
    {
        let value: Value = self.get_with_query(path, query).await?.json().await?;
        envelope::unwrap_list(key, value)
    }

    /// POST `{key: body}` and unwrap the created resource.
    pub async fn create<B, T>(&self, path: &str, key: &'static str, body: &B) -> Result<T>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let wrapped = envelope::wrap(key, body)?;
        let value: Value = self.post(path, &wrapped).await?.json().await?;
        envelope::unwrap_one(key, value)
    }

    /// POST an un-enveloped body and unwrap the created resource.
    pub async fn create_raw<B, T>(&self, path: &str, key: &'static str, body: &B) -> Result<T>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let value: Value = self.post(path, body).await?.json().await?;
        envelope::unwrap_one(key, value)
    }

    /// PUT `{key: body}`. OnApp answers edits with an empty body.
    pub async fn edit<B: Serialize + ?Sized>(&self, path: &str, key: &str, body: &B) -> Result<()> {
        let wrapped = envelope::wrap(key, body)?;
        self.put(path, &wrapped).await?;
        Ok(())
    }

    /// DELETE a resource, passing `options` as query parameters.
    pub async fn remove<Q: Serialize + ?Sized>(&self, path: &str, options: &Q) -> Result<()> {
        self.delete(path, options).await?;
        Ok(())
    }

    /// Check response status and convert errors.
    async fn check_response(response: Response) -> Result<Response> {
        let status = response.status();

        if status.is_success() {
            return Ok(response);
        }

        tracing::debug!(%status, url = %response.url(), "OnApp request failed");

        match status {
            StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => {
                return Err(OnAppError::Unauthorized {
                    status_code: status.as_u16(),
                });
            }
            StatusCode::NOT_FOUND => {
                let path = response.url().path().to_string();
                return Err(OnAppError::NotFound {
                    entity_type: "Resource",
                    id: path,
                });
            }
            StatusCode::TOO_MANY_REQUESTS => {
                let retry_after = response
                    .headers()
                    .get("retry-after")
                    .and_then(|v| v.to_str().ok())
                    .and_then(|v| v.parse().ok());
                return Err(OnAppError::RateLimited {
                    retry_after_secs: retry_after,
                });
            }
            _ => {}
        }

        let message = match response.text().await {
            Ok(body) => error_message(&body).unwrap_or(body),
            Err(_) => format!("HTTP {status}"),
        };

        if status == StatusCode::UNPROCESSABLE_ENTITY {
            return Err(OnAppError::Validation(message));
        }

        Err(OnAppError::ApiError {
            message,
            status_code: Some(status.as_u16()),
        })
    }
}

fn required_env(name: &str) -> Result<String> {
    env::var(name)
        .map_err(|_| OnAppError::ConfigMissing(format!("{name} environment variable not set")))
}

fn build_http(timeout: Duration) -> Result<Client> {
    let mut headers = HeaderMap::new();
    headers.insert(ACCEPT, HeaderValue::from_static("application/json"));

    Client::builder()
        .user_agent(USER_AGENT)
        .default_headers(headers)
        .brotli(true)
        .gzip(true)
        .deflate(true)
        .timeout(timeout)
        .build()
        .map_err(OnAppError::HttpError)
}

/// Flatten an OnApp error body into a single message.
///
/// Handles `{"errors": {"field": ["msg"]}}`, `{"errors": ["msg"]}` and
/// `{"error": "msg"}`.
fn error_message(body: &str) -> Option<String> {
    let json: Value = serde_json::from_str(body).ok()?;

    if let Some(err) = json.get("error").and_then(Value::as_str) {
        return Some(err.to_string());
    }

    let messages: Vec<String> = match json.get("errors")? {
        Value::Array(items) => items.iter().map(value_text).collect(),
        Value::Object(fields) => fields
            .iter()
            .flat_map(|(field, msgs)| {
                let msgs = match msgs {
                    Value::Array(items) => items.iter().map(value_text).collect(),
                    other => vec![value_text(other)],
                };
                msgs.into_iter().map(move |m| {
                    if field == "base" {
                        m
                    } else {
                        format!("{field} {m}")
                    }
                })
            })
            .collect(),
        other => vec![value_text(other)],
    };

    if messages.is_empty() {
        None
    } else {
        Some(messages.join("; "))
    }
}

fn value_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_client_debug() {
        let client = OnAppClient::new("admin", "secret-key", "https://cp.example.com").unwrap();
        let debug = format!("{:?}", client);
        assert!(debug.contains("OnAppClient"));
        assert!(debug.contains("base_url"));
        // Key should not be in debug output
        assert!(!debug.contains("secret-key"));
    }

    #[test]
    fn test_base_url_trailing_slash() {
        let client1 = OnAppClient::new("u", "k", "https://cp.example.com/api").unwrap();
        let client2 = OnAppClient::new("u", "k", "https://cp.example.com/api/").unwrap();
        assert_eq!(client1.base_url().as_str(), client2.base_url().as_str());
    }

    #[test]
    fn test_invalid_base_url() {
        let err = OnAppClient::new("u", "k", "not a url").unwrap_err();
        assert!(matches!(err, OnAppError::UrlError(_)));
    }

    #[test]
    fn test_error_message_field_errors() {
        let body = r#"{"errors":{"label":["can't be blank"],"base":["Hypervisor is offline"]}}"#;
        let msg = error_message(body).unwrap();
        assert!(msg.contains("label can't be blank"));
        assert!(msg.contains("Hypervisor is offline"));
        assert!(!msg.contains("base "));
    }

    #[test]
    fn test_error_message_list_errors() {
        let body = r#"{"errors":["VM is locked","try later"]}"#;
        assert_eq!(error_message(body).unwrap(), "VM is locked; try later");
    }

    #[test]
    fn test_error_message_single_error() {
        assert_eq!(
            error_message(r#"{"error":"Access denied"}"#).unwrap(),
            "Access denied"
        );
    }

    #[test]
    fn test_error_message_not_json() {
        assert!(error_message("<html>oops</html>").is_none());
        assert!(error_message(r#"{"errors":[]}"#).is_none());
    }
}
