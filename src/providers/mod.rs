//! Backend adapters and the registry of known providers

pub mod openai_compat;
pub mod groq;
pub mod together;
pub mod huggingface;
pub mod cohere;
pub mod openrouter;

pub use cohere::CohereProvider;
pub use groq::GroqProvider;
pub use huggingface::HuggingFaceProvider;
pub use openrouter::OpenRouterProvider;
pub use together::TogetherProvider;

use async_trait::async_trait;
use log::{debug, error, trace};
use serde::de::DeserializeOwned;
use std::sync::Arc;
use std::time::Duration;

use crate::config::RouterConfig;
use crate::error::Error;
use crate::request::{Request, Response};
use crate::ProviderKind;

/// Default sampling temperature when the request leaves it unset
pub const DEFAULT_TEMPERATURE: f32 = 0.7;

/// Capability contract every backend adapter implements
#[async_trait]
pub trait Provider: Send + Sync
{   /// Display name used for order matching and attempt logs
    fn name(&self) -> &str;

    /// Whether a credential is present
    fn is_configured(&self) -> bool;

    /// Whether image input is forwarded to the backend
    fn supports_vision(&self) -> bool
    {   false
    }

    /// Issue exactly one backend call for `request`
    async fn call(&self, request: &Request) -> Result<Response, Error>;
}

/// Instantiate every known provider from `config`.
/// One HTTP connection pool is shared by all of them.
pub fn registry(config: &RouterConfig) -> Vec<Arc<dyn Provider>>
{   let http = reqwest::Client::new();
    ProviderKind::ALL
      .iter()
      .map(|kind| build(*kind, config, http.clone()))
      .collect()
}

fn build(
  kind: ProviderKind
, config: &RouterConfig
, http: reqwest::Client
) -> Arc<dyn Provider>
{   let endpoint = Endpoint
    {   api_key: config.credential(kind)
      , base_url: config.base_url(kind)
      , timeout: config.timeout(kind)
      , http
    };
    debug!(
      "Registering {} at {} (configured: {})",
      kind, endpoint.base_url, endpoint.api_key.is_some()
    );
    match kind
    {   ProviderKind::Groq => Arc::new(GroqProvider::from_endpoint(endpoint))
      , ProviderKind::Together
          => Arc::new(TogetherProvider::from_endpoint(endpoint))
      , ProviderKind::HuggingFace
          => Arc::new(HuggingFaceProvider::from_endpoint(endpoint))
      , ProviderKind::Cohere
          => Arc::new(CohereProvider::from_endpoint(endpoint))
      , ProviderKind::OpenRouter
          => Arc::new(OpenRouterProvider::from_endpoint(endpoint))
    }
}

/// Where and how a provider reaches its backend
#[derive(Clone)]
pub struct Endpoint
{   pub api_key: Option<String>
  , pub base_url: String
  , pub timeout: Duration
  , pub http: reqwest::Client
}

impl Endpoint
{   /// Defaults for `kind` with the given credential
    pub fn for_kind(kind: ProviderKind, api_key: Option<String>) -> Self
    {   Endpoint
        {   api_key: api_key.filter(|k| !k.trim().is_empty())
          , base_url: kind.default_base_url().to_string()
          , timeout: kind.default_timeout()
          , http: reqwest::Client::new()
        }
    }

    pub fn with_base_url(mut self, url: impl Into<String>) -> Self
    {   self.base_url = url.into().trim_end_matches('/').to_string();
        self
    }

    pub fn is_configured(&self) -> bool
    {   self.api_key.is_some()
    }

    pub(crate) fn api_key(&self, provider: &str) -> Result<&str, Error>
    {   self.api_key.as_deref().ok_or_else(|| {
          error!("{} called without a credential", provider);
          Error::CredentialMissing(provider.to_string())
        })
    }

    /// POST `body` to `url` and decode the JSON reply as `T`.
    /// Transport, status and decode happen under one timeout.
    pub(crate) async fn post_json<B, T>(
      &self
    , provider: &str
    , url: &str
    , headers: &[(&str, String)]
    , body: &B
    ) -> Result<T, Error>
    where B: serde::Serialize + ?Sized
        , T: DeserializeOwned
    {   let mut builder = self.http.post(url).json(body);
        for (name, value) in headers
        {   builder = builder.header(*name, value.as_str());
        }

        let exchange = async {
          let response = builder
            .send()
            .await
            .map_err(Error::from_transport)?;

          let status = response.status();
          trace!("{} response status: {}", provider, status);

          if !status.is_success()
          {   let body = response.text().await
                .unwrap_or_else(|_| "Unknown error".to_string());
              return Err(Error::BackendError
              {   status: status.as_u16()
                , body
              });
          }

          let text = response.text().await
            .map_err(Error::from_transport)?;
          trace!("{} response body: {}", provider, text);
          serde_json::from_str::<T>(&text).map_err(|e| {
            Error::MalformedResponse(format!("{}: {}", provider, e))
          })
        };

        match tokio::time::timeout(self.timeout, exchange).await
        {   Ok(result) => result
          , Err(_) => {
              debug!("{} exceeded {:?}", provider, self.timeout);
              Err(Error::Timeout)
            }
        }
    }
}

impl std::fmt::Debug for Endpoint
{   fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result
    {   f.debug_struct("Endpoint")
          .field("base_url", &self.base_url)
          .field("timeout", &self.timeout)
          .field("configured", &self.api_key.is_some())
          .finish()
    }
}

/// First non-blank candidate, trimmed
pub(crate) fn first_content<I>(candidates: I) -> Option<String>
where I: IntoIterator<Item = Option<String>>
{   candidates
      .into_iter()
      .flatten()
      .map(|c| c.trim().to_string())
      .find(|c| !c.is_empty())
}
