//! Hugging Face Inference API provider (text generation only)

use async_trait::async_trait;
use log::{debug, trace};
use serde::{Deserialize, Serialize};
use std::time::{Duration, Instant};

use super::{first_content, Endpoint, Provider, DEFAULT_TEMPERATURE};
use crate::error::Error;
use crate::request::{Request, Response, Role};
use crate::ProviderKind;

const HF_MODEL: &str = "mistralai/Mistral-7B-Instruct-v0.3";
const HF_MAX_NEW_TOKENS: u32 = 300;

// ===== Wire Types =====

#[derive(Debug, Clone, Serialize)]
pub struct GenerationRequest
{   pub inputs: String
  , pub parameters: GenerationParameters
}

#[derive(Debug, Clone, Serialize)]
pub struct GenerationParameters
{   pub max_new_tokens: u32
  , pub temperature: f32
  , pub return_full_text: bool
}

#[derive(Debug, Clone, Deserialize)]
pub struct Generation
{   #[serde(default)]
    pub generated_text: Option<String>
}

/// The inference API wraps generations in an array for most models and
/// returns a bare object for some
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum GenerationReply
{   Batch(Vec<Generation>)
  , Single(Generation)
}

impl GenerationReply
{   pub fn content(&self) -> Option<String>
    {   let batch = match self
        {   GenerationReply::Batch(items) => items
              .first()
              .and_then(|g| g.generated_text.clone())
          , GenerationReply::Single(_) => None
        };
        let single = match self
        {   GenerationReply::Single(g) => g.generated_text.clone()
          , GenerationReply::Batch(_) => None
        };
        first_content([batch, single])
    }
}

// ===== Provider =====

#[derive(Debug, Clone)]
pub struct HuggingFaceProvider
{   endpoint: Endpoint
}

impl HuggingFaceProvider
{   pub fn new(api_key: Option<String>) -> Self
    {   Self::from_endpoint(
          Endpoint::for_kind(ProviderKind::HuggingFace, api_key)
        )
    }

    pub fn from_endpoint(endpoint: Endpoint) -> Self
    {   HuggingFaceProvider { endpoint }
    }

    pub fn with_base_url(mut self, url: impl Into<String>) -> Self
    {   self.endpoint = self.endpoint.with_base_url(url);
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self
    {   self.endpoint.timeout = timeout;
        self
    }

    /// Flatten the conversation into one instruction prompt
    pub fn build_request(&self, request: &Request) -> GenerationRequest
    {   let mut system = String::new();
        let mut user = String::new();
        for message in request.messages(false)
        {   match message.role
            {   Role::System => system = message.content.text()
              , Role::User => user = message.content.text()
            }
        }
        GenerationRequest
        {   inputs: format!("<s>[INST] {}\n\n{} [/INST]", system, user)
          , parameters: GenerationParameters
            {   max_new_tokens: request.max_tokens
                  .unwrap_or(HF_MAX_NEW_TOKENS)
              , temperature: request.temperature
                  .unwrap_or(DEFAULT_TEMPERATURE)
              , return_full_text: false
            }
        }
    }
}

#[async_trait]
impl Provider for HuggingFaceProvider
{   fn name(&self) -> &str
    {   ProviderKind::HuggingFace.display_name()
    }

    fn is_configured(&self) -> bool
    {   self.endpoint.is_configured()
    }

    async fn call(&self, request: &Request) -> Result<Response, Error>
    {   let name = self.name();
        let api_key = self.endpoint.api_key(name)?;
        let payload = self.build_request(request);
        debug!("{} calling model {}", name, HF_MODEL);
        trace!("{} request: {:?}", name, payload);

        let started = Instant::now();
        let reply: GenerationReply = self.endpoint
          .post_json(
            name,
            &format!("{}/models/{}", self.endpoint.base_url, HF_MODEL),
            &[("Authorization", format!("Bearer {}", api_key))],
            &payload
          )
          .await?;
        let latency_ms = started.elapsed().as_millis() as u64;

        let content = reply.content().ok_or_else(|| {
          Error::MalformedResponse(
            format!("{}: no generated_text in reply", name)
          )
        })?;

        Ok(Response
        {   content
          , provider_name: name.to_string()
          , model: HF_MODEL.to_string()
          , tokens_used: None
          , latency_ms
        })
    }
}
