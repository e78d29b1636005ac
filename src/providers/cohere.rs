//! Cohere chat provider

use async_trait::async_trait;
use log::{debug, trace};
use serde::{Deserialize, Serialize};
use std::time::Instant;

use super::{first_content, Endpoint, Provider, DEFAULT_TEMPERATURE};
use crate::error::Error;
use crate::request::{Request, Response};
use crate::ProviderKind;

const COHERE_MODEL: &str = "command-r";
const COHERE_MAX_TOKENS: u32 = 500;

// ===== Wire Types =====

#[derive(Debug, Clone, Serialize)]
pub struct CohereChatRequest
{   pub model: String
  , pub message: String
  , pub preamble: String
  , pub max_tokens: u32
  , pub temperature: f32
}

/// Both the v1 (`text`) and v2 (`message.content`) reply layouts
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CohereChatResponse
{   #[serde(default)]
    pub text: Option<String>
  , #[serde(default)]
    pub message: Option<CohereMessage>
  , #[serde(default)]
    pub meta: Option<CohereMeta>
  , #[serde(default)]
    pub usage: Option<CohereMeta>
}

#[derive(Debug, Clone, Deserialize)]
pub struct CohereMessage
{   #[serde(default)]
    pub content: Vec<CohereContent>
}

#[derive(Debug, Clone, Deserialize)]
pub struct CohereContent
{   #[serde(default)]
    pub text: Option<String>
}

#[derive(Debug, Clone, Deserialize)]
pub struct CohereMeta
{   pub billed_units: Option<BilledUnits>
}

#[derive(Debug, Clone, Deserialize)]
pub struct BilledUnits
{   pub input_tokens: Option<u32>
  , pub output_tokens: Option<u32>
}

impl CohereChatResponse
{   pub fn content(&self) -> Option<String>
    {   let v2 = self.message.as_ref().map(|m| {
          m.content
            .iter()
            .filter_map(|c| c.text.as_deref())
            .collect::<Vec<_>>()
            .join("")
        });
        first_content([self.text.clone(), v2])
    }

    pub fn tokens_used(&self) -> Option<u32>
    {   let billed = |m: &Option<CohereMeta>| {
          m.as_ref().and_then(|m| m.billed_units.clone())
        };
        billed(&self.meta)
          .or_else(|| billed(&self.usage))
          .and_then(|b| match (b.input_tokens, b.output_tokens)
          {   (None, None) => None
            , (i, o) => i.unwrap_or(0).checked_add(o.unwrap_or(0))
          })
    }
}

// ===== Provider =====

#[derive(Debug, Clone)]
pub struct CohereProvider
{   endpoint: Endpoint
}

impl CohereProvider
{   pub fn new(api_key: Option<String>) -> Self
    {   Self::from_endpoint(Endpoint::for_kind(ProviderKind::Cohere, api_key))
    }

    pub fn from_endpoint(endpoint: Endpoint) -> Self
    {   CohereProvider { endpoint }
    }

    pub fn with_base_url(mut self, url: impl Into<String>) -> Self
    {   self.endpoint = self.endpoint.with_base_url(url);
        self
    }

    pub fn build_request(&self, request: &Request) -> CohereChatRequest
    {   CohereChatRequest
        {   model: COHERE_MODEL.to_string()
          , message: request.user_text()
          , preamble: request.system_message().to_string()
          , max_tokens: request.max_tokens.unwrap_or(COHERE_MAX_TOKENS)
          , temperature: request.temperature
              .unwrap_or(DEFAULT_TEMPERATURE)
        }
    }
}

#[async_trait]
impl Provider for CohereProvider
{   fn name(&self) -> &str
    {   ProviderKind::Cohere.display_name()
    }

    fn is_configured(&self) -> bool
    {   self.endpoint.is_configured()
    }

    async fn call(&self, request: &Request) -> Result<Response, Error>
    {   let name = self.name();
        let api_key = self.endpoint.api_key(name)?;
        let payload = self.build_request(request);
        debug!("{} calling model {}", name, payload.model);
        trace!("{} request: {:?}", name, payload);

        let started = Instant::now();
        let reply: CohereChatResponse = self.endpoint
          .post_json(
            name,
            &format!("{}/chat", self.endpoint.base_url),
            &[("Authorization", format!("Bearer {}", api_key))],
            &payload
          )
          .await?;
        let latency_ms = started.elapsed().as_millis() as u64;

        let content = reply.content().ok_or_else(|| {
          Error::MalformedResponse(format!("{}: no text in reply", name))
        })?;

        Ok(Response
        {   content
          , provider_name: name.to_string()
          , model: payload.model
          , tokens_used: reply.tokens_used()
          , latency_ms
        })
    }
}
