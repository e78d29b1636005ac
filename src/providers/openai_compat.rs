//! Shared adapter for backends speaking the OpenAI chat-completions format.
//!
//! Groq, Together AI and OpenRouter differ only in endpoint, models,
//! timeout and a few extra headers, all captured in a [`Profile`]. Each
//! one is a marker type implementing [`OpenAiBackend`].

use async_trait::async_trait;
use log::{debug, trace};
use serde::{Deserialize, Serialize};
use std::marker::PhantomData;
use std::time::Instant;

use super::{first_content, Endpoint, Provider, DEFAULT_TEMPERATURE};
use crate::error::Error;
use crate::request::{ContentPart, MessageContent, Request, Response};
use crate::ProviderKind;

const CHAT_PATH: &str = "/chat/completions";

// ===== Wire Types =====

#[derive(Debug, Clone, Serialize)]
pub struct WireMessage
{   pub role: &'static str
  , pub content: WireContent
}

#[derive(Debug, Clone, Serialize)]
#[serde(untagged)]
pub enum WireContent
{   Text(String)
  , Parts(Vec<WirePart>)
}

#[derive(Debug, Clone, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum WirePart
{   Text { text: String }
  , ImageUrl { image_url: ImageRef }
}

#[derive(Debug, Clone, Serialize)]
pub struct ImageRef
{   pub url: String
}

#[derive(Debug, Clone, Serialize)]
pub struct ChatCompletionRequest
{   pub model: String
  , pub messages: Vec<WireMessage>
  , pub max_tokens: u32
  , pub temperature: f32
}

#[derive(Debug, Clone, Deserialize)]
pub struct ChatCompletionResponse
{   #[serde(default)]
    pub choices: Vec<Choice>
  , pub usage: Option<Usage>
}

#[derive(Debug, Clone, Deserialize)]
pub struct Choice
{   pub message: Option<ReplyMessage>
}

#[derive(Debug, Clone, Deserialize)]
pub struct ReplyMessage
{   pub content: Option<ReplyContent>
}

/// Content arrives either as a plain string or as typed parts
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum ReplyContent
{   Text(String)
  , Parts(Vec<ReplyPart>)
}

#[derive(Debug, Clone, Deserialize)]
pub struct ReplyPart
{   #[serde(default)]
    pub text: Option<String>
}

#[derive(Debug, Clone, Deserialize)]
pub struct Usage
{   pub total_tokens: Option<u32>
}

impl ChatCompletionResponse
{   /// Text of the first choice: string content first, then text parts
    pub fn content(&self) -> Option<String>
    {   let content = self.choices
          .first()
          .and_then(|c| c.message.as_ref())
          .and_then(|m| m.content.as_ref());
        let as_text = match content
        {   Some(ReplyContent::Text(text)) => Some(text.clone())
          , _ => None
        };
        let as_parts = match content
        {   Some(ReplyContent::Parts(parts)) => Some(
              parts
                .iter()
                .filter_map(|p| p.text.as_deref())
                .collect::<Vec<_>>()
                .join("")
            )
          , _ => None
        };
        first_content([as_text, as_parts])
    }

    pub fn tokens_used(&self) -> Option<u32>
    {   self.usage.as_ref().and_then(|u| u.total_tokens)
    }
}

// ===== Adapter =====

/// Fixed identity of one OpenAI-style backend
#[derive(Debug, Clone, Copy)]
pub struct Profile
{   pub kind: ProviderKind
  , pub text_model: &'static str
  , pub vision_model: Option<&'static str>
  , pub default_max_tokens: u32
  , pub extra_headers: &'static [(&'static str, &'static str)]
}

/// Marker for a backend speaking the chat-completions format
pub trait OpenAiBackend: Send + Sync + 'static
{   const PROFILE: Profile;
}

/// Provider for any [`OpenAiBackend`]
pub struct OpenAiCompatible<B>
{   endpoint: Endpoint
  , backend: PhantomData<B>
}

impl<B: OpenAiBackend> OpenAiCompatible<B>
{   pub fn new(api_key: Option<String>) -> Self
    {   Self::from_endpoint(Endpoint::for_kind(B::PROFILE.kind, api_key))
    }

    pub fn from_endpoint(endpoint: Endpoint) -> Self
    {   OpenAiCompatible
        {   endpoint
          , backend: PhantomData
        }
    }

    pub fn with_base_url(mut self, url: impl Into<String>) -> Self
    {   self.endpoint = self.endpoint.with_base_url(url);
        self
    }

    /// Vision model when an image is attached and supported
    pub fn model_for(&self, request: &Request) -> &'static str
    {   match (B::PROFILE.vision_model, request.vision_image())
        {   (Some(vision), Some(_)) => vision
          , _ => B::PROFILE.text_model
        }
    }

    pub fn build_request(&self, request: &Request) -> ChatCompletionRequest
    {   let messages = request
          .messages(self.supports_vision())
          .into_iter()
          .map(|m| WireMessage
          {   role: m.role.as_str()
            , content: to_wire(m.content)
          })
          .collect();
        ChatCompletionRequest
        {   model: self.model_for(request).to_string()
          , messages
          , max_tokens: request.max_tokens
              .unwrap_or(B::PROFILE.default_max_tokens)
          , temperature: request.temperature
              .unwrap_or(DEFAULT_TEMPERATURE)
        }
    }
}

impl<B> Clone for OpenAiCompatible<B>
{   fn clone(&self) -> Self
    {   OpenAiCompatible
        {   endpoint: self.endpoint.clone()
          , backend: PhantomData
        }
    }
}

impl<B: OpenAiBackend> std::fmt::Debug for OpenAiCompatible<B>
{   fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result
    {   f.debug_struct("OpenAiCompatible")
          .field("name", &B::PROFILE.kind.display_name())
          .field("text_model", &B::PROFILE.text_model)
          .field("vision_model", &B::PROFILE.vision_model)
          .field("endpoint", &self.endpoint)
          .finish()
    }
}

#[async_trait]
impl<B: OpenAiBackend> Provider for OpenAiCompatible<B>
{   fn name(&self) -> &str
    {   B::PROFILE.kind.display_name()
    }

    fn is_configured(&self) -> bool
    {   self.endpoint.is_configured()
    }

    fn supports_vision(&self) -> bool
    {   B::PROFILE.vision_model.is_some()
    }

    async fn call(&self, request: &Request) -> Result<Response, Error>
    {   let name = self.name();
        let api_key = self.endpoint.api_key(name)?;
        let payload = self.build_request(request);
        debug!("{} calling model {}", name, payload.model);
        trace!("{} request: {:?}", name, payload);

        let mut headers = vec![
          ("Authorization", format!("Bearer {}", api_key))
        ];
        headers.extend(
          B::PROFILE.extra_headers
            .iter()
            .map(|(k, v)| (*k, v.to_string()))
        );

        let started = Instant::now();
        let reply: ChatCompletionResponse = self.endpoint
          .post_json(
            name,
            &format!("{}{}", self.endpoint.base_url, CHAT_PATH),
            &headers,
            &payload
          )
          .await?;
        let latency_ms = started.elapsed().as_millis() as u64;

        let content = reply.content().ok_or_else(|| {
          Error::MalformedResponse(format!("{}: no content in reply", name))
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

fn to_wire(content: MessageContent) -> WireContent
{   match content
    {   MessageContent::Text(text) => WireContent::Text(text)
      , MessageContent::Parts(parts) => WireContent::Parts(
          parts
            .into_iter()
            .map(|p| match p
            {   ContentPart::Text { text } => WirePart::Text { text }
              , ContentPart::ImageUrl { url }
                  => WirePart::ImageUrl { image_url: ImageRef { url } }
            })
            .collect()
        )
    }
}
