//! Cascading-fallback router over interchangeable completion backends.
//!
//! One logical "answer this question" call is dispatched across several
//! text/vision backends in a configured priority order. The first backend
//! that produces an answer wins; every attempt is recorded.
//!
//! ```text
//! breedbot-router/
//! ├── src/
//! │   ├── lib.rs          # Re-exports and the known provider set
//! │   ├── error.rs        # Error kinds for calls and routing
//! │   ├── config.rs       # Environment-driven router configuration
//! │   ├── request.rs      # Unified request/response types
//! │   ├── providers/      # One adapter per backend
//! │   ├── failover.rs     # Attempt log and provider-name resolution
//! │   ├── client.rs       # The router itself
//! │   └── bin/ask.rs      # Command line entry point
//! └── tests/
//! ```

pub mod error;
pub mod config;
pub mod providers;
pub mod request;
pub mod failover;
pub mod client;

use serde::{Deserialize, Serialize};
use std::time::Duration;

pub use client::Router;
pub use config::{NameMatching, RouterConfig};
pub use error::Error;
pub use failover::{Attempt, RouterResult};
pub use providers::Provider;
pub use request::{Request, RequestContext, Response};

/// Every backend this crate knows how to talk to.
/// Registry order is also the order used to break ties when a
/// configured token matches more than one provider.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize, Hash)]
pub enum ProviderKind
{
  /// Groq (OpenAI-compatible, fast Llama hosting)
  Groq
  ,
  /// Together AI (OpenAI-compatible, hosts Llama vision models)
  Together
  ,
  /// Hugging Face Inference API (text generation only)
  HuggingFace
  ,
  /// Cohere chat API
  Cohere
  ,
  /// OpenRouter (unified API over many providers)
  OpenRouter
}

impl ProviderKind
{   pub const ALL: [ProviderKind; 5] = [
      ProviderKind::Groq
    , ProviderKind::Together
    , ProviderKind::HuggingFace
    , ProviderKind::Cohere
    , ProviderKind::OpenRouter
    ];

    /// Name reported in responses and attempt logs
    pub fn display_name(&self) -> &'static str
    {   match self
        {   ProviderKind::Groq => "Groq"
          , ProviderKind::Together => "Together AI"
          , ProviderKind::HuggingFace => "Hugging Face"
          , ProviderKind::Cohere => "Cohere"
          , ProviderKind::OpenRouter => "OpenRouter"
        }
    }

    fn env_prefix(&self) -> &'static str
    {   match self
        {   ProviderKind::Groq => "GROQ"
          , ProviderKind::Together => "TOGETHER"
          , ProviderKind::HuggingFace => "HUGGINGFACE"
          , ProviderKind::Cohere => "COHERE"
          , ProviderKind::OpenRouter => "OPENROUTER"
        }
    }

    /// Environment variables holding the credential, most preferred first
    pub fn credential_vars(&self) -> Vec<String>
    {   let mut vars = vec![format!("{}_API_KEY", self.env_prefix())];
        if *self == ProviderKind::HuggingFace
        {   vars.push("HF_TOKEN".to_string());
        }
        vars
    }

    pub fn base_url_var(&self) -> String
    {   format!("{}_BASE_URL", self.env_prefix())
    }

    pub fn timeout_var(&self) -> String
    {   format!("{}_TIMEOUT_MS", self.env_prefix())
    }

    pub fn default_base_url(&self) -> &'static str
    {   match self
        {   ProviderKind::Groq => "https://api.groq.com/openai/v1"
          , ProviderKind::Together => "https://api.together.xyz/v1"
          , ProviderKind::HuggingFace
              => "https://api-inference.huggingface.co"
          , ProviderKind::Cohere => "https://api.cohere.ai/v1"
          , ProviderKind::OpenRouter => "https://openrouter.ai/api/v1"
        }
    }

    /// Per-call budget; backends with slow vision or cold starts get more
    pub fn default_timeout(&self) -> Duration
    {   match self
        {   ProviderKind::Groq | ProviderKind::Cohere
              => Duration::from_secs(10)
          , ProviderKind::Together
          | ProviderKind::HuggingFace
          | ProviderKind::OpenRouter
              => Duration::from_secs(20)
        }
    }
}

impl std::fmt::Display for ProviderKind
{   fn fmt(&self, f: &mut std::fmt::Formatter<'_>)
      -> std::fmt::Result
    {   f.write_str(self.display_name())
    }
}
