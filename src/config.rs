//! Configuration for provider ordering and credentials

use log::{debug, warn};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::time::Duration;

use crate::ProviderKind;

/// Order used when `PROVIDER_ORDER` is unset or blank
pub const DEFAULT_PROVIDER_ORDER: &str
  = "groq,together,huggingface,cohere,openrouter";

/// How configured order tokens are matched against provider names
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NameMatching
{   /// Token contains the name or the name contains the token
    #[default]
    Substring
  , /// Normalized token equals the normalized name
    Exact
}

impl NameMatching
{   fn parse(raw: &str) -> Option<Self>
    {   match raw.trim().to_lowercase().as_str()
        {   "substring" | "" => Some(NameMatching::Substring)
          , "exact" => Some(NameMatching::Exact)
          , _ => None
        }
    }
}

/// Router configuration, resolved once at construction
#[derive(Clone, Serialize, Deserialize)]
pub struct RouterConfig
{   /// Provider name tokens in priority order
    pub provider_order: Vec<String>
  , /// Credentials for the providers that have one
    #[serde(default, skip_serializing)]
    pub credentials: HashMap<ProviderKind, String>
  , /// Endpoint overrides
    pub base_urls: HashMap<ProviderKind, String>
  , /// Per-call timeout overrides
    pub timeouts: HashMap<ProviderKind, Duration>
  , pub matching: NameMatching
  , /// Optional bound on one whole routed call
    pub deadline: Option<Duration>
}

impl Default for RouterConfig
{   fn default() -> Self
    {   RouterConfig
        {   provider_order: parse_order(DEFAULT_PROVIDER_ORDER)
          , credentials: HashMap::new()
          , base_urls: HashMap::new()
          , timeouts: HashMap::new()
          , matching: NameMatching::default()
          , deadline: None
        }
    }
}

impl RouterConfig
{   /// Read configuration from the process environment
    pub fn from_env() -> Self
    {   Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Read configuration through an arbitrary key lookup
    pub fn from_lookup<F>(lookup: F) -> Self
    where F: Fn(&str) -> Option<String>
    {   let value = |key: &str| {
          lookup(key)
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty())
        };

        let provider_order = value("PROVIDER_ORDER")
          .map(|raw| parse_order(&raw))
          .filter(|order| !order.is_empty())
          .unwrap_or_else(|| parse_order(DEFAULT_PROVIDER_ORDER));

        let matching = match value("PROVIDER_MATCHING")
        {   Some(raw) => NameMatching::parse(&raw).unwrap_or_else(|| {
              warn!(
                "Unknown PROVIDER_MATCHING '{}', using substring",
                raw
              );
              NameMatching::Substring
            })
          , None => NameMatching::Substring
        };

        let mut credentials = HashMap::new();
        let mut base_urls = HashMap::new();
        let mut timeouts = HashMap::new();
        for kind in ProviderKind::ALL
        {   if let Some(key) = kind.credential_vars()
              .iter()
              .find_map(|var| value(var.as_str()))
            {   credentials.insert(kind, key);
            }
            if let Some(url) = value(kind.base_url_var().as_str())
            {   base_urls.insert(kind, url);
            }
            if let Some(ms) = value(kind.timeout_var().as_str())
              .and_then(|raw| parse_millis(&kind.timeout_var(), &raw))
            {   timeouts.insert(kind, ms);
            }
        }

        let deadline = value("ROUTER_DEADLINE_MS")
          .and_then(|raw| parse_millis("ROUTER_DEADLINE_MS", &raw));

        debug!(
          "Router config: order={:?}, matching={:?}, {} credential(s)",
          provider_order, matching, credentials.len()
        );

        RouterConfig
        {   provider_order
          , credentials
          , base_urls
          , timeouts
          , matching
          , deadline
        }
    }

    pub fn with_order(mut self, order: &str) -> Self
    {   self.provider_order = parse_order(order);
        self
    }

    pub fn with_credential(
      mut self
    , kind: ProviderKind
    , key: impl Into<String>
    ) -> Self
    {   self.credentials.insert(kind, key.into());
        self
    }

    pub fn with_base_url(
      mut self
    , kind: ProviderKind
    , url: impl Into<String>
    ) -> Self
    {   self.base_urls.insert(kind, url.into());
        self
    }

    pub fn with_timeout(mut self, kind: ProviderKind, timeout: Duration)
      -> Self
    {   self.timeouts.insert(kind, timeout);
        self
    }

    pub fn with_matching(mut self, matching: NameMatching) -> Self
    {   self.matching = matching;
        self
    }

    pub fn with_deadline(mut self, deadline: Duration) -> Self
    {   self.deadline = Some(deadline);
        self
    }

    pub fn credential(&self, kind: ProviderKind) -> Option<String>
    {   self.credentials
          .get(&kind)
          .filter(|key| !key.trim().is_empty())
          .cloned()
    }

    pub fn base_url(&self, kind: ProviderKind) -> String
    {   self.base_urls
          .get(&kind)
          .map(|url| url.trim_end_matches('/').to_string())
          .unwrap_or_else(|| kind.default_base_url().to_string())
    }

    pub fn timeout(&self, kind: ProviderKind) -> Duration
    {   self.timeouts
          .get(&kind)
          .copied()
          .unwrap_or_else(|| kind.default_timeout())
    }
}

impl std::fmt::Debug for RouterConfig
{   fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result
    {   let credentialed: Vec<ProviderKind> = ProviderKind::ALL
          .into_iter()
          .filter(|kind| self.credential(*kind).is_some())
          .collect();
        f.debug_struct("RouterConfig")
          .field("provider_order", &self.provider_order)
          .field("credentials", &credentialed)
          .field("base_urls", &self.base_urls)
          .field("timeouts", &self.timeouts)
          .field("matching", &self.matching)
          .field("deadline", &self.deadline)
          .finish()
    }
}

/// Split a comma-separated order, dropping blank tokens
pub fn parse_order(raw: &str) -> Vec<String>
{   raw.split(',')
      .map(str::trim)
      .filter(|token| !token.is_empty())
      .map(str::to_string)
      .collect()
}

fn parse_millis(var: &str, raw: &str) -> Option<Duration>
{   match raw.parse::<u64>()
    {   Ok(ms) if ms > 0 => Some(Duration::from_millis(ms))
      , _ => {
          warn!("Ignoring {}: '{}' is not a positive integer", var, raw);
          None
        }
    }
}
