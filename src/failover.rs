//! Attempt log and provider-name resolution for cascading fallback

use log::debug;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::config::NameMatching;
use crate::error::Error;
use crate::providers::Provider;
use crate::request::Response;

/// One provider invocation within a routed call
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Attempt
{   pub provider_name: String
  , pub success: bool
  , /// Present iff `success` is false
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>
  , /// Absent when the call failed before completing
    #[serde(skip_serializing_if = "Option::is_none")]
    pub latency_ms: Option<u64>
}

impl Attempt
{   pub fn succeeded(provider: &str, latency_ms: u64) -> Self
    {   Attempt
        {   provider_name: provider.to_string()
          , success: true
          , error: None
          , latency_ms: Some(latency_ms)
        }
    }

    pub fn failed(
      provider: &str
    , err: &Error
    , latency_ms: Option<u64>
    ) -> Self
    {   Attempt
        {   provider_name: provider.to_string()
          , success: false
          , error: Some(err.to_string())
          , latency_ms
        }
    }

    /// `provider: OK` or `provider: <error>`
    pub fn summary(&self) -> String
    {   match (&self.success, &self.error)
        {   (true, _) => format!("{}: OK", self.provider_name)
          , (false, Some(err)) => format!("{}: {}", self.provider_name, err)
          , (false, None) => format!("{}: failed", self.provider_name)
        }
    }
}

/// Compact, ordered summary of every attempt
pub fn summarize(attempts: &[Attempt]) -> String
{   attempts
      .iter()
      .map(Attempt::summary)
      .collect::<Vec<_>>()
      .join("; ")
}

/// Successful routed call with its full attempt history.
/// The last attempt is the successful one; all earlier ones failed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RouterResult
{   #[serde(flatten)]
    pub response: Response
  , pub attempts: Vec<Attempt>
  , pub total_attempts: usize
}

impl RouterResult
{   pub fn new(response: Response, attempts: Vec<Attempt>) -> Self
    {   let total_attempts = attempts.len();
        RouterResult
        {   response
          , attempts
          , total_attempts
        }
    }

    pub fn content(&self) -> &str
    {   &self.response.content
    }

    pub fn provider_name(&self) -> &str
    {   &self.response.provider_name
    }
}

/// Lowercase with all whitespace removed
pub fn normalize_name(name: &str) -> String
{   name.chars()
      .filter(|c| !c.is_whitespace())
      .flat_map(char::to_lowercase)
      .collect()
}

/// Whether a configured order token designates a provider name
pub fn names_match(token: &str, name: &str, matching: NameMatching) -> bool
{   let token = normalize_name(token);
    let name = normalize_name(name);
    if token.is_empty() || name.is_empty()
    {   return false;
    }
    match matching
    {   NameMatching::Substring
          => token.contains(&name) || name.contains(&token)
      , NameMatching::Exact => token == name
    }
}

/// Resolve `order` against `known` into the fixed attempt sequence.
/// Unresolved tokens, unconfigured providers and repeats are dropped;
/// surviving providers keep their configured relative order.
pub fn resolve_sequence(
  known: &[Arc<dyn Provider>]
, order: &[String]
, matching: NameMatching
) -> Vec<Arc<dyn Provider>>
{   let mut sequence: Vec<Arc<dyn Provider>> = Vec::new();
    for token in order
    {   let Some(provider) = known
          .iter()
          .find(|p| names_match(token, p.name(), matching))
        else
        {   debug!("No provider matches '{}'", token);
            continue;
        };
        if !provider.is_configured()
        {   debug!("Skipping {}: no credential", provider.name());
            continue;
        }
        if sequence.iter().any(|p| Arc::ptr_eq(p, provider))
        {   debug!("'{}' repeats {}", token, provider.name());
            continue;
        }
        sequence.push(Arc::clone(provider));
    }
    sequence
}
