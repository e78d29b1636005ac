//! The router: fixed provider sequence plus cascading fallback

use log::{debug, error, info, trace, warn};
use std::sync::Arc;
use std::time::{Duration, Instant};

use crate::config::{NameMatching, RouterConfig};
use crate::error::Error;
use crate::failover::{resolve_sequence, summarize, Attempt, RouterResult};
use crate::providers::{self, Provider};
use crate::request::Request;

/// Dispatches one question across providers in priority order.
///
/// The sequence is resolved once at construction and never changes, so a
/// `Router` can be shared (e.g. behind an `Arc`) by concurrent callers.
/// Providers are tried one at a time; without a deadline the worst case
/// for one call is the sum of every provider's timeout.
pub struct Router
{   sequence: Vec<Arc<dyn Provider>>
  , deadline: Option<Duration>
}

impl Router
{   /// Build a router from the process environment
    pub fn from_env() -> Self
    {   Self::from_config(&RouterConfig::from_env())
    }

    pub fn from_config(config: &RouterConfig) -> Self
    {   let known = providers::registry(config);
        let router = Self::with_providers(
          &known,
          &config.provider_order,
          config.matching
        );
        match config.deadline
        {   Some(deadline) => router.with_deadline(deadline)
          , None => router
        }
    }

    /// Build a router over an explicit provider set
    pub fn with_providers(
      known: &[Arc<dyn Provider>]
    , order: &[String]
    , matching: NameMatching
    ) -> Self
    {   let sequence = resolve_sequence(known, order, matching);
        if sequence.is_empty()
        {   warn!("No providers configured; every route() will fail");
        } else
        {   info!(
              "Router sequence: {}",
              sequence.iter()
                .map(|p| p.name())
                .collect::<Vec<_>>()
                .join(" -> ")
            );
        }
        Router
        {   sequence
          , deadline: None
        }
    }

    /// Bound the whole cascade, not just each call
    pub fn with_deadline(mut self, deadline: Duration) -> Self
    {   self.deadline = Some(deadline);
        self
    }

    pub fn provider_names(&self) -> Vec<&str>
    {   self.sequence.iter().map(|p| p.name()).collect()
    }

    pub fn is_empty(&self) -> bool
    {   self.sequence.is_empty()
    }

    /// Answer `request` with the first provider that succeeds
    pub async fn route(&self, request: &Request)
      -> Result<RouterResult, Error>
    {   request.validate()?;
        if self.sequence.is_empty()
        {   error!("route() called with no providers configured");
            return Err(Error::NoProvidersConfigured);
        }

        let started = Instant::now();
        let mut attempts: Vec<Attempt> = Vec::new();
        let mut last_error = None;

        for (idx, provider) in self.sequence.iter().enumerate()
        {   let name = provider.name();
            debug!(
              "Trying {} ({}/{})",
              name, idx + 1, self.sequence.len()
            );
            if request.vision_image().is_some() && !provider.supports_vision()
            {   debug!("{} ignores the attached image", name);
            }

            let call_started = Instant::now();
            let outcome = match self.deadline
            {   Some(deadline) => {
                  let remaining = deadline.saturating_sub(started.elapsed());
                  match tokio::time::timeout(remaining, provider.call(request))
                    .await
                  {   Ok(outcome) => outcome
                    , Err(_) => Err(Error::DeadlineExceeded)
                  }
                }
              , None => provider.call(request).await
            };
            let latency_ms = call_started.elapsed().as_millis() as u64;

            match outcome
            {   Ok(response) => {
                  if idx > 0
                  {   info!(
                        "Answered by fallback provider {} after {} failure(s)",
                        name, idx
                      );
                  }
                  attempts.push(Attempt::succeeded(name, latency_ms));
                  trace!("Attempts: {}", summarize(&attempts));
                  return Ok(RouterResult::new(response, attempts));
                }
              , Err(err) => {
                  warn!("{} failed: {}", name, err);
                  let latency = err.call_completed().then_some(latency_ms);
                  attempts.push(Attempt::failed(name, &err, latency));
                  let stop = matches!(err, Error::DeadlineExceeded);
                  last_error = Some(err);
                  if stop
                  {   break;
                  }
                }
            }
        }

        let summary = summarize(&attempts);
        let last_error = last_error
          .map(|e| e.to_string())
          .unwrap_or_else(|| "unknown".to_string());
        error!("All providers failed: {}", summary);
        Err(Error::AllProvidersFailed
        {   last_error
          , summary
          , attempts
        })
    }
}

impl std::fmt::Debug for Router
{   fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result
    {   f.debug_struct("Router")
          .field("sequence", &self.provider_names())
          .field("deadline", &self.deadline)
          .finish()
    }
}
