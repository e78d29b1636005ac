use crate::failover::Attempt;

/// Custom error type for provider calls and routing.
/// Implements Clone so attempt histories can be copied into logs.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum Error
{   /// Provider has no credential; it never makes it into a sequence
    #[error("Missing API key for: {0}")]
    CredentialMissing(String)
  , /// Per-provider call deadline exceeded
    #[error("Timeout")]
    Timeout
  , /// Backend answered with a non-success status
    #[error("Backend error {status}: {body}")]
    BackendError
    {   status: u16
      , body: String
    }
  , /// Success status but no extractable content
    #[error("Malformed response: {0}")]
    MalformedResponse(String)
  , /// Transport failed before any status was received
    #[error("HTTP error: {0}")]
    HttpError(String)
  , /// Request rejected before any backend was contacted
    #[error("Invalid request: {0}")]
    InvalidRequest(String)
  , /// Overall routing deadline elapsed mid-attempt
    #[error("Overall deadline exceeded")]
    DeadlineExceeded
  , /// Attempt sequence is empty
    #[error("No providers configured")]
    NoProvidersConfigured
  , /// Every provider in the sequence failed
    #[error(
      "All providers failed. Last error: {last_error}. Attempts: {summary}"
    )]
    AllProvidersFailed
    {   last_error: String
      , summary: String
      , attempts: Vec<Attempt>
    }
}

impl Error
{   /// Whether the backend call ran to completion before failing.
    /// Only these failures carry a latency in the attempt log.
    pub fn call_completed(&self) -> bool
    {   matches!(
          self
        , Error::BackendError { .. } | Error::MalformedResponse(_)
        )
    }

    /// Attempt history of a propagated routing failure
    pub fn attempts(&self) -> &[Attempt]
    {   match self
        {   Error::AllProvidersFailed { attempts, .. } => attempts
          , _ => &[]
        }
    }

    pub(crate) fn from_transport(err: reqwest::Error) -> Self
    {   if err.is_timeout()
        {   Error::Timeout
        } else
        {   Error::HttpError(err.to_string())
        }
    }
}

#[cfg(test)]
mod tests
{   use super::*;

    #[test]
    fn timeout_displays_bare_kind()
    {   assert_eq!(Error::Timeout.to_string(), "Timeout");
    }

    #[test]
    fn backend_error_carries_status_and_body()
    {   let err = Error::BackendError
        {   status: 503
          , body: "overloaded".to_string()
        };
        assert_eq!(err.to_string(), "Backend error 503: overloaded");
        assert!(err.call_completed());
        assert!(!Error::Timeout.call_completed());
        assert!(!Error::HttpError("refused".into()).call_completed());
    }

    #[test]
    fn only_aggregate_failure_has_attempts()
    {   assert!(Error::NoProvidersConfigured.attempts().is_empty());
        let err = Error::AllProvidersFailed
        {   last_error: "Timeout".to_string()
          , summary: "Groq: Timeout".to_string()
          , attempts: vec![Attempt::failed("Groq", &Error::Timeout, None)]
        };
        assert_eq!(err.attempts().len(), 1);
    }
}
