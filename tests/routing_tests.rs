mod common;

use mockito::Matcher;
use std::collections::HashMap;
use std::time::Duration;
use tokio_test::{assert_err, assert_ok};

use breedbot_router::{Error, ProviderKind, Request, Router, RouterConfig};

fn env(pairs: &[(&str, String)]) -> RouterConfig
{   let map: HashMap<String, String> = pairs
      .iter()
      .map(|(k, v)| (k.to_string(), v.clone()))
      .collect();
    RouterConfig::from_lookup(move |key: &str| map.get(key).cloned())
}

#[tokio::test]
async fn only_credentialed_provider_answers()
{   common::init_logging();
    let mut server = mockito::Server::new_async().await;
    let groq = server
      .mock("POST", "/chat/completions")
      .expect(0)
      .create_async()
      .await;
    let cohere = server
      .mock("POST", "/chat")
      .match_header("authorization", "Bearer co-live")
      .with_status(200)
      .with_body(r#"{"text":"Beagles stand 13 to 15 inches tall."}"#)
      .create_async()
      .await;

    let config = env(&[
      ("PROVIDER_ORDER", "groq,cohere".to_string())
    , ("COHERE_API_KEY", "co-live".to_string())
    , ("GROQ_BASE_URL", server.url())
    , ("COHERE_BASE_URL", server.url())
    ]);
    let router = Router::from_config(&config);
    assert_eq!(router.provider_names(), vec!["Cohere"]);

    let result = assert_ok!(
      router.route(&Request::new("How big is a Beagle?")).await
    );
    assert_eq!(result.content(), "Beagles stand 13 to 15 inches tall.");
    assert_eq!(result.provider_name(), "Cohere");
    assert_eq!(result.total_attempts, 1);
    assert_eq!(result.attempts[0].provider_name, "Cohere");
    assert!(result.attempts[0].success);

    groq.assert_async().await;
    cohere.assert_async().await;
}

#[tokio::test]
async fn timed_out_provider_falls_back_to_next()
{   let silent = common::silent_endpoint().await;
    let mut server = mockito::Server::new_async().await;
    let together = server
      .mock("POST", "/chat/completions")
      .match_header("authorization", "Bearer tg-live")
      .with_status(200)
      .with_body(r#"{"choices":[{"message":{"content":"Small hound."}}]}"#)
      .create_async()
      .await;

    let config = RouterConfig::default()
      .with_order("groq,together")
      .with_credential(ProviderKind::Groq, "gsk-live")
      .with_credential(ProviderKind::Together, "tg-live")
      .with_base_url(ProviderKind::Groq, silent)
      .with_timeout(ProviderKind::Groq, Duration::from_millis(150))
      .with_base_url(ProviderKind::Together, server.url());
    let router = Router::from_config(&config);

    let result = assert_ok!(router.route(&Request::new("Size?")).await);
    assert_eq!(result.provider_name(), "Together AI");
    assert_eq!(result.attempts.len(), 2);
    assert_eq!(result.attempts[0].provider_name, "Groq");
    assert!(!result.attempts[0].success);
    assert_eq!(result.attempts[0].error.as_deref(), Some("Timeout"));
    assert_eq!(result.attempts[1].provider_name, "Together AI");
    assert!(result.attempts[1].success);
    together.assert_async().await;
}

#[tokio::test]
async fn no_credentials_means_no_network_calls()
{   let mut server = mockito::Server::new_async().await;
    let any = server
      .mock("POST", Matcher::Any)
      .expect(0)
      .create_async()
      .await;

    let mut pairs = Vec::new();
    for kind in ProviderKind::ALL
    {   pairs.push((kind.base_url_var(), server.url()));
    }
    let pairs: Vec<(&str, String)> = pairs
      .iter()
      .map(|(k, v)| (k.as_str(), v.clone()))
      .collect();
    let router = Router::from_config(&env(&pairs));

    assert!(router.is_empty());
    let err = assert_err!(router.route(&Request::new("Size?")).await);
    assert_eq!(err, Error::NoProvidersConfigured);
    any.assert_async().await;
}

#[tokio::test]
async fn backend_errors_everywhere_exhaust_the_sequence()
{   let mut server = mockito::Server::new_async().await;
    let _openai_style = server
      .mock("POST", "/chat/completions")
      .with_status(500)
      .with_body("upstream exploded")
      .expect(2)
      .create_async()
      .await;
    let _cohere = server
      .mock("POST", "/chat")
      .with_status(401)
      .with_body("invalid api token")
      .create_async()
      .await;

    let mut config = RouterConfig::default()
      .with_order("openrouter, cohere, groq");
    for kind in [ProviderKind::OpenRouter, ProviderKind::Cohere, ProviderKind::Groq]
    {   config = config
          .with_credential(kind, "key")
          .with_base_url(kind, server.url());
    }
    let router = Router::from_config(&config);

    let err = assert_err!(router.route(&Request::new("Size?")).await);
    let names: Vec<&str> = err.attempts()
      .iter()
      .map(|a| a.provider_name.as_str())
      .collect();
    assert_eq!(names, vec!["OpenRouter", "Cohere", "Groq"]);
    assert!(err.attempts().iter().all(|a| a.latency_ms.is_some()));
    assert!(err.to_string().contains(
      "Last error: Backend error 500: upstream exploded"
    ));
    assert!(err.to_string().contains("Cohere: Backend error 401"));
}
