#![allow(dead_code)]

use async_trait::async_trait;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpListener;

use breedbot_router::{Error, Provider, Request, Response};

/// What a scripted provider does on every call
#[derive(Clone)]
pub enum Script
{   Answer(&'static str)
  , Fail(Error)
  , Slow(Duration)
}

/// In-process provider with a fixed outcome and a call counter
pub struct ScriptedProvider
{   name: &'static str
  , configured: bool
  , script: Script
  , calls: AtomicUsize
}

impl ScriptedProvider
{   pub fn new(name: &'static str, script: Script) -> Arc<Self>
    {   Arc::new(ScriptedProvider
        {   name
          , configured: true
          , script
          , calls: AtomicUsize::new(0)
        })
    }

    pub fn unconfigured(name: &'static str) -> Arc<Self>
    {   Arc::new(ScriptedProvider
        {   name
          , configured: false
          , script: Script::Answer("should never be used")
          , calls: AtomicUsize::new(0)
        })
    }

    pub fn calls(&self) -> usize
    {   self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Provider for ScriptedProvider
{   fn name(&self) -> &str
    {   self.name
    }

    fn is_configured(&self) -> bool
    {   self.configured
    }

    async fn call(&self, _request: &Request) -> Result<Response, Error>
    {   self.calls.fetch_add(1, Ordering::SeqCst);
        let content = match &self.script
        {   Script::Answer(text) => text.to_string()
          , Script::Fail(err) => return Err(err.clone())
          , Script::Slow(delay) => {
              tokio::time::sleep(*delay).await;
              format!("{} took its time", self.name)
            }
        };
        Ok(Response
        {   content
          , provider_name: self.name.to_string()
          , model: format!("{}-model", self.name.to_lowercase())
          , tokens_used: Some(10)
          , latency_ms: 1
        })
    }
}

pub fn as_dyn(providers: &[Arc<ScriptedProvider>]) -> Vec<Arc<dyn Provider>>
{   providers
      .iter()
      .map(|p| Arc::clone(p) as Arc<dyn Provider>)
      .collect()
}

pub fn order(raw: &str) -> Vec<String>
{   breedbot_router::config::parse_order(raw)
}

pub fn backend_error(status: u16) -> Error
{   Error::BackendError
    {   status
      , body: format!("status {}", status)
    }
}

/// Endpoint that accepts connections and never answers
pub async fn silent_endpoint() -> String
{   let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
      let mut held = Vec::new();
      while let Ok((socket, _)) = listener.accept().await
      {   held.push(socket);
      }
    });
    format!("http://{}", addr)
}

/// Endpoint nothing is listening on
pub async fn refused_endpoint() -> String
{   let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);
    format!("http://{}", addr)
}

pub fn init_logging()
{   let _ = env_logger::builder().is_test(true).try_init();
}
