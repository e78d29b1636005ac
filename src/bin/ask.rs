//! Ask one question through the router.
//!
//! ```text
//! GROQ_API_KEY=... ask "How big is a Beagle?" [--breed Beagle] [--group Hound]
//!   [--image URL]
//! ```

use log::{debug, error};
use std::process::ExitCode;

use breedbot_router::{Request, RequestContext, Router};

fn parse_args(args: Vec<String>) -> Result<Request, String>
{   let mut prompt: Option<String> = None;
    let mut context = RequestContext::default();
    let mut iter = args.into_iter();
    while let Some(arg) = iter.next()
    {   let mut value = |flag: &str| {
          iter.next().ok_or_else(|| format!("{} needs a value", flag))
        };
        match arg.as_str()
        {   "--breed" => context.subject_name = Some(value("--breed")?)
          , "--group" => context.subject_category = Some(value("--group")?)
          , "--image" => {
              context.image_url = Some(value("--image")?);
              context.use_vision = true;
            }
          , _ if prompt.is_none() => prompt = Some(arg.clone())
          , _ => return Err(format!("unexpected argument: {}", arg))
        }
    }

    let prompt = prompt.ok_or_else(|| "usage: ask <question>".to_string())?;
    let request = Request::new(prompt);
    if context == RequestContext::default()
    {   Ok(request)
    } else
    {   Ok(request.with_context(context))
    }
}

#[tokio::main]
async fn main() -> ExitCode
{   env_logger::init();

    let request = match parse_args(std::env::args().skip(1).collect())
    {   Ok(request) => request
      , Err(msg) => {
          eprintln!("{}", msg);
          return ExitCode::from(2);
        }
    };

    let router = Router::from_env();
    debug!("Using {:?}", router);

    match router.route(&request).await
    {   Ok(result) => {
          println!("{}", result.content());
          eprintln!(
            "-- {} ({}), {} attempt(s)",
            result.provider_name(),
            result.response.model,
            result.total_attempts
          );
          ExitCode::SUCCESS
        }
      , Err(err) => {
          for attempt in err.attempts()
          {   error!("{}", attempt.summary());
          }
          eprintln!("Could not get an answer: {}", err);
          ExitCode::FAILURE
        }
    }
}
