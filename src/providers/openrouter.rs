//! OpenRouter provider
//!
//! OpenRouter asks callers to identify themselves with a referer and a
//! title; both are sent on every call.

use super::openai_compat::{OpenAiBackend, OpenAiCompatible, Profile};
use crate::ProviderKind;

#[derive(Debug, Clone, Copy)]
pub struct OpenRouter;

impl OpenAiBackend for OpenRouter
{   const PROFILE: Profile = Profile
    {   kind: ProviderKind::OpenRouter
      , text_model: "meta-llama/llama-3.2-3b-instruct:free"
      , vision_model: Some("meta-llama/llama-3.2-11b-vision-instruct:free")
      , default_max_tokens: 500
      , extra_headers: &[
          ("HTTP-Referer", "https://github.com/breedbot/breedbot-router")
        , ("X-Title", "Breedbot")
        ]
    };
}

pub type OpenRouterProvider = OpenAiCompatible<OpenRouter>;
