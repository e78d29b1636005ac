//! Together AI provider

use super::openai_compat::{OpenAiBackend, OpenAiCompatible, Profile};
use crate::ProviderKind;

#[derive(Debug, Clone, Copy)]
pub struct Together;

impl OpenAiBackend for Together
{   const PROFILE: Profile = Profile
    {   kind: ProviderKind::Together
      , text_model: "meta-llama/Llama-3.2-3B-Instruct-Turbo"
      , vision_model: Some("meta-llama/Llama-3.2-11B-Vision-Instruct-Turbo")
      , default_max_tokens: 500
      , extra_headers: &[]
    };
}

pub type TogetherProvider = OpenAiCompatible<Together>;
