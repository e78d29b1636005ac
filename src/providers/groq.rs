//! Groq provider (Llama models behind an OpenAI-compatible API)

use super::openai_compat::{OpenAiBackend, OpenAiCompatible, Profile};
use crate::ProviderKind;

#[derive(Debug, Clone, Copy)]
pub struct Groq;

impl OpenAiBackend for Groq
{   const PROFILE: Profile = Profile
    {   kind: ProviderKind::Groq
      , text_model: "llama-3.1-8b-instant"
      , vision_model: Some("meta-llama/llama-4-scout-17b-16e-instruct")
      , default_max_tokens: 500
      , extra_headers: &[]
    };
}

pub type GroqProvider = OpenAiCompatible<Groq>;
