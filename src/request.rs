//! Unified request and response types

use serde::{Deserialize, Serialize};

/// Persona used when the caller does not supply a system prompt
pub const DEFAULT_SYSTEM_PROMPT: &str
  = "You are a friendly and knowledgeable dog breed expert. \
     Answer questions about dog breeds, their temperament, care, \
     health and history accurately and concisely.";

/// Grounding for a question about one subject
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RequestContext
{   pub subject_name: Option<String>
  , pub subject_category: Option<String>
  , pub image_url: Option<String>
  , #[serde(default)]
    pub use_vision: bool
}

/// Unified question request
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Request
{   /// The question text; must not be blank
    pub prompt: String
  , /// Optional system message, defaults to the breed expert persona
    pub system_prompt: Option<String>
  , /// Max tokens to generate
    pub max_tokens: Option<u32>
  , /// Temperature for sampling
    pub temperature: Option<f32>
  , pub context: Option<RequestContext>
}

impl Request
{   pub fn new(prompt: impl Into<String>) -> Self
    {   Request
        {   prompt: prompt.into()
          , system_prompt: None
          , max_tokens: None
          , temperature: None
          , context: None
        }
    }

    pub fn with_system_prompt(mut self, system: impl Into<String>)
      -> Self
    {   self.system_prompt = Some(system.into());
        self
    }

    pub fn with_max_tokens(mut self, max_tokens: u32) -> Self
    {   self.max_tokens = Some(max_tokens);
        self
    }

    pub fn with_temperature(mut self, temperature: f32) -> Self
    {   self.temperature = Some(temperature);
        self
    }

    pub fn with_context(mut self, context: RequestContext) -> Self
    {   self.context = Some(context);
        self
    }

    pub fn validate(&self) -> Result<(), crate::error::Error>
    {   if self.prompt.trim().is_empty()
        {   return Err(crate::error::Error::InvalidRequest(
              "prompt must not be empty".to_string()
            ));
        }
        Ok(())
    }

    pub fn system_message(&self) -> &str
    {   self.system_prompt
          .as_deref()
          .filter(|s| !s.trim().is_empty())
          .unwrap_or(DEFAULT_SYSTEM_PROMPT)
    }

    /// Prompt prefixed with the subject clause when a subject is known
    pub fn user_text(&self) -> String
    {   let subject = self.context.as_ref().and_then(|c| {
          c.subject_name.as_deref()
            .filter(|n| !n.trim().is_empty())
            .map(|n| (n, c.subject_category.as_deref()))
        });
        match subject
        {   Some((name, Some(category))) if !category.trim().is_empty()
              => format!(
                "The user is asking about the {} ({}). {}",
                name, category, self.prompt
              )
          , Some((name, _))
              => format!(
                "The user is asking about the {}. {}",
                name, self.prompt
              )
          , None => self.prompt.clone()
        }
    }

    /// Image to attach, only when the caller asked for vision
    pub fn vision_image(&self) -> Option<&str>
    {   self.context.as_ref()
          .filter(|c| c.use_vision)
          .and_then(|c| c.image_url.as_deref())
          .filter(|url| !url.trim().is_empty())
    }

    /// System and user messages in backend-neutral form.
    /// The image part is included only if `vision` is supported.
    pub fn messages(&self, vision: bool) -> Vec<ChatMessage>
    {   let user = match self.vision_image().filter(|_| vision)
        {   Some(url) => MessageContent::Parts(vec![
              ContentPart::Text { text: self.user_text() }
            , ContentPart::ImageUrl { url: url.to_string() }
            ])
          , None => MessageContent::Text(self.user_text())
        };
        vec![
          ChatMessage
          {   role: Role::System
            , content: MessageContent::Text(
                self.system_message().to_string()
              )
          }
        , ChatMessage
          {   role: Role::User
            , content: user
          }
        ]
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role
{   System
  , User
}

impl Role
{   pub fn as_str(&self) -> &'static str
    {   match self
        {   Role::System => "system"
          , Role::User => "user"
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum ContentPart
{   Text { text: String }
  , ImageUrl { url: String }
}

#[derive(Debug, Clone, PartialEq)]
pub enum MessageContent
{   Text(String)
  , Parts(Vec<ContentPart>)
}

impl MessageContent
{   /// Text portion only; image parts are dropped
    pub fn text(&self) -> String
    {   match self
        {   MessageContent::Text(text) => text.clone()
          , MessageContent::Parts(parts) => parts
              .iter()
              .filter_map(|p| match p
              {   ContentPart::Text { text } => Some(text.as_str())
                , ContentPart::ImageUrl { .. } => None
              })
              .collect::<Vec<_>>()
              .join("\n")
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ChatMessage
{   pub role: Role
  , pub content: MessageContent
}

/// Unified answer
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Response
{   /// Generated text, never empty
    pub content: String
  , /// Provider that generated it
    pub provider_name: String
  , /// Model that generated it
    pub model: String
  , /// Tokens used, when the backend reports them
    pub tokens_used: Option<u32>
  , /// Wall-clock time of the backend call
    pub latency_ms: u64
}

#[cfg(test)]
mod tests
{   use super::*;

    fn beagle_context() -> RequestContext
    {   RequestContext
        {   subject_name: Some("Beagle".to_string())
          , subject_category: Some("Hound".to_string())
          , image_url: Some("https://img.example/beagle.jpg".to_string())
          , use_vision: true
        }
    }

    #[test]
    fn default_persona_applies_without_system_prompt()
    {   let request = Request::new("How big is a Beagle?");
        assert_eq!(request.system_message(), DEFAULT_SYSTEM_PROMPT);

        let custom = request.with_system_prompt("Be brief.");
        assert_eq!(custom.system_message(), "Be brief.");
    }

    #[test]
    fn subject_clause_prefixes_prompt()
    {   let request = Request::new("How much exercise?")
          .with_context(beagle_context());
        assert_eq!(
          request.user_text(),
          "The user is asking about the Beagle (Hound). How much exercise?"
        );

        let no_category = Request::new("Shedding?")
          .with_context(RequestContext
          {   subject_name: Some("Pug".to_string())
            , ..Default::default()
          });
        assert_eq!(
          no_category.user_text(),
          "The user is asking about the Pug. Shedding?"
        );
    }

    #[test]
    fn image_attached_only_for_vision_capable_callers()
    {   let request = Request::new("What breed is this?")
          .with_context(beagle_context());

        let with_vision = request.messages(true);
        assert_eq!(with_vision.len(), 2);
        assert_eq!(with_vision[0].role, Role::System);
        match &with_vision[1].content
        {   MessageContent::Parts(parts) => {
              assert_eq!(parts.len(), 2);
              assert_eq!(
                parts[1],
                ContentPart::ImageUrl {
                  url: "https://img.example/beagle.jpg".to_string()
                }
              );
            }
          , other => panic!("expected parts, got {:?}", other)
        }

        let text_only = request.messages(false);
        assert!(matches!(text_only[1].content, MessageContent::Text(_)));
    }

    #[test]
    fn use_vision_false_ignores_image()
    {   let mut context = beagle_context();
        context.use_vision = false;
        let request = Request::new("Size?").with_context(context);
        assert!(request.vision_image().is_none());
    }

    #[test]
    fn blank_prompt_is_rejected()
    {   assert!(Request::new("   ").validate().is_err());
        assert!(Request::new("Hi").validate().is_ok());
    }
}
