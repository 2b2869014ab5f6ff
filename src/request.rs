//! Wire types for the outgoing chat completion request

use serde::{Deserialize, Serialize};
use serde_json::Number;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatMessage
{   pub role: String
  , pub content: String
}

/// Body posted to the chat completions endpoint
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatCompletionRequest
{   pub model: String
  , pub messages: Vec<ChatMessage>
  , #[serde(skip_serializing_if = "Option::is_none")]
    pub temperature: Option<Number>
  , #[serde(skip_serializing_if = "Option::is_none")]
    pub top_p: Option<Number>
  , #[serde(skip_serializing_if = "Option::is_none")]
    pub max_tokens: Option<Number>
  , #[serde(skip_serializing_if = "Option::is_none")]
    pub presence_penalty: Option<Number>
  , #[serde(skip_serializing_if = "Option::is_none")]
    pub frequency_penalty: Option<Number>
  , pub stream: bool
}

impl ChatCompletionRequest
{   /// Build a streaming request for a single user prompt
    pub fn streaming(
      config: &crate::config::RequestConfig
    , prompt: &str
    ) -> Self
    {   ChatCompletionRequest
        {   model: config.model.clone()
          , messages: vec![
              ChatMessage
              {   role: "user".to_string()
                , content: prompt.to_string()
              }
            ]
          , temperature: config.temperature.clone()
          , top_p: config.top_p.clone()
          , max_tokens: config.max_tokens.clone()
          , presence_penalty: config.presence_penalty.clone()
          , frequency_penalty: config.frequency_penalty.clone()
          , stream: true
        }
    }
}
