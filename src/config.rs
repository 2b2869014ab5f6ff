//! Configuration for the completion request and the HTTP provider

use std::fmt;
use log::{debug, warn};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Number, Value};

pub const DEFAULT_API_BASE: &str
  = "https://api.openai.com/v1";

pub const API_BASE_VAR: &str = "OPENAI_API_BASE";
pub const CONNECT_TIMEOUT_VAR: &str = "OPENAI_CONNECT_TIMEOUT_SECS";

/// Validated per-request model configuration.
///
/// Built fresh from the caller's `config` mapping by [`load_config`].
/// Tuning fields keep their JSON number form so an integer supplied by
/// the caller is sent back as an integer.
#[derive(Clone, PartialEq)]
pub struct RequestConfig
{   pub api_key: String
  , pub model: String
  , pub temperature: Option<Number>
  , pub top_p: Option<Number>
  , pub max_tokens: Option<Number>
  , pub presence_penalty: Option<Number>
  , pub frequency_penalty: Option<Number>
}

impl fmt::Debug for RequestConfig
{   fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result
    {   f.debug_struct("RequestConfig")
          .field("api_key", &"<redacted>")
          .field("model", &self.model)
          .field("temperature", &self.temperature)
          .field("top_p", &self.top_p)
          .field("max_tokens", &self.max_tokens)
          .field("presence_penalty", &self.presence_penalty)
          .field("frequency_penalty", &self.frequency_penalty)
          .finish()
    }
}

/// Validate the raw `config` value of a request.
///
/// Checks run in a fixed order and the first failure is returned:
/// shape, `api_key`, `model`, then each numeric tuning field.
pub fn load_config(raw: &Value)
  -> Result<RequestConfig, crate::error::Error>
{   let map = raw.as_object().ok_or_else(|| {
      crate::error::Error::InvalidConfiguration(
        "chatgpt config is not a dictionary".to_string()
      )
    })?;

    let config = RequestConfig
    {   api_key: required_string(map, "api_key")?
      , model: required_string(map, "model")?
      , temperature: optional_number(map, "temperature")?
      , top_p: optional_number(map, "top_p")?
      , max_tokens: optional_number(map, "max_tokens")?
      , presence_penalty: optional_number(map, "presence_penalty")?
      , frequency_penalty: optional_number(map, "frequency_penalty")?
    };

    debug!("Loaded config for model: {}", config.model);
    Ok(config)
}

fn required_string(
  map: &Map<String, Value>
, field: &str
) -> Result<String, crate::error::Error>
{   match map.get(field).and_then(Value::as_str)
    {   Some(value) if !value.is_empty() => Ok(value.to_string())
      , _ => Err(crate::error::Error::InvalidConfiguration(
          format!("chatgpt.{} is not defined", field)
        ))
    }
}

// null counts as not supplied
fn optional_number(
  map: &Map<String, Value>
, field: &str
) -> Result<Option<Number>, crate::error::Error>
{   match map.get(field)
    {   None | Some(Value::Null) => Ok(None)
      , Some(Value::Number(number)) => Ok(Some(number.clone()))
      , Some(_) => Err(crate::error::Error::InvalidConfiguration(
          format!("chatgpt.{} is invalid", field)
        ))
    }
}

/// Provider configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProviderConfig
{   /// API base URL, without the trailing endpoint path
    pub api_base: String
  , /// Connect timeout in seconds
    pub connect_timeout_secs: Option<u64>
}

impl Default for ProviderConfig
{   fn default() -> Self
    {   ProviderConfig
        {   api_base: DEFAULT_API_BASE.to_string()
          , connect_timeout_secs: None
        }
    }
}

impl ProviderConfig
{   /// Read provider settings from the process environment
    pub fn from_env() -> Self
    {   Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Read provider settings through an arbitrary variable lookup
    pub fn from_lookup<F>(lookup: F) -> Self
    where F: Fn(&str) -> Option<String>
    {   let mut config = ProviderConfig::default();

        if let Some(base) = lookup(API_BASE_VAR)
          .filter(|b| !b.trim().is_empty())
        {   config.api_base = base.trim().trim_end_matches('/').to_string();
        }

        if let Some(raw) = lookup(CONNECT_TIMEOUT_VAR)
        {   match raw.trim().parse::<u64>()
            {   Ok(secs) => config.connect_timeout_secs = Some(secs)
              , Err(_) => warn!(
                  "Ignoring {}={:?}: not a whole number of seconds",
                  CONNECT_TIMEOUT_VAR, raw
                )
            }
        }

        debug!("Provider config: {:?}", config);
        config
    }

    /// Full URL of the chat completions endpoint
    pub fn completions_url(&self) -> String
    {   format!("{}/chat/completions", self.api_base)
    }
}
