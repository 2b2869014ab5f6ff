//! Classification of failed completion requests into user-facing messages

use std::fmt;
use std::io;
use log::debug;
use serde::Serialize;
use serde_json::ser::Formatter;
use serde_json::Value;

pub const RATE_LIMIT_MESSAGE: &str = "OpenAI request limit reached!";
pub const FAILURE_PREFIX: &str = "OpenAI request failure: ";
pub const TOO_MUCH_TEXT_MESSAGE: &str = "Too much text for a request!";

const CONTEXT_LENGTH_MARKER: &str = "maximum context length is";

/// Outcome of classifying an [`HttpFailure`](crate::error::HttpFailure)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClassifiedError
{   pub status: u16
  , pub message: String
}

impl fmt::Display for ClassifiedError
{   fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result
    {   write!(f, "{}", self.message)
    }
}

/// Map a failed response to a message. Never fails: a body that does
/// not parse is reported as raw text.
pub fn classify(failure: &crate::error::HttpFailure) -> ClassifiedError
{   if failure.status == 429
    {   debug!("Classified status 429 as rate limit");
        return ClassifiedError
        {   status: failure.status
          , message: RATE_LIMIT_MESSAGE.to_string()
        };
    }

    let body = failure.body.as_deref().unwrap_or("");
    let detail = match serde_json::from_str::<Value>(body)
    {   Err(_) => body.to_string()
      , Ok(value) => {
          let message = value.get("error")
            .and_then(|error| error.get("message"))
            .and_then(Value::as_str);
          match message
          {   Some(m) if m.contains(CONTEXT_LENGTH_MARKER) => {
                TOO_MUCH_TEXT_MESSAGE.to_string()
              }
            , Some(m) => m.to_string()
            , None => to_spaced_json(&value)
          }
        }
    };

    debug!("Classified status {}", failure.status);
    ClassifiedError
    {   status: failure.status
      , message: format!("{}{}", FAILURE_PREFIX, detail)
    }
}

/// Serialise with `", "` and `": "` separators, e.g. `{"error": {}}`
pub fn to_spaced_json(value: &Value) -> String
{   let mut out = Vec::new();
    let mut serializer = serde_json::Serializer::with_formatter(
      &mut out,
      SpacedFormatter
    );
    match value.serialize(&mut serializer)
    {   Ok(()) => String::from_utf8(out)
          .unwrap_or_else(|_| value.to_string())
      , Err(_) => value.to_string()
    }
}

struct SpacedFormatter;

impl Formatter for SpacedFormatter
{   fn begin_array_value<W>(&mut self, writer: &mut W, first: bool)
      -> io::Result<()>
    where W: ?Sized + io::Write
    {   if first { Ok(()) } else { writer.write_all(b", ") }
    }

    fn begin_object_key<W>(&mut self, writer: &mut W, first: bool)
      -> io::Result<()>
    where W: ?Sized + io::Write
    {   if first { Ok(()) } else { writer.write_all(b", ") }
    }

    fn begin_object_value<W>(&mut self, writer: &mut W)
      -> io::Result<()>
    where W: ?Sized + io::Write
    {   writer.write_all(b": ")
    }
}
