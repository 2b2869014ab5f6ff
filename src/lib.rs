//! neural-chatgpt: stream a ChatGPT completion to standard output.
//!
//! One JSON request is read from input:
//!
//! ```json
//! {"config": {"api_key": "...", "model": "gpt-3.5-turbo"}, "prompt": "..."}
//! ```
//!
//! The config is validated ([`config::load_config`]), the completion is
//! requested with streaming enabled ([`providers::OpenAiClient`]), the
//! event stream is decoded ([`stream::EventStream`]) and each text
//! fragment is printed the moment it arrives ([`client::run`]). Remote
//! failures are turned into short messages by [`classify::classify`].

pub mod error;
pub mod config;
pub mod providers;
pub mod request;
pub mod stream;
pub mod classify;
pub mod client;

use std::io::BufRead;
use log::trace;
use serde::Deserialize;
use serde_json::Value;

pub use classify::{classify, ClassifiedError};
pub use client::{run, Failure};
pub use config::{load_config, ProviderConfig, RequestConfig};
pub use error::{Error, HttpFailure};
pub use providers::{Completion, OpenAiClient};
pub use stream::{ChunkSource, EventStream, StreamEvent};

/// Top level input object, one per invocation.
///
/// Both fields are kept untyped here; `config` is validated before
/// `prompt` is looked at, so a malformed config always produces the
/// validator's message.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Request
{   #[serde(default)]
    pub config: Value
  , #[serde(default)]
    pub prompt: Value
}

impl Request
{   /// Parse a request from one line of JSON
    pub fn parse(line: &str) -> Result<Self, Error>
    {   serde_json::from_str(line.trim())
          .map_err(|e| Error::InvalidInput(e.to_string()))
    }

    /// Read exactly one line from `input` and parse it
    pub fn read_from<R: BufRead>(input: &mut R) -> Result<Self, Error>
    {   let mut line = String::new();
        input.read_line(&mut line)?;
        trace!("Read request line of {} bytes", line.len());
        Self::parse(&line)
    }
}
