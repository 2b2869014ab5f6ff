use std::fmt;
use std::io::{BufRead, Write};
use log::{debug, error, info};

use crate::classify::classify;
use crate::config::load_config;
use crate::error::Error;
use crate::providers::Completion;
use crate::stream::{ChunkSource, EventStream, StreamEvent};

pub const NEURAL_ERROR_PREFIX: &str = "Neural error: ";

/// How a run ended when it did not succeed
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Failure
{   /// Known condition, surfaced as a single-line message
    Reported(String)
  , /// Anything outside the known taxonomy, passed on unchanged
    Fatal(Error)
}

impl fmt::Display for Failure
{   fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result
    {   match self
        {   Failure::Reported(msg) => write!(f, "{}", msg)
          , Failure::Fatal(e) => write!(f, "{}", e)
        }
    }
}

impl std::error::Error for Failure {}

/// Drive one completion: read the request line, validate its config,
/// open the stream and copy every text fragment to `output`.
pub async fn run<R, C, W>(
  mut input: R
, completion: &C
, output: &mut W
) -> Result<(), Failure>
where R: BufRead
    , C: Completion
    , W: Write
{   let request = crate::Request::read_from(&mut input)
      .map_err(Failure::Fatal)?;

    let config = load_config(&request.config)
      .map_err(|e| match e
      {   Error::InvalidConfiguration(msg) => {
            debug!("Rejected config: {}", msg);
            Failure::Reported(msg)
          }
        , other => Failure::Fatal(other)
      })?;

    let prompt = request.prompt.as_str().ok_or_else(|| {
      Failure::Fatal(Error::InvalidInput(
        "request prompt is missing or not a string".to_string()
      ))
    })?;

    let body = completion.open_stream(&config, prompt)
      .await
      .map_err(intercept)?;

    let fragments = write_stream(body, output)
      .await
      .map_err(Failure::Fatal)?;
    info!("Completion finished after {} fragments", fragments);
    Ok(())
}

/// Classify HTTP failures that have a recognisable shape; leave the
/// rest fatal.
pub fn intercept(error: Error) -> Failure
{   match error
    {   Error::Http(failure) if failure.is_classifiable() => {
          let classified = classify(&failure);
          error!(
            "Request failed with status {}: {}",
            classified.status, classified.message
          );
          Failure::Reported(
            format!("{}{}", NEURAL_ERROR_PREFIX, classified.message)
          )
        }
      , other => {
          error!("Unclassified failure: {}", other);
          Failure::Fatal(other)
        }
    }
}

/// Write each text delta as it arrives, flushing after every write,
/// then a single trailing newline. Returns the number of fragments.
///
/// The body is dropped on every return path, including the early stop
/// on a finish reason.
pub async fn write_stream<S, W>(body: S, output: &mut W)
  -> Result<usize, Error>
where S: ChunkSource
    , W: Write
{   let mut events = EventStream::new(body);
    let mut fragments = 0;

    while let Some(event) = events.next_event().await?
    {   match event
        {   StreamEvent::Delta(text) => {
              output.write_all(text.as_bytes())?;
              output.flush()?;
              fragments += 1;
            }
          , StreamEvent::Empty => {}
          , StreamEvent::Done | StreamEvent::Finished(_) => break
        }
    }

    writeln!(output)?;
    output.flush()?;
    Ok(fragments)
}
