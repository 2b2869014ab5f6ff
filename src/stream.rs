//! Decoder for the server-sent event stream of a chat completion
//!
//! The body is a sequence of newline-delimited records. Records that start
//! with `data:` carry either a JSON chunk or the `[DONE]` sentinel; blank
//! lines and other SSE fields are skipped. Decoding is pull based: each
//! call to [`EventStream::next_event`] reads only as many bytes as it needs.

use std::collections::VecDeque;
use log::{debug, trace};
use serde::Deserialize;
use tokio::io::{AsyncRead, AsyncReadExt};

pub const DONE_SENTINEL: &str = "[DONE]";

const READ_BUFFER_SIZE: usize = 8 * 1024;

/// One decoded unit of the completion stream
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StreamEvent
{   /// Newly generated text
    Delta(String)
  , /// Record without content (role marker, empty delta)
    Empty
  , /// The `[DONE]` sentinel
    Done
  , /// A non-null `finish_reason`
    Finished(String)
}

impl StreamEvent
{   pub fn is_terminal(&self) -> bool
    {   matches!(self, StreamEvent::Done | StreamEvent::Finished(_))
    }
}

#[derive(Debug, Deserialize)]
struct ChunkPayload
{   #[serde(default)]
    choices: Vec<ChunkChoice>
}

#[derive(Debug, Deserialize)]
struct ChunkChoice
{   #[serde(default)]
    delta: Option<ChunkDelta>
  , #[serde(default)]
    finish_reason: Option<String>
}

#[derive(Debug, Deserialize)]
struct ChunkDelta
{   #[serde(default)]
    content: Option<String>
}

/// Source of raw body bytes, read one chunk at a time.
/// `Ok(None)` means the body is exhausted.
#[allow(async_fn_in_trait)]
pub trait ChunkSource
{   async fn next_chunk(&mut self)
      -> Result<Option<Vec<u8>>, crate::error::Error>;
}

impl ChunkSource for reqwest::Response
{   async fn next_chunk(&mut self)
      -> Result<Option<Vec<u8>>, crate::error::Error>
    {   self.chunk().await
          .map(|chunk| chunk.map(|bytes| bytes.to_vec()))
          .map_err(|e| crate::error::Error::Transport(e.to_string()))
    }
}

/// Adapts any async reader into a [`ChunkSource`]
pub struct ReadSource<R>
{   reader: R
}

impl<R> ReadSource<R>
{   pub fn new(reader: R) -> Self
    {   ReadSource { reader }
    }
}

impl<R: AsyncRead + Unpin> ChunkSource for ReadSource<R>
{   async fn next_chunk(&mut self)
      -> Result<Option<Vec<u8>>, crate::error::Error>
    {   let mut buf = vec![0u8; READ_BUFFER_SIZE];
        let read = self.reader.read(&mut buf).await?;
        if read == 0
        {   return Ok(None);
        }
        buf.truncate(read);
        Ok(Some(buf))
    }
}

/// Extract the payload of a `data:` record, if the line is one
pub fn data_payload(line: &str) -> Option<&str>
{   let line = line.strip_suffix('\r').unwrap_or(line);
    let rest = line.strip_prefix("data:")?;
    Some(rest.strip_prefix(' ').unwrap_or(rest))
}

/// Decode one record payload into the events it carries.
///
/// A chunk holding both content and a finish reason yields the delta
/// first, then the terminal event.
pub fn parse_payload(payload: &str)
  -> Result<Vec<StreamEvent>, crate::error::Error>
{   if payload == DONE_SENTINEL
    {   return Ok(vec![StreamEvent::Done]);
    }

    let chunk: ChunkPayload = serde_json::from_str(payload)
      .map_err(|e| {
        crate::error::Error::Stream(
          format!("malformed chunk ({}): {}", e, payload)
        )
      })?;

    let Some(choice) = chunk.choices.into_iter().next()
    else
    {   return Ok(vec![StreamEvent::Empty]);
    };

    let mut events = Vec::with_capacity(2);
    if let Some(content) = choice.delta.and_then(|d| d.content)
    {   if !content.is_empty()
        {   events.push(StreamEvent::Delta(content));
        }
    }
    if let Some(reason) = choice.finish_reason
    {   events.push(StreamEvent::Finished(reason));
    }
    if events.is_empty()
    {   events.push(StreamEvent::Empty);
    }
    Ok(events)
}

/// Lazy, non-restartable sequence of [`StreamEvent`]s over a body.
///
/// After a terminal event (or the end of the body) every further call
/// returns `Ok(None)` without touching the source again.
pub struct EventStream<S>
{   source: S
  , buffer: Vec<u8>
  , pending: VecDeque<StreamEvent>
  , source_closed: bool
  , finished: bool
}

impl<S: ChunkSource> EventStream<S>
{   pub fn new(source: S) -> Self
    {   EventStream
        {   source
          , buffer: Vec::new()
          , pending: VecDeque::new()
          , source_closed: false
          , finished: false
        }
    }

    /// Pull the next event, reading from the source only when needed
    pub async fn next_event(&mut self)
      -> Result<Option<StreamEvent>, crate::error::Error>
    {   loop
        {   if let Some(event) = self.pending.pop_front()
            {   if event.is_terminal()
                {   debug!("Stream terminated by {:?}", event);
                    self.finished = true;
                    self.pending.clear();
                }
                return Ok(Some(event));
            }

            if self.finished
            {   return Ok(None);
            }

            if let Some(line) = self.take_line()
            {   self.decode_line(&line)?;
                continue;
            }

            if self.source_closed
            {   if self.buffer.is_empty()
                {   debug!("Stream body closed");
                    self.finished = true;
                    return Ok(None);
                }
                let rest = std::mem::take(&mut self.buffer);
                self.decode_line(&String::from_utf8_lossy(&rest))?;
                continue;
            }

            match self.source.next_chunk().await?
            {   Some(chunk) => {
                  trace!("Read {} bytes from stream", chunk.len());
                  self.buffer.extend_from_slice(&chunk);
                }
              , None => self.source_closed = true
            }
        }
    }

    fn take_line(&mut self) -> Option<String>
    {   let end = self.buffer.iter().position(|b| *b == b'\n')?;
        let line: Vec<u8> = self.buffer.drain(..=end).collect();
        Some(String::from_utf8_lossy(&line[..end]).into_owned())
    }

    fn decode_line(&mut self, line: &str)
      -> Result<(), crate::error::Error>
    {   let Some(payload) = data_payload(line)
        else
        {   return Ok(());
        };
        if payload.is_empty()
        {   return Ok(());
        }
        trace!("Stream record: {}", payload);
        self.pending.extend(parse_payload(payload)?);
        Ok(())
    }
}
