#![allow(dead_code)]

use std::cell::Cell;
use std::collections::VecDeque;
use std::io;
use std::rc::Rc;

use neural_chatgpt::{ChunkSource, Error};

/// The event stream recorded from a real gpt-3.5-turbo completion
pub fn recorded_stream() -> Vec<u8>
{   let chunk = |choice: &str| format!(
      "data: {{\"id\":\"chatcmpl-6tMwjovREOTA84MkGBOS5rWyj1izv\",\
       \"object\":\"chat.completion.chunk\",\"created\":1678654265,\
       \"model\":\"gpt-3.5-turbo-0301\",\"choices\":[{}]}}\n\n",
      choice
    );

    let mut body = String::new();
    body.push_str(&chunk(
      r#"{"delta":{"role":"assistant"},"index":0,"finish_reason":null}"#
    ));
    for content in [r#"\n\n"#, "This", " is", " a", " test", "."]
    {   body.push_str(&chunk(&format!(
          r#"{{"delta":{{"content":"{}"}},"index":0,"finish_reason":null}}"#,
          content
        )));
    }
    body.push_str(&chunk(
      r#"{"delta":{},"index":0,"finish_reason":"length"}"#
    ));
    body.push_str("data: [DONE]\n\n");
    body.into_bytes()
}

/// In-memory body that hands out pre-cut chunks
pub struct ChunkQueue
{   chunks: VecDeque<Vec<u8>>
  , reads: Rc<Cell<usize>>
  , dropped: Rc<Cell<bool>>
}

impl ChunkQueue
{   pub fn new(chunks: Vec<Vec<u8>>) -> Self
    {   ChunkQueue
        {   chunks: chunks.into()
          , reads: Rc::new(Cell::new(0))
          , dropped: Rc::new(Cell::new(false))
        }
    }

    /// Split `body` into pieces of at most `size` bytes
    pub fn split(body: &[u8], size: usize) -> Self
    {   Self::new(body.chunks(size).map(<[u8]>::to_vec).collect())
    }

    pub fn reads(&self) -> Rc<Cell<usize>>
    {   self.reads.clone()
    }

    pub fn dropped(&self) -> Rc<Cell<bool>>
    {   self.dropped.clone()
    }
}

impl ChunkSource for ChunkQueue
{   async fn next_chunk(&mut self) -> Result<Option<Vec<u8>>, Error>
    {   self.reads.set(self.reads.get() + 1);
        Ok(self.chunks.pop_front())
    }
}

impl Drop for ChunkQueue
{   fn drop(&mut self)
    {   self.dropped.set(true);
    }
}

/// Writer that records what was written between flushes
#[derive(Debug, Default)]
pub struct FlushLog
{   pending: Vec<u8>
  , pub flushed: Vec<String>
}

impl io::Write for FlushLog
{   fn write(&mut self, buf: &[u8]) -> io::Result<usize>
    {   self.pending.extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()>
    {   if !self.pending.is_empty()
        {   let text = String::from_utf8_lossy(&self.pending).into_owned();
            self.flushed.push(text);
            self.pending.clear();
        }
        Ok(())
    }
}

impl FlushLog
{   pub fn unflushed(&self) -> &[u8]
    {   &self.pending
    }
}

pub fn recorded_output() -> Vec<String>
{   ["\n\n", "This", " is", " a", " test", ".", "\n"]
      .iter()
      .map(|s| s.to_string())
      .collect()
}
