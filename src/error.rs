use std::fmt;

/// A non-2xx answer from the completion endpoint
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpFailure
{   /// HTTP status code
    pub status: u16
  , /// Response body, `None` when the server sent nothing
    pub body: Option<String>
}

impl HttpFailure
{   pub fn new(status: u16, body: Option<String>) -> Self
    {   HttpFailure
        {   status
          , body: body.filter(|b| !b.is_empty())
        }
    }

    /// Whether the failure has enough shape to be classified.
    /// A rate limit always does; anything else needs a body.
    pub fn is_classifiable(&self) -> bool
    {   self.status == 429 || self.body.is_some()
    }
}

/// Custom error type for neural-chatgpt operations
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Error
{   /// Caller supplied configuration was rejected
    InvalidConfiguration(String)
  , /// API returned a non-2xx response
    Http(HttpFailure)
  , /// Connection level failure without a status code
    Transport(String)
  , /// Event stream could not be decoded
    Stream(String)
  , /// Input line was not a request object
    InvalidInput(String)
  , /// Reading input or writing output failed
    Io(String)
}

impl fmt::Display for Error
{   fn fmt(&self, f: &mut fmt::Formatter<'_>)
      -> fmt::Result
    {   match self
        {   Error::InvalidConfiguration(msg) => {
              write!(f, "{}", msg)
            }
          , Error::Http(failure) => {
              write!(f, "HTTP error: status {}", failure.status)?;
              if let Some(body) = &failure.body
              {   write!(f, ": {}", body)?;
              }
              Ok(())
            }
          , Error::Transport(msg) => {
              write!(f, "Transport error: {}", msg)
            }
          , Error::Stream(msg) => {
              write!(f, "Stream error: {}", msg)
            }
          , Error::InvalidInput(msg) => {
              write!(f, "Invalid input: {}", msg)
            }
          , Error::Io(msg) => {
              write!(f, "I/O error: {}", msg)
            }
        }
    }
}

impl std::error::Error for Error {}

impl From<std::io::Error> for Error
{   fn from(e: std::io::Error) -> Self
    {   Error::Io(e.to_string())
    }
}

impl From<HttpFailure> for Error
{   fn from(failure: HttpFailure) -> Self
    {   Error::Http(failure)
    }
}
