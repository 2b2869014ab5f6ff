//! Completion providers

pub mod openai;

// Re-export for convenience
pub use openai::OpenAiClient;

/// Opens a streamed chat completion.
///
/// Failures carrying an HTTP status come back as
/// [`Error::Http`](crate::error::Error::Http); anything else is
/// left for the caller to treat as fatal.
#[allow(async_fn_in_trait)]
pub trait Completion
{   type Body: crate::stream::ChunkSource;

    async fn open_stream(
      &self
    , config: &crate::config::RequestConfig
    , prompt: &str
    ) -> Result<Self::Body, crate::error::Error>;
}
