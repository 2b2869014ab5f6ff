use std::time::Duration;
use log::{debug, trace, error};

use crate::config::{ProviderConfig, RequestConfig};
use crate::error::{Error, HttpFailure};
use crate::request::ChatCompletionRequest;

/// HTTP client for the OpenAI chat completions endpoint
pub struct OpenAiClient
{   settings: ProviderConfig
  , http_client: reqwest::Client
}

impl OpenAiClient
{   pub fn new(settings: ProviderConfig) -> Result<Self, Error>
    {   debug!("Creating OpenAiClient for {}", settings.api_base);
        let mut builder = reqwest::Client::builder();
        if let Some(secs) = settings.connect_timeout_secs
        {   builder = builder.connect_timeout(Duration::from_secs(secs));
        }
        let http_client = builder.build()
          .map_err(|e| {
            error!("Failed to build HTTP client: {}", e);
            Error::Transport(e.to_string())
          })?;

        Ok(OpenAiClient
        {   settings
          , http_client
        })
    }
}

impl super::Completion for OpenAiClient
{   type Body = reqwest::Response;

    async fn open_stream(
      &self
    , config: &RequestConfig
    , prompt: &str
    ) -> Result<Self::Body, Error>
    {   debug!("Opening completion stream for: {}", config.model);

        let request = ChatCompletionRequest::streaming(config, prompt);
        trace!("Completion request: {:?}", request);

        let response = self.http_client
          .post(self.settings.completions_url())
          .header("Authorization", format!("Bearer {}", config.api_key))
          .header("Content-Type", "application/json")
          .header("Accept", "text/event-stream")
          .json(&request)
          .send()
          .await
          .map_err(|e| {
            error!("HTTP error: {}", e);
            Error::Transport(e.to_string())
          })?;

        let status = response.status();
        trace!("Completion response status: {}", status);

        if !status.is_success()
        {   // body is readable once; a failed read counts as no body
            let body = response.text().await.ok();
            error!("OpenAI API error {}: {:?}", status, body);
            return Err(HttpFailure::new(status.as_u16(), body).into());
        }

        Ok(response)
    }
}
