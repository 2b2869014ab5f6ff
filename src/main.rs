use std::io::{self, Write};
use std::process::ExitCode;
use log::{debug, warn};

use neural_chatgpt::{Failure, OpenAiClient, ProviderConfig};

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<ExitCode, neural_chatgpt::Error>
{   env_logger::Builder::from_env(
      env_logger::Env::default().default_filter_or("warn")
    ).init();

    let client = OpenAiClient::new(ProviderConfig::from_env())?;

    let stdin = io::stdin();
    let stdout = io::stdout();
    let mut output = stdout.lock();

    match neural_chatgpt::run(stdin.lock(), &client, &mut output).await
    {   Ok(()) => Ok(ExitCode::SUCCESS)
      , Err(Failure::Reported(message)) => {
          debug!("Exiting with reported failure");
          if let Err(e) = output.flush()
          {   warn!("Failed to flush output: {}", e);
          }
          eprintln!("{}", message);
          Ok(ExitCode::FAILURE)
        }
      , Err(Failure::Fatal(error)) => Err(error)
    }
}
