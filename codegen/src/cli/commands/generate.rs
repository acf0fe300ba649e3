use super::Services;
use crate::cli::app::GenerateArgs;
use anyhow::{Result, bail};
use tracing::info;

/// Run one generation through the orchestrator and print the code
pub async fn execute(services: &Services, args: GenerateArgs) -> Result<()> {
    info!("Generating {} code from the command line", args.language);

    let outcome = match services.orchestrator.handle_request(&args.prompt, &args.language).await {
        Ok(outcome) => outcome,
        Err(e) => bail!("{e}"),
    };

    match outcome.generated_code() {
        Some(code) => {
            println!("{code}");
            eprintln!("Generated in {}ms", outcome.execution_time_ms());
            Ok(())
        }
        None => bail!("{}", outcome.error_message().unwrap_or("Code generation failed")),
    }
}
