use super::Services;
use crate::cli::app::StatsArgs;
use anyhow::Result;

/// Print statistics as pretty JSON
pub async fn execute(services: &Services, args: StatsArgs) -> Result<()> {
    let json = if args.detailed {
        serde_json::to_string_pretty(&services.stats.detailed().await)?
    } else {
        serde_json::to_string_pretty(&services.stats.summary().await)?
    };
    println!("{json}");
    Ok(())
}
