use super::Services;
use crate::cli::app::ServeArgs;
use crate::server;
use anyhow::Result;
use codegen_core::config::ServerConfig;

/// Run the HTTP API until Ctrl+C
pub async fn execute(services: Services, config: &ServerConfig, args: ServeArgs) -> Result<()> {
    let host = args.host.unwrap_or_else(|| config.host.clone());
    let port = args.port.unwrap_or(config.port);
    server::start_server(services, &host, port).await
}
