use crate::cli::{load_config, ServeArgs};
use crate::server;
use std::path::Path;

pub async fn execute(args: ServeArgs, config_path: Option<&Path>) -> anyhow::Result<()> {
    let mut config = load_config(config_path)?;
    if let Some(host) = args.host {
        config.server.host = host;
    }
    if let Some(port) = args.port {
        config.server.port = port;
    }

    server::serve(&config).await?;
    Ok(())
}
