// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

use anyhow::Result;
use clap::Parser;
use tracing::info;

use quest_tracker::config::ServerConfig;
use quest_tracker::database::Database;
use quest_tracker::logging;
use quest_tracker::server::TrackerServer;

#[derive(Parser, Debug)]
#[command(author, version, about = "Personal 10K training quest tracker", long_about = None)]
struct Args {
    /// Port for the HTTP surface; overrides the configured port
    #[arg(short, long)]
    port: Option<u16>,

    /// Path to a TOML configuration file
    #[arg(short, long)]
    config: Option<String>,

    /// Write the default configuration file and exit
    #[arg(long)]
    init_config: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    logging::init_from_env()?;

    let args = Args::parse();

    if args.init_config {
        let config = ServerConfig::default();
        config.save(args.config)?;
        info!("Wrote default configuration");
        return Ok(());
    }

    let config = ServerConfig::load(args.config)?;
    let port = args.port.unwrap_or(config.http_port);

    info!("Starting Quest Tracker Server on port {}", port);

    let database = Database::new(&config.database_url).await?;
    let server = TrackerServer::new(database).await?;

    server.run(port).await?;

    Ok(())
}
