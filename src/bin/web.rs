use podcast_digest_lib::config::{env_value, Config, Secrets};
use podcast_digest_lib::logging::{init_logging, level_from_args};
use std::net::SocketAddr;
use std::path::Path;

const DEFAULT_PORT: u16 = 5001;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args: Vec<String> = std::env::args().collect();

    let config = Config::load(None)?;
    init_logging(level_from_args(&args), &config.log_file)?;
    config.log_summary();

    let port: u16 = match env_value(Path::new("."), "PORT") {
        Some(p) => p.trim().parse()?,
        None => DEFAULT_PORT,
    };
    let addr: SocketAddr = format!("0.0.0.0:{}", port).parse()?;

    podcast_digest_lib::run_web(config, Secrets::from_env(), addr).await
}
