use podcast_digest_lib::config::{Config, Secrets};
use podcast_digest_lib::logging::{init_logging, level_from_args};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args: Vec<String> = std::env::args().collect();

    let config = Config::load(None)?;
    init_logging(level_from_args(&args), &config.log_file)?;
    config.log_summary();

    let once = args.iter().any(|a| a == "--once");
    podcast_digest_lib::run_daemon(config, Secrets::from_env(), once).await
}
