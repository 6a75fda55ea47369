pub mod config;
pub mod dedup;
pub mod error;
pub mod filter;
pub mod logging;
pub mod models;
pub mod notify;
pub mod pipeline;
pub mod render;
pub mod scheduler;
pub mod sources;
pub mod summarize;
pub mod web;
pub mod writer;

use config::{Config, Secrets};
use notify::SmtpNotifier;
use pipeline::{Collector, DailyDigestJob, Pipeline};
use scheduler::{Job, Scheduler};
use sources::HttpTransport;
use std::net::SocketAddr;
use std::sync::Arc;
use summarize::OpenAiClient;

/// Daily digest daemon: one run now, then every interval until Ctrl-C.
/// With `once` it returns after the first run.
pub async fn run_daemon(config: Config, secrets: Secrets, once: bool) -> anyhow::Result<()> {
    let transport = Arc::new(HttpTransport::new());
    let notifier = Arc::new(SmtpNotifier::new(
        config.smtp.clone(),
        secrets.email_user,
        secrets.email_pass,
    ));
    let job = Arc::new(DailyDigestJob::new(Pipeline::new(&config, transport, notifier)));

    if once {
        job.run().await?;
        return Ok(());
    }

    let scheduler = Scheduler::new(job, config.schedule.start_at()?, config.schedule.interval());
    let cancel = scheduler.cancel_token();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            log::info!("Interrupt received, stopping scheduler");
            cancel.cancel();
        }
    });

    scheduler.run().await;
    Ok(())
}

/// Web front-end on `addr`.
pub async fn run_web(config: Config, secrets: Secrets, addr: SocketAddr) -> anyhow::Result<()> {
    let collector = Arc::new(Collector::new(&config, Arc::new(HttpTransport::new())));
    let summarizer = Arc::new(OpenAiClient::new(config.llm.clone(), secrets.openai_api_key));
    web::serve(addr, web::AppState::new(collector, summarizer)).await
}
