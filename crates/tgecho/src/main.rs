use std::{process::ExitCode, sync::Arc};

use anyhow::Context;
use tracing::{error, info};

use tgecho_core::{config::Config, ports::DeliverySink, relay::Relay};
use tgecho_telegram::{session, TelegramDelivery, TelegramFeed};

#[tokio::main]
async fn main() -> ExitCode {
    let cfg = Config::load();
    let verbose = cfg.as_ref().map(|c| c.debug).unwrap_or(false);
    if let Err(e) = tgecho_core::logging::init("tgecho", verbose) {
        eprintln!("{e}");
    }

    let result = match cfg {
        Ok(cfg) => run(cfg).await,
        Err(e) => Err(e.into()),
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{e:#}");
            ExitCode::FAILURE
        }
    }
}

async fn run(cfg: Config) -> anyhow::Result<()> {
    let connected = session::connect(&cfg).await?;
    session::announce(&connected);

    let mut feed = TelegramFeed::new(connected.bot.clone(), &cfg);
    feed.clear_webhook().await?;

    let sink: Arc<dyn DeliverySink> = Arc::new(TelegramDelivery::new(connected.bot));
    let mut relay = Relay::new(sink, std::io::stdout());

    tokio::select! {
        res = relay.run(&mut feed) => {
            res.context("relay stopped")?;
        }
        res = tokio::signal::ctrl_c() => {
            res.context("failed to listen for ctrl-c")?;
            info!("interrupted, shutting down");
        }
    }

    Ok(())
}
