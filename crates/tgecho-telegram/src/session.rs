use std::{collections::VecDeque, time::Duration};

use async_trait::async_trait;
use teloxide::{prelude::*, types::Me};
use tracing::{debug, info, warn};

use tgecho_core::{
    config::Config, errors::Error, ports::UpdateFeed, update::Update, Result,
};

use crate::convert;

/// Extra headroom on top of the long-poll wait so the HTTP client does not abort
/// a `getUpdates` call before Telegram answers it.
const CLIENT_TIMEOUT_SLACK: Duration = Duration::from_secs(15);

/// An authenticated bot, verified with `getMe`.
pub struct Connected {
    pub bot: Bot,
    pub me: Me,
    pub via_proxy: bool,
}

/// Connect directly, falling back to the configured SOCKS5 proxy.
///
/// Fails when the direct attempt fails and no proxy is configured, or when the
/// proxied attempt fails too.
pub async fn connect(cfg: &Config) -> Result<Connected> {
    let direct = Bot::with_client(cfg.bot_token.clone(), http_client(cfg, None)?);
    let direct_err = match direct.get_me().await {
        Ok(me) => {
            return Ok(Connected {
                bot: direct,
                me,
                via_proxy: false,
            })
        }
        Err(e) => e,
    };

    let Some(proxy) = cfg.proxy_url.as_ref() else {
        return Err(Error::Transport(format!(
            "telegram connection failed: {direct_err}"
        )));
    };

    warn!(
        error = %direct_err,
        proxy = %redact(proxy),
        "direct connection failed, retrying through proxy"
    );

    let bot = Bot::with_client(cfg.bot_token.clone(), http_client(cfg, Some(proxy))?);
    let me = bot.get_me().await.map_err(|e| {
        Error::Transport(format!(
            "telegram connection through proxy {} failed: {e}",
            redact(proxy)
        ))
    })?;

    Ok(Connected {
        bot,
        me,
        via_proxy: true,
    })
}

fn http_client(cfg: &Config, proxy: Option<&reqwest::Url>) -> Result<reqwest::Client> {
    let mut builder =
        teloxide::net::default_reqwest_settings().timeout(cfg.poll_timeout + CLIENT_TIMEOUT_SLACK);

    if let Some(url) = proxy {
        let proxy = reqwest::Proxy::all(url.clone())
            .map_err(|e| Error::Transport(format!("invalid proxy {}: {e}", redact(url))))?;
        builder = builder.proxy(proxy);
    }

    builder
        .build()
        .map_err(|e| Error::Transport(format!("http client setup failed: {e}")))
}

/// Proxy URL with credentials stripped, for logs and error messages.
fn redact(url: &reqwest::Url) -> String {
    let mut out = url.clone();
    let _ = out.set_username("");
    let _ = out.set_password(None);
    out.to_string()
}

/// Long-poll `getUpdates` feed.
///
/// Fetches batches starting from offset 0 and yields them one update at a time.
/// The offset moves past a batch as soon as it is received, so Telegram drops
/// those updates on the next call. Failed fetches are retried after
/// `poll_retry_delay`; the feed never closes on its own.
pub struct TelegramFeed {
    bot: Bot,
    offset: i32,
    poll_timeout: Duration,
    retry_delay: Duration,
    pending: VecDeque<teloxide::types::Update>,
}

impl TelegramFeed {
    pub fn new(bot: Bot, cfg: &Config) -> Self {
        Self {
            bot,
            offset: 0,
            poll_timeout: cfg.poll_timeout,
            retry_delay: cfg.poll_retry_delay,
            pending: VecDeque::new(),
        }
    }

    /// Remove a configured webhook; Telegram refuses `getUpdates` while one is set.
    pub async fn clear_webhook(&self) -> Result<()> {
        let info = self
            .bot
            .get_webhook_info()
            .await
            .map_err(|e| Error::Transport(format!("failed to read webhook info: {e}")))?;
        let Some(url) = info.url else {
            return Ok(());
        };

        self.bot
            .delete_webhook()
            .await
            .map_err(|e| Error::Transport(format!("failed to clear webhook: {e}")))?;
        warn!(
            webhook = %webhook_origin(&url),
            pending = info.pending_update_count,
            "removed configured webhook to allow long polling"
        );
        Ok(())
    }

    async fn fetch(&mut self) {
        let timeout = u32::try_from(self.poll_timeout.as_secs()).unwrap_or(u32::MAX);
        let result = self
            .bot
            .get_updates()
            .offset(self.offset)
            .timeout(timeout)
            .await;

        match result {
            Ok(batch) => {
                debug!(offset = self.offset, count = batch.len(), "got telegram updates");
                self.offset = next_offset(self.offset, &batch);
                self.pending.extend(batch);
            }
            Err(e) => {
                let retry_in_ms = self.retry_delay.as_millis();
                warn!(error = %e, retry_in_ms, "failed to get updates, retrying");
                tokio::time::sleep(self.retry_delay).await;
            }
        }
    }
}

/// Scheme and host of a webhook URL; the path often carries a secret.
fn webhook_origin(url: &reqwest::Url) -> String {
    match url.host_str() {
        Some(host) => format!("{}://{host}", url.scheme()),
        None => url.scheme().to_string(),
    }
}

fn next_offset(current: i32, batch: &[teloxide::types::Update]) -> i32 {
    batch
        .iter()
        .map(|u| u.id.saturating_add(1))
        .fold(current, i32::max)
}

#[async_trait]
impl UpdateFeed for TelegramFeed {
    type Payload = serde_json::Value;

    async fn next_update(&mut self) -> Result<Option<Update<Self::Payload>>> {
        loop {
            if let Some(raw) = self.pending.pop_front() {
                let update = convert::to_core(raw);
                debug!(
                    update_id = update.id.0,
                    kind = update.kind.name(),
                    "received telegram update"
                );
                return Ok(Some(update));
            }
            self.fetch().await;
        }
    }
}

/// Log line announcing the authenticated account.
pub fn announce(connected: &Connected) {
    let username = connected.me.username();
    info!(
        via_proxy = connected.via_proxy,
        "authorized on account {username}"
    );
}
