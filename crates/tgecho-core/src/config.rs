use std::{env, fs, path::Path, time::Duration};

use reqwest::Url;

use crate::{errors::Error, Result};

const DEFAULT_POLL_TIMEOUT_SECS: u64 = 30;
const DEFAULT_POLL_RETRY_DELAY_MS: u64 = 3_000;

/// Typed process configuration, read once at startup.
#[derive(Clone, Debug)]
pub struct Config {
    pub bot_token: String,
    /// SOCKS5 endpoint used when a direct connection to the Bot API fails.
    pub proxy_url: Option<Url>,
    /// Long-poll wait per `getUpdates` call.
    pub poll_timeout: Duration,
    /// Pause after a failed `getUpdates` call.
    pub poll_retry_delay: Duration,
    pub debug: bool,
}

impl Config {
    pub fn load() -> Result<Self> {
        load_dotenv_if_present(Path::new(".env"));
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build from an arbitrary key lookup. `load()` passes the process env.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let get = |keys: &[&str]| keys.iter().find_map(|k| lookup(k).and_then(non_empty));

        let bot_token = get(&["TGBOT_TOKEN", "BOT_TOKEN"]).ok_or_else(|| {
            Error::Config("set TGBOT_TOKEN environment variable".to_string())
        })?;

        let proxy_url = get(&["SOCKS5_URL", "PROXY_URL"])
            .map(|raw| parse_proxy_url(&raw))
            .transpose()?;

        let poll_timeout = Duration::from_secs(
            parse_u64(get(&["POLL_TIMEOUT_SECS"]), "POLL_TIMEOUT_SECS")?
                .unwrap_or(DEFAULT_POLL_TIMEOUT_SECS),
        );
        let poll_retry_delay = Duration::from_millis(
            parse_u64(get(&["POLL_RETRY_DELAY_MS"]), "POLL_RETRY_DELAY_MS")?
                .unwrap_or(DEFAULT_POLL_RETRY_DELAY_MS),
        );

        let debug = get(&["TGBOT_DEBUG"]).map(|s| is_truthy(&s)).unwrap_or(false);

        Ok(Self {
            bot_token: bot_token.trim().to_string(),
            proxy_url,
            poll_timeout,
            poll_retry_delay,
            debug,
        })
    }
}

fn parse_proxy_url(raw: &str) -> Result<Url> {
    let url = Url::parse(raw.trim())
        .map_err(|e| Error::Config(format!("invalid proxy url {raw:?}: {e}")))?;
    match url.scheme() {
        "socks5" | "socks5h" => Ok(url),
        other => Err(Error::Config(format!(
            "unsupported proxy scheme {other:?}: expected socks5 or socks5h"
        ))),
    }
}

fn parse_u64(v: Option<String>, key: &str) -> Result<Option<u64>> {
    v.map(|s| {
        s.trim()
            .parse::<u64>()
            .map_err(|e| Error::Config(format!("{key} must be a non-negative integer: {e}")))
    })
    .transpose()
}

fn is_truthy(s: &str) -> bool {
    matches!(
        s.trim().to_lowercase().as_str(),
        "1" | "true" | "yes" | "on"
    )
}

fn non_empty(s: String) -> Option<String> {
    if s.trim().is_empty() {
        None
    } else {
        Some(s)
    }
}

fn load_dotenv_if_present(path: &Path) {
    let Ok(contents) = fs::read_to_string(path) else {
        return;
    };

    for (key, val) in parse_dotenv(&contents) {
        if env::var_os(&key).is_some() {
            continue; // do not override existing env
        }
        env::set_var(key, val);
    }
}

fn parse_dotenv(contents: &str) -> Vec<(String, String)> {
    let mut out = Vec::new();
    for raw in contents.lines() {
        let line = raw.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }

        let Some((k, v)) = line.split_once('=') else {
            continue;
        };

        let key = k.trim();
        if key.is_empty() {
            continue;
        }

        let mut val = v.trim().to_string();
        // Strip optional surrounding quotes.
        if val.len() >= 2
            && ((val.starts_with('"') && val.ends_with('"'))
                || (val.starts_with('\'') && val.ends_with('\'')))
        {
            val = val[1..val.len() - 1].to_string();
        }

        out.push((key.to_string(), val));
    }
    out
}
