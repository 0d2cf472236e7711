use std::{io::Write, sync::Arc};

use serde::Serialize;
use tracing::{debug, info};

use crate::{
    classify::NotClassifiable,
    document::Document,
    domain::RoutingMeta,
    ports::{DeliverySink, UpdateFeed},
    update::Update,
    Result,
};

/// What happened to one update.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Outcome {
    Delivered(RoutingMeta),
    Echoed(NotClassifiable),
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct RelayStats {
    pub delivered: u64,
    pub echoed: u64,
}

/// Sequential update relay.
///
/// Each update is rendered, classified and then either delivered back into its
/// chat or echoed to the fallback writer, before the next one is pulled.
pub struct Relay<W> {
    sink: Arc<dyn DeliverySink>,
    fallback: W,
    stats: RelayStats,
}

impl<W: Write + Send> Relay<W> {
    pub fn new(sink: Arc<dyn DeliverySink>, fallback: W) -> Self {
        Self {
            sink,
            fallback,
            stats: RelayStats::default(),
        }
    }

    pub fn fallback(&self) -> &W {
        &self.fallback
    }

    /// Handle a single update. Errors are fatal to the caller's loop.
    pub async fn handle<P: Serialize + Sync>(&mut self, update: &Update<P>) -> Result<Outcome> {
        let document = Document::render(update.id, &update.payload);

        match update.route() {
            Ok(route) => {
                let reply_to = route.reply_to.map(|m| m.0);
                debug!(
                    update_id = update.id.0,
                    kind = update.kind.name(),
                    chat_id = route.chat_id.0,
                    ?reply_to,
                    "delivering update document"
                );
                self.sink.send_document(route, document).await?;
                self.stats.delivered += 1;
                Ok(Outcome::Delivered(route))
            }
            Err(reason) => {
                debug!(
                    update_id = update.id.0,
                    kind = update.kind.name(),
                    %reason,
                    "echoing update document to fallback"
                );
                self.fallback.write_all(&document.bytes)?;
                self.fallback.write_all(b"\n")?;
                self.fallback.flush()?;
                self.stats.echoed += 1;
                Ok(Outcome::Echoed(reason))
            }
        }
    }

    /// Consume `feed` until it closes or a fatal error occurs.
    pub async fn run<F: UpdateFeed>(&mut self, feed: &mut F) -> Result<RelayStats> {
        while let Some(update) = feed.next_update().await? {
            self.handle(&update).await?;
        }

        info!(
            delivered = self.stats.delivered,
            echoed = self.stats.echoed,
            "update feed closed"
        );
        Ok(self.stats)
    }
}
