use std::sync::Arc;

use anyhow::Context;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt, BufReader};

use ilk_core::{
    config::Config,
    ports::IssueVerifier,
    settings::{Setting, SettingsStore},
};

use crate::{handlers, InMemorySettings, InboundEvent, OutboundRecord, Outbox, StdioUpdater};

/// Configured seeds that pass settings validation. Empty seeds fall back to the
/// registered default.
fn valid_seeds(cfg: &Config, store: &SettingsStore) -> Vec<Setting> {
    cfg.seed_settings()
        .into_iter()
        .filter(|seed| {
            let valid = store.validate(seed);
            if !valid && !seed.value().is_empty() {
                tracing::warn!(setting = ?seed, "ignoring invalid configured setting");
            }
            valid
        })
        .collect()
}

/// Everything a hook needs. Owned by the event loop, one event at a time.
pub struct AppState {
    pub store: SettingsStore,
    pub verifier: Arc<dyn IssueVerifier>,
    pub settings_host: Arc<InMemorySettings>,
    pub updater: Arc<StdioUpdater>,
    pub outbox: Arc<Outbox>,
}

impl AppState {
    /// Build the state and run settings registration + initial load.
    pub async fn initialize(
        cfg: &Config,
        verifier: Arc<dyn IssueVerifier>,
    ) -> ilk_core::Result<Self> {
        let mut store = SettingsStore::new();
        let outbox = Arc::new(Outbox::default());
        let settings_host = Arc::new(InMemorySettings::seeded(valid_seeds(cfg, &store)));
        let updater = Arc::new(StdioUpdater::new(outbox.clone()));

        store.initialize(settings_host.as_ref()).await?;
        outbox.push(OutboundRecord::SettingsRegistered {
            settings: settings_host.definitions(),
        });

        Ok(Self {
            store,
            verifier,
            settings_host,
            updater,
            outbox,
        })
    }
}

/// Serve events from stdin until EOF.
pub async fn run_stdio(cfg: &Config, verifier: Arc<dyn IssueVerifier>) -> anyhow::Result<()> {
    let mut state = AppState::initialize(cfg, verifier)
        .await
        .context("failed to initialize settings")?;

    tracing::info!(domain = %state.store.domain(), "issue linker running on stdio");

    let stdin = BufReader::new(tokio::io::stdin());
    let mut stdout = tokio::io::stdout();
    serve(&mut state, stdin, &mut stdout).await
}

/// Event loop over any line-oriented reader/writer pair.
pub async fn serve<R, W>(state: &mut AppState, reader: R, writer: &mut W) -> anyhow::Result<()>
where
    R: AsyncBufRead + Unpin,
    W: AsyncWrite + Unpin,
{
    flush_outbox(&state.outbox, writer).await?;

    let mut lines = reader.lines();
    while let Some(line) = lines.next_line().await.context("failed to read event")? {
        if line.trim().is_empty() {
            continue;
        }

        let event = match serde_json::from_str::<InboundEvent>(&line) {
            Ok(v) => v,
            Err(e) => {
                tracing::warn!(error = %e, "skipping malformed event");
                continue;
            }
        };

        if let Err(e) = handlers::handle_event(state, event).await {
            tracing::error!(error = %e, "event handling failed");
        }

        flush_outbox(&state.outbox, writer).await?;
    }

    Ok(())
}

async fn flush_outbox<W>(outbox: &Outbox, writer: &mut W) -> anyhow::Result<()>
where
    W: AsyncWrite + Unpin,
{
    let records = outbox.drain();
    if records.is_empty() {
        return Ok(());
    }
    for record in records {
        let out = serde_json::to_string(&record)?;
        writer.write_all(out.as_bytes()).await?;
        writer.write_all(b"\n").await?;
    }
    writer.flush().await?;
    Ok(())
}
