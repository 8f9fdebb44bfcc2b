// SPDX-FileCopyrightText: 2026 Cardbridge Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! `cardbridge serve` command implementation.
//!
//! Wires the SQLite conversation store, the Trello tracker and the WhatsApp
//! sidecar transport into the bridging engine, starts the webhook receiver
//! and runs until SIGINT or SIGTERM.

use std::sync::Arc;

use cardbridge_config::model::BridgeConfig;
use cardbridge_core::{BridgeError, ChatTransport, ConversationStore, HealthStatus, PluginAdapter};
use cardbridge_engine::{shutdown, BridgeEngine, EngineSettings};
use cardbridge_media::ensure_temp_dir;
use cardbridge_storage::SqliteConversationStore;
use cardbridge_trello::TrelloTracker;
use cardbridge_whatsapp::WhatsAppTransport;
use tracing::{error, info, warn};

/// Runs the `cardbridge serve` command.
pub async fn run_serve(config: BridgeConfig) -> Result<(), BridgeError> {
    init_tracing(&config.bridge.log_level);

    if let Err(errors) = cardbridge_config::validate_for_serve(&config) {
        cardbridge_config::render_errors(&errors);
        return Err(BridgeError::Config(
            "configuration is incomplete for `serve`".into(),
        ));
    }

    info!("starting cardbridge serve");

    let settings = EngineSettings::from_config(&config)?;
    ensure_temp_dir(&settings.temp_dir).await?;

    let store = Arc::new(SqliteConversationStore::new(config.storage.clone()));
    store.initialize().await?;

    let tracker = Arc::new(TrelloTracker::new(&config.trello)?);
    let transport = Arc::new(WhatsAppTransport::new(config.whatsapp.clone())?);

    log_health(tracker.as_ref()).await;
    log_health(transport.as_ref()).await;
    announce_info_room(transport.as_ref(), &settings).await;

    let cancel = shutdown::install_signal_handler();

    let webhook = {
        let transport = Arc::clone(&transport);
        let cancel = cancel.clone();
        tokio::spawn(async move {
            if let Err(e) = transport.serve_webhook(cancel.clone()).await {
                error!(error = %e, "webhook receiver failed, shutting down");
                cancel.cancel();
            }
        })
    };

    let engine = Arc::new(BridgeEngine::new(
        transport.clone(),
        tracker.clone(),
        store.clone(),
        settings,
    ));
    let result = engine.run(cancel.clone()).await;

    cancel.cancel();
    if let Err(e) = webhook.await {
        error!(error = %e, "webhook task panicked");
    }

    if let Err(e) = transport.shutdown().await {
        warn!(error = %e, "transport shutdown failed");
    }
    if let Err(e) = tracker.shutdown().await {
        warn!(error = %e, "tracker shutdown failed");
    }
    store.close().await?;

    info!("cardbridge stopped");
    result
}

async fn log_health(adapter: &dyn PluginAdapter) {
    match adapter.health_check().await {
        Ok(HealthStatus::Healthy) => info!(adapter = adapter.name(), "adapter healthy"),
        Ok(HealthStatus::Degraded(reason)) => {
            warn!(adapter = adapter.name(), reason = %reason, "adapter degraded")
        }
        Ok(HealthStatus::Unhealthy(reason)) => {
            warn!(adapter = adapter.name(), reason = %reason, "adapter unhealthy")
        }
        Err(e) => warn!(adapter = adapter.name(), error = %e, "health check failed"),
    }
}

/// Without a configured operator room, log the joined chats so one can be picked.
async fn announce_info_room(transport: &dyn ChatTransport, settings: &EngineSettings) {
    if let Some(room) = &settings.info_room {
        info!(room = %room, "operator notifications enabled");
        return;
    }

    warn!("`bridge.info_room` is not set, operator notifications are disabled");
    match transport.list_joined_channels().await {
        Ok(channels) => {
            for channel in channels {
                info!(id = %channel.id, name = %channel.name, "joined channel");
            }
        }
        Err(e) => warn!(error = %e, "could not list joined channels"),
    }
}

fn init_tracing(log_level: &str) {
    use tracing_subscriber::EnvFilter;

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("cardbridge={log_level},warn")));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_thread_names(false)
        .init();
}
