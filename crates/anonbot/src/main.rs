use std::sync::Arc;

use anyhow::Context;
use tokio_util::sync::CancellationToken;
use tracing::{error, info, warn};

use anonbot_core::{config::Config, handlers::Dispatcher, settings::SettingsStore};
use anonbot_slack::{SlackWebClient, SocketModeRunner};

const LICENSE_NOTICE: &str = "
Anonymous Bot Copyright (C) 2025  Paso Robles Vacation Rentals
This program comes with ABSOLUTELY NO WARRANTY. This is free software, and you are welcome to redistribute it under certain conditions. For details https://www.gnu.org/licenses/gpl-3.0-standalone.html
";

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    anonbot_slack::install_crypto_provider();

    let cfg = Config::load()?;
    anonbot_core::logging::init("anonbot", &cfg.log_dir, cfg.log_retention_days)?;
    info!("{LICENSE_NOTICE}");

    // Settings load may block on stdin for the first-run confirmation.
    let store = SettingsStore::new(&cfg.settings_file);
    let settings = tokio::task::spawn_blocking(move || store.load())
        .await
        .context("settings loader panicked")??;
    if settings.channels.is_empty() {
        warn!(
            "No report destinations configured; edit {} and restart",
            cfg.settings_file.display()
        );
    } else {
        info!("Loaded {} report destination(s)", settings.channels.len());
    }

    let client = SlackWebClient::new(cfg.slack_bot_token.clone());
    let bot_user_id = client
        .auth_test()
        .await
        .context("Failed to verify SLACK_BOT_TOKEN")?;
    info!("Slack bot user ID: {bot_user_id}");

    let http = client.http();
    let dispatcher = Arc::new(Dispatcher::with_default_routes(
        Arc::new(settings),
        Arc::new(client),
    ));
    let runner = SocketModeRunner::new(
        cfg.slack_app_token.clone(),
        http,
        dispatcher,
        cfg.reconnect_delay,
    );

    let cancel = CancellationToken::new();
    {
        let cancel = cancel.clone();
        tokio::spawn(async move {
            match tokio::signal::ctrl_c().await {
                Ok(()) => info!("Shutting down..."),
                Err(e) => {
                    error!("Failed to listen for Ctrl-C: {e}");
                    return;
                }
            }
            cancel.cancel();
        });
    }

    info!("Starting Anonymous Bot...");
    runner.run(cancel).await
}
