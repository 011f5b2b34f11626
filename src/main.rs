//! Track bot entry point.
//!
//! Loads configuration, builds the provider clients and the dispatcher, then
//! long-polls Telegram until Ctrl+C or SIGTERM. The HTTP endpoint runs next to
//! the bot when enabled.

use std::sync::Arc;

use anyhow::Context;
use secrecy::ExposeSecret;
use tokio::sync::watch;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use track_bot::adapters::ai::{
    AnthropicClient, AnthropicConfig, HuggingFaceClient, HuggingFaceConfig, YandexClient,
    YandexConfig,
};
use track_bot::adapters::chat::EventPoller;
use track_bot::adapters::http::{ask_router, AskAppState};
use track_bot::adapters::storage::InMemoryConversationStore;
use track_bot::adapters::telegram::{TelegramConfig as TelegramClientConfig, TelegramTransport};
use track_bot::application::{BotServices, Dispatcher, ModelSlot};
use track_bot::config::{AiConfig, AppConfig, LoggingConfig};
use track_bot::domain::metrics::MetricsCollector;
use track_bot::ports::AiClient;

const MODEL_BADGES: [(&str, &str); 3] = [("🔵", "Model A"), ("🟢", "Model B"), ("🟠", "Model C")];

fn init_tracing(logging: &LoggingConfig) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&logging.filter));
    let builder = tracing_subscriber::fmt().with_env_filter(filter);
    if logging.json {
        builder.json().init();
    } else {
        builder.init();
    }
}

/// Graceful shutdown signal handler for SIGTERM and Ctrl+C
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(err) = tokio::signal::ctrl_c().await {
            warn!(error = %err, "Failed to listen for Ctrl+C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(err) => {
                warn!(error = %err, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    info!("Shutdown signal received");
}

fn primary_client(ai: &AiConfig) -> anyhow::Result<Arc<dyn AiClient>> {
    let key = ai
        .anthropic_api_key
        .as_ref()
        .context("Anthropic API key is not configured")?;
    let mut config = AnthropicConfig::new(key.expose_secret().clone())
        .with_model(&ai.anthropic_model)
        .with_max_tokens(ai.max_tokens)
        .with_timeout(ai.timeout())
        .with_max_retries(ai.max_retries);
    if let Some(url) = &ai.anthropic_base_url {
        config = config.with_base_url(url);
    }
    Ok(Arc::new(AnthropicClient::new(config)?))
}

fn secondary_client(ai: &AiConfig) -> anyhow::Result<Option<Arc<dyn AiClient>>> {
    let (Some(key), Some(folder)) = (&ai.yandex_api_key, &ai.yandex_folder_id) else {
        return Ok(None);
    };
    if !ai.has_yandex() {
        return Ok(None);
    }
    let config = YandexConfig::new(key.expose_secret().clone(), folder)
        .with_model(&ai.yandex_model)
        .with_max_tokens(ai.max_tokens)
        .with_timeout(ai.timeout())
        .with_max_retries(ai.max_retries);
    Ok(Some(Arc::new(YandexClient::new(config)?)))
}

fn hosted_models(ai: &AiConfig) -> anyhow::Result<Option<Vec<ModelSlot>>> {
    let Some(key) = ai.hugging_face_api_key.as_ref().filter(|_| ai.has_hugging_face()) else {
        return Ok(None);
    };

    let mut slots = Vec::with_capacity(MODEL_BADGES.len());
    for ((badge, label), model) in MODEL_BADGES.into_iter().zip(ai.hugging_face_models()) {
        let config = HuggingFaceConfig::new(key.expose_secret().clone(), model)
            .with_base_url(&ai.hugging_face_base_url)
            .with_timeout(ai.timeout())
            .with_max_retries(ai.max_retries);
        let client: Arc<dyn AiClient> = Arc::new(HuggingFaceClient::new(config)?);
        slots.push(ModelSlot::new(badge, format!("{}: {}", label, model), client));
    }
    Ok(Some(slots))
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = AppConfig::load()?;
    init_tracing(&config.logging);
    config.validate()?;

    let primary = primary_client(&config.ai)?;
    let secondary = secondary_client(&config.ai)?;
    let models = hosted_models(&config.ai)?;
    info!(
        primary = %primary.provider_info(),
        secondary = secondary.is_some(),
        hosted_models = models.is_some(),
        "Providers configured"
    );

    let token = config
        .telegram
        .bot_token
        .as_ref()
        .context("Telegram bot token is not configured")?;
    let telegram = Arc::new(TelegramTransport::new(
        TelegramClientConfig::new(token.expose_secret().clone())
            .with_base_url(&config.telegram.api_base_url)
            .with_poll_timeout(config.telegram.poll_timeout_secs),
    )?);

    let services = BotServices {
        primary: Arc::clone(&primary),
        secondary,
        models,
        transport: telegram.clone(),
        context_store: Arc::new(InMemoryConversationStore::new()),
        metrics_display_store: Arc::new(InMemoryConversationStore::new()),
        find_track_store: Arc::new(InMemoryConversationStore::new()),
        metrics: Arc::new(MetricsCollector::new()),
    };
    let dispatcher = Dispatcher::new(services, config.bot.max_message_length);

    let (shutdown_tx, shutdown_rx) = watch::channel(false);

    let http_task = if config.http.enabled {
        let addr = config.http.socket_addr()?;
        let listener = tokio::net::TcpListener::bind(addr)
            .await
            .with_context(|| format!("Failed to bind {}", addr))?;
        let app = ask_router(AskAppState::new(
            Arc::clone(&primary),
            config.http.max_question_length,
        ));
        let mut http_shutdown = shutdown_rx.clone();
        info!(%addr, "HTTP endpoint listening");
        Some(tokio::spawn(async move {
            axum::serve(listener, app)
                .with_graceful_shutdown(async move {
                    let _ = http_shutdown.wait_for(|stop| *stop).await;
                })
                .await
        }))
    } else {
        None
    };

    let poller = EventPoller::new(telegram, dispatcher);
    info!("Track bot started");

    tokio::select! {
        _ = poller.run(shutdown_rx) => {},
        _ = shutdown_signal() => {},
    }
    let _ = shutdown_tx.send(true);

    if let Some(task) = http_task {
        task.await??;
    }

    info!("Shutdown complete");
    Ok(())
}
