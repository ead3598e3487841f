use std::sync::Arc;

use sqlx::postgres::PgPoolOptions;
use tracing::info;
use tracing_subscriber::EnvFilter;

use newsletter::{
    application::{
        handlers::{
            broadcast_dispatcher::BroadcastDispatchHandler, broadcast_loop::BroadcastScheduler,
        },
        services::telemetry::TelemetrySink,
    },
    config::Config,
    infrastructure::{
        messaging::telegram::TelegramClient,
        repositories::postgres::{PostgresMessageStore, PostgresRecipientDirectory},
        telemetry::{GoogleAnalyticsSink, JetstreamConfig, JetstreamSink, NoopSink},
    },
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = Config::try_parse().map_err(anyhow::Error::msg)?;

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let pool = PgPoolOptions::new()
        .max_connections(5)
        .connect(&config.database_url)
        .await?;
    sqlx::migrate!().run(&pool).await?;

    let store = PostgresMessageStore::new(pool.clone());
    let directory = PostgresRecipientDirectory::new(pool);
    let transport = TelegramClient::new(config.bot_token.clone());
    let telemetry = build_telemetry(&config).await?;

    let dispatcher = Arc::new(BroadcastDispatchHandler::new(
        store.clone(),
        directory,
        transport,
        telemetry,
    ));
    let scheduler = BroadcastScheduler::new(store, dispatcher, config.poll_interval);

    info!("newsletter delivery engine starting");
    scheduler.run().await;

    Ok(())
}

async fn build_telemetry(config: &Config) -> anyhow::Result<Arc<dyn TelemetrySink>> {
    if let Some(url) = &config.events_nats_url {
        let sink = JetstreamSink::new(&JetstreamConfig {
            url: url.clone(),
            stream: config.events_stream.clone(),
            subject: config.events_subject.clone(),
        })
        .await?;
        return Ok(sink as Arc<dyn TelemetrySink>);
    }

    if let (Some(measurement_id), Some(api_secret)) =
        (&config.ga_measurement_id, &config.ga_api_secret)
    {
        return Ok(GoogleAnalyticsSink::new(
            measurement_id.clone(),
            api_secret.clone(),
        ));
    }

    Ok(Arc::new(NoopSink) as Arc<dyn TelemetrySink>)
}
