use std::env::var;
use std::time::Duration;

use dotenvy::dotenv;

const DEFAULT_POLL_INTERVAL_SECS: u64 = 30;

pub struct Config {
    pub database_url: String,
    pub bot_token: String,
    pub poll_interval: Duration,
    pub events_nats_url: Option<String>,
    pub events_stream: String,
    pub events_subject: String,
    pub ga_measurement_id: Option<String>,
    pub ga_api_secret: Option<String>,
}

impl Config {
    pub fn try_parse() -> Result<Config, &'static str> {
        let _ = dotenv();

        let poll_interval_secs = match var("POLL_INTERVAL_SECS") {
            Ok(raw) => raw
                .parse::<u64>()
                .map_err(|_| "An error occured while parsing POLL_INTERVAL_SECS env param")?,
            Err(_) => DEFAULT_POLL_INTERVAL_SECS,
        };

        Ok(Config {
            database_url: var("DATABASE_URL")
                .map_err(|_| "An error occured while getting DATABASE_URL env param")?,
            bot_token: var("BOT_TOKEN")
                .map_err(|_| "An error occured while getting BOT_TOKEN env param")?,
            poll_interval: Duration::from_secs(poll_interval_secs),
            events_nats_url: var("NATS_URL").ok(),
            events_stream: var("EVENTS_STREAM").unwrap_or_else(|_| "NEWSLETTER".to_string()),
            events_subject: var("EVENTS_SUBJECT")
                .unwrap_or_else(|_| "newsletter.deliveries".to_string()),
            ga_measurement_id: var("GA_MEASUREMENT_ID").ok(),
            ga_api_secret: var("GA_API_SECRET").ok(),
        })
    }
}
