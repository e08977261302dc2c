//! Scheduled message-of-the-day broadcast.

use chrono::{DateTime, Utc};
use chrono_tz::Tz;
use cron::Schedule;
use std::sync::Arc;
use tracing::{error, info, warn};

use crate::bot::dispatcher::Dispatcher;
use crate::bot::telegram::TelegramClient;
use crate::config::DailyMessageConfig;

/// Next firing strictly after `after`, evaluated in `timezone`.
pub fn next_trigger(schedule: &Schedule, timezone: Tz, after: DateTime<Utc>) -> Option<DateTime<Utc>> {
    schedule
        .after(&after.with_timezone(&timezone))
        .next()
        .map(|next| next.with_timezone(&Utc))
}

/// Start the broadcast loop.
pub fn spawn(config: DailyMessageConfig, dispatcher: Arc<Dispatcher>, telegram: Arc<TelegramClient>) {
    info!(
        "🌅 Daily message enabled for {} chat(s) ({})",
        config.chat_ids.len(),
        config.timezone
    );
    tokio::spawn(async move {
        loop {
            let now = Utc::now();
            let Some(next) = next_trigger(&config.schedule, config.timezone, now) else {
                warn!("Daily message schedule has no future occurrence, stopping");
                return;
            };
            let wait = (next - now).to_std().unwrap_or_default();
            info!("Next daily message at {}", next.with_timezone(&config.timezone));
            tokio::time::sleep(wait).await;
            broadcast(&config, &dispatcher, &telegram).await;
        }
    });
}

async fn broadcast(config: &DailyMessageConfig, dispatcher: &Dispatcher, telegram: &TelegramClient) {
    let Some(message) = dispatcher.daily_message(None).await else {
        info!("📭 Nothing new to send today");
        return;
    };
    let render = message.render();
    for chat_id in &config.chat_ids {
        if let Err(e) = telegram.send(*chat_id, &render).await {
            error!("Daily message to {} failed: {}", chat_id, e);
        }
    }
}
