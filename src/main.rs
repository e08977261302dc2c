use std::sync::Arc;

use teloxide::prelude::*;
use teloxide::utils::command::BotCommands;
use tracing::{info, warn};
use tracing_subscriber::prelude::*;

use chumelito::bot::{
    daily, Command, ContentCatalog, Dispatcher as BotDispatcher, MemeClient, Navigator, Request, SeenRegistry,
    SessionStore, TelegramClient,
};
use chumelito::config::Config;

struct BotState {
    dispatcher: Arc<BotDispatcher>,
    telegram: Arc<TelegramClient>,
}

impl BotState {
    fn new(config: &Config, bot: &Bot) -> Result<Self, String> {
        let catalog = ContentCatalog::new(config.content.clone());
        let categories = catalog.list_categories();
        info!(
            "📂 {} joke categories in {}, trivia from {}",
            categories.len(),
            config.content.jokes_dir.display(),
            config.content.trivia_file.display()
        );

        let sessions = Arc::new(SessionStore::new(config.session_idle_ttl));
        sessions.spawn_janitor();

        let meme = MemeClient::new(config.meme_api_url.clone(), config.meme_timeout)
            .map_err(|e| format!("Failed to build meme client: {e}"))?;

        let dispatcher = BotDispatcher::new(
            catalog,
            Navigator::new(config.bot_name.clone(), config.version.clone()),
            sessions,
            SeenRegistry::new(config.seen_retention),
            meme,
        );

        Ok(Self {
            dispatcher: Arc::new(dispatcher),
            telegram: Arc::new(TelegramClient::new(bot.clone())),
        })
    }
}

#[tokio::main]
async fn main() {
    let config_path = std::env::args()
        .nth(1)
        .unwrap_or_else(|| "chumelito.json".to_string());
    let config = match Config::load(&config_path) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Invalid config {config_path}: {e}");
            std::process::exit(1);
        }
    };

    // Setup logging
    let log_dir = config.data_dir.join("logs");
    std::fs::create_dir_all(&log_dir).ok();
    let log_file = match std::fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(log_dir.join("chumelito.log"))
    {
        Ok(file) => file,
        Err(e) => {
            eprintln!("Failed to open log file in {}: {e}", log_dir.display());
            std::process::exit(1);
        }
    };
    let (non_blocking, _guard) = tracing_appender::non_blocking(log_file);

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(std::io::stdout)
                .with_filter(
                    tracing_subscriber::EnvFilter::from_default_env()
                        .add_directive(tracing::Level::INFO.into()),
                ),
        )
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(non_blocking)
                .with_ansi(false)
                .with_filter(
                    tracing_subscriber::EnvFilter::from_default_env()
                        .add_directive(tracing::Level::INFO.into()),
                ),
        )
        .init();

    info!("🚀 Starting {} {}...", config.bot_name, config.version);
    info!("Loaded config from {config_path}");

    let bot = Bot::new(&config.telegram_bot_token);
    if let Err(e) = bot.set_my_commands(Command::bot_commands()).await {
        warn!("Failed to register commands: {e}");
    }

    let state = match BotState::new(&config, &bot) {
        Ok(state) => Arc::new(state),
        Err(e) => {
            eprintln!("{e}");
            std::process::exit(1);
        }
    };

    if let Some(daily_config) = config.daily_message.clone() {
        daily::spawn(daily_config, state.dispatcher.clone(), state.telegram.clone());
    } else {
        info!("Daily message disabled");
    }

    let handler = dptree::entry()
        .branch(
            Update::filter_message()
                .filter_command::<Command>()
                .endpoint(handle_command),
        )
        .branch(Update::filter_callback_query().endpoint(handle_callback));

    Dispatcher::builder(bot, handler)
        .dependencies(dptree::deps![state])
        .enable_ctrlc_handler()
        .build()
        .dispatch()
        .await;
}

async fn handle_command(msg: Message, cmd: Command, state: Arc<BotState>) -> ResponseResult<()> {
    let username = msg
        .from
        .as_ref()
        .map(|u| u.username.clone().unwrap_or_else(|| u.first_name.clone()))
        .unwrap_or_default();
    info!("📨 /{:?} from {} in {}", cmd, username, msg.chat.id);

    let render = state.dispatcher.handle(msg.chat.id.0, Request::from(cmd)).await;
    if let Err(e) = state.telegram.send(msg.chat.id, &render).await {
        warn!("Reply to {} failed: {}", msg.chat.id, e);
    }
    Ok(())
}

async fn handle_callback(query: CallbackQuery, state: Arc<BotState>) -> ResponseResult<()> {
    let Some(token) = query.data.as_deref() else {
        return Ok(());
    };
    // Inline buttons can outlive the message they were sent in
    let conversation_id = query
        .message
        .as_ref()
        .map(|m| m.chat().id.0)
        .unwrap_or(query.from.id.0 as i64);

    info!("🔘 '{}' from {} in {}", token, query.from.id, conversation_id);
    let render = state.dispatcher.handle_token(conversation_id, token).await;
    if let Err(e) = state.telegram.respond(&query, &render).await {
        warn!("Callback reply in {} failed: {}", conversation_id, e);
    }
    Ok(())
}
