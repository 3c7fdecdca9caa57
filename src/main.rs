use std::sync::Arc;

use audience_bot::bot::handlers::{self, BotDialogue, Command};
use audience_bot::bot::state::State;
use audience_bot::config::Settings;
use audience_bot::db::{SqliteStore, UserStore};
use audience_bot::scraper::{dummy, EntityConnector};
use dotenvy::dotenv;
use teloxide::dispatching::dialogue::InMemStorage;
use teloxide::dispatching::UpdateHandler;
use teloxide::prelude::*;
use tracing::{error, info, warn};
use tracing_subscriber::{prelude::*, EnvFilter};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Load .env file
    dotenv().ok();

    init_logging();

    info!("Starting audience scraper bot...");

    let settings = init_settings();
    let store = init_store(&settings).await;
    let connector = init_connector(&settings);

    let bot = Bot::new(settings.telegram_token.clone());
    let dialogue_storage = InMemStorage::<State>::new();
    let handler = setup_handler();

    info!("Bot is running...");

    Dispatcher::builder(bot, handler)
        .dependencies(dptree::deps![
            store,
            connector,
            settings,
            dialogue_storage
        ])
        .enable_ctrlc_handler()
        .build()
        .dispatch()
        .await;

    Ok(())
}

fn init_logging() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer())
        .init();
}

fn init_settings() -> Arc<Settings> {
    match Settings::new() {
        Ok(s) => {
            info!("Configuration loaded successfully.");
            Arc::new(s)
        }
        Err(e) => {
            error!("Failed to load configuration: {}", e);
            std::process::exit(1);
        }
    }
}

async fn init_store(settings: &Settings) -> Arc<dyn UserStore> {
    match SqliteStore::connect(&settings.database_url).await {
        Ok(s) => {
            info!("User store ready at {}", settings.database_url);
            Arc::new(s)
        }
        Err(e) => {
            error!("Failed to open user store: {}", e);
            std::process::exit(1);
        }
    }
}

fn init_connector(settings: &Settings) -> Arc<dyn EntityConnector> {
    match settings.source_backend.as_str() {
        "dummy" => {
            warn!("Using the built-in dummy source backend; exports will contain canned demo data");
            Arc::new(dummy::demo_source())
        }
        other => {
            error!("Unknown source backend `{}`", other);
            std::process::exit(1);
        }
    }
}

fn setup_handler() -> UpdateHandler<teloxide::RequestError> {
    dptree::entry().branch(
        Update::filter_message()
            .enter_dialogue::<Message, InMemStorage<State>, State>()
            .branch(
                dptree::entry()
                    .filter_command::<Command>()
                    .endpoint(handle_command),
            )
            .branch(
                dptree::case![State::MainMenu]
                    .filter(|msg: Message| msg.text().is_some())
                    .endpoint(handle_main_menu),
            )
            .branch(
                dptree::case![State::ChoosingLanguage]
                    .filter(|msg: Message| msg.text().is_some())
                    .endpoint(handle_choosing_language),
            )
            .branch(
                dptree::case![State::InputGroupUrl]
                    .filter(|msg: Message| msg.text().is_some())
                    .endpoint(handle_group_url),
            )
            .branch(
                dptree::case![State::InputGroupCount { url }]
                    .filter(|msg: Message| msg.text().is_some())
                    .endpoint(handle_group_count),
            )
            .branch(
                dptree::case![State::InputChannelUrl]
                    .filter(|msg: Message| msg.text().is_some())
                    .endpoint(handle_channel_url),
            )
            .branch(
                dptree::case![State::InputChannelCount { url }]
                    .filter(|msg: Message| msg.text().is_some())
                    .endpoint(handle_channel_count),
            ),
    )
}

async fn handle_command(
    bot: Bot,
    msg: Message,
    cmd: Command,
    store: Arc<dyn UserStore>,
    dialogue: BotDialogue,
) -> Result<(), teloxide::RequestError> {
    let res = match cmd {
        Command::Start => handlers::start(bot, msg, store, dialogue).await,
    };
    if let Err(e) = res {
        error!("Command error: {:#}", e);
    }
    respond(())
}

async fn handle_main_menu(
    bot: Bot,
    msg: Message,
    store: Arc<dyn UserStore>,
    dialogue: BotDialogue,
) -> Result<(), teloxide::RequestError> {
    if let Err(e) = handlers::main_menu(bot, msg, store, dialogue).await {
        error!("Main menu handler error: {:#}", e);
    }
    respond(())
}

async fn handle_choosing_language(
    bot: Bot,
    msg: Message,
    store: Arc<dyn UserStore>,
    dialogue: BotDialogue,
) -> Result<(), teloxide::RequestError> {
    if let Err(e) = handlers::choosing_language(bot, msg, store, dialogue).await {
        error!("Language handler error: {:#}", e);
    }
    respond(())
}

async fn handle_group_url(
    bot: Bot,
    msg: Message,
    store: Arc<dyn UserStore>,
    dialogue: BotDialogue,
) -> Result<(), teloxide::RequestError> {
    if let Err(e) = handlers::group_url(bot, msg, store, dialogue).await {
        error!("Group url handler error: {:#}", e);
    }
    respond(())
}

async fn handle_group_count(
    bot: Bot,
    msg: Message,
    store: Arc<dyn UserStore>,
    connector: Arc<dyn EntityConnector>,
    settings: Arc<Settings>,
    dialogue: BotDialogue,
    url: String,
) -> Result<(), teloxide::RequestError> {
    if let Err(e) =
        handlers::group_count(bot, msg, store, connector, settings, dialogue, url).await
    {
        error!("Group count handler error: {:#}", e);
    }
    respond(())
}

async fn handle_channel_url(
    bot: Bot,
    msg: Message,
    store: Arc<dyn UserStore>,
    dialogue: BotDialogue,
) -> Result<(), teloxide::RequestError> {
    if let Err(e) = handlers::channel_url(bot, msg, store, dialogue).await {
        error!("Channel url handler error: {:#}", e);
    }
    respond(())
}

async fn handle_channel_count(
    bot: Bot,
    msg: Message,
    store: Arc<dyn UserStore>,
    connector: Arc<dyn EntityConnector>,
    settings: Arc<Settings>,
    dialogue: BotDialogue,
    url: String,
) -> Result<(), teloxide::RequestError> {
    if let Err(e) =
        handlers::channel_count(bot, msg, store, connector, settings, dialogue, url).await
    {
        error!("Channel count handler error: {:#}", e);
    }
    respond(())
}
