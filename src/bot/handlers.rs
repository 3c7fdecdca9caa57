//! Message handlers for the scrape and language dialogues.
//!
//! Each handler serves one dialogue state. Replies are always rendered in the
//! user's stored language; menu routing accepts a button label in any
//! supported language, so a pressed button keeps working right after a
//! language switch.

use std::path::Path;
use std::sync::Arc;

use anyhow::{anyhow, Result};
use teloxide::dispatching::dialogue::InMemStorage;
use teloxide::prelude::*;
use teloxide::types::InputFile;
use teloxide::utils::command::BotCommands;
use tracing::{error, info, warn};

use crate::bot::keyboards::{languages_keyboard, menu_keyboard};
use crate::bot::state::State;
use crate::config::Settings;
use crate::db::{NewScrapeRequest, StoreError, UserStore};
use crate::scraper::{scraper_for, Artifact, EntityConnector, EntityKind};
use crate::texts::{self, Language, MenuAction};

/// Dialogue handle shared by all handlers
pub type BotDialogue = Dialogue<State, InMemStorage<State>>;

/// Supported bot commands
#[derive(BotCommands, Clone)]
#[command(rename_rule = "lowercase", description = "Поддерживаемые команды:")]
pub enum Command {
    /// Greet the user and show the main menu
    #[command(description = "Начать работу.")]
    Start,
}

/// Extract the sender id; 0 when the message carries no sender.
#[must_use]
pub fn get_user_id_safe(msg: &Message) -> i64 {
    msg.from.as_ref().map_or(0, |u| u.id.0.cast_signed())
}

/// First contact creates the user record with the default language; either
/// way the stored language comes back for rendering the reply.
pub async fn ensure_user(
    store: &dyn UserStore,
    telegram_id: i64,
) -> Result<Language, StoreError> {
    if !store.user_exists(telegram_id).await? {
        store.create_user(telegram_id, Language::default()).await?;
    }
    store.language(telegram_id).await
}

/// Parse the user-supplied target count. A failed parse aborts the scrape
/// attempt instead of carrying garbage into it.
#[must_use]
pub fn parse_count(text: &str) -> Option<usize> {
    text.trim().parse().ok()
}

/// `/start`: reset any active dialog and show the main menu.
pub async fn start(
    bot: Bot,
    msg: Message,
    store: Arc<dyn UserStore>,
    dialogue: BotDialogue,
) -> Result<()> {
    let language = ensure_user(store.as_ref(), get_user_id_safe(&msg)).await?;
    dialogue.exit().await.map_err(|e| anyhow!(e.to_string()))?;

    bot.send_message(msg.chat.id, texts::start_message(language))
        .reply_markup(menu_keyboard(language))
        .await?;
    Ok(())
}

/// Route a main-menu button press.
pub async fn main_menu(
    bot: Bot,
    msg: Message,
    store: Arc<dyn UserStore>,
    dialogue: BotDialogue,
) -> Result<()> {
    let Some(text) = msg.text() else {
        return Ok(());
    };
    let language = ensure_user(store.as_ref(), get_user_id_safe(&msg)).await?;

    match texts::menu_action(text) {
        Some(MenuAction::ScrapeGroup) => {
            dialogue
                .update(State::InputGroupUrl)
                .await
                .map_err(|e| anyhow!(e.to_string()))?;
            bot.send_message(msg.chat.id, texts::input_group_link(language))
                .await?;
        }
        Some(MenuAction::ScrapeChannel) => {
            dialogue
                .update(State::InputChannelUrl)
                .await
                .map_err(|e| anyhow!(e.to_string()))?;
            bot.send_message(msg.chat.id, texts::input_channel_link(language))
                .await?;
        }
        Some(MenuAction::ChangeLanguage) => {
            dialogue
                .update(State::ChoosingLanguage)
                .await
                .map_err(|e| anyhow!(e.to_string()))?;
            bot.send_message(msg.chat.id, texts::language_placeholder(language))
                .reply_markup(languages_keyboard(language))
                .await?;
        }
        None => {
            bot.send_message(msg.chat.id, texts::start_message(language))
                .reply_markup(menu_keyboard(language))
                .await?;
        }
    }
    Ok(())
}

/// Persist a picked language; anything else re-prompts the picker.
pub async fn choosing_language(
    bot: Bot,
    msg: Message,
    store: Arc<dyn UserStore>,
    dialogue: BotDialogue,
) -> Result<()> {
    let Some(text) = msg.text() else {
        return Ok(());
    };
    let telegram_id = get_user_id_safe(&msg);
    let current = ensure_user(store.as_ref(), telegram_id).await?;

    match Language::from_label(text) {
        Some(language) => {
            store.set_language(telegram_id, language).await?;
            // exit drops the dialogue entry and with it every accumulated field
            dialogue.exit().await.map_err(|e| anyhow!(e.to_string()))?;
            bot.send_message(msg.chat.id, texts::language_saved(language))
                .reply_markup(menu_keyboard(language))
                .await?;
        }
        None => {
            bot.send_message(msg.chat.id, texts::language_placeholder(current))
                .reply_markup(languages_keyboard(current))
                .await?;
        }
    }
    Ok(())
}

/// Store the group link and ask for the target count.
pub async fn group_url(
    bot: Bot,
    msg: Message,
    store: Arc<dyn UserStore>,
    dialogue: BotDialogue,
) -> Result<()> {
    let Some(url) = msg.text() else {
        return Ok(());
    };
    let language = ensure_user(store.as_ref(), get_user_id_safe(&msg)).await?;

    dialogue
        .update(State::InputGroupCount {
            url: url.to_string(),
        })
        .await
        .map_err(|e| anyhow!(e.to_string()))?;
    bot.send_message(msg.chat.id, texts::input_count(language))
        .await?;
    Ok(())
}

/// Store the channel link and ask for the target count.
pub async fn channel_url(
    bot: Bot,
    msg: Message,
    store: Arc<dyn UserStore>,
    dialogue: BotDialogue,
) -> Result<()> {
    let Some(url) = msg.text() else {
        return Ok(());
    };
    let language = ensure_user(store.as_ref(), get_user_id_safe(&msg)).await?;

    dialogue
        .update(State::InputChannelCount {
            url: url.to_string(),
        })
        .await
        .map_err(|e| anyhow!(e.to_string()))?;
    bot.send_message(msg.chat.id, texts::input_count(language))
        .await?;
    Ok(())
}

/// Terminal step of the group dialog.
#[allow(clippy::too_many_arguments)]
pub async fn group_count(
    bot: Bot,
    msg: Message,
    store: Arc<dyn UserStore>,
    connector: Arc<dyn EntityConnector>,
    settings: Arc<Settings>,
    dialogue: BotDialogue,
    url: String,
) -> Result<()> {
    finish_count_step(
        bot,
        msg,
        store,
        connector,
        settings,
        dialogue,
        EntityKind::Group,
        url,
    )
    .await
}

/// Terminal step of the channel dialog.
#[allow(clippy::too_many_arguments)]
pub async fn channel_count(
    bot: Bot,
    msg: Message,
    store: Arc<dyn UserStore>,
    connector: Arc<dyn EntityConnector>,
    settings: Arc<Settings>,
    dialogue: BotDialogue,
    url: String,
) -> Result<()> {
    finish_count_step(
        bot,
        msg,
        store,
        connector,
        settings,
        dialogue,
        EntityKind::Channel,
        url,
    )
    .await
}

/// Parse the count, run the scrape, deliver the artifact and clean up. The
/// dialog lands back on the main menu no matter what happens here; failures
/// surface as one generic localized message.
#[allow(clippy::too_many_arguments)]
async fn finish_count_step(
    bot: Bot,
    msg: Message,
    store: Arc<dyn UserStore>,
    connector: Arc<dyn EntityConnector>,
    settings: Arc<Settings>,
    dialogue: BotDialogue,
    kind: EntityKind,
    url: String,
) -> Result<()> {
    let Some(text) = msg.text() else {
        return Ok(());
    };
    let telegram_id = get_user_id_safe(&msg);
    let language = ensure_user(store.as_ref(), telegram_id).await?;

    dialogue.exit().await.map_err(|e| anyhow!(e.to_string()))?;

    let Some(count) = parse_count(text) else {
        bot.send_message(msg.chat.id, texts::count_error(language))
            .reply_markup(menu_keyboard(language))
            .await?;
        return Ok(());
    };

    bot.send_message(msg.chat.id, texts::scraping_started(language))
        .await?;

    match run_scrape(
        store.as_ref(),
        connector.as_ref(),
        &settings,
        telegram_id,
        kind,
        &url,
        count,
    )
    .await
    {
        Ok(artifact) => {
            let document =
                InputFile::file(artifact.path.clone()).file_name(artifact.file_name.clone());
            let delivery = bot
                .send_document(msg.chat.id, document)
                .caption(texts::scraping_done(language))
                .await;

            match delivery {
                Ok(_) => {
                    if let Err(e) = tokio::fs::remove_file(&artifact.path).await {
                        warn!(
                            "could not remove export file {}: {e}",
                            artifact.path.display()
                        );
                    } else {
                        info!("export file {} delivered and removed", artifact.path.display());
                    }
                }
                Err(e) => {
                    error!("failed to deliver export to {telegram_id}: {e}");
                    bot.send_message(msg.chat.id, texts::scrape_failed(language))
                        .reply_markup(menu_keyboard(language))
                        .await?;
                }
            }
        }
        Err(e) => {
            error!("{} scrape of `{url}` failed: {e:#}", kind.as_str());
            bot.send_message(msg.chat.id, texts::scrape_failed(language))
                .reply_markup(menu_keyboard(language))
                .await?;
        }
    }
    Ok(())
}

/// Run the scrape and append the history row. The row goes in right before
/// delivery and stays regardless of whether delivery later succeeds.
pub async fn run_scrape(
    store: &dyn UserStore,
    connector: &dyn EntityConnector,
    settings: &Settings,
    telegram_id: i64,
    kind: EntityKind,
    url: &str,
    count: usize,
) -> Result<Artifact> {
    let artifact = scraper_for(kind)
        .run(connector, url, count, Path::new(&settings.export_dir))
        .await?;

    let user_pk = store.user_pk(telegram_id).await?;
    store
        .record_scrape(
            user_pk,
            &NewScrapeRequest {
                kind,
                link: url.to_string(),
                title: artifact.entity.title.clone(),
                user_count: i64::try_from(count).unwrap_or(i64::MAX),
            },
        )
        .await?;

    Ok(artifact)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn counts_parse_with_surrounding_whitespace() {
        assert_eq!(parse_count("5"), Some(5));
        assert_eq!(parse_count("  25 "), Some(25));
        assert_eq!(parse_count("0"), Some(0));
    }

    #[test]
    fn garbage_counts_abort() {
        assert_eq!(parse_count("abc"), None);
        assert_eq!(parse_count("-3"), None);
        assert_eq!(parse_count("2.5"), None);
        assert_eq!(parse_count(""), None);
    }
}
