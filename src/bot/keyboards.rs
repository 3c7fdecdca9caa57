//! Reply keyboards for the main menu and the language picker.

use teloxide::types::{KeyboardButton, KeyboardMarkup};

use crate::texts::{self, Language};

/// The two-row main menu: scrape actions on top, language below.
#[must_use]
pub fn menu_keyboard(language: Language) -> KeyboardMarkup {
    let keyboard = vec![
        vec![
            KeyboardButton::new(texts::scrape_group_button(language)),
            KeyboardButton::new(texts::scrape_channel_button(language)),
        ],
        vec![KeyboardButton::new(texts::language_button(language))],
    ];
    KeyboardMarkup::new(keyboard)
        .resize_keyboard()
        .input_field_placeholder(texts::select_action_placeholder(language).to_string())
}

/// One button per supported language, in picker order.
#[must_use]
pub fn languages_keyboard(language: Language) -> KeyboardMarkup {
    let keyboard = vec![Language::ALL
        .into_iter()
        .map(|lang| KeyboardButton::new(lang.label()))
        .collect::<Vec<KeyboardButton>>()];
    KeyboardMarkup::new(keyboard)
        .resize_keyboard()
        .input_field_placeholder(texts::language_placeholder(language).to_string())
}
