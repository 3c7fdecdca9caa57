//! Localized strings and menu routing.
//!
//! All strings are compiled in. Menu routing is an exact match of the inbound
//! text against the button labels of *every* supported language, so a user
//! who just switched languages can still press a button rendered in the old
//! one; replies are always produced in the stored language.

use serde::{Deserialize, Serialize};

/// A supported reply language.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Language {
    /// Russian (the default for new users)
    #[default]
    Ru,
    /// Ukrainian
    Ua,
}

impl Language {
    /// Every supported language, in picker order.
    pub const ALL: [Language; 2] = [Language::Ru, Language::Ua];

    /// Two-letter code stored in the user record.
    #[must_use]
    pub fn code(self) -> &'static str {
        match self {
            Language::Ru => "ru",
            Language::Ua => "ua",
        }
    }

    /// Parse a stored language code.
    #[must_use]
    pub fn from_code(code: &str) -> Option<Self> {
        match code {
            "ru" => Some(Language::Ru),
            "ua" => Some(Language::Ua),
            _ => None,
        }
    }

    /// Button label on the language picker. Language-invariant so the picker
    /// reads the same no matter which language it was rendered in.
    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            Language::Ru => "🇷🇺 Русский",
            Language::Ua => "🇺🇦 Українська",
        }
    }

    /// Match a picker button press back to a language.
    #[must_use]
    pub fn from_label(text: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|lang| lang.label() == text)
    }
}

/// A logical main-menu action, independent of the language it was pressed in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MenuAction {
    /// Start the group-scrape dialog
    ScrapeGroup,
    /// Start the channel-scrape dialog
    ScrapeChannel,
    /// Open the language picker
    ChangeLanguage,
}

/// Route a main-menu button press, whatever language it was rendered in.
#[must_use]
pub fn menu_action(text: &str) -> Option<MenuAction> {
    for lang in Language::ALL {
        if text == scrape_group_button(lang) {
            return Some(MenuAction::ScrapeGroup);
        }
        if text == scrape_channel_button(lang) {
            return Some(MenuAction::ScrapeChannel);
        }
        if text == language_button(lang) {
            return Some(MenuAction::ChangeLanguage);
        }
    }
    None
}

#[must_use]
pub fn scrape_group_button(lang: Language) -> &'static str {
    match lang {
        Language::Ru => "👥 Участники группы",
        Language::Ua => "👥 Учасники групи",
    }
}

#[must_use]
pub fn scrape_channel_button(lang: Language) -> &'static str {
    match lang {
        Language::Ru => "💬 Комментаторы канала",
        Language::Ua => "💬 Коментатори каналу",
    }
}

#[must_use]
pub fn language_button(lang: Language) -> &'static str {
    match lang {
        Language::Ru => "🌐 Язык",
        Language::Ua => "🌐 Мова",
    }
}

#[must_use]
pub fn start_message(lang: Language) -> &'static str {
    match lang {
        Language::Ru => {
            "Привет! Я выгружаю аудиторию публичных групп и каналов в CSV. Выберите действие:"
        }
        Language::Ua => {
            "Привіт! Я вивантажую аудиторію публічних груп і каналів у CSV. Оберіть дію:"
        }
    }
}

#[must_use]
pub fn input_group_link(lang: Language) -> &'static str {
    match lang {
        Language::Ru => "Пришлите ссылку на группу:",
        Language::Ua => "Надішліть посилання на групу:",
    }
}

#[must_use]
pub fn input_channel_link(lang: Language) -> &'static str {
    match lang {
        Language::Ru => "Пришлите ссылку на канал:",
        Language::Ua => "Надішліть посилання на канал:",
    }
}

#[must_use]
pub fn input_count(lang: Language) -> &'static str {
    match lang {
        Language::Ru => "Сколько пользователей выгрузить? Введите число:",
        Language::Ua => "Скільки користувачів вивантажити? Введіть число:",
    }
}

#[must_use]
pub fn count_error(lang: Language) -> &'static str {
    match lang {
        Language::Ru => "Это не похоже на число. Начните заново из меню.",
        Language::Ua => "Це не схоже на число. Почніть заново з меню.",
    }
}

#[must_use]
pub fn scraping_started(lang: Language) -> &'static str {
    match lang {
        Language::Ru => "Начинаю сбор, это может занять время...",
        Language::Ua => "Починаю збір, це може зайняти час...",
    }
}

#[must_use]
pub fn scraping_done(lang: Language) -> &'static str {
    match lang {
        Language::Ru => "Готово! Файл во вложении.",
        Language::Ua => "Готово! Файл у вкладенні.",
    }
}

#[must_use]
pub fn scrape_failed(lang: Language) -> &'static str {
    match lang {
        Language::Ru => "Не удалось собрать пользователей. Проверьте ссылку и попробуйте ещё раз.",
        Language::Ua => {
            "Не вдалося зібрати користувачів. Перевірте посилання і спробуйте ще раз."
        }
    }
}

#[must_use]
pub fn language_saved(lang: Language) -> &'static str {
    match lang {
        Language::Ru => "Язык сохранён.",
        Language::Ua => "Мову збережено.",
    }
}

#[must_use]
pub fn select_action_placeholder(lang: Language) -> &'static str {
    match lang {
        Language::Ru => "Выберите действие",
        Language::Ua => "Оберіть дію",
    }
}

#[must_use]
pub fn language_placeholder(lang: Language) -> &'static str {
    match lang {
        Language::Ru => "Выберите язык",
        Language::Ua => "Оберіть мову",
    }
}
