//! Audience scraper bot.
//!
//! A Telegram bot that exports the audience of a public group (its
//! participants) or channel (its commentators) into a CSV file, driven by a
//! button-based dialogue with a per-user language preference.

/// Telegram surface: dialogue state, keyboards, message handlers.
pub mod bot;
/// Configuration management.
pub mod config;
/// User records and scrape history (SQLite).
pub mod db;
/// Scraping pipeline: entity sources, collection algorithms, CSV export.
pub mod scraper;
/// Localized strings and menu routing.
pub mod texts;
