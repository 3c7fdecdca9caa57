use serde::{Deserialize, Serialize};

/// Represents the current step of the user dialogue
#[derive(Clone, Serialize, Deserialize, Default)]
pub enum State {
    /// Idle at the main menu
    #[default]
    MainMenu,
    /// The language picker is open
    ChoosingLanguage,
    /// Waiting for a group link
    InputGroupUrl,
    /// Waiting for the target user count of a group scrape
    InputGroupCount {
        /// The group link received on the previous step
        url: String,
    },
    /// Waiting for a channel link
    InputChannelUrl,
    /// Waiting for the target user count of a channel scrape
    InputChannelCount {
        /// The channel link received on the previous step
        url: String,
    },
}
