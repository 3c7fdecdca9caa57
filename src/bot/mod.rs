/// Message and command handlers for the scrape and language dialogues
pub mod handlers;
/// Reply keyboards for the main menu and language picker
pub mod keyboards;
/// User dialogue state
pub mod state;
