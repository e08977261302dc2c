//! Chumelito: a Telegram bot serving jokes, a message of the day and a
//! trivia game through inline-button menus.

pub mod bot;
pub mod config;
