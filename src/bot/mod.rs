//! Bot module - menus, jokes, trivia and the message of the day.

pub mod callback;
pub mod catalog;
pub mod command;
pub mod daily;
pub mod dispatcher;
pub mod markup;
pub mod meme;
pub mod navigator;
pub mod quiz;
pub mod render;
pub mod selection;
pub mod session;
pub mod telegram;


pub use callback::Action;
pub use catalog::{ContentCatalog, TriviaQuestion};
pub use command::{Command, Request};
pub use dispatcher::{DailyMessage, Dispatcher};
pub use meme::MemeClient;
pub use navigator::{Navigator, Screen};
pub use render::{Button, RenderInstruction};
pub use selection::{RetentionPolicy, SeenRegistry};
pub use session::SessionStore;
pub use telegram::TelegramClient;
