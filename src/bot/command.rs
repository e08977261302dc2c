//! Slash commands.

use teloxide::utils::command::BotCommands;

use crate::bot::callback::Action;

#[derive(BotCommands, Clone, Debug, PartialEq, Eq)]
#[command(rename_rule = "lowercase", description = "Comandos disponibles:")]
pub enum Command {
    #[command(description = "muestra el menú principal")]
    Start,
    #[command(description = "muestra la ayuda")]
    Help,
    #[command(description = "reglas del grupo")]
    Rules,
    #[command(description = "envía un meme aleatorio")]
    Meme,
    #[command(description = "muestra un chiste aleatorio")]
    Chiste,
    #[command(description = "una pregunta de trivia")]
    Trivia,
    #[command(description = "el mensaje del día (opcional: categoría)")]
    Mensaje(String),
}

/// What an inbound event asks the dispatcher to do.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Request {
    Action(Action),
    /// Message of the day, optionally from one category.
    DailyMessage(Option<String>),
    /// A callback token that does not decode.
    Unknown(String),
}

impl Request {
    pub fn from_token(token: &str) -> Self {
        match Action::parse(token) {
            Some(action) => Self::Action(action),
            None => Self::Unknown(token.to_string()),
        }
    }
}

impl From<Command> for Request {
    fn from(command: Command) -> Self {
        match command {
            Command::Start => Self::Action(Action::Home),
            Command::Help => Self::Action(Action::Help),
            Command::Rules => Self::Action(Action::Rules),
            Command::Meme => Self::Action(Action::Meme),
            Command::Chiste => Self::Action(Action::RandomJoke),
            Command::Trivia => Self::Action(Action::RandomTrivia),
            Command::Mensaje(category) => {
                let category = category.trim();
                Self::DailyMessage((!category.is_empty()).then(|| category.to_string()))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_commands() {
        assert_eq!(Command::parse("/start", "chumelito_bot").unwrap(), Command::Start);
        assert_eq!(Command::parse("/chiste", "chumelito_bot").unwrap(), Command::Chiste);
        assert_eq!(
            Command::parse("/mensaje Motivacion", "chumelito_bot").unwrap(),
            Command::Mensaje("Motivacion".into())
        );
    }

    #[test]
    fn test_commands_map_to_actions() {
        assert_eq!(Request::from(Command::Start), Request::Action(Action::Home));
        assert_eq!(Request::from(Command::Trivia), Request::Action(Action::RandomTrivia));
        assert_eq!(Request::from(Command::Chiste), Request::Action(Action::RandomJoke));
    }

    #[test]
    fn test_mensaje_category() {
        assert_eq!(
            Request::from(Command::Mensaje(" Motivacion ".into())),
            Request::DailyMessage(Some("Motivacion".into()))
        );
        assert_eq!(Request::from(Command::Mensaje(String::new())), Request::DailyMessage(None));
    }

    #[test]
    fn test_from_token() {
        assert_eq!(Request::from_token("meme"), Request::Action(Action::Meme));
        assert_eq!(Request::from_token("xyz_123"), Request::Unknown("xyz_123".into()));
    }
}
