//! Inline-button callback tokens.
//!
//! Tokens are `_`-delimited ASCII strings whose first segment names the
//! action. Category and answer parameters are everything after the prefix,
//! so values containing `_` survive the round-trip.

use std::fmt;

/// Telegram rejects callback data longer than this many bytes.
pub const MAX_TOKEN_BYTES: usize = 64;

/// A decoded button press.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    Home,
    Help,
    Rules,
    Meme,
    ChistesMenu,
    RandomJoke,
    JokeCategory(String),
    JokeCategoryPage(usize),
    GamesMenu,
    TriviaMenu,
    RandomTrivia,
    TriviaCategory(String),
    TriviaCategoryPage(usize),
    TriviaAnswer(String),
}

impl Action {
    /// Decode a wire token. `None` for anything unrecognized.
    pub fn parse(token: &str) -> Option<Self> {
        let action = match token {
            "home" => Self::Home,
            "help" => Self::Help,
            "rules" => Self::Rules,
            "meme" => Self::Meme,
            "chistes_menu" => Self::ChistesMenu,
            "chiste_aleatorio" => Self::RandomJoke,
            "juegos_menu" => Self::GamesMenu,
            "trivia_menu" => Self::TriviaMenu,
            "trivia_aleatorio" => Self::RandomTrivia,
            _ => return Self::parse_parameterized(token),
        };
        Some(action)
    }

    fn parse_parameterized(token: &str) -> Option<Self> {
        // Longer prefixes first: "trivia_categorias_" before "trivia_cat_".
        if let Some(page) = token.strip_prefix("trivia_categorias_") {
            return page.parse().ok().map(Self::TriviaCategoryPage);
        }
        if let Some(answer) = token.strip_prefix("trivia_resp_") {
            return Some(Self::TriviaAnswer(answer.to_string()));
        }
        if let Some(category) = token.strip_prefix("trivia_cat_") {
            return non_empty(category).map(Self::TriviaCategory);
        }
        if let Some(page) = token.strip_prefix("categorias_page_") {
            return page.parse().ok().map(Self::JokeCategoryPage);
        }
        // Buttons sent by older deployments.
        if let Some(page) = token.strip_prefix("page_") {
            return page.parse().ok().map(Self::JokeCategoryPage);
        }
        if let Some(category) = token.strip_prefix("cat_") {
            return non_empty(category).map(Self::JokeCategory);
        }
        None
    }

    /// Encode for the wire.
    pub fn token(&self) -> String {
        match self {
            Self::Home => "home".to_string(),
            Self::Help => "help".to_string(),
            Self::Rules => "rules".to_string(),
            Self::Meme => "meme".to_string(),
            Self::ChistesMenu => "chistes_menu".to_string(),
            Self::RandomJoke => "chiste_aleatorio".to_string(),
            Self::JokeCategory(category) => format!("cat_{category}"),
            Self::JokeCategoryPage(page) => format!("categorias_page_{page}"),
            Self::GamesMenu => "juegos_menu".to_string(),
            Self::TriviaMenu => "trivia_menu".to_string(),
            Self::RandomTrivia => "trivia_aleatorio".to_string(),
            Self::TriviaCategory(category) => format!("trivia_cat_{category}"),
            Self::TriviaCategoryPage(page) => format!("trivia_categorias_{page}"),
            Self::TriviaAnswer(option) => format!("trivia_resp_{option}"),
        }
    }

    /// Whether this action belongs to the trivia round flow.
    pub fn is_trivia_round(&self) -> bool {
        matches!(self, Self::RandomTrivia | Self::TriviaCategory(_) | Self::TriviaAnswer(_))
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.token())
    }
}

fn non_empty(s: &str) -> Option<String> {
    (!s.is_empty()).then(|| s.to_string())
}
