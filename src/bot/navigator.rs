//! Menu screens and category pagination.
//!
//! Rendering is a pure function of the screen and whatever the catalog
//! currently holds. Joke and trivia category lists paginate independently.

use crate::bot::callback::Action;
use crate::bot::catalog::ContentCatalog;
use crate::bot::markup::{capitalize, escape};
use crate::bot::quiz::INITIAL_ATTEMPTS;
use crate::bot::render::{Button, Keyboard, RenderInstruction};
use crate::bot::session::NavigationContext;

pub const JOKES_PAGE_SIZE: usize = 10;
pub const TRIVIA_PAGE_SIZE: usize = 5;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Screen {
    Home,
    Help,
    Rules,
    ChistesMenu,
    ChistesCategoryList(usize),
    GamesMenu,
    TriviaMenu,
    TriviaCategoryList(usize),
}

impl Screen {
    /// The menu screen an action navigates to, if it is a pure navigation.
    pub fn for_action(action: &Action) -> Option<Self> {
        let screen = match action {
            Action::Home => Self::Home,
            Action::Help => Self::Help,
            Action::Rules => Self::Rules,
            Action::ChistesMenu => Self::ChistesMenu,
            Action::JokeCategoryPage(page) => Self::ChistesCategoryList(*page),
            Action::GamesMenu => Self::GamesMenu,
            Action::TriviaMenu => Self::TriviaMenu,
            Action::TriviaCategoryPage(page) => Self::TriviaCategoryList(*page),
            _ => return None,
        };
        Some(screen)
    }
}

/// One page of a list of `total` items.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Page {
    pub index: usize,
    pub start: usize,
    pub end: usize,
    pub has_prev: bool,
    pub has_next: bool,
}

impl Page {
    /// Requested pages past the end clamp to the last page.
    pub fn new(total: usize, size: usize, requested: usize) -> Self {
        let index = requested.min(Self::last_index(total, size));
        let start = index * size;
        let end = (start + size).min(total);
        Self {
            index,
            start,
            end,
            has_prev: index > 0,
            has_next: (index + 1) * size < total,
        }
    }

    /// `ceil(total/size) - 1`, or 0 for an empty list.
    pub fn last_index(total: usize, size: usize) -> usize {
        total.div_ceil(size).saturating_sub(1)
    }

    pub fn count(total: usize, size: usize) -> usize {
        total.div_ceil(size).max(1)
    }
}

/// Builds menu screens.
#[derive(Debug, Clone)]
pub struct Navigator {
    bot_name: String,
    version: String,
}

impl Navigator {
    pub fn new(bot_name: impl Into<String>, version: impl Into<String>) -> Self {
        Self {
            bot_name: bot_name.into(),
            version: version.into(),
        }
    }

    /// Render `screen`. Returns the screen actually shown (pages clamped).
    ///
    /// Menus link back to the category pages recorded in `nav`.
    pub fn render(
        &self,
        screen: Screen,
        nav: &NavigationContext,
        catalog: &ContentCatalog,
    ) -> (Screen, RenderInstruction) {
        match screen {
            Screen::Home => (screen, self.home()),
            Screen::Help => (screen, help()),
            Screen::Rules => (screen, rules()),
            Screen::ChistesMenu => (screen, chistes_menu(nav.jokes_page)),
            Screen::GamesMenu => (screen, games_menu()),
            Screen::TriviaMenu => (screen, trivia_menu(nav.trivia_page)),
            Screen::ChistesCategoryList(page) => {
                let categories = catalog.list_categories();
                let (page, render) = category_list(
                    &categories,
                    page,
                    JOKES_PAGE_SIZE,
                    "📂 Elige una categoría:",
                    CategoryKind::Jokes,
                );
                (Screen::ChistesCategoryList(page), render)
            }
            Screen::TriviaCategoryList(page) => {
                let categories = catalog.trivia_categories();
                let (page, render) = category_list(
                    &categories,
                    page,
                    TRIVIA_PAGE_SIZE,
                    "🧠 Elige una categoría de trivia:",
                    CategoryKind::Trivia,
                );
                (Screen::TriviaCategoryList(page), render)
            }
        }
    }

    pub fn home(&self) -> RenderInstruction {
        RenderInstruction::screen(
            format!(
                "👋 Soy <b>{}</b>\nVersión: {}\nSelecciona una opción:",
                escape(&self.bot_name),
                escape(&self.version)
            ),
            vec![
                vec![Button::new("📖 Ayuda", Action::Help)],
                vec![Button::new("📜 Reglas", Action::Rules)],
                vec![Button::new("🤣 Chistes", Action::ChistesMenu)],
                vec![Button::new("🎮 Juegos", Action::GamesMenu)],
                vec![Button::new("🖼️ Meme", Action::Meme)],
            ],
        )
    }

    /// A joke, with ways to get another one.
    pub fn joke(&self, category: &str, joke: &str) -> RenderInstruction {
        RenderInstruction::screen(
            format!("😂 {joke}"),
            vec![
                vec![Button::new(
                    format!("🔁 Otro de {}", capitalize(category)),
                    Action::JokeCategory(category.to_string()),
                )],
                vec![Button::new("🎲 Aleatorio", Action::RandomJoke)],
                vec![Button::home()],
            ],
        )
    }
}

fn help() -> RenderInstruction {
    RenderInstruction::screen(
        "ℹ️ <b>Ayuda</b>\n\n\
         👉 /start - Muestra el menú principal\n\
         👉 /meme - Envía un meme aleatorio\n\
         👉 /chiste - Muestra un chiste aleatorio\n\
         👉 /trivia - Una pregunta de trivia\n\
         👉 /mensaje - El mensaje del día\n\
         👉 También puedes navegar desde el menú con botones",
        vec![vec![Button::home()]],
    )
}

fn rules() -> RenderInstruction {
    RenderInstruction::screen(
        "📜 <b>Reglas del grupo</b>\n\n\
         1️⃣ Respeta a los demás miembros.\n\
         2️⃣ Nada de spam ni publicidad.\n\
         3️⃣ Usa el humor con responsabilidad.\n\
         4️⃣ Disfruta y comparte memes y chistes 😄",
        vec![vec![Button::home()]],
    )
}

fn chistes_menu(page: usize) -> RenderInstruction {
    RenderInstruction::screen(
        "🤣 <b>Chistes</b>\n¿Cómo quieres tu chiste?",
        vec![
            vec![Button::new("🎲 Chiste aleatorio", Action::RandomJoke)],
            vec![Button::new("📂 Categorías", Action::JokeCategoryPage(page))],
            vec![Button::home()],
        ],
    )
}

fn games_menu() -> RenderInstruction {
    RenderInstruction::screen(
        "🎮 <b>Juegos</b>\nElige un juego:",
        vec![
            vec![Button::new("🧠 Trivia", Action::TriviaMenu)],
            vec![Button::home()],
        ],
    )
}

fn trivia_menu(page: usize) -> RenderInstruction {
    RenderInstruction::screen(
        format!(
            "🧠 <b>Trivia</b>\nResponde preguntas de opción múltiple. Tienes {INITIAL_ATTEMPTS} intentos por pregunta."
        ),
        vec![
            vec![Button::new("🎲 Pregunta aleatoria", Action::RandomTrivia)],
            vec![Button::new("📂 Categorías", Action::TriviaCategoryPage(page))],
            vec![Button::new("🎮 Juegos", Action::GamesMenu)],
            vec![Button::home()],
        ],
    )
}

#[derive(Clone, Copy)]
enum CategoryKind {
    Jokes,
    Trivia,
}

impl CategoryKind {
    fn select(self, category: &str) -> Action {
        match self {
            Self::Jokes => Action::JokeCategory(category.to_string()),
            Self::Trivia => Action::TriviaCategory(category.to_string()),
        }
    }

    fn page(self, page: usize) -> Action {
        match self {
            Self::Jokes => Action::JokeCategoryPage(page),
            Self::Trivia => Action::TriviaCategoryPage(page),
        }
    }
}

fn category_list(
    categories: &[String],
    requested: usize,
    size: usize,
    title: &str,
    kind: CategoryKind,
) -> (usize, RenderInstruction) {
    if categories.is_empty() {
        return (
            0,
            RenderInstruction::screen("⚠ No hay categorías disponibles.", vec![vec![Button::home()]]),
        );
    }

    let page = Page::new(categories.len(), size, requested);
    let mut keyboard: Keyboard = categories[page.start..page.end]
        .iter()
        .map(|category| vec![Button::new(capitalize(category), kind.select(category))])
        .collect();

    let mut nav = Vec::with_capacity(3);
    if page.has_prev {
        nav.push(Button::new("⬅️ Atrás", kind.page(page.index - 1)));
    }
    nav.push(Button::home());
    if page.has_next {
        nav.push(Button::new("➡️ Siguiente", kind.page(page.index + 1)));
    }
    keyboard.push(nav);

    let pages = Page::count(categories.len(), size);
    let text = if pages > 1 {
        format!("{title} (página {}/{})", page.index + 1, pages)
    } else {
        title.to_string()
    };
    (page.index, RenderInstruction::screen(text, keyboard))
}
