//! Routes inbound commands and button presses to the navigator, the quiz and
//! the catalog, and owns every mutation of conversation state.
//!
//! Failures never escape [`Dispatcher::handle`]: each is turned into
//! something the user can see (or, for unknown tokens, into the screen they
//! already had).

use std::fmt;
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

use crate::bot::callback::Action;
use crate::bot::catalog::ContentCatalog;
use crate::bot::command::Request;
use crate::bot::markup::{capitalize, escape};
use crate::bot::meme::{self, MemeClient};
use crate::bot::navigator::{Navigator, Screen};
use crate::bot::quiz::{self, AnswerOutcome, RoundStatus};
use crate::bot::render::{Button, RenderInstruction};
use crate::bot::selection::{SeenRegistry, pick_random, random_order};
use crate::bot::session::{ConversationState, SessionStore};

/// Recoverable failures, all handled at the dispatcher boundary.
#[derive(Debug)]
pub enum Fault {
    /// Missing, unreadable or malformed content; carries what was wanted.
    ContentUnavailable(String),
    /// An answer arrived with no matching round.
    NoActiveSession,
    /// The meme lookup failed or timed out.
    UpstreamUnavailable(meme::Error),
    /// A callback token that does not decode.
    UnknownToken(String),
}

impl fmt::Display for Fault {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ContentUnavailable(what) => write!(f, "no {what} available"),
            Self::NoActiveSession => write!(f, "no active trivia question"),
            Self::UpstreamUnavailable(e) => write!(f, "meme lookup failed: {e}"),
            Self::UnknownToken(token) => write!(f, "unknown callback token '{token}'"),
        }
    }
}

impl std::error::Error for Fault {}

/// A message of the day picked for delivery.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DailyMessage {
    pub category: String,
    pub text: String,
}

impl DailyMessage {
    pub fn render(&self) -> RenderInstruction {
        RenderInstruction::screen(
            format!(
                "🌅 <b>Mensaje del día</b> · {}\n\n{}",
                escape(&capitalize(&self.category)),
                self.text
            ),
            vec![vec![Button::home()]],
        )
    }
}

pub struct Dispatcher {
    catalog: ContentCatalog,
    navigator: Navigator,
    sessions: Arc<SessionStore>,
    seen: Mutex<SeenRegistry>,
    meme: MemeClient,
}

impl Dispatcher {
    pub fn new(
        catalog: ContentCatalog,
        navigator: Navigator,
        sessions: Arc<SessionStore>,
        seen: SeenRegistry,
        meme: MemeClient,
    ) -> Self {
        Self {
            catalog,
            navigator,
            sessions,
            seen: Mutex::new(seen),
            meme,
        }
    }

    pub fn sessions(&self) -> &Arc<SessionStore> {
        &self.sessions
    }

    pub fn catalog(&self) -> &ContentCatalog {
        &self.catalog
    }

    /// Handle one inbound event for a conversation.
    pub async fn handle(&self, conversation_id: i64, request: Request) -> RenderInstruction {
        let conversation = self.sessions.conversation(conversation_id).await;
        let mut state = conversation.lock().await;
        state.touch();

        let render = match self.apply(&mut state, request).await {
            Ok(render) => render,
            Err(fault) => self.recover(conversation_id, &state, fault),
        };
        if render.replaces_screen() {
            state.last_render = Some(render.clone());
        }
        render
    }

    /// Shorthand for a callback token.
    pub async fn handle_token(&self, conversation_id: i64, token: &str) -> RenderInstruction {
        self.handle(conversation_id, Request::from_token(token)).await
    }

    async fn apply(
        &self,
        state: &mut ConversationState,
        request: Request,
    ) -> Result<RenderInstruction, Fault> {
        let action = match request {
            Request::Unknown(token) => return Err(Fault::UnknownToken(token)),
            Request::DailyMessage(category) => {
                leave_round(state);
                state.screen = None;
                return Ok(match self.daily_message(category.as_deref()).await {
                    Some(message) => message.render(),
                    None => RenderInstruction::screen(
                        "📭 No hay mensajes nuevos por hoy.",
                        vec![vec![Button::home()]],
                    ),
                });
            }
            Request::Action(action) => action,
        };

        if !action.is_trivia_round() {
            leave_round(state);
        }

        match action {
            Action::Meme => {
                state.screen = None;
                let url = self.meme.random_meme().await.map_err(Fault::UpstreamUnavailable)?;
                Ok(RenderInstruction::Photo {
                    url,
                    keyboard: Some(vec![vec![
                        Button::new("🔁 Otro meme", Action::Meme),
                        Button::home(),
                    ]]),
                })
            }
            Action::RandomJoke => {
                state.screen = None;
                self.random_joke()
            }
            Action::JokeCategory(category) => {
                state.screen = None;
                self.joke(&category)
            }
            Action::RandomTrivia => self.pose(state, None),
            Action::TriviaCategory(category) => self.pose(state, Some(&category)),
            Action::TriviaAnswer(option) => self.answer(state, &option),
            menu => match Screen::for_action(&menu) {
                Some(screen) => Ok(self.navigate(state, screen)),
                None => Err(Fault::UnknownToken(menu.token())),
            },
        }
    }

    fn navigate(&self, state: &mut ConversationState, screen: Screen) -> RenderInstruction {
        let (shown, render) = self.navigator.render(screen, &state.nav, &self.catalog);
        match shown {
            Screen::ChistesCategoryList(page) => state.nav.jokes_page = page,
            Screen::TriviaCategoryList(page) => state.nav.trivia_page = page,
            _ => {}
        }
        state.screen = Some(shown);
        render
    }

    fn random_joke(&self) -> Result<RenderInstruction, Fault> {
        let mut categories = self.catalog.list_categories();
        random_order(&mut categories);
        for category in &categories {
            let jokes = self.catalog.load_items(category);
            if let Some(joke) = pick_random(&jokes) {
                return Ok(self.navigator.joke(category, joke));
            }
        }
        Err(Fault::ContentUnavailable("chistes".to_string()))
    }

    fn joke(&self, category: &str) -> Result<RenderInstruction, Fault> {
        let jokes = self.catalog.load_items(category);
        pick_random(&jokes)
            .map(|joke| self.navigator.joke(category, joke))
            .ok_or_else(|| Fault::ContentUnavailable(format!("chistes en {}", escape(category))))
    }

    fn pose(&self, state: &mut ConversationState, category: Option<&str>) -> Result<RenderInstruction, Fault> {
        let trivia = self.catalog.load_trivia();
        let Some(round) = quiz::pose(&trivia, category) else {
            let what = match category {
                Some(category) => format!("preguntas en {}", escape(category)),
                None => "preguntas de trivia".to_string(),
            };
            return Err(Fault::ContentUnavailable(what));
        };

        if let Some(previous) = &state.quiz {
            debug!("Replacing unanswered question in {}", previous.category());
        }
        let render = quiz::question_view(&round);
        state.quiz = Some(round);
        state.screen = None;
        Ok(render)
    }

    fn answer(&self, state: &mut ConversationState, option: &str) -> Result<RenderInstruction, Fault> {
        let outcome = quiz::submit(&mut state.quiz, option);
        match &outcome {
            AnswerOutcome::Retry { attempts_remaining } => {
                info!("🧠 Wrong answer, {} attempt(s) left", attempts_remaining);
                // The notice leaves the question on screen; re-renders show the new count
                if let Some(round) = &state.quiz {
                    state.last_render = Some(quiz::question_view(round));
                }
                Ok(quiz::retry_notice(*attempts_remaining))
            }
            AnswerOutcome::NoActiveQuestion => Err(Fault::NoActiveSession),
            AnswerOutcome::Correct(round) | AnswerOutcome::Exhausted(round) => {
                info!(
                    "🧠 Round resolved in {} ({})",
                    round.category(),
                    if matches!(outcome, AnswerOutcome::Correct(_)) { "correct" } else { "exhausted" }
                );
                state.screen = None;
                quiz::resolution_view(&outcome).ok_or(Fault::NoActiveSession)
            }
        }
    }

    /// Pick an undelivered message of the day and mark it delivered.
    ///
    /// Without a category, categories are tried in random order. `None` when
    /// nothing new is left.
    pub async fn daily_message(&self, category: Option<&str>) -> Option<DailyMessage> {
        let messages = self.catalog.load_daily_messages();
        let mut candidates: Vec<(&String, &Vec<String>)> = match category {
            Some(wanted) => messages
                .iter()
                .filter(|(name, _)| name.eq_ignore_ascii_case(wanted))
                .collect(),
            None => messages.iter().filter(|(_, items)| !items.is_empty()).collect(),
        };
        random_order(&mut candidates);

        let mut seen = self.seen.lock().await;
        for (name, items) in candidates {
            if let Some(text) = seen.take_unseen(items) {
                info!("🌅 Daily message from {} ({} delivered so far)", name, seen.len());
                return Some(DailyMessage {
                    category: name.clone(),
                    text,
                });
            }
        }
        info!("📭 No undelivered daily message{}", category.map(|c| format!(" in {c}")).unwrap_or_default());
        None
    }

    fn recover(&self, conversation_id: i64, state: &ConversationState, fault: Fault) -> RenderInstruction {
        match fault {
            Fault::ContentUnavailable(what) => {
                warn!("⚠ Conversation {}: no {} available", conversation_id, what);
                RenderInstruction::screen(
                    format!("⚠ No hay {what} disponibles por ahora."),
                    vec![vec![Button::home()]],
                )
            }
            Fault::NoActiveSession => {
                debug!("Conversation {}: answer without an active question", conversation_id);
                quiz::no_active_question_notice()
            }
            Fault::UpstreamUnavailable(e) => {
                warn!("⚠ Meme lookup failed: {}", e);
                RenderInstruction::screen(
                    "⚠ No pude obtener un meme ahora mismo. Intenta más tarde.",
                    vec![vec![Button::new("🔁 Reintentar", Action::Meme), Button::home()]],
                )
            }
            Fault::UnknownToken(token) => {
                debug!("Conversation {}: ignoring unknown token '{}'", conversation_id, token);
                state
                    .last_render
                    .clone()
                    .unwrap_or_else(|| self.navigator.home())
            }
        }
    }
}

/// Leaving the trivia flow keeps the round, marked abandoned.
fn leave_round(state: &mut ConversationState) {
    if let Some(round) = state.quiz.as_mut()
        && round.status == RoundStatus::Posed
    {
        debug!("Trivia round in {} abandoned", round.category());
        round.status = RoundStatus::Abandoned;
    }
}
