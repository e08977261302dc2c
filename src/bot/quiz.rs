//! Trivia rounds.
//!
//! A round starts when a question is posed and ends on a correct answer or
//! when the attempts run out. Navigating elsewhere leaves the round
//! `Abandoned`; its buttons still work if pressed later, and only idle
//! eviction of the conversation reclaims it.

use std::collections::BTreeMap;

use crate::bot::callback::Action;
use crate::bot::catalog::TriviaQuestion;
use crate::bot::markup::{capitalize, escape};
use crate::bot::render::{Button, RenderInstruction};
use crate::bot::selection::pick_random;

/// Attempts a player gets per question.
pub const INITIAL_ATTEMPTS: u8 = 2;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QuizMode {
    /// Question drawn from any category.
    Random,
    /// Question drawn from the round's category.
    Category,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RoundStatus {
    Posed,
    /// The player navigated away without answering.
    Abandoned,
}

/// The question currently in play for a conversation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QuizRound {
    pub question: TriviaQuestion,
    pub attempts_remaining: u8,
    pub mode: QuizMode,
    pub status: RoundStatus,
}

impl QuizRound {
    pub fn new(question: TriviaQuestion, mode: QuizMode) -> Self {
        Self {
            question,
            attempts_remaining: INITIAL_ATTEMPTS,
            mode,
            status: RoundStatus::Posed,
        }
    }

    pub fn category(&self) -> &str {
        &self.question.category
    }

    /// Action that poses the next question in the same mode.
    pub fn next_action(&self) -> Action {
        match self.mode {
            QuizMode::Random => Action::RandomTrivia,
            QuizMode::Category => Action::TriviaCategory(self.question.category.clone()),
        }
    }
}

/// Result of submitting an answer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AnswerOutcome {
    /// Right answer; the round is over.
    Correct(QuizRound),
    /// Wrong answer with attempts left; the round goes on.
    Retry { attempts_remaining: u8 },
    /// Wrong answer and no attempts left; the round is over.
    Exhausted(QuizRound),
    /// No round in play, or the answer belongs to another question.
    NoActiveQuestion,
}

/// Pick a question. `None` selects from every category; an unknown or empty
/// category yields `None`.
pub fn pose(trivia: &BTreeMap<String, Vec<TriviaQuestion>>, category: Option<&str>) -> Option<QuizRound> {
    match category {
        Some(category) => {
            let question = pick_random(trivia.get(category)?.as_slice())?;
            Some(QuizRound::new(question.clone(), QuizMode::Category))
        }
        None => {
            let categories: Vec<&Vec<TriviaQuestion>> =
                trivia.values().filter(|questions| !questions.is_empty()).collect();
            let questions = pick_random(&categories)?;
            let question = pick_random(questions.as_slice())?;
            Some(QuizRound::new(question.clone(), QuizMode::Random))
        }
    }
}

/// Apply an answer to the conversation's round.
///
/// The round is removed from `slot` when it resolves. Answers that are not
/// options of the current question are rejected without touching it.
pub fn submit(slot: &mut Option<QuizRound>, answer: &str) -> AnswerOutcome {
    let Some(round) = slot.as_mut() else {
        return AnswerOutcome::NoActiveQuestion;
    };
    if !round.question.options.iter().any(|o| o == answer) {
        return AnswerOutcome::NoActiveQuestion;
    }
    round.status = RoundStatus::Posed;

    if round.question.is_correct(answer) {
        return match slot.take() {
            Some(round) => AnswerOutcome::Correct(round),
            None => AnswerOutcome::NoActiveQuestion,
        };
    }

    round.attempts_remaining = round.attempts_remaining.saturating_sub(1);
    if round.attempts_remaining > 0 {
        return AnswerOutcome::Retry {
            attempts_remaining: round.attempts_remaining,
        };
    }
    match slot.take() {
        Some(round) => AnswerOutcome::Exhausted(round),
        None => AnswerOutcome::NoActiveQuestion,
    }
}

/// The question with one button per option.
pub fn question_view(round: &QuizRound) -> RenderInstruction {
    let question = &round.question;
    let mut keyboard: Vec<Vec<Button>> = question
        .options
        .iter()
        .map(|option| vec![Button::new(option.clone(), Action::TriviaAnswer(option.clone()))])
        .collect();
    keyboard.push(vec![Button::home()]);

    RenderInstruction::screen(
        format!(
            "🧠 <b>{}</b>\n\n{}\n\nIntentos: {}",
            escape(&capitalize(round.category())),
            question.prompt,
            round.attempts_remaining
        ),
        keyboard,
    )
}

/// The round's result, revealing the answer.
pub fn resolution_view(outcome: &AnswerOutcome) -> Option<RenderInstruction> {
    let (headline, round) = match outcome {
        AnswerOutcome::Correct(round) => ("✅ ¡Correcto!", round),
        AnswerOutcome::Exhausted(round) => ("❌ Se acabaron los intentos.", round),
        _ => return None,
    };
    Some(RenderInstruction::screen(
        format!(
            "{headline}\n\n{}\n\nLa respuesta correcta es: <b>{}</b>",
            round.question.prompt,
            escape(&round.question.answer)
        ),
        vec![
            vec![Button::new("🎲 Otra pregunta", round.next_action())],
            vec![Button::new("📂 Categorías", Action::TriviaCategoryPage(0))],
            vec![Button::home()],
        ],
    ))
}

/// Transient notice after a wrong answer that still leaves attempts.
pub fn retry_notice(attempts_remaining: u8) -> RenderInstruction {
    let remaining = if attempts_remaining == 1 {
        "Te queda 1 intento".to_string()
    } else {
        format!("Te quedan {attempts_remaining} intentos")
    };
    RenderInstruction::notice(format!("❌ Incorrecto. {remaining}."))
}

pub fn no_active_question_notice() -> RenderInstruction {
    RenderInstruction::notice("🤔 No hay una pregunta activa. Pide una nueva desde el menú de trivia.")
}
