//! What the transport should show in response to an event.

use crate::bot::callback::Action;

/// One inline button.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Button {
    pub label: String,
    pub action: Action,
}

impl Button {
    pub fn new(label: impl Into<String>, action: Action) -> Self {
        Self {
            label: label.into(),
            action,
        }
    }

    pub fn home() -> Self {
        Self::new("🏠 Inicio", Action::Home)
    }
}

/// Ordered rows of buttons.
pub type Keyboard = Vec<Vec<Button>>;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RenderInstruction {
    /// A screen of HTML text, replacing the pressed message when there is one.
    Text { text: String, keyboard: Option<Keyboard> },
    /// A photo by URL.
    Photo { url: String, keyboard: Option<Keyboard> },
    /// A transient notice. The current screen stays as it is.
    Notice { text: String },
}

impl RenderInstruction {
    pub fn text(text: impl Into<String>) -> Self {
        Self::Text {
            text: text.into(),
            keyboard: None,
        }
    }

    pub fn screen(text: impl Into<String>, keyboard: Keyboard) -> Self {
        Self::Text {
            text: text.into(),
            keyboard: Some(keyboard),
        }
    }

    pub fn notice(text: impl Into<String>) -> Self {
        Self::Notice { text: text.into() }
    }

    /// Notices leave the screen alone; everything else replaces it.
    pub fn replaces_screen(&self) -> bool {
        !matches!(self, Self::Notice { .. })
    }

    pub fn keyboard(&self) -> Option<&Keyboard> {
        match self {
            Self::Text { keyboard, .. } | Self::Photo { keyboard, .. } => keyboard.as_ref(),
            Self::Notice { .. } => None,
        }
    }

    /// Whether any button on this screen triggers `action`.
    pub fn offers(&self, action: &Action) -> bool {
        self.keyboard()
            .is_some_and(|rows| rows.iter().flatten().any(|b| &b.action == action))
    }

    pub fn body(&self) -> &str {
        match self {
            Self::Text { text, .. } | Self::Notice { text } => text,
            Self::Photo { url, .. } => url,
        }
    }
}
