//! Per-conversation state, held in memory for the life of the process.
//!
//! Each conversation sits behind its own lock, so events for different chats
//! run concurrently while a single chat's read-modify-write (quiz attempts,
//! page offsets) stays serialized.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::Mutex;
use tracing::{debug, info};

use crate::bot::navigator::Screen;
use crate::bot::quiz::QuizRound;
use crate::bot::render::RenderInstruction;

/// Pagination offsets; jokes and trivia paginate independently.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct NavigationContext {
    pub jokes_page: usize,
    pub trivia_page: usize,
}

#[derive(Debug)]
pub struct ConversationState {
    pub nav: NavigationContext,
    /// Last menu screen shown, if the last thing shown was a menu.
    pub screen: Option<Screen>,
    pub quiz: Option<QuizRound>,
    /// What the conversation currently displays, for re-rendering.
    pub last_render: Option<RenderInstruction>,
    last_active: Instant,
}

impl ConversationState {
    fn new(now: Instant) -> Self {
        Self {
            nav: NavigationContext::default(),
            screen: None,
            quiz: None,
            last_render: None,
            last_active: now,
        }
    }

    pub fn touch(&mut self) {
        self.last_active = Instant::now();
    }

    pub fn idle_for(&self, now: Instant) -> Duration {
        now.saturating_duration_since(self.last_active)
    }
}

pub type ConversationHandle = Arc<Mutex<ConversationState>>;

/// Conversation states keyed by chat id.
pub struct SessionStore {
    conversations: Mutex<HashMap<i64, ConversationHandle>>,
    idle_ttl: Option<Duration>,
}

impl SessionStore {
    /// `idle_ttl` of `None` keeps conversations until restart.
    pub fn new(idle_ttl: Option<Duration>) -> Self {
        Self {
            conversations: Mutex::new(HashMap::new()),
            idle_ttl,
        }
    }

    /// The conversation's state, created on first contact.
    ///
    /// Marks it active under the map lock, so the janitor cannot evict it
    /// before the caller gets to lock it.
    pub async fn conversation(&self, conversation_id: i64) -> ConversationHandle {
        let mut conversations = self.conversations.lock().await;
        let handle = conversations
            .entry(conversation_id)
            .or_insert_with(|| {
                debug!("New conversation {}", conversation_id);
                Arc::new(Mutex::new(ConversationState::new(Instant::now())))
            })
            .clone();
        // A held lock means an event is in flight; eviction skips it anyway
        if let Ok(mut state) = handle.try_lock() {
            state.touch();
        }
        handle
    }

    pub async fn len(&self) -> usize {
        self.conversations.lock().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.conversations.lock().await.is_empty()
    }

    pub async fn contains(&self, conversation_id: i64) -> bool {
        self.conversations.lock().await.contains_key(&conversation_id)
    }

    /// Drop conversations idle longer than the TTL as of `now`.
    ///
    /// Conversations whose lock is held are in use and are kept.
    pub async fn evict_idle(&self, now: Instant) -> usize {
        let Some(ttl) = self.idle_ttl else {
            return 0;
        };
        let mut conversations = self.conversations.lock().await;
        let before = conversations.len();
        conversations.retain(|_, handle| match handle.try_lock() {
            Ok(state) => state.idle_for(now) <= ttl,
            Err(_) => true,
        });
        let evicted = before - conversations.len();
        if evicted > 0 {
            info!("🧹 Evicted {} idle conversation(s)", evicted);
        }
        evicted
    }

    /// Periodically evict idle conversations. No-op without a TTL.
    pub fn spawn_janitor(self: &Arc<Self>) {
        let Some(ttl) = self.idle_ttl else {
            info!("Idle conversation eviction disabled");
            return;
        };
        let store = Arc::clone(self);
        let period = (ttl / 4).max(Duration::from_secs(60));
        tokio::spawn(async move {
            let mut interval = tokio::time::interval(period);
            loop {
                interval.tick().await;
                store.evict_idle(Instant::now()).await;
            }
        });
    }
}
