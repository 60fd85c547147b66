//! Transport-neutral conversation core.
//!
//! A flow takes the current [`DialogueState`] plus one input and returns a
//! [`Transition`]: the next state (if it changes) and the [`Effect`]s the
//! transport must carry out. Nothing here talks to Telegram.

pub mod action;
pub mod admin;
pub mod booking;
pub mod keyboards;
pub mod state;

use chrono::{NaiveDate, NaiveDateTime};
use sqlx::SqlitePool;
use teloxide::types::InlineKeyboardMarkup;

use crate::config::AdminSet;

pub use action::{Action, AdminAction, BookingPeriod, ClientAction, SpecialistField, UrgentDelay};
pub use state::{BookingDraft, DialogueState};

/// What a flow needs besides its input.
#[derive(Clone, Copy)]
pub struct FlowContext<'a> {
    pub db: &'a SqlitePool,
    pub admins: &'a AdminSet,
    /// Wall clock at the moment the input arrived.
    pub now: NaiveDateTime,
}

impl<'a> FlowContext<'a> {
    pub fn new(db: &'a SqlitePool, admins: &'a AdminSet, now: NaiveDateTime) -> Self {
        Self { db, admins, now }
    }

    pub fn today(&self) -> NaiveDate {
        self.now.date()
    }
}

/// Who sent a message or pressed a button.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Sender {
    pub user_id: u64,
    pub username: Option<String>,
}

impl Sender {
    pub fn new(user_id: u64, username: Option<String>) -> Self {
        Self { user_id, username }
    }
}

/// Picture attached to a reply.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Media {
    None,
    /// The configured logo file, when present on disk.
    Logo,
    /// A photo already uploaded to Telegram.
    Photo(String),
}

/// How a reply reaches the chat.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Delivery {
    /// Delete the message whose button was pressed and send a fresh one.
    Replace,
    /// Edit the message whose button was pressed in place.
    Edit,
    /// Send a new message.
    Send,
}

/// A screen sent to the current chat. Text is MarkdownV2.
#[derive(Debug, Clone, PartialEq)]
pub struct Reply {
    pub text: String,
    pub keyboard: Option<InlineKeyboardMarkup>,
    pub media: Media,
    pub delivery: Delivery,
}

impl Reply {
    pub fn new(text: impl Into<String>, delivery: Delivery) -> Self {
        Self {
            text: text.into(),
            keyboard: None,
            media: Media::None,
            delivery,
        }
    }

    pub fn send(text: impl Into<String>) -> Self {
        Self::new(text, Delivery::Send)
    }

    pub fn edit(text: impl Into<String>) -> Self {
        Self::new(text, Delivery::Edit)
    }

    pub fn replace(text: impl Into<String>) -> Self {
        Self::new(text, Delivery::Replace)
    }

    pub fn keyboard(mut self, keyboard: InlineKeyboardMarkup) -> Self {
        self.keyboard = Some(keyboard);
        self
    }

    pub fn media(mut self, media: Media) -> Self {
        self.media = media;
        self
    }
}

/// Side effects the transport performs after a transition.
#[derive(Debug, Clone, PartialEq)]
pub enum Effect {
    Reply(Reply),
    /// Callback answer; `alert` shows a modal instead of a toast.
    Toast { text: String, alert: bool },
    /// Delete the message whose button was pressed.
    Dismiss,
    /// Best-effort message to another chat (admin notifications).
    Notify { chat_id: i64, text: String },
}

/// Result of feeding one input to a flow.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Transition {
    /// `None` leaves the stored state untouched.
    pub state: Option<DialogueState>,
    pub effects: Vec<Effect>,
}

impl Transition {
    /// No state change, no effects.
    pub fn keep() -> Self {
        Self::default()
    }

    pub fn to(state: DialogueState) -> Self {
        Self {
            state: Some(state),
            effects: Vec::new(),
        }
    }

    /// Clears the conversation.
    pub fn reset() -> Self {
        Self::to(DialogueState::Idle)
    }

    pub fn reply(mut self, reply: Reply) -> Self {
        self.effects.push(Effect::Reply(reply));
        self
    }

    pub fn toast(mut self, text: impl Into<String>) -> Self {
        self.effects.push(Effect::Toast {
            text: text.into(),
            alert: false,
        });
        self
    }

    pub fn alert(mut self, text: impl Into<String>) -> Self {
        self.effects.push(Effect::Toast {
            text: text.into(),
            alert: true,
        });
        self
    }

    pub fn with(mut self, effect: Effect) -> Self {
        self.effects.push(effect);
        self
    }

    pub fn with_all(mut self, effects: impl IntoIterator<Item = Effect>) -> Self {
        self.effects.extend(effects);
        self
    }

    pub fn replies(&self) -> impl Iterator<Item = &Reply> {
        self.effects.iter().filter_map(|effect| match effect {
            Effect::Reply(reply) => Some(reply),
            _ => None,
        })
    }

    pub fn notifications(&self) -> impl Iterator<Item = (i64, &str)> {
        self.effects.iter().filter_map(|effect| match effect {
            Effect::Notify { chat_id, text } => Some((*chat_id, text.as_str())),
            _ => None,
        })
    }
}
