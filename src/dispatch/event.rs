//! Inbound events
//!
//! Transport-neutral view of everything the bot reacts to. The transport
//! adapter builds these; the router consumes them.

use serde::{Deserialize, Serialize};

use crate::models::{UpsertUser, UserId};

/// Chat the event happened in
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatRef {
    pub id: i64,
    pub title: Option<String>,
    /// Group and supergroup chats; only they carry a ledger
    pub is_group: bool,
}

/// User behind the event, as identified by the transport
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Actor {
    pub id: UserId,
    pub display_name: String,
    pub handle: Option<String>,
    /// IETF language tag reported by the client
    pub language: Option<String>,
}

impl Actor {
    pub fn to_upsert(&self) -> UpsertUser {
        UpsertUser {
            id: self.id,
            display_name: self.display_name.clone(),
            handle: self.handle.clone(),
        }
    }
}

/// Bot's own membership in a chat
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChatMemberState {
    Member,
    Administrator,
    Left,
    Kicked,
    Restricted,
}

impl ChatMemberState {
    pub fn is_present(&self) -> bool {
        matches!(
            self,
            ChatMemberState::Member | ChatMemberState::Administrator | ChatMemberState::Restricted
        )
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum EventKind {
    Start,
    Help,
    Add {
        raw_args: String,
        message_id: i64,
    },
    Delete {
        /// Message the `/delete` command replies to
        replied_message_id: Option<i64>,
    },
    Transactions,
    Balance,
    Members,
    Currency {
        raw_args: String,
    },
    MessageEdited {
        message_id: i64,
        text: String,
    },
    Text {
        text: String,
    },
    MembershipChanged {
        new_status: ChatMemberState,
        previous_status: ChatMemberState,
    },
    Callback {
        signal: String,
    },
}

impl EventKind {
    /// Short name for logs
    pub fn name(&self) -> &'static str {
        match self {
            EventKind::Start => "start",
            EventKind::Help => "help",
            EventKind::Add { .. } => "add",
            EventKind::Delete { .. } => "delete",
            EventKind::Transactions => "transactions",
            EventKind::Balance => "balance",
            EventKind::Members => "members",
            EventKind::Currency { .. } => "currency",
            EventKind::MessageEdited { .. } => "message_edited",
            EventKind::Text { .. } => "text",
            EventKind::MembershipChanged { .. } => "membership_changed",
            EventKind::Callback { .. } => "callback",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InboundEvent {
    pub chat: ChatRef,
    pub actor: Option<Actor>,
    pub kind: EventKind,
}

impl InboundEvent {
    pub fn new(chat: ChatRef, actor: Option<Actor>, kind: EventKind) -> Self {
        Self { chat, actor, kind }
    }

    /// Ordering key used by the dispatch serializer
    pub fn chat_key(&self) -> i64 {
        self.chat.id
    }

    pub fn actor_id(&self) -> Option<UserId> {
        self.actor.as_ref().map(|actor| actor.id)
    }

    pub fn language(&self) -> Option<&str> {
        self.actor.as_ref().and_then(|actor| actor.language.as_deref())
    }
}
