//! Test helpers module
//!
//! Wires the router and the dispatch serializer over in-memory stores and
//! offers builders for the events a Telegram group would produce.

use std::sync::Arc;

use SplitBuddy::config::Settings;
use SplitBuddy::database::{LedgerStore, MemoryLedger};
use SplitBuddy::dispatch::{
    Actor, ChatRef, DispatchSerializer, EventKind, InboundEvent, Outbound, Reply, Router,
};
use SplitBuddy::services::ServiceFactory;
use SplitBuddy::state::{MemorySessionStorage, SessionStorage};

pub const GROUP_ID: i64 = -1001234567890;
pub const ALICE: i64 = 1001;
pub const BOB: i64 = 1002;
pub const CAROL: i64 = 1003;
pub const DAVE: i64 = 1004;

pub struct TestContext {
    pub store: Arc<MemoryLedger>,
    pub sessions: Arc<MemorySessionStorage>,
    pub services: ServiceFactory,
    pub serializer: DispatchSerializer,
    next_message_id: i64,
}

impl TestContext {
    pub fn new() -> Self {
        Self::with_settings(Settings::default())
    }

    pub fn with_settings(settings: Settings) -> Self {
        let store = Arc::new(MemoryLedger::new());
        let sessions = Arc::new(MemorySessionStorage::new());
        let ledger: Arc<dyn LedgerStore> = store.clone();
        let session_storage: Arc<dyn SessionStorage> = sessions.clone();

        let services = ServiceFactory::new(ledger, &settings);
        let router = Router::new(&services, &settings.dialog);
        let serializer = DispatchSerializer::new(Arc::new(router), session_storage, &settings.dispatch);

        Self {
            store,
            sessions,
            services,
            serializer,
            next_message_id: 100,
        }
    }

    /// Dispatch one event and return its effects
    pub async fn send(&self, event: InboundEvent) -> Vec<Outbound> {
        self.serializer
            .dispatch(event)
            .await
            .expect("dispatch should not fail")
    }

    /// Dispatch a group event from `user`
    pub async fn group(&self, user: i64, kind: EventKind) -> Vec<Outbound> {
        self.send(group_event(user, kind)).await
    }

    /// Post `/add <args>` and return the message id it was posted under
    pub async fn add(&mut self, user: i64, args: &str) -> (i64, Vec<Outbound>) {
        self.next_message_id += 1;
        let message_id = self.next_message_id;
        let outbound = self
            .group(
                user,
                EventKind::Add {
                    raw_args: args.to_string(),
                    message_id,
                },
            )
            .await;
        (message_id, outbound)
    }

    /// Let each user say something in the group so they become members
    pub async fn join(&self, users: &[i64]) {
        for user in users {
            let outbound = self
                .group(*user, EventKind::Text { text: "hi".to_string() })
                .await;
            assert!(outbound.is_empty(), "group chatter should get no reply");
        }
    }

    pub async fn click(&self, user: i64, signal: &str) -> Vec<Outbound> {
        self.group(user, EventKind::Callback { signal: signal.to_string() })
            .await
    }

    pub async fn say(&self, user: i64, text: &str) -> Vec<Outbound> {
        self.group(user, EventKind::Text { text: text.to_string() })
            .await
    }
}

pub fn actor(user: i64) -> Actor {
    Actor {
        id: user,
        display_name: user_name(user).to_string(),
        handle: None,
        language: Some("en".to_string()),
    }
}

pub fn user_name(user: i64) -> &'static str {
    match user {
        ALICE => "Alice",
        BOB => "Bob",
        CAROL => "Carol",
        DAVE => "Dave",
        _ => "Someone",
    }
}

pub fn group_event(user: i64, kind: EventKind) -> InboundEvent {
    InboundEvent::new(
        ChatRef {
            id: GROUP_ID,
            title: Some("Weekend trip".to_string()),
            is_group: true,
        },
        Some(actor(user)),
        kind,
    )
}

pub fn private_event(user: i64, kind: EventKind) -> InboundEvent {
    InboundEvent::new(
        ChatRef {
            id: user,
            title: None,
            is_group: false,
        },
        Some(actor(user)),
        kind,
    )
}

/// The single reply of a one-effect response
pub fn single_reply(outbound: &[Outbound]) -> &Reply {
    assert_eq!(outbound.len(), 1, "expected one effect, got {outbound:?}");
    outbound[0].reply().expect("effect should carry a reply")
}

pub fn reply_keys(outbound: &[Outbound]) -> Vec<&str> {
    outbound
        .iter()
        .filter_map(Outbound::reply)
        .map(|reply| reply.key.as_str())
        .collect()
}

/// First offered signal starting with `prefix`
pub fn find_signal<'a>(reply: &'a Reply, prefix: &str) -> &'a str {
    reply
        .signals()
        .find(|signal| signal.starts_with(prefix))
        .unwrap_or_else(|| panic!("no signal starting with {prefix} in {reply:?}"))
}
