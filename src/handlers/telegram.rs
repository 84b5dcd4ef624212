//! Telegram transport
//!
//! Converts teloxide updates into inbound events, pushes them through the
//! dispatch serializer and renders the outcome back into Bot API calls.

use std::sync::Arc;

use teloxide::dispatching::{UpdateFilterExt, UpdateHandler};
use teloxide::prelude::*;
use teloxide::types::{
    BotCommand, CallbackQuery, Chat, ChatId, ChatMemberStatus, ChatMemberUpdated,
    InlineKeyboardButton, InlineKeyboardMarkup, Message, MessageId, Update, User,
};
use tracing::{debug, error, info, warn};

use crate::dispatch::{
    Actor, ChatMemberState, ChatRef, DispatchSerializer, EventKind, InboundEvent, Outbound, Reply,
};
use crate::i18n::{render_option_label, render_reply, I18n};
use crate::utils::errors::Result;
use crate::utils::helpers::{split_command, truncate_text};

type HandlerResult = std::result::Result<(), Box<dyn std::error::Error + Send + Sync>>;

/// Telegram caps callback answers at 200 characters
const NOTICE_MAX_CHARS: usize = 200;

/// Commands advertised to clients, paired with their description key
pub const COMMANDS: [(&str, &str); 8] = [
    ("start", "commands.start"),
    ("help", "commands.help"),
    ("add", "commands.add"),
    ("delete", "commands.delete"),
    ("transactions", "commands.transactions"),
    ("balance", "commands.balance"),
    ("members", "commands.members"),
    ("currency", "commands.currency"),
];

/// Update handler tree for the teloxide dispatcher
pub fn schema() -> UpdateHandler<Box<dyn std::error::Error + Send + Sync + 'static>> {
    dptree::entry()
        .branch(Update::filter_message().endpoint(handle_message))
        .branch(Update::filter_edited_message().endpoint(handle_edited_message))
        .branch(Update::filter_callback_query().endpoint(handle_callback))
        .branch(Update::filter_my_chat_member().endpoint(handle_my_chat_member))
}

/// Register the command list, once per supported language and once as default
pub async fn register_commands(bot: &Bot, i18n: &I18n) -> Result<()> {
    let commands = |lang: &str| -> Vec<BotCommand> {
        COMMANDS
            .iter()
            .map(|(name, key)| BotCommand::new(*name, i18n.t(key, lang, None)))
            .collect()
    };

    bot.set_my_commands(commands(i18n.default_language())).await?;
    for lang in i18n.supported_languages() {
        bot.set_my_commands(commands(lang))
            .language_code(lang.clone())
            .await?;
    }

    info!(languages = i18n.supported_languages().len(), "Bot commands registered");
    Ok(())
}

/// Classify the text of a new message
pub fn message_kind(text: &str, message_id: i64, replied_message_id: Option<i64>) -> EventKind {
    let Some((name, args)) = split_command(text) else {
        return EventKind::Text {
            text: text.to_string(),
        };
    };

    match name.as_str() {
        "start" => EventKind::Start,
        "help" => EventKind::Help,
        "add" => EventKind::Add {
            raw_args: args,
            message_id,
        },
        "delete" => EventKind::Delete { replied_message_id },
        "transactions" => EventKind::Transactions,
        "balance" => EventKind::Balance,
        "members" => EventKind::Members,
        "currency" => EventKind::Currency { raw_args: args },
        _ => EventKind::Text {
            text: text.to_string(),
        },
    }
}

pub fn member_state(status: ChatMemberStatus) -> ChatMemberState {
    match status {
        ChatMemberStatus::Owner | ChatMemberStatus::Administrator => ChatMemberState::Administrator,
        ChatMemberStatus::Member => ChatMemberState::Member,
        ChatMemberStatus::Restricted => ChatMemberState::Restricted,
        ChatMemberStatus::Left => ChatMemberState::Left,
        ChatMemberStatus::Banned => ChatMemberState::Kicked,
    }
}

fn chat_ref(chat: &Chat) -> ChatRef {
    ChatRef {
        id: chat.id.0,
        title: chat.title().map(str::to_string),
        is_group: chat.is_group() || chat.is_supergroup(),
    }
}

fn actor(user: &User) -> Actor {
    Actor {
        id: user.id.0 as i64,
        display_name: user.full_name(),
        handle: user.username.clone(),
        language: user.language_code.clone(),
    }
}

async fn handle_message(
    bot: Bot,
    msg: Message,
    serializer: DispatchSerializer,
    i18n: Arc<I18n>,
) -> HandlerResult {
    let Some(text) = msg.text() else {
        return Ok(());
    };

    let replied = msg.reply_to_message().map(|reply| i64::from(reply.id.0));
    let kind = message_kind(text, i64::from(msg.id.0), replied);
    let event = InboundEvent::new(chat_ref(&msg.chat), msg.from.as_ref().map(actor), kind);

    run(&bot, &serializer, &i18n, event, None).await?;
    Ok(())
}

async fn handle_edited_message(
    bot: Bot,
    msg: Message,
    serializer: DispatchSerializer,
    i18n: Arc<I18n>,
) -> HandlerResult {
    let Some(text) = msg.text() else {
        return Ok(());
    };

    let kind = EventKind::MessageEdited {
        message_id: i64::from(msg.id.0),
        text: text.to_string(),
    };
    let event = InboundEvent::new(chat_ref(&msg.chat), msg.from.as_ref().map(actor), kind);

    run(&bot, &serializer, &i18n, event, None).await?;
    Ok(())
}

async fn handle_callback(
    bot: Bot,
    query: CallbackQuery,
    serializer: DispatchSerializer,
    i18n: Arc<I18n>,
) -> HandlerResult {
    let (Some(signal), Some(message)) = (query.data.clone(), query.message.as_ref()) else {
        bot.answer_callback_query(query.id.clone()).await?;
        return Ok(());
    };

    let event = InboundEvent::new(
        chat_ref(message.chat()),
        Some(actor(&query.from)),
        EventKind::Callback { signal },
    );
    let notice = run(&bot, &serializer, &i18n, event, Some(message.id())).await;

    let answer = bot.answer_callback_query(query.id.clone());
    let answered = match &notice {
        Ok(Some(text)) => answer.text(text.clone()).await,
        _ => answer.await,
    };
    if let Err(e) = answered {
        warn!(error = %e, "Failed to answer callback query");
    }

    notice?;
    Ok(())
}

async fn handle_my_chat_member(
    bot: Bot,
    update: ChatMemberUpdated,
    serializer: DispatchSerializer,
    i18n: Arc<I18n>,
) -> HandlerResult {
    let kind = EventKind::MembershipChanged {
        new_status: member_state(update.new_chat_member.status()),
        previous_status: member_state(update.old_chat_member.status()),
    };
    let event = InboundEvent::new(chat_ref(&update.chat), Some(actor(&update.from)), kind);

    run(&bot, &serializer, &i18n, event, None).await?;
    Ok(())
}

/// Dispatch one event and deliver its effects; returns the notice text, if any
async fn run(
    bot: &Bot,
    serializer: &DispatchSerializer,
    i18n: &I18n,
    event: InboundEvent,
    origin: Option<MessageId>,
) -> Result<Option<String>> {
    let chat_id = ChatId(event.chat.id);
    let lang = i18n.detect_user_language(event.language());

    let outbound = match serializer.dispatch(event).await {
        Ok(outbound) => outbound,
        Err(e) => {
            error!(chat_id = chat_id.0, error = %e, "Event dispatch failed");
            vec![Outbound::send(e.reply_key())]
        }
    };

    deliver(bot, i18n, &lang, chat_id, origin, outbound).await
}

async fn deliver(
    bot: &Bot,
    i18n: &I18n,
    lang: &str,
    chat_id: ChatId,
    origin: Option<MessageId>,
    outbound: Vec<Outbound>,
) -> Result<Option<String>> {
    let mut notice = None;

    for effect in outbound {
        match effect {
            Outbound::Send(reply) => {
                let text = render_reply(i18n, &reply, lang);
                match keyboard(i18n, &reply, lang) {
                    Some(markup) => bot.send_message(chat_id, text).reply_markup(markup).await?,
                    None => bot.send_message(chat_id, text).await?,
                };
            }
            Outbound::EditOrigin(reply) => {
                let text = render_reply(i18n, &reply, lang);
                match origin {
                    Some(message_id) => {
                        let request = bot.edit_message_text(chat_id, message_id, text);
                        match keyboard(i18n, &reply, lang) {
                            Some(markup) => request.reply_markup(markup).await?,
                            None => request.await?,
                        };
                    }
                    None => {
                        bot.send_message(chat_id, text).await?;
                    }
                }
            }
            Outbound::DeleteOrigin => {
                if let Some(message_id) = origin {
                    if let Err(e) = bot.delete_message(chat_id, message_id).await {
                        warn!(chat_id = chat_id.0, error = %e, "Failed to delete message");
                    }
                }
            }
            Outbound::Notice(reply) => {
                let text = render_reply(i18n, &reply, lang);
                notice = Some(truncate_text(&text, NOTICE_MAX_CHARS));
            }
        }
    }

    debug!(chat_id = chat_id.0, "Effects delivered");
    Ok(notice)
}

fn keyboard(i18n: &I18n, reply: &Reply, lang: &str) -> Option<InlineKeyboardMarkup> {
    if reply.options.is_empty() {
        return None;
    }

    let rows = reply.options.iter().map(|row| {
        row.iter()
            .map(|option| {
                InlineKeyboardButton::callback(
                    render_option_label(i18n, option, lang),
                    option.signal.clone(),
                )
            })
            .collect::<Vec<_>>()
    });
    Some(InlineKeyboardMarkup::new(rows))
}
