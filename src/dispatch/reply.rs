//! Outbound effects
//!
//! Replies carry a translation key and typed parameters. Money stays in minor
//! units with its currency code and times stay as timestamps; turning them
//! into text is left to the renderer.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum ParamValue {
    Text(String),
    Amount { minor: i64, currency: String },
    Timestamp(DateTime<Utc>),
    Number(i64),
}

pub type Params = BTreeMap<String, ParamValue>;

/// One extra line appended under the reply header
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Line {
    pub key: String,
    pub params: Params,
}

impl Line {
    pub fn new(key: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            params: Params::new(),
        }
    }

    pub fn param(mut self, name: impl Into<String>, value: ParamValue) -> Self {
        self.params.insert(name.into(), value);
        self
    }

    pub fn text(self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.param(name, ParamValue::Text(value.into()))
    }
}

/// Actionable option attached to a reply; choosing it yields `signal`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReplyOption {
    pub label_key: String,
    pub label_params: Params,
    pub signal: String,
}

impl ReplyOption {
    pub fn new(label_key: impl Into<String>, signal: impl Into<String>) -> Self {
        Self {
            label_key: label_key.into(),
            label_params: Params::new(),
            signal: signal.into(),
        }
    }

    pub fn param(mut self, name: impl Into<String>, value: ParamValue) -> Self {
        self.label_params.insert(name.into(), value);
        self
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Reply {
    pub key: String,
    pub params: Params,
    pub lines: Vec<Line>,
    /// Rows of options
    pub options: Vec<Vec<ReplyOption>>,
}

impl Reply {
    pub fn new(key: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            params: Params::new(),
            lines: Vec::new(),
            options: Vec::new(),
        }
    }

    pub fn param(mut self, name: impl Into<String>, value: ParamValue) -> Self {
        self.params.insert(name.into(), value);
        self
    }

    pub fn text(self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.param(name, ParamValue::Text(value.into()))
    }

    pub fn amount(self, name: impl Into<String>, minor: i64, currency: impl Into<String>) -> Self {
        self.param(
            name,
            ParamValue::Amount {
                minor,
                currency: currency.into(),
            },
        )
    }

    pub fn line(mut self, line: Line) -> Self {
        self.lines.push(line);
        self
    }

    pub fn option_row(mut self, row: Vec<ReplyOption>) -> Self {
        if !row.is_empty() {
            self.options.push(row);
        }
        self
    }

    /// All signals offered by this reply, row by row
    pub fn signals(&self) -> impl Iterator<Item = &str> {
        self.options
            .iter()
            .flatten()
            .map(|option| option.signal.as_str())
    }
}

/// What the transport should do in response to one event
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Outbound {
    /// New message in the chat
    Send(Reply),
    /// Replace the message whose option produced the signal; its options go away
    EditOrigin(Reply),
    /// Remove the message whose option produced the signal
    DeleteOrigin,
    /// Short acknowledgement of a signal
    Notice(Reply),
}

impl Outbound {
    pub fn send(key: impl Into<String>) -> Self {
        Outbound::Send(Reply::new(key))
    }

    /// The reply carried by this effect, if any
    pub fn reply(&self) -> Option<&Reply> {
        match self {
            Outbound::Send(reply) | Outbound::EditOrigin(reply) | Outbound::Notice(reply) => Some(reply),
            Outbound::DeleteOrigin => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reply_builder() {
        let reply = Reply::new("expense_added")
            .text("description", "Beer")
            .amount("amount", 4000, "EUR")
            .option_row(vec![ReplyOption::new("options.edit", "edit_exp:1")])
            .option_row(vec![]);

        assert_eq!(reply.params.len(), 2);
        assert_eq!(reply.options.len(), 1);
        assert_eq!(reply.signals().collect::<Vec<_>>(), vec!["edit_exp:1"]);
        assert_eq!(
            reply.params.get("amount"),
            Some(&ParamValue::Amount { minor: 4000, currency: "EUR".into() })
        );
    }

    #[test]
    fn test_outbound_reply_access() {
        assert!(Outbound::DeleteOrigin.reply().is_none());
        assert_eq!(Outbound::send("help").reply().map(|r| r.key.as_str()), Some("help"));
    }
}
