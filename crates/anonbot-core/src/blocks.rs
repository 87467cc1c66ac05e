//! Typed Block Kit model.
//!
//! Views and messages are built from these closed enums and only turned into
//! JSON at the adapter boundary (`serde` with an internal `type` tag, which is
//! exactly the wire shape Slack expects).

use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum TextObject {
    PlainText {
        text: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        emoji: Option<bool>,
    },
    Mrkdwn {
        text: String,
    },
}

impl TextObject {
    /// Plain text with emoji shortcodes enabled.
    pub fn plain(text: impl Into<String>) -> Self {
        Self::PlainText {
            text: text.into(),
            emoji: Some(true),
        }
    }

    pub fn mrkdwn(text: impl Into<String>) -> Self {
        Self::Mrkdwn { text: text.into() }
    }
}

#[cfg(test)]
impl TextObject {
    pub fn text(&self) -> &str {
        match self {
            Self::PlainText { text, .. } | Self::Mrkdwn { text } => text,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Block {
    Header {
        text: TextObject,
    },
    Divider,
    Section {
        text: TextObject,
    },
    Actions {
        elements: Vec<BlockElement>,
    },
    Context {
        elements: Vec<TextObject>,
    },
    /// Input blocks are required unless Slack is told otherwise.
    Input {
        block_id: String,
        label: TextObject,
        element: BlockElement,
    },
    RichText {
        elements: Vec<RichTextElement>,
    },
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum BlockElement {
    Button {
        text: TextObject,
        action_id: String,
        value: String,
    },
    StaticSelect {
        action_id: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        placeholder: Option<TextObject>,
        options: Vec<SelectOption>,
    },
    PlainTextInput {
        action_id: String,
        multiline: bool,
    },
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SelectOption {
    pub text: TextObject,
    pub value: String,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum RichTextElement {
    RichTextSection { elements: Vec<RichTextSpan> },
    RichTextQuote { elements: Vec<RichTextSpan> },
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum RichTextSpan {
    Text {
        text: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        style: Option<TextStyle>,
    },
}

impl RichTextSpan {
    pub fn text(text: impl Into<String>) -> Self {
        Self::Text {
            text: text.into(),
            style: None,
        }
    }

    pub fn bold(text: impl Into<String>) -> Self {
        Self::Text {
            text: text.into(),
            style: Some(TextStyle { bold: true }),
        }
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TextStyle {
    pub bold: bool,
}

/// A surface payload: the app home tab or a modal.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum View {
    Home {
        callback_id: String,
        blocks: Vec<Block>,
    },
    Modal {
        callback_id: String,
        title: TextObject,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        submit: Option<TextObject>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        close: Option<TextObject>,
        blocks: Vec<Block>,
    },
}

#[cfg(test)]
impl View {
    pub fn callback_id(&self) -> &str {
        match self {
            Self::Home { callback_id, .. } | Self::Modal { callback_id, .. } => callback_id,
        }
    }

    pub fn blocks(&self) -> &[Block] {
        match self {
            Self::Home { blocks, .. } | Self::Modal { blocks, .. } => blocks,
        }
    }
}
