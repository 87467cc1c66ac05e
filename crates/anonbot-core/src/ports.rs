use async_trait::async_trait;

use crate::{
    blocks::{Block, View},
    domain::{ChannelId, TriggerId, UserId},
    Result,
};

/// Outbound port: the subset of the Slack Web API the bot drives.
///
/// Each call is a single request/response; a rejection by the platform is
/// reported as [`crate::Error::Platform`] with the raw error code.
#[async_trait]
pub trait SlackApi: Send + Sync {
    /// `views.publish`: replace the user's app home tab.
    async fn publish_view(&self, user: &UserId, view: &View) -> Result<()>;

    /// `views.open`: open a modal scoped to the interaction's trigger.
    async fn open_view(&self, trigger: &TriggerId, view: &View) -> Result<()>;

    /// `chat.postMessage`: `text` is the notification fallback for `blocks`.
    async fn post_message(&self, channel: &ChannelId, text: &str, blocks: &[Block]) -> Result<()>;
}

/// Per-interaction acknowledgement.
///
/// For a view submission, acknowledging closes the modal on the client; an
/// interaction left unacknowledged shows a timeout indicator instead.
#[async_trait]
pub trait Acknowledger: Send + Sync {
    async fn ack(&self) -> Result<()>;
}
