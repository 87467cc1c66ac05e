use std::fmt;

/// Slack user id (`U…`).
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct UserId(pub String);

/// Slack conversation id (`C…` channel, `D…` DM, or a user id for DMs).
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct ChannelId(pub String);

/// Short-lived token that allows opening a modal in response to an interaction.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct TriggerId(pub String);

impl UserId {
    /// Posting to a user id delivers a direct message from the bot.
    pub fn dm_channel(&self) -> ChannelId {
        ChannelId(self.0.clone())
    }
}

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl fmt::Display for ChannelId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// An anonymous report as submitted through the modal.
///
/// Never persisted: it lives for a single handler invocation.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Report {
    pub destination: ChannelId,
    pub text: String,
}
