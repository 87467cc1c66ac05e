//! Interaction handlers and the dispatch table that routes events to them.
//!
//! Every handler follows the same failure policy: a failed outbound call is
//! logged with the platform error code and the remaining steps of that
//! handler are dropped. Nothing is retried and nothing propagates past the
//! handler; the outcome is returned so callers and tests can inspect it.

use std::sync::Arc;

use async_trait::async_trait;

use crate::{
    errors::Error,
    events::IncomingEvent,
    ports::{Acknowledger, SlackApi},
    settings::Settings,
};

mod dispatch;
mod home;
mod navigation;
mod submit;

pub use dispatch::{Dispatch, Dispatcher, Route};
pub use home::HomeOpenedHandler;
pub use navigation::HomeNavigationHandler;
pub use submit::SubmitReportHandler;

/// Read-only state shared by all handler invocations.
#[derive(Clone)]
pub struct HandlerContext {
    pub settings: Arc<Settings>,
    pub api: Arc<dyn SlackApi>,
}

impl HandlerContext {
    pub fn new(settings: Arc<Settings>, api: Arc<dyn SlackApi>) -> Self {
        Self { settings, api }
    }
}

#[derive(Debug)]
pub enum HandlerOutcome {
    /// Every step ran.
    Completed,
    /// The event did not meet the handler's precondition; no calls were made.
    Ignored,
    /// `step` failed; it was logged and the rest of the sequence was skipped.
    Dropped { step: &'static str, error: Error },
}

#[cfg(test)]
impl HandlerOutcome {
    pub fn is_completed(&self) -> bool {
        matches!(self, Self::Completed)
    }
}

#[async_trait]
pub trait Handler: Send + Sync {
    async fn handle(
        &self,
        ctx: &HandlerContext,
        event: &IncomingEvent,
        ack: &dyn Acknowledger,
    ) -> HandlerOutcome;
}

/// Log-and-drop: record the failure and end the handler's sequence.
pub(crate) fn log_and_drop(step: &'static str, error: Error) -> HandlerOutcome {
    tracing::error!(step, code = %error.code(), "Error {step}: {}", error.code());
    HandlerOutcome::Dropped { step, error }
}

#[cfg(test)]
pub(crate) mod fakes {
    //! Recording fakes for the outbound ports.

    use std::sync::Mutex;

    use super::*;
    use crate::{
        blocks::{Block, View},
        domain::{ChannelId, TriggerId, UserId},
        Result,
    };

    #[derive(Clone, Debug, PartialEq)]
    pub enum Call {
        Ack,
        PublishView { user: String, view: View },
        OpenView { trigger: String, view: View },
        PostMessage { channel: String, text: String, blocks: Vec<Block> },
    }

    /// Records every outbound call (acks included) in one ordered log.
    #[derive(Default)]
    pub struct FakeSlack {
        pub calls: Mutex<Vec<Call>>,
        /// Channel ids whose `chat.postMessage` fails with `channel_not_found`.
        pub failing_channels: Mutex<Vec<String>>,
        pub fail_publish: Mutex<bool>,
        pub fail_open: Mutex<bool>,
        pub fail_ack: Mutex<bool>,
    }

    impl FakeSlack {
        pub fn calls(&self) -> Vec<Call> {
            self.calls.lock().unwrap().clone()
        }

        fn record(&self, call: Call) {
            self.calls.lock().unwrap().push(call);
        }
    }

    #[async_trait]
    impl SlackApi for FakeSlack {
        async fn publish_view(&self, user: &UserId, view: &View) -> Result<()> {
            if *self.fail_publish.lock().unwrap() {
                return Err(Error::platform("views.publish", "not_enabled"));
            }
            self.record(Call::PublishView {
                user: user.0.clone(),
                view: view.clone(),
            });
            Ok(())
        }

        async fn open_view(&self, trigger: &TriggerId, view: &View) -> Result<()> {
            if *self.fail_open.lock().unwrap() {
                return Err(Error::platform("views.open", "expired_trigger_id"));
            }
            self.record(Call::OpenView {
                trigger: trigger.0.clone(),
                view: view.clone(),
            });
            Ok(())
        }

        async fn post_message(
            &self,
            channel: &ChannelId,
            text: &str,
            blocks: &[Block],
        ) -> Result<()> {
            if self.failing_channels.lock().unwrap().contains(&channel.0) {
                return Err(Error::platform("chat.postMessage", "channel_not_found"));
            }
            self.record(Call::PostMessage {
                channel: channel.0.clone(),
                text: text.to_string(),
                blocks: blocks.to_vec(),
            });
            Ok(())
        }
    }

    #[async_trait]
    impl Acknowledger for FakeSlack {
        async fn ack(&self) -> Result<()> {
            if *self.fail_ack.lock().unwrap() {
                return Err(Error::Transport("socket closed".to_string()));
            }
            self.record(Call::Ack);
            Ok(())
        }
    }
}
