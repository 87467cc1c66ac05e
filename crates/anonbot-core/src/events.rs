//! Inbound event model.
//!
//! The transport hands over the raw `payload` of a Socket Mode envelope; it is
//! decoded here into a small closed set of events the dispatcher understands.

use std::collections::BTreeMap;

use serde::Deserialize;

use crate::{
    domain::{ChannelId, Report, TriggerId, UserId},
    views::{REPORT_TEXT_ACTION, REPORT_TEXT_BLOCK, SEND_TO_ACTION, SEND_TO_BLOCK},
    Result,
};

pub const APP_HOME_OPENED: &str = "app_home_opened";

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum IncomingEvent {
    HomeOpened { user: UserId, tab: Option<String> },
    BlockAction(BlockAction),
    ViewSubmission(ViewSubmission),
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BlockAction {
    pub action_id: String,
    pub value: Option<String>,
    pub trigger_id: TriggerId,
    pub user: UserId,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ViewSubmission {
    pub callback_id: String,
    pub user: UserId,
    /// `block_id -> action_id -> submitted value`.
    pub values: BTreeMap<String, BTreeMap<String, SubmittedValue>>,
}

/// What a single input element submitted: a chosen option or typed text.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct SubmittedValue {
    pub selected: Option<String>,
    pub text: Option<String>,
}

impl ViewSubmission {
    pub fn value(&self, block_id: &str, action_id: &str) -> Option<&SubmittedValue> {
        self.values.get(block_id)?.get(action_id)
    }

    /// The report carried by a `submit_report` form, if both fields are present.
    pub fn report(&self) -> Option<Report> {
        let destination = self
            .value(SEND_TO_BLOCK, SEND_TO_ACTION)?
            .selected
            .clone()?;
        let text = self
            .value(REPORT_TEXT_BLOCK, REPORT_TEXT_ACTION)?
            .text
            .clone()?;
        Some(Report {
            destination: ChannelId(destination),
            text,
        })
    }
}

impl IncomingEvent {
    /// Decode the payload of an `events_api` envelope. Unknown event types yield `None`.
    pub fn from_events_api(payload: &serde_json::Value) -> Result<Option<Self>> {
        let wire: EventsApiPayload = serde_json::from_value(payload.clone())?;
        Ok(match wire.event {
            WireEvent::AppHomeOpened { user, tab } => Some(Self::HomeOpened {
                user: UserId(user),
                tab,
            }),
            WireEvent::Other => None,
        })
    }

    /// Decode the payload of an `interactive` envelope. Unknown interaction types yield `None`.
    pub fn from_interactive(payload: &serde_json::Value) -> Result<Option<Self>> {
        let wire: InteractivePayload = serde_json::from_value(payload.clone())?;
        Ok(match wire {
            InteractivePayload::BlockActions {
                user,
                trigger_id,
                actions,
            } => actions.into_iter().next().map(|a| {
                Self::BlockAction(BlockAction {
                    action_id: a.action_id,
                    value: a.value,
                    trigger_id: TriggerId(trigger_id),
                    user: UserId(user.id),
                })
            }),
            InteractivePayload::ViewSubmission { user, view } => {
                let values = view
                    .state
                    .values
                    .into_iter()
                    .map(|(block_id, actions)| {
                        let actions = actions
                            .into_iter()
                            .map(|(action_id, v)| {
                                (
                                    action_id,
                                    SubmittedValue {
                                        selected: v.selected_option.map(|o| o.value),
                                        text: v.value,
                                    },
                                )
                            })
                            .collect();
                        (block_id, actions)
                    })
                    .collect();
                Some(Self::ViewSubmission(ViewSubmission {
                    callback_id: view.callback_id,
                    user: UserId(user.id),
                    values,
                }))
            }
            InteractivePayload::Other => None,
        })
    }
}

#[derive(Deserialize)]
struct EventsApiPayload {
    event: WireEvent,
}

#[derive(Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
enum WireEvent {
    AppHomeOpened {
        user: String,
        #[serde(default)]
        tab: Option<String>,
    },
    #[serde(other)]
    Other,
}

#[derive(Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
enum InteractivePayload {
    BlockActions {
        user: WireUser,
        trigger_id: String,
        #[serde(default)]
        actions: Vec<WireAction>,
    },
    ViewSubmission {
        user: WireUser,
        view: WireView,
    },
    #[serde(other)]
    Other,
}

#[derive(Deserialize)]
struct WireUser {
    id: String,
}

#[derive(Deserialize)]
struct WireAction {
    action_id: String,
    #[serde(default)]
    value: Option<String>,
}

#[derive(Deserialize)]
struct WireView {
    callback_id: String,
    #[serde(default)]
    state: WireState,
}

#[derive(Default, Deserialize)]
struct WireState {
    #[serde(default)]
    values: BTreeMap<String, BTreeMap<String, WireActionState>>,
}

#[derive(Deserialize)]
struct WireActionState {
    #[serde(default)]
    selected_option: Option<WireOption>,
    #[serde(default)]
    value: Option<String>,
}

#[derive(Deserialize)]
struct WireOption {
    value: String,
}
