//! Socket Mode transport.
//!
//! One WebSocket connection receives envelopes; each envelope is dispatched
//! on its own task. Acks are sent back through a channel to the single
//! socket writer.

use std::{
    sync::{
        atomic::{AtomicBool, Ordering},
        Arc,
    },
    time::Duration,
};

use anyhow::{bail, Context};
use async_trait::async_trait;
use futures_util::{SinkExt, StreamExt};
use serde::Deserialize;
use tokio::sync::mpsc;
use tokio_tungstenite::tungstenite::Message as WsMessage;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

use anonbot_core::{
    errors::Error,
    events::IncomingEvent,
    handlers::{Dispatch, Dispatcher},
    ports::Acknowledger,
    Result,
};

use crate::client::open_socket_url;

#[derive(Debug, Deserialize)]
struct Envelope {
    #[serde(rename = "type")]
    kind: String,
    #[serde(default)]
    envelope_id: Option<String>,
    #[serde(default)]
    payload: serde_json::Value,
    #[serde(default)]
    reason: Option<String>,
}

/// What to do with one decoded envelope.
#[derive(Debug, PartialEq, Eq)]
enum EnvelopeAction {
    Hello,
    Disconnect(Option<String>),
    /// Events need no handler ack: acknowledged before dispatch.
    DispatchEvent {
        envelope_id: Option<String>,
        event: IncomingEvent,
    },
    /// Interactions are acknowledged by their handler.
    DispatchInteraction {
        envelope_id: Option<String>,
        event: IncomingEvent,
    },
    AckOnly {
        envelope_id: Option<String>,
    },
}

fn classify(text: &str) -> Result<EnvelopeAction> {
    let envelope: Envelope = serde_json::from_str(text)?;
    let envelope_id = envelope.envelope_id;

    Ok(match envelope.kind.as_str() {
        "hello" => EnvelopeAction::Hello,
        "disconnect" => EnvelopeAction::Disconnect(envelope.reason),
        "events_api" => match IncomingEvent::from_events_api(&envelope.payload)? {
            Some(event) => EnvelopeAction::DispatchEvent { envelope_id, event },
            None => EnvelopeAction::AckOnly { envelope_id },
        },
        "interactive" => match IncomingEvent::from_interactive(&envelope.payload)? {
            Some(event) => EnvelopeAction::DispatchInteraction { envelope_id, event },
            None => EnvelopeAction::AckOnly { envelope_id },
        },
        other => {
            debug!(kind = other, "ignoring envelope type");
            EnvelopeAction::AckOnly { envelope_id }
        }
    })
}

/// Like [`classify`], but an undecodable frame still gets acked when its
/// `envelope_id` can be read, so the platform does not redeliver it.
fn plan(text: &str) -> EnvelopeAction {
    match classify(text) {
        Ok(action) => action,
        Err(e) => {
            warn!("Slack: failed to parse envelope: {e}");
            EnvelopeAction::AckOnly {
                envelope_id: lenient_envelope_id(text),
            }
        }
    }
}

fn lenient_envelope_id(text: &str) -> Option<String> {
    let value: serde_json::Value = serde_json::from_str(text).ok()?;
    value.get("envelope_id")?.as_str().map(|s| s.to_string())
}

/// Run one envelope through the dispatcher, applying the transport's ack rules.
///
/// Events are acked before dispatch; unrouted interactions are acked after
/// it. Routed interactions are left to their handler.
async fn dispatch_envelope(
    dispatcher: &Dispatcher,
    event: &IncomingEvent,
    ack: &dyn Acknowledger,
    ack_first: bool,
) -> Dispatch {
    if ack_first {
        log_ack_failure(ack.ack().await);
    }
    let result = dispatcher.dispatch(event, ack).await;
    if let Dispatch::Unrouted = result {
        log_ack_failure(ack.ack().await);
    }
    result
}

fn ack_frame(envelope_id: &str) -> String {
    serde_json::json!({ "envelope_id": envelope_id }).to_string()
}

/// Acknowledges one envelope at most once.
struct EnvelopeAck {
    envelope_id: Option<String>,
    tx: mpsc::UnboundedSender<WsMessage>,
    acked: AtomicBool,
}

impl EnvelopeAck {
    fn new(envelope_id: Option<String>, tx: mpsc::UnboundedSender<WsMessage>) -> Self {
        Self {
            envelope_id,
            tx,
            acked: AtomicBool::new(false),
        }
    }
}

#[async_trait]
impl Acknowledger for EnvelopeAck {
    async fn ack(&self) -> Result<()> {
        let Some(id) = &self.envelope_id else {
            return Ok(());
        };
        if self.acked.swap(true, Ordering::SeqCst) {
            return Ok(());
        }
        self.tx
            .send(WsMessage::Text(ack_frame(id)))
            .map_err(|_| Error::Transport("socket writer closed".to_string()))
    }
}

enum Flow {
    Continue,
    Reconnect,
}

pub struct SocketModeRunner {
    app_token: String,
    http: reqwest::Client,
    dispatcher: Arc<Dispatcher>,
    reconnect_delay: Duration,
}

impl SocketModeRunner {
    pub fn new(
        app_token: impl Into<String>,
        http: reqwest::Client,
        dispatcher: Arc<Dispatcher>,
        reconnect_delay: Duration,
    ) -> Self {
        Self {
            app_token: app_token.into(),
            http,
            dispatcher,
            reconnect_delay,
        }
    }

    /// Stay connected until `cancel` fires, reconnecting after any drop.
    pub async fn run(&self, cancel: CancellationToken) -> anyhow::Result<()> {
        loop {
            tokio::select! {
                _ = cancel.cancelled() => return Ok(()),
                res = self.run_once() => match res {
                    Ok(()) => info!("Slack Socket Mode: server requested reconnect"),
                    Err(e) => warn!("Slack Socket Mode disconnected: {e:#}"),
                },
            }

            info!(
                "Slack: reconnecting in {} seconds...",
                self.reconnect_delay.as_secs()
            );
            tokio::select! {
                _ = cancel.cancelled() => return Ok(()),
                _ = tokio::time::sleep(self.reconnect_delay) => {}
            }
        }
    }

    async fn run_once(&self) -> anyhow::Result<()> {
        let ws_url = open_socket_url(&self.http, &self.app_token)
            .await
            .context("apps.connections.open failed")?;
        info!("Slack Socket Mode: connecting to WebSocket...");

        let (ws_stream, _) = tokio_tungstenite::connect_async(ws_url.as_str())
            .await
            .context("WebSocket connect failed")?;
        let (mut write, mut read) = ws_stream.split();
        let (tx, mut rx) = mpsc::unbounded_channel::<WsMessage>();

        loop {
            tokio::select! {
                Some(out) = rx.recv() => {
                    write.send(out).await.context("WebSocket write failed")?;
                }
                msg = read.next() => {
                    let Some(msg) = msg else {
                        bail!("WebSocket stream ended");
                    };
                    match msg.context("WebSocket read error")? {
                        WsMessage::Text(text) => {
                            if let Flow::Reconnect = self.on_text(&text, &tx) {
                                let _ = write.close().await;
                                return Ok(());
                            }
                        }
                        WsMessage::Ping(data) => {
                            if let Err(e) = write.send(WsMessage::Pong(data)).await {
                                warn!("Slack: failed to send pong: {e}");
                            }
                        }
                        WsMessage::Close(_) => bail!("WebSocket closed by server"),
                        _ => {}
                    }
                }
            }
        }
    }

    fn on_text(&self, text: &str, tx: &mpsc::UnboundedSender<WsMessage>) -> Flow {
        match plan(text) {
            EnvelopeAction::Hello => info!("Slack Socket Mode: connected"),
            EnvelopeAction::Disconnect(reason) => {
                info!(reason = ?reason, "Slack Socket Mode: disconnect requested");
                return Flow::Reconnect;
            }
            EnvelopeAction::AckOnly { envelope_id } => {
                let ack = EnvelopeAck::new(envelope_id, tx.clone());
                tokio::spawn(async move { log_ack_failure(ack.ack().await) });
            }
            EnvelopeAction::DispatchEvent { envelope_id, event } => {
                let ack = EnvelopeAck::new(envelope_id, tx.clone());
                self.spawn_dispatch(event, ack, true);
            }
            EnvelopeAction::DispatchInteraction { envelope_id, event } => {
                let ack = EnvelopeAck::new(envelope_id, tx.clone());
                self.spawn_dispatch(event, ack, false);
            }
        }
        Flow::Continue
    }

    fn spawn_dispatch(&self, event: IncomingEvent, ack: EnvelopeAck, ack_first: bool) {
        let dispatcher = self.dispatcher.clone();
        tokio::spawn(async move {
            dispatch_envelope(&dispatcher, &event, &ack, ack_first).await;
        });
    }
}

fn log_ack_failure(res: Result<()>) {
    if let Err(e) = res {
        error!("Slack: failed to send ack: {e}");
    }
}
