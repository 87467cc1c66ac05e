use async_trait::async_trait;
use serde::Serialize;

use anonbot_core::{
    blocks::{Block, View},
    domain::{ChannelId, TriggerId, UserId},
    errors::Error,
    ports::SlackApi,
    Result,
};

pub const SLACK_API_BASE: &str = "https://slack.com/api";

/// Web API client authenticated with the bot token.
#[derive(Clone, Debug)]
pub struct SlackWebClient {
    bot_token: String,
    http: reqwest::Client,
}

#[derive(Serialize)]
struct PublishViewRequest<'a> {
    user_id: &'a str,
    view: &'a View,
}

#[derive(Serialize)]
struct OpenViewRequest<'a> {
    trigger_id: &'a str,
    view: &'a View,
}

#[derive(Serialize)]
struct PostMessageRequest<'a> {
    channel: &'a str,
    text: &'a str,
    blocks: &'a [Block],
}

impl SlackWebClient {
    pub fn new(bot_token: impl Into<String>) -> Self {
        Self {
            bot_token: bot_token.into(),
            http: reqwest::Client::new(),
        }
    }

    pub fn http(&self) -> reqwest::Client {
        self.http.clone()
    }

    async fn call_json<T: Serialize + ?Sized>(
        &self,
        method: &str,
        body: &T,
    ) -> Result<serde_json::Value> {
        let resp = self
            .http
            .post(format!("{SLACK_API_BASE}/{method}"))
            .bearer_auth(&self.bot_token)
            .json(body)
            .send()
            .await
            .map_err(|e| Error::Transport(format!("{method}: {e}")))?;
        read_response(method, resp).await
    }

    /// `auth.test`: verifies the bot token and returns the bot's user id.
    pub async fn auth_test(&self) -> Result<String> {
        let body = call_form(&self.http, &self.bot_token, "auth.test").await?;
        string_field("auth.test", &body, "user_id")
    }
}

/// `apps.connections.open`: exchange the app-level token for a Socket Mode URL.
pub async fn open_socket_url(http: &reqwest::Client, app_token: &str) -> Result<String> {
    let body = call_form(http, app_token, "apps.connections.open").await?;
    string_field("apps.connections.open", &body, "url")
}

async fn call_form(http: &reqwest::Client, token: &str, method: &str) -> Result<serde_json::Value> {
    let resp = http
        .post(format!("{SLACK_API_BASE}/{method}"))
        .bearer_auth(token)
        .header(
            reqwest::header::CONTENT_TYPE,
            "application/x-www-form-urlencoded",
        )
        .send()
        .await
        .map_err(|e| Error::Transport(format!("{method}: {e}")))?;
    read_response(method, resp).await
}

async fn read_response(method: &str, resp: reqwest::Response) -> Result<serde_json::Value> {
    let status = resp.status();
    let raw = resp
        .text()
        .await
        .map_err(|e| Error::Transport(format!("{method}: {e}")))?;
    parse_response(method, status.as_u16(), &raw)
}

/// Decode a Web API response; `ok: false` becomes [`Error::Platform`].
fn parse_response(method: &str, status: u16, raw: &str) -> Result<serde_json::Value> {
    let body: serde_json::Value = match serde_json::from_str(raw) {
        Ok(v) => v,
        Err(_) if !(200..300).contains(&status) => {
            return Err(Error::Transport(format!(
                "{method}: HTTP {status} {}",
                raw.chars().take(300).collect::<String>()
            )));
        }
        Err(e) => return Err(Error::Json(e)),
    };

    if body.get("ok").and_then(|v| v.as_bool()) != Some(true) {
        let code = body
            .get("error")
            .and_then(|v| v.as_str())
            .unwrap_or("unknown");
        return Err(Error::platform(method, code));
    }
    Ok(body)
}

fn string_field(method: &str, body: &serde_json::Value, field: &str) -> Result<String> {
    body.get(field)
        .and_then(|v| v.as_str())
        .map(|s| s.to_string())
        .ok_or_else(|| Error::External(format!("{method} response missing {field}")))
}

#[async_trait]
impl SlackApi for SlackWebClient {
    async fn publish_view(&self, user: &UserId, view: &View) -> Result<()> {
        self.call_json(
            "views.publish",
            &PublishViewRequest {
                user_id: &user.0,
                view,
            },
        )
        .await?;
        Ok(())
    }

    async fn open_view(&self, trigger: &TriggerId, view: &View) -> Result<()> {
        self.call_json(
            "views.open",
            &OpenViewRequest {
                trigger_id: &trigger.0,
                view,
            },
        )
        .await?;
        Ok(())
    }

    async fn post_message(&self, channel: &ChannelId, text: &str, blocks: &[Block]) -> Result<()> {
        self.call_json(
            "chat.postMessage",
            &PostMessageRequest {
                channel: &channel.0,
                text,
                blocks,
            },
        )
        .await?;
        Ok(())
    }
}
