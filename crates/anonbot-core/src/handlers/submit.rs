use async_trait::async_trait;

use super::{log_and_drop, Handler, HandlerContext, HandlerOutcome};
use crate::{
    errors::Error,
    events::IncomingEvent,
    ports::Acknowledger,
    views::{build_message_blocks, REPORT_RECEIVED_TITLE, REPORT_SENT_TITLE},
};

/// `submit_report` view: deliver the report, close the modal, confirm by DM.
///
/// The submission is only acknowledged once the report has been posted, so a
/// failed delivery leaves the modal open on the client and the user can retry.
/// The submitter's id is never logged next to the destination.
pub struct SubmitReportHandler;

#[async_trait]
impl Handler for SubmitReportHandler {
    async fn handle(
        &self,
        ctx: &HandlerContext,
        event: &IncomingEvent,
        ack: &dyn Acknowledger,
    ) -> HandlerOutcome {
        let IncomingEvent::ViewSubmission(submission) = event else {
            return HandlerOutcome::Ignored;
        };
        let Some(report) = submission.report() else {
            return log_and_drop(
                "reading report submission",
                Error::External("submission is missing destination or report text".to_string()),
            );
        };

        let report_blocks = build_message_blocks(REPORT_RECEIVED_TITLE, &report.text);
        if let Err(e) = ctx
            .api
            .post_message(&report.destination, &report.text, &report_blocks)
            .await
        {
            return log_and_drop("sending message", e);
        }
        tracing::info!(destination = %report.destination, "Report delivered");

        if let Err(e) = ack.ack().await {
            return log_and_drop("acknowledging submission", e);
        }

        let confirmation_blocks = build_message_blocks(REPORT_SENT_TITLE, &report.text);
        let confirmation_text = format!("{REPORT_SENT_TITLE}:\n{}", report.text);
        if let Err(e) = ctx
            .api
            .post_message(
                &submission.user.dm_channel(),
                &confirmation_text,
                &confirmation_blocks,
            )
            .await
        {
            return log_and_drop("sending confirmation", e);
        }

        HandlerOutcome::Completed
    }
}

#[cfg(test)]
mod tests {
    use std::{collections::BTreeMap, sync::Arc};

    use super::*;
    use crate::{
        domain::UserId,
        events::{SubmittedValue, ViewSubmission},
        handlers::fakes::{Call, FakeSlack},
        settings::{Destination, Settings},
        views::{
            REPORT_CALLBACK_ID, REPORT_TEXT_ACTION, REPORT_TEXT_BLOCK, SEND_TO_ACTION,
            SEND_TO_BLOCK,
        },
    };

    fn ctx(slack: &Arc<FakeSlack>) -> HandlerContext {
        HandlerContext::new(
            Arc::new(Settings {
                channels: vec![Destination::new("Sales", "C111")],
            }),
            slack.clone(),
        )
    }

    fn submission(destination: Option<&str>, text: &str) -> IncomingEvent {
        let mut values = BTreeMap::new();
        if let Some(dest) = destination {
            values.insert(
                SEND_TO_BLOCK.to_string(),
                BTreeMap::from([(
                    SEND_TO_ACTION.to_string(),
                    SubmittedValue {
                        selected: Some(dest.to_string()),
                        text: None,
                    },
                )]),
            );
        }
        values.insert(
            REPORT_TEXT_BLOCK.to_string(),
            BTreeMap::from([(
                REPORT_TEXT_ACTION.to_string(),
                SubmittedValue {
                    selected: None,
                    text: Some(text.to_string()),
                },
            )]),
        );
        IncomingEvent::ViewSubmission(ViewSubmission {
            callback_id: REPORT_CALLBACK_ID.to_string(),
            user: UserId("U9".to_string()),
            values,
        })
    }

    #[tokio::test]
    async fn posts_report_then_acks_then_confirms() {
        let slack = Arc::new(FakeSlack::default());
        let text = "the lights are broken";

        let outcome = SubmitReportHandler
            .handle(&ctx(&slack), &submission(Some("C111"), text), slack.as_ref())
            .await;

        assert!(outcome.is_completed());
        assert_eq!(
            slack.calls(),
            vec![
                Call::PostMessage {
                    channel: "C111".to_string(),
                    text: text.to_string(),
                    blocks: build_message_blocks(REPORT_RECEIVED_TITLE, text),
                },
                Call::Ack,
                Call::PostMessage {
                    channel: "U9".to_string(),
                    text: format!("Report Sent:\n{text}"),
                    blocks: build_message_blocks(REPORT_SENT_TITLE, text),
                },
            ]
        );
    }

    #[tokio::test]
    async fn failed_delivery_skips_ack_and_confirmation() {
        let slack = Arc::new(FakeSlack::default());
        slack
            .failing_channels
            .lock()
            .unwrap()
            .push("C111".to_string());

        let outcome = SubmitReportHandler
            .handle(
                &ctx(&slack),
                &submission(Some("C111"), "the lights are broken"),
                slack.as_ref(),
            )
            .await;

        let HandlerOutcome::Dropped { step, error } = outcome else {
            panic!("expected dropped outcome");
        };
        assert_eq!(step, "sending message");
        assert_eq!(error.code(), "channel_not_found");
        assert!(slack.calls().is_empty());
    }

    #[tokio::test]
    async fn failed_ack_skips_confirmation() {
        let slack = Arc::new(FakeSlack::default());
        *slack.fail_ack.lock().unwrap() = true;

        let outcome = SubmitReportHandler
            .handle(&ctx(&slack), &submission(Some("C111"), "x"), slack.as_ref())
            .await;

        assert!(matches!(
            outcome,
            HandlerOutcome::Dropped {
                step: "acknowledging submission",
                ..
            }
        ));
        let calls = slack.calls();
        assert_eq!(calls.len(), 1);
        assert!(matches!(&calls[0], Call::PostMessage { channel, .. } if channel == "C111"));
    }

    #[tokio::test]
    async fn failed_confirmation_still_delivered_report() {
        let slack = Arc::new(FakeSlack::default());
        slack.failing_channels.lock().unwrap().push("U9".to_string());

        let outcome = SubmitReportHandler
            .handle(&ctx(&slack), &submission(Some("C111"), "x"), slack.as_ref())
            .await;

        assert!(matches!(
            outcome,
            HandlerOutcome::Dropped {
                step: "sending confirmation",
                ..
            }
        ));
        assert_eq!(slack.calls().len(), 2);
    }

    #[tokio::test]
    async fn incomplete_submission_makes_no_calls() {
        let slack = Arc::new(FakeSlack::default());

        let outcome = SubmitReportHandler
            .handle(&ctx(&slack), &submission(None, "x"), slack.as_ref())
            .await;

        assert!(matches!(
            outcome,
            HandlerOutcome::Dropped {
                step: "reading report submission",
                ..
            }
        ));
        assert!(slack.calls().is_empty());
    }
}
