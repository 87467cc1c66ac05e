use async_trait::async_trait;

use super::{log_and_drop, Handler, HandlerContext, HandlerOutcome};
use crate::{
    events::IncomingEvent,
    ports::Acknowledger,
    views::{build_report_form, OPEN_REPORT_MODAL},
};

/// `home_navigation` button: open the report modal.
///
/// The ack and the `views.open` call are independent; a failed ack is logged
/// and the modal is still attempted.
pub struct HomeNavigationHandler;

#[async_trait]
impl Handler for HomeNavigationHandler {
    async fn handle(
        &self,
        ctx: &HandlerContext,
        event: &IncomingEvent,
        ack: &dyn Acknowledger,
    ) -> HandlerOutcome {
        let IncomingEvent::BlockAction(action) = event else {
            return HandlerOutcome::Ignored;
        };
        if action.value.as_deref() != Some(OPEN_REPORT_MODAL) {
            tracing::debug!(value = ?action.value, "ignoring home navigation value");
            return HandlerOutcome::Ignored;
        }

        let acked = ack.ack().await.map_err(|e| {
            tracing::error!(code = %e.code(), "Error acknowledging report action: {}", e.code());
            e
        });

        let form = build_report_form(&ctx.settings);
        if let Err(e) = ctx.api.open_view(&action.trigger_id, &form).await {
            return log_and_drop("opening report modal", e);
        }

        match acked {
            Ok(()) => HandlerOutcome::Completed,
            Err(error) => HandlerOutcome::Dropped {
                step: "acknowledging report action",
                error,
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::{
        domain::{TriggerId, UserId},
        events::BlockAction,
        handlers::fakes::{Call, FakeSlack},
        settings::{Destination, Settings},
        views::HOME_NAVIGATION_ACTION,
    };

    fn settings() -> Arc<Settings> {
        Arc::new(Settings {
            channels: vec![
                Destination::new("Sales", "C111"),
                Destination::new("Support", "C222"),
            ],
        })
    }

    fn click(value: &str) -> IncomingEvent {
        IncomingEvent::BlockAction(BlockAction {
            action_id: HOME_NAVIGATION_ACTION.to_string(),
            value: Some(value.to_string()),
            trigger_id: TriggerId("T.1".to_string()),
            user: UserId("U1".to_string()),
        })
    }

    #[tokio::test]
    async fn open_report_value_acks_then_opens_form() {
        let slack = Arc::new(FakeSlack::default());
        let settings = settings();
        let ctx = HandlerContext::new(settings.clone(), slack.clone());

        let outcome = HomeNavigationHandler
            .handle(&ctx, &click(OPEN_REPORT_MODAL), slack.as_ref())
            .await;

        assert!(outcome.is_completed());
        assert_eq!(
            slack.calls(),
            vec![
                Call::Ack,
                Call::OpenView {
                    trigger: "T.1".to_string(),
                    view: build_report_form(&settings),
                },
            ]
        );
    }

    #[tokio::test]
    async fn other_values_make_no_calls() {
        let slack = Arc::new(FakeSlack::default());
        let ctx = HandlerContext::new(settings(), slack.clone());

        let outcome = HomeNavigationHandler
            .handle(&ctx, &click("something_else"), slack.as_ref())
            .await;

        assert!(matches!(outcome, HandlerOutcome::Ignored));
        assert!(slack.calls().is_empty());
    }

    #[tokio::test]
    async fn failed_ack_still_opens_form() {
        let slack = Arc::new(FakeSlack::default());
        *slack.fail_ack.lock().unwrap() = true;
        let ctx = HandlerContext::new(settings(), slack.clone());

        let outcome = HomeNavigationHandler
            .handle(&ctx, &click(OPEN_REPORT_MODAL), slack.as_ref())
            .await;

        assert!(matches!(
            outcome,
            HandlerOutcome::Dropped {
                step: "acknowledging report action",
                ..
            }
        ));
        let calls = slack.calls();
        assert_eq!(calls.len(), 1);
        assert!(matches!(calls[0], Call::OpenView { .. }));
    }

    #[tokio::test]
    async fn failed_open_is_dropped_after_ack() {
        let slack = Arc::new(FakeSlack::default());
        *slack.fail_open.lock().unwrap() = true;
        let ctx = HandlerContext::new(settings(), slack.clone());

        let outcome = HomeNavigationHandler
            .handle(&ctx, &click(OPEN_REPORT_MODAL), slack.as_ref())
            .await;

        assert!(matches!(
            outcome,
            HandlerOutcome::Dropped {
                step: "opening report modal",
                ..
            }
        ));
        assert_eq!(slack.calls(), vec![Call::Ack]);
    }
}
