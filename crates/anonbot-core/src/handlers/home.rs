use async_trait::async_trait;

use super::{log_and_drop, Handler, HandlerContext, HandlerOutcome};
use crate::{events::IncomingEvent, ports::Acknowledger, views::build_home_view};

/// `app_home_opened`: publish the home tab for the user who opened it.
pub struct HomeOpenedHandler;

#[async_trait]
impl Handler for HomeOpenedHandler {
    async fn handle(
        &self,
        ctx: &HandlerContext,
        event: &IncomingEvent,
        _ack: &dyn Acknowledger,
    ) -> HandlerOutcome {
        let IncomingEvent::HomeOpened { user, .. } = event else {
            return HandlerOutcome::Ignored;
        };

        match ctx.api.publish_view(user, &build_home_view()).await {
            Ok(()) => HandlerOutcome::Completed,
            Err(e) => log_and_drop("publishing home view", e),
        }
    }
}
