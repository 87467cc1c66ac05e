use std::{collections::HashMap, fmt, sync::Arc};

use super::{
    Handler, HandlerContext, HandlerOutcome, HomeNavigationHandler, HomeOpenedHandler,
    SubmitReportHandler,
};
use crate::{
    events::{IncomingEvent, APP_HOME_OPENED},
    ports::{Acknowledger, SlackApi},
    settings::Settings,
    views::{HOME_NAVIGATION_ACTION, REPORT_CALLBACK_ID},
};

/// Dispatch key: event type, block action id, or view callback id.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum Route {
    Event(String),
    Action(String),
    View(String),
}

impl Route {
    pub fn of(event: &IncomingEvent) -> Self {
        match event {
            IncomingEvent::HomeOpened { .. } => Self::Event(APP_HOME_OPENED.to_string()),
            IncomingEvent::BlockAction(a) => Self::Action(a.action_id.clone()),
            IncomingEvent::ViewSubmission(v) => Self::View(v.callback_id.clone()),
        }
    }
}

impl fmt::Display for Route {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Event(name) => write!(f, "event:{name}"),
            Self::Action(id) => write!(f, "action:{id}"),
            Self::View(id) => write!(f, "view:{id}"),
        }
    }
}

#[derive(Debug)]
pub enum Dispatch {
    Handled(HandlerOutcome),
    /// No handler is registered for the event's route.
    Unrouted,
}

/// Explicit routing table from [`Route`] to handler.
pub struct Dispatcher {
    ctx: HandlerContext,
    routes: HashMap<Route, Arc<dyn Handler>>,
}

impl Dispatcher {
    pub fn new(ctx: HandlerContext) -> Self {
        Self {
            ctx,
            routes: HashMap::new(),
        }
    }

    /// The bot's routes: home tab, report button, report form.
    pub fn with_default_routes(settings: Arc<Settings>, api: Arc<dyn SlackApi>) -> Self {
        let mut dispatcher = Self::new(HandlerContext::new(settings, api));
        dispatcher.register(
            Route::Event(APP_HOME_OPENED.to_string()),
            Arc::new(HomeOpenedHandler),
        );
        dispatcher.register(
            Route::Action(HOME_NAVIGATION_ACTION.to_string()),
            Arc::new(HomeNavigationHandler),
        );
        dispatcher.register(
            Route::View(REPORT_CALLBACK_ID.to_string()),
            Arc::new(SubmitReportHandler),
        );
        dispatcher
    }

    pub fn register(&mut self, route: Route, handler: Arc<dyn Handler>) {
        self.routes.insert(route, handler);
    }

    pub async fn dispatch(&self, event: &IncomingEvent, ack: &dyn Acknowledger) -> Dispatch {
        let route = Route::of(event);
        let Some(handler) = self.routes.get(&route) else {
            tracing::debug!(%route, "no handler registered");
            return Dispatch::Unrouted;
        };
        tracing::debug!(%route, "dispatching");
        Dispatch::Handled(handler.handle(&self.ctx, event, ack).await)
    }
}

#[cfg(test)]
impl Dispatcher {
    pub fn has_route(&self, route: &Route) -> bool {
        self.routes.contains_key(route)
    }
}
