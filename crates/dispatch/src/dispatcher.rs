use std::sync::Arc;

use tracing::debug;

use {
    parley_actions::{ActionRegistry, ComponentResolver, RequestResult},
    parley_common::InboundMessage,
    parley_sessions::Session,
};

use crate::{
    error::{Error, Result},
    resolve,
};

/// Orchestrates one conversation turn: resolve the action if none is
/// active, pick and run the most specific handler, interpret the outcome,
/// and advance or clear the session.
///
/// The dispatcher itself is stateless and shared across conversations; all
/// mutable state lives in the [`Session`] the caller passes in. Resolution
/// and execution run against a scratch view of the would-be message
/// sequence, so a failing dispatch leaves the session untouched and a
/// cancelled execution counts as not-yet-applied.
pub struct Dispatcher {
    registry: Arc<ActionRegistry>,
    components: Arc<dyn ComponentResolver>,
}

impl Dispatcher {
    pub fn new(registry: Arc<ActionRegistry>, components: Arc<dyn ComponentResolver>) -> Self {
        Self {
            registry,
            components,
        }
    }

    pub fn registry(&self) -> &ActionRegistry {
        &self.registry
    }

    /// Dispatch one inbound message for the conversation owning `session`.
    ///
    /// Calls for the same session must be strictly sequential; the engine
    /// does no internal locking.
    pub async fn dispatch(&self, session: &mut Session, message: InboundMessage) -> Result<()> {
        let action = match session.action() {
            Some(active) => Arc::clone(active),
            None => {
                resolve::resolve_action(&self.registry, self.components.as_ref(), &message)?
            },
        };

        let mut pending = session.messages().to_vec();
        pending.push(message.clone());

        let handler = resolve::resolve_handler(&action, &pending)?;

        let result = match handler {
            Some(handler) => {
                let controller = self
                    .components
                    .controller(action.controller())
                    .ok_or_else(|| Error::ControllerUnresolved(action.controller().to_string()))?;
                handler.execute(controller, &pending).await?
            },
            // Nothing applies at this arity yet; keep collecting.
            None => RequestResult::default(),
        };

        debug!(
            action = action.name(),
            accumulated = pending.len(),
            ?result,
            "dispatched message"
        );

        // Result obtained; commit the turn.
        session.activate(Arc::clone(&action));
        session.push(message);

        match result {
            RequestResult::Ok => {},
            RequestResult::Retry => {
                session.drop_last();
            },
            RequestResult::Abort => {
                debug!(action = action.name(), "conversation aborted");
                session.clear();
                return Ok(());
            },
        }

        if session.message_count() >= action.max_parameter_count() {
            debug!(action = action.name(), "conversation complete");
            session.clear();
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use std::{
        collections::VecDeque,
        sync::{
            Mutex,
            atomic::{AtomicUsize, Ordering},
        },
    };

    use {
        anyhow::anyhow,
        async_trait::async_trait,
        parley_actions::{
            Action, ControllerHandle, RequestHandler, StaticComponents, TypeMismatch,
        },
    };

    /// Handler returning a scripted sequence of results, recording every
    /// execution. `hops: None` simulates a type mismatch at this arity.
    struct Scripted {
        arity: usize,
        hops: Option<u32>,
        results: Mutex<VecDeque<RequestResult>>,
        executions: AtomicUsize,
        fail: bool,
    }

    impl Scripted {
        fn new(arity: usize) -> Arc<Self> {
            Arc::new(Self {
                arity,
                hops: Some(0),
                results: Mutex::new(VecDeque::new()),
                executions: AtomicUsize::new(0),
                fail: false,
            })
        }

        fn with_results(arity: usize, results: &[RequestResult]) -> Arc<Self> {
            Arc::new(Self {
                arity,
                hops: Some(0),
                results: Mutex::new(results.iter().copied().collect()),
                executions: AtomicUsize::new(0),
                fail: false,
            })
        }

        fn mismatching(arity: usize) -> Arc<Self> {
            Arc::new(Self {
                arity,
                hops: None,
                results: Mutex::new(VecDeque::new()),
                executions: AtomicUsize::new(0),
                fail: false,
            })
        }

        fn failing(arity: usize) -> Arc<Self> {
            Arc::new(Self {
                arity,
                hops: Some(0),
                results: Mutex::new(VecDeque::new()),
                executions: AtomicUsize::new(0),
                fail: true,
            })
        }

        fn executions(&self) -> usize {
            self.executions.load(Ordering::Relaxed)
        }
    }

    #[async_trait]
    impl RequestHandler for Scripted {
        fn parameter_count(&self) -> usize {
            self.arity
        }

        fn hops(&self, _messages: &[InboundMessage]) -> std::result::Result<u32, TypeMismatch> {
            self.hops.ok_or(TypeMismatch)
        }

        async fn execute(
            &self,
            _controller: ControllerHandle,
            _messages: &[InboundMessage],
        ) -> anyhow::Result<RequestResult> {
            self.executions.fetch_add(1, Ordering::Relaxed);
            if self.fail {
                return Err(anyhow!("controller blew up"));
            }
            Ok(self.results.lock().unwrap().pop_front().unwrap_or_default())
        }
    }

    fn dispatcher(actions: Vec<Action>) -> Dispatcher {
        dispatcher_with(actions, StaticComponents::new())
    }

    fn dispatcher_with(actions: Vec<Action>, components: StaticComponents) -> Dispatcher {
        let components = components.with_controller("controller", Arc::new(()));
        Dispatcher::new(
            Arc::new(ActionRegistry::new(actions).unwrap()),
            Arc::new(components),
        )
    }

    fn greet_action(handler: Arc<Scripted>) -> Action {
        Action::builder("greet", "controller")
            .regex("^hello")
            .handler(handler)
            .build()
            .unwrap()
    }

    fn form_action(handler: Arc<Scripted>) -> Action {
        Action::builder("form", "controller")
            .regex("^/form")
            .handler(handler)
            .build()
            .unwrap()
    }

    #[tokio::test]
    async fn first_message_activates_the_matching_action() {
        let handler = Scripted::new(3);
        let dispatcher = dispatcher(vec![form_action(Arc::clone(&handler))]);
        let mut session = Session::new();

        dispatcher
            .dispatch(&mut session, InboundMessage::text("/form"))
            .await
            .unwrap();

        assert_eq!(session.action().unwrap().name(), "form");
        assert_eq!(session.message_count(), 1);
        assert_eq!(handler.executions(), 0);
    }

    #[tokio::test]
    async fn active_session_never_re_resolves_the_action() {
        let form = Scripted::new(3);
        let greet = Scripted::new(1);
        let dispatcher = dispatcher(vec![
            form_action(Arc::clone(&form)),
            greet_action(Arc::clone(&greet)),
        ]);
        let mut session = Session::new();

        dispatcher
            .dispatch(&mut session, InboundMessage::text("/form"))
            .await
            .unwrap();
        // Would match "greet" if resolution ran again; it must only append.
        dispatcher
            .dispatch(&mut session, InboundMessage::text("hello there"))
            .await
            .unwrap();

        assert_eq!(session.action().unwrap().name(), "form");
        assert_eq!(session.message_count(), 2);
        assert_eq!(greet.executions(), 0);
    }

    #[tokio::test]
    async fn greet_scenario_completes_after_single_message() {
        let handler = Scripted::new(1);
        let dispatcher = dispatcher(vec![greet_action(Arc::clone(&handler))]);
        let mut session = Session::new();

        dispatcher
            .dispatch(&mut session, InboundMessage::text("hello"))
            .await
            .unwrap();

        assert_eq!(handler.executions(), 1);
        assert!(session.is_empty(), "OK at max arity must clear the session");
    }

    #[tokio::test]
    async fn form_scenario_retry_then_ok() {
        let handler =
            Scripted::with_results(2, &[RequestResult::Retry, RequestResult::Ok]);
        let dispatcher = dispatcher(vec![form_action(Arc::clone(&handler))]);
        let mut session = Session::new();

        // "name": count 1 < arity 2, nothing executes.
        dispatcher
            .dispatch(&mut session, InboundMessage::text("/form name"))
            .await
            .unwrap();
        assert_eq!(handler.executions(), 0);
        assert_eq!(session.message_count(), 1);

        // "age": arity reached, handler rejects it with RETRY.
        dispatcher
            .dispatch(&mut session, InboundMessage::text("age"))
            .await
            .unwrap();
        assert_eq!(handler.executions(), 1);
        assert_eq!(session.message_count(), 1, "RETRY drops the newest message");
        assert!(session.action().is_some(), "RETRY keeps the session active");

        // "25": arity reached again, handler accepts, conversation completes.
        dispatcher
            .dispatch(&mut session, InboundMessage::text("25"))
            .await
            .unwrap();
        assert_eq!(handler.executions(), 2);
        assert!(session.is_empty());
    }

    #[tokio::test]
    async fn abort_clears_regardless_of_accumulated_count() {
        let handler = Scripted::with_results(2, &[RequestResult::Abort]);
        let action = Action::builder("form", "controller")
            .regex("^/form")
            .handler(Arc::clone(&handler) as Arc<dyn RequestHandler>)
            .handler(Scripted::new(5))
            .build()
            .unwrap();
        let dispatcher = dispatcher(vec![action]);
        let mut session = Session::new();

        dispatcher
            .dispatch(&mut session, InboundMessage::text("/form"))
            .await
            .unwrap();
        dispatcher
            .dispatch(&mut session, InboundMessage::text("second"))
            .await
            .unwrap();

        // Count 2 is far below the max arity of 5; ABORT clears anyway.
        assert!(session.is_empty());
    }

    #[tokio::test]
    async fn command_not_found_leaves_session_untouched() {
        let dispatcher = dispatcher(vec![greet_action(Scripted::new(1))]);
        let mut session = Session::new();

        let err = dispatcher
            .dispatch(&mut session, InboundMessage::text("goodbye"))
            .await
            .unwrap_err();

        assert!(matches!(err, Error::CommandNotFound));
        assert!(session.is_empty());
    }

    #[tokio::test]
    async fn empty_handler_collection_fails_on_the_very_first_message() {
        let action = Action::builder("empty", "controller")
            .regex("^/empty$")
            .build()
            .unwrap();
        let dispatcher = dispatcher(vec![action]);
        let mut session = Session::new();

        let err = dispatcher
            .dispatch(&mut session, InboundMessage::text("/empty"))
            .await
            .unwrap_err();

        assert!(matches!(err, Error::NoHandlersDefined { .. }));
        assert!(session.is_empty(), "failed dispatch must not mutate the session");
    }

    #[tokio::test]
    async fn ambiguous_handlers_fail_and_leave_session_as_it_was() {
        let action = Action::builder("form", "controller")
            .regex("^/form")
            .handler(Scripted::new(2))
            .handler(Scripted::new(2))
            .build()
            .unwrap();
        let dispatcher = dispatcher(vec![action]);
        let mut session = Session::new();

        dispatcher
            .dispatch(&mut session, InboundMessage::text("/form"))
            .await
            .unwrap();
        let err = dispatcher
            .dispatch(&mut session, InboundMessage::text("second"))
            .await
            .unwrap_err();

        assert!(matches!(err, Error::MultipleHandlersFound { hops: 0, .. }));
        assert_eq!(session.message_count(), 1, "the ambiguous message is not kept");
        assert_eq!(session.action().unwrap().name(), "form");
    }

    #[tokio::test]
    async fn handler_failure_propagates_and_session_stays_as_before() {
        let dispatcher = dispatcher(vec![greet_action(Scripted::failing(1))]);
        let mut session = Session::new();

        let err = dispatcher
            .dispatch(&mut session, InboundMessage::text("hello"))
            .await
            .unwrap_err();

        assert!(matches!(err, Error::Handler(_)));
        assert!(session.is_empty());
    }

    #[tokio::test]
    async fn unresolvable_controller_is_a_typed_error() {
        let action = Action::builder("greet", "ghost-controller")
            .regex("^hello")
            .handler(Scripted::new(1))
            .build()
            .unwrap();
        let dispatcher = Dispatcher::new(
            Arc::new(ActionRegistry::new(vec![action]).unwrap()),
            Arc::new(StaticComponents::new()),
        );
        let mut session = Session::new();

        let err = dispatcher
            .dispatch(&mut session, InboundMessage::text("hello"))
            .await
            .unwrap_err();

        assert!(matches!(err, Error::ControllerUnresolved(key) if key == "ghost-controller"));
        assert!(session.is_empty());
    }

    /// A conversation can reach the action's maximum parameter count with
    /// no handler ever matching (type mismatch at every arity). The result
    /// defaults to OK and the completion check still clears the session,
    /// silently ending the conversation without a single execution.
    #[tokio::test]
    async fn completion_without_any_handler_execution() {
        let handler = Scripted::mismatching(2);
        let dispatcher = dispatcher(vec![form_action(Arc::clone(&handler))]);
        let mut session = Session::new();

        dispatcher
            .dispatch(&mut session, InboundMessage::text("/form"))
            .await
            .unwrap();
        assert_eq!(session.message_count(), 1);

        dispatcher
            .dispatch(&mut session, InboundMessage::text("second"))
            .await
            .unwrap();

        assert_eq!(handler.executions(), 0);
        assert!(session.is_empty(), "count reached max arity, so the session clears");
    }

    #[tokio::test]
    async fn retry_below_max_arity_stays_active() {
        // Max arity is 2; after RETRY the count drops back to 1, below the
        // completion threshold, so the conversation keeps waiting.
        let two = Scripted::with_results(2, &[RequestResult::Retry]);
        let action = Action::builder("form", "controller")
            .regex("^/form")
            .handler(Arc::clone(&two) as Arc<dyn RequestHandler>)
            .build()
            .unwrap();
        let dispatcher = dispatcher(vec![action]);
        let mut session = Session::new();

        dispatcher
            .dispatch(&mut session, InboundMessage::text("/form"))
            .await
            .unwrap();
        dispatcher
            .dispatch(&mut session, InboundMessage::text("bad"))
            .await
            .unwrap();

        assert_eq!(session.message_count(), 1);
        assert!(session.action().is_some());
    }

    #[tokio::test]
    async fn validator_matched_action_dispatches() {
        let handler = Scripted::new(1);
        let action = Action::builder("media", "controller")
            .validator("no-text")
            .handler(Arc::clone(&handler) as Arc<dyn RequestHandler>)
            .build()
            .unwrap();
        let components = StaticComponents::new()
            .with_validator("no-text", Arc::new(|msg: &InboundMessage| !msg.has_text()));
        let dispatcher = dispatcher_with(vec![action], components);
        let mut session = Session::new();

        dispatcher
            .dispatch(&mut session, InboundMessage::without_text())
            .await
            .unwrap();

        assert_eq!(handler.executions(), 1);
        assert!(session.is_empty());
    }
}
