//! Synchronous named-event dispatch.
//!
//! An [`EventEmitter`] holds handlers keyed by event kind and invokes them in
//! registration order on the caller's stack. Types that publish events own
//! an emitter as a field and forward `on`/`off` to it.

use std::fmt;

use crate::error::HandlerError;

/// Result of a single handler invocation.
pub type HandlerResult = std::result::Result<(), HandlerError>;

/// An event that can be dispatched through an [`EventEmitter`].
pub trait Event {
    /// Discriminant handlers subscribe to.
    type Kind: Copy + Eq + fmt::Debug;

    fn kind(&self) -> Self::Kind;
}

/// Identifies a registered handler, for later removal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ListenerId(u64);

struct Listener<E: Event> {
    id: ListenerId,
    kind: E::Kind,
    handler: Box<dyn FnMut(&E) -> HandlerResult>,
}

/// Registry of event handlers.
pub struct EventEmitter<E: Event> {
    listeners: Vec<Listener<E>>,
    next_id: u64,
}

impl<E: Event> EventEmitter<E> {
    pub fn new() -> Self {
        Self {
            listeners: Vec::new(),
            next_id: 1,
        }
    }

    /// Register a handler for events of `kind`.
    pub fn on<F>(&mut self, kind: E::Kind, handler: F) -> ListenerId
    where
        F: FnMut(&E) -> HandlerResult + 'static,
    {
        let id = ListenerId(self.next_id);
        self.next_id += 1;
        self.listeners.push(Listener {
            id,
            kind,
            handler: Box::new(handler),
        });
        id
    }

    /// Remove a handler. Returns `false` if no handler of `kind` had this id.
    pub fn off(&mut self, kind: E::Kind, id: ListenerId) -> bool {
        let before = self.listeners.len();
        self.listeners.retain(|l| !(l.id == id && l.kind == kind));
        self.listeners.len() != before
    }

    /// Invoke the handlers for `event`, stopping at the first failure.
    pub fn fire(&mut self, event: &E) -> HandlerResult {
        let kind = event.kind();
        for listener in self.listeners.iter_mut().filter(|l| l.kind == kind) {
            (listener.handler)(event)?;
        }
        Ok(())
    }

    /// Invoke every handler for `event` and collect the failures.
    pub fn fire_all(&mut self, event: &E) -> Vec<HandlerError> {
        let kind = event.kind();
        self.listeners
            .iter_mut()
            .filter(|l| l.kind == kind)
            .filter_map(|listener| (listener.handler)(event).err())
            .collect()
    }

    /// Number of handlers registered for `kind`.
    pub fn listener_count(&self, kind: E::Kind) -> usize {
        self.listeners.iter().filter(|l| l.kind == kind).count()
    }
}

impl<E: Event> Default for EventEmitter<E> {
    fn default() -> Self {
        Self::new()
    }
}

impl<E: Event> fmt::Debug for EventEmitter<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EventEmitter")
            .field("listeners", &self.listeners.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::rc::Rc;

    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    enum Kind {
        Ping,
        Pong,
    }

    struct Msg(Kind, u32);

    impl Event for Msg {
        type Kind = Kind;

        fn kind(&self) -> Kind {
            self.0
        }
    }

    fn recorder(
        seen: &Rc<RefCell<Vec<String>>>,
        tag: &'static str,
    ) -> impl FnMut(&Msg) -> HandlerResult {
        let seen = Rc::clone(seen);
        move |msg: &Msg| {
            seen.borrow_mut().push(format!("{tag}:{}", msg.1));
            Ok(())
        }
    }

    #[test]
    fn test_handlers_run_in_registration_order() {
        let seen = Rc::new(RefCell::new(Vec::new()));
        let mut emitter: EventEmitter<Msg> = EventEmitter::new();
        emitter.on(Kind::Ping, recorder(&seen, "a"));
        emitter.on(Kind::Pong, recorder(&seen, "pong"));
        emitter.on(Kind::Ping, recorder(&seen, "b"));

        emitter.fire(&Msg(Kind::Ping, 1)).unwrap();
        assert_eq!(*seen.borrow(), vec!["a:1", "b:1"]);
        assert_eq!(emitter.listener_count(Kind::Ping), 2);
    }

    #[test]
    fn test_off_removes_only_matching_kind() {
        let seen = Rc::new(RefCell::new(Vec::new()));
        let mut emitter: EventEmitter<Msg> = EventEmitter::new();
        let id = emitter.on(Kind::Ping, recorder(&seen, "a"));

        assert!(!emitter.off(Kind::Pong, id));
        assert!(emitter.off(Kind::Ping, id));
        assert!(!emitter.off(Kind::Ping, id));

        emitter.fire(&Msg(Kind::Ping, 1)).unwrap();
        assert!(seen.borrow().is_empty());
    }

    #[test]
    fn test_fire_stops_at_first_failure() {
        let seen = Rc::new(RefCell::new(Vec::new()));
        let mut emitter: EventEmitter<Msg> = EventEmitter::new();
        emitter.on(Kind::Ping, |_: &Msg| Err("boom".into()));
        emitter.on(Kind::Ping, recorder(&seen, "after"));

        let err = emitter.fire(&Msg(Kind::Ping, 1)).unwrap_err();
        assert_eq!(err.to_string(), "boom");
        assert!(seen.borrow().is_empty());
    }

    #[test]
    fn test_fire_all_runs_everyone() {
        let seen = Rc::new(RefCell::new(Vec::new()));
        let mut emitter: EventEmitter<Msg> = EventEmitter::new();
        emitter.on(Kind::Ping, |_: &Msg| Err("first".into()));
        emitter.on(Kind::Ping, recorder(&seen, "after"));
        emitter.on(Kind::Ping, |_: &Msg| Err("second".into()));

        let errors = emitter.fire_all(&Msg(Kind::Ping, 2));
        let messages: Vec<String> = errors.iter().map(|e| e.to_string()).collect();
        assert_eq!(messages, vec!["first", "second"]);
        assert_eq!(*seen.borrow(), vec!["after:2"]);
    }
}
