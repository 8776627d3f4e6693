use std::cell::RefCell;
use std::collections::{BTreeMap, HashMap};
use std::rc::{Rc, Weak};

use crate::protocol::{EventKind, ServerEvent};

pub type Handler = Rc<dyn Fn(&ServerEvent)>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct HandlerId(u64);

/// Callbacks keyed by inbound message kind.
///
/// Each kind holds a set of handlers; a kind with no handlers left has no
/// entry at all.
#[derive(Default)]
pub struct HandlerRegistry {
    next_id: u64,
    handlers: HashMap<EventKind, BTreeMap<HandlerId, Handler>>,
}

impl HandlerRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, kind: EventKind, handler: Handler) -> HandlerId {
        self.next_id += 1;
        let id = HandlerId(self.next_id);
        self.handlers.entry(kind).or_default().insert(id, handler);
        tracing::debug!("Registered handler {:?} for {}", id, kind);
        id
    }

    /// Remove one handler. Returns false if it was already gone.
    pub fn unregister(&mut self, kind: EventKind, id: HandlerId) -> bool {
        let Some(set) = self.handlers.get_mut(&kind) else {
            return false;
        };
        let removed = set.remove(&id).is_some();
        if set.is_empty() {
            self.handlers.remove(&kind);
        }
        if removed {
            tracing::debug!("Unregistered handler {:?} for {}", id, kind);
        }
        removed
    }

    pub fn contains(&self, kind: EventKind, id: HandlerId) -> bool {
        self.handlers
            .get(&kind)
            .is_some_and(|set| set.contains_key(&id))
    }

    pub fn handler_count(&self, kind: EventKind) -> usize {
        self.handlers.get(&kind).map_or(0, BTreeMap::len)
    }

    pub fn has_kind(&self, kind: EventKind) -> bool {
        self.handlers.contains_key(&kind)
    }

    /// Handlers registered for `kind` right now, detached from the registry
    /// so they can run while it is mutated.
    pub fn snapshot(&self, kind: EventKind) -> Vec<(HandlerId, Handler)> {
        self.handlers
            .get(&kind)
            .map(|set| set.iter().map(|(id, h)| (*id, h.clone())).collect())
            .unwrap_or_default()
    }
}

/// Run every handler for the event's kind.
///
/// No borrow is held while a handler runs. A handler unregistered by an
/// earlier handler in the same pass is skipped; one registered during the pass
/// does not see this event.
pub fn dispatch(registry: &RefCell<HandlerRegistry>, event: &ServerEvent) -> usize {
    let kind = event.kind();
    let snapshot = registry.borrow().snapshot(kind);
    let mut invoked = 0;
    for (id, handler) in snapshot {
        if !registry.borrow().contains(kind, id) {
            continue;
        }
        handler(event);
        invoked += 1;
    }
    invoked
}

/// Handle returned by handler registration.
#[must_use = "dropping a Subscription keeps the handler registered; call unregister() to remove it"]
pub struct Subscription {
    registry: Weak<RefCell<HandlerRegistry>>,
    kind: EventKind,
    id: HandlerId,
}

impl Subscription {
    pub(crate) fn new(registry: &Rc<RefCell<HandlerRegistry>>, kind: EventKind, id: HandlerId) -> Self {
        Self {
            registry: Rc::downgrade(registry),
            kind,
            id,
        }
    }

    pub fn kind(&self) -> EventKind {
        self.kind
    }

    pub fn id(&self) -> HandlerId {
        self.id
    }

    /// Remove exactly this handler. Safe to call after the owning manager is gone.
    pub fn unregister(self) {
        if let Some(registry) = self.registry.upgrade() {
            registry.borrow_mut().unregister(self.kind, self.id);
        }
    }
}
