use std::cell::RefCell;
use std::collections::BTreeMap;
use std::panic::{AssertUnwindSafe, catch_unwind};
use std::rc::Rc;

use super::{Event, EventKind};

/// Handle returned by [`EventBus::subscribe`], used to remove the handler.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct SubscriberId(u64);

type Handler = Rc<dyn Fn(&Event)>;

#[derive(Default)]
struct BusInner {
    next_id: u64,
    handlers: BTreeMap<EventKind, Vec<(SubscriberId, Handler)>>,
}

/// Synchronous publish/subscribe hub.
///
/// Handlers for a kind run in subscription order on the publishing call
/// stack. A handler that publishes causes nested, fully-resolved dispatch
/// before the outer loop continues. A panicking handler is isolated: the
/// failure is logged and the remaining handlers still run.
///
/// Handles are cheap clones of one shared single-threaded hub.
#[derive(Clone, Default)]
pub struct EventBus {
    inner: Rc<RefCell<BusInner>>,
}

impl EventBus {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers `handler` for events of `kind`. Handlers subscribed while a
    /// publish for the same kind is in flight are not invoked by it.
    pub fn subscribe<F>(&self, kind: EventKind, handler: F) -> SubscriberId
    where
        F: Fn(&Event) + 'static,
    {
        let mut inner = self.inner.borrow_mut();
        let id = SubscriberId(inner.next_id);
        inner.next_id += 1;
        inner
            .handlers
            .entry(kind)
            .or_default()
            .push((id, Rc::new(handler)));
        id
    }

    /// Invokes every currently-subscribed handler for the event's kind.
    pub fn publish(&self, event: Event) {
        let kind = event.kind();
        let snapshot: Vec<(SubscriberId, Handler)> = self
            .inner
            .borrow()
            .handlers
            .get(&kind)
            .cloned()
            .unwrap_or_default();

        for (id, handler) in snapshot {
            // A handler earlier in this publish may have unsubscribed this one.
            let alive = self
                .inner
                .borrow()
                .handlers
                .get(&kind)
                .is_some_and(|list| list.iter().any(|(other, _)| *other == id));
            if !alive {
                continue;
            }

            if catch_unwind(AssertUnwindSafe(|| handler(&event))).is_err() {
                tracing::error!(?kind, subscriber = id.0, "event handler panicked");
            }
        }
    }

    /// Removes exactly the one registration behind `id`. Repeated calls are
    /// no-ops returning `false`.
    pub fn unsubscribe(&self, id: SubscriberId) -> bool {
        let mut inner = self.inner.borrow_mut();
        for list in inner.handlers.values_mut() {
            if let Some(index) = list.iter().position(|(other, _)| *other == id) {
                list.remove(index);
                return true;
            }
        }
        false
    }

    /// Drops every handler. Used for teardown and tests.
    pub fn clear(&self) {
        self.inner.borrow_mut().handlers.clear();
    }

    /// Number of live subscriptions across all kinds.
    pub fn subscriber_count(&self) -> usize {
        self.inner
            .borrow()
            .handlers
            .values()
            .map(Vec::len)
            .sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::events::InputAction;

    fn key_event() -> Event {
        Event::KeyDown(InputAction::Interact)
    }

    #[test]
    fn handlers_run_in_subscription_order() {
        let bus = EventBus::new();
        let seen = Rc::new(RefCell::new(Vec::new()));

        for label in ["first", "second", "third"] {
            let seen = Rc::clone(&seen);
            bus.subscribe(EventKind::KeyDown, move |_| {
                seen.borrow_mut().push(label);
            });
        }

        bus.publish(key_event());
        assert_eq!(*seen.borrow(), vec!["first", "second", "third"]);
    }

    #[test]
    fn panicking_handler_does_not_block_siblings() {
        let bus = EventBus::new();
        let count = Rc::new(RefCell::new(0));

        bus.subscribe(EventKind::KeyDown, |_| panic!("boom"));
        let counter = Rc::clone(&count);
        bus.subscribe(EventKind::KeyDown, move |_| {
            *counter.borrow_mut() += 1;
        });

        bus.publish(key_event());
        assert_eq!(*count.borrow(), 1);
    }

    #[test]
    fn unsubscribe_removes_exactly_one_handler() {
        let bus = EventBus::new();
        let count = Rc::new(RefCell::new(0));

        let counter = Rc::clone(&count);
        let id = bus.subscribe(EventKind::KeyDown, move |_| {
            *counter.borrow_mut() += 1;
        });
        let counter = Rc::clone(&count);
        bus.subscribe(EventKind::KeyDown, move |_| {
            *counter.borrow_mut() += 10;
        });

        assert!(bus.unsubscribe(id));
        assert!(!bus.unsubscribe(id));

        bus.publish(key_event());
        assert_eq!(*count.borrow(), 10);
    }

    #[test]
    fn nested_publish_resolves_depth_first() {
        let bus = EventBus::new();
        let trace = Rc::new(RefCell::new(Vec::new()));

        let inner_trace = Rc::clone(&trace);
        bus.subscribe(EventKind::KeyUp, move |_| {
            inner_trace.borrow_mut().push("nested");
        });

        let outer_bus = bus.clone();
        let outer_trace = Rc::clone(&trace);
        bus.subscribe(EventKind::KeyDown, move |_| {
            outer_trace.borrow_mut().push("outer-before");
            outer_bus.publish(Event::KeyUp(InputAction::Interact));
            outer_trace.borrow_mut().push("outer-after");
        });

        bus.publish(key_event());
        assert_eq!(
            *trace.borrow(),
            vec!["outer-before", "nested", "outer-after"]
        );
    }

    #[test]
    fn mid_publish_unsubscribe_skips_later_handler() {
        let bus = EventBus::new();
        let count = Rc::new(RefCell::new(0));

        let counter = Rc::clone(&count);
        let victim_slot: Rc<RefCell<Option<SubscriberId>>> = Rc::new(RefCell::new(None));
        let slot = Rc::clone(&victim_slot);
        let killer_bus = bus.clone();
        bus.subscribe(EventKind::KeyDown, move |_| {
            if let Some(victim) = slot.borrow_mut().take() {
                killer_bus.unsubscribe(victim);
            }
        });
        let victim = bus.subscribe(EventKind::KeyDown, move |_| {
            *counter.borrow_mut() += 1;
        });
        *victim_slot.borrow_mut() = Some(victim);

        bus.publish(key_event());
        assert_eq!(*count.borrow(), 0);
    }

    #[test]
    fn clear_drops_all_handlers() {
        let bus = EventBus::new();
        bus.subscribe(EventKind::KeyDown, |_| {});
        bus.subscribe(EventKind::KeyUp, |_| {});
        assert_eq!(bus.subscriber_count(), 2);

        bus.clear();
        assert_eq!(bus.subscriber_count(), 0);
    }
}
