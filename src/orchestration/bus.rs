// Copyright (c) 2024 Mike Tsao

use crate::prelude::*;
use core::fmt::Debug;
use log::trace;
use std::rc::Rc;
use strum_macros::{Display, EnumDiscriminants};

/// Everything that travels over the [EventBus].
#[derive(Clone, Debug, PartialEq, EnumDiscriminants)]
#[strum_discriminants(name(EventTopic), derive(Display, Hash))]
pub enum PatchBayEvent {
    /// A node's position changed. Published for every node kind.
    NodeMoved {
        #[allow(missing_docs)]
        uid: Uid,
    },
    /// An instrument's position changed. Follows [PatchBayEvent::NodeMoved].
    InstrumentMoved {
        #[allow(missing_docs)]
        uid: Uid,
    },
    /// An effect's position changed. Follows [PatchBayEvent::NodeMoved].
    EffectMoved {
        #[allow(missing_docs)]
        uid: Uid,
    },
    /// An emitter fired.
    SignalEmitted {
        #[allow(missing_docs)]
        source: Uid,
        #[allow(missing_docs)]
        signal: Signal,
    },
    /// A node left the registry.
    NodeDisposed {
        #[allow(missing_docs)]
        uid: Uid,
    },
}
impl PatchBayEvent {
    #[allow(missing_docs)]
    pub fn topic(&self) -> EventTopic {
        self.into()
    }
}

/// A subscriber. It gets the owner of the bus so that it can act on the rest
/// of the system, including publishing further events.
pub type EventHandler<C> = Rc<dyn Fn(&mut C, &PatchBayEvent)>;

struct Subscription<C> {
    uid: SubscriptionUid,
    topic: EventTopic,
    handler: EventHandler<C>,
}

/// A synchronous publish/subscribe channel keyed by [EventTopic].
///
/// Handlers run in subscription order on the publishing turn. Dispatch works
/// from a snapshot, so subscribing or unsubscribing inside a handler affects
/// only later publishes.
pub struct EventBus<C> {
    uid_factory: UidFactory<SubscriptionUid>,
    subscriptions: Vec<Subscription<C>>,
}
impl<C> Default for EventBus<C> {
    fn default() -> Self {
        Self {
            uid_factory: Default::default(),
            subscriptions: Default::default(),
        }
    }
}
impl<C> Debug for EventBus<C> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("EventBus")
            .field(
                "subscriptions",
                &self
                    .subscriptions
                    .iter()
                    .map(|s| (s.uid, s.topic))
                    .collect::<Vec<_>>(),
            )
            .finish()
    }
}
impl<C> EventBus<C> {
    /// Registers `handler` for `topic`.
    pub fn subscribe(
        &mut self,
        topic: EventTopic,
        handler: impl Fn(&mut C, &PatchBayEvent) + 'static,
    ) -> SubscriptionUid {
        let uid = self.uid_factory.mint_next();
        trace!("subscribe {uid} to {topic}");
        self.subscriptions.push(Subscription {
            uid,
            topic,
            handler: Rc::new(handler),
        });
        uid
    }

    /// Removes a subscription. Returns whether it was present; removing one
    /// that's already gone is fine.
    pub fn unsubscribe(&mut self, uid: SubscriptionUid) -> bool {
        let before = self.subscriptions.len();
        self.subscriptions.retain(|s| s.uid != uid);
        before != self.subscriptions.len()
    }

    #[allow(missing_docs)]
    pub fn is_subscribed(&self, uid: SubscriptionUid) -> bool {
        self.subscriptions.iter().any(|s| s.uid == uid)
    }

    /// The handlers for `topic` as of right now.
    pub fn handlers_for(&self, topic: EventTopic) -> Vec<EventHandler<C>> {
        self.subscriptions
            .iter()
            .filter(|s| s.topic == topic)
            .map(|s| Rc::clone(&s.handler))
            .collect()
    }

    /// How many handlers are listening on `topic`.
    pub fn subscriber_count(&self, topic: EventTopic) -> usize {
        self.subscriptions.iter().filter(|s| s.topic == topic).count()
    }

    #[allow(missing_docs)]
    pub fn len(&self) -> usize {
        self.subscriptions.len()
    }

    #[allow(missing_docs)]
    pub fn is_empty(&self) -> bool {
        self.subscriptions.is_empty()
    }
}

/// Implemented by whatever owns an [EventBus] whose handlers receive that
/// owner.
pub trait HasEventBus: Sized {
    #[allow(missing_docs)]
    fn event_bus(&self) -> &EventBus<Self>;

    /// Invokes every handler currently subscribed to the event's topic.
    fn publish(&mut self, event: PatchBayEvent) {
        let handlers = self.event_bus().handlers_for(event.topic());
        trace!("publish {event:?} to {} handler(s)", handlers.len());
        for handler in handlers {
            handler(self, &event);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Default)]
    struct TestContext {
        bus: EventBus<TestContext>,
        log: Vec<String>,
    }
    impl HasEventBus for TestContext {
        fn event_bus(&self) -> &EventBus<Self> {
            &self.bus
        }
    }

    fn moved(uid: usize) -> PatchBayEvent {
        PatchBayEvent::NodeMoved { uid: Uid(uid) }
    }

    #[test]
    fn handlers_run_in_subscription_order() {
        let mut c = TestContext::default();
        c.bus
            .subscribe(EventTopic::NodeMoved, |c, _| c.log.push("first".into()));
        c.bus
            .subscribe(EventTopic::NodeMoved, |c, _| c.log.push("second".into()));
        c.bus
            .subscribe(EventTopic::EffectMoved, |c, _| c.log.push("wrong".into()));

        c.publish(moved(1));
        assert_eq!(c.log, vec!["first", "second"]);
        assert_eq!(c.bus.subscriber_count(EventTopic::NodeMoved), 2);
    }

    #[test]
    fn unsubscribe_is_idempotent() {
        let mut c = TestContext::default();
        let uid = c
            .bus
            .subscribe(EventTopic::NodeMoved, |c, _| c.log.push("hi".into()));
        assert!(c.bus.is_subscribed(uid));
        assert!(c.bus.unsubscribe(uid));
        assert!(!c.bus.unsubscribe(uid));
        c.publish(moved(1));
        assert!(c.log.is_empty());
        assert!(c.bus.is_empty());
    }

    #[test]
    fn dispatch_uses_a_snapshot() {
        let mut c = TestContext::default();
        // The first handler removes the second and adds a third. The second
        // still runs this time; the third doesn't.
        c.bus.subscribe(EventTopic::NodeMoved, |c, _| {
            c.log.push("a".into());
            c.bus.unsubscribe(SubscriptionUid(2));
            c.bus
                .subscribe(EventTopic::NodeMoved, |c, _| c.log.push("c".into()));
        });
        c.bus
            .subscribe(EventTopic::NodeMoved, |c, _| c.log.push("b".into()));

        c.publish(moved(1));
        assert_eq!(c.log, vec!["a", "b"]);

        c.log.clear();
        c.publish(moved(1));
        assert_eq!(c.log, vec!["a", "c"]);
    }

    #[test]
    fn handlers_can_publish() {
        let mut c = TestContext::default();
        c.bus.subscribe(EventTopic::NodeMoved, |c, e| {
            if let PatchBayEvent::NodeMoved { uid } = e {
                c.log.push(format!("moved {uid}"));
                c.publish(PatchBayEvent::EffectMoved { uid: *uid });
            }
        });
        c.bus.subscribe(EventTopic::EffectMoved, |c, _| {
            c.log.push("effect".into());
        });
        c.publish(moved(7));
        assert_eq!(c.log, vec!["moved 7", "effect"]);
    }

    #[test]
    fn topics() {
        let e = PatchBayEvent::SignalEmitted {
            source: Uid(3),
            signal: Signal::default(),
        };
        assert_eq!(e.topic(), EventTopic::SignalEmitted);
        assert_eq!(moved(1).topic(), EventTopic::NodeMoved);
    }
}
