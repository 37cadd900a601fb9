//! Proximity events and the sinks they are published to
//!
//! The proximity array does not dispatch events itself. It holds an
//! [`EventSink`] and hands every change to it. The usual sink is a publisher
//! on an embassy [`PubSubChannel`], so any number of tasks (motor control, UI,
//! telemetry) can subscribe to direction changes.

use core::cell::Cell;

use critical_section::{CriticalSection, Mutex};
use embassy_sync::blocking_mutex::raw::RawMutex;
use embassy_sync::pubsub::{ImmediatePublisher, PubSubChannel, Publisher, Subscriber};
use log::warn;

use crate::sensors::Reading;

/// Channel capacity for proximity events
/// Direction changes arrive in short bursts while an obstacle sweeps the arc
pub const EVENT_CHANNEL_CAPACITY: usize = 8;

/// Number of subscribers that can listen to proximity events
/// - Subscriber 0: drive/avoidance logic
/// - Subscriber 1: logging or UI
pub const EVENT_SUBSCRIBERS: usize = 2;

/// Number of publishers (one per proximity array)
pub const EVENT_PUBLISHERS: usize = 1;

pub type ProximityChannel<M> = PubSubChannel<
    M,
    ProximityEvent,
    EVENT_CHANNEL_CAPACITY,
    EVENT_SUBSCRIBERS,
    EVENT_PUBLISHERS,
>;

pub type ProximityPublisher<'a, M> = Publisher<
    'a,
    M,
    ProximityEvent,
    EVENT_CHANNEL_CAPACITY,
    EVENT_SUBSCRIBERS,
    EVENT_PUBLISHERS,
>;

pub type ProximitySubscriber<'a, M> = Subscriber<
    'a,
    M,
    ProximityEvent,
    EVENT_CHANNEL_CAPACITY,
    EVENT_SUBSCRIBERS,
    EVENT_PUBLISHERS,
>;

/// Process-wide identifier of an event class.
///
/// Kinds are handed out from a global counter, so two kinds generated in the
/// same process never collide.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct EventKind(u16);

static NEXT_EVENT_KIND: Mutex<Cell<u16>> = Mutex::new(Cell::new(1));

static PROXIMITY_EVENT_KIND: Mutex<Cell<Option<EventKind>>> = Mutex::new(Cell::new(None));

impl EventKind {
    /// Allocates a fresh event kind.
    pub fn generate() -> Self {
        critical_section::with(Self::next)
    }

    fn next(cs: CriticalSection<'_>) -> Self {
        let counter = NEXT_EVENT_KIND.borrow(cs);
        let id = counter.get();
        counter.set(id.wrapping_add(1));
        Self(id)
    }

    pub const fn id(self) -> u16 {
        self.0
    }

    /// The kind carried by every [`ProximityEvent`].
    ///
    /// Generated on first use and fixed for the rest of the process.
    pub fn proximity() -> Self {
        critical_section::with(|cs| {
            let slot = PROXIMITY_EVENT_KIND.borrow(cs);
            match slot.get() {
                Some(kind) => kind,
                None => {
                    let kind = Self::next(cs);
                    slot.set(Some(kind));
                    kind
                }
            }
        })
    }
}

/// Published whenever the array's reading changes.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ProximityEvent {
    pub kind: EventKind,
    /// The new reading, possibly [`Reading::NO_DETECTION`].
    pub reading: Reading,
}

impl ProximityEvent {
    pub fn new(reading: Reading) -> Self {
        Self {
            kind: EventKind::proximity(),
            reading,
        }
    }
}

/// Something events can be published to.
///
/// Publishing must not block: it runs inside a poll cycle.
pub trait EventSink<E> {
    fn publish(&mut self, event: E);
}

impl<E, S: EventSink<E> + ?Sized> EventSink<E> for &mut S {
    fn publish(&mut self, event: E) {
        (**self).publish(event)
    }
}

impl<M, E, const CAP: usize, const SUBS: usize, const PUBS: usize> EventSink<E>
    for Publisher<'_, M, E, CAP, SUBS, PUBS>
where
    M: RawMutex,
    E: Clone,
{
    /// Publishes without waiting. A lagging subscriber loses its oldest message.
    fn publish(&mut self, event: E) {
        self.publish_immediate(event);
    }
}

impl<M, E, const CAP: usize, const SUBS: usize, const PUBS: usize> EventSink<E>
    for ImmediatePublisher<'_, M, E, CAP, SUBS, PUBS>
where
    M: RawMutex,
    E: Clone,
{
    fn publish(&mut self, event: E) {
        self.publish_immediate(event);
    }
}

/// Collects events in memory. Events past capacity are dropped.
impl<E, const N: usize> EventSink<E> for heapless::Vec<E, N> {
    fn publish(&mut self, event: E) {
        if self.push(event).is_err() {
            warn!("Event buffer full ({} events), dropping event", N);
        }
    }
}
