//! Event fan-out to live subscribers.
//!
//! Subscribers receive accepted events in admission order over bounded
//! channels. A subscriber that falls behind its queue bound is disconnected
//! with a recorded reason; the write path never blocks on a slow consumer.
//! Late joiners and disconnected subscribers recover through
//! `Registry::events_since`.

use std::sync::{Arc, Mutex};

use crossbeam::channel::{bounded, Receiver, Sender, TryRecvError, TrySendError};
use thiserror::Error;

use crate::core::{EventRecord, Limits};

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum BroadcastError {
    #[error("subscriber limit reached ({max})")]
    TooManySubscribers { max: usize },
    #[error("broadcaster lock poisoned")]
    LockPoisoned,
}

/// Why a subscriber was disconnected.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DropReason {
    SubscriberLagged,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct BroadcasterLimits {
    pub max_subscribers: usize,
    pub subscriber_queue_events: usize,
}

impl BroadcasterLimits {
    pub fn from_limits(limits: &Limits) -> Self {
        Self {
            max_subscribers: limits.max_broadcast_subscribers,
            subscriber_queue_events: limits.max_subscriber_queue_events,
        }
    }
}

/// Receiving side of a subscription.
///
/// Events already queued before a lag-drop remain readable; after draining
/// them the channel reports disconnected and `drop_reason` says why.
#[derive(Debug)]
pub struct EventSubscription {
    receiver: Receiver<EventRecord>,
    drop_reason: Arc<Mutex<Option<DropReason>>>,
}

impl EventSubscription {
    pub fn recv(&self) -> Result<EventRecord, crossbeam::channel::RecvError> {
        self.receiver.recv()
    }

    pub fn try_recv(&self) -> Result<EventRecord, TryRecvError> {
        self.receiver.try_recv()
    }

    pub fn drop_reason(&self) -> Option<DropReason> {
        self.drop_reason.lock().ok().and_then(|guard| *guard)
    }
}

#[derive(Debug)]
struct SubscriberSlot {
    sender: Sender<EventRecord>,
    drop_reason: Arc<Mutex<Option<DropReason>>>,
}

#[derive(Debug)]
struct BroadcasterState {
    limits: BroadcasterLimits,
    subscribers: Vec<SubscriberSlot>,
}

/// Fan-out hub. Cloned handles share one subscriber table.
#[derive(Clone, Debug)]
pub struct EventBroadcaster {
    inner: Arc<Mutex<BroadcasterState>>,
}

impl EventBroadcaster {
    pub fn new(limits: BroadcasterLimits) -> Self {
        Self {
            inner: Arc::new(Mutex::new(BroadcasterState {
                limits,
                subscribers: Vec::new(),
            })),
        }
    }

    pub fn subscribe(&self) -> Result<EventSubscription, BroadcastError> {
        let mut state = self.lock_state()?;
        if state.subscribers.len() >= state.limits.max_subscribers {
            return Err(BroadcastError::TooManySubscribers {
                max: state.limits.max_subscribers,
            });
        }
        let (sender, receiver) = bounded(state.limits.subscriber_queue_events);
        let drop_reason = Arc::new(Mutex::new(None));
        state.subscribers.push(SubscriberSlot {
            sender,
            drop_reason: Arc::clone(&drop_reason),
        });
        Ok(EventSubscription {
            receiver,
            drop_reason,
        })
    }

    /// Deliver one event to every live subscriber. Full queues drop the
    /// subscriber rather than the event stream's ordering; gone receivers
    /// are swept. Returns how many subscribers were delivered to.
    pub fn publish(&self, event: &EventRecord) -> Result<usize, BroadcastError> {
        let mut state = self.lock_state()?;
        let mut delivered = 0usize;
        state.subscribers.retain(|slot| {
            match slot.sender.try_send(event.clone()) {
                Ok(()) => {
                    delivered += 1;
                    true
                }
                Err(TrySendError::Full(_)) => {
                    if let Ok(mut reason) = slot.drop_reason.lock() {
                        *reason = Some(DropReason::SubscriberLagged);
                    }
                    false
                }
                Err(TrySendError::Disconnected(_)) => false,
            }
        });
        Ok(delivered)
    }

    pub fn subscriber_count(&self) -> Result<usize, BroadcastError> {
        Ok(self.lock_state()?.subscribers.len())
    }

    fn lock_state(&self) -> Result<std::sync::MutexGuard<'_, BroadcasterState>, BroadcastError> {
        self.inner.lock().map_err(|_| BroadcastError::LockPoisoned)
    }
}
