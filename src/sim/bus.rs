//! Publish/subscribe topics decoupling reading producers from consumers.

use std::fmt;
use std::sync::{Arc, Weak};

use parking_lot::Mutex;

use super::types::{AiPrediction, Alert, SensorReading};

type Listener<T> = Arc<dyn Fn(&T) + Send + Sync>;

struct Registry<T> {
    next_id: u64,
    listeners: Vec<(u64, Listener<T>)>,
}

/// An ordered list of listeners for events of type `T`.
///
/// Cloning a `Topic` yields another handle to the same listener list.
/// [`Topic::publish`] notifies a snapshot of the listeners taken when it is
/// called, in registration order, without holding the list lock; listeners
/// may therefore subscribe or unsubscribe from inside a notification, with
/// the change taking effect from the next publish.
///
/// # Examples
///
/// ```
/// use std::sync::Arc;
/// use std::sync::atomic::{AtomicUsize, Ordering};
/// use microgrid_sim::sim::bus::Topic;
///
/// let topic = Topic::<u32>::new();
/// let seen = Arc::new(AtomicUsize::new(0));
/// let counter = Arc::clone(&seen);
/// let sub = topic.subscribe(move |v| {
///     counter.fetch_add(*v as usize, Ordering::SeqCst);
/// });
///
/// topic.publish(&2);
/// sub.unsubscribe();
/// topic.publish(&5);
/// assert_eq!(seen.load(Ordering::SeqCst), 2);
/// ```
pub struct Topic<T> {
    registry: Arc<Mutex<Registry<T>>>,
}

impl<T: 'static> Topic<T> {
    pub fn new() -> Self {
        Self {
            registry: Arc::new(Mutex::new(Registry {
                next_id: 0,
                listeners: Vec::new(),
            })),
        }
    }

    /// Appends `listener` and returns the handle that removes it again.
    pub fn subscribe<F>(&self, listener: F) -> Subscription<T>
    where
        F: Fn(&T) + Send + Sync + 'static,
    {
        let mut registry = self.registry.lock();
        let id = registry.next_id;
        registry.next_id += 1;
        registry.listeners.push((id, Arc::new(listener)));
        Subscription {
            id,
            registry: Arc::downgrade(&self.registry),
        }
    }

    /// Notifies every current listener and returns how many were called.
    pub fn publish(&self, event: &T) -> usize {
        let snapshot: Vec<Listener<T>> = self
            .registry
            .lock()
            .listeners
            .iter()
            .map(|(_, l)| Arc::clone(l))
            .collect();
        for listener in &snapshot {
            listener(event);
        }
        snapshot.len()
    }

    /// Number of registered listeners.
    pub fn len(&self) -> usize {
        self.registry.lock().listeners.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl<T: 'static> Default for Topic<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> Clone for Topic<T> {
    fn clone(&self) -> Self {
        Self {
            registry: Arc::clone(&self.registry),
        }
    }
}

impl<T> fmt::Debug for Topic<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Topic")
            .field("listeners", &self.registry.lock().listeners.len())
            .finish()
    }
}

/// Handle returned by [`Topic::subscribe`].
///
/// Dropping the handle keeps the listener registered; call
/// [`Subscription::unsubscribe`] to remove it.
#[must_use = "dropping a Subscription leaves the listener registered forever"]
pub struct Subscription<T> {
    id: u64,
    registry: Weak<Mutex<Registry<T>>>,
}

impl<T> Subscription<T> {
    /// Removes exactly this listener; other listeners are unaffected.
    ///
    /// Returns `false` if the topic no longer exists or the listener was
    /// already removed.
    pub fn unsubscribe(self) -> bool {
        let Some(registry) = self.registry.upgrade() else {
            return false;
        };
        let mut registry = registry.lock();
        let before = registry.listeners.len();
        registry.listeners.retain(|(id, _)| *id != self.id);
        registry.listeners.len() != before
    }
}

impl<T> fmt::Debug for Subscription<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Subscription").field("id", &self.id).finish()
    }
}

/// The topics a simulation publishes on.
#[derive(Debug, Clone, Default)]
pub struct EventBus {
    pub readings: Topic<SensorReading>,
    pub alerts: Topic<Alert>,
    /// Periodic prediction batches from the live timer.
    pub predictions: Topic<Vec<AiPrediction>>,
}

impl EventBus {
    pub fn new() -> Self {
        Self::default()
    }

    /// Publishes one tick: the reading to every reading listener first, then
    /// each alert, in order, to every alert listener.
    pub fn deliver(&self, reading: &SensorReading, alerts: &[Alert]) {
        self.readings.publish(reading);
        for alert in alerts {
            self.alerts.publish(alert);
        }
    }
}
