// Observable state container shared by the managers
use parking_lot::{Mutex, RwLock};
use std::sync::{Arc, Weak};

type Listener<S> = Arc<dyn Fn(&S) + Send + Sync>;

struct Listeners<S> {
    next_id: u64,
    entries: Vec<(u64, Listener<S>)>,
}

/// Holds one immutable snapshot of `S` at a time.
///
/// Every [`Store::update`] replaces the snapshot with a value computed from
/// the previous one, then calls each listener with the new snapshot. Listeners
/// run after the state lock is released, so they may read the store again.
pub struct Store<S> {
    state: RwLock<Arc<S>>,
    listeners: Arc<Mutex<Listeners<S>>>,
}

impl<S: Send + Sync + 'static> Store<S> {
    pub fn new(initial: S) -> Self {
        Self {
            state: RwLock::new(Arc::new(initial)),
            listeners: Arc::new(Mutex::new(Listeners {
                next_id: 0,
                entries: Vec::new(),
            })),
        }
    }

    pub fn state(&self) -> Arc<S> {
        self.state.read().clone()
    }

    pub fn update<F>(&self, transform: F)
    where
        F: FnOnce(&S) -> S,
    {
        let snapshot = {
            let mut state = self.state.write();
            let next = Arc::new(transform(&**state));
            *state = next.clone();
            next
        };
        self.notify(&*snapshot);
    }

    /// Register `listener`. It is called right away with the current state
    /// and then after every update until the returned handle is dropped.
    #[must_use = "the listener is removed when the subscription is dropped"]
    pub fn subscribe<F>(&self, listener: F) -> Subscription
    where
        F: Fn(&S) + Send + Sync + 'static,
    {
        let listener: Listener<S> = Arc::new(listener);
        let id = {
            let mut listeners = self.listeners.lock();
            let id = listeners.next_id;
            listeners.next_id += 1;
            listeners.entries.push((id, listener.clone()));
            id
        };
        tracing::trace!(
            listener = id,
            subscribers = self.subscriber_count(),
            "store subscriber added"
        );

        let current = self.state();
        listener(&*current);

        let weak: Weak<Mutex<Listeners<S>>> = Arc::downgrade(&self.listeners);
        Subscription {
            detach: Some(Box::new(move || {
                if let Some(listeners) = weak.upgrade() {
                    listeners.lock().entries.retain(|(entry, _)| *entry != id);
                }
            })),
        }
    }

    pub fn subscriber_count(&self) -> usize {
        self.listeners.lock().entries.len()
    }

    fn notify(&self, snapshot: &S) {
        let listeners: Vec<Listener<S>> = self
            .listeners
            .lock()
            .entries
            .iter()
            .map(|(_, l)| l.clone())
            .collect();
        for listener in listeners {
            listener(snapshot);
        }
    }
}

impl<S: Default + Send + Sync + 'static> Default for Store<S> {
    fn default() -> Self {
        Self::new(S::default())
    }
}

/// Keeps a store listener registered while alive.
pub struct Subscription {
    detach: Option<Box<dyn FnOnce() + Send + Sync>>,
}

impl Subscription {
    pub fn unsubscribe(mut self) {
        self.detach();
    }

    fn detach(&mut self) {
        if let Some(detach) = self.detach.take() {
            detach();
        }
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        self.detach();
    }
}

impl std::fmt::Debug for Subscription {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Subscription")
            .field("active", &self.detach.is_some())
            .finish()
    }
}
