//! Observable Store
//!
//! A value holder whose writes notify subscribers. Reads are synchronous.
//! A write made while subscribers are being notified never re-enters them;
//! it is stored and delivered in a following round.

use std::cell::{Cell, RefCell};
use std::fmt;
use std::rc::Rc;

use crate::attributes::Attr;
use crate::value::ValueState;

/// Handle returned by [`Store::subscribe`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

type Subscriber<T> = Rc<dyn Fn(&T)>;

/// Observable value holder
pub struct Store<T: Clone> {
    value: RefCell<T>,
    subscribers: RefCell<Vec<(SubscriptionId, Subscriber<T>)>>,
    next_id: Cell<u64>,
    notifying: Cell<bool>,
    pending: Cell<bool>,
    max_rounds: usize,
}

impl<T: Clone + fmt::Debug> fmt::Debug for Store<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Store")
            .field("value", &self.value.borrow())
            .field("subscribers", &self.subscribers.borrow().len())
            .finish()
    }
}

impl<T: Clone + Default> Default for Store<T> {
    fn default() -> Self {
        Self::new(T::default())
    }
}

impl<T: Clone> Store<T> {
    pub fn new(value: T) -> Self {
        Self::with_max_rounds(value, 8)
    }

    /// Store that runs at most `max_rounds` notification rounds per write
    pub fn with_max_rounds(value: T, max_rounds: usize) -> Self {
        Self {
            value: RefCell::new(value),
            subscribers: RefCell::new(Vec::new()),
            next_id: Cell::new(0),
            notifying: Cell::new(false),
            pending: Cell::new(false),
            max_rounds: max_rounds.max(1),
        }
    }

    /// Current value
    pub fn get(&self) -> T {
        self.value.borrow().clone()
    }

    /// Read the current value without cloning it
    pub fn with<R>(&self, f: impl FnOnce(&T) -> R) -> R {
        f(&self.value.borrow())
    }

    /// Store a value and notify subscribers
    pub fn set(&self, value: T) {
        *self.value.borrow_mut() = value;
        self.notify();
    }

    /// Modify the value in place and notify subscribers
    pub fn update(&self, f: impl FnOnce(&mut T)) {
        f(&mut self.value.borrow_mut());
        self.notify();
    }

    /// Modify the value without notifying; pair with [`Store::notify`]
    pub fn stage(&self, f: impl FnOnce(&mut T)) {
        f(&mut self.value.borrow_mut());
    }

    /// Deliver the current value to every subscriber
    pub fn notify(&self) {
        if self.notifying.get() {
            self.pending.set(true);
            return;
        }

        self.notifying.set(true);
        let mut rounds = 0;
        loop {
            self.pending.set(false);
            let snapshot = self.get();
            let subscribers: Vec<Subscriber<T>> = self
                .subscribers
                .borrow()
                .iter()
                .map(|(_, f)| f.clone())
                .collect();
            for subscriber in subscribers {
                subscriber(&snapshot);
            }

            rounds += 1;
            if !self.pending.get() {
                break;
            }
            if rounds >= self.max_rounds {
                tracing::warn!(
                    "Store notification did not settle after {} rounds, dropping further writes",
                    rounds
                );
                self.pending.set(false);
                break;
            }
        }
        self.notifying.set(false);
    }

    /// Register a subscriber. It is not called until the next write.
    pub fn subscribe(&self, f: impl Fn(&T) + 'static) -> SubscriptionId {
        let id = SubscriptionId(self.next_id.get());
        self.next_id.set(id.0 + 1);
        self.subscribers.borrow_mut().push((id, Rc::new(f)));
        id
    }

    pub fn unsubscribe(&self, id: SubscriptionId) -> bool {
        let mut subscribers = self.subscribers.borrow_mut();
        let before = subscribers.len();
        subscribers.retain(|(sid, _)| *sid != id);
        subscribers.len() != before
    }

    pub fn subscriber_count(&self) -> usize {
        self.subscribers.borrow().len()
    }

    pub fn is_notifying(&self) -> bool {
        self.notifying.get()
    }
}

/// What a render pass needs to draw a control
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ViewState {
    pub value: ValueState,
    /// Composed disabled state
    pub disabled: bool,
    pub read_only: bool,
    pub required: bool,
    /// Observed content attributes that are present, in document order
    pub attributes: Vec<Attr>,
}

impl ViewState {
    /// Value of an observed content attribute
    pub fn attribute(&self, name: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|a| a.name.eq_ignore_ascii_case(name))
            .map(|a| a.value.as_str())
    }
}

/// Request a redraw of a control. Fire-and-forget; implementations may
/// coalesce requests.
pub trait RenderTrigger {
    fn request_render(&self, view: &ViewState);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_set_notifies() {
        let store = Store::new(0);
        let seen = Rc::new(RefCell::new(Vec::new()));
        let sink = seen.clone();
        store.subscribe(move |v: &i32| sink.borrow_mut().push(*v));

        store.set(1);
        store.update(|v| *v += 1);
        assert_eq!(*seen.borrow(), vec![1, 2]);
        assert_eq!(store.get(), 2);
    }

    #[test]
    fn test_stage_is_silent() {
        let store = Store::new(0);
        let calls = Rc::new(Cell::new(0));
        let counter = calls.clone();
        store.subscribe(move |_: &i32| counter.set(counter.get() + 1));

        store.stage(|v| *v = 5);
        assert_eq!(calls.get(), 0);
        store.notify();
        assert_eq!(calls.get(), 1);
    }

    #[test]
    fn test_write_during_notify_is_deferred() {
        let store = Rc::new(Store::new(0));
        let seen = Rc::new(RefCell::new(Vec::new()));

        let inner = Rc::downgrade(&store);
        let sink = seen.clone();
        store.subscribe(move |v: &i32| {
            sink.borrow_mut().push(*v);
            if *v == 1 {
                if let Some(store) = inner.upgrade() {
                    store.set(2);
                }
            }
        });

        store.set(1);
        assert_eq!(*seen.borrow(), vec![1, 2]);
        assert!(!store.is_notifying());
    }

    #[test]
    fn test_feedback_loop_is_bounded() {
        let store = Rc::new(Store::with_max_rounds(0, 3));
        let inner = Rc::downgrade(&store);
        store.subscribe(move |v: &i32| {
            if let Some(store) = inner.upgrade() {
                store.set(*v + 1);
            }
        });

        store.set(0);
        assert_eq!(store.get(), 3);
        assert!(!store.is_notifying());
    }

    #[test]
    fn test_unsubscribe() {
        let store = Store::new(0);
        let id = store.subscribe(|_: &i32| {});
        assert_eq!(store.subscriber_count(), 1);
        assert!(store.unsubscribe(id));
        assert!(!store.unsubscribe(id));
        assert_eq!(store.subscriber_count(), 0);
    }
}
