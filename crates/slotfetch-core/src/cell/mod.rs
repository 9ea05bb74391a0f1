//! Observable value cell shared between background units of work and observers.
//!
//! Writers call [`Observable::set`] (or [`Observable::update`]) from any thread.
//! Every registered observer sees every value, in the order the writes happened.
use std::{
    collections::VecDeque,
    fmt,
    panic::{self, AssertUnwindSafe},
    sync::atomic::{AtomicU64, Ordering},
};

use parking_lot::Mutex;
use tokio::sync::mpsc;
use tracing::warn;

/// Identifier returned by [`Observable::observe`], used to unregister the callback.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ObserverId(u64);

/// Internal observer; returns `false` once it no longer wants deliveries.
type Callback<V> = Box<dyn FnMut(&V) -> bool + Send + 'static>;

struct Entry<V> {
    id: ObserverId,
    /// Sequence number of the last write this observer has seen.
    seen: u64,
    /// Value to hand out before any queued write; set on registration.
    initial: Option<V>,
    callback: Callback<V>,
}

struct State<V> {
    value: V,
    /// Sequence number of the latest write.
    seq: u64,
    /// Writes not yet handed to observers.
    queue: VecDeque<(u64, V)>,
    observers: Vec<Entry<V>>,
    /// Registered while a delivery was running; joined by that delivery.
    added: Vec<Entry<V>>,
    /// Observers held by the running delivery.
    detached: usize,
    delivering: bool,
    /// Ids unregistered while `delivering`; applied by the running delivery.
    pending_removal: Vec<ObserverId>,
}

/// Value holder that notifies registered observers on every change.
///
/// Writes are applied immediately and queued for delivery. The writer delivers them itself
/// unless a delivery is already running, on another thread or further up its own call stack;
/// then it returns at once and the running delivery hands the value out after the earlier ones.
/// Writers therefore never wait on observers, and an observer may write to the cell it observes.
///
/// An observer that panics is unregistered; the others keep receiving values.
pub struct Observable<V> {
    state: Mutex<State<V>>,
    next_id: AtomicU64,
}

impl<V: Clone + Send + 'static> Observable<V> {
    /// Create a cell holding `initial`.
    pub fn new(initial: V) -> Self {
        Self {
            state: Mutex::new(State {
                value: initial,
                seq: 0,
                queue: VecDeque::new(),
                observers: Vec::new(),
                added: Vec::new(),
                detached: 0,
                delivering: false,
                pending_removal: Vec::new(),
            }),
            next_id: AtomicU64::new(1),
        }
    }

    /// Snapshot of the current value.
    pub fn get(&self) -> V {
        self.state.lock().value.clone()
    }

    /// Borrow the current value without cloning it.
    ///
    /// `f` runs under the cell lock and must not touch the cell.
    pub fn with<R>(&self, f: impl FnOnce(&V) -> R) -> R {
        f(&self.state.lock().value)
    }

    /// Replace the value and notify observers.
    pub fn set(&self, value: V) {
        self.update(move |cur| *cur = value);
    }

    /// Read-modify-write the value atomically, then notify observers.
    ///
    /// No other write can interleave between reading and storing. `f` runs under the
    /// cell lock and must not touch the cell.
    pub fn update(&self, f: impl FnOnce(&mut V)) {
        {
            let mut guard = self.state.lock();
            let st = &mut *guard;
            f(&mut st.value);
            st.seq += 1;
            st.queue.push_back((st.seq, st.value.clone()));
            if st.delivering {
                return;
            }
            st.delivering = true;
        }
        self.deliver();
    }

    /// Register `callback`; it runs once with the current value, then after every write.
    ///
    /// Registered from inside a delivery, the first call is made by that delivery.
    pub fn observe<F>(&self, mut callback: F) -> ObserverId
    where
        F: FnMut(&V) + Send + 'static,
    {
        self.observe_while(move |v| {
            callback(v);
            true
        })
    }

    /// Remove a previously registered observer.
    ///
    /// Returns `false` if the id is unknown or already removed. Called during a
    /// delivery, the removal takes effect before the next value is handed out.
    pub fn unobserve(&self, id: ObserverId) -> bool {
        let mut st = self.state.lock();
        if let Some(pos) = st.observers.iter().position(|e| e.id == id) {
            st.observers.remove(pos);
            return true;
        }
        if let Some(pos) = st.added.iter().position(|e| e.id == id) {
            st.added.remove(pos);
            return true;
        }
        if st.delivering && !st.pending_removal.contains(&id) {
            st.pending_removal.push(id);
            return true;
        }
        false
    }

    /// Stream of values for async consumers.
    ///
    /// The first message is the current value. The observer unregisters itself
    /// on the first write after the receiver is dropped.
    pub fn subscribe(&self) -> mpsc::UnboundedReceiver<V> {
        let (tx, rx) = mpsc::unbounded_channel();
        self.observe_while(move |v| tx.send(v.clone()).is_ok());
        rx
    }

    /// Number of registered observers.
    pub fn observer_count(&self) -> usize {
        let st = self.state.lock();
        st.observers.len() + st.added.len() + st.detached
    }

    fn observe_while<F>(&self, callback: F) -> ObserverId
    where
        F: FnMut(&V) -> bool + Send + 'static,
    {
        let id = ObserverId(self.next_id.fetch_add(1, Ordering::Relaxed));
        {
            let mut guard = self.state.lock();
            let st = &mut *guard;
            st.added.push(Entry {
                id,
                seen: st.seq,
                initial: Some(st.value.clone()),
                callback: Box::new(callback),
            });
            if st.delivering {
                return id;
            }
            st.delivering = true;
        }
        self.deliver();
        id
    }

    /// Drain queued writes and pending registrations. Only one delivery runs at a time;
    /// the caller must have flipped `delivering` to `true`.
    fn deliver(&self) {
        let mut active = std::mem::take(&mut self.state.lock().observers);
        loop {
            let (next, added) = {
                let mut guard = self.state.lock();
                let st = &mut *guard;

                let removed = std::mem::take(&mut st.pending_removal);
                active.retain(|e| !removed.contains(&e.id));

                let added = std::mem::take(&mut st.added);
                let next = st.queue.pop_front();
                if next.is_none() && added.is_empty() {
                    st.observers = std::mem::take(&mut active);
                    st.detached = 0;
                    st.delivering = false;
                    return;
                }
                st.detached = active.len() + added.len();
                (next, added)
            };

            for mut entry in added {
                if let Some(initial) = entry.initial.take() {
                    if !invoke(&mut entry, &initial) {
                        continue;
                    }
                }
                active.push(entry);
            }

            if let Some((seq, value)) = next {
                active.retain_mut(|entry| {
                    if entry.seen >= seq {
                        return true;
                    }
                    entry.seen = seq;
                    invoke(entry, &value)
                });
            }
        }
    }
}

/// Call one observer; a panic unregisters it.
fn invoke<V>(entry: &mut Entry<V>, value: &V) -> bool {
    match panic::catch_unwind(AssertUnwindSafe(|| (entry.callback)(value))) {
        Ok(keep) => keep,
        Err(_) => {
            warn!(observer = entry.id.0, "observer panicked; unregistered");
            false
        }
    }
}

impl<V: Clone + Send + Default + 'static> Default for Observable<V> {
    fn default() -> Self {
        Self::new(V::default())
    }
}

impl<V: fmt::Debug> fmt::Debug for Observable<V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let st = self.state.lock();
        f.debug_struct("Observable")
            .field("value", &st.value)
            .field("observers", &(st.observers.len() + st.added.len() + st.detached))
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::{sync::Arc, thread};

    #[test]
    fn observe_fires_immediately_with_current_value() {
        let cell = Observable::new(Some(7));
        let seen = Arc::new(Mutex::new(Vec::new()));

        let sink = Arc::clone(&seen);
        cell.observe(move |v| sink.lock().push(*v));

        assert_eq!(*seen.lock(), vec![Some(7)]);
    }

    #[test]
    fn every_set_is_delivered_in_order() {
        let cell = Observable::new(0u32);
        let seen = Arc::new(Mutex::new(Vec::new()));

        let sink = Arc::clone(&seen);
        cell.observe(move |v| sink.lock().push(*v));
        for n in 1..=5 {
            cell.set(n);
        }

        assert_eq!(*seen.lock(), vec![0, 1, 2, 3, 4, 5]);
        assert_eq!(cell.get(), 5);
    }

    #[test]
    fn setting_the_same_value_still_notifies() {
        let cell = Observable::new(false);
        let seen = Arc::new(Mutex::new(0usize));

        let sink = Arc::clone(&seen);
        cell.observe(move |_| *sink.lock() += 1);
        cell.set(false);
        cell.set(false);

        assert_eq!(*seen.lock(), 3);
    }

    #[test]
    fn unobserve_stops_delivery() {
        let cell = Observable::new(0u32);
        let seen = Arc::new(Mutex::new(Vec::new()));

        let sink = Arc::clone(&seen);
        let id = cell.observe(move |v| sink.lock().push(*v));
        cell.set(1);
        assert!(cell.unobserve(id));
        assert!(!cell.unobserve(id));
        cell.set(2);

        assert_eq!(*seen.lock(), vec![0, 1]);
        assert_eq!(cell.observer_count(), 0);
    }

    #[test]
    fn update_appends_without_losing_concurrent_writes() {
        let cell = Arc::new(Observable::new(Vec::<u32>::new()));

        let handles: Vec<_> = (0..8)
            .map(|t| {
                let cell = Arc::clone(&cell);
                thread::spawn(move || {
                    for i in 0..100 {
                        cell.update(|v| v.push(t * 1000 + i));
                    }
                })
            })
            .collect();
        for h in handles {
            h.join().unwrap();
        }

        assert_eq!(cell.with(|v| v.len()), 800);
    }

    #[test]
    fn concurrent_writers_are_seen_in_one_total_order() {
        let cell = Arc::new(Observable::new(0u64));
        let seen = Arc::new(Mutex::new(Vec::new()));

        let sink = Arc::clone(&seen);
        cell.observe(move |v| sink.lock().push(*v));

        let handles: Vec<_> = (0..4)
            .map(|_| {
                let cell = Arc::clone(&cell);
                thread::spawn(move || {
                    for _ in 0..250 {
                        cell.update(|v| *v += 1);
                    }
                })
            })
            .collect();
        for h in handles {
            h.join().unwrap();
        }

        let seen = seen.lock();
        assert_eq!(seen.len(), 1001);
        assert!(seen.windows(2).all(|w| w[1] == w[0] + 1));
    }

    #[test]
    fn dropped_subscriber_is_pruned_on_next_write() {
        let cell = Observable::new(1u8);
        let rx = cell.subscribe();
        assert_eq!(cell.observer_count(), 1);

        drop(rx);
        cell.set(2);
        assert_eq!(cell.observer_count(), 0);
    }

    #[tokio::test]
    async fn subscribe_yields_current_then_updates() {
        let cell = Observable::new(None::<String>);
        let mut rx = cell.subscribe();

        cell.set(Some("a".into()));
        cell.set(None);

        assert_eq!(rx.recv().await, Some(None));
        assert_eq!(rx.recv().await, Some(Some("a".to_string())));
        assert_eq!(rx.recv().await, Some(None));
    }

    #[test]
    fn observer_may_write_to_its_own_cell() {
        let cell = Arc::new(Observable::new(0u32));
        let seen = Arc::new(Mutex::new(Vec::new()));

        let writer = Arc::clone(&cell);
        cell.observe(move |v| {
            if *v == 1 {
                writer.set(2);
            }
        });
        let sink = Arc::clone(&seen);
        cell.observe(move |v| sink.lock().push(*v));

        cell.set(1);

        assert_eq!(*seen.lock(), vec![0, 1, 2]);
        assert_eq!(cell.get(), 2);
    }

    #[test]
    fn write_from_observer_does_not_block_other_threads() {
        let cell = Arc::new(Observable::new(false));
        let writer = Arc::clone(&cell);
        cell.observe(move |flag| {
            if *flag {
                writer.set(false);
            }
        });

        cell.set(true);
        let other = Arc::clone(&cell);
        thread::spawn(move || other.set(true)).join().unwrap();

        assert!(!cell.get());
    }

    #[test]
    fn observer_registered_during_delivery_starts_from_current_value() {
        let cell = Arc::new(Observable::new(0u32));
        let late = Arc::new(Mutex::new(Vec::new()));

        let registrar = Arc::clone(&cell);
        let sink = Arc::clone(&late);
        let mut sink = Some(sink);
        cell.observe(move |v| {
            if *v == 1 {
                if let Some(sink) = sink.take() {
                    registrar.observe(move |v| sink.lock().push(*v));
                }
            }
        });

        cell.set(1);
        cell.set(2);

        assert_eq!(*late.lock(), vec![1, 2]);
        assert_eq!(cell.observer_count(), 2);
    }

    #[test]
    fn panicking_observer_is_dropped_alone() {
        let cell = Observable::new(0u32);
        let seen = Arc::new(Mutex::new(Vec::new()));

        let sink = Arc::clone(&seen);
        cell.observe(move |v| sink.lock().push(*v));
        cell.observe(|v| {
            if *v == 1 {
                panic!("observer failure");
            }
        });

        cell.set(1);
        cell.set(2);

        assert_eq!(*seen.lock(), vec![0, 1, 2]);
        assert_eq!(cell.observer_count(), 1);
    }
}
