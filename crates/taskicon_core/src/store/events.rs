//! Change notifications emitted by the task store.

/// Event delivered to subscribers after a mutation completes.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum StoreEvent {
    /// The task list changed; carries the freshly computed progress.
    TasksChanged { progress: f64 },
    /// Progress reached exactly 1.0 having previously been below it.
    AllCompleted,
}

/// Handle returned by `TaskStore::subscribe`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(pub(crate) u64);

pub(crate) type Subscriber = Box<dyn FnMut(&StoreEvent) + Send>;

/// Ordered subscriber list with stable ids.
#[derive(Default)]
pub(crate) struct Subscribers {
    next_id: u64,
    entries: Vec<(SubscriptionId, Subscriber)>,
}

impl Subscribers {
    pub(crate) fn insert(&mut self, subscriber: Subscriber) -> SubscriptionId {
        let id = SubscriptionId(self.next_id);
        self.next_id += 1;
        self.entries.push((id, subscriber));
        id
    }

    pub(crate) fn remove(&mut self, id: SubscriptionId) -> bool {
        let before = self.entries.len();
        self.entries.retain(|(entry_id, _)| *entry_id != id);
        self.entries.len() != before
    }

    pub(crate) fn emit(&mut self, event: &StoreEvent) {
        for (_, subscriber) in &mut self.entries {
            subscriber(event);
        }
    }
}
