use crate::task::{LogicalTime, OperationId, QueueKind, Task, TaskKind};
use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum DeferredKind {
    Timer,
    Interval,
    Fetch,
    DomEvent,
}

impl DeferredKind {
    /// The deferred kind for a task, if its kind is one that waits in the registry.
    pub fn of(kind: &TaskKind) -> Option<Self> {
        match kind {
            TaskKind::Timer { .. } => Some(DeferredKind::Timer),
            TaskKind::Interval { .. } => Some(DeferredKind::Interval),
            TaskKind::Fetch { .. } => Some(DeferredKind::Fetch),
            TaskKind::DomEvent { delay: Some(_), .. } => Some(DeferredKind::DomEvent),
            _ => None,
        }
    }
}

/// Work that is not yet eligible for any queue.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeferredOperation {
    pub id: OperationId,
    pub kind: DeferredKind,
    pub task: Task,
    pub ready_at: LogicalTime,
    pub target: QueueKind,
    /// Recurring operations re-arm themselves on release with this period.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub recurring: Option<LogicalTime>,
}

impl DeferredOperation {
    pub fn is_due(&self, now: LogicalTime) -> bool {
        self.ready_at <= now
    }
}

/// Pending operations keyed by id. Unordered: release ordering is decided by
/// the payload's enqueue sequence, not by anything stored here.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Registry {
    entries: FxHashMap<OperationId, DeferredOperation>,
}

impl Registry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts or replaces the entry with the same id.
    pub fn insert(&mut self, op: DeferredOperation) -> Option<DeferredOperation> {
        self.entries.insert(op.id.clone(), op)
    }

    pub fn remove(&mut self, id: &OperationId) -> Option<DeferredOperation> {
        self.entries.remove(id)
    }

    pub fn get(&self, id: &OperationId) -> Option<&DeferredOperation> {
        self.entries.get(id)
    }

    pub fn contains(&self, id: &OperationId) -> bool {
        self.entries.contains_key(id)
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = &DeferredOperation> {
        self.entries.values()
    }

    pub fn earliest_ready(&self) -> Option<LogicalTime> {
        self.entries.values().map(|op| op.ready_at).min()
    }

    /// Removes every entry due at `now`, ordered by the payload's enqueue sequence.
    pub fn take_due(&mut self, now: LogicalTime) -> Vec<DeferredOperation> {
        let due: Vec<OperationId> = self
            .entries
            .values()
            .filter(|op| op.is_due(now))
            .map(|op| op.id.clone())
            .collect();

        let mut released: Vec<DeferredOperation> = due
            .iter()
            .filter_map(|id| self.entries.remove(id))
            .collect();
        released.sort_by_key(|op| op.task.enqueue_seq());
        released
    }
}
