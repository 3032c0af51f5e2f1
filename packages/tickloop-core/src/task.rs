use serde::{Deserialize, Serialize};
use smallvec::SmallVec;
use std::fmt;
use std::num::NonZeroU32;

/// Logical time. Never tied to a wall clock.
pub type LogicalTime = u64;

/// Enqueue sequence number, drawn from the state's enqueue counter.
pub type Seq = u64;

#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TaskId(String);

impl TaskId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for TaskId {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}

impl From<String> for TaskId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

impl fmt::Display for TaskId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Deferred operations share the id of their payload task, so a recurring
/// interval keeps its identity across re-insertions.
pub type OperationId = TaskId;

/// The queue a task is (or will be) placed on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum QueueKind {
    Macrotask,
    Microtask,
    AnimationFrame,
}

impl QueueKind {
    pub const ALL: [QueueKind; 3] = [
        QueueKind::Macrotask,
        QueueKind::Microtask,
        QueueKind::AnimationFrame,
    ];

    pub fn name(self) -> &'static str {
        match self {
            QueueKind::Macrotask => "macrotask",
            QueueKind::Microtask => "microtask",
            QueueKind::AnimationFrame => "animation-frame",
        }
    }
}

impl fmt::Display for QueueKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.name())
    }
}

/// Kind-specific data lives on the variant, so a sync task cannot carry a delay.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "kebab-case")]
pub enum TaskKind {
    Sync,
    Timer {
        delay: LogicalTime,
    },
    Interval {
        delay: LogicalTime,
        handle: OperationId,
    },
    Microtask,
    Promise,
    AsyncContinuation,
    Fetch {
        latency: LogicalTime,
        resource: String,
    },
    DomEvent {
        event: String,
        /// `None` dispatches straight to the macrotask queue.
        #[serde(default, skip_serializing_if = "Option::is_none")]
        delay: Option<LogicalTime>,
    },
    AnimationFrame,
}

impl TaskKind {
    pub fn timer(delay: LogicalTime) -> Self {
        TaskKind::Timer { delay }
    }

    pub fn fetch(latency: LogicalTime, resource: impl Into<String>) -> Self {
        TaskKind::Fetch {
            latency,
            resource: resource.into(),
        }
    }

    pub fn dom_event(event: impl Into<String>) -> Self {
        TaskKind::DomEvent {
            event: event.into(),
            delay: None,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            TaskKind::Sync => "sync",
            TaskKind::Timer { .. } => "timer",
            TaskKind::Interval { .. } => "interval",
            TaskKind::Microtask => "microtask",
            TaskKind::Promise => "promise",
            TaskKind::AsyncContinuation => "async-continuation",
            TaskKind::Fetch { .. } => "fetch",
            TaskKind::DomEvent { .. } => "dom-event",
            TaskKind::AnimationFrame => "animation-frame",
        }
    }

    /// The queue family this kind of work belongs to.
    pub fn home_queue(&self) -> QueueKind {
        match self {
            TaskKind::Microtask | TaskKind::Promise | TaskKind::AsyncContinuation => {
                QueueKind::Microtask
            }
            TaskKind::AnimationFrame => QueueKind::AnimationFrame,
            TaskKind::Sync
            | TaskKind::Timer { .. }
            | TaskKind::Interval { .. }
            | TaskKind::Fetch { .. }
            | TaskKind::DomEvent { .. } => QueueKind::Macrotask,
        }
    }

    /// How long the task waits in the registry before release, if it goes there at all.
    /// A zero delay still counts: it is deferred, not immediate.
    pub fn deferral(&self) -> Option<LogicalTime> {
        match self {
            TaskKind::Timer { delay } | TaskKind::Interval { delay, .. } => Some(*delay),
            TaskKind::Fetch { latency, .. } => Some(*latency),
            TaskKind::DomEvent { delay, .. } => *delay,
            _ => None,
        }
    }

    pub fn is_recurring(&self) -> bool {
        matches!(self, TaskKind::Interval { .. })
    }
}

/// Lifecycle of a single task.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum TaskState {
    /// Authored but not placed. Placement moves a task straight to
    /// `WaitingOnDeferred` or `Queued`, so no placed task carries this.
    Created,
    WaitingOnDeferred,
    Queued,
    Running,
    Completed,
    /// Removed before running. Canceled tasks leave the state; the value is
    /// recorded on the log entry that reports the removal.
    Canceled,
}

/// Where a task came from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Origin {
    /// Seeded from outside the simulation.
    External,
    /// Spawned by the completion effects of another task.
    Task(TaskId),
}

/// Side effects run, in order, when a task completes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "kebab-case")]
pub enum Effect {
    SpawnTask { task: Box<TaskSpec>, queue: QueueKind },
    Log { message: String },
    RequestRender,
    CancelDeferred { operation: OperationId },
}

impl Effect {
    pub fn spawn(task: TaskSpec, queue: QueueKind) -> Self {
        Effect::SpawnTask {
            task: Box::new(task),
            queue,
        }
    }

    pub fn log(message: impl Into<String>) -> Self {
        Effect::Log {
            message: message.into(),
        }
    }

    pub fn cancel(operation: impl Into<OperationId>) -> Self {
        Effect::CancelDeferred {
            operation: operation.into(),
        }
    }
}

pub type Effects = SmallVec<[Effect; 2]>;

/// A task as authored by a caller: everything except the runtime metadata
/// stamped on at placement.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskSpec {
    pub id: TaskId,
    pub label: String,
    pub kind: TaskKind,
    pub cost: NonZeroU32,
    #[serde(default)]
    pub effects: Effects,
}

impl TaskSpec {
    pub fn new(id: impl Into<TaskId>, kind: TaskKind) -> Self {
        let id = id.into();
        Self {
            label: id.to_string(),
            id,
            kind,
            cost: NonZeroU32::MIN,
            effects: SmallVec::new(),
        }
    }

    /// An interval whose cancellation handle is its own id.
    pub fn interval(id: impl Into<TaskId>, delay: LogicalTime) -> Self {
        let id = id.into();
        let handle = id.clone();
        Self::new(id, TaskKind::Interval { delay, handle })
    }

    pub fn label(mut self, label: impl Into<String>) -> Self {
        self.label = label.into();
        self
    }

    /// Cost in steps. Zero is raised to one.
    pub fn cost(mut self, steps: u32) -> Self {
        self.cost = NonZeroU32::new(steps).unwrap_or(NonZeroU32::MIN);
        self
    }

    pub fn effect(mut self, effect: Effect) -> Self {
        self.effects.push(effect);
        self
    }

    pub fn effects(mut self, effects: impl IntoIterator<Item = Effect>) -> Self {
        self.effects.extend(effects);
        self
    }
}

/// Metadata stamped on a task at the moment it is placed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Placement {
    pub created_at: LogicalTime,
    pub enqueue_seq: Seq,
    pub origin: Origin,
    pub state: TaskState,
}

/// A placed unit of work.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Task {
    id: TaskId,
    pub label: String,
    kind: TaskKind,
    cost: NonZeroU32,
    effects: Effects,
    created_at: LogicalTime,
    enqueue_seq: Seq,
    origin: Origin,
    pub state: TaskState,
}

impl Task {
    pub fn place(spec: TaskSpec, placement: Placement) -> Self {
        let TaskSpec {
            id,
            label,
            kind,
            cost,
            effects,
        } = spec;
        Self {
            id,
            label,
            kind,
            cost,
            effects,
            created_at: placement.created_at,
            enqueue_seq: placement.enqueue_seq,
            origin: placement.origin,
            state: placement.state,
        }
    }

    /// A copy of this task carrying a fresh sequence number, for recurring re-insertion.
    pub fn resequenced(&self, enqueue_seq: Seq, state: TaskState) -> Self {
        Self {
            enqueue_seq,
            state,
            ..self.clone()
        }
    }

    pub fn id(&self) -> &TaskId {
        &self.id
    }

    pub fn kind(&self) -> &TaskKind {
        &self.kind
    }

    pub fn cost(&self) -> u32 {
        self.cost.get()
    }

    pub fn effects(&self) -> &[Effect] {
        &self.effects
    }

    pub fn created_at(&self) -> LogicalTime {
        self.created_at
    }

    pub fn enqueue_seq(&self) -> Seq {
        self.enqueue_seq
    }

    pub fn origin(&self) -> &Origin {
        &self.origin
    }

    pub fn with_state(mut self, state: TaskState) -> Self {
        self.state = state;
        self
    }
}

/// The caller-facing part of a task for the enqueue functions, which supply
/// the id and kind themselves.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TaskOptions {
    pub label: Option<String>,
    pub cost: u32,
    pub effects: Effects,
}

impl TaskOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }

    pub fn cost(mut self, steps: u32) -> Self {
        self.cost = steps;
        self
    }

    pub fn effect(mut self, effect: Effect) -> Self {
        self.effects.push(effect);
        self
    }

    pub fn into_spec(self, id: impl Into<TaskId>, kind: TaskKind) -> TaskSpec {
        let mut spec = TaskSpec::new(id, kind).cost(self.cost);
        if let Some(label) = self.label {
            spec.label = label;
        }
        spec.effects = self.effects;
        spec
    }
}
