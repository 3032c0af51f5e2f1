use crate::log::LogEntry;
use crate::queue::{CallStack, TaskQueue};
use crate::registry::Registry;
use crate::task::{LogicalTime, QueueKind, Seq, Task, TaskId};
use serde::{Deserialize, Serialize};

pub const DEFAULT_FRAME_INTERVAL: LogicalTime = 16;

/// How spawned children of timed kinds (timer, interval, fetch, delayed DOM event)
/// are placed by the effect processor.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum NestedTimerPolicy {
    /// Through the registry, honouring the child's own delay.
    #[default]
    Deferred,
    /// Straight onto the named queue, ignoring the delay.
    Immediate,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimulatorConfig {
    pub nested_timers: NestedTimerPolicy,
}

/// Knobs for the initial state. Unset fields take their defaults.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StateOptions {
    pub frame_interval: Option<LogicalTime>,
    pub initial_time: Option<LogicalTime>,
    pub render_requested: Option<bool>,
}

/// The one task currently executing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StackFrame {
    pub task: Task,
    pub started_at: LogicalTime,
    pub remaining_steps: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FrameTiming {
    pub interval: LogicalTime,
    pub frames_rendered: u64,
    pub render_requested: bool,
    pub last_render_at: LogicalTime,
}

/// Where a live task currently sits.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Location {
    Registry,
    Queue(QueueKind),
    CallStack,
}

/// The whole simulator. Every transition produces a new value; nothing
/// inside is shared with earlier snapshots.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SimulatorState {
    pub call_stack: CallStack<StackFrame>,
    pub registry: Registry,
    pub macrotasks: TaskQueue<Task>,
    pub microtasks: TaskQueue<Task>,
    pub animation_frames: TaskQueue<Task>,
    pub now: LogicalTime,
    pub step: u64,
    pub enqueue_counter: Seq,
    pub frame: FrameTiming,
    #[serde(default)]
    pub config: SimulatorConfig,
    pub log: Vec<LogEntry>,
}

impl Default for SimulatorState {
    fn default() -> Self {
        Self::new(StateOptions::default())
    }
}

impl SimulatorState {
    pub fn new(options: StateOptions) -> Self {
        Self::with_config(options, SimulatorConfig::default())
    }

    pub fn with_config(options: StateOptions, config: SimulatorConfig) -> Self {
        Self {
            call_stack: CallStack::new(),
            registry: Registry::new(),
            macrotasks: TaskQueue::new(),
            microtasks: TaskQueue::new(),
            animation_frames: TaskQueue::new(),
            now: options.initial_time.unwrap_or(0),
            step: 0,
            enqueue_counter: 0,
            frame: FrameTiming {
                interval: options.frame_interval.unwrap_or(DEFAULT_FRAME_INTERVAL),
                frames_rendered: 0,
                render_requested: options.render_requested.unwrap_or(false),
                last_render_at: 0,
            },
            config,
            log: Vec::new(),
        }
    }

    /// Issues the next enqueue sequence number. Strictly increasing for the
    /// lifetime of this state and everything derived from it.
    pub fn next_seq(&mut self) -> Seq {
        self.enqueue_counter += 1;
        self.enqueue_counter
    }

    pub fn queue(&self, kind: QueueKind) -> &TaskQueue<Task> {
        match kind {
            QueueKind::Macrotask => &self.macrotasks,
            QueueKind::Microtask => &self.microtasks,
            QueueKind::AnimationFrame => &self.animation_frames,
        }
    }

    pub fn queue_mut(&mut self, kind: QueueKind) -> &mut TaskQueue<Task> {
        match kind {
            QueueKind::Macrotask => &mut self.macrotasks,
            QueueKind::Microtask => &mut self.microtasks,
            QueueKind::AnimationFrame => &mut self.animation_frames,
        }
    }

    pub fn running(&self) -> Option<&StackFrame> {
        self.call_stack.top()
    }

    pub fn record(&mut self, entry: LogEntry) {
        self.log.push(entry);
    }

    pub fn queues_empty(&self) -> bool {
        self.macrotasks.is_empty() && self.microtasks.is_empty() && self.animation_frames.is_empty()
    }

    /// Nothing running, queued or pending in the registry.
    pub fn is_idle(&self) -> bool {
        self.call_stack.is_empty() && self.queues_empty() && self.registry.is_empty()
    }

    /// Finds a live task by id. Queued copies are searched before the
    /// registry, so a released interval instance is reported by its queue.
    pub fn locate(&self, id: &TaskId) -> Option<Location> {
        if self.running().is_some_and(|frame| frame.task.id() == id) {
            return Some(Location::CallStack);
        }
        for kind in QueueKind::ALL {
            if self.queue(kind).iter().any(|task| task.id() == id) {
                return Some(Location::Queue(kind));
            }
        }
        if self.registry.contains(id) {
            return Some(Location::Registry);
        }
        None
    }

    /// Number of live places a task id occupies (registry, queues, call stack).
    pub fn occurrences(&self, id: &TaskId) -> usize {
        let running = self
            .call_stack
            .iter()
            .filter(|frame| frame.task.id() == id)
            .count();
        let queued: usize = QueueKind::ALL
            .iter()
            .map(|&kind| self.queue(kind).iter().filter(|task| task.id() == id).count())
            .sum();
        running + queued + usize::from(self.registry.contains(id))
    }
}
