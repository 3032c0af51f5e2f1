//! Read-only projections for presentation layers.

use serde::Serialize;
use tickloop_core::{LogicalTime, QueueKind, Seq, SimulatorState, Task};

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TaskSummary {
    pub id: String,
    pub label: String,
    pub kind: &'static str,
    pub seq: Seq,
}

impl From<&Task> for TaskSummary {
    fn from(task: &Task) -> Self {
        Self {
            id: task.id().to_string(),
            label: task.label.clone(),
            kind: task.kind().name(),
            seq: task.enqueue_seq(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FrameView {
    pub task: TaskSummary,
    pub started_at: LogicalTime,
    pub remaining_steps: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct QueueView {
    pub kind: QueueKind,
    pub tasks: Vec<TaskSummary>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PendingView {
    pub task: TaskSummary,
    pub ready_at: LogicalTime,
    pub target: QueueKind,
    pub recurring: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StateView {
    pub now: LogicalTime,
    pub step: u64,
    pub running: Option<FrameView>,
    pub queues: Vec<QueueView>,
    /// Sorted by ready time, then enqueue sequence.
    pub pending: Vec<PendingView>,
    pub frames_rendered: u64,
    pub render_requested: bool,
    pub next_frame_at: LogicalTime,
}

impl From<&SimulatorState> for StateView {
    fn from(state: &SimulatorState) -> Self {
        let running = state.running().map(|frame| FrameView {
            task: TaskSummary::from(&frame.task),
            started_at: frame.started_at,
            remaining_steps: frame.remaining_steps,
        });

        let queues = QueueKind::ALL
            .iter()
            .map(|&kind| QueueView {
                kind,
                tasks: state.queue(kind).iter().map(TaskSummary::from).collect(),
            })
            .collect();

        let mut pending: Vec<PendingView> = state
            .registry
            .iter()
            .map(|op| PendingView {
                task: TaskSummary::from(&op.task),
                ready_at: op.ready_at,
                target: op.target,
                recurring: op.recurring.is_some(),
            })
            .collect();
        pending.sort_by_key(|p| (p.ready_at, p.task.seq));

        Self {
            now: state.now,
            step: state.step,
            running,
            queues,
            pending,
            frames_rendered: state.frame.frames_rendered,
            render_requested: state.frame.render_requested,
            next_frame_at: tickloop_scheduler::next_frame_boundary(state),
        }
    }
}

impl StateView {
    pub fn queue(&self, kind: QueueKind) -> Option<&QueueView> {
        self.queues.iter().find(|q| q.kind == kind)
    }
}
