//! Frame boundaries and the render step.

use serde_json::json;
use tickloop_core::{LogCategory, LogEntry, LogicalTime, SimulatorState};

use crate::rules::Rule;

/// `now >= last_render_at + interval`. Shared verbatim by the render and
/// animation-frame rules.
pub fn is_frame_boundary(
    now: LogicalTime,
    last_render_at: LogicalTime,
    interval: LogicalTime,
) -> bool {
    now >= last_render_at.saturating_add(interval)
}

pub fn frame_boundary_reached(state: &SimulatorState) -> bool {
    is_frame_boundary(state.now, state.frame.last_render_at, state.frame.interval)
}

/// Earliest logical time at which the boundary holds.
pub fn next_frame_boundary(state: &SimulatorState) -> LogicalTime {
    state
        .frame
        .last_render_at
        .saturating_add(state.frame.interval)
}

/// An animation-frame callback is queued but its boundary has not been
/// reached. A requested render alone never counts: it does not move time.
pub fn animation_frame_waiting(state: &SimulatorState) -> bool {
    !state.animation_frames.is_empty() && !frame_boundary_reached(state)
}

/// Invalidates the current frame. The scheduler never does this by itself.
pub fn request_render(state: &SimulatorState) -> SimulatorState {
    let mut next = state.clone();
    next.frame.render_requested = true;
    tracing::trace!("render requested at t={}", next.now);
    next
}

pub(crate) fn render(state: &mut SimulatorState) {
    state.frame.render_requested = false;
    state.frame.last_render_at = state.now;
    state.frame.frames_rendered += 1;

    let frame = state.frame.frames_rendered;
    tracing::debug!("rendered frame {} at t={}", frame, state.now);
    state.record(
        LogEntry::new(state.now, LogCategory::Render, format!("Rendered frame {frame}"))
            .meta("rule", Rule::Render.name())
            .meta("frame", json!(frame)),
    );
}
