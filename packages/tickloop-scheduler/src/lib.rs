//! Deterministic model of a single-threaded event loop.
//!
//! [`tick`] applies the first of seven rules that holds, in fixed order:
//! finish the running task, drain a microtask, render, run an animation-frame
//! callback, run a macrotask, advance logical time, or report completion.
//! Every operation takes a state and returns a new one.

pub mod cancel;
pub mod deferred;
pub mod drain;
mod effects;
pub mod enqueue;
pub mod error;
pub mod render;
pub mod rules;
pub mod run;
pub mod simulator;
pub mod tick;

pub use cancel::{cancel_task, clear_interval};
pub use deferred::release_due;
pub use drain::{drain_microtasks, drain_microtasks_traced};
pub use enqueue::{
    enqueue, enqueue_animation_frame, enqueue_async_continuation, enqueue_dom_event,
    enqueue_fetch, enqueue_interval, enqueue_microtask, enqueue_promise, enqueue_sync,
    enqueue_timer,
};
pub use error::{Result, SchedulerError};
pub use render::{
    animation_frame_waiting, frame_boundary_reached, is_frame_boundary, next_frame_boundary,
    request_render,
};
pub use rules::{Rule, select_rule};
pub use run::{Run, RunLimits, run, run_with};
pub use simulator::Simulator;
pub use tick::{Step, step, tick};
