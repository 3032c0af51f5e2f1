use tickloop_core::LogEntry;
use tickloop_scheduler::{Rule, Step};

use crate::snapshot::Snapshot;

/// Receives every step of a run as it happens.
pub trait TraceSink {
    fn record(&mut self, step: &Step);
}

/// One line saying which rule fired, why, and what it logged.
pub fn explain(step: &Step) -> String {
    let mut line = format!(
        "#{:<4} t={:<5} [{}] {}",
        step.state.step,
        step.state.now,
        step.rule.priority(),
        step.rule
    );
    if let Some(entry) = headline(step) {
        line.push_str(": ");
        line.push_str(&entry.message);
    }
    line.push_str(" (");
    line.push_str(step.rule.describe());
    line.push(')');
    line
}

/// The entry the rule itself wrote this step, if any.
fn headline(step: &Step) -> Option<&LogEntry> {
    step.entries()
        .iter()
        .find(|entry| entry.rule() == Some(step.rule.name()))
}

/// Keeps a snapshot per step so a run can be compared or replayed later.
#[derive(Debug, Default)]
pub struct Recorder {
    steps: Vec<(Rule, Snapshot)>,
}

impl Recorder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.steps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    pub fn rules(&self) -> impl Iterator<Item = Rule> + '_ {
        self.steps.iter().map(|(rule, _)| *rule)
    }

    pub fn snapshots(&self) -> impl Iterator<Item = &Snapshot> {
        self.steps.iter().map(|(_, snapshot)| snapshot)
    }

    pub fn last(&self) -> Option<&Snapshot> {
        self.steps.last().map(|(_, snapshot)| snapshot)
    }
}

impl TraceSink for Recorder {
    fn record(&mut self, step: &Step) {
        self.steps.push((step.rule, Snapshot::capture(&step.state)));
    }
}
