use crate::task::{LogicalTime, TaskId};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum LogCategory {
    TaskStart,
    TaskComplete,
    Enqueue,
    Render,
    User,
}

impl LogCategory {
    pub fn name(self) -> &'static str {
        match self {
            LogCategory::TaskStart => "task-start",
            LogCategory::TaskComplete => "task-complete",
            LogCategory::Enqueue => "enqueue",
            LogCategory::Render => "render",
            LogCategory::User => "user",
        }
    }
}

impl fmt::Display for LogCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.name())
    }
}

/// One entry of the append-only event log.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LogEntry {
    pub timestamp: LogicalTime,
    pub category: LogCategory,
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub task_id: Option<TaskId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metadata: Option<Value>,
}

impl LogEntry {
    pub fn new(timestamp: LogicalTime, category: LogCategory, message: impl Into<String>) -> Self {
        Self {
            timestamp,
            category,
            message: message.into(),
            task_id: None,
            metadata: None,
        }
    }

    pub fn task(mut self, id: &TaskId) -> Self {
        self.task_id = Some(id.clone());
        self
    }

    /// Adds a key to the metadata object, creating it if needed.
    pub fn meta(mut self, key: &str, value: impl Into<Value>) -> Self {
        let metadata = self
            .metadata
            .get_or_insert_with(|| Value::Object(Default::default()));
        if let Value::Object(map) = metadata {
            map.insert(key.to_string(), value.into());
        }
        self
    }

    pub fn meta_str(&self, key: &str) -> Option<&str> {
        self.metadata.as_ref()?.get(key)?.as_str()
    }

    /// Name of the scheduler rule that produced this entry, if any.
    pub fn rule(&self) -> Option<&str> {
        self.meta_str("rule")
    }
}

impl fmt::Display for LogEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[t={}] {:<13} {}", self.timestamp, self.category, self.message)
    }
}
