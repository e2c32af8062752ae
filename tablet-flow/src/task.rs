use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::{context::Context, error::Result};

/// Result of a task execution
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TaskResult {
    /// Short progress note for logs and status displays
    pub status_message: Option<String>,
    /// Next action to take
    pub next_action: NextAction,
    /// Id of the task that produced this result, filled in by the pipeline
    #[serde(default)]
    pub task_id: String,
}

impl TaskResult {
    pub fn new(next_action: NextAction) -> Self {
        Self {
            status_message: None,
            next_action,
            task_id: String::new(),
        }
    }

    pub fn new_with_status(next_action: NextAction, status_message: impl Into<String>) -> Self {
        Self {
            status_message: Some(status_message.into()),
            next_action,
            task_id: String::new(),
        }
    }
}

/// Defines what should happen after a task completes
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum NextAction {
    /// Run the next task in pipeline order
    Continue,
    /// Stop the pipeline
    End,
}

/// Core trait that all tasks must implement
#[async_trait]
pub trait Task: Send + Sync {
    /// Unique identifier for this task
    fn id(&self) -> &str {
        std::any::type_name::<Self>()
    }

    /// Execute the task with the given context
    async fn run(&self, context: Context) -> Result<TaskResult>;
}
