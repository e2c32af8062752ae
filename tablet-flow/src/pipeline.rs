use std::sync::Arc;
use tracing::{debug, info};

use crate::{
    context::Context,
    error::Result,
    task::{NextAction, Task, TaskResult},
};

/// An ordered list of tasks run front to back over one [`Context`].
///
/// Each task decides what happens next: `Continue` moves to the following
/// task, `End` stops. Running off the end of the list also stops the pipeline.
pub struct Pipeline {
    pub id: String,
    tasks: Vec<Arc<dyn Task>>,
}

/// Outcome of a full pipeline run
#[derive(Debug, Clone)]
pub struct ExecutionResult {
    /// Ids of the tasks that ran, in order
    pub executed: Vec<String>,
    /// Status message of the last task that reported one
    pub status_message: Option<String>,
}

impl Pipeline {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            tasks: Vec::new(),
        }
    }

    /// Run every task from the first one until a task ends the pipeline.
    pub async fn execute(&self, context: Context) -> Result<ExecutionResult> {
        let mut executed = Vec::new();
        let mut status_message = None;

        for task in &self.tasks {
            let result = self.execute_single_task(task, context.clone()).await?;
            debug!(pipeline = %self.id, task = %result.task_id, "task finished");
            executed.push(result.task_id.clone());
            if result.status_message.is_some() {
                status_message = result.status_message;
            }

            if result.next_action == NextAction::End {
                break;
            }
        }

        info!(pipeline = %self.id, steps = executed.len(), "pipeline completed");
        Ok(ExecutionResult {
            executed,
            status_message,
        })
    }

    async fn execute_single_task(
        &self,
        task: &Arc<dyn Task>,
        context: Context,
    ) -> Result<TaskResult> {
        let mut result = task.run(context).await?;
        result.task_id = task.id().to_string();
        Ok(result)
    }
}

/// Builder for creating pipelines
pub struct PipelineBuilder {
    pipeline: Pipeline,
}

impl PipelineBuilder {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            pipeline: Pipeline::new(id),
        }
    }

    pub fn add_task(mut self, task: Arc<dyn Task>) -> Self {
        self.pipeline.tasks.push(task);
        self
    }

    pub fn build(self) -> Pipeline {
        self.pipeline
    }
}
