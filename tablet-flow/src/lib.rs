pub mod context;
pub mod error;
pub mod pipeline;
pub mod storage;
pub mod task;

// Re-export commonly used types
pub use context::Context;
pub use error::{FlowError, Result};
pub use pipeline::{ExecutionResult, Pipeline, PipelineBuilder};
pub use storage::{InMemorySessionStorage, Session, SessionStorage};
pub use task::{NextAction, Task, TaskResult};

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::sync::Arc;

    struct AppendTask {
        id: String,
        next: NextAction,
    }

    #[async_trait]
    impl Task for AppendTask {
        fn id(&self) -> &str {
            &self.id
        }

        async fn run(&self, context: Context) -> Result<TaskResult> {
            let mut trail: Vec<String> = context.get("trail").await.unwrap_or_default();
            trail.push(self.id.clone());
            context.set("trail", trail).await?;

            Ok(TaskResult::new_with_status(
                self.next.clone(),
                format!("{} done", self.id),
            ))
        }
    }

    struct FailingTask;

    #[async_trait]
    impl Task for FailingTask {
        async fn run(&self, _context: Context) -> Result<TaskResult> {
            Err(FlowError::TaskExecutionFailed("boom".to_string()))
        }
    }

    fn task(id: &str, next: NextAction) -> Arc<dyn Task> {
        Arc::new(AppendTask {
            id: id.to_string(),
            next,
        })
    }

    #[tokio::test]
    async fn test_pipeline_runs_tasks_in_order() {
        let pipeline = PipelineBuilder::new("test")
            .add_task(task("first", NextAction::Continue))
            .add_task(task("second", NextAction::Continue))
            .add_task(task("third", NextAction::End))
            .build();

        let context = Context::new();
        let result = pipeline.execute(context.clone()).await.unwrap();

        assert_eq!(result.executed, vec!["first", "second", "third"]);
        assert_eq!(result.status_message.as_deref(), Some("third done"));

        let trail: Vec<String> = context.get("trail").await.unwrap();
        assert_eq!(trail, vec!["first", "second", "third"]);
    }

    #[tokio::test]
    async fn test_end_stops_before_remaining_tasks() {
        let pipeline = PipelineBuilder::new("test")
            .add_task(task("first", NextAction::End))
            .add_task(task("second", NextAction::End))
            .build();

        let result = pipeline.execute(Context::new()).await.unwrap();
        assert_eq!(result.executed, vec!["first"]);
    }

    #[tokio::test]
    async fn test_task_error_propagates() {
        let pipeline = PipelineBuilder::new("test")
            .add_task(Arc::new(FailingTask))
            .add_task(task("after", NextAction::End))
            .build();

        let err = pipeline.execute(Context::new()).await.unwrap_err();
        assert!(matches!(err, FlowError::TaskExecutionFailed(_)));
    }

    #[test]
    fn test_default_task_id_is_type_name() {
        let task: Arc<dyn Task> = Arc::new(FailingTask);
        assert!(task.id().ends_with("FailingTask"));
    }

    #[tokio::test]
    async fn test_context_require_reports_missing_key() {
        let context = Context::new();
        context.set("count", 3).await.unwrap();

        let count: u32 = context.require("count").await.unwrap();
        assert_eq!(count, 3);
        assert!(matches!(
            context.require::<u32>("absent").await,
            Err(FlowError::ContextError(_))
        ));
    }

    #[tokio::test]
    async fn test_session_storage_overwrites_summary() {
        let storage = InMemorySessionStorage::new();

        let mut session = Session::new("session1");
        session.store_summary("first");
        storage.save(session).await.unwrap();

        let mut session = storage.get("session1").await.unwrap().unwrap();
        assert_eq!(session.summary.as_deref(), Some("first"));
        session.store_summary("second");
        storage.save(session).await.unwrap();

        let session = storage.get("session1").await.unwrap().unwrap();
        assert_eq!(session.summary.as_deref(), Some("second"));
        assert!(storage.get("session2").await.unwrap().is_none());
    }
}
