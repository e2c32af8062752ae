use async_trait::async_trait;
use tablet_flow::{Context, FlowError, NextAction, Result, Task, TaskResult};
use tracing::info;

use super::session_keys;
use crate::models::TabletAnalysis;
use crate::rxnorm::RxNormClient;

pub struct RxNormLookupTask {
    rxnorm: RxNormClient,
}

impl RxNormLookupTask {
    pub fn new(rxnorm: RxNormClient) -> Self {
        Self { rxnorm }
    }
}

#[async_trait]
impl Task for RxNormLookupTask {
    async fn run(&self, context: Context) -> Result<TaskResult> {
        let mut analysis: TabletAnalysis = context.require(session_keys::ANALYSIS).await?;

        // Set by WhoLookupTask
        let tablet_name = analysis.tablet_name.clone().ok_or_else(|| {
            FlowError::ContextError("Tablet name not derived before RxNorm lookup".to_string())
        })?;

        info!("Looking up '{}' in RxNorm", tablet_name);
        analysis.rxnorm_info = Some(self.rxnorm.info(&tablet_name).await);
        context.set(session_keys::ANALYSIS, analysis).await?;

        Ok(TaskResult::new_with_status(
            NextAction::End,
            "Tablet analysis completed",
        ))
    }
}
