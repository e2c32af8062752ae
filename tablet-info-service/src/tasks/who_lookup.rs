use async_trait::async_trait;
use std::sync::Arc;
use tablet_flow::{Context, NextAction, Result, Task, TaskResult};
use tracing::info;

use super::session_keys;
use crate::models::TabletAnalysis;
use crate::who::{WhoTable, tablet_name_from_note};

pub struct WhoLookupTask {
    table: Arc<WhoTable>,
}

impl WhoLookupTask {
    pub fn new(table: Arc<WhoTable>) -> Self {
        Self { table }
    }
}

#[async_trait]
impl Task for WhoLookupTask {
    async fn run(&self, context: Context) -> Result<TaskResult> {
        let mut analysis: TabletAnalysis = context.require(session_keys::ANALYSIS).await?;

        let tablet_name = tablet_name_from_note(&analysis.note);
        info!("Looking up '{}' in the WHO table", tablet_name);

        analysis.who_info = Some(self.table.info(&tablet_name));
        analysis.tablet_name = Some(tablet_name);
        context.set(session_keys::ANALYSIS, analysis).await?;

        Ok(TaskResult::new(NextAction::Continue))
    }
}
