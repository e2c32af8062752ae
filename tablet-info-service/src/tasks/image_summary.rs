use async_trait::async_trait;
use tablet_flow::{Context, NextAction, Result, Task, TaskResult};
use tracing::info;

use super::session_keys;
use crate::gemini::GeminiClient;
use crate::models::{TabletAnalysis, TabletImage};
use crate::prompts::build_full_prompt;

/// Sends the uploaded photo and the prompt to the model.
pub struct ImageSummaryTask {
    gemini: GeminiClient,
    image: TabletImage,
}

impl ImageSummaryTask {
    pub fn new(gemini: GeminiClient, image: TabletImage) -> Self {
        Self { gemini, image }
    }
}

#[async_trait]
impl Task for ImageSummaryTask {
    async fn run(&self, context: Context) -> Result<TaskResult> {
        info!("Starting tablet image summary");

        let mut analysis: TabletAnalysis = context.require(session_keys::ANALYSIS).await?;

        let prompt = build_full_prompt(analysis.user_type, &analysis.note);
        let summary = self.gemini.summarize(&prompt, &self.image).await;

        info!("Tablet summary ready ({} characters)", summary.len());
        analysis.summary = Some(summary);
        context.set(session_keys::ANALYSIS, analysis).await?;

        Ok(TaskResult::new_with_status(
            NextAction::Continue,
            "Tablet image summarized",
        ))
    }
}
