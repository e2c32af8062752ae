use std::sync::Arc;
use tablet_flow::{Context, Pipeline, PipelineBuilder};
use tracing::info;

use crate::config::Config;
use crate::gemini::GeminiClient;
use crate::models::{TabletAnalysis, TabletImage, UserType};
use crate::rxnorm::RxNormClient;
use crate::tasks::{ImageSummaryTask, RxNormLookupTask, WhoLookupTask, session_keys};
use crate::tts::{GoogleTranslateTts, TtsProvider};
use crate::who::WhoTable;

/// External clients and reference data used by every analysis.
#[derive(Clone)]
pub struct Services {
    pub gemini: GeminiClient,
    pub rxnorm: RxNormClient,
    pub who: Arc<WhoTable>,
    pub tts: Arc<dyn TtsProvider>,
    pub tts_lang: String,
}

impl Services {
    pub fn from_config(config: &Config) -> anyhow::Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(config.http_timeout)
            .build()?;

        Ok(Self {
            gemini: GeminiClient::new(
                client.clone(),
                &config.gemini_base_url,
                &config.gemini_model,
                &config.google_api_key,
            ),
            rxnorm: RxNormClient::new(client.clone(), &config.rxnorm_base_url),
            who: Arc::new(WhoTable::load_or_empty(&config.who_csv_path)),
            tts: Arc::new(GoogleTranslateTts::new(client, &config.tts_base_url)),
            tts_lang: config.tts_lang.clone(),
        })
    }
}

/// One pipeline per upload; the image travels inside the summary task.
pub fn build_tablet_pipeline(services: &Services, image: TabletImage) -> Pipeline {
    PipelineBuilder::new("tablet_analysis")
        .add_task(Arc::new(ImageSummaryTask::new(services.gemini.clone(), image)))
        .add_task(Arc::new(WhoLookupTask::new(services.who.clone())))
        .add_task(Arc::new(RxNormLookupTask::new(services.rxnorm.clone())))
        .build()
}

pub async fn run_analysis(
    services: &Services,
    image: TabletImage,
    note: String,
    user_type: UserType,
) -> tablet_flow::Result<TabletAnalysis> {
    let pipeline = build_tablet_pipeline(services, image);
    let context = Context::new();
    context
        .set(
            session_keys::ANALYSIS,
            TabletAnalysis {
                note,
                user_type,
                ..Default::default()
            },
        )
        .await?;

    let result = pipeline.execute(context.clone()).await?;
    info!("Analysis ran tasks: {:?}", result.executed);

    context.require(session_keys::ANALYSIS).await
}
