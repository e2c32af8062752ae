pub mod config;
pub mod gemini;
pub mod models;
pub mod prompts;
pub mod rxnorm;
pub mod service;
pub mod tasks;
pub mod tts;
pub mod upload;
pub mod who;
pub mod workflow;

pub use config::Config;
pub use service::{AppState, build_router, create_app};
pub use workflow::{Services, build_tablet_pipeline, run_analysis};
pub use models::*;
