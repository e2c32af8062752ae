pub mod image_summary;
pub mod rxnorm_lookup;
pub mod who_lookup;

pub use image_summary::ImageSummaryTask;
pub use rxnorm_lookup::RxNormLookupTask;
pub use who_lookup::WhoLookupTask;

pub mod session_keys {
    /// The [`crate::models::TabletAnalysis`] being built up by the tasks.
    pub const ANALYSIS: &str = "analysis";
}
