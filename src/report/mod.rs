//! Turning an uploaded artwork into a style brief.

pub mod input;
pub mod pipeline;
pub mod profile;
pub mod prompts;

pub use input::{ApiKeys, ArtworkSubmission, Credentials};
pub use pipeline::{
    PipelineSettings, Report, ReportGenerator, ReportPipeline, ResearchLinks, VisualInsights,
};
pub use profile::{ArtworkOrigin, ArtworkProfile, ArtworkSource, ImageFormat, UploadedImage};
