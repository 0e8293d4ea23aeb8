pub mod status_pipeline;

pub use status_pipeline::StatusPipeline;
