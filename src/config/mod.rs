//! JSON pipeline descriptions used by the CLI and tests.

pub mod pipeline;

pub use pipeline::{
    BuiltPipeline, DrawableConfig, LookupConfig, PassConfig, PassType, PipelineConfig, SizeConfig,
    TargetConfig,
};
