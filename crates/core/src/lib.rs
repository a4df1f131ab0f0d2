pub mod capabilities;
pub mod config;
pub mod encoder;
pub mod metrics;
pub mod orchestrator;
pub mod planner;
pub mod probe;
pub mod state;
pub mod testing;

pub use capabilities::{
    CapabilityError, CodecCatalog, CodecInfo, ColorFormat, EncoderChoice, FfmpegCodecCatalog,
    LegacyGate, PlatformConfig, StaticCodecCatalog,
};
pub use config::{
    load_config, load_config_from_str, load_config_or_default, validate_config, Config,
    ConfigError,
};
pub use encoder::{
    ConversionCallback, EncodeOutcome, EncodeRequest, Encoder, EncoderConfig, EncoderError,
    FfmpegEncoder,
};
pub use orchestrator::{
    CancelHandle, ConversionEvent, ConversionJob, ConversionOrchestrator, ConversionReport,
    ConversionRequest, JobState, OrchestratorConfig, OrchestratorError,
};
pub use planner::{
    compute_bitrate, CompressionPlan, CompressionPlanner, EditDescriptors, PlanError,
    PlannerConfig,
};
pub use probe::{FfprobeProbe, MetadataProbe, ProbeReport, SourceMetadata};
pub use state::{FileFlagStore, FlagStore, MemoryFlagStore, StateConfig, StateError};
