pub mod chunker;
pub mod concatenator;
pub mod error;
pub mod format;
pub mod orchestrator;
pub mod outcome;
pub mod service;


pub use chunker::{chunk_text, split_text_into_chunks, Chunk, DEFAULT_CHUNK_SIZE};
pub use concatenator::{CodecSupport, Concatenator, MergeError, MergeMethod};
pub use error::{PipelineError, PipelineErrorKind};
pub use format::AudioFormat;
pub use orchestrator::SynthesisOrchestrator;
pub use outcome::PipelineOutcome;
pub use service::{AudioArtifact, GenerateAudioRequest, SourceAudioService, SourceAudioServiceApi};
