//! AI suggestion intake: wire types of the generation functions, the
//! validating parse step, and deduplicating import into a session.

mod cache;
mod candidate;
mod merge;
mod wire;

pub use cache::{AiResultCache, CachedAiResults};
pub use candidate::{parse_all, parse_candidates, AiCandidate, ParsedBatch};
pub use merge::{AiResultMerger, MergeReport};
pub use wire::{CanvasGenerationRequest, GenerationResponse, ImageGenerationRequest};
