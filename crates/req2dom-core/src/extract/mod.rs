mod attributes;
mod candidates;
mod relationships;

pub use attributes::{infer_type, AttributeInference};
pub use candidates::{CandidateExtractor, ClassCandidate, OriginStrategy, ScoringStrategy};
pub use relationships::{RelationshipExtractor, RelationshipLayer, SourcedRelationship};
