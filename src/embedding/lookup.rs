use std::any::Any;

use serde::{Deserialize, Serialize};

use crate::error::Result;

/// A vocabulary token close to a query token.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Neighbor {
    pub token: String,
    /// Cosine similarity to the query, in `[-1, 1]`.
    pub similarity: f32,
}

impl Neighbor {
    pub fn new(token: impl Into<String>, similarity: f32) -> Self {
        Neighbor {
            token: token.into(),
            similarity,
        }
    }
}

/// Maps tokens to vectors and answers nearest-neighbor queries over a fixed
/// vocabulary.
pub trait EmbeddingLookup: Send + Sync + std::fmt::Debug {
    /// Up to `topn` vocabulary tokens whose cosine similarity to `token` is at
    /// least `threshold`, best first. The query token itself is never returned.
    ///
    /// Returns [`LexRiskError::EmbeddingMiss`](crate::LexRiskError::EmbeddingMiss)
    /// when `token` has no vector.
    fn nearest_neighbors(&self, token: &str, topn: usize, threshold: f32)
    -> Result<Vec<Neighbor>>;

    /// Whether `token` is in the vocabulary.
    fn has_vector(&self, token: &str) -> bool;

    /// Vector dimension, or 0 for an empty table.
    fn dimension(&self) -> usize;

    fn name(&self) -> &str;

    fn as_any(&self) -> &dyn Any;
}
