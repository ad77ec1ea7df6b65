//! Word-embedding lookup used to grow the lexicon.
//!
//! - [`lookup`]: the [`EmbeddingLookup`](lookup::EmbeddingLookup) trait
//! - [`table`]: an in-memory word-vector table with exhaustive cosine search
//! - [`vocab`]: conversions between surface phrases and vocabulary tokens

pub mod lookup;
pub mod table;
pub mod vocab;

pub use lookup::{EmbeddingLookup, Neighbor};
pub use table::WordVectorTable;
