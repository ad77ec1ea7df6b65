//! In-memory word-vector table.
//!
//! ## File format
//!
//! word2vec text format: an optional `count dimension` header line, then one
//! `token v1 v2 ... vd` line per vocabulary entry, whitespace separated.
//!
//! Neighbor search is an exhaustive cosine scan over the whole vocabulary,
//! parallelized with rayon. Norms are computed once at load time.

use std::any::Any;
use std::io::BufRead;
use std::path::Path;

use ahash::AHashMap;
use rayon::prelude::*;

use crate::embedding::lookup::{EmbeddingLookup, Neighbor};
use crate::error::{LexRiskError, Result};
use crate::util::simd::numeric;

/// A fixed vocabulary of token vectors stored contiguously.
#[derive(Debug, Clone, Default)]
pub struct WordVectorTable {
    dimension: usize,
    tokens: Vec<String>,
    index: AHashMap<String, usize>,
    vectors: Vec<f32>,
    norms: Vec<f32>,
}

impl WordVectorTable {
    /// An empty table; every lookup misses.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Build a table from `(token, vector)` pairs.
    ///
    /// All vectors must share one dimension. Repeated tokens keep their first
    /// vector.
    pub fn from_entries<I>(entries: I) -> Result<Self>
    where
        I: IntoIterator<Item = (String, Vec<f32>)>,
    {
        let mut table = Self::empty();
        for (token, vector) in entries {
            table.push(token, vector)?;
        }
        Ok(table)
    }

    /// Load a table from a word2vec text file.
    pub fn from_text_path<P: AsRef<Path>>(path: P) -> Result<Self> {
        let file = std::fs::File::open(path.as_ref())?;
        let table = Self::from_text_reader(std::io::BufReader::new(file))?;
        log::info!(
            "loaded {} word vectors (dimension {}) from {}",
            table.len(),
            table.dimension,
            path.as_ref().display()
        );
        Ok(table)
    }

    /// Load a table from any word2vec text reader.
    pub fn from_text_reader<R: BufRead>(reader: R) -> Result<Self> {
        let mut table = Self::empty();
        for (line_no, line) in reader.lines().enumerate() {
            let line = line?;
            let mut fields = line.split_whitespace();
            let Some(token) = fields.next() else {
                continue;
            };
            let values: Vec<&str> = fields.collect();

            if line_no == 0 && values.len() == 1 && Self::is_header(token, values[0]) {
                continue;
            }

            let vector = values
                .iter()
                .map(|v| v.parse::<f32>())
                .collect::<std::result::Result<Vec<f32>, _>>()
                .map_err(|err| {
                    LexRiskError::invalid_argument(format!(
                        "word vectors line {}: {err}",
                        line_no + 1
                    ))
                })?;
            table.push(token.to_string(), vector)?;
        }
        Ok(table)
    }

    fn is_header(first: &str, second: &str) -> bool {
        first.parse::<usize>().is_ok() && second.parse::<usize>().is_ok()
    }

    fn push(&mut self, token: String, vector: Vec<f32>) -> Result<()> {
        if vector.is_empty() {
            return Err(LexRiskError::invalid_argument(format!(
                "token '{token}' has an empty vector"
            )));
        }
        if self.tokens.is_empty() {
            self.dimension = vector.len();
        } else if vector.len() != self.dimension {
            return Err(LexRiskError::invalid_argument(format!(
                "token '{token}' has dimension {}, expected {}",
                vector.len(),
                self.dimension
            )));
        }
        if self.index.contains_key(&token) {
            log::debug!("duplicate word vector for '{token}' ignored");
            return Ok(());
        }

        self.index.insert(token.clone(), self.tokens.len());
        self.tokens.push(token);
        self.norms.push(numeric::norm(&vector));
        self.vectors.extend_from_slice(&vector);
        Ok(())
    }

    /// Number of tokens in the vocabulary.
    pub fn len(&self) -> usize {
        self.tokens.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }

    /// The vector of `token`, if present.
    pub fn vector(&self, token: &str) -> Option<&[f32]> {
        self.index.get(token).map(|&i| self.row(i))
    }

    fn row(&self, i: usize) -> &[f32] {
        &self.vectors[i * self.dimension..(i + 1) * self.dimension]
    }
}

impl EmbeddingLookup for WordVectorTable {
    fn nearest_neighbors(
        &self,
        token: &str,
        topn: usize,
        threshold: f32,
    ) -> Result<Vec<Neighbor>> {
        let &query_idx = self
            .index
            .get(token)
            .ok_or_else(|| LexRiskError::EmbeddingMiss(token.to_string()))?;
        if topn == 0 {
            return Ok(Vec::new());
        }

        let query = self.row(query_idx);
        let query_norm = self.norms[query_idx];

        let mut hits: Vec<(usize, f32)> = (0..self.tokens.len())
            .into_par_iter()
            .filter(|&i| i != query_idx)
            .filter_map(|i| {
                let similarity =
                    numeric::cosine_with_norms(query, query_norm, self.row(i), self.norms[i]);
                (similarity >= threshold).then_some((i, similarity))
            })
            .collect();

        // Ties keep vocabulary order so results are deterministic.
        hits.sort_by(|a, b| b.1.total_cmp(&a.1).then(a.0.cmp(&b.0)));
        hits.truncate(topn);

        Ok(hits
            .into_iter()
            .map(|(i, similarity)| Neighbor::new(self.tokens[i].clone(), similarity))
            .collect())
    }

    fn has_vector(&self, token: &str) -> bool {
        self.index.contains_key(token)
    }

    fn dimension(&self) -> usize {
        self.dimension
    }

    fn name(&self) -> &str {
        "word-vector-table"
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}
