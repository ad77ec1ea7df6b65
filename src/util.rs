//! Shared utility modules used across LexRisk components.

pub mod simd;
