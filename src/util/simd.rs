//! SIMD-friendly helpers that power the embedding neighbor scan.

/// Chunked numerical operations over `f32` slices.
pub mod numeric {

    /// Dot product of two equally long vectors.
    ///
    /// Processes four lanes at a time so the compiler can vectorize the
    /// inner loop.
    pub fn dot(a: &[f32], b: &[f32]) -> f32 {
        assert_eq!(a.len(), b.len());

        let mut lanes = [0.0f32; 4];

        let chunks = a.chunks_exact(4);
        let remainder = chunks.remainder();
        let other_chunks = b.chunks_exact(4);

        for (a_chunk, b_chunk) in chunks.zip(other_chunks) {
            for i in 0..4 {
                lanes[i] += a_chunk[i] * b_chunk[i];
            }
        }

        // Handle remaining values
        let b_remainder = &b[b.len() - remainder.len()..];
        let mut tail = 0.0f32;
        for (x, y) in remainder.iter().zip(b_remainder.iter()) {
            tail += x * y;
        }

        lanes.iter().sum::<f32>() + tail
    }

    /// Euclidean norm of a vector.
    pub fn norm(v: &[f32]) -> f32 {
        dot(v, v).sqrt()
    }

    /// Cosine similarity given precomputed norms.
    ///
    /// Returns `0.0` when either vector has zero length.
    pub fn cosine_with_norms(a: &[f32], a_norm: f32, b: &[f32], b_norm: f32) -> f32 {
        if a_norm == 0.0 || b_norm == 0.0 {
            return 0.0;
        }
        dot(a, b) / (a_norm * b_norm)
    }
}

#[cfg(test)]
mod tests {
    use super::numeric::*;

    fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
        cosine_with_norms(a, norm(a), b, norm(b))
    }

    #[test]
    fn test_dot_with_remainder() {
        let a = [1.0, 2.0, 3.0, 4.0, 5.0, 6.0];
        let b = [1.0, 1.0, 1.0, 1.0, 1.0, 2.0];
        assert_eq!(dot(&a, &b), 27.0);
    }

    #[test]
    fn test_cosine_identical_and_orthogonal() {
        let a = [0.3, 0.4, 0.0];
        assert!((cosine_similarity(&a, &a) - 1.0).abs() < 1e-6);

        let x = [1.0, 0.0];
        let y = [0.0, 1.0];
        assert_eq!(cosine_similarity(&x, &y), 0.0);
    }

    #[test]
    fn test_cosine_zero_vector() {
        let zero = [0.0, 0.0, 0.0];
        let a = [1.0, 2.0, 3.0];
        assert_eq!(cosine_similarity(&zero, &a), 0.0);
    }
}
