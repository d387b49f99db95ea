//! Text embedding interfaces for Flowmesh
//!
//! The [`Embeddings`] trait is the capability a vector store node receives
//! from an upstream embedding-provider node: map text to fixed-dimensional
//! vectors. Concrete providers (OpenAI, local models, ...) live in their own
//! integration crates; this crate only defines the contract plus
//! [`MockEmbeddings`] for tests and examples.

use async_trait::async_trait;

use crate::core::error::Result;

/// Capability to embed text into fixed-dimensional vectors.
///
/// Implementations must be deterministic per input within a single process
/// run, and must return one vector per input text, all of the same
/// dimensionality.
#[async_trait]
pub trait Embeddings: Send + Sync {
    /// Embed a batch of document texts.
    ///
    /// Returns one vector per text, in input order.
    async fn embed_documents(&self, texts: &[String]) -> Result<Vec<Vec<f32>>>;

    /// Embed a single query text.
    async fn embed_query(&self, text: &str) -> Result<Vec<f32>>;
}

/// Deterministic embeddings for tests and documentation examples.
///
/// Produces unit vectors of the configured dimensionality derived from the
/// text's bytes. Not suitable for real retrieval quality - the point is
/// determinism: the same text always maps to the same vector, and distinct
/// texts usually map to distinct vectors.
///
/// # Example
///
/// ```
/// use flowmesh::core::embeddings::{Embeddings, MockEmbeddings};
///
/// # async fn example() -> flowmesh::core::Result<()> {
/// let embeddings = MockEmbeddings::new(4);
/// let vector = embeddings.embed_query("hello").await?;
/// assert_eq!(vector.len(), 4);
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct MockEmbeddings {
    dimension: usize,
}

impl MockEmbeddings {
    /// Create mock embeddings producing vectors of `dimension` components.
    #[must_use]
    pub fn new(dimension: usize) -> Self {
        Self { dimension }
    }

    /// The dimensionality of produced vectors.
    #[must_use]
    pub fn dimension(&self) -> usize {
        self.dimension
    }

    fn embed_one(&self, text: &str) -> Vec<f32> {
        // FNV-style rolling hash per component keeps vectors deterministic
        // and spread without pulling in a hashing crate.
        let mut state: u64 = 0xcbf2_9ce4_8422_2325;
        for byte in text.bytes() {
            state ^= u64::from(byte);
            state = state.wrapping_mul(0x0000_0100_0000_01b3);
        }

        let mut vector = Vec::with_capacity(self.dimension);
        for component in 0..self.dimension {
            state ^= component as u64 + 1;
            state = state.wrapping_mul(0x0000_0100_0000_01b3);
            // Map to [-1, 1]
            let unit = (state >> 11) as f32 / (1u64 << 53) as f32;
            vector.push(unit.mul_add(2.0, -1.0));
        }

        let magnitude = vector.iter().map(|x| x * x).sum::<f32>().sqrt();
        if magnitude > 0.0 {
            for component in &mut vector {
                *component /= magnitude;
            }
        }
        vector
    }
}

#[async_trait]
impl Embeddings for MockEmbeddings {
    async fn embed_documents(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
        Ok(texts.iter().map(|t| self.embed_one(t)).collect())
    }

    async fn embed_query(&self, text: &str) -> Result<Vec<f32>> {
        Ok(self.embed_one(text))
    }
}
