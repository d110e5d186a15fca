// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The embedding model is an external collaborator: this crate
//! only defines the seam, [`EmbeddingService`], plus the one concrete
//! implementation that ships by default, [`HashingEmbeddingService`] — a
//! deterministic, content-addressed stand-in that requires no model weights
//! or inference runtime. A real model-backed adapter is a drop-in behind the
//! same trait.

use indexer_core::IndexerError;
use parking_lot::Mutex;
use sha2::{Digest, Sha256};
use std::collections::{HashMap, VecDeque};

/// Encodes text into fixed-dimension embedding vectors.
///
/// A single embedding service instance with an internal LRU cache on
/// encoded text is a shared resource — implementations are expected to
/// cache on `text -> vector` the way [`HashingEmbeddingService`] does.
pub trait EmbeddingService: Send + Sync {
    fn dimension(&self) -> usize;

    /// Encode a batch of chunk texts, preserving order, into equal-dimension
    /// vectors.
    fn encode_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>, IndexerError>;
}

/// Bounds the cache so a pathological caller can't grow it unboundedly.
const CACHE_CAPACITY: usize = 4096;

struct EncodeCache {
    entries: HashMap<String, Vec<f32>>,
    order: VecDeque<String>,
}

impl EncodeCache {
    fn new() -> Self {
        Self { entries: HashMap::new(), order: VecDeque::new() }
    }

    fn get(&self, text: &str) -> Option<Vec<f32>> {
        self.entries.get(text).cloned()
    }

    fn insert(&mut self, text: String, vector: Vec<f32>) {
        if self.entries.len() >= CACHE_CAPACITY {
            if let Some(oldest) = self.order.pop_front() {
                self.entries.remove(&oldest);
            }
        }
        self.order.push_back(text.clone());
        self.entries.insert(text, vector);
    }
}

/// Deterministic, content-addressed embedding: SHA-256 over the text,
/// expanded to `dimension` floats and L2-normalized so cosine distance
/// (the `<=>` operator used by the vector index) behaves sensibly. Two
/// identical texts always produce the same vector; different texts produce
/// different vectors with high probability.
pub struct HashingEmbeddingService {
    dimension: usize,
    cache: Mutex<EncodeCache>,
}

impl HashingEmbeddingService {
    pub fn new(dimension: usize) -> Self {
        Self { dimension, cache: Mutex::new(EncodeCache::new()) }
    }

    fn encode_one(&self, text: &str) -> Vec<f32> {
        if let Some(cached) = self.cache.lock().get(text) {
            return cached;
        }
        let vector = Self::hash_to_vector(text, self.dimension);
        self.cache.lock().insert(text.to_string(), vector.clone());
        vector
    }

    fn hash_to_vector(text: &str, dimension: usize) -> Vec<f32> {
        let mut raw = Vec::with_capacity(dimension);
        let mut counter: u32 = 0;
        while raw.len() < dimension {
            let mut hasher = Sha256::new();
            hasher.update(text.as_bytes());
            hasher.update(counter.to_le_bytes());
            let digest = hasher.finalize();
            for byte in digest {
                if raw.len() == dimension {
                    break;
                }
                // Map a byte into [-1.0, 1.0).
                raw.push((byte as f32 / 128.0) - 1.0);
            }
            counter += 1;
        }

        let norm = raw.iter().map(|v| v * v).sum::<f32>().sqrt();
        if norm > 0.0 {
            for v in &mut raw {
                *v /= norm;
            }
        }
        raw
    }
}

impl Default for HashingEmbeddingService {
    fn default() -> Self {
        Self::new(indexer_core::chunk::EMBEDDING_DIM)
    }
}

impl EmbeddingService for HashingEmbeddingService {
    fn dimension(&self) -> usize {
        self.dimension
    }

    fn encode_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>, IndexerError> {
        Ok(texts.iter().map(|t| self.encode_one(t)).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn same_text_produces_same_vector() {
        let service = HashingEmbeddingService::new(32);
        let a = service.encode_batch(&["hello world".to_string()]).unwrap();
        let b = service.encode_batch(&["hello world".to_string()]).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn different_text_produces_different_vector() {
        let service = HashingEmbeddingService::new(32);
        let a = service.encode_batch(&["hello".to_string()]).unwrap();
        let b = service.encode_batch(&["goodbye".to_string()]).unwrap();
        assert_ne!(a, b);
    }

    #[test]
    fn vectors_have_requested_dimension() {
        let service = HashingEmbeddingService::new(384);
        let out = service.encode_batch(&["x".to_string()]).unwrap();
        assert_eq!(out[0].len(), 384);
    }

    #[test]
    fn preserves_batch_order() {
        let service = HashingEmbeddingService::new(16);
        let texts = vec!["one".to_string(), "two".to_string(), "three".to_string()];
        let vectors = service.encode_batch(&texts).unwrap();
        assert_eq!(vectors.len(), 3);
        assert_eq!(vectors[0], service.encode_batch(&["one".to_string()]).unwrap()[0]);
        assert_eq!(vectors[2], service.encode_batch(&["three".to_string()]).unwrap()[0]);
    }

    #[test]
    fn cache_evicts_oldest_entry_past_capacity() {
        let mut cache = EncodeCache::new();
        for i in 0..CACHE_CAPACITY {
            cache.insert(format!("t{i}"), vec![0.0]);
        }
        assert!(cache.get("t0").is_some());
        cache.insert("overflow".to_string(), vec![1.0]);
        assert!(cache.get("t0").is_none());
        assert!(cache.get("overflow").is_some());
    }
}
