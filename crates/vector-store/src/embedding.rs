use crate::error::{Result, VectorStoreError};
use ndarray::{Array2, Axis};
use ort::session::Session;
use ort::value::Tensor;
use std::path::Path;
use std::sync::Mutex;
use tokenizers::{PaddingDirection, PaddingParams, PaddingStrategy, Tokenizer};

/// Converts text to a fixed-length embedding vector. Implemented by
/// `OrtEmbeddingProvider` in production and by a deterministic stub in
/// tests that don't want to load a real model.
pub trait EmbeddingProvider: Send + Sync {
    fn embed(&self, text: &str) -> Result<Vec<f32>>;
    fn dimensions(&self) -> usize;
}

/// ONNX Runtime embedding provider. Loads a BERT-family sentence encoder
/// (tokenizer.json + model.onnx) and returns its L2-normalized CLS-token
/// embedding.
pub struct OrtEmbeddingProvider {
    session: Mutex<Session>,
    tokenizer: Tokenizer,
    dimensions: usize,
}

impl OrtEmbeddingProvider {
    pub fn load(model_path: impl AsRef<Path>, tokenizer_path: impl AsRef<Path>, dimensions: usize) -> Result<Self> {
        let mut tokenizer = Tokenizer::from_file(tokenizer_path.as_ref())
            .map_err(|e| VectorStoreError::Embedding(format!("failed to load tokenizer: {e}")))?;

        tokenizer.with_padding(Some(PaddingParams {
            strategy: PaddingStrategy::BatchLongest,
            direction: PaddingDirection::Right,
            pad_id: 0,
            pad_type_id: 0,
            pad_token: "[PAD]".to_string(),
            pad_to_multiple_of: None,
        }));

        let session = Session::builder()
            .map_err(|e| VectorStoreError::Embedding(format!("failed to create session builder: {e}")))?
            .commit_from_file(model_path.as_ref())
            .map_err(|e| VectorStoreError::Embedding(format!("failed to load model: {e}")))?;

        Ok(Self {
            session: Mutex::new(session),
            tokenizer,
            dimensions,
        })
    }

    fn encode_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
        if texts.is_empty() {
            return Ok(Vec::new());
        }

        let encodings = self
            .tokenizer
            .encode_batch(texts.to_vec(), true)
            .map_err(|e| VectorStoreError::Embedding(format!("tokenization failed: {e}")))?;

        let batch_size = encodings.len();
        let seq_length = encodings[0].len();

        let mut input_ids_vec = Vec::with_capacity(batch_size * seq_length);
        let mut attention_mask_vec = Vec::with_capacity(batch_size * seq_length);
        let mut token_type_ids_vec = Vec::with_capacity(batch_size * seq_length);
        for encoding in &encodings {
            input_ids_vec.extend(encoding.get_ids().iter().map(|&id| id as i64));
            attention_mask_vec.extend(encoding.get_attention_mask().iter().map(|&m| m as i64));
            token_type_ids_vec.extend(encoding.get_type_ids().iter().map(|&t| t as i64));
        }

        let input_ids = Array2::from_shape_vec((batch_size, seq_length), input_ids_vec)
            .map_err(|e| VectorStoreError::Embedding(e.to_string()))?;
        let attention_mask = Array2::from_shape_vec((batch_size, seq_length), attention_mask_vec)
            .map_err(|e| VectorStoreError::Embedding(e.to_string()))?;
        let token_type_ids = Array2::from_shape_vec((batch_size, seq_length), token_type_ids_vec)
            .map_err(|e| VectorStoreError::Embedding(e.to_string()))?;

        let input_ids_tensor =
            Tensor::from_array(input_ids).map_err(|e| VectorStoreError::Embedding(e.to_string()))?;
        let attention_mask_tensor =
            Tensor::from_array(attention_mask).map_err(|e| VectorStoreError::Embedding(e.to_string()))?;
        let token_type_ids_tensor =
            Tensor::from_array(token_type_ids).map_err(|e| VectorStoreError::Embedding(e.to_string()))?;

        let mut session = self
            .session
            .lock()
            .map_err(|_| VectorStoreError::Embedding("embedding session lock poisoned".to_string()))?;
        let outputs = session
            .run(ort::inputs![
                "input_ids" => input_ids_tensor,
                "attention_mask" => attention_mask_tensor,
                "token_type_ids" => token_type_ids_tensor,
            ])
            .map_err(|e| VectorStoreError::Embedding(format!("inference failed: {e}")))?;

        let embeddings_array = outputs["last_hidden_state"]
            .try_extract_array::<f32>()
            .map_err(|e| VectorStoreError::Embedding(format!("failed to extract output: {e}")))?;

        let mut embeddings = Vec::with_capacity(batch_size);
        for i in 0..batch_size {
            let mut cls_embedding: Vec<f32> = embeddings_array
                .index_axis(Axis(0), i)
                .index_axis(Axis(0), 0)
                .to_owned()
                .into_raw_vec_and_offset()
                .0;

            let magnitude: f32 = cls_embedding.iter().map(|x| x * x).sum::<f32>().sqrt();
            if magnitude > 0.0 {
                for val in &mut cls_embedding {
                    *val /= magnitude;
                }
            }
            embeddings.push(cls_embedding);
        }

        Ok(embeddings)
    }
}

impl EmbeddingProvider for OrtEmbeddingProvider {
    fn embed(&self, text: &str) -> Result<Vec<f32>> {
        self.encode_batch(std::slice::from_ref(&text.to_string()))?
            .into_iter()
            .next()
            .ok_or_else(|| VectorStoreError::Embedding("model returned no embedding".to_string()))
    }

    fn dimensions(&self) -> usize {
        self.dimensions
    }
}

#[cfg(any(test, feature = "test-util"))]
pub mod test_support {
    use super::*;

    /// Deterministic, model-free provider for tests: hashes the text into a
    /// fixed-size vector so queries for similar text land close together
    /// without loading an ONNX model.
    pub struct StubEmbeddingProvider {
        pub dimensions: usize,
    }

    impl EmbeddingProvider for StubEmbeddingProvider {
        fn embed(&self, text: &str) -> Result<Vec<f32>> {
            let mut v = vec![0f32; self.dimensions];
            for (i, byte) in text.bytes().enumerate() {
                v[i % self.dimensions] += byte as f32;
            }
            let magnitude: f32 = v.iter().map(|x| x * x).sum::<f32>().sqrt();
            if magnitude > 0.0 {
                for val in &mut v {
                    *val /= magnitude;
                }
            }
            Ok(v)
        }

        fn dimensions(&self) -> usize {
            self.dimensions
        }
    }
}
