//! ONNX Runtime embedding provider.
//!
//! Loads a sentence-embedding model (e.g. all-MiniLM-L6-v2 exported to ONNX)
//! through the `ort` crate, with the model's own `tokenizer.json` from the
//! same directory. Output token states are mean-pooled under the attention
//! mask and L2-normalized.

use std::path::Path;
use std::sync::Mutex;

use ort::session::Session;
use ort::value::Tensor;
use ragrank_core::errors::{EmbeddingError, RagResult};
use ragrank_core::traits::IEmbeddingProvider;
use tokenizers::{Tokenizer, TruncationParams};
use tracing::debug;

use crate::vector_ops::l2_normalize;

/// Longest token sequence fed to the model, special tokens included.
const MAX_SEQUENCE_LEN: usize = 256;
const TOKENIZER_FILE: &str = "tokenizer.json";

/// Model inputs for one text.
#[derive(Debug, Clone, PartialEq)]
struct Encoded {
    input_ids: Vec<i64>,
    attention_mask: Vec<i64>,
    token_type_ids: Vec<i64>,
}

/// ONNX-based embedding provider.
pub struct OnnxProvider {
    /// `Session::run` needs `&mut`, the trait hands out `&self`.
    session: Mutex<Session>,
    tokenizer: Tokenizer,
    dimensions: usize,
    model_name: String,
}

impl OnnxProvider {
    /// Load an ONNX model and the `tokenizer.json` next to it. Called once
    /// per model by the registry.
    ///
    /// # Errors
    /// Returns `EmbeddingError::ModelLoadFailed` if the model or its
    /// tokenizer cannot be loaded.
    pub fn load(model_path: &str, dimensions: usize) -> RagResult<Self> {
        let path = Path::new(model_path);
        let load_failed = |reason: String| EmbeddingError::ModelLoadFailed {
            path: model_path.to_string(),
            reason,
        };

        if !path.exists() {
            return Err(load_failed("model file not found".to_string()).into());
        }
        let tokenizer = load_tokenizer(&path.with_file_name(TOKENIZER_FILE))?;

        let session = Session::builder()
            .map_err(|e| load_failed(e.to_string()))?
            .with_intra_threads(2)
            .map_err(|e| load_failed(e.to_string()))?
            .commit_from_file(model_path)
            .map_err(|e| load_failed(e.to_string()))?;

        let model_name = path
            .file_stem()
            .and_then(|s| s.to_str())
            .unwrap_or("onnx-model")
            .to_string();

        debug!(model = %model_name, dims = dimensions, "ONNX model loaded");

        Ok(Self {
            session: Mutex::new(session),
            tokenizer,
            dimensions,
            model_name,
        })
    }

    fn encode(&self, text: &str) -> RagResult<Encoded> {
        let encoding = self
            .tokenizer
            .encode(text, true)
            .map_err(|e| EmbeddingError::InferenceFailed {
                reason: format!("tokenization failed: {e}"),
            })?;
        let widen = |xs: &[u32]| xs.iter().map(|&x| x as i64).collect::<Vec<i64>>();
        Ok(Encoded {
            input_ids: widen(encoding.get_ids()),
            attention_mask: widen(encoding.get_attention_mask()),
            token_type_ids: widen(encoding.get_type_ids()),
        })
    }

    fn infer(&self, text: &str) -> RagResult<Vec<f32>> {
        let encoded = self.encode(text)?;
        let seq_len = encoded.input_ids.len();
        let inference_failed = |reason: String| EmbeddingError::InferenceFailed { reason };
        let shape = vec![1i64, seq_len as i64];

        let ids = Tensor::from_array((shape.clone(), encoded.input_ids))
            .map_err(|e| inference_failed(format!("tensor creation error: {e}")))?;
        let mask = Tensor::from_array((shape.clone(), encoded.attention_mask.clone()))
            .map_err(|e| inference_failed(format!("tensor creation error: {e}")))?;
        let types = Tensor::from_array((shape, encoded.token_type_ids))
            .map_err(|e| inference_failed(format!("tensor creation error: {e}")))?;

        let mut session = self
            .session
            .lock()
            .map_err(|e| inference_failed(format!("session lock poisoned: {e}")))?;

        let outputs = session
            .run(ort::inputs![ids, mask, types])
            .map_err(|e| inference_failed(e.to_string()))?;

        let (_name, output) = outputs
            .iter()
            .next()
            .ok_or_else(|| inference_failed("no output tensor".to_string()))?;

        let (shape, data) = output
            .try_extract_tensor::<f32>()
            .map_err(|e| inference_failed(format!("tensor extraction failed: {e}")))?;

        let mut embedding = match shape.len() {
            // [batch=1, seq, dims]
            3 => mean_pool(data, shape[2] as usize, &encoded.attention_mask),
            // [batch=1, dims]: already pooled.
            2 => data[..shape[1] as usize].to_vec(),
            _ => {
                return Err(inference_failed(format!("unexpected output shape: {shape:?}")).into());
            }
        };

        l2_normalize(&mut embedding);
        embedding.resize(self.dimensions, 0.0);
        Ok(embedding)
    }
}

/// Read `tokenizer.json`, truncating to `MAX_SEQUENCE_LEN` and never padding.
fn load_tokenizer(path: &Path) -> RagResult<Tokenizer> {
    let load_failed = |reason: String| EmbeddingError::ModelLoadFailed {
        path: path.display().to_string(),
        reason,
    };
    if !path.exists() {
        return Err(load_failed(format!("{TOKENIZER_FILE} not found next to the model")).into());
    }
    let mut tokenizer = Tokenizer::from_file(path).map_err(|e| load_failed(e.to_string()))?;
    tokenizer
        .with_truncation(Some(TruncationParams {
            max_length: MAX_SEQUENCE_LEN,
            ..TruncationParams::default()
        }))
        .map_err(|e| load_failed(e.to_string()))?;
    tokenizer.with_padding(None);
    Ok(tokenizer)
}

/// Mean of the token states whose mask is set. `states` is `[seq, dims]`
/// row-major.
fn mean_pool(states: &[f32], dims: usize, mask: &[i64]) -> Vec<f32> {
    let mut pooled = vec![0.0f32; dims];
    if dims == 0 {
        return pooled;
    }
    let mut kept = 0usize;
    for (token, &m) in states.chunks_exact(dims).zip(mask) {
        if m == 0 {
            continue;
        }
        kept += 1;
        for (acc, v) in pooled.iter_mut().zip(token) {
            *acc += v;
        }
    }
    for v in &mut pooled {
        *v /= kept.max(1) as f32;
    }
    pooled
}

impl IEmbeddingProvider for OnnxProvider {
    fn embed(&self, text: &str) -> RagResult<Vec<f32>> {
        self.infer(text)
    }

    fn embed_batch(&self, texts: &[String]) -> RagResult<Vec<Vec<f32>>> {
        texts.iter().map(|t| self.infer(t)).collect()
    }

    fn dimensions(&self) -> usize {
        self.dimensions
    }

    fn name(&self) -> &str {
        &self.model_name
    }

    fn is_available(&self) -> bool {
        true
    }
}
