//! Mean-pooled sentence embeddings from a sentence-transformers ONNX export.
//!
//! The model directory must hold `model.onnx` and `tokenizer.json`
//! (all-MiniLM-L6-v2 and its relatives work unchanged).

use std::path::Path;

use anyhow::{anyhow, ensure, Context};
use ort::session::Session;
use ort::value::{Tensor, ValueType};
use tokenizers::{PaddingParams, Tokenizer, TruncationParams};
use tracing::info;

/// Token limit for one segment; longer segments are truncated.
const MAX_TOKENS: usize = 256;

/// Fallback when the model's output shape leaves the hidden size symbolic.
const DEFAULT_DIM: usize = 384;

pub struct Embedder {
    session: Session,
    tokenizer: Tokenizer,
    dim: usize,
}

/// Token ids, mask and type ids for a padded batch, laid out row-major.
struct Encoded {
    rows: usize,
    cols: usize,
    ids: Vec<i64>,
    mask: Vec<i64>,
    types: Vec<i64>,
}

impl Embedder {
    pub fn load(model_dir: &Path) -> anyhow::Result<Self> {
        let model_path = model_dir.join("model.onnx");
        let tokenizer_path = model_dir.join("tokenizer.json");
        ensure!(model_path.is_file(), "no model.onnx in {}", model_dir.display());
        ensure!(
            tokenizer_path.is_file(),
            "no tokenizer.json in {}",
            model_dir.display()
        );

        let session = Session::builder()?
            .commit_from_file(&model_path)
            .with_context(|| format!("load {}", model_path.display()))?;
        let dim = match session.outputs()[0].dtype() {
            ValueType::Tensor { shape, .. } => shape
                .last()
                .and_then(|&d| usize::try_from(d).ok())
                .filter(|&d| d > 0)
                .unwrap_or(DEFAULT_DIM),
            _ => DEFAULT_DIM,
        };

        let mut tokenizer =
            Tokenizer::from_file(&tokenizer_path).map_err(|e| anyhow!("load tokenizer: {e}"))?;
        tokenizer
            .with_truncation(Some(TruncationParams {
                max_length: MAX_TOKENS,
                ..Default::default()
            }))
            .map_err(|e| anyhow!("configure truncation: {e}"))?;
        tokenizer.with_padding(Some(PaddingParams::default()));

        info!(dim, model = %model_path.display(), "embedding model ready");
        Ok(Self {
            session,
            tokenizer,
            dim,
        })
    }

    pub fn dim(&self) -> usize {
        self.dim
    }

    /// One unit-length vector per input text.
    pub fn embed_batch(&mut self, texts: &[&str]) -> anyhow::Result<Vec<Vec<f32>>> {
        if texts.is_empty() {
            return Ok(Vec::new());
        }
        let encoded = self.encode(texts)?;
        let shape = [encoded.rows as i64, encoded.cols as i64];

        let outputs = self.session.run(ort::inputs![
            "input_ids" => Tensor::from_array((shape, encoded.ids.clone().into_boxed_slice()))?,
            "attention_mask" => Tensor::from_array((shape, encoded.mask.clone().into_boxed_slice()))?,
            "token_type_ids" => Tensor::from_array((shape, encoded.types.clone().into_boxed_slice()))?,
        ])?;

        // [batch, seq, dim]
        let (out_shape, hidden) = outputs[0].try_extract_tensor::<f32>()?;
        ensure!(
            out_shape.len() == 3
                && out_shape[0] as usize == encoded.rows
                && out_shape[2] as usize == self.dim,
            "unexpected output shape {out_shape:?}"
        );
        let seq = out_shape[1] as usize;

        Ok((0..encoded.rows)
            .map(|row| {
                let mask = &encoded.mask[row * encoded.cols..][..seq.min(encoded.cols)];
                let states = &hidden[row * seq * self.dim..][..seq * self.dim];
                mean_pool(states, mask, self.dim)
            })
            .collect())
    }

    pub fn embed(&mut self, text: &str) -> anyhow::Result<Vec<f32>> {
        self.embed_batch(&[text])?
            .pop()
            .ok_or_else(|| anyhow!("model returned no embedding"))
    }

    fn encode(&self, texts: &[&str]) -> anyhow::Result<Encoded> {
        let encodings = self
            .tokenizer
            .encode_batch(texts.to_vec(), true)
            .map_err(|e| anyhow!("tokenize: {e}"))?;
        let rows = encodings.len();
        let cols = encodings.iter().map(|e| e.len()).max().unwrap_or(0);

        let mut out = Encoded {
            rows,
            cols,
            ids: vec![0; rows * cols],
            mask: vec![0; rows * cols],
            types: vec![0; rows * cols],
        };
        for (row, enc) in encodings.iter().enumerate() {
            let base = row * cols;
            for (j, ((&id, &m), &t)) in enc
                .get_ids()
                .iter()
                .zip(enc.get_attention_mask())
                .zip(enc.get_type_ids())
                .enumerate()
            {
                out.ids[base + j] = i64::from(id);
                out.mask[base + j] = i64::from(m);
                out.types[base + j] = i64::from(t);
            }
        }
        Ok(out)
    }
}

/// Average the token states where `mask` is set, then scale to unit length.
fn mean_pool(states: &[f32], mask: &[i64], dim: usize) -> Vec<f32> {
    let mut pooled = vec![0.0f32; dim];
    let mut tokens = 0.0f32;
    for (token, &m) in states.chunks_exact(dim).zip(mask) {
        if m > 0 {
            for (p, s) in pooled.iter_mut().zip(token) {
                *p += s;
            }
            tokens += 1.0;
        }
    }
    if tokens > 0.0 {
        pooled.iter_mut().for_each(|p| *p /= tokens);
    }
    let norm = pooled.iter().map(|x| x * x).sum::<f32>().sqrt();
    if norm > 0.0 {
        pooled.iter_mut().for_each(|p| *p /= norm);
    }
    pooled
}

/// Dot product of two unit vectors.
pub(crate) fn cosine(a: &[f32], b: &[f32]) -> f32 {
    a.iter().zip(b).map(|(x, y)| x * y).sum()
}
