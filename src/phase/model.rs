//! Candle sequence model for phase scoring
//!
//! Architecture:
//! - Bidirectional LSTM over the normalized angle window
//! - Attention pooling over time
//! - GRU memory over one-hot encoded recent committed phases
//! - MLP head → softmax over the five phases
//!
//! Weights are stored as a bincode bundle of named tensors, the same layout
//! `save_bundle` writes from a `VarMap`.

use super::label::{PhaseLabel, PHASE_COUNT};
use super::scoring::{PhaseDistribution, PhaseScorer, ScorerInput};
use crate::error::{ModelError, ScorerError};
use crate::pose::ANGLE_COUNT;
use candle_core::{DType, Device, Tensor, D};
use candle_nn::{gru, linear, lstm, GRUConfig, LSTMConfig, Linear, Module, VarBuilder, VarMap, GRU, LSTM, RNN};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fs;
use std::path::Path;
use std::sync::Arc;
use tracing::info;

/// Angles are fed to the network scaled into 0..1
const ANGLE_SCALE: f32 = 180.0;

/// Model dimensions
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SequenceConfig {
    pub input_size: usize,
    pub hidden_size: usize,
    pub memory_size: usize,
    pub head_size: usize,
    /// Committed phases fed to the memory branch
    pub memory_len: usize,
}

impl Default for SequenceConfig {
    fn default() -> Self {
        SequenceConfig {
            input_size: ANGLE_COUNT,
            hidden_size: 32,
            memory_size: 16,
            head_size: 32,
            memory_len: 5,
        }
    }
}

#[derive(Serialize, Deserialize)]
struct TensorData {
    name: String,
    shape: Vec<usize>,
    data: Vec<f32>,
}

#[derive(Serialize, Deserialize)]
struct ModelBundle {
    config: SequenceConfig,
    tensors: Vec<TensorData>,
}

pub struct SequenceModel {
    config: SequenceConfig,
    device: Device,
    forward_lstm: LSTM,
    backward_lstm: LSTM,
    attention: Linear,
    memory: GRU,
    hidden: Linear,
    output: Linear,
}

impl SequenceModel {
    pub fn new(config: SequenceConfig, vb: VarBuilder) -> candle_core::Result<Self> {
        let h = config.hidden_size;
        let forward_lstm = lstm(config.input_size, h, LSTMConfig::default(), vb.pp("lstm_fwd"))?;
        let backward_lstm = lstm(config.input_size, h, LSTMConfig::default(), vb.pp("lstm_bwd"))?;
        let attention = linear(2 * h, 1, vb.pp("attention"))?;
        let memory = gru(PHASE_COUNT, config.memory_size, GRUConfig::default(), vb.pp("memory"))?;
        let hidden = linear(2 * h + config.memory_size, config.head_size, vb.pp("hidden"))?;
        let output = linear(config.head_size, PHASE_COUNT, vb.pp("output"))?;

        Ok(SequenceModel {
            config,
            device: vb.device().clone(),
            forward_lstm,
            backward_lstm,
            attention,
            memory,
            hidden,
            output,
        })
    }

    /// Load from a bincode bundle
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ModelError> {
        let path = path.as_ref();
        let bytes = fs::read(path)?;
        let bundle: ModelBundle = bincode::deserialize(&bytes)?;
        let device = Device::Cpu;

        let mut tensors = HashMap::with_capacity(bundle.tensors.len());
        for entry in bundle.tensors {
            let tensor = Tensor::from_vec(entry.data, entry.shape, &device)?;
            tensors.insert(entry.name, tensor);
        }

        let vb = VarBuilder::from_tensors(tensors, DType::F32, &device);
        let model = SequenceModel::new(bundle.config, vb)?;
        info!(
            "Loaded sequence model from {} ({} bytes)",
            path.display(),
            bytes.len()
        );
        Ok(model)
    }

    pub fn config(&self) -> &SequenceConfig {
        &self.config
    }

    /// Phase probabilities for one window
    pub fn forward(
        &self,
        window: &[[f32; ANGLE_COUNT]],
        history: &[PhaseLabel],
    ) -> Result<Vec<f32>, ScorerError> {
        let steps = window.len();
        if steps == 0 {
            return Err(ScorerError::EmptyWindow);
        }

        // (1, T, 8)
        let flat: Vec<f32> = window
            .iter()
            .flat_map(|frame| frame.iter().map(|a| a / ANGLE_SCALE))
            .collect();
        let x = Tensor::from_vec(flat, (1, steps, ANGLE_COUNT), &self.device)?;

        let reversed: Vec<u32> = (0..steps as u32).rev().collect();
        let reversed = Tensor::from_vec(reversed, steps, &self.device)?;

        let fwd_states = self.forward_lstm.seq(&x)?;
        let fwd = self.forward_lstm.states_to_tensor(&fwd_states)?;
        let bwd_states = self.backward_lstm.seq(&x.index_select(&reversed, 1)?)?;
        let bwd = self
            .backward_lstm
            .states_to_tensor(&bwd_states)?
            .index_select(&reversed, 1)?;

        // (1, T, 2h) → attention weights over T → (1, 2h)
        let encoded = Tensor::cat(&[&fwd, &bwd], 2)?;
        let weights = candle_nn::ops::softmax(&self.attention.forward(&encoded)?, 1)?;
        let pooled = encoded.broadcast_mul(&weights)?.sum(1)?;

        let memory = self.memory_state(history)?;
        let features = Tensor::cat(&[&pooled, &memory], 1)?;

        let hidden = self.hidden.forward(&features)?.relu()?;
        let logits = self.output.forward(&hidden)?;
        let probs = candle_nn::ops::softmax(&logits, D::Minus1)?
            .squeeze(0)?
            .to_vec1::<f32>()?;
        Ok(probs)
    }

    /// Final GRU state over the most recent committed phases, zeros without history
    fn memory_state(&self, history: &[PhaseLabel]) -> Result<Tensor, ScorerError> {
        let recent = &history[history.len().saturating_sub(self.config.memory_len)..];
        if recent.is_empty() {
            return Ok(Tensor::zeros(
                (1, self.config.memory_size),
                DType::F32,
                &self.device,
            )?);
        }

        let mut one_hot = vec![0.0_f32; recent.len() * PHASE_COUNT];
        for (i, label) in recent.iter().enumerate() {
            one_hot[i * PHASE_COUNT + label.index()] = 1.0;
        }
        let labels = Tensor::from_vec(one_hot, (1, recent.len(), PHASE_COUNT), &self.device)?;

        let states = self.memory.seq(&labels)?;
        match states.last() {
            Some(state) => Ok(state.h().clone()),
            None => Ok(Tensor::zeros(
                (1, self.config.memory_size),
                DType::F32,
                &self.device,
            )?),
        }
    }
}

/// Write every variable of `varmap` as a bundle `SequenceModel::load` reads
pub fn save_bundle(
    path: impl AsRef<Path>,
    config: &SequenceConfig,
    varmap: &VarMap,
) -> Result<(), ModelError> {
    let mut tensors = Vec::new();
    {
        let vars = varmap.data().lock().map_err(|_| ModelError::Poisoned)?;
        for (name, var) in vars.iter() {
            tensors.push(TensorData {
                name: name.clone(),
                shape: var.shape().dims().to_vec(),
                data: var.flatten_all()?.to_vec1::<f32>()?,
            });
        }
    }
    tensors.sort_by(|a, b| a.name.cmp(&b.name));

    let bundle = ModelBundle {
        config: config.clone(),
        tensors,
    };
    fs::write(path, bincode::serialize(&bundle)?)?;
    Ok(())
}

/// `PhaseScorer` backed by a shared `SequenceModel`
#[derive(Clone)]
pub struct SequenceScorer {
    model: Arc<SequenceModel>,
}

impl SequenceScorer {
    pub fn new(model: Arc<SequenceModel>) -> Self {
        SequenceScorer { model }
    }
}

impl PhaseScorer for SequenceScorer {
    fn name(&self) -> &str {
        "sequence"
    }

    fn score(&mut self, input: &ScorerInput<'_>) -> Result<PhaseDistribution, ScorerError> {
        let probs = self.model.forward(input.angles, input.history)?;
        PhaseDistribution::from_slice(&probs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::phase::MotionFeatures;

    fn random_model() -> (SequenceModel, VarMap) {
        let varmap = VarMap::new();
        let vb = VarBuilder::from_varmap(&varmap, DType::F32, &Device::Cpu);
        let model = SequenceModel::new(SequenceConfig::default(), vb).unwrap();
        (model, varmap)
    }

    fn window() -> Vec<[f32; ANGLE_COUNT]> {
        (0..15)
            .map(|i| {
                let mut frame = [170.0; ANGLE_COUNT];
                frame[0] = 160.0 - 4.0 * i as f32;
                frame[1] = 160.0 - 4.0 * i as f32;
                frame
            })
            .collect()
    }

    #[test]
    fn test_forward_is_a_distribution() {
        let (model, _varmap) = random_model();
        let probs = model.forward(&window(), &[]).unwrap();
        assert_eq!(probs.len(), PHASE_COUNT);
        assert!((probs.iter().sum::<f32>() - 1.0).abs() < 1e-4);
        assert!(probs.iter().all(|p| *p >= 0.0));
    }

    #[test]
    fn test_memory_changes_output() {
        let (model, _varmap) = random_model();
        let without = model.forward(&window(), &[]).unwrap();
        let with = model
            .forward(&window(), &[PhaseLabel::Return, PhaseLabel::End])
            .unwrap();
        assert_ne!(without, with);
    }

    #[test]
    fn test_empty_window_is_an_error() {
        let (model, _varmap) = random_model();
        assert!(matches!(
            model.forward(&[], &[]),
            Err(ScorerError::EmptyWindow)
        ));
    }

    #[test]
    fn test_saved_bundle_reloads_same_weights() {
        let (model, varmap) = random_model();
        let path = std::env::temp_dir().join(format!("rep_coach_model_{}.bin", std::process::id()));
        save_bundle(&path, model.config(), &varmap).unwrap();

        let loaded = SequenceModel::load(&path).unwrap();
        let history = [PhaseLabel::Start, PhaseLabel::Quarter];
        let a = model.forward(&window(), &history).unwrap();
        let b = loaded.forward(&window(), &history).unwrap();
        let _ = fs::remove_file(&path);

        for (x, y) in a.iter().zip(b.iter()) {
            assert!((x - y).abs() < 1e-5);
        }
    }

    #[test]
    fn test_missing_file_is_io_error() {
        let result = SequenceModel::load("/nonexistent/phase_model.bin");
        assert!(matches!(result, Err(ModelError::Io(_))));
    }

    #[test]
    fn test_scorer_wraps_model() {
        let (model, _varmap) = random_model();
        let mut scorer = SequenceScorer::new(Arc::new(model));
        let angles = window();
        let motion = MotionFeatures::default();
        let input = ScorerInput {
            angles: &angles,
            motion: &motion,
            history: &[PhaseLabel::Start],
            current: PhaseLabel::Start,
        };
        let dist = scorer.score(&input).unwrap();
        assert!((dist.probs().iter().sum::<f32>() - 1.0).abs() < 1e-4);
        assert_eq!(scorer.name(), "sequence");
    }
}
