use std::path::Path;
use std::sync::Arc;

use thiserror::Error;
use tract_onnx::prelude::*;

use crate::models::{FeatureRow, FEATURE_COUNT};

/// Errors raised while loading or running the pipeline.
#[derive(Debug, Error)]
pub enum InferenceError {
    #[error("Failed to load pipeline from {path}: {reason}")]
    Load { path: String, reason: String },
    #[error("X has {actual} features, but the pipeline is expecting {expected} features as input")]
    Shape { expected: usize, actual: usize },
    #[error("{0}")]
    Runtime(String),
    #[error("Pipeline produced no output")]
    EmptyOutput,
    #[error("Pipeline returned a non-finite price: {0}")]
    NonFinite(f64),
}

/// A fitted pipeline mapping one feature row to a price.
pub trait PricePredictor: Send + Sync {
    fn predict(&self, row: &FeatureRow) -> Result<f64, InferenceError>;
}

/// Regression pipeline exported to ONNX, run with tract.
pub struct OnnxPipeline {
    model: SimplePlan<TypedFact, Box<dyn TypedOp>, Graph<TypedFact, Box<dyn TypedOp>>>,
    input_width: usize,
}

impl OnnxPipeline {
    pub fn load<P: AsRef<Path>>(model_path: P) -> Result<Self, InferenceError> {
        let path = model_path.as_ref();
        let load_err = |e: TractError| InferenceError::Load {
            path: path.display().to_string(),
            reason: e.to_string(),
        };

        let model = tract_onnx::onnx()
            .model_for_path(path)
            .map_err(load_err)?
            .with_input_fact(
                0,
                InferenceFact::dt_shape(f32::datum_type(), tvec!(1, FEATURE_COUNT)),
            )
            .map_err(load_err)?
            .into_optimized()
            .map_err(load_err)?
            .into_runnable()
            .map_err(load_err)?;

        log::debug!("Pipeline loaded from {}", path.display());

        Ok(Self {
            model,
            input_width: FEATURE_COUNT,
        })
    }
}

impl PricePredictor for OnnxPipeline {
    fn predict(&self, row: &FeatureRow) -> Result<f64, InferenceError> {
        check_width(self.input_width, row)?;

        let input = Tensor::from_shape(&[1, self.input_width], row.values())
            .map_err(|e| InferenceError::Runtime(e.to_string()))?;
        let outputs = self
            .model
            .run(tvec!(input.into()))
            .map_err(|e| InferenceError::Runtime(e.to_string()))?;

        let output = outputs.first().ok_or(InferenceError::EmptyOutput)?;
        let price = output
            .cast_to::<f64>()
            .map_err(|e| InferenceError::Runtime(e.to_string()))?
            .as_slice::<f64>()
            .map_err(|e| InferenceError::Runtime(e.to_string()))?
            .first()
            .copied()
            .ok_or(InferenceError::EmptyOutput)?;

        Ok(price)
    }
}

fn check_width(expected: usize, row: &FeatureRow) -> Result<(), InferenceError> {
    let actual = row.values().len();
    if actual != expected {
        return Err(InferenceError::Shape { expected, actual });
    }
    Ok(())
}

/// Loads the pipeline artifact. Failure here is fatal for the process.
pub fn load_artifact<P: AsRef<Path>>(path: P) -> Result<Arc<dyn PricePredictor>, InferenceError> {
    let path = path.as_ref();
    if !path.is_file() {
        return Err(InferenceError::Load {
            path: path.display().to_string(),
            reason: "No such file".to_string(),
        });
    }
    let pipeline = OnnxPipeline::load(path)?;
    Ok(Arc::new(pipeline))
}
