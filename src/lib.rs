//! Serving wrapper around a pre-trained device price regression pipeline.
//!
//! The pipeline is loaded once at startup ([`inference::load_artifact`]) and
//! shared read-only with the `POST /predict/{device_id}` handler.

pub mod config;
pub mod error;
pub mod inference;
pub mod models;
pub mod routes;

pub use config::ServerConfig;
pub use error::ApiError;
pub use inference::{load_artifact, InferenceError, OnnxPipeline, PricePredictor};
pub use models::{DeviceSpecs, FeatureRow, Flag, PredictionRecord};
