use std::sync::Arc;

use actix_web::{get, post, web, HttpResponse};
use serde::Serialize;

use crate::error::ApiError;
use crate::inference::{InferenceError, PricePredictor};
use crate::models::{DeviceSpecs, PredictionRecord};

#[derive(Serialize)]
struct HealthStatus {
    status: &'static str,
}

#[get("/health")]
pub async fn health() -> HttpResponse {
    HttpResponse::Ok().json(HealthStatus { status: "ok" })
}

/// Predicts the price of a device from its specifications.
///
/// Responds with a one-element array holding the input fields, `device_id`
/// and `predicted_price`.
#[post("/predict/{device_id}")]
pub async fn predict_price(
    model: web::Data<Arc<dyn PricePredictor>>,
    device_id: web::Path<i64>,
    specs: web::Json<DeviceSpecs>,
) -> Result<HttpResponse, ApiError> {
    let device_id = device_id.into_inner();
    let specs = specs.into_inner();
    let row = specs.to_row(device_id);

    log::info!("Prediction requested for device {}\n{}", device_id, row.to_markdown());

    let predictor = model.get_ref().clone();
    let outcome = match web::block(move || predictor.predict(&row)).await {
        Ok(result) => result.and_then(finite_price).map_err(ApiError::from),
        Err(e) => Err(ApiError::Inference(e.to_string())),
    };

    match outcome {
        Ok(price) => {
            log::info!("Device {}: predicted_price={}", device_id, price);
            let record = PredictionRecord::new(device_id, specs, price);
            Ok(HttpResponse::Ok().json(vec![record]))
        }
        Err(e) => {
            log::error!("{}", e);
            Err(e)
        }
    }
}

fn finite_price(price: f64) -> Result<f64, InferenceError> {
    if price.is_finite() {
        Ok(price)
    } else {
        Err(InferenceError::NonFinite(price))
    }
}

async fn not_found() -> Result<HttpResponse, ApiError> {
    Err(ApiError::NotFound)
}

pub fn json_config(limit: usize) -> web::JsonConfig {
    web::JsonConfig::default()
        .limit(limit)
        .content_type_required(false)
        .error_handler(|err, _req| {
            log::warn!("Rejected request body: {}", err);
            ApiError::Validation(err.to_string()).into()
        })
}

pub fn path_config() -> web::PathConfig {
    web::PathConfig::default().error_handler(|err, _req| {
        log::warn!("Rejected path: {}", err);
        ApiError::Validation(err.to_string()).into()
    })
}

/// Registers the endpoints and the extractor configs that turn malformed
/// input into 422 responses.
pub fn configure(json_limit: usize) -> impl Fn(&mut web::ServiceConfig) + Clone {
    move |cfg: &mut web::ServiceConfig| {
        cfg.app_data(json_config(json_limit))
            .app_data(path_config())
            .service(health)
            .service(predict_price)
            .default_service(web::route().to(not_found));
    }
}
