use actix_web::middleware::Logger;
use actix_web::{web, App, HttpServer};
use anyhow::Context;
use log::{error, info};

use device_price_api::{load_artifact, routes, ServerConfig};

#[actix_web::main]
async fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .format_timestamp_millis()
        .format_module_path(false)
        .init();

    info!("🚀 Starting device price prediction API");

    let config = ServerConfig::from_env();

    let model = match load_artifact(&config.artifact_path) {
        Ok(model) => {
            info!("✅ Pipeline loaded from {}", config.artifact_path.display());
            model
        }
        Err(e) => {
            error!("❌ {}", e);
            return Err(e).context("cannot serve without the inference artifact");
        }
    };

    let model_data = web::Data::new(model);
    let bind_address = config.bind_address();
    let json_limit = config.json_limit;

    info!("Listening on http://{}", bind_address);
    info!("Workers: {}", config.workers);
    info!("Endpoints:");
    info!("   GET  /health                - Health check");
    info!("   POST /predict/{{device_id}}   - Price prediction");

    HttpServer::new(move || {
        App::new()
            .wrap(Logger::default())
            .app_data(model_data.clone())
            .configure(routes::configure(json_limit))
    })
    .workers(config.workers)
    .bind(&bind_address)
    .with_context(|| format!("failed to bind {}", bind_address))?
    .run()
    .await
    .context("server terminated with an error")
}
