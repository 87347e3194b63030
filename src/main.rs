use actix_web::{App, HttpServer, web};
use dotenvy::dotenv;
use log::info;
use std::sync::Arc;

use rr_ledger::api::{self, AppState};
use rr_ledger::config::NodeConfig;
use rr_ledger::consensus::Engine;
use rr_ledger::network::HttpTransport;

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    let _ = dotenv();
    env_logger::init();

    let config = NodeConfig::from_env().map_err(std::io::Error::other)?;
    let transport = HttpTransport::new(config.peer_host.clone(), config.broadcast_timeout)
        .map_err(std::io::Error::other)?;
    let engine = Arc::new(Engine::new(config.engine_config(), Arc::new(transport)));

    info!(
        "Starting node {} at http://{}:{} (roster {:?})",
        config.node_id, config.host, config.port, config.nodes
    );

    let state = web::Data::new(AppState::new(engine.clone()));
    let server = HttpServer::new(move || {
        App::new()
            .app_data(state.clone())
            .configure(api::init_routes)
    })
    .bind((config.host.as_str(), config.port))?
    .run();

    engine.start();
    let result = server.await;
    engine.shutdown();
    result
}
