use actix_web::{HttpResponse, Responder, get, web};

use super::models::{AppState, StatsResponse};

#[get("/stats")]
pub async fn get_stats(state: web::Data<AppState>) -> impl Responder {
    let engine = &state.engine;
    let peers = engine
        .nodes()
        .iter()
        .filter(|n| *n != engine.self_id())
        .cloned()
        .collect();

    HttpResponse::Ok().json(StatsResponse {
        node_id: engine.self_id().to_string(),
        height: engine.height(),
        round: engine.round(),
        expected_miner: engine.expected_miner(),
        pool_size: engine.pool_size(),
        peers,
    })
}
