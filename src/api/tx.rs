use actix_web::{HttpResponse, Responder, get, post, web};
use log::info;

use super::models::{AppState, NewTxRequest, NewTxResponse};

/// Queue a transfer. Nothing is validated here; the next mining round decides.
#[post("/transactions/new")]
pub async fn post_transaction(
    state: web::Data<AppState>,
    body: web::Json<NewTxRequest>,
) -> impl Responder {
    let req = body.into_inner();
    let tx = state.engine.submit(&req.sender, &req.recipient, req.amount);
    let pool_size = state.engine.pool_size();
    info!("POST /transactions/new - queued {} (pool size {})", tx, pool_size);

    HttpResponse::Ok().json(NewTxResponse {
        message: format!("{tx} will be considered for the next block"),
        pool_size,
    })
}

/// List the pending pool.
#[get("/transactions/pending")]
pub async fn get_pending(state: web::Data<AppState>) -> impl Responder {
    HttpResponse::Ok().json(state.engine.pool())
}
