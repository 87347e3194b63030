use actix_web::{HttpResponse, Responder, get, web};

use super::models::{AppState, BalancesResponse, HistoryQuery};

/// Net balance change per block: `[[block_number, delta], ...]`.
#[get("/history")]
pub async fn get_history(
    state: web::Data<AppState>,
    query: web::Query<HistoryQuery>,
) -> impl Responder {
    HttpResponse::Ok().json(state.engine.history(&query.account))
}

#[get("/balances")]
pub async fn get_balances(state: web::Data<AppState>) -> impl Responder {
    HttpResponse::Ok().json(BalancesResponse {
        balances: state.engine.balances(),
    })
}
