mod chain;
mod health;
mod ledger;
pub mod models;
mod stats;
mod tx;

use actix_web::web::ServiceConfig;

pub use models::AppState;

pub fn init_routes(cfg: &mut ServiceConfig) {
    cfg.service(health::health_check)
        .service(chain::get_chain)
        .service(chain::validate_chain)
        .service(chain::inform_block)
        .service(tx::post_transaction)
        .service(tx::get_pending)
        .service(ledger::get_history)
        .service(ledger::get_balances)
        .service(stats::get_stats);
}
