use actix_web::{HttpResponse, Responder, get, post, web};
use log::{info, warn};

use super::models::{AppState, ChainResponse, InformResponse, ValidateResponse};
use crate::blockchain::EncodedBlock;

/// Get the full blockchain.
#[get("/chain")]
pub async fn get_chain(state: web::Data<AppState>) -> impl Responder {
    let chain = state.engine.chain();
    HttpResponse::Ok().json(ChainResponse {
        length: chain.len(),
        chain,
    })
}

/// Validate the whole chain.
#[get("/validate")]
pub async fn validate_chain(state: web::Data<AppState>) -> impl Responder {
    HttpResponse::Ok().json(ValidateResponse {
        valid: state.engine.is_valid_chain(),
        length: state.engine.height(),
    })
}

/// Peer broadcast endpoint: accept and commit a block mined elsewhere.
#[post("/inform/block")]
pub async fn inform_block(
    state: web::Data<AppState>,
    body: web::Json<EncodedBlock>,
) -> impl Responder {
    let encoded = body.into_inner();
    let number = encoded.number;
    let miner = encoded.miner.clone();

    match state.engine.receive_block(encoded) {
        Ok(block) => {
            info!("POST /inform/block - accepted {}", block);
            HttpResponse::Ok().json(InformResponse {
                accepted: true,
                number: block.number(),
                hash: block.hash().to_string(),
            })
        }
        Err(reason) => {
            warn!(
                "POST /inform/block - rejected #{} from {}: {}",
                number, miner, reason
            );
            HttpResponse::BadRequest().body(reason.to_string())
        }
    }
}
