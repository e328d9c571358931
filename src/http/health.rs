use actix_web::{HttpResponse, Responder};
use serde_json::json;

pub(crate) async fn health_check() -> impl Responder {
    HttpResponse::Ok().json(json!({
        "status": "online",
        "message": "Music gateway is running",
        "version": crate::VERSION,
    }))
}
