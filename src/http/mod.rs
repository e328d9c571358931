mod errors;
mod health;
mod media;

use actix_web::web;

pub(crate) use health::health_check;
pub(crate) use media::{get_suggestions, search_tracks, stream_audio};

pub(crate) fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(web::resource("/").route(web::get().to(health_check)))
        .service(web::resource("/suggestions").route(web::get().to(get_suggestions)))
        .service(web::resource("/search").route(web::get().to(search_tracks)))
        .service(web::resource("/stream").route(web::get().to(stream_audio)));
}
