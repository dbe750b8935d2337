//! HTTP/WS route handlers, grounded on the teacher's
//! `crates/server/src/hosting/handlers.rs` (`actix_ws::handle`,
//! `map_into_left_body`/`map_into_right_body` to unify the success/error
//! response bodies) and spec.md §6's HTTP surface.

use std::collections::HashMap;

use actix_web::{web, HttpRequest, HttpResponse, Responder};
use tanks_core::config;
use tanks_engine::entities::TankId;

use crate::bridge;
use crate::handle::ArenaHandle;

pub async fn health(arena: web::Data<ArenaHandle>) -> impl Responder {
    match arena.health().await {
        Ok(snapshot) => HttpResponse::Ok().json(snapshot),
        Err(e) => HttpResponse::ServiceUnavailable().body(e.to_string()),
    }
}

pub async fn terrain_maps() -> impl Responder {
    HttpResponse::Ok().json(config::terrain_maps())
}

pub async fn terrain_map(path: web::Path<String>) -> impl Responder {
    match config::terrain_map_by_id(&path.into_inner()) {
        Some(map) => HttpResponse::Ok().json(map),
        None => HttpResponse::NotFound().finish(),
    }
}

pub async fn ws_connect(arena: web::Data<ArenaHandle>, query: web::Query<HashMap<String, String>>, req: HttpRequest, body: web::Payload) -> impl Responder {
    let requested_id = query.get("tankId").and_then(|raw| uuid::Uuid::parse_str(raw).ok()).map(TankId::from_uuid);

    match actix_ws::handle(&req, body) {
        Ok((response, session, stream)) => {
            actix_web::rt::spawn(bridge::bridge(arena.get_ref().clone(), session, stream, requested_id));
            response.map_into_left_body()
        }
        Err(e) => HttpResponse::InternalServerError().body(e.to_string()).map_into_right_body(),
    }
}
