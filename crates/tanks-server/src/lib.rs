//! Session & broadcast layer: the `Arena` tick/broadcast loop plus the
//! `actix-web`/`actix-ws` transport, spec.md §4.8/§5/§6. Grounded on the
//! teacher's `crates/server/src/lib.rs` `run()`.

pub mod arena;
pub mod bridge;
pub mod broadcast;
pub mod command;
pub mod handle;
pub mod routes;
pub mod table;

pub use arena::{Arena, HealthSnapshot};
pub use handle::ArenaHandle;

use actix_cors::Cors;
use actix_web::middleware::Logger;
use actix_web::{web, App, HttpServer};

/// Starts the arena task and the HTTP/WS server, and blocks until a
/// shutdown signal arrives. Mirrors the teacher's `run()` shape
/// (`HttpServer::new(...).workers(6).bind(...).run().await`), with the
/// addition of the coordinated shutdown spec.md §5 asks for: stop accepting
/// new connections, let the arena run one last tick and broadcast, then
/// return once every client socket has closed.
pub async fn run() -> std::io::Result<()> {
    let terrain_map_id = std::env::var("TANKS_TERRAIN_MAP").unwrap_or_else(|_| "default".to_string());
    let bind_addr = std::env::var("BIND_ADDR").unwrap_or_else(|_| "0.0.0.0:8080".to_string());

    let (command_tx, command_rx) = tokio::sync::mpsc::unbounded_channel();
    let (shutdown_tx, shutdown_rx) = tokio::sync::watch::channel(false);
    let arena_task = tokio::spawn(Arena::run(terrain_map_id, command_rx, shutdown_rx));

    let handle = web::Data::new(ArenaHandle::new(command_tx));
    log::info!("starting tank arena server on {}", bind_addr);

    let server = HttpServer::new(move || {
        App::new()
            .wrap(Logger::new("%r %s %Ts"))
            .wrap(Cors::default().allow_any_origin().allow_any_method().allow_any_header())
            .app_data(handle.clone())
            .route("/health", web::get().to(routes::health))
            .route("/ws", web::get().to(routes::ws_connect))
            .service(
                web::scope("/api")
                    .route("/terrain-maps", web::get().to(routes::terrain_maps))
                    .route("/terrain-maps/{id}", web::get().to(routes::terrain_map)),
            )
    })
    .workers(6)
    .disable_signals()
    .bind(bind_addr)?
    .run();

    let server_handle = server.handle();
    let http_task = tokio::spawn(server);

    tanks_core::runtime::wait_for_shutdown_signal().await;

    log::info!("stopping http server, no new connections accepted");
    server_handle.stop(true).await;
    let _ = http_task.await;

    let _ = shutdown_tx.send(true);
    let _ = arena_task.await;
    Ok(())
}
