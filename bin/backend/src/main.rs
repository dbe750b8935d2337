//! Unified backend binary: combines the HTTP/WS arena server into a single
//! process. Runs on BIND_ADDR (e.g. 0.0.0.0:8080).

#[tokio::main]
async fn main() {
    tanks_core::runtime::init_logging("tanks-server.log", simplelog::LevelFilter::Info);

    if let Err(err) = tanks_server::run().await {
        log::error!("server exited with error: {err}");
        std::process::exit(1);
    }
}
