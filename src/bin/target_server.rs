use backlog_probe::config::load_config;
use backlog_probe::error::report;
use backlog_probe::target_server::TargetServer;

#[tokio::main]
async fn main() {
    backlog_probe::init_logging("info");

    let config = match load_config() {
        Ok(config) => config,
        Err(e) => {
            log::error!("{}", report(&e));
            std::process::exit(1);
        }
    };

    let server = match TargetServer::from_config(&config.server) {
        Ok(server) => server,
        Err(e) => {
            log::error!("Failed to bind port {}: {}", config.server.port, report(&e));
            std::process::exit(1);
        }
    };
    log::info!("Listen backlog is {}", config.server.backlog);

    server.serve().await;
}
