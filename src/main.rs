
use eatsgate::config::{load_config, print_schema};
use eatsgate::startup;
use eatsgate::utils::logger::init_logging;
use tracing::error;

#[tokio::main]
async fn main() {
    if std::env::args().any(|arg| arg == "--schema") {
        print_schema();
        return;
    }

    let config = load_config();
    if let Err(e) = init_logging(&config.logging) {
        eprintln!("Error initialising logging: {}", e);
        std::process::exit(1);
    }

    if let Err(e) = startup::run(config).await {
        error!("eatsgate failed: {}", e);
        std::process::exit(1);
    }
}
