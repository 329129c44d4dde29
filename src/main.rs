//! # weblist - Entry Point
//! src/main.rs

use weblist::config::Config;
use weblist::logging::init_logging;
use weblist::server::Server;
use weblist::ServerError;

fn main() {
    let config = Config::new();

    if let Err(e) = config.validate() {
        let err = ServerError::Config(e);
        eprintln!("💥 {}", err);
        std::process::exit(err.exit_code());
    }

    init_logging(config.log_format);
    config.print_summary();

    let result = Server::new(config).and_then(Server::run);

    if let Err(e) = result {
        tracing::error!(error = %e, "fatal error");
        eprintln!("💥 Error fatal: {}", e);
        std::process::exit(e.exit_code());
    }
}
