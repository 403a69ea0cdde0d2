/// Flowscript CLI
///
/// Parses flow scripts and executes them against the built-in simulator.
/// `RUST_LOG` controls tracing output; a `.env` file is honored if present.
use flowscript::cli;

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt::init();

    if let Err(e) = cli::run_cli().await {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}
