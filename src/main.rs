use clap::Parser;
use tracing_subscriber::filter::LevelFilter;
use tracing_subscriber::EnvFilter;

use epuck_gesture_runtime::config::ControllerConfig;
use epuck_gesture_runtime::keyboard::CrlfWriter;

#[tokio::main]
async fn main() {
    let config = ControllerConfig::parse();

    // Setup logging (set RUST_LOG=debug for per-tick detail).
    // Logs go to stderr with CRLF endings since the keyboard puts the tty in raw mode
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive(LevelFilter::INFO.into()))
        .with_writer(|| CrlfWriter::new(std::io::stderr()))
        .init();

    if let Err(e) = epuck_gesture_runtime::runtime::run(config).await {
        eprintln!("Runtime error: {}", e);
        std::process::exit(1);
    }
}
