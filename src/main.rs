use clap::Parser;
use grip::core::config;
use grip::tui;
use simplelog::{ConfigBuilder, LevelFilter, WriteLogger};
use std::fs::File;

#[derive(Parser)]
#[command(name = "grip", about = "Terminal client for a JSON chat service")]
struct Args {
    /// Chat server base URL (overrides GRIP_BASE_URL and the config file)
    #[arg(short, long)]
    base_url: Option<String>,

    /// Milliseconds between revealed characters of a reply
    #[arg(long)]
    cadence_ms: Option<u64>,
}

#[tokio::main]
async fn main() -> std::io::Result<()> {
    let args = Args::parse();
    dotenv::dotenv().ok();

    // Initialize file logger - writes to grip.log in current directory
    let log_config = ConfigBuilder::new().set_time_format_rfc3339().build();

    if let Ok(log_file) = File::create("grip.log") {
        let _ = WriteLogger::init(LevelFilter::Debug, log_config, log_file);
    }

    let file_config = config::load_config().unwrap_or_else(|e| {
        eprintln!("grip: {e}, falling back to defaults");
        log::warn!("{}, falling back to defaults", e);
        config::GripConfig::default()
    });
    let resolved = config::resolve(&file_config, args.base_url.as_deref(), args.cadence_ms);

    log::info!("Grip starting up against {}", resolved.base_url);

    tui::run(resolved)
}
