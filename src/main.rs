use std::fs::File;
use std::path::PathBuf;

use clap::Parser;
use log::{error, info};
use prompts::Provider;
use prompts::core::config::{load_config, resolve};
use simplelog::{ConfigBuilder, LevelFilter, WriteLogger};

#[derive(Parser)]
#[command(name = "prompts", about = "Prompt playground with side-by-side chat conversations")]
struct Args {
    /// Completion provider (overrides config and PROMPTS_PROVIDER)
    #[arg(short, long, value_enum)]
    provider: Option<Provider>,

    /// Model name (overrides config and PROMPTS_MODEL)
    #[arg(short, long)]
    model: Option<String>,

    /// Config file to use instead of ~/.prompts/config.toml
    #[arg(short, long)]
    config: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> std::io::Result<()> {
    let args = Args::parse();
    dotenv::dotenv().ok();

    // File logger: prompts.log in the current directory. The TUI owns the terminal.
    let log_config = ConfigBuilder::new().set_time_format_rfc3339().build();
    if let Ok(log_file) = File::create("prompts.log") {
        let _ = WriteLogger::init(LevelFilter::Debug, log_config, log_file);
    }

    let config = match load_config(args.config.as_deref()) {
        Ok(config) => config,
        Err(e) => {
            error!("Failed to load config: {}", e);
            eprintln!("prompts: {e}");
            return Err(std::io::Error::other(e.to_string()));
        }
    };
    let resolved = resolve(
        &config,
        args.provider.as_ref().map(Provider::config_name),
        args.model.as_deref(),
    );
    info!("Prompts starting up: {:?}", resolved);

    prompts::tui::run(resolved)
}
