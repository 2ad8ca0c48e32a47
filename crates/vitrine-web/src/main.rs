//! Desktop viewer
//!
//! Reads `vitrine.toml` (or the file named by `--config` / `VITRINE_CONFIG`)
//! and serves models from `assets/`.

#[cfg(not(target_arch = "wasm32"))]
use clap::Parser;
#[cfg(not(target_arch = "wasm32"))]
use std::path::PathBuf;

#[cfg(not(target_arch = "wasm32"))]
#[derive(Parser, Debug)]
#[command(name = "vitrine")]
#[command(about = "Interactive 3D product viewer")]
#[command(version)]
struct Args {
    /// Path to configuration file
    #[arg(short, long, env = "VITRINE_CONFIG", default_value = "vitrine.toml")]
    config: PathBuf,

    /// Write the default configuration to the config path and exit
    #[arg(long)]
    write_default_config: bool,
}

#[cfg(not(target_arch = "wasm32"))]
fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    if args.write_default_config {
        vitrine_web::app::write_default_config(&args.config)?;
        println!("Wrote default configuration to {}", args.config.display());
        return Ok(());
    }

    vitrine_web::app::run_native(&args.config)
}

// The web build starts from the library's wasm entry point
#[cfg(target_arch = "wasm32")]
fn main() {}

#[cfg(all(test, not(target_arch = "wasm32")))]
mod tests {
    use super::*;

    #[test]
    fn test_write_default_config_flag() {
        let args = Args::try_parse_from(["vitrine", "--write-default-config", "-c", "demo.toml"]).unwrap();
        assert!(args.write_default_config);
        assert_eq!(args.config, PathBuf::from("demo.toml"));
    }
}
