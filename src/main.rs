// src/main.rs

use tailrelay::{cli, config, logging, run};

#[tokio::main]
async fn main() {
    if let Err(err) = run_main().await {
        eprintln!("tailrelay error: {err:?}");
        std::process::exit(1);
    }
}

async fn run_main() -> anyhow::Result<()> {
    let args = cli::parse();
    let cfg = config::load_with_overrides(&args)?;
    logging::init_logging(args.log_level, cfg.server.debug)?;
    run(cfg, args.dry_run).await
}
