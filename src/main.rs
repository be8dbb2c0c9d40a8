use clap::Parser;
use fn_invoke::utils::logger;
use fn_invoke::{app, CliConfig};

fn main() -> anyhow::Result<()> {
    let config = CliConfig::parse();

    // 初始化日誌
    logger::init_cli_logger(config.verbose, config.log_json);

    tracing::info!("Starting fn-invoke");
    if config.verbose {
        tracing::debug!("CLI config: {:?}", config);
    }

    // Sequential round trips only; a single-threaded runtime is enough.
    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()?;

    let stdout = std::io::stdout();
    let mut out = stdout.lock();
    let outcome = runtime.block_on(app::run(&config, |key| std::env::var(key).ok(), &mut out));

    if let Err(e) = outcome {
        tracing::error!(
            "❌ Invocation failed: {} (Category: {:?}, Severity: {:?})",
            e,
            e.category(),
            e.severity()
        );
        eprintln!("❌ {}", e.user_friendly_message());
        eprintln!("💡 Suggestion: {}", e.recovery_suggestion());
        std::process::exit(e.exit_code());
    }

    Ok(())
}
