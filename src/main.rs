use clap::Parser;
use exec_advisory::config::known_analyses;
use exec_advisory::core::ConfigProvider;
use exec_advisory::utils::error::{AdvisoryError, ErrorSeverity};
use exec_advisory::utils::{logger, validation::Validate};
use exec_advisory::{AdvisoryEngine, CliConfig, LocalStorage};

fn main() {
    let cli = CliConfig::parse();

    // 初始化日誌
    if cli.json_logs {
        logger::init_json_logger();
    } else {
        logger::init_cli_logger(cli.verbose);
    }

    tracing::info!("🚀 Starting exec-advisory");
    if cli.verbose {
        tracing::debug!("CLI config: {:?}", cli);
    }

    if let Err(e) = run(&cli) {
        tracing::error!(
            "❌ Advisory run failed: {} (Category: {:?}, Severity: {:?})",
            e,
            e.category(),
            e.severity()
        );
        tracing::error!("💡 Recovery suggestion: {}", e.recovery_suggestion());

        eprintln!("❌ {}", e.user_friendly_message());
        eprintln!("💡 建議: {}", e.recovery_suggestion());
        if matches!(e, AdvisoryError::MissingConfigError { .. }) {
            eprintln!("📋 Available analyses: {}", known_analyses());
        }

        // 根據錯誤嚴重程度決定退出碼
        let exit_code = match e.severity() {
            ErrorSeverity::Low => 0,
            ErrorSeverity::Medium => 2,
            ErrorSeverity::High => 1,
            ErrorSeverity::Critical => 3,
        };

        if exit_code > 0 {
            std::process::exit(exit_code);
        }
    }
}

fn run(cli: &CliConfig) -> exec_advisory::Result<()> {
    let config = cli.resolve()?;

    config.validate()?;
    tracing::info!("✅ Configuration '{}' validated", config.advisory.name);

    if cli.dry_run {
        tracing::info!("🔍 DRY RUN MODE - reports will not be written");
    }

    let storage = LocalStorage::new(config.output_path().to_string());
    let engine = AdvisoryEngine::new(storage, config.clone(), config.inputs.clone())
        .with_dry_run(cli.dry_run);

    let outcomes = engine.run(cli.only)?;

    for outcome in &outcomes {
        println!("\n📊 {}", outcome.kind);
        println!("{}", "=".repeat(50));
        for line in &outcome.summary {
            println!("  • {}", line);
        }
        for file in &outcome.exported_files {
            println!("📄 Exported to: {}", file);
        }
    }

    println!("\n✅ Completed {} analyses", outcomes.len());
    Ok(())
}
