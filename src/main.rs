use clap::Parser;
use unlink::utils::logger;
use unlink::{Implementation, MutexStack, Stack, StressCli, StressEngine, StressReport, UnlinkError};

fn run_one(target: Implementation, run: &unlink::ResolvedRun) -> unlink::Result<StressReport> {
    match target {
        Implementation::Mutex => {
            StressEngine::new_with_monitoring(MutexStack::new(), run.settings.clone(), run.monitor).run()
        }
        _ => StressEngine::new_with_monitoring(Stack::new(), run.settings.clone(), run.monitor).run(),
    }
}

fn fail(e: UnlinkError) -> ! {
    tracing::error!(
        "❌ Stress run failed: {} (Category: {:?}, Severity: {:?})",
        e,
        e.category(),
        e.severity()
    );
    tracing::error!("💡 Recovery suggestion: {}", e.recovery_suggestion());
    eprintln!("❌ {}", e.user_friendly_message());
    eprintln!("💡 {}", e.recovery_suggestion());
    std::process::exit(e.exit_code());
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = StressCli::parse();

    // 初始化日誌，JSON 報告搭配 JSON 日誌
    if cli.json {
        logger::init_json_logger();
    } else {
        logger::init_cli_logger(cli.verbose);
    }

    tracing::info!("🚀 Starting unlink stress runner");
    tracing::debug!("CLI config: {:?}", cli);

    // 合併設定來源並驗證
    let run = match cli.resolve() {
        Ok(run) => run,
        Err(e) => fail(e),
    };

    if run.monitor {
        tracing::info!("🔍 System monitoring enabled");
    }

    let mut reports = Vec::new();
    for &target in run.settings.implementation.targets() {
        match run_one(target, &run) {
            Ok(report) => reports.push(report),
            Err(e) => fail(e),
        }
    }

    if run.json {
        println!("{}", serde_json::to_string_pretty(&reports)?);
    } else {
        for report in &reports {
            println!("{}", report);
        }
    }

    Ok(())
}
