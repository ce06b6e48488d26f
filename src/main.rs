use clap::Parser;
use small_inetd::utils::{logger, validation::Validate};
use small_inetd::{CliConfig, InetdEngine, InetdError};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = CliConfig::parse();

    let settings = match cli.load_settings() {
        Ok(settings) => settings,
        Err(e) => {
            eprintln!("❌ Failed to load settings: {}", e);
            std::process::exit(e.exit_code());
        }
    };

    // 初始化日誌
    if settings.logging.json {
        logger::init_json_logger(settings.logging.verbose);
    } else {
        logger::init_cli_logger(settings.logging.verbose);
    }

    tracing::info!("🚀 Starting small-inetd");
    tracing::debug!("Settings: {:?}", settings);

    if let Some(rpc) = &cli.rpc {
        tracing::warn!("--rpc ({}) is deprecated and ignored: rpc services are not supported", rpc);
    }

    // 驗證設定
    if let Err(e) = settings.validate() {
        tracing::error!("❌ Configuration validation failed: {}", e);
        eprintln!("❌ {}", e);
        std::process::exit(e.exit_code());
    }

    let engine = InetdEngine::new(settings);

    let result = if cli.check {
        engine.provision().map(|container| {
            for listener in container.listeners() {
                println!(
                    "{}\t{}/tcp\t{}",
                    listener.name(),
                    listener.port(),
                    listener.handler_name()
                );
            }
            println!("✅ {} services would be started", container.len());
        })
    } else {
        engine.run().await
    };

    if let Err(e) = result {
        report(&e);
        std::process::exit(e.exit_code());
    }

    Ok(())
}

fn report(error: &InetdError) {
    tracing::error!("❌ small-inetd failed: {}", error);
    eprintln!("❌ {}", error);
}
