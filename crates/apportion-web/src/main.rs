use apportion_web::cli::{self, Cli, Command};
use apportion_web::config::ApportionConfig;
use apportion_web::tracing_setup::init_tracing;
use clap::Parser;
use tracing::info;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let config = ApportionConfig::load()?.apply_profile();
    init_tracing(&config.logging);

    info!(version = env!("CARGO_PKG_VERSION"), "Starting Apportion");

    match cli.command {
        None => start_server(config).await,
        Some(Command::Serve { host, port }) => {
            let mut config = config;
            if let Some(host) = host {
                config.server.host = host;
            }
            if let Some(port) = port {
                config.server.port = port;
            }
            start_server(config).await
        }
        Some(Command::Summary { file }) => {
            print!("{}", cli::summary(&file, &config.columns)?);
            Ok(())
        }
        Some(Command::Allocate { file, salesperson, salary, stipend, output }) => {
            let (table, written) = cli::allocate(
                &file,
                &salesperson,
                salary,
                stipend,
                output.as_deref(),
                &config.columns,
            )?;
            print!("{table}");
            println!("Export written to {}", written.display());
            Ok(())
        }
    }
}

async fn start_server(config: ApportionConfig) -> anyhow::Result<()> {
    let addr = format!("{}:{}", config.server.host, config.server.port);
    info!(%addr, "Configuring web server");

    let app = apportion_web::create_app(config);
    let listener = tokio::net::TcpListener::bind(&addr).await?;

    println!("Apportion listening on http://{addr}");
    info!("Web server started successfully");

    axum::serve(listener, app).await?;
    Ok(())
}
