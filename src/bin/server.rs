// ABOUTME: Scopecast server binary
// ABOUTME: Standalone demo broadcaster streaming a synthetic waveform

use clap::Parser;
use scopecast::exporter::ExporterRegistry;
use scopecast::server::{spawn_capture_engine, ServerArgs, TcpExporter};
use std::sync::Arc;

#[derive(Parser, Debug)]
#[command(name = "scopecast-server")]
#[command(author, version, about = "Waveform sample-stream TCP broadcaster", long_about = None)]
struct Args {
    #[command(flatten)]
    server: ServerArgs,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    let args = Args::parse();

    // Initialize tracing
    args.server.init_tracing();

    // Log startup info
    args.server.log_startup_info();

    let settings = Arc::new(args.server.build_settings());
    let config = args.server.build_config();

    // Bind failure is fatal: no retry, no fallback port.
    let exporter = match TcpExporter::start(config, Arc::clone(&settings)).await {
        Ok(exporter) => Arc::new(exporter),
        Err(e) => {
            tracing::error!("{}", e);
            return Err(e.into());
        }
    };

    let mut registry = ExporterRegistry::new(settings);
    registry.register(Box::new(Arc::clone(&exporter)));

    // Drive the demo signal through the registry at the batch cadence.
    let source = args.server.create_source();
    let (engine_handle, engine_shutdown) =
        spawn_capture_engine(source, Arc::new(registry), args.server.batch_ms);

    // Periodically report connected clients.
    let report_exporter = Arc::clone(&exporter);
    let report_task = tokio::spawn(async move {
        let mut interval = tokio::time::interval(tokio::time::Duration::from_secs(5));
        loop {
            interval.tick().await;
            let count = report_exporter.client_count();
            if count > 0 {
                tracing::info!("Connected clients: {}", count);
            }
        }
    });

    tracing::info!("Press Ctrl+C to stop");
    tokio::signal::ctrl_c().await?;
    tracing::info!("Received shutdown signal");

    let _ = engine_shutdown.send(true);
    let _ = engine_handle.await;
    report_task.abort();

    tracing::info!("Server shutdown complete");
    Ok(())
}
