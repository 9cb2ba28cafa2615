use anyhow::Context;
use clap::Parser;
use fixtures::{build_fixtures, FixtureSet, GeneratorConfig};
use log::info;
use service::build_routes;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::runtime::Builder as TokioBuilder;
use trafficcore::metrics::{format_fixed, format_seconds, ChunkMetrics, RealWorldTimeTable};

mod fixtures;
mod service;

#[derive(Parser)]
#[command(author, version, about = "Development data service for the traffic dashboard")]
struct Args {
    /// Load chunk records and violations from YAML instead of generating them
    #[arg(long)]
    fixtures: Option<PathBuf>,
    /// Directory holding the chunk and violation clips
    #[arg(long, default_value = "media")]
    media_dir: PathBuf,
    #[arg(long, default_value_t = 8000)]
    port: u16,
    /// Seed for generated fixtures
    #[arg(long, default_value_t = 0)]
    seed: u64,
    /// Number of generated chunks
    #[arg(long, default_value_t = 9)]
    chunks: u32,
    /// Print the efficiency figures of one chunk and exit
    #[arg(long)]
    summary: Option<u32>,
    /// Keep serving until Ctrl+C
    #[arg(long, default_value_t = false)]
    serve: bool,
}

fn print_summary(fixtures: &FixtureSet, chunk: u32) -> anyhow::Result<()> {
    let record = fixtures
        .record(chunk)
        .with_context(|| format!("no fixture for chunk {}", chunk))?;
    let metrics = ChunkMetrics::derive(record, &RealWorldTimeTable::recorded(), chunk);
    println!(
        "chunk {} -> real {}s / {} cars / {} cars/s | recommended {}s / {} cars / {} cars/s | {:?} {} cars/s",
        chunk,
        format_seconds(metrics.real_world_sec),
        metrics.total_cars_real,
        format_fixed(metrics.eff_real),
        format_fixed(metrics.recommended_total_sec),
        metrics.total_cars_recommended,
        format_fixed(metrics.eff_recommended),
        metrics.verdict(),
        format_fixed(metrics.improvement),
    );
    Ok(())
}

fn main() -> anyhow::Result<()> {
    env_logger::init();
    let args = Args::parse();

    let fixtures = if let Some(path) = &args.fixtures {
        FixtureSet::load(path)?
    } else {
        build_fixtures(&GeneratorConfig {
            chunks: args.chunks,
            seed: args.seed,
            ..Default::default()
        })
    };
    info!(
        "{} chunks and {} violations loaded",
        fixtures.chunks.len(),
        fixtures.violations.len()
    );

    if let Some(chunk) = args.summary {
        print_summary(&fixtures, chunk)?;
    }

    if args.serve {
        let address = SocketAddr::from(([127, 0, 0, 1], args.port));
        let routes = build_routes(Arc::new(fixtures), args.media_dir.clone());
        let runtime = TokioBuilder::new_multi_thread()
            .enable_all()
            .build()
            .context("creating runtime for the data service")?;
        runtime.block_on(async move {
            let (bound, server) = warp::serve(routes)
                .try_bind_with_graceful_shutdown(address, async {
                    let _ = tokio::signal::ctrl_c().await;
                })
                .with_context(|| format!("binding {}", address))?;
            info!("data service listening on http://{} (Ctrl+C to stop)", bound);
            server.await;
            Ok::<(), anyhow::Error>(())
        })?;
    }

    Ok(())
}
