mod cache;
mod config;
mod error;
mod server;
mod session_loop;
mod source;

use rmcp::{ServiceExt, transport::stdio};
use tracing::info;
use tracing_subscriber::EnvFilter;

use config::Config;
use server::CourseRecommenderServer;
use session_loop::SessionLoop;
use source::SourceLoader;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing to stderr (stdout is reserved for MCP JSON-RPC)
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::from_default_env().add_directive(tracing::Level::INFO.into()),
        )
        .with_writer(std::io::stderr)
        .with_ansi(false)
        .init();

    info!("starting course-recommender MCP server");

    // 1. Load config from environment
    let config = Config::from_env()?;
    info!(
        source = %config.source.describe(),
        recommendation_limit = config.recommendation_limit,
        rating_order = %config.rating_order,
        "configuration loaded"
    );

    // 2. Start the session loop; it loads the catalog before serving queued commands
    let loader = SourceLoader::new(&config)?;
    let session = SessionLoop::spawn(loader, config.rating_order);

    // 3. Build MCP server and serve on stdio
    let server = CourseRecommenderServer::new(session, config.recommendation_limit);

    info!("MCP server ready, serving on stdio");
    let service = server.serve(stdio()).await.inspect_err(|e| {
        tracing::error!(error = %e, "MCP server error");
    })?;

    service.waiting().await?;
    info!("MCP server shut down");
    Ok(())
}
