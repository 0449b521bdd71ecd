use tokio::net::TcpListener;
use recipe_planner::{
    config::Config,
    api::routes::create_router,
    logging::init_logging,
    AppState,
};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Load configuration
    let config = Config::load()?;
    init_logging(config.environment);

    let server_addr = config.server_addr;
    tracing::info!(
        %server_addr,
        environment = ?config.environment,
        pdf_output_dir = %config.pdf_output_dir.display(),
        "starting recipe planner"
    );

    let app = create_router(AppState::new(config));

    let listener = TcpListener::bind(server_addr).await?;
    tracing::info!("listening on {}", server_addr);
    axum::serve(listener, app).await?;

    Ok(())
}
