#[cfg(feature = "http_api")]
#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    use homework_planner::persistence::load_active_user;
    use homework_planner::{Planner, PlannerConfig, UserKey, http_api};
    use tracing_subscriber::EnvFilter;

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("homework_planner=info"));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    let config = PlannerConfig::from_env()?;
    let store = config.open_store()?;
    let user = match config.user_key() {
        UserKey::Guest => load_active_user(store.as_ref()).unwrap_or(UserKey::Guest),
        user => user,
    };

    tracing::info!(store = ?config.store, data_dir = %config.data_dir.display(), user = %user, "starting planner");
    let planner = Planner::open(store, user);
    http_api::serve(config.http_addr, planner).await?;
    Ok(())
}

#[cfg(not(feature = "http_api"))]
fn main() {
    eprintln!("Rebuild with the `http_api` feature to enable the HTTP server.");
}
