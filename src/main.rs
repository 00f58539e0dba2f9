use std::net::SocketAddr;

use blogapi::{init_db, make_router, run_app};

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt().init();

    let db_url = match std::env::var("DATABASE_URL") {
        Ok(url) => url,
        Err(_) => {
            tracing::error!("DATABASE_URL must be set");
            return;
        }
    };
    let pool = match init_db(&db_url).await {
        Ok(pool) => pool,
        Err(error) => {
            tracing::error!("Failed to initialize database: {}", error);
            return;
        }
    };

    let addr = SocketAddr::from(([127, 0, 0, 1], 3001));
    let router = make_router();
    tracing::info!("Server started on {}", addr);
    if let Err(error) = run_app(router, addr, pool).await {
        tracing::error!("Error: {}", error);
    }
}
