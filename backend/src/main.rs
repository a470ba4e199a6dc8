use std::sync::Arc;

use actix_web::{App, HttpResponse, HttpServer, middleware, web};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use repofolio::{AdminAuth, AppState, Config, GitHubClient, RepoStore, handlers};

/// Health check endpoint
async fn health_check() -> HttpResponse {
    HttpResponse::Ok().json(serde_json::json!({
        "status": "healthy",
        "service": "repofolio"
    }))
}

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    // Load environment variables from .env file
    dotenvy::dotenv().ok();

    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "repofolio=debug,actix_web=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = Config::from_env().map_err(std::io::Error::other)?;

    info!("Starting repofolio server on {}", config.bind_addr());

    let upstream = GitHubClient::from_config(&config).map_err(std::io::Error::other)?;
    if config.github_token.is_none() {
        tracing::warn!("GITHUB_TOKEN not set; upstream requests are unauthenticated");
    }

    let store = RepoStore::new(&config.data_file);
    info!("Curated list stored at {}", store.path().display());

    let admin_auth = match AdminAuth::from_password(config.admin_password.as_deref()) {
        Ok(auth) => {
            info!("Admin authentication enabled");
            Some(web::Data::new(auth))
        }
        Err(e) => {
            tracing::warn!("{e}. Admin endpoints will be unavailable.");
            None
        }
    };

    let server_addr = config.bind_addr();
    let app_state = web::Data::new(AppState {
        config,
        store,
        upstream: Arc::new(upstream),
    });

    HttpServer::new(move || {
        let mut app = App::new()
            .app_data(app_state.clone())
            .wrap(middleware::Logger::default())
            .route("/health", web::get().to(health_check))
            .service(
                web::scope("/api")
                    .configure(handlers::configure_repo_routes) // /auth, /catalog, /repos
                    .configure(handlers::configure_github_routes), // /repos/{owner}/{repo}/...
            );

        if let Some(ref auth) = admin_auth {
            app = app.app_data(auth.clone());
        }

        app
    })
    .bind(&server_addr)?
    .run()
    .await
}
