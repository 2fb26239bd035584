pub mod application;
pub mod config;
pub mod db;
pub mod domain;
pub mod errors;
pub mod handlers;
pub mod infrastructure;
pub mod schema;

use std::sync::Arc;

use actix_web::{middleware::Logger, web, App, HttpServer};
use diesel_migrations::{embed_migrations, EmbeddedMigrations, MigrationHarness};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use application::analytics_service::AnalyticsService;
use application::auth_service::{AuthService, AuthSettings};
use application::catalog_service::CatalogService;
use application::checkout_service::CheckoutService;
use application::order_service::OrderService;
use config::Config;
use domain::errors::DomainError;
use infrastructure::cloudinary::CloudinaryClient;
use infrastructure::order_repo::DieselOrderRepository;
use infrastructure::printful::PrintfulClient;
use infrastructure::product_repo::DieselProductRepository;
use infrastructure::stripe::StripeClient;
use infrastructure::tracking_repo::DieselTrackingRepository;

pub use db::{create_pool, DbPool};

pub const MIGRATIONS: EmbeddedMigrations = embed_migrations!("migrations");

/// Run any pending Diesel migrations against the pool's database.
pub fn run_migrations(pool: &DbPool) -> Result<(), DomainError> {
    let mut conn = pool.get()?;
    conn.run_pending_migrations(MIGRATIONS)
        .map_err(|e| DomainError::Internal(format!("Failed to run database migrations: {e}")))?;
    Ok(())
}

/// Services shared by every worker.
pub struct AppState {
    pub catalog: CatalogService,
    pub checkout: CheckoutService,
    pub orders: OrderService,
    pub analytics: AnalyticsService,
    pub auth: AuthService,
}

impl AppState {
    /// Wires the Postgres repositories and the provider clients described by `config`.
    pub fn from_config(config: &Config, pool: DbPool, http: reqwest::Client) -> Self {
        let products = Arc::new(DieselProductRepository::new(pool.clone()));
        let orders = Arc::new(DieselOrderRepository::new(pool.clone()));
        let tracking = Arc::new(DieselTrackingRepository::new(pool));

        let payments = Arc::new(StripeClient::new(
            http.clone(),
            config.stripe_secret_key.clone(),
            config.stripe_webhook_secret.clone(),
        ));
        let fulfillment = Arc::new(PrintfulClient::new(
            http.clone(),
            config.printful_api_key.clone(),
            config.printful_store_id.clone(),
        ));
        if !fulfillment.is_configured() {
            log::warn!("PRINTFUL_API_KEY is not set; fulfillment calls will be mocked");
        }
        if config.cloudinary.is_none() {
            log::warn!("Cloudinary is not configured; image uploads are disabled");
        }
        let images = Arc::new(CloudinaryClient::new(http, config.cloudinary.clone()));

        AppState {
            catalog: CatalogService::new(products.clone(), fulfillment.clone(), images),
            checkout: CheckoutService::new(
                products.clone(),
                orders.clone(),
                payments.clone(),
                config.frontend_url.clone(),
            ),
            orders: OrderService::new(products.clone(), orders.clone(), payments, fulfillment),
            analytics: AnalyticsService::new(products, orders, tracking),
            auth: AuthService::new(AuthSettings {
                jwt_secret: config.jwt_secret.clone(),
                admin_api_key: config.admin_api_key.clone(),
                admin_username: config.admin_username.clone(),
                admin_password: config.admin_password.clone(),
            }),
        }
    }
}

/// Build and return an actix-web `Server` bound to `host:port`.
///
/// The caller is responsible for `.await`-ing (or `tokio::spawn`-ing) the
/// returned server. On SIGINT/SIGTERM in-flight requests get
/// `shutdown_grace_secs` to finish before workers are stopped.
pub fn build_server(
    state: web::Data<AppState>,
    host: &str,
    port: u16,
    shutdown_grace_secs: u64,
) -> std::io::Result<actix_web::dev::Server> {
    let openapi = handlers::ApiDoc::openapi();

    Ok(HttpServer::new(move || {
        App::new()
            .app_data(state.clone())
            .wrap(Logger::default())
            .service(
                SwaggerUi::new("/swagger-ui/{_:.*}").url("/api-docs/openapi.json", openapi.clone()),
            )
            .configure(handlers::configure)
    })
    .shutdown_timeout(shutdown_grace_secs)
    .bind((host.to_string(), port))?
    .run())
}
