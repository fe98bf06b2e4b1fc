//src/main.rs

use axum::{
    extract::DefaultBodyLimit,
    middleware as axum_middleware,
    routing::{delete, get, post, put},
    Router,
};
use tokio::net::TcpListener;
use tracing_subscriber::EnvFilter;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

mod common;
mod config;
mod db;
mod docs;
mod handlers;
mod integrations;
mod middleware;
mod models;
mod services;

#[cfg(test)]
mod testing;

use crate::config::{AppState, Config};
use crate::docs::ApiDoc;
use crate::middleware::auth::auth_guard;

/// Monta o roteador completo. `main` e os testes de handler usam o mesmo.
pub fn build_router(app_state: AppState) -> Router {
    let max_upload_bytes = app_state.config.max_upload_bytes;

    // Rotas públicas: o onboarding valida a sessão por conta própria
    // e o pixel precisa responder sem sessão nenhuma.
    let public_routes = Router::new()
        .route("/auth/provision", post(handlers::auth::provision))
        .route("/email/track/{token}", get(handlers::email::track_open));

    let protected_routes = Router::new()
        .route("/users/me", get(handlers::auth::get_me))
        .route("/company", get(handlers::company::get_company))
        .route("/company/settings", put(handlers::company::update_settings))
        .route("/leads"
               ,get(handlers::leads::list_leads)
               .post(handlers::leads::create_lead)
        )
        .route("/leads/{id}"
               ,get(handlers::leads::get_lead)
               .patch(handlers::leads::update_lead)
               .delete(handlers::leads::delete_lead)
        )
        .route("/tags", get(handlers::leads::list_tags))
        .route("/email/send", post(handlers::email::send_email))
        .route("/email/logs", get(handlers::email::list_email_logs))
        .route("/reminders"
               ,get(handlers::reminders::list_reminders)
               .post(handlers::reminders::create_reminder)
        )
        .route("/reminders/{id}/complete", post(handlers::reminders::complete_reminder))
        .route("/files"
               ,get(handlers::files::list_files)
               .post(handlers::files::upload_file)
        )
        .route("/files/{id}", delete(handlers::files::delete_file))
        .route("/files/{id}/download", get(handlers::files::download_file))
        .route("/dashboard/stats", get(handlers::dashboard::get_stats))
        .route_layer(axum_middleware::from_fn_with_state(
            app_state.clone(),
            auth_guard,
        ));

    Router::new()
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
        .route("/api/health", get(|| async { "OK" }))
        .nest("/api", public_routes.merge(protected_routes))
        .layer(DefaultBodyLimit::max(max_upload_bytes))
        .with_state(app_state)
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_target(false)
        .compact()
        .init();

    // Se a configuração falhar, a aplicação não deve iniciar.
    let config = Config::from_env()?;
    let pool = config::connect_pool(&config).await?;

    sqlx::migrate!().run(&pool).await?;
    tracing::info!("✅ Migrações do banco de dados executadas com sucesso!");

    let bind_addr = config.bind_addr.clone();
    let app_state = AppState::new(config, pool).await;
    let app = build_router(app_state);

    let listener = TcpListener::bind(&bind_addr).await?;
    tracing::info!("🚀 Servidor escutando em {}", listener.local_addr()?);
    axum::serve(listener, app).await?;

    Ok(())
}
