//! Contact Journal gateway: tenant config, user lookup and journal endpoints under `/api`.
//!
//! `--check-configs` validates every tenant document and exits instead of serving.

mod api;
mod app;
mod handlers;

use contact_journal_core::{ConfigService, Settings};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() {
    let dotenv_loaded = dotenvy::dotenv().is_ok();

    let settings = match Settings::load() {
        Ok(settings) => settings,
        Err(e) => {
            eprintln!("failed to load settings: {e}");
            std::process::exit(1);
        }
    };
    let _log_guard = init_tracing(&settings);
    if dotenv_loaded {
        tracing::debug!(".env loaded");
    }

    if std::env::args().skip(1).any(|arg| arg == "--check-configs") {
        let code = check_configs(&ConfigService::from_settings(&settings)).await;
        std::process::exit(code);
    }

    let (state, _feedback_worker) = app::AppState::from_settings(&settings);
    let app = app::build_app(state, &settings.cors_origin);

    let addr = settings.bind_addr();
    let listener = match tokio::net::TcpListener::bind(&addr).await {
        Ok(listener) => listener,
        Err(e) => {
            tracing::error!(%addr, "failed to bind: {}", e);
            std::process::exit(1);
        }
    };
    tracing::info!(
        %addr,
        data_dir = %settings.data_dir.display(),
        configs_dir = %settings.configs_dir.display(),
        default_tenant = %settings.default_tenant,
        "contact journal gateway v{} listening",
        contact_journal_core::version()
    );

    if let Err(e) = axum::serve(listener, app).await {
        tracing::error!("server error: {}", e);
        std::process::exit(1);
    }
}

/// Console layer always; a daily rolling file layer when `log_dir` is set.
/// The returned guard must live as long as the process to flush the file writer.
fn init_tracing(settings: &Settings) -> Option<WorkerGuard> {
    let (file_layer, guard) = match &settings.log_dir {
        Some(dir) => {
            let appender = tracing_appender::rolling::daily(dir, "contact-journal.log");
            let (writer, guard) = tracing_appender::non_blocking(appender);
            let layer = tracing_subscriber::fmt::layer()
                .with_writer(writer)
                .with_ansi(false);
            (Some(layer), Some(guard))
        }
        None => (None, None),
    };

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .with(file_layer)
        .init();
    guard
}

/// Returns the process exit code: 0 when every tenant document is valid and the
/// default tenant resolves.
async fn check_configs(configs: &ConfigService) -> i32 {
    let tenants = configs.list_configs().await;
    if tenants.is_empty() {
        tracing::error!("no tenant configurations found");
        return 1;
    }

    let report = configs.validate_all().await;
    for (tenant, problems) in &report {
        for problem in problems {
            tracing::error!(tenant = %tenant, field = %problem.field, "{}", problem.message);
        }
    }

    let default_ok = match configs.health_check().await {
        Ok(_) => true,
        Err(e) => {
            tracing::error!(tenant = configs.default_tenant(), "default tenant does not resolve: {}", e);
            false
        }
    };

    tracing::info!(
        checked = tenants.len(),
        invalid = report.len(),
        "tenant configuration check finished"
    );
    if report.is_empty() && default_ok {
        0
    } else {
        1
    }
}
