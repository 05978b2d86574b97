//! Somo: CBC lesson plan drafting service.
//! Library root: component wiring, startup, HTTP serving.

pub mod config;
pub mod curriculum;
pub mod generate;
pub mod metrics;
pub mod server;

use std::sync::Arc;

use tracing::{info, warn};

use config::Config;
use curriculum::resolver::ContentResolver;
use curriculum::source::DirSource;
use curriculum::store::CurriculumStore;
use curriculum::terminology::TerminologyRegistry;
use generate::openai::OpenAiClient;
use generate::prompt::LessonTemplate;
use generate::LessonPlanService;
use metrics::MetricsRegistry;

/// Shared application state handed to every request handler.
pub struct AppContext {
    pub store: Arc<CurriculumStore>,
    /// Absent when the completion backend could not be configured; the
    /// browsing endpoints keep working, generation answers 503.
    pub generator: Option<Arc<LessonPlanService>>,
    pub metrics: Arc<MetricsRegistry>,
}

/// Build shared components and serve HTTP until shutdown.
pub async fn run() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "somo=debug,tower_http=info".parse().unwrap()),
        )
        .with_target(true)
        .init();

    info!("somo starting");

    let config = Config::from_env();
    let metrics = Arc::new(MetricsRegistry::new());
    let store = Arc::new(CurriculumStore::new(Box::new(DirSource::new(
        &config.curriculum_dir,
    ))));
    let resolver = ContentResolver::new();
    let terminology = Arc::new(TerminologyRegistry::builtin());
    let template = LessonTemplate::load(&config.template_path);

    match store.available_subjects() {
        Ok(subjects) => {
            info!(
                count = subjects.len(),
                dir = %config.curriculum_dir.display(),
                "curriculum documents discovered"
            );
        }
        Err(e) => warn!(error = %e, "curriculum directory unreadable at startup"),
    }

    let generator = match OpenAiClient::new() {
        Ok(client) => {
            info!("completion backend initialized");
            Some(Arc::new(LessonPlanService::new(
                Arc::clone(&store),
                resolver,
                Arc::clone(&terminology),
                Arc::new(client),
                template,
                Arc::clone(&metrics),
            )))
        }
        Err(e) => {
            warn!(error = %e, "completion backend init failed (API key missing?), generation disabled");
            None
        }
    };

    let ctx = Arc::new(AppContext {
        store,
        generator,
        metrics,
    });
    let app = server::create_router(ctx, &config.allowed_origins);

    let listener = tokio::net::TcpListener::bind(("0.0.0.0", config.port)).await?;
    info!(port = config.port, "listening");
    axum::serve(listener, app).await?;

    Ok(())
}
