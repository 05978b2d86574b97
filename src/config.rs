//! Service configuration from environment variables. Completion backend
//! settings (API key, base URL, model) are read by the client itself at
//! construction; everything else lands here at startup.

use std::path::PathBuf;

#[derive(Debug, Clone)]
pub struct Config {
    pub port: u16,
    pub curriculum_dir: PathBuf,
    pub template_path: PathBuf,
    /// Explicit CORS origins; empty means fully permissive.
    pub allowed_origins: Vec<String>,
}

impl Config {
    pub fn from_env() -> Self {
        let mut allowed_origins: Vec<String> = std::env::var("ALLOWED_ORIGINS")
            .map(|v| {
                v.split(',')
                    .map(|s| s.trim().to_string())
                    .filter(|s| !s.is_empty())
                    .collect()
            })
            .unwrap_or_default();
        if let Ok(frontend) = std::env::var("FRONTEND_URL") {
            let frontend = frontend.trim().to_string();
            if !frontend.is_empty() && !allowed_origins.contains(&frontend) {
                allowed_origins.push(frontend);
            }
        }

        Self {
            port: std::env::var("PORT")
                .ok()
                .and_then(|p| p.parse().ok())
                .unwrap_or(8000),
            curriculum_dir: std::env::var("CURRICULUM_DIR")
                .unwrap_or_else(|_| "curriculum".to_string())
                .into(),
            template_path: std::env::var("LESSON_TEMPLATE_PATH")
                .unwrap_or_else(|_| "lesson_plan_template.json".to_string())
                .into(),
            allowed_origins,
        }
    }
}
