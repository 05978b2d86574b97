//! Lesson plan generation: one request in, one structured plan out.
//! Resolution degrades gracefully (a missing curriculum never fails the
//! request); only an unavailable data source or a backend failure aborts.

pub mod openai;
pub mod prompt;

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::info;
use uuid::Uuid;

use crate::curriculum::resolver::ContentResolver;
use crate::curriculum::source::StoreError;
use crate::curriculum::store::CurriculumStore;
use crate::curriculum::terminology::TerminologyRegistry;
use crate::metrics::{metric_names, MetricsRegistry};

use openai::CompletionBackend;
use prompt::LessonTemplate;

/// One lesson plan request as submitted by the frontend.
#[derive(Debug, Clone, Deserialize)]
pub struct LessonPlanRequest {
    pub school: String,
    pub subject: String,
    pub class_name: String,
    pub grade: u32,
    pub term: u32,
    pub date: String,
    pub start_time: String,
    pub end_time: String,
    pub teacher_name: String,
    pub teacher_tsc_number: String,
    pub boys: u32,
    pub girls: u32,
    pub strand: String,
    pub sub_strand: String,
}

/// A generated plan plus the names that were actually used, so callers can
/// see what the fuzzy resolution corrected.
#[derive(Debug, Clone, Serialize)]
pub struct GeneratedLessonPlan {
    pub lesson_plan: serde_json::Value,
    pub subject_used: String,
    pub strand_used: String,
    pub sub_strand_used: String,
    /// Whether the plan is grounded in official curriculum content.
    pub curriculum_grounded: bool,
    pub tokens_used: u32,
}

#[derive(Debug)]
pub enum GenerateError {
    /// The curriculum data source is inaccessible (not merely empty).
    Store(StoreError),
    Backend(String),
    RateLimited,
    Timeout,
    /// The model returned text that is not valid JSON.
    InvalidResponse(String),
}

impl std::fmt::Display for GenerateError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            GenerateError::Store(e) => write!(f, "curriculum store error: {e}"),
            GenerateError::Backend(msg) => write!(f, "completion backend error: {msg}"),
            GenerateError::RateLimited => write!(f, "completion backend rate limited"),
            GenerateError::Timeout => write!(f, "completion request timed out"),
            GenerateError::InvalidResponse(msg) => {
                write!(f, "completion was not valid JSON: {msg}")
            }
        }
    }
}

impl std::error::Error for GenerateError {}

impl From<StoreError> for GenerateError {
    fn from(e: StoreError) -> Self {
        GenerateError::Store(e)
    }
}

/// Orchestrates load -> resolve -> prompt -> complete for one request.
pub struct LessonPlanService {
    store: Arc<CurriculumStore>,
    resolver: ContentResolver,
    terminology: Arc<TerminologyRegistry>,
    backend: Arc<dyn CompletionBackend>,
    template: LessonTemplate,
    metrics: Arc<MetricsRegistry>,
}

impl LessonPlanService {
    pub fn new(
        store: Arc<CurriculumStore>,
        resolver: ContentResolver,
        terminology: Arc<TerminologyRegistry>,
        backend: Arc<dyn CompletionBackend>,
        template: LessonTemplate,
        metrics: Arc<MetricsRegistry>,
    ) -> Self {
        Self {
            store,
            resolver,
            terminology,
            backend,
            template,
            metrics,
        }
    }

    pub async fn generate(
        &self,
        request: &LessonPlanRequest,
    ) -> Result<GeneratedLessonPlan, GenerateError> {
        let request_id = Uuid::new_v4();
        let total = self.metrics.span(metric_names::GENERATE_TOTAL);

        let load_span = self.metrics.span(metric_names::SUBJECT_LOAD);
        let loaded = self.store.load(&request.subject)?;
        load_span.finish();
        let subject_used = loaded
            .as_ref()
            .map(|l| l.subject.clone())
            .unwrap_or_else(|| request.subject.clone());

        let resolve_span = self.metrics.span(metric_names::CONTENT_RESOLVE);
        let document = loaded.as_ref().map(|l| l.document.as_ref());
        let content = self
            .resolver
            .resolve(document, &request.strand, &request.sub_strand);
        resolve_span.finish();

        // Independent of the store path on purpose: a curriculum miss must
        // not change the style profile the caller asked for.
        let terminology = self.terminology.resolve(&request.subject);

        let prompt_span = self.metrics.span(metric_names::PROMPT_BUILD);
        let system_prompt = prompt::build_system_prompt(&terminology);
        let user_prompt =
            prompt::build_user_prompt(request, &self.template, &content, &terminology);
        prompt_span.finish();

        let completion_span = self.metrics.span(metric_names::COMPLETION);
        let output = self.backend.complete(&system_prompt, &user_prompt).await?;
        completion_span.finish();

        let lesson_plan: serde_json::Value = serde_json::from_str(&output.content)
            .map_err(|e| GenerateError::InvalidResponse(e.to_string()))?;

        let curriculum_grounded = content.has_curriculum_data();
        info!(
            request_id = %request_id,
            subject = %subject_used,
            strand = %content.strand,
            sub_strand = %content.sub_strand,
            grounded = curriculum_grounded,
            tokens = output.tokens_used,
            elapsed_ms = total.finish(),
            "lesson plan generated"
        );

        Ok(GeneratedLessonPlan {
            lesson_plan,
            subject_used,
            strand_used: content.strand,
            sub_strand_used: content.sub_strand,
            curriculum_grounded,
            tokens_used: output.tokens_used,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::openai::CompletionOutput;
    use super::*;
    use crate::curriculum::source::CurriculumSource;
    use crate::curriculum::CurriculumDocument;
    use async_trait::async_trait;

    struct EmptySource;

    impl CurriculumSource for EmptySource {
        fn load(&self, _subject: &str) -> Result<Option<CurriculumDocument>, StoreError> {
            Ok(None)
        }

        fn list_available(&self) -> Result<Vec<String>, StoreError> {
            Ok(Vec::new())
        }
    }

    struct CannedBackend {
        content: &'static str,
    }

    #[async_trait]
    impl CompletionBackend for CannedBackend {
        async fn complete(
            &self,
            _system_prompt: &str,
            _user_prompt: &str,
        ) -> Result<CompletionOutput, GenerateError> {
            Ok(CompletionOutput {
                content: self.content.to_string(),
                tokens_used: 42,
            })
        }
    }

    fn service(content: &'static str) -> LessonPlanService {
        LessonPlanService::new(
            Arc::new(CurriculumStore::new(Box::new(EmptySource))),
            ContentResolver::new(),
            Arc::new(TerminologyRegistry::builtin()),
            Arc::new(CannedBackend { content }),
            LessonTemplate::fallback(),
            Arc::new(MetricsRegistry::new()),
        )
    }

    fn request() -> LessonPlanRequest {
        LessonPlanRequest {
            school: "Baraka Primary".to_string(),
            subject: "Geography".to_string(),
            class_name: "7 East".to_string(),
            grade: 7,
            term: 2,
            date: "2025-06-10".to_string(),
            start_time: "08:00".to_string(),
            end_time: "08:40".to_string(),
            teacher_name: "A. Wanjiru".to_string(),
            teacher_tsc_number: "TSC/12345".to_string(),
            boys: 18,
            girls: 20,
            strand: "Population Growth".to_string(),
            sub_strand: "Birth Rates".to_string(),
        }
    }

    #[tokio::test]
    async fn missing_curriculum_degrades_without_error() {
        let service = service(r#"{"lessonPlan":{}}"#);
        let plan = service.generate(&request()).await.expect("generated");
        assert!(!plan.curriculum_grounded);
        assert_eq!(plan.subject_used, "Geography");
        assert_eq!(plan.strand_used, "Population Growth");
        assert_eq!(plan.sub_strand_used, "Birth Rates");
        assert_eq!(plan.tokens_used, 42);
    }

    #[tokio::test]
    async fn non_json_completion_is_an_invalid_response() {
        let service = service("Sorry, here is your lesson plan: ...");
        let err = service.generate(&request()).await.expect_err("must fail");
        assert!(matches!(err, GenerateError::InvalidResponse(_)));
    }
}
