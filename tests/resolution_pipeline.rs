//! End-to-end resolution over a real curriculum directory, plus the full
//! generation pipeline against a canned completion backend.

use std::sync::Arc;

use async_trait::async_trait;
use tempfile::TempDir;

use somo::curriculum::resolver::ContentResolver;
use somo::curriculum::source::DirSource;
use somo::curriculum::store::CurriculumStore;
use somo::curriculum::terminology::TerminologyRegistry;
use somo::curriculum::ResolutionOutcome;
use somo::generate::openai::{CompletionBackend, CompletionOutput};
use somo::generate::prompt::LessonTemplate;
use somo::generate::{GenerateError, LessonPlanRequest, LessonPlanService};
use somo::metrics::MetricsRegistry;

fn write_geography(dir: &TempDir) {
    let document = serde_json::json!({
        "strands": [
            {
                "id": "4.0",
                "name": "Population Growth",
                "code": "GEO-4",
                "sub_strands": [
                    {
                        "id": "4.1",
                        "name": "Birth Rates",
                        "topics": ["Fertility trends", "Natural increase"],
                        "specific_learning_outcomes": [
                            "Explain factors influencing birth rates"
                        ],
                        "key_concepts": "Natural increase",
                        "key_inquiry_questions": [
                            "Why do birth rates differ between regions?"
                        ],
                        "suggested_learning_experiences": ["Interpret census data"],
                        "core_competencies": ["Critical thinking"],
                        "values": ["Responsibility"]
                    }
                ]
            },
            {
                "id": "5.0",
                "name": "Settlement Patterns",
                "sub_strands": [
                    { "id": "5.1", "name": "Urbanisation", "topics": ["Growth of towns"] }
                ]
            }
        ]
    });
    std::fs::write(
        dir.path().join("geography_curriculum.json"),
        serde_json::to_string_pretty(&document).unwrap(),
    )
    .unwrap();
}

fn store_for(dir: &TempDir) -> CurriculumStore {
    CurriculumStore::new(Box::new(DirSource::new(dir.path())))
}

#[test]
fn typo_subject_resolves_to_on_disk_document() {
    let dir = TempDir::new().unwrap();
    write_geography(&dir);

    let store = store_for(&dir);
    let loaded = store.load("Geogrphy").unwrap().expect("document");
    assert_eq!(loaded.subject, "geography");
    assert_eq!(loaded.document.strands.len(), 2);
}

#[test]
fn typos_resolve_through_the_whole_hierarchy() {
    let dir = TempDir::new().unwrap();
    write_geography(&dir);

    let store = store_for(&dir);
    let loaded = store.load("geogrphy").unwrap().expect("document");
    let resolver = ContentResolver::new();
    let content = resolver.resolve(Some(&loaded.document), "populaton groth", "birth rates");

    assert_eq!(content.outcome, ResolutionOutcome::Resolved);
    assert_eq!(content.strand, "Population Growth");
    assert_eq!(content.sub_strand, "Birth Rates");
    assert_eq!(
        content.topics,
        vec!["Fertility trends".to_string(), "Natural increase".to_string()]
    );
    assert!(content.has_curriculum_data());
}

#[test]
fn malformed_file_degrades_to_no_document() {
    let dir = TempDir::new().unwrap();
    std::fs::write(dir.path().join("chemistry_curriculum.json"), "{broken").unwrap();

    let store = store_for(&dir);
    assert!(store.load("chemistry").unwrap().is_none());
}

#[test]
fn unknown_subject_degrades_to_no_document() {
    let dir = TempDir::new().unwrap();
    write_geography(&dir);

    let store = store_for(&dir);
    assert!(store.load("astrophysics").unwrap().is_none());
}

struct CannedBackend;

#[async_trait]
impl CompletionBackend for CannedBackend {
    async fn complete(
        &self,
        _system_prompt: &str,
        user_prompt: &str,
    ) -> Result<CompletionOutput, GenerateError> {
        // Echo a marker so tests can assert the prompt carried the
        // corrected curriculum focus.
        let grounded = user_prompt.contains("strictly on the official curriculum content");
        Ok(CompletionOutput {
            content: serde_json::json!({
                "lessonPlan": { "grounded_prompt": grounded }
            })
            .to_string(),
            tokens_used: 7,
        })
    }
}

fn request(subject: &str, strand: &str, sub_strand: &str) -> LessonPlanRequest {
    LessonPlanRequest {
        school: "Baraka Primary".to_string(),
        subject: subject.to_string(),
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
        strand: strand.to_string(),
        sub_strand: sub_strand.to_string(),
    }
}

fn service_for(dir: &TempDir) -> LessonPlanService {
    LessonPlanService::new(
        Arc::new(store_for(dir)),
        ContentResolver::new(),
        Arc::new(TerminologyRegistry::builtin()),
        Arc::new(CannedBackend),
        LessonTemplate::fallback(),
        Arc::new(MetricsRegistry::new()),
    )
}

#[tokio::test]
async fn generation_reports_corrected_names_and_grounding() {
    let dir = TempDir::new().unwrap();
    write_geography(&dir);

    let service = service_for(&dir);
    let plan = service
        .generate(&request("geogrphy", "populaton groth", "birth rates"))
        .await
        .expect("generated");

    assert_eq!(plan.subject_used, "geography");
    assert_eq!(plan.strand_used, "Population Growth");
    assert_eq!(plan.sub_strand_used, "Birth Rates");
    assert!(plan.curriculum_grounded);
    assert_eq!(plan.lesson_plan["lessonPlan"]["grounded_prompt"], true);
}

#[tokio::test]
async fn generation_survives_an_unknown_strand() {
    let dir = TempDir::new().unwrap();
    write_geography(&dir);

    let service = service_for(&dir);
    let plan = service
        .generate(&request("geography", "Plate Tectonics", "Earthquakes"))
        .await
        .expect("generated");

    assert_eq!(plan.strand_used, "Plate Tectonics");
    assert_eq!(plan.sub_strand_used, "Earthquakes");
    assert!(!plan.curriculum_grounded);
    assert_eq!(plan.lesson_plan["lessonPlan"]["grounded_prompt"], false);
}

#[tokio::test]
async fn generation_survives_a_missing_subject_entirely() {
    let dir = TempDir::new().unwrap();

    let service = service_for(&dir);
    let plan = service
        .generate(&request("astrology", "Star Signs", "Horoscopes"))
        .await
        .expect("generated");

    assert_eq!(plan.subject_used, "astrology");
    assert!(!plan.curriculum_grounded);
}
