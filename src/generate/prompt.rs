//! Lesson template loading and prompt assembly.
//! The template steers the model toward the exact JSON shape the frontend
//! renders; the prompt carries administrative details, resolved curriculum
//! content and terminology guidance.

use std::path::Path;

use tracing::warn;

use crate::curriculum::terminology::TerminologyProfile;
use crate::curriculum::ResolvedContent;

use super::LessonPlanRequest;

/// The JSON skeleton a generated lesson plan must follow.
pub struct LessonTemplate {
    value: serde_json::Value,
}

impl LessonTemplate {
    /// Load the template from disk, falling back to the built-in skeleton
    /// when the file is missing or unreadable. The template is steering
    /// data, so a broken file degrades instead of failing startup.
    pub fn load(path: &Path) -> Self {
        match std::fs::read_to_string(path) {
            Ok(content) => match serde_json::from_str(&content) {
                Ok(value) => Self { value },
                Err(e) => {
                    warn!(path = %path.display(), error = %e, "lesson template unparseable, using built-in");
                    Self::fallback()
                }
            },
            Err(e) => {
                warn!(path = %path.display(), error = %e, "lesson template missing, using built-in");
                Self::fallback()
            }
        }
    }

    /// Minimal built-in template.
    pub fn fallback() -> Self {
        Self {
            value: serde_json::json!({
                "lessonPlan": {
                    "administrativeDetails": {},
                    "curriculumAlignment": {},
                    "learningOutcomes": [],
                    "guidingQuestion": "",
                    "learningResources": [],
                    "lessonFlow": {
                        "introduction": {},
                        "development": [],
                        "conclusion": {}
                    }
                }
            }),
        }
    }

    fn pretty(&self) -> String {
        serde_json::to_string_pretty(&self.value).unwrap_or_else(|_| "{}".to_string())
    }
}

/// System message: teacher persona, plus a whole-plan language directive
/// when the terminology profile requires one.
pub fn build_system_prompt(terminology: &TerminologyProfile) -> String {
    let mut prompt = String::from(
        "You are an expert Kenyan CBC teacher who creates detailed, engaging, \
         standards-aligned lesson plans in JSON format. You understand the Kenyan \
         education system and create culturally relevant lessons.",
    );
    if let Some(lang) = &terminology.language {
        prompt.push_str(&format!(
            " This subject is taught in its own language of instruction \
             (language code: {lang}); write every field of the lesson plan in that language."
        ));
    }
    prompt
}

/// User message carrying the template, administrative details, resolved
/// curriculum content and terminology guidance.
pub fn build_user_prompt(
    request: &LessonPlanRequest,
    template: &LessonTemplate,
    content: &ResolvedContent,
    terminology: &TerminologyProfile,
) -> String {
    let total_students = request.boys + request.girls;
    let grounding = if content.has_curriculum_data() {
        "Base the lesson strictly on the official curriculum content above; \
         do not invent alternative topics or outcomes."
            .to_string()
    } else {
        format!(
            "No official curriculum entry was found for this strand and sub-strand. \
             Draw on general {} expertise to propose content appropriate for Grade {}.",
            request.subject, request.grade
        )
    };

    format!(
        "\
You are creating a CBC-aligned {subject} lesson plan.

**LESSON PLAN TEMPLATE TO FOLLOW:**
{template}

**ADMINISTRATIVE DETAILS TO USE:**
- School: {school}
- Subject: {subject}
- Class: {class_name}
- Grade: {grade}
- Term: {term}
- Date: {date}
- Time: {start_time} - {end_time}
- Duration: 40 minutes
- Teacher: {teacher_name}
- TSC Number: {teacher_tsc_number}
- Boys: {boys}, Girls: {girls}, Total: {total_students}

**CURRICULUM FOCUS:**
Strand: {strand}
Sub-strand: {sub_strand}

**CURRICULUM CONTENT FROM CBC SYLLABUS:**

Topics to Cover:{topics}

Learning Outcomes:{outcomes}

Key Concepts: {key_concepts}

Key Inquiry Questions:{inquiry}

Suggested Learning Experiences:{experiences}

Core Competencies to Develop:{competencies}

Values to Integrate:{values}

{terminology_guidance}
**INSTRUCTIONS:**
1. Follow the EXACT JSON structure from the template
2. Fill in all administrative details accurately
3. Create 3-4 specific, measurable learning outcomes (with ids \"a\", \"b\", \"c\", \"d\") based on the curriculum outcomes
4. Develop a thought-provoking guiding question from the key inquiry questions
5. List 3-5 practical learning resources appropriate for the topic
6. Design an engaging 5-minute introduction activity
7. Create 3 progressive development steps (each 10-12 minutes):
   - Step 1: Observation/exploration activity
   - Step 2: Hands-on practice/modeling activity
   - Step 3: Application/presentation activity
8. Design a 5-minute conclusion for summary and reflection
9. Incorporate the core competencies and values throughout activities
10. Make activities practical, engaging, and appropriate for Grade {grade}
11. Ensure the lesson can be completed in 40 minutes
12. {grounding}

Return ONLY valid JSON matching the template structure exactly. No additional text or markdown.",
        subject = request.subject,
        template = template.pretty(),
        school = request.school,
        class_name = request.class_name,
        grade = request.grade,
        term = request.term,
        date = request.date,
        start_time = request.start_time,
        end_time = request.end_time,
        teacher_name = request.teacher_name,
        teacher_tsc_number = request.teacher_tsc_number,
        boys = request.boys,
        girls = request.girls,
        total_students = total_students,
        strand = content.strand,
        sub_strand = content.sub_strand,
        topics = bullet_list(&content.topics, None),
        outcomes = bullet_list(&content.learning_outcomes, None),
        key_concepts = text_or_none(&content.key_concepts),
        inquiry = bullet_list(&content.key_inquiry_questions, None),
        experiences = bullet_list(&content.suggested_experiences, Some(3)),
        competencies = bullet_list(&content.core_competencies, Some(2)),
        values = bullet_list(&content.values, Some(2)),
        terminology_guidance = terminology_section(terminology),
        grounding = grounding,
    )
}

/// Render items as an indented bullet list, optionally capped, or the
/// "None specified" marker when empty.
fn bullet_list(items: &[String], limit: Option<usize>) -> String {
    if items.is_empty() {
        return " None specified".to_string();
    }
    let capped = match limit {
        Some(n) => &items[..items.len().min(n)],
        None => items,
    };
    let mut out = String::new();
    for item in capped {
        out.push_str("\n- ");
        out.push_str(item);
    }
    out
}

fn text_or_none(text: &str) -> &str {
    if text.is_empty() {
        "None specified"
    } else {
        text
    }
}

fn terminology_section(terminology: &TerminologyProfile) -> String {
    let mut section = String::from("**SUBJECT TERMINOLOGY GUIDANCE:**\n");
    section.push_str(&format!(
        "Preferred action verbs: {}\n",
        terminology.action_verbs.join(", ")
    ));
    if !terminology.key_terms.is_empty() {
        section.push_str(&format!(
            "Key terms to weave in: {}\n",
            terminology.key_terms.join(", ")
        ));
    }
    section.push_str(&format!("Language style: {}\n", terminology.language_style));
    if !terminology.example_outcomes.is_empty() {
        section.push_str("Example outcome phrasing:");
        section.push_str(&bullet_list(&terminology.example_outcomes, None));
        section.push('\n');
    }
    section
}
