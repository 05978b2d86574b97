//! Subject terminology profiles: action verbs, key terms and phrasing
//! guidance that steer generated lesson plans toward how each subject is
//! actually taught. Static registry shipped with the service; lookups share
//! the curriculum fuzzy-matching contract.

use serde::Serialize;

use super::matcher::find_best_match;

/// Minimum similarity for matching a subject name against the registry.
/// Same scale and tuning as the curriculum store's subject threshold.
pub const TERMINOLOGY_MATCH_THRESHOLD: u8 = 75;

/// Style guidance for one subject.
#[derive(Debug, Clone, Serialize)]
pub struct TerminologyProfile {
    pub action_verbs: Vec<String>,
    pub key_terms: Vec<String>,
    pub language_style: String,
    pub example_outcomes: Vec<String>,
    /// ISO language code when the whole plan must be written in a
    /// non-default language (e.g. "sw" for Kiswahili).
    pub language: Option<String>,
}

impl TerminologyProfile {
    /// Fallback profile for subjects the registry does not know.
    pub fn generic() -> Self {
        Self {
            action_verbs: strings(&["identify", "describe", "explain", "apply", "demonstrate"]),
            key_terms: Vec::new(),
            language_style: "Clear, learner-centred language appropriate for the grade level"
                .to_string(),
            example_outcomes: Vec::new(),
            language: None,
        }
    }
}

/// Fixed mapping from lowercase subject name to its profile.
pub struct TerminologyRegistry {
    entries: Vec<(String, TerminologyProfile)>,
    threshold: u8,
}

impl TerminologyRegistry {
    /// Registry of the core school subjects, as shipped.
    pub fn builtin() -> Self {
        Self::with_entries(builtin_entries())
    }

    /// Constructor for substituting registry data in tests.
    pub fn with_entries(entries: Vec<(String, TerminologyProfile)>) -> Self {
        Self {
            entries,
            threshold: TERMINOLOGY_MATCH_THRESHOLD,
        }
    }

    /// Resolve a subject to its profile: exact hit, then fuzzy, then the
    /// generic fallback. Never fails.
    pub fn resolve(&self, subject: &str) -> TerminologyProfile {
        let canonical = subject.trim().to_lowercase();
        if let Some((_, profile)) = self.entries.iter().find(|(name, _)| *name == canonical) {
            return profile.clone();
        }

        let names: Vec<&str> = self.entries.iter().map(|(name, _)| name.as_str()).collect();
        if let Some(m) = find_best_match(&canonical, &names, self.threshold) {
            if let Some((_, profile)) = self.entries.iter().find(|(name, _)| name == m.value) {
                return profile.clone();
            }
        }

        TerminologyProfile::generic()
    }
}

fn strings(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}

fn profile(
    verbs: &[&str],
    terms: &[&str],
    style: &str,
    outcomes: &[&str],
) -> TerminologyProfile {
    TerminologyProfile {
        action_verbs: strings(verbs),
        key_terms: strings(terms),
        language_style: style.to_string(),
        example_outcomes: strings(outcomes),
        language: None,
    }
}

fn builtin_entries() -> Vec<(String, TerminologyProfile)> {
    let mut entries = vec![
        (
            "mathematics".to_string(),
            profile(
                &["calculate", "solve", "estimate", "measure", "derive", "work out"],
                &["place value", "fraction", "equation", "ratio", "pattern", "data"],
                "Precise and procedural; every activity ends in a worked example or a checkable answer",
                &[
                    "By the end of the lesson, the learner should be able to solve problems involving addition of fractions with different denominators",
                ],
            ),
        ),
        (
            "english".to_string(),
            profile(
                &["read", "write", "narrate", "summarise", "infer", "punctuate"],
                &["comprehension", "vocabulary", "tense", "composition", "intonation"],
                "Expressive and communicative; activities centre on reading, speaking and writing for real audiences",
                &[
                    "By the end of the lesson, the learner should be able to use the past continuous tense in guided sentences",
                ],
            ),
        ),
        (
            "integrated science".to_string(),
            profile(
                &["observe", "investigate", "classify", "record", "predict", "conclude"],
                &["experiment", "variable", "observation", "apparatus", "safety"],
                "Inquiry-driven; lead with a question, let learners investigate and record before naming the concept",
                &[
                    "By the end of the lesson, the learner should be able to classify materials as conductors or insulators from a simple circuit test",
                ],
            ),
        ),
        (
            "social studies".to_string(),
            profile(
                &["locate", "compare", "discuss", "map", "appreciate", "evaluate"],
                &["community", "county", "resource", "citizenship", "environment"],
                "Discussion-led and locally anchored; connect every concept to the learners' own community",
                &[
                    "By the end of the lesson, the learner should be able to locate physical features on a map of Kenya",
                ],
            ),
        ),
        (
            "agriculture".to_string(),
            profile(
                &["prepare", "plant", "tend", "harvest", "classify", "practise"],
                &["seedbed", "crop", "livestock", "soil", "farm tool", "conservation"],
                "Practical and hands-on; lessons build toward an activity learners carry out on the school farm or at home",
                &[
                    "By the end of the lesson, the learner should be able to prepare a nursery bed for vegetable seedlings",
                ],
            ),
        ),
        (
            "home science".to_string(),
            profile(
                &["prepare", "demonstrate", "practise", "select", "care for"],
                &["nutrition", "hygiene", "balanced diet", "fabric", "consumer"],
                "Practical and demonstrative; skills are modelled, then practised with everyday materials",
                &[
                    "By the end of the lesson, the learner should be able to demonstrate the correct steps of hand washing",
                ],
            ),
        ),
        (
            "pre-technical studies".to_string(),
            profile(
                &["sketch", "measure", "assemble", "test", "maintain", "design"],
                &["tool", "material", "workshop safety", "prototype", "mechanism"],
                "Workshop-oriented; each concept pairs with a making or testing task and explicit safety notes",
                &[
                    "By the end of the lesson, the learner should be able to sketch a simple orthographic projection of a rectangular block",
                ],
            ),
        ),
        (
            "creative arts".to_string(),
            profile(
                &["create", "perform", "improvise", "model", "exhibit", "critique"],
                &["rhythm", "texture", "composition", "performance", "medium"],
                "Expressive and performance-based; learners make and present, then reflect on each other's work",
                &[
                    "By the end of the lesson, the learner should be able to create a two-dimensional montage using locally available materials",
                ],
            ),
        ),
        (
            "religious education".to_string(),
            profile(
                &["narrate", "reflect", "relate", "apply", "appreciate"],
                &["scripture", "virtue", "worship", "moral lesson"],
                "Reflective and values-centred; stories lead to discussion of how the lesson applies to daily life",
                &[
                    "By the end of the lesson, the learner should be able to relate the story of the Good Samaritan to helping others at school",
                ],
            ),
        ),
        (
            "biology".to_string(),
            profile(
                &["observe", "dissect", "classify", "draw", "label", "investigate"],
                &["cell", "organism", "adaptation", "ecosystem", "specimen"],
                "Specimen-first; observation and labelled drawings precede definitions",
                &[
                    "By the end of the lesson, the learner should be able to draw and label the parts of a plant cell as seen under a light microscope",
                ],
            ),
        ),
        (
            "chemistry".to_string(),
            profile(
                &["react", "titrate", "balance", "deduce", "test", "tabulate"],
                &["element", "compound", "reaction", "indicator", "apparatus"],
                "Laboratory-driven; observations are tabulated and explained with particle-level reasoning",
                &[
                    "By the end of the lesson, the learner should be able to test for carbon dioxide using lime water and record the observations",
                ],
            ),
        ),
        (
            "physics".to_string(),
            profile(
                &["measure", "calculate", "plot", "verify", "deduce", "experiment"],
                &["force", "energy", "current", "wave", "graph", "unit"],
                "Quantitative and experimental; measurements feed graphs and graphs feed conclusions",
                &[
                    "By the end of the lesson, the learner should be able to verify the relationship between force and extension of a spring",
                ],
            ),
        ),
        (
            "geography".to_string(),
            profile(
                &["locate", "interpret", "draw", "compare", "field-study", "account for"],
                &["map", "scale", "relief", "climate", "settlement", "field work"],
                "Map- and fieldwork-centred; interpretation of real data and landscapes over recall",
                &[
                    "By the end of the lesson, the learner should be able to interpret population distribution from a dot map",
                ],
            ),
        ),
        (
            "history".to_string(),
            profile(
                &["narrate", "sequence", "compare", "evaluate", "trace", "discuss"],
                &["source", "evidence", "chronology", "civilisation", "constitution"],
                "Narrative and source-based; events are sequenced and judged against evidence",
                &[
                    "By the end of the lesson, the learner should be able to trace the origin and spread of early agriculture in Africa",
                ],
            ),
        ),
    ];

    // Kiswahili is taught in Kiswahili; the language tag switches the whole
    // generated plan into the subject language.
    let mut kiswahili = profile(
        &["soma", "andika", "eleza", "tunga", "husisha", "tamka"],
        &["ufahamu", "sarufi", "msamiati", "insha", "lugha ya heshima"],
        "Lugha fasaha ya Kiswahili; shughuli za kusoma, kuzungumza na kuandika kwa muktadha halisi",
        &[
            "Kufikia mwisho wa somo, mwanafunzi aweze kutunga sentensi sahihi akitumia ngeli ya KI-VI",
        ],
    );
    kiswahili.language = Some("sw".to_string());
    entries.push(("kiswahili".to_string(), kiswahili));

    entries
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn known_subject_resolves_exactly() {
        let registry = TerminologyRegistry::builtin();
        let profile = registry.resolve("Mathematics");
        assert!(profile.action_verbs.contains(&"calculate".to_string()));
        assert!(profile.language.is_none());
    }

    #[test]
    fn misspelled_subject_resolves_fuzzily() {
        let registry = TerminologyRegistry::builtin();
        let profile = registry.resolve("mathematcs");
        assert!(profile.action_verbs.contains(&"calculate".to_string()));
    }

    #[test]
    fn unknown_subject_falls_back_to_generic() {
        let registry = TerminologyRegistry::builtin();
        let profile = registry.resolve("astrology");
        assert!(!profile.action_verbs.is_empty());
        assert!(profile.key_terms.is_empty());
        assert!(profile.example_outcomes.is_empty());
    }

    #[test]
    fn kiswahili_carries_language_tag() {
        let registry = TerminologyRegistry::builtin();
        let profile = registry.resolve(" Kiswahili ");
        assert_eq!(profile.language.as_deref(), Some("sw"));
    }

    #[test]
    fn registry_covers_core_subjects() {
        let registry = TerminologyRegistry::builtin();
        assert_eq!(registry.entries.len(), 15);
        assert!(registry.entries.iter().any(|(name, _)| name == "kiswahili"));
    }
}
