//! Hierarchical content resolution: fuzzy strand match, then fuzzy
//! sub-strand match strictly within the matched strand. Every failure
//! branch degrades to a partial result instead of an error.

use tracing::{debug, info};

use super::matcher::find_best_match;
use super::{CurriculumDocument, ResolutionOutcome, ResolvedContent};

/// Minimum similarity for strand and sub-strand names. Lower than the
/// subject threshold: these are longer phrases, so a typo costs
/// proportionally less edit distance. Empirically tuned default.
pub const STRAND_MATCH_THRESHOLD: u8 = 70;

/// Resolves caller-supplied strand/sub-strand names against a loaded
/// document. Stateless apart from its threshold; safe to share.
#[derive(Debug, Clone, Copy)]
pub struct ContentResolver {
    strand_threshold: u8,
}

impl ContentResolver {
    pub fn new() -> Self {
        Self {
            strand_threshold: STRAND_MATCH_THRESHOLD,
        }
    }

    pub fn with_threshold(strand_threshold: u8) -> Self {
        Self { strand_threshold }
    }

    /// Walk the document hierarchy. The result always carries the best
    /// canonical names found so far; unresolved levels echo caller input.
    pub fn resolve(
        &self,
        document: Option<&CurriculumDocument>,
        strand_name: &str,
        sub_strand_name: &str,
    ) -> ResolvedContent {
        let Some(document) = document else {
            return ResolvedContent::unresolved(
                ResolutionOutcome::NoDocument,
                strand_name,
                sub_strand_name,
            );
        };

        if document.strands.is_empty() {
            return ResolvedContent::unresolved(
                ResolutionOutcome::NoStrandMatch,
                strand_name,
                sub_strand_name,
            );
        }

        let strand_names: Vec<&str> =
            document.strands.iter().map(|s| s.name.as_str()).collect();
        let Some(strand_match) =
            find_best_match(strand_name, &strand_names, self.strand_threshold)
        else {
            debug!(requested = strand_name, "no strand close enough");
            return ResolvedContent::unresolved(
                ResolutionOutcome::NoStrandMatch,
                strand_name,
                sub_strand_name,
            );
        };

        // Consistency lookup against the already-corrected name; exact and
        // case-sensitive on purpose. First equal name wins on duplicates.
        let Some(strand) = document
            .strands
            .iter()
            .find(|s| s.name == strand_match.value)
        else {
            return ResolvedContent::unresolved(
                ResolutionOutcome::NoStrandMatch,
                strand_name,
                sub_strand_name,
            );
        };

        if strand_match.value != strand_name {
            info!(requested = strand_name, matched = strand_match.value, score = strand_match.score, "strand name corrected");
        }

        let sub_strand_names: Vec<&str> =
            strand.sub_strands.iter().map(|s| s.name.as_str()).collect();
        let Some(sub_match) =
            find_best_match(sub_strand_name, &sub_strand_names, self.strand_threshold)
        else {
            debug!(strand = %strand.name, requested = sub_strand_name, "no sub-strand close enough");
            return ResolvedContent::partial(
                ResolutionOutcome::NoSubStrandMatch,
                strand.name.clone(),
                sub_strand_name,
            );
        };

        let Some(sub_strand) = strand
            .sub_strands
            .iter()
            .find(|s| s.name == sub_match.value)
        else {
            return ResolvedContent::partial(
                ResolutionOutcome::NoSubStrandMatch,
                strand.name.clone(),
                sub_strand_name,
            );
        };

        if sub_match.value != sub_strand_name {
            info!(requested = sub_strand_name, matched = sub_match.value, score = sub_match.score, "sub-strand name corrected");
        }

        ResolvedContent::resolved(strand.name.clone(), sub_strand)
    }
}

impl Default for ContentResolver {
    fn default() -> Self {
        Self::new()
    }
}
