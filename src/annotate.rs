// src/annotate.rs

use crate::error::ScreenError;
use crate::types::{AlignmentHit, HitAnnotations};

/// Annotates BLAST hits with off-target binding predictions.
///
/// Four rules are evaluated in a fixed order for each hit, and each rule may
/// read the values the rules before it produced:
///
/// 1. `from_3prime` — the alignment ends exactly at the query's 3' end
///    (`qend == qlen`).
/// 2. `length_pass_3prime` — alignment length at or above the threshold,
///    100% identity, and `from_3prime`.
/// 3. `evalue_pass_3prime` — e-value under the threshold and `from_3prime`.
/// 4. `predicted_bound` — `length_pass_3prime` or `evalue_pass_3prime`.
///
/// The rule order is part of the contract; evaluating them out of order
/// would read unset values.
#[derive(Debug, Clone, Copy)]
pub struct BlastHitAnnotator {
    /// Minimum alignment length for `length_pass_3prime`.
    pub length_threshold: u32,
    /// Exclusive e-value upper bound for `evalue_pass_3prime`.
    pub evalue_threshold: f64,
}

impl Default for BlastHitAnnotator {
    fn default() -> Self {
        Self {
            length_threshold: 12,
            evalue_threshold: 4.0,
        }
    }
}

impl BlastHitAnnotator {
    pub fn new(length_threshold: u32, evalue_threshold: f64) -> Self {
        Self {
            length_threshold,
            evalue_threshold,
        }
    }

    /// Evaluate the rules, in order, for a single hit.
    fn annotate_hit(&self, hit: &AlignmentHit) -> HitAnnotations {
        let from_3prime = hit.qend == hit.qlen;
        let length_pass_3prime =
            hit.length >= self.length_threshold && hit.pident == 100.0 && from_3prime;
        let evalue_pass_3prime = hit.evalue < self.evalue_threshold && from_3prime;
        let predicted_bound = length_pass_3prime || evalue_pass_3prime;

        HitAnnotations {
            from_3prime,
            length_pass_3prime,
            evalue_pass_3prime,
            predicted_bound,
        }
    }

    /// Fill the annotation columns on every hit.
    ///
    /// Hits that were already annotated have their annotations replaced with
    /// freshly computed values; the computation is pure, so re-running with
    /// the same thresholds yields identical results.
    pub fn add_annotations(&self, hits: &mut [AlignmentHit]) {
        for hit in hits.iter_mut() {
            hit.annotations = Some(self.annotate_hit(hit));
        }
        log::info!("Annotated {} BLAST hits", hits.len());
    }

    /// All hits where the query sequence is predicted to bind.
    ///
    /// An empty result is a valid outcome. Hits that have never been
    /// annotated are a precondition violation and fail with
    /// [`ScreenError::MissingAnnotations`] instead.
    pub fn get_predicted_bound<'a>(
        &self,
        hits: &'a [AlignmentHit],
    ) -> Result<Vec<&'a AlignmentHit>, ScreenError> {
        let mut bound = Vec::new();
        for hit in hits {
            let annotations = hit
                .annotations
                .as_ref()
                .ok_or(ScreenError::MissingAnnotations)?;
            if annotations.predicted_bound {
                bound.push(hit);
            }
        }

        log::info!("{} of {} hits predicted to bind", bound.len(), hits.len());
        Ok(bound)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn hit(qseqid: &str, pident: f64, length: u32, qend: u32, qlen: u32, evalue: f64) -> AlignmentHit {
        let _ = env_logger::builder().is_test(true).try_init();
        AlignmentHit {
            qseqid: qseqid.to_string(),
            sseqid: "chr1".to_string(),
            pident,
            length,
            qend,
            qlen,
            evalue,
            annotations: None,
        }
    }

    #[test]
    fn sample_scenario_with_default_thresholds() {
        // qend == qlen, 15bp perfect alignment, weak e-value.
        let mut hits = vec![hit("T1_F", 100.0, 15, 20, 20, 10.0)];
        let annotator = BlastHitAnnotator::default();
        annotator.add_annotations(&mut hits);

        let a = hits[0].annotations.unwrap();
        assert!(a.from_3prime);
        assert!(a.length_pass_3prime);
        assert!(!a.evalue_pass_3prime);
        assert!(a.predicted_bound);
    }

    #[test]
    fn internal_alignment_passes_nothing() {
        // Alignment stops short of the 3' end, so every rule fails even
        // with perfect identity and a strong e-value.
        let mut hits = vec![hit("T1_F", 100.0, 19, 19, 20, 1e-9)];
        BlastHitAnnotator::default().add_annotations(&mut hits);

        let a = hits[0].annotations.unwrap();
        assert_eq!(a, HitAnnotations::default());
    }

    #[test]
    fn evalue_rule_alone_predicts_binding() {
        // Short imperfect alignment at the 3' end with a significant e-value.
        let mut hits = vec![hit("T1_F", 95.0, 10, 20, 20, 0.5)];
        BlastHitAnnotator::default().add_annotations(&mut hits);

        let a = hits[0].annotations.unwrap();
        assert!(a.from_3prime);
        assert!(!a.length_pass_3prime);
        assert!(a.evalue_pass_3prime);
        assert!(a.predicted_bound);
    }

    #[test]
    fn predicted_bound_is_the_or_of_the_pass_rules() {
        let cases = vec![
            hit("a", 100.0, 15, 20, 20, 10.0), // length pass only
            hit("b", 95.0, 10, 20, 20, 0.5),   // evalue pass only
            hit("c", 100.0, 15, 20, 20, 0.5),  // both
            hit("d", 95.0, 10, 20, 20, 10.0),  // neither
            hit("e", 100.0, 15, 10, 20, 0.5),  // not from the 3' end
        ];
        let annotator = BlastHitAnnotator::default();
        for case in &cases {
            let a = annotator.annotate_hit(case);
            assert_eq!(a.predicted_bound, a.length_pass_3prime || a.evalue_pass_3prime);
            assert!(!a.length_pass_3prime || a.from_3prime);
            assert!(!a.evalue_pass_3prime || a.from_3prime);
        }
    }

    #[test]
    fn reannotation_is_idempotent() {
        let mut hits = vec![
            hit("T1_F", 100.0, 15, 20, 20, 10.0),
            hit("T1_R", 95.0, 10, 18, 20, 0.5),
        ];
        let annotator = BlastHitAnnotator::default();
        annotator.add_annotations(&mut hits);
        let first: Vec<_> = hits.iter().map(|h| h.annotations.unwrap()).collect();

        annotator.add_annotations(&mut hits);
        let second: Vec<_> = hits.iter().map(|h| h.annotations.unwrap()).collect();
        assert_eq!(first, second);
    }

    #[test]
    fn filtering_unannotated_hits_is_a_precondition_violation() {
        let hits = vec![hit("T1_F", 100.0, 15, 20, 20, 10.0)];
        let err = BlastHitAnnotator::default()
            .get_predicted_bound(&hits)
            .unwrap_err();
        assert!(matches!(err, ScreenError::MissingAnnotations));
    }

    #[test]
    fn zero_predicted_bound_hits_is_a_valid_result() {
        let mut hits = vec![hit("T1_F", 95.0, 10, 20, 20, 10.0)];
        let annotator = BlastHitAnnotator::default();
        annotator.add_annotations(&mut hits);
        let bound = annotator.get_predicted_bound(&hits).unwrap();
        assert!(bound.is_empty());
    }

    #[test]
    fn thresholds_are_inclusive_and_exclusive_as_specified() {
        let annotator = BlastHitAnnotator::new(12, 4.0);

        // length >= threshold is inclusive.
        let at_length = annotator.annotate_hit(&hit("a", 100.0, 12, 20, 20, 10.0));
        assert!(at_length.length_pass_3prime);

        // evalue < threshold is exclusive.
        let at_evalue = annotator.annotate_hit(&hit("b", 95.0, 10, 20, 20, 4.0));
        assert!(!at_evalue.evalue_pass_3prime);
    }
}
