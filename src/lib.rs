// src/lib.rs
pub mod annotate;
pub mod blast;
pub mod error;
pub mod primer3;
pub mod summarise;
pub mod types;

use std::fmt::Write as FmtWrite;
use std::path::Path;

pub use crate::annotate::BlastHitAnnotator;
pub use crate::blast::read_blast_hits;
pub use crate::error::ScreenError;
pub use crate::primer3::{
    load_primer_pairs, load_primer_pairs_from_path, Primer, PrimerDirection, PrimerPair,
};
pub use crate::summarise::{render_summary_table, summarise_by_primer};
pub use crate::types::{AlignmentHit, HitAnnotations, PrimerSummaryRecord, ANNOTATION_NAMES};

/// Everything produced by screening one BLAST hit table: the hits with
/// their annotation columns filled in, and the per-primer summary rows.
/// Tables are rendered as text on demand rather than stored.
pub struct ScreenResults {
    /// The input hits, annotated.
    pub hits: Vec<AlignmentHit>,

    /// One row per primer, sorted by predicted-bound count descending.
    pub summary: Vec<PrimerSummaryRecord>,
}

impl ScreenResults {
    /// Generate the annotated hit table (TSV with a header row) on demand.
    ///
    /// Fails with [`ScreenError::MissingAnnotations`] if any hit lacks its
    /// annotation columns, which can only happen on a hand-assembled value.
    pub fn get_annotated_table(&self) -> Result<String, ScreenError> {
        let mut output = String::new();
        output.push_str("qseqid\tsseqid\tpident\tlength\tqend\tqlen\tevalue");
        for name in ANNOTATION_NAMES {
            output.push('\t');
            output.push_str(name);
        }
        output.push('\n');

        for hit in &self.hits {
            let a = hit.annotations.ok_or(ScreenError::MissingAnnotations)?;
            writeln!(
                output,
                "{}\t{}\t{}\t{}\t{}\t{}\t{}\t{}\t{}\t{}\t{}",
                hit.qseqid,
                hit.sseqid,
                hit.pident,
                hit.length,
                hit.qend,
                hit.qlen,
                hit.evalue,
                a.from_3prime,
                a.length_pass_3prime,
                a.evalue_pass_3prime,
                a.predicted_bound
            )
            .unwrap();
        }
        Ok(output)
    }

    /// Generate the per-primer summary table (TSV with a header row) on
    /// demand.
    pub fn get_summary_table(&self) -> String {
        render_summary_table(&self.summary)
    }
}

/// Unified entry point: annotate a BLAST hit table and summarise it per
/// primer.
///
/// If `summary_path` is given, the summary table is also written there as
/// TSV. Fails atomically; no partial results are returned.
pub fn screen_blast_hits(
    mut hits: Vec<AlignmentHit>,
    annotator: &BlastHitAnnotator,
    summary_path: Option<&Path>,
) -> Result<ScreenResults, ScreenError> {
    annotator.add_annotations(&mut hits);
    let summary = summarise::summarise_by_primer(&hits, summary_path)?;
    Ok(ScreenResults { hits, summary })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn hit(qseqid: &str, pident: f64, length: u32, qend: u32, qlen: u32, evalue: f64) -> AlignmentHit {
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
    fn screens_the_worked_example_end_to_end() {
        let hits = vec![hit("T1_F", 100.0, 15, 20, 20, 10.0)];
        let results =
            screen_blast_hits(hits, &BlastHitAnnotator::default(), None).unwrap();

        let a = results.hits[0].annotations.unwrap();
        assert!(a.from_3prime);
        assert!(a.length_pass_3prime);
        assert!(!a.evalue_pass_3prime);
        assert!(a.predicted_bound);

        assert_eq!(results.summary.len(), 1);
        let row = &results.summary[0];
        assert_eq!(row.primer_name, "T1_F");
        assert_eq!(row.primer_pair_name, "T1");
        assert_eq!(row.target_name, "T1");
        assert_eq!(row.total_alignments, 1);
        assert_eq!(row.predicted_bound, 1);
    }

    #[test]
    fn renders_both_tables() {
        let hits = vec![
            hit("T1_F", 100.0, 15, 20, 20, 10.0),
            hit("T1_R", 95.0, 10, 18, 20, 9.0),
        ];
        let results =
            screen_blast_hits(hits, &BlastHitAnnotator::default(), None).unwrap();

        let annotated = results.get_annotated_table().unwrap();
        let mut lines = annotated.lines();
        assert_eq!(
            lines.next().unwrap(),
            "qseqid\tsseqid\tpident\tlength\tqend\tqlen\tevalue\
             \tfrom_3prime\tlength_pass_3prime\tevalue_pass_3prime\tpredicted_bound"
        );
        assert_eq!(
            lines.next().unwrap(),
            "T1_F\tchr1\t100\t15\t20\t20\t10\ttrue\ttrue\tfalse\ttrue"
        );
        assert_eq!(
            lines.next().unwrap(),
            "T1_R\tchr1\t95\t10\t18\t20\t9\tfalse\tfalse\tfalse\tfalse"
        );

        let summary = results.get_summary_table();
        assert!(summary.starts_with("primer_name\t"));
        // T1_F has the predicted-bound hit, so it sorts first.
        assert!(summary.contains("T1_F\tT1\tT1\t1\t1\t1\t0\t1\n"));
        assert!(summary.contains("T1_R\tT1\tT1\t1\t0\t0\t0\t0\n"));
    }

    #[test]
    fn annotated_table_requires_annotations() {
        let results = ScreenResults {
            hits: vec![hit("T1_F", 100.0, 15, 20, 20, 10.0)],
            summary: Vec::new(),
        };
        let err = results.get_annotated_table().unwrap_err();
        assert!(matches!(err, ScreenError::MissingAnnotations));
    }
}
