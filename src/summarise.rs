// src/summarise.rs

use std::collections::BTreeMap;
use std::fmt::Write as FmtWrite;
use std::fs;
use std::path::Path;

use crate::error::ScreenError;
use crate::types::{AlignmentHit, PrimerSummaryRecord, ANNOTATION_NAMES};

/// Reduce annotated per-hit rows to one summary row per primer.
///
/// Hits are grouped by `qseqid` and each group becomes one
/// [`PrimerSummaryRecord`] carrying the group size plus, for every
/// annotation column, the number of hits in the group where it was true.
/// The table is sorted by `predicted_bound` count descending; the sort is
/// stable and groups are built in ascending `qseqid` order, so ties stay
/// alphabetical.
///
/// Primer names are assumed to end in a two-character direction suffix
/// (e.g. `_F`) and to name their target before the first underscore;
/// the convention is the caller's responsibility, nothing validates it here.
///
/// If `output_path` is given the table is also written there as TSV with a
/// header row. Nothing is written, and no records are returned, on any
/// failure path.
pub fn summarise_by_primer(
    hits: &[AlignmentHit],
    output_path: Option<&Path>,
) -> Result<Vec<PrimerSummaryRecord>, ScreenError> {
    let mut groups: BTreeMap<&str, Vec<&AlignmentHit>> = BTreeMap::new();
    for hit in hits {
        if hit.qseqid.is_empty() {
            return Err(ScreenError::DataShape(
                "hit with empty `qseqid` cannot be grouped by primer".to_string(),
            ));
        }
        groups.entry(hit.qseqid.as_str()).or_default().push(hit);
    }

    let mut records = Vec::with_capacity(groups.len());
    for (&qseqid, group) in &groups {
        let mut counts = [0u32; 4];
        for hit in group {
            let annotations = hit
                .annotations
                .as_ref()
                .ok_or(ScreenError::MissingAnnotations)?;
            for (count, flag) in counts.iter_mut().zip(annotations.as_flags()) {
                *count += flag as u32;
            }
        }

        // Pair name drops the 2-char direction suffix: "T1_F" -> "T1".
        let suffix_start = qseqid
            .char_indices()
            .rev()
            .nth(1)
            .map(|(i, _)| i)
            .unwrap_or(0);

        records.push(PrimerSummaryRecord {
            primer_name: qseqid.to_string(),
            primer_pair_name: qseqid[..suffix_start].to_string(),
            target_name: qseqid.split('_').next().unwrap_or(qseqid).to_string(),
            total_alignments: group.len() as u32,
            from_3prime: counts[0],
            length_pass_3prime: counts[1],
            evalue_pass_3prime: counts[2],
            predicted_bound: counts[3],
        });
    }

    // Most predicted-bound hits first.
    records.sort_by(|a, b| b.predicted_bound.cmp(&a.predicted_bound));
    log::debug!("Summarised {} hits into {} primer records", hits.len(), records.len());

    if let Some(path) = output_path {
        fs::write(path, render_summary_table(&records))?;
    }

    Ok(records)
}

/// Render the per-primer summary as TSV with a header row.
pub fn render_summary_table(records: &[PrimerSummaryRecord]) -> String {
    let mut output = String::new();
    output.push_str("primer_name\tprimer_pair_name\ttarget_name\ttotal_alignments");
    for name in ANNOTATION_NAMES {
        output.push('\t');
        output.push_str(name);
    }
    output.push('\n');

    for r in records {
        writeln!(
            output,
            "{}\t{}\t{}\t{}\t{}\t{}\t{}\t{}",
            r.primer_name,
            r.primer_pair_name,
            r.target_name,
            r.total_alignments,
            r.from_3prime,
            r.length_pass_3prime,
            r.evalue_pass_3prime,
            r.predicted_bound
        )
        .unwrap();
    }
    output
}
