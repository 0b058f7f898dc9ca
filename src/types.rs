// src/types.rs

/// One BLAST hit, i.e. one row of `-outfmt 6`-style tabular output.
///
/// BLAST's `length` column is the ALIGNMENT length; the full query sequence
/// length is a separate column (`qlen`) that the caller must have requested
/// when running BLAST. The two are kept as distinct fields here: the 3' end
/// check compares `qend` against `qlen`, while the length-threshold check
/// reads `length`.
#[derive(Debug, Clone)]
pub struct AlignmentHit {
    /// Query sequence ID; for primer screening this is the primer name.
    pub qseqid: String,
    /// Subject (reference) sequence ID.
    pub sseqid: String,
    /// Percent identity within the aligned region.
    pub pident: f64,
    /// Alignment length.
    pub length: u32,
    /// Alignment end offset on the query.
    pub qend: u32,
    /// Full query sequence length.
    pub qlen: u32,
    /// Expectation value; lower is more significant.
    pub evalue: f64,
    /// Derived annotation columns; `None` until the annotator has run.
    pub annotations: Option<HitAnnotations>,
}

/// The four derived annotation columns of a BLAST hit, in rule order.
///
/// A rule may read the fields the rules before it have written, so the field
/// order here mirrors the evaluation order in the annotator.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct HitAnnotations {
    /// The alignment reaches the 3' end of the query (`qend == qlen`).
    pub from_3prime: bool,
    /// Long perfect-identity alignment ending at the 3' end.
    pub length_pass_3prime: bool,
    /// Significant e-value for an alignment ending at the 3' end.
    pub evalue_pass_3prime: bool,
    /// `length_pass_3prime` or `evalue_pass_3prime`.
    pub predicted_bound: bool,
}

/// Annotation column names, in evaluation order. Reused verbatim as column
/// headers in both the annotated-hit table and the per-primer summary.
pub const ANNOTATION_NAMES: [&str; 4] = [
    "from_3prime",
    "length_pass_3prime",
    "evalue_pass_3prime",
    "predicted_bound",
];

impl HitAnnotations {
    /// The four values in `ANNOTATION_NAMES` order.
    pub fn as_flags(&self) -> [bool; 4] {
        [
            self.from_3prime,
            self.length_pass_3prime,
            self.evalue_pass_3prime,
            self.predicted_bound,
        ]
    }
}

/// A structured representation of one row in the per-primer summary table,
/// aggregating every BLAST hit of one primer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PrimerSummaryRecord {
    /// The group key, i.e. the `qseqid` shared by the hits.
    pub primer_name: String,
    /// Primer name minus its two-character direction suffix (e.g. `_F`).
    pub primer_pair_name: String,
    /// Primer name up to its first underscore.
    pub target_name: String,
    /// Number of BLAST hits for this primer.
    pub total_alignments: u32,
    /// Hits where `from_3prime` was true.
    pub from_3prime: u32,
    /// Hits where `length_pass_3prime` was true.
    pub length_pass_3prime: u32,
    /// Hits where `evalue_pass_3prime` was true.
    pub evalue_pass_3prime: u32,
    /// Hits where `predicted_bound` was true.
    pub predicted_bound: u32,
}
