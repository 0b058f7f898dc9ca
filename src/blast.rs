use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;
use std::str::FromStr;

use flate2::read::MultiGzDecoder;

use crate::error::ScreenError;
use crate::types::AlignmentHit;

// Column offsets for `-outfmt "6 std qlen"`:
// qseqid sseqid pident length mismatch gapopen qstart qend sstart send
// evalue bitscore qlen
const COL_QSEQID: usize = 0;
const COL_SSEQID: usize = 1;
const COL_PIDENT: usize = 2;
const COL_LENGTH: usize = 3;
const COL_QEND: usize = 7;
const COL_EVALUE: usize = 10;
const COL_QLEN: usize = 12;
const MIN_COLUMNS: usize = 13;

/// Read a BLAST tabular output file into hit records, `.gz` transparently.
///
/// The file must have been produced with `-outfmt "6 std qlen"` (the twelve
/// standard columns plus the full query length); without the extra column
/// there is no way to tell whether an alignment reaches the query's 3' end.
/// Comment lines (`-outfmt 7` style) and blank lines are skipped, but a
/// short or unparsable data row fails the whole read: a hit table that
/// silently loses rows would skew every downstream count.
pub fn read_blast_hits<P: AsRef<Path>>(path: P) -> Result<Vec<AlignmentHit>, ScreenError> {
    let path = path.as_ref();
    let f = File::open(path)?;

    let is_gz = path
        .extension()
        .map(|ext| ext == "gz")
        .unwrap_or(false);

    let reader: Box<dyn BufRead> = if is_gz {
        Box::new(BufReader::new(MultiGzDecoder::new(f)))
    } else {
        Box::new(BufReader::new(f))
    };
    log::debug!("Reading BLAST tabular output from {}", path.display());

    let mut hits = Vec::new();
    for (lineno, line_result) in reader.lines().enumerate() {
        let line = line_result?;
        if line.is_empty() || line.starts_with('#') {
            continue;
        }

        let fields: Vec<&str> = line.split('\t').collect();
        if fields.len() < MIN_COLUMNS {
            return Err(ScreenError::DataShape(format!(
                "line {}: expected at least {} tab-separated columns, found {}",
                lineno + 1,
                MIN_COLUMNS,
                fields.len()
            )));
        }

        hits.push(AlignmentHit {
            qseqid: fields[COL_QSEQID].to_string(),
            sseqid: fields[COL_SSEQID].to_string(),
            pident: parse_field(fields[COL_PIDENT], "pident", lineno)?,
            length: parse_field(fields[COL_LENGTH], "length", lineno)?,
            qend: parse_field(fields[COL_QEND], "qend", lineno)?,
            qlen: parse_field(fields[COL_QLEN], "qlen", lineno)?,
            evalue: parse_field(fields[COL_EVALUE], "evalue", lineno)?,
            annotations: None,
        });
    }

    log::info!("Loaded {} BLAST hits from {}", hits.len(), path.display());
    Ok(hits)
}

fn parse_field<T: FromStr>(raw: &str, name: &str, lineno: usize) -> Result<T, ScreenError> {
    raw.trim().parse().map_err(|_| {
        ScreenError::DataShape(format!(
            "line {}: bad `{}` value {:?}",
            lineno + 1,
            name,
            raw
        ))
    })
}
