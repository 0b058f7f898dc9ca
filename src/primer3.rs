// src/primer3.rs

use std::fmt;
use std::fs::File;
use std::hash::{Hash, Hasher};
use std::io::Read;
use std::path::Path;
use std::str::FromStr;

use ahash::AHashMap;
use flate2::read::MultiGzDecoder;

use crate::error::ScreenError;

const NUM_RETURNED_KEY: &str = "PRIMER_PAIR_NUM_RETURNED";

/// Primer orientation: forward or reverse.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PrimerDirection {
    F,
    R,
}

impl PrimerDirection {
    /// The key fragment primer3 uses for this direction.
    fn primer3_key(&self) -> &'static str {
        match self {
            PrimerDirection::F => "LEFT",
            PrimerDirection::R => "RIGHT",
        }
    }
}

impl fmt::Display for PrimerDirection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PrimerDirection::F => write!(f, "F"),
            PrimerDirection::R => write!(f, "R"),
        }
    }
}

impl FromStr for PrimerDirection {
    type Err = ScreenError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "F" => Ok(PrimerDirection::F),
            "R" => Ok(PrimerDirection::R),
            other => Err(ScreenError::InvalidArgument(format!(
                "primer direction must be 'F' or 'R', got {:?}",
                other
            ))),
        }
    }
}

/// One primer as reported by primer3.
#[derive(Debug, Clone)]
pub struct Primer {
    pub seq: String,
    pub direction: PrimerDirection,
    /// 0-based start offset on the template.
    pub start: u32,
    pub length: u32,
    /// Melting temperature, passed through unmodified.
    pub tm: f64,
    /// GC percent, passed through unmodified.
    pub gc: f64,
    /// Target this primer amplifies. primer3 knows nothing about targets;
    /// a caller attaches one later, if at all.
    pub target: Option<String>,
}

/// A forward/reverse primer pair plus primer3's pair-level metrics.
///
/// Equality and hashing use `pair_id` only, which encodes the sequence,
/// start and length of both primers. Two pairs built from identical primers
/// are therefore the same pair even when their penalty scores differ, so a
/// `HashSet<PrimerPair>` deduplicates on sequence and position alone.
#[derive(Debug, Clone)]
pub struct PrimerPair {
    pub forward: Primer,
    pub reverse: Primer,
    /// Amplicon length in bp.
    pub product_bp: u32,
    pub pair_penalty: f64,
    pub target: Option<String>,
    pair_id: String,
}

impl PrimerPair {
    pub fn new(forward: Primer, reverse: Primer, product_bp: u32, pair_penalty: f64) -> Self {
        let pair_id = format!(
            "{}-{}-{}+{}-{}-{}",
            forward.seq, forward.start, forward.length, reverse.seq, reverse.start, reverse.length
        );
        Self {
            forward,
            reverse,
            product_bp,
            pair_penalty,
            target: None,
            pair_id,
        }
    }

    /// Identity string for the pair, derived from both primers' sequence,
    /// start and length at construction time.
    pub fn pair_id(&self) -> &str {
        &self.pair_id
    }

    /// The primer with the given orientation.
    pub fn primer(&self, direction: PrimerDirection) -> &Primer {
        match direction {
            PrimerDirection::F => &self.forward,
            PrimerDirection::R => &self.reverse,
        }
    }

    /// Attach a target to the pair and to both primers.
    pub fn set_target(&mut self, target: &str) {
        self.target = Some(target.to_string());
        self.forward.target = Some(target.to_string());
        self.reverse.target = Some(target.to_string());
    }
}

impl PartialEq for PrimerPair {
    fn eq(&self, other: &Self) -> bool {
        self.pair_id == other.pair_id
    }
}

impl Eq for PrimerPair {}

impl Hash for PrimerPair {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.pair_id.hash(state);
    }
}

/// Parse the full text of a primer3 report into primer pairs.
///
/// Lines are scanned until the `PRIMER_PAIR_NUM_RETURNED` marker; a report
/// without it is malformed. A declared count of zero yields an empty list.
/// Otherwise the remaining lines become a flat `KEY=VALUE` dictionary
/// (values trimmed, duplicate keys keep the last value seen), from which
/// pairs `0..N` are extracted in index order, exactly as primer3 ranked
/// them. A missing or unparsable key for a declared index aborts the whole
/// parse; no partial list is returned.
pub fn load_primer_pairs(report: &str) -> Result<Vec<PrimerPair>, ScreenError> {
    let mut lines = report.lines();

    let n_returned = loop {
        let line = lines.next().ok_or_else(|| {
            ScreenError::Primer3Format(format!(
                "report ended before a `{}` line",
                NUM_RETURNED_KEY
            ))
        })?;
        if let Some((key, value)) = line.split_once('=') {
            if key == NUM_RETURNED_KEY {
                break value.trim().parse::<usize>().map_err(|_| {
                    ScreenError::Primer3Format(format!(
                        "bad `{}` value {:?}",
                        NUM_RETURNED_KEY,
                        value.trim()
                    ))
                })?;
            }
        }
    };

    if n_returned == 0 {
        return Ok(Vec::new());
    }

    // Everything after the marker is a flat dictionary; last key wins.
    let mut dict: AHashMap<&str, &str> = AHashMap::new();
    for line in lines {
        if let Some((key, value)) = line.split_once('=') {
            dict.insert(key, value.trim());
        }
    }

    let mut pairs = Vec::with_capacity(n_returned);
    for ix in 0..n_returned {
        let forward = extract_primer(&dict, ix, PrimerDirection::F)?;
        let reverse = extract_primer(&dict, ix, PrimerDirection::R)?;
        let product_bp = parse_value(&dict, &format!("PRIMER_PAIR_{}_PRODUCT_SIZE", ix))?;
        let pair_penalty = parse_value(&dict, &format!("PRIMER_PAIR_{}_PENALTY", ix))?;
        pairs.push(PrimerPair::new(forward, reverse, product_bp, pair_penalty));
    }

    log::debug!("Parsed {} primer pairs from primer3 report", pairs.len());
    Ok(pairs)
}

/// Read a primer3 report file and parse it, `.gz` transparently.
pub fn load_primer_pairs_from_path<P: AsRef<Path>>(
    path: P,
) -> Result<Vec<PrimerPair>, ScreenError> {
    let path = path.as_ref();
    let f = File::open(path)?;

    let is_gz = path
        .extension()
        .map(|ext| ext == "gz")
        .unwrap_or(false);

    let mut reader: Box<dyn Read> = if is_gz {
        Box::new(MultiGzDecoder::new(f))
    } else {
        Box::new(f)
    };

    let mut report = String::new();
    reader.read_to_string(&mut report)?;
    log::debug!("Read primer3 report from {}", path.display());
    load_primer_pairs(&report)
}

fn extract_primer(
    dict: &AHashMap<&str, &str>,
    ix: usize,
    direction: PrimerDirection,
) -> Result<Primer, ScreenError> {
    let base = format!("PRIMER_{}_{}", direction.primer3_key(), ix);

    // Position key holds "<start>,<length>".
    let position = lookup(dict, &base)?;
    let (start, length) = position.split_once(',').ok_or_else(|| {
        ScreenError::Primer3Format(format!(
            "`{}` should be `<start>,<length>`, got {:?}",
            base, position
        ))
    })?;

    Ok(Primer {
        seq: lookup(dict, &format!("{}_SEQUENCE", base))?.to_string(),
        direction,
        start: parse_number(start, &base)?,
        length: parse_number(length, &base)?,
        tm: parse_value(dict, &format!("{}_TM", base))?,
        gc: parse_value(dict, &format!("{}_GC_PERCENT", base))?,
        target: None,
    })
}

fn lookup<'a>(dict: &AHashMap<&'a str, &'a str>, key: &str) -> Result<&'a str, ScreenError> {
    dict.get(key)
        .copied()
        .ok_or_else(|| ScreenError::Primer3Format(format!("missing key `{}`", key)))
}

fn parse_value<T: FromStr>(dict: &AHashMap<&str, &str>, key: &str) -> Result<T, ScreenError> {
    let raw = lookup(dict, key)?;
    raw.parse()
        .map_err(|_| ScreenError::Primer3Format(format!("bad value {:?} for `{}`", raw, key)))
}

fn parse_number<T: FromStr>(raw: &str, key: &str) -> Result<T, ScreenError> {
    raw.trim()
        .parse()
        .map_err(|_| ScreenError::Primer3Format(format!("bad number {:?} in `{}`", raw, key)))
}
