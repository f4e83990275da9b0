//! Weight tables: a header line followed by one `index, weight` row per
//! parameter.
//!
//! ```text
//! GeneIndex;Weight
//! 0;0.4213
//! 1;-0.07
//! ```
use roamer::tables::Delimiter;
use roamer::{GeneticConfig, Genome, GenomeError};

use log::warn;
use rand::Rng;
use thiserror::Error;

use std::fs::File;
use std::io::{self, BufRead, BufReader, BufWriter, Write};
use std::num::ParseFloatError;
use std::path::Path;

pub const HEADER: [&str; 2] = ["GeneIndex", "Weight"];

#[derive(Debug, Error)]
pub enum WeightFileError {
    #[error(transparent)]
    Io(#[from] io::Error),
    #[error("weight table is empty")]
    MissingHeader,
    #[error("line {line}: expected `index{delimiter}weight`, found {content:?}")]
    MalformedRow {
        line: usize,
        content: String,
        delimiter: char,
    },
    #[error("line {line}: expected gene index {expected}, found {found}")]
    IndexMismatch {
        line: usize,
        expected: usize,
        found: usize,
    },
    #[error("line {line}: invalid weight")]
    InvalidWeight {
        line: usize,
        source: ParseFloatError,
    },
    #[error("expected {expected} weights, found {found}")]
    CountMismatch { expected: usize, found: usize },
    #[error(transparent)]
    Genome(#[from] GenomeError),
}

/// Writes `weights` as a table, header first.
pub fn write_weights<W: Write>(
    mut writer: W,
    weights: &[f32],
    delimiter: Delimiter,
) -> io::Result<()> {
    let d = delimiter.as_char();
    writeln!(writer, "{}{}{}", HEADER[0], d, HEADER[1])?;
    for (index, weight) in weights.iter().enumerate() {
        writeln!(writer, "{}{}{}", index, d, weight)?;
    }
    writer.flush()
}

/// Reads a table written by [`write_weights`].
///
/// The first line is taken as the header. Blank lines are ignored,
/// field whitespace is trimmed, and rows must be numbered `0, 1, ..`
/// in order. Fails unless exactly `expected` weights are present.
///
/// # Examples
/// ```
/// use roamer::tables::Delimiter;
/// use roamer_nn::weights::{read_weights, write_weights};
///
/// let mut table = Vec::new();
/// write_weights(&mut table, &[0.5, -0.25, 1.0], Delimiter::Comma).unwrap();
/// assert_eq!(String::from_utf8_lossy(&table), "GeneIndex,Weight\n0,0.5\n1,-0.25\n2,1\n");
///
/// let weights = read_weights(&table[..], Delimiter::Comma, 3).unwrap();
/// assert_eq!(weights, vec![0.5, -0.25, 1.0]);
/// assert!(read_weights(&table[..], Delimiter::Comma, 4).is_err());
/// ```
pub fn read_weights<R: BufRead>(
    reader: R,
    delimiter: Delimiter,
    expected: usize,
) -> Result<Vec<f32>, WeightFileError> {
    let mut lines = reader.lines();
    match lines.next() {
        Some(header) => {
            header?;
        }
        None => return Err(WeightFileError::MissingHeader),
    }

    let mut weights = Vec::with_capacity(expected);
    for (i, line) in lines.enumerate() {
        let line_number = i + 2;
        let line = line?;
        if line.trim().is_empty() {
            continue;
        }
        let fields = delimiter.split(&line);
        let malformed = || WeightFileError::MalformedRow {
            line: line_number,
            content: line.clone(),
            delimiter: delimiter.as_char(),
        };
        if fields.len() != 2 {
            return Err(malformed());
        }
        let index: usize = fields[0].parse().map_err(|_| malformed())?;
        if index != weights.len() {
            return Err(WeightFileError::IndexMismatch {
                line: line_number,
                expected: weights.len(),
                found: index,
            });
        }
        let weight: f32 = fields[1]
            .parse()
            .map_err(|source| WeightFileError::InvalidWeight {
                line: line_number,
                source,
            })?;
        weights.push(weight);
    }

    if weights.len() != expected {
        return Err(WeightFileError::CountMismatch {
            expected,
            found: weights.len(),
        });
    }
    Ok(weights)
}

/// Writes a genome's genes to `path`, replacing any existing file.
pub fn save_genome(
    path: impl AsRef<Path>,
    genome: &Genome,
    delimiter: Delimiter,
) -> Result<(), WeightFileError> {
    let file = File::create(path)?;
    write_weights(BufWriter::new(file), genome.genes(), delimiter)?;
    Ok(())
}

/// Loads a genome of `config.genome_length` genes from `path`.
pub fn load_genome(
    path: impl AsRef<Path>,
    config: &GeneticConfig,
    delimiter: Delimiter,
) -> Result<Genome, WeightFileError> {
    let file = File::open(path)?;
    let weights = read_weights(BufReader::new(file), delimiter, config.genome_length)?;
    Ok(Genome::from_genes(weights, config)?)
}

/// Loads a genome from `path`, falling back to a random genome
/// if the file is missing or malformed.
pub fn load_genome_or_random<R: Rng + ?Sized>(
    path: impl AsRef<Path>,
    config: &GeneticConfig,
    delimiter: Delimiter,
    rng: &mut R,
) -> Genome {
    let path = path.as_ref();
    match load_genome(path, config, delimiter) {
        Ok(genome) => genome,
        Err(e) => {
            warn!(
                "could not load weights from {}: {}; using random weights",
                path.display(),
                e
            );
            Genome::new(config, rng)
        }
    }
}
