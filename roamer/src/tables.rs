//! Delimited text tables written during evolution.
use serde::{Deserialize, Serialize};

use std::io::{self, Write};

/// Field separator of a table.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum Delimiter {
    Comma,
    #[default]
    Semicolon,
}

impl Delimiter {
    pub fn as_char(self) -> char {
        match self {
            Delimiter::Comma => ',',
            Delimiter::Semicolon => ';',
        }
    }

    /// Splits `line` into trimmed fields.
    ///
    /// # Examples
    /// ```
    /// use roamer::tables::Delimiter;
    ///
    /// assert_eq!(Delimiter::Semicolon.split(" 3;  0.25 "), vec!["3", "0.25"]);
    /// ```
    pub fn split(self, line: &str) -> Vec<&str> {
        line.split(self.as_char()).map(str::trim).collect()
    }
}

/// Per-individual fitness history, one row per genome per generation.
///
/// ```text
/// Generation;Fitness
/// 0;0.4213
/// 0;15.8
/// ```
pub struct FitnessLog<W: Write> {
    writer: W,
    delimiter: Delimiter,
}

impl<W: Write> FitnessLog<W> {
    pub const HEADER: [&'static str; 2] = ["Generation", "Fitness"];

    /// Starts a new log, writing the header row.
    pub fn new(mut writer: W, delimiter: Delimiter) -> io::Result<FitnessLog<W>> {
        writeln!(
            writer,
            "{}{}{}",
            Self::HEADER[0],
            delimiter.as_char(),
            Self::HEADER[1]
        )?;
        Ok(FitnessLog { writer, delimiter })
    }

    /// Continues a log that already has a header.
    pub fn resume(writer: W, delimiter: Delimiter) -> FitnessLog<W> {
        FitnessLog { writer, delimiter }
    }

    /// Appends one row per fitness value and flushes.
    pub fn append(
        &mut self,
        generation: usize,
        fitness: impl IntoIterator<Item = f32>,
    ) -> io::Result<()> {
        for value in fitness {
            writeln!(self.writer, "{}{}{}", generation, self.delimiter.as_char(), value)?;
        }
        self.writer.flush()
    }

    pub fn into_inner(self) -> W {
        self.writer
    }
}
