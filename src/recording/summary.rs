use std::{
    fs::{File, OpenOptions},
    path::{Path, PathBuf},
};

use anyhow::{Context, Result};
use clap::ValueEnum;
use csv::Trim;
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::{
    common::{Observation, Units},
    session::{Record, Session},
};

/// [WritePolicy] selects how a sitting's records are combined with
/// whatever the summary file already holds. The two policies carry
/// different column sets and are never merged.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum WritePolicy {
    /// Keep existing rows and continue numbering after them.
    Append,

    /// Replace the whole file and number from 1.
    Overwrite,
}

/// Deterministic summary-file name for a given round count.
pub fn output_filename(rounds: u32) -> String {
    format!("frequencies_{rounds}.csv")
}

/// Row shape under the append policy.
#[derive(Debug, PartialEq, Deserialize, Serialize)]
struct AppendRow {
    #[serde(rename = "Observation")]
    observation: Observation,

    #[serde(rename = "Hand")]
    hand: String,

    #[serde(rename = "Last Won Round")]
    last_round: u32,

    #[serde(rename = "Success/Failure")]
    success: u8,

    #[serde(rename = "Win in b")]
    win: Option<Units>,
}

impl AppendRow {
    const HEADER: [&'static str; 5] = [
        "Observation",
        "Hand",
        "Last Won Round",
        "Success/Failure",
        "Win in b",
    ];

    fn from_record(observation: Observation, record: &Record) -> Self {
        Self {
            observation,
            hand: record.outcome.label().to_string(),
            last_round: record.last_round,
            success: u8::from(record.success),
            win: Some(record.result),
        }
    }
}

/// Row shape under the overwrite policy. Same values per record as
/// [AppendRow], different column names.
#[derive(Debug, PartialEq, Deserialize, Serialize)]
struct OverwriteRow {
    #[serde(rename = "Observation")]
    observation: Observation,

    #[serde(rename = "Hand")]
    hand: String,

    #[serde(rename = "Last Double or Nothing")]
    last_round: u32,

    #[serde(rename = "Success/Failure")]
    success: u8,

    #[serde(rename = "Cumulative Winnings (b)")]
    win: Option<Units>,
}

impl OverwriteRow {
    const HEADER: [&'static str; 5] = [
        "Observation",
        "Hand",
        "Last Double or Nothing",
        "Success/Failure",
        "Cumulative Winnings (b)",
    ];

    fn from_record(observation: Observation, record: &Record) -> Self {
        Self {
            observation,
            hand: record.outcome.label().to_string(),
            last_round: record.last_round,
            success: u8::from(record.success),
            win: Some(record.result),
        }
    }
}

/// [StoredRecord] is one data row read back from a summary file,
/// independent of the policy that wrote it. A missing or empty result
/// field reads as 0.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredRecord {
    pub observation: Observation,
    pub hand: String,
    pub last_round: u32,
    pub success: bool,
    pub win: Units,
}

impl From<AppendRow> for StoredRecord {
    fn from(row: AppendRow) -> Self {
        Self {
            observation: row.observation,
            hand: row.hand,
            last_round: row.last_round,
            success: row.success == 1,
            win: row.win.unwrap_or_default(),
        }
    }
}

impl From<OverwriteRow> for StoredRecord {
    fn from(row: OverwriteRow) -> Self {
        Self {
            observation: row.observation,
            hand: row.hand,
            last_round: row.last_round,
            success: row.success == 1,
            win: row.win.unwrap_or_default(),
        }
    }
}

/// [Summarizer] owns the target file and write policy for one sitting.
#[derive(Debug, Clone)]
pub struct Summarizer {
    path: PathBuf,
    filename: String,
    policy: WritePolicy,
}

impl Summarizer {
    pub fn new(out_dir: &Path, rounds: u32, policy: WritePolicy) -> Self {
        let filename = output_filename(rounds);
        Self {
            path: out_dir.join(&filename),
            filename,
            policy,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Bare file name, as shown to the user.
    pub fn filename(&self) -> &str {
        &self.filename
    }

    pub fn policy(&self) -> WritePolicy {
        self.policy
    }

    /// Data rows already present in the target file; 0 when the file is
    /// absent. Under the append policy numbering resumes right after them.
    pub fn existing_observations(&self) -> Result<u64> {
        if !self.path.exists() {
            return Ok(0);
        }
        let file = File::open(&self.path)
            .with_context(|| format!("open {}", self.path.display()))?;
        let mut rdr = csv::ReaderBuilder::new()
            .trim(Trim::All)
            .flexible(true)
            .from_reader(file);
        let rows = rdr.records().flatten().count() as u64;
        debug!(path = %self.path.display(), rows, "probed existing summary rows");
        Ok(rows)
    }

    /// Writes every buffered record under the configured policy and
    /// returns the number of data rows written.
    pub fn write(&self, session: &Session) -> Result<usize> {
        let rows = match self.policy {
            WritePolicy::Append => self.append(session)?,
            WritePolicy::Overwrite => self.overwrite(session)?,
        };
        debug!(path = %self.path.display(), rows, policy = ?self.policy, "wrote summary");
        Ok(rows)
    }

    fn append(&self, session: &Session) -> Result<usize> {
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .with_context(|| format!("open {} for append", self.path.display()))?;
        // Header goes in only when there is nothing in the file yet.
        let needs_header = file
            .metadata()
            .with_context(|| format!("stat {}", self.path.display()))?
            .len()
            == 0;
        let mut writer = csv::WriterBuilder::new()
            .has_headers(false)
            .from_writer(file);
        if needs_header {
            writer.write_record(AppendRow::HEADER)?;
        }
        let mut observation = session.first_observation();
        for record in session.records() {
            writer.serialize(AppendRow::from_record(observation, record))?;
            observation.increase_by_one();
        }
        writer
            .flush()
            .with_context(|| format!("flush {}", self.path.display()))?;
        Ok(session.records().len())
    }

    fn overwrite(&self, session: &Session) -> Result<usize> {
        let file = File::create(&self.path)
            .with_context(|| format!("create {}", self.path.display()))?;
        let mut writer = csv::WriterBuilder::new()
            .has_headers(false)
            .from_writer(file);
        writer.write_record(OverwriteRow::HEADER)?;
        let mut observation = Observation(1);
        for record in session.records() {
            writer.serialize(OverwriteRow::from_record(observation, record))?;
            observation.increase_by_one();
        }
        writer
            .flush()
            .with_context(|| format!("flush {}", self.path.display()))?;
        Ok(session.records().len())
    }

    /// Reads every data row back in file order.
    pub fn read_rows(&self) -> Result<Vec<StoredRecord>> {
        if !self.path.exists() {
            return Ok(Vec::new());
        }
        let file = File::open(&self.path)
            .with_context(|| format!("open {}", self.path.display()))?;
        let mut rdr = csv::ReaderBuilder::new()
            .trim(Trim::All)
            .flexible(true)
            .from_reader(file);
        let rows = match self.policy {
            WritePolicy::Append => rdr
                .deserialize::<AppendRow>()
                .flatten()
                .map(StoredRecord::from)
                .collect(),
            WritePolicy::Overwrite => rdr
                .deserialize::<OverwriteRow>()
                .flatten()
                .map(StoredRecord::from)
                .collect(),
        };
        Ok(rows)
    }
}
