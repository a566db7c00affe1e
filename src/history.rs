use std::fs::{self, File, OpenOptions};
use std::path::Path;

use anyhow::Context;
use chrono::Local;
use csv::{ReaderBuilder, WriterBuilder};
use serde::{Deserialize, Serialize};

use crate::engine::Analysis;

/// One analyzed submission as stored in the history CSV.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistoryRecord {
    #[serde(rename = "Timestamp")]
    pub timestamp: String,
    #[serde(rename = "TopSport")]
    pub top_sport: String,
    #[serde(rename = "Score")]
    pub score: f64,
    #[serde(rename = "Recommendations")]
    pub recommendations: String,
    #[serde(rename = "Profile")]
    pub profile: String,
}

impl HistoryRecord {
    pub fn from_analysis(analysis: &Analysis) -> anyhow::Result<Self> {
        let best = analysis.recommendations.first();
        Ok(Self {
            timestamp: Local::now().format("%Y-%m-%d %H:%M:%S").to_string(),
            top_sport: best.map(|r| r.sport.clone()).unwrap_or_default(),
            score: best.map(|r| r.score).unwrap_or(0.0),
            recommendations: analysis
                .recommendations
                .iter()
                .map(|r| r.sport.as_str())
                .collect::<Vec<_>>()
                .join(";"),
            profile: serde_json::to_string(&analysis.profile)?,
        })
    }
}

/// Appends a record, writing the header only when the file is new or empty.
pub fn append(path: &Path, record: &HistoryRecord) -> anyhow::Result<()> {
    let needs_header = fs::metadata(path).map(|m| m.len() == 0).unwrap_or(true);

    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .with_context(|| format!("failed to open history file {}", path.display()))?;

    let mut wtr = WriterBuilder::new().has_headers(needs_header).from_writer(file);
    wtr.serialize(record)?;
    wtr.flush()?;
    tracing::debug!(path = %path.display(), sport = %record.top_sport, "history record appended");
    Ok(())
}

pub fn read(path: &Path) -> anyhow::Result<Vec<HistoryRecord>> {
    let file = File::open(path)
        .with_context(|| format!("failed to open history file {}", path.display()))?;
    let mut rdr = ReaderBuilder::new().has_headers(true).from_reader(file);
    let mut records = Vec::new();
    for result in rdr.deserialize() {
        let record: HistoryRecord = result?;
        records.push(record);
    }
    Ok(records)
}
