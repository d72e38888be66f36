//! Markdown export of a finished (or in-progress) run.

use std::path::Path;

use chrono::{DateTime, Local, NaiveDate};

use crate::Transcript;

const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

pub fn render_markdown(transcript: &Transcript) -> String {
    let mut out = format!(
        "# Chat on Topic: {}\n\n**Start Time:** {}\n**Finish Time:** {}\n\n**Agent 1 Model:** {}\n**Agent 2 Model:** {}\n\n---\n\n",
        transcript.topic,
        format_instant(transcript.started_at, "Not started"),
        format_instant(transcript.ended_at, "Not finished"),
        transcript.agent_a_model,
        transcript.agent_b_model,
    );

    let blocks = transcript
        .entries
        .iter()
        .map(|entry| {
            format!(
                "**{}** ({})\n{}",
                entry.speaker,
                entry.timestamp.format("%H:%M:%S"),
                entry.content
            )
        })
        .collect::<Vec<_>>();
    out.push_str(&blocks.join("\n\n"));
    out.push('\n');
    out
}

pub fn default_export_file_name(date: NaiveDate) -> String {
    format!("chat_{}.md", date.format("%Y%m%d"))
}

pub fn write_markdown(path: &Path, transcript: &Transcript) -> std::io::Result<()> {
    std::fs::write(path, render_markdown(transcript))
}

fn format_instant(instant: Option<DateTime<Local>>, missing: &str) -> String {
    instant
        .map(|instant| instant.format(TIMESTAMP_FORMAT).to_string())
        .unwrap_or_else(|| missing.to_string())
}
