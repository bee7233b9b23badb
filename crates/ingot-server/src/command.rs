// Command execution for the `ingot` binary

use std::path::PathBuf;

use tokio::io::AsyncReadExt;
use tracing::{error, info};

use ingot_common::{SaveOutcome, content_preview};

use crate::model::config::Command;
use crate::startup::Application;

/// Totals for one ingest run
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct IngestSummary {
    pub saved: usize,
    pub duplicate: usize,
    pub contended: usize,
    pub failed: usize,
}

pub async fn run(app: &Application, command: &Command) -> anyhow::Result<()> {
    match command {
        Command::Ingest { files } => {
            let contents = read_contents(files).await?;
            let summary = ingest(app, &contents).await;
            println!(
                "saved={} duplicate={} contended={} failed={}",
                summary.saved, summary.duplicate, summary.contended, summary.failed
            );
            if summary.failed > 0 {
                anyhow::bail!("{} submissions failed", summary.failed);
            }
            Ok(())
        }
        Command::List => {
            for item in app.service.get_all_items().await? {
                println!("{}\t{}", item.id, item.content);
            }
            Ok(())
        }
    }
}

/// Submit every content concurrently and print one line per input
pub async fn ingest(app: &Application, contents: &[String]) -> IngestSummary {
    let mut summary = IngestSummary::default();

    info!(count = contents.len(), "Ingesting");
    let results = app.service.save_items(contents).await;

    for (content, result) in contents.iter().zip(results) {
        match result {
            Ok(result) => {
                match result.outcome {
                    SaveOutcome::Saved { .. } => summary.saved += 1,
                    SaveOutcome::Duplicate => summary.duplicate += 1,
                    SaveOutcome::Contended => summary.contended += 1,
                }
                println!("{}", result.message);
            }
            Err(e) => {
                summary.failed += 1;
                let content = content_preview(content);
                error!(content = %content, error = %e, "Ingest failed");
                println!("failed to save {}: {}", content, e);
            }
        }
    }

    summary
}

async fn read_contents(files: &[PathBuf]) -> anyhow::Result<Vec<String>> {
    let mut text = String::new();
    if files.is_empty() {
        tokio::io::stdin().read_to_string(&mut text).await?;
    } else {
        for file in files {
            text.push_str(&tokio::fs::read_to_string(file).await?);
            text.push('\n');
        }
    }
    Ok(parse_contents(&text))
}

/// One content per non-empty line, kept byte-exact apart from the line ending
pub fn parse_contents(text: &str) -> Vec<String> {
    text.lines()
        .filter(|line| !line.is_empty())
        .map(str::to_string)
        .collect()
}
