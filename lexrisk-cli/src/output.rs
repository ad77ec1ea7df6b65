use anyhow::Result;
use clap::ValueEnum;
use lexrisk::{LexiconRow, RiskAssessment};
use serde_json::json;
use tabled::settings::Style;
use tabled::{Table, Tabled};

/// Output format for CLI results.
#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum OutputFormat {
    /// Human-readable table.
    Table,
    /// JSON output.
    Json,
}

/// Print a risk assessment.
pub fn print_assessment(assessment: &RiskAssessment, format: OutputFormat) -> Result<()> {
    match format {
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(assessment)?);
        }
        OutputFormat::Table => {
            let summary = vec![
                SummaryRow::new("Score", assessment.normalized_score.to_string()),
                SummaryRow::new("Severity", assessment.severity.to_string()),
                SummaryRow::new("Raw score", assessment.raw_score.to_string()),
                SummaryRow::new("Categories", assessment.categories.join(", ")),
            ];
            println!("{}", Table::new(&summary).with(Style::rounded()));

            if assessment.matched_phrases.is_empty() {
                println!("No phrases matched.");
                return Ok(());
            }

            let phrases: Vec<PhraseRow> = assessment
                .matched_phrases
                .iter()
                .enumerate()
                .map(|(i, phrase)| PhraseRow {
                    index: i + 1,
                    phrase: phrase.clone(),
                })
                .collect();
            println!(
                "\nMatched phrases:\n{}",
                Table::new(&phrases).with(Style::rounded())
            );
        }
    }
    Ok(())
}

/// Print lexicon rows.
pub fn print_rows(rows: &[LexiconRow], format: OutputFormat) -> Result<()> {
    match format {
        OutputFormat::Json => {
            let json_rows: Vec<serde_json::Value> = rows
                .iter()
                .map(|r| {
                    json!({
                        "score": r.score,
                        "phrase": r.phrase,
                        "category": r.category,
                    })
                })
                .collect();
            println!("{}", serde_json::to_string_pretty(&json_rows)?);
        }
        OutputFormat::Table => {
            if rows.is_empty() {
                println!("The lexicon is empty.");
                return Ok(());
            }

            let table_rows: Vec<LexiconTableRow> = rows
                .iter()
                .map(|r| LexiconTableRow {
                    score: r.score,
                    phrase: r.phrase.clone(),
                    category: r.category.clone(),
                })
                .collect();
            println!("{}", Table::new(&table_rows).with(Style::rounded()));
            println!("{} entries", rows.len());
        }
    }
    Ok(())
}

/// Print how many entries a command added.
pub fn print_added(added: usize, format: OutputFormat) -> Result<()> {
    match format {
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(&json!({ "added": added }))?);
        }
        OutputFormat::Table => match added {
            0 => println!("No new entries added."),
            1 => println!("1 entry added."),
            n => println!("{n} entries added."),
        },
    }
    Ok(())
}

// --- Helper types ---

#[derive(Tabled)]
struct SummaryRow {
    #[tabled(rename = "Field")]
    field: &'static str,
    #[tabled(rename = "Value")]
    value: String,
}

impl SummaryRow {
    fn new(field: &'static str, value: String) -> Self {
        SummaryRow { field, value }
    }
}

#[derive(Tabled)]
struct PhraseRow {
    #[tabled(rename = "#")]
    index: usize,
    #[tabled(rename = "Phrase")]
    phrase: String,
}

#[derive(Tabled)]
struct LexiconTableRow {
    #[tabled(rename = "Score")]
    score: u32,
    #[tabled(rename = "Phrase")]
    phrase: String,
    #[tabled(rename = "Category")]
    category: String,
}
