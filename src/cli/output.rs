// src/cli/output.rs
//
// Terminal output for CLI results

use std::path::Path;

use colorful::Colorful;

use crate::config::DatasetPreset;
use crate::index::IndexGenerationReport;
use crate::pipeline::{CheckReport, RunSummary};
use crate::search::SearchHit;
use crate::stats::CorpusStats;

const RULE: &str = "------------------------------------";

pub fn print_run_summary(summary: &RunSummary) {
    println!(
        "{} {} row(s) written to {}",
        "✓".green(),
        summary.written,
        summary.out_file.display().to_string().cyan()
    );
    if summary.capped {
        println!("  Stopped early at the sample cap");
    }
    if !summary.skipped.is_empty() {
        println!(
            "  {}",
            format!("{} utterance(s) skipped:", summary.skipped.len()).yellow()
        );
        for (id, failure) in &summary.skipped {
            println!("    • {}: {}", id, failure);
        }
    }
}

pub fn print_index_report(report: &IndexGenerationReport, out_file: &Path) {
    println!(
        "{} Index with {} line(s) ready at {}",
        "✓".green(),
        report.written,
        out_file.display().to_string().cyan()
    );
    if !report.failures.is_empty() {
        println!(
            "  {}",
            format!("{} file(s) did not match the pattern:", report.failures.len()).yellow()
        );
        for (name, err) in &report.failures {
            println!("    • {}: {}", name, err);
        }
    }
}

pub fn print_stats(stats: &CorpusStats, out_dir: &Path) {
    println!(
        "Readers: {}  Utterances: {}",
        stats.readers().len(),
        stats.total()
    );
    for reader in stats.readers() {
        let spr = reader.speech_rate();
        let f0 = reader.f0();
        println!(
            "  {:<20} n={:<6} SR {:.3} ± {:.3}  F0 {:.3} ± {:.3}  outliers {}",
            reader.reader_id(),
            reader.count(),
            spr.mean,
            spr.std_dev,
            f0.mean,
            f0.std_dev,
            reader.outlier_count()
        );
    }

    let outliers = stats.outlier_count();
    let status = if outliers == 0 {
        "no outliers".to_string().green()
    } else {
        format!("{} outlier(s)", outliers).yellow()
    };
    println!("Status: {}", status);
    println!("Reports in {}", out_dir.display().to_string().cyan());
}

pub fn print_check_report(report: &CheckReport) {
    let analysis = &report.analysis;
    println!("{}", RULE);
    println!("Text: {}", report.text.trim());
    println!("Speech duration: {:.4}", analysis.duration_secs);
    println!("Number of syllables: {}", analysis.syllables);
    println!("Speech rate: {:.4}", analysis.speech_rate);
    println!("F0:          {:.4}", analysis.f0);
    println!("{}", RULE);
}

pub fn print_search_hits(term: &str, hits: &[SearchHit]) {
    if hits.is_empty() {
        println!("{}", format!("No transcripts contain '{}'", term).yellow());
        return;
    }
    for hit in hits {
        println!("{}\t{}", hit.id.clone().cyan(), hit.text);
    }
    println!("{} match(es)", hits.len());
}

pub fn print_datasets() {
    for preset in DatasetPreset::all() {
        let columns = preset.columns();
        println!("{}", preset.name().bold());
        println!("  {}", preset.description());
        println!(
            "  columns: audio {}, text {}, reader {}  token extension: {}",
            columns.audio,
            columns.text,
            columns
                .reader
                .map_or_else(|| "-".to_string(), |c| c.to_string()),
            preset.token_extension()
        );
    }
}
