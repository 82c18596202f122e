//! CLI command implementations.

use std::path::Path;
use std::sync::Arc;
use std::time::Instant;

use colored::Colorize;

use codetrace_core::Language;
use codetrace_indexer::{analyze_project, SharedStorage};

use crate::reporter::CliReporter;

type Result<T> = std::result::Result<T, Box<dyn std::error::Error>>;

fn parse_language(lang: &str) -> Result<Language> {
    match lang.to_ascii_lowercase().as_str() {
        "java" => Ok(Language::Java),
        "python" | "py" => Ok(Language::Python),
        other => Err(format!("unsupported language: {other} (expected \"java\" or \"python\")").into()),
    }
}

/// Index a project and build the call graph, taint summaries, and query
/// index.
pub fn index(path: &Path, lang: &str, output: Option<&Path>) -> Result<()> {
    let language = parse_language(lang)?;
    println!("{}", "Indexing project...".cyan());

    let reporter = Arc::new(CliReporter::new("Scanning files..."));
    let storage = SharedStorage::new();
    let start = Instant::now();

    let analysis = analyze_project(path, language, storage, reporter.clone(), None)
        .map_err(|e| e.to_string())?;
    reporter.finish();

    let elapsed_ms = start.elapsed().as_millis();
    println!(
        "{} Indexed {} functions ({} call sites) in {}ms",
        "✓".green(),
        analysis.call_graph.functions.len().to_string().cyan(),
        analysis
            .call_graph
            .call_sites
            .values()
            .map(Vec::len)
            .sum::<usize>()
            .to_string()
            .cyan(),
        elapsed_ms
    );

    let detections: usize = analysis
        .taint_summaries
        .iter()
        .map(|(_, s)| s.get_high_confidence_detections().len())
        .sum();
    if detections > 0 {
        println!("{} {} high-confidence taint detections", "⚠".yellow(), detections);
    }

    if !analysis.failed_files.is_empty() {
        println!("\n{} files with parse errors:", "⚠".yellow());
        for (file, error) in analysis.failed_files.iter().take(5) {
            println!("  {} - {}", file.red(), error);
        }
        if analysis.failed_files.len() > 5 {
            println!("  ... and {} more", analysis.failed_files.len() - 5);
        }
    }

    if let Some(out_path) = output {
        export_summary(&analysis, out_path)?;
    }

    Ok(())
}

fn export_summary(analysis: &codetrace_indexer::ProjectAnalysis, path: &Path) -> Result<()> {
    let summary = serde_json::json!({
        "version": "1.0",
        "stats": {
            "functionCount": analysis.call_graph.functions.len(),
            "failedFiles": analysis.failed_files.len(),
        },
        "callGraph": analysis.call_graph,
    });
    std::fs::write(path, serde_json::to_string_pretty(&summary)?)?;
    println!("{} Exported to {}", "✓".green(), path.display());
    Ok(())
}

/// Run a filter-expression query over a freshly indexed project.
pub fn query(path: &Path, lang: &str, expression: &str) -> Result<()> {
    let language = parse_language(lang)?;
    let reporter = Arc::new(CliReporter::new("Indexing for query..."));
    let storage = SharedStorage::new();

    let analysis = analyze_project(path, language, storage, reporter.clone(), None)
        .map_err(|e| e.to_string())?;
    reporter.finish();

    let planner = codetrace_query::QueryPlanner::new(&analysis.query_index, language == Language::Java);
    let select = codetrace_query::SelectEntry {
        alias: "m".into(),
        kind: codetrace_core::NodeKind::Method,
    };
    let q = codetrace_query::Query {
        select_list: vec![select],
        expression: codetrace_query::QueryExpression::Text(expression.to_string()),
        select_output: vec![codetrace_query::OutputSpec::Variable("m".into())],
        predicates: std::collections::HashMap::new(),
        classes: Vec::new(),
    };
    let result = planner.execute(&q);

    if result.rows.is_empty() {
        println!("No matches found for \"{}\"", expression);
        return Ok(());
    }

    println!("Found {} matches:\n", result.rows.len());
    for row in &result.rows {
        println!("  {}", row.join(", ").cyan());
    }

    Ok(())
}

/// Show index status and statistics without persisting anything.
pub fn status(path: &Path, lang: &str) -> Result<()> {
    let language = parse_language(lang)?;
    let reporter = Arc::new(CliReporter::new("Checking status..."));
    let storage = SharedStorage::new();

    let analysis = analyze_project(path, language, storage, reporter.clone(), None)
        .map_err(|e| e.to_string())?;
    reporter.finish();

    println!("{}", "codetrace status".cyan().bold());
    println!();
    println!("  {} {}", "Functions:".dimmed(), analysis.call_graph.functions.len());
    println!(
        "  {} {}",
        "Edges:".dimmed(),
        analysis.call_graph.edges.values().map(|v| v.len()).sum::<usize>()
    );
    println!("  {} {}", "Failed files:".dimmed(), analysis.failed_files.len());
    println!("  {} {}", "Language:".dimmed(), lang);

    Ok(())
}
