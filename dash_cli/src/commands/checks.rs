//! `dashview checks`: flatten a benchmark run and print it grouped

use super::{read_file, CommandError};
use clap::Args;
use dash_schema::RuntimeConfig;
use dash_state::checks::{BenchmarkRun, CheckNodeKind, CheckNodeStatus, GroupedChecks};
use dash_state::{collect_check_results, group_check_results, parse_grouping_config, CheckNode, CheckNodeStates};
use std::fmt::Write;
use std::path::PathBuf;

#[derive(Args, Debug)]
pub struct ChecksArgs {
    /// Benchmark run exported as JSON
    pub run: PathBuf,

    /// Grouping tokens, e.g. "benchmark,tag|service,control,result"
    #[arg(short, long, value_name = "TOKENS")]
    pub grouping: Option<String>,

    /// Print the grouped tree as JSON
    #[arg(long)]
    pub json: bool,
}

pub fn run(args: &ChecksArgs, config: &RuntimeConfig) -> Result<(), CommandError> {
    let source = read_file(&args.run)?;
    let run: BenchmarkRun = serde_json::from_str(&source).map_err(|source| CommandError::Json {
        path: args.run.display().to_string(),
        source,
    })?;

    let tokens = args
        .grouping
        .as_deref()
        .unwrap_or(&config.grouping.default_grouping);
    let grouped = group_run(&run, tokens, config.grouping.expand_new_nodes)?;

    if args.json {
        let rendered = serde_json::to_string_pretty(&grouped.root).map_err(|source| CommandError::Json {
            path: args.run.display().to_string(),
            source,
        })?;
        println!("{}", rendered);
    } else {
        print!("{}", render_tree(&grouped.root));
    }
    Ok(())
}

pub fn group_run(run: &BenchmarkRun, tokens: &str, expand_new_nodes: bool) -> Result<GroupedChecks, CommandError> {
    let config = parse_grouping_config(tokens)?;
    let results = collect_check_results(run);
    Ok(group_check_results(&results, &config, &CheckNodeStates::new(), expand_new_nodes)?)
}

/// Indented tree; group nodes carry their folded summary
pub fn render_tree(root: &CheckNode) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "{} [{}]", running_marker(root), root.summary());

    root.walk(&mut |node, depth| {
        if depth == 0 {
            return;
        }
        let indent = "  ".repeat(depth);
        let line = match &node.kind {
            CheckNodeKind::Result { result } => {
                format!("{:<5} {} ({})", result.status.as_str(), node.title, result.resource)
            }
            CheckNodeKind::Error { message } => format!("error {}: {}", node.title, message),
            CheckNodeKind::Running => format!("...   {}", node.title),
            CheckNodeKind::EmptyResult => format!("empty {}", node.title),
            CheckNodeKind::Control { severity: Some(severity) } => {
                format!("{} <{}> [{}]", node.title, severity.as_str(), node.summary())
            }
            _ => format!("{} [{}]", node.title, node.summary()),
        };
        let _ = writeln!(out, "{}{}", indent, line);
    });
    out
}

fn running_marker(root: &CheckNode) -> &'static str {
    match root.status() {
        CheckNodeStatus::Running => "running",
        CheckNodeStatus::Complete => "complete",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;
    use dash_state::CheckGroupingError;
    use serde_json::json;

    fn run() -> BenchmarkRun {
        serde_json::from_value(json!({
            "group_id": "aws.benchmark.root",
            "title": "AWS",
            "groups": [{
                "group_id": "aws.benchmark.s3",
                "title": "S3",
                "controls": [{
                    "control_id": "aws.control.s3_encryption",
                    "title": "Bucket encryption",
                    "severity": "high",
                    "tags": {"service": "s3"},
                    "run_status": "complete",
                    "results": [
                        {"reason": "encrypted", "resource": "bucket-a", "status": "ok",
                         "dimensions": [{"key": "region", "value": "us-east-1"}]},
                        {"reason": "not encrypted", "resource": "bucket-b", "status": "alarm"}
                    ]
                }, {
                    "control_id": "aws.control.s3_logging",
                    "title": "Access logging",
                    "run_status": "running"
                }]
            }]
        }))
        .unwrap()
    }

    #[test]
    fn test_tree_rendering() {
        let grouped = group_run(&run(), "benchmark,control,result", false).unwrap();
        let tree = render_tree(&grouped.root);
        let lines: Vec<&str> = tree.lines().collect();

        assert_eq!(lines[0], "running [alarm=1 ok=1 info=0 skip=0 error=0]");
        assert_eq!(lines[1], "  S3 [alarm=1 ok=1 info=0 skip=0 error=0]");
        assert!(lines.contains(&"    Bucket encryption <high> [alarm=1 ok=1 info=0 skip=0 error=0]"));
        assert!(lines.contains(&"      ok    encrypted (bucket-a)"));
        assert!(lines.contains(&"      ...   Access logging"));
    }

    #[test]
    fn test_dimension_grouping_uses_other() {
        let grouped = group_run(&run(), "dimension|region,result", true).unwrap();
        let titles: Vec<&str> = grouped.root.children.iter().map(|n| n.title.as_str()).collect();

        assert!(titles.contains(&"us-east-1"));
        assert!(titles.contains(&"Other"));
        assert!(grouped.states.names().all(|name| grouped.states.is_expanded(name)));
    }

    #[test]
    fn test_invalid_grouping() {
        assert_matches!(
            group_run(&run(), "benchmark,colour", false),
            Err(CommandError::Grouping(CheckGroupingError::UnknownGroupingType { .. }))
        );
    }
}
