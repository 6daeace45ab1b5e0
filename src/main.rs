use anyhow::Result;
use checkout_patcher::{
    EditOutcome, FailurePolicy, PatchOp, PatchRunner, PinConfig, Rewrite, RunReport,
};
use clap::Parser;
use colored::Colorize;
use similar::{ChangeTag, TextDiff};
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

#[derive(Parser)]
#[command(name = "checkout-patcher")]
#[command(about = "Pin MSBuild paths in a MonoDevelop checkout", long_about = None)]
#[command(version)]
struct Cli {
    /// Root of the MonoDevelop working copy
    #[arg(short, long)]
    repo_root: Option<PathBuf>,

    /// MSBuild bin directory to pin the build against
    #[arg(short, long)]
    msbuild_bin: Option<String>,

    /// Show what would change without modifying files
    #[arg(short = 'n', long)]
    dry_run: bool,

    /// Show unified diff of changes
    #[arg(short, long)]
    diff: bool,

    /// Keep applying remaining patches after a failure
    #[arg(short, long)]
    keep_going: bool,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let mut config = PinConfig::default();
    if let Some(root) = cli.repo_root {
        config.repo_root = root;
    }
    if let Some(bin) = cli.msbuild_bin {
        config.msbuild_bin = bin;
    }

    println!("Repository: {}", config.repo_root.display());
    println!("MSBuild bin: {}", config.msbuild_bin);
    println!();

    let ops = config.patch_set();

    if cli.dry_run {
        return cmd_dry_run(&ops, cli.diff);
    }

    let policy = if cli.keep_going {
        FailurePolicy::ContinueOnError
    } else {
        FailurePolicy::FailFast
    };

    // Capture target contents before applying, for diff output.
    let mut before: HashMap<PathBuf, String> = HashMap::new();
    if cli.diff {
        for op in &ops {
            let file = op.file().to_path_buf();
            if let Ok(content) = fs::read_to_string(&file) {
                before.insert(file, content);
            }
        }
    }

    let runner = PatchRunner::new(ops).with_policy(policy);
    let report = runner.run();

    for (index, result) in report.results.iter().enumerate() {
        let op = &runner.ops()[index];
        match result {
            Ok(EditOutcome::Applied { file }) => {
                println!("{} #{index}: Applied {op}", "✓".green());
                if cli.diff {
                    if let Some(old) = before.get(file) {
                        if let Ok(new) = fs::read_to_string(file) {
                            display_diff(file, old, &new);
                        }
                    }
                }
            }
            Ok(EditOutcome::AlreadyApplied { .. }) => {
                println!("{} #{index}: Already applied, {op}", "⊙".yellow());
            }
            Ok(EditOutcome::NoMatch { .. }) => {
                println!("{} #{index}: Nothing matched, {op}", "⊘".cyan());
            }
            Err(e) => {
                eprintln!("{} #{index}: {e}", "✗".red());
            }
        }
    }

    if report.results.len() < runner.ops().len() {
        eprintln!(
            "{}",
            format!(
                "Aborted after patch #{}; {} patches left unapplied (re-run after fixing, or use --keep-going)",
                report.results.len() - 1,
                runner.ops().len() - report.results.len()
            )
            .red()
        );
    }

    print_summary(&report);

    if !report.success() {
        std::process::exit(1);
    }
    Ok(())
}

/// Compute every rewrite in memory and report what a real run would do.
fn cmd_dry_run(ops: &[PatchOp], show_diff: bool) -> Result<()> {
    println!("{}", "[DRY RUN - no files will be modified]".cyan());

    let mut failed = 0;
    for (index, op) in ops.iter().enumerate() {
        let file = op.file();
        let text = match fs::read_to_string(file) {
            Ok(text) => text,
            Err(e) => {
                eprintln!(
                    "{} #{index}: failed to read {}: {e}",
                    "✗".red(),
                    file.display()
                );
                failed += 1;
                continue;
            }
        };

        match op.rewrite(&text) {
            Rewrite::Changed(new_text) => {
                println!("{} #{index}: Would apply {op}", "✓".green());
                if show_diff {
                    display_diff(file, &text, &new_text);
                }
            }
            Rewrite::AlreadyApplied => {
                println!("{} #{index}: Already applied, {op}", "⊙".yellow());
            }
            Rewrite::NoMatch => {
                println!("{} #{index}: Nothing matched, {op}", "⊘".cyan());
            }
        }
    }

    if failed > 0 {
        std::process::exit(1);
    }
    Ok(())
}

/// Show unified diff between original and modified content.
fn display_diff(file: &Path, original: &str, modified: &str) {
    println!(
        "\n{}",
        format!("--- {} (original)", file.display()).dimmed()
    );
    println!("{}", format!("+++ {} (patched)", file.display()).dimmed());

    let diff = TextDiff::from_lines(original, modified);

    for change in diff.iter_all_changes() {
        let sign = match change.tag() {
            ChangeTag::Delete => format!("-{}", change).red(),
            ChangeTag::Insert => format!("+{}", change).green(),
            ChangeTag::Equal => format!(" {}", change).normal(),
        };
        print!("{}", sign);
    }
    println!();
}

fn print_summary(report: &RunReport) {
    println!();
    println!("{}", "Summary:".bold());
    println!("  {} applied", format!("{}", report.applied()).green());
    println!(
        "  {} already applied",
        format!("{}", report.already_applied()).yellow()
    );
    println!("  {} no match", format!("{}", report.no_match()).cyan());
    println!("  {} failed", format!("{}", report.failed()).red());
}
