use clap::Parser;
use std::path::PathBuf;
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

use diff_anchor::review::Annotation;
use diff_anchor::{config, diff, input, publish, report, review};

/// Diff Anchor checks review comments proposed for a pull request against
/// the lines its unified diff actually shows, and emits the ones that can be
/// posted as a single batched review.
#[derive(Parser, Debug)]
#[command(name = "diff-anchor", version, about)]
struct Cli {
    /// Unified diff to validate against (`-` reads stdin)
    ///
    /// Not required when --mock is used.
    #[arg(long)]
    diff: Option<PathBuf>,

    /// JSON array of candidate annotations ({path, start_line, end_line, body})
    #[arg(long)]
    annotations: Option<PathBuf>,

    /// Where to write the review payload JSON (stdout if omitted)
    #[arg(long)]
    payload: Option<PathBuf>,

    /// Optional output file path for a markdown validation report
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Config file (defaults to .diff-anchor.toml in the current directory)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Use a built-in sample diff and annotations for demo purposes
    #[arg(long)]
    r#mock: bool,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_target(true)
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    info!("loading configuration");
    let config = config::Config::load(cli.config.as_deref())?;
    debug!(policy = ?config.validator.cross_hunk, "loaded configuration");

    let (diff_text, annotations) = if cli.r#mock {
        info!("using mock diff and annotations for demo");
        load_mock_inputs().await?
    } else {
        let diff_path = cli.diff.as_deref().ok_or(
            "--diff is required unless --mock is used. Usage: diff-anchor --diff <PATH> --annotations <PATH>",
        )?;
        let annotations_path = cli
            .annotations
            .as_deref()
            .ok_or("--annotations is required unless --mock is used")?;

        info!(diff = %diff_path.display(), annotations = %annotations_path.display(), "reading inputs");
        let source = input::diff_source_for(diff_path);
        let (diff_text, annotations) = tokio::join!(
            input::read_diff(source.as_ref()),
            input::load_annotations(annotations_path),
        );
        (diff_text?, annotations?)
    };

    info!("parsing diff");
    let document = diff::parse_document(&diff_text);
    info!(
        files = document.files().len(),
        hunks = document.hunk_count(),
        parse_errors = document.parse_errors().len(),
        "parsed diff"
    );

    info!(candidates = annotations.len(), "validating annotations");
    let validator = review::AnnotationValidator::new(&document, config.validator.cross_hunk);
    let outcome = validator.validate_all(&annotations);

    let payload = publish::ReviewPayload::new(&config.review, &outcome.accepted);
    publish::write_payload(&payload, cli.payload.as_deref()).await?;

    info!("generating report");
    let built_report = report::build(outcome, &document);
    report::output(&built_report, cli.output.as_deref())?;
    info!(status = %built_report.status, "done");

    Ok(())
}

/// Load the embedded sample diff and annotations.
/// This enables running the full pipeline without any input files.
async fn load_mock_inputs() -> Result<(String, Vec<Annotation>), Box<dyn std::error::Error>> {
    let source = input::StaticDiffSource::new(
        "sample_diff.patch",
        include_str!("../tests/fixtures/sample_diff.patch"),
    );
    let diff_text = input::read_diff(&source).await?;
    let annotations = input::parse_annotations(
        "sample_annotations.json",
        include_str!("../tests/fixtures/sample_annotations.json"),
    )?;
    Ok((diff_text, annotations))
}
