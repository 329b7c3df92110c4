use std::path::PathBuf;
use std::time::{Duration, Instant};

use anyhow::{bail, Context};
use clap::Parser;
use tracing::{info, warn};

use addrcheck_core::{
    infer, load_dataset, lookup, reconcile, validate_dataset, AdvisoryOracle, CancelToken,
    HttpOracle, SimilarityOracle,
};
use addrcheck_report::{
    write_annotated_geojson, write_html_report, write_json_report, ValidationReport,
};

#[derive(Debug, Parser)]
#[command(name = "addrcheck")]
#[command(about = "Address point quality checker")]
struct Args {
    /// Dataset to validate: a .geojson file or a .zip containing one.
    #[arg(short = 'i', long = "input")]
    input: PathBuf,

    /// 3-letter ISO country code selecting the validation policy.
    #[arg(short = 'c', long = "country_code", alias = "country-code")]
    country_code: String,

    #[arg(short = 'o', long = "output")]
    output: PathBuf,

    /// Use the column-inferred policy when the registry has no entry for the
    /// country code. Without this flag an unknown code aborts the run.
    #[arg(long = "accept_inferred", alias = "accept-inferred")]
    accept_inferred: bool,

    /// Language-model oracle endpoint (Ollama-style). Falls back to
    /// string-similarity column matching when unset.
    #[arg(long = "oracle_url", alias = "oracle-url")]
    oracle_url: Option<String>,

    #[arg(long = "oracle_model", alias = "oracle-model", default_value = "llama3")]
    oracle_model: String,

    /// Per-call oracle timeout in seconds.
    #[arg(long = "oracle_timeout", alias = "oracle-timeout", default_value_t = 30)]
    oracle_timeout: u64,

    /// Disable the per-row value-anomaly advisory entirely.
    #[arg(long = "no_oracle", alias = "no-oracle")]
    no_oracle: bool,

    #[arg(short = 'p', long = "pretty")]
    pretty: bool,

    #[arg(
        short = 'v',
        long = "validation_report_name",
        alias = "validation-report-name",
        default_value = "validation_report.json"
    )]
    validation_report_name: String,

    #[arg(
        short = 'a',
        long = "annotated_name",
        alias = "annotated-name",
        default_value = "checked_output.geojson"
    )]
    annotated_name: String,

    #[arg(
        short = 'r',
        long = "html_report_name",
        alias = "html-report-name",
        default_value = "report.html"
    )]
    html_report_name: String,

    /// Worker threads for row-level checks; 0 uses the rayon default.
    #[arg(long = "threads", default_value_t = 0)]
    threads: usize,
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt().with_target(false).init();
    let args = Args::parse();

    if args.threads > 0 {
        rayon::ThreadPoolBuilder::new()
            .num_threads(args.threads)
            .build_global()
            .context("configure worker thread pool")?;
    }

    let mut dataset = load_dataset(&args.input)
        .with_context(|| format!("load dataset {}", args.input.display()))?;
    info!(
        rows = dataset.rows.len(),
        columns = dataset.columns.len(),
        "dataset {} loaded",
        args.input.display()
    );

    let country_code = args.country_code.trim().to_ascii_uppercase();
    let policy = match lookup(&country_code) {
        Some(policy) => {
            info!(country = %policy.country_name, "using registry policy");
            policy
        }
        None => {
            let inferred = infer(&dataset.columns);
            warn!(
                code = %country_code,
                "no registry policy; inferred one from column names"
            );
            println!(
                "{}",
                serde_json::to_string_pretty(&inferred).context("render inferred policy")?
            );
            if !args.accept_inferred {
                bail!(
                    "no policy available for '{country_code}'; review the inferred policy \
                     above and rerun with --accept_inferred to use it"
                );
            }
            inferred
        }
    };

    let http_oracle = match args.oracle_url.as_deref() {
        Some(url) if !args.no_oracle => Some(
            HttpOracle::new(url, &args.oracle_model, Duration::from_secs(args.oracle_timeout))
                .context("configure oracle endpoint")?,
        ),
        _ => None,
    };
    let similarity = SimilarityOracle;
    let mapping_oracle: &dyn AdvisoryOracle = match &http_oracle {
        Some(oracle) => oracle,
        None => &similarity,
    };

    let mapping = reconcile(&policy, &dataset, Some(mapping_oracle));
    info!(
        mapped = mapping.len(),
        expected = policy.all_fields().len(),
        "schema reconciled"
    );

    // The anomaly advisory only runs against a language-model oracle.
    let advisory_oracle: Option<&dyn AdvisoryOracle> = http_oracle
        .as_ref()
        .map(|oracle| oracle as &dyn AdvisoryOracle);

    let cancel = CancelToken::new();
    let started_at = Instant::now();
    let outcome = validate_dataset(&mut dataset, &policy, &mapping, advisory_oracle, &cancel)
        .context("run validation checks")?;
    let elapsed = started_at.elapsed();

    std::fs::create_dir_all(&args.output)
        .with_context(|| format!("create output dir {}", args.output.display()))?;

    write_annotated_geojson(args.output.join(&args.annotated_name), &dataset)?;

    let report = ValidationReport::new(
        &country_code,
        &policy.country_name,
        dataset.rows.len(),
        &outcome,
        &mapping,
    )
    .with_validation_time_seconds(elapsed.as_secs_f64());
    write_json_report(
        args.output.join(&args.validation_report_name),
        &report,
        args.pretty,
    )?;
    write_html_report(args.output.join(&args.html_report_name), &report)?;

    for entry in &outcome.summary {
        info!(code = %entry.code, severity = ?entry.severity, "{}", entry.message);
    }
    info!(
        flagged = outcome.flagged_rows,
        errors = outcome.error_count,
        warnings = outcome.warning_count,
        elapsed_seconds = elapsed.as_secs_f64(),
        "reports written to {}",
        args.output.display()
    );

    Ok(())
}
