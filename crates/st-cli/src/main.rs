mod config;
mod report;

use std::io::{self, Write};
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use st_core::{
    MissingMatchPolicy, NormalizerChain, NullReporter, Reporter, TransferOptions, run_transfer,
};
use st_store::DeckStore;

use crate::config::DeckPaths;
use crate::report::{ConsoleReporter, Summary};

#[derive(Parser)]
#[command(
    name = "sched-transfer",
    about = "Copy scheduling information from one Anki deck to another, matching cards by \
             their normalized first field"
)]
struct Cli {
    /// Deck to take scheduling information from (.apkg, extension optional)
    #[arg(short, long)]
    source: String,

    /// Deck to write scheduling information into (.apkg, extension optional)
    #[arg(short, long)]
    destination: String,

    /// Archive to save the modified destination deck to. Defaults to the
    /// destination itself. Does not rename the deck inside the archive.
    #[arg(short, long)]
    output: Option<String>,

    /// What to do when some source cards have no equivalent in the
    /// destination deck: `suspend` transferred cards in the source deck, or
    /// `ignore` and leave it untouched. Required in that case, unused otherwise.
    #[arg(long, value_name = "suspend|ignore")]
    missing: Option<MissingMatchPolicy>,

    /// Archive to save the modified source deck to when --missing is
    /// suspend. Defaults to the source itself.
    #[arg(long)]
    output_source: Option<String>,

    /// TOML rule file replacing the built-in source normalizer chain
    #[arg(long)]
    source_rules: Option<PathBuf>,

    /// TOML rule file replacing the verbatim destination normalizer chain
    #[arg(long)]
    destination_rules: Option<PathBuf>,

    /// Only transfer source cards that have been studied (interval > 0)
    #[arg(long)]
    studied_only: bool,

    /// Reconcile and report without writing any archive
    #[arg(long)]
    dry_run: bool,

    /// Refuse to replace existing output archives
    #[arg(long)]
    no_overwrite: bool,

    /// Print the result as JSON instead of prose
    #[arg(long)]
    json: bool,

    /// Enable verbose debug output
    #[arg(long)]
    verbose: bool,
}

fn init_tracing(verbose: bool) {
    use tracing_subscriber::EnvFilter;

    let filter = if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::from_default_env().add_directive(tracing::Level::WARN.into())
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_ansi(false)
        .init();
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);
    run(&cli)
}

fn run(cli: &Cli) -> Result<()> {
    let paths = DeckPaths::resolve(
        &cli.source,
        &cli.destination,
        cli.output.as_deref(),
        cli.output_source.as_deref(),
    );
    let options = TransferOptions {
        source_chain: config::load_chain(
            cli.source_rules.as_deref(),
            NormalizerChain::legacy_source(),
        )?,
        destination_chain: config::load_chain(
            cli.destination_rules.as_deref(),
            NormalizerChain::verbatim(),
        )?,
        policy: cli.missing,
        studied_only: cli.studied_only,
    };

    let work_root = config::work_root();
    let source = DeckStore::open(&paths.source, work_root.as_deref())
        .with_context(|| format!("failed to open source deck {}", paths.source.display()))?;
    let destination = DeckStore::open(&paths.destination, work_root.as_deref()).with_context(
        || {
            format!(
                "failed to open destination deck {}",
                paths.destination.display()
            )
        },
    )?;

    let source_tables = source.tables().context("failed to read source deck")?;
    let destination_tables = destination
        .tables()
        .context("failed to read destination deck")?;

    let mut quiet = NullReporter;
    let mut console = ConsoleReporter::new(io::stdout());
    let reporter: &mut dyn Reporter = if cli.json {
        &mut quiet
    } else {
        &mut console
    };
    let outcome = run_transfer(&source_tables, &destination_tables, &options, reporter)
        .context("scheduling transfer aborted, nothing was written")?;
    if let Some(policy) = outcome.policy {
        tracing::info!("missing-match policy: {policy}");
    }

    let mut summary = Summary::new(&outcome, cli.dry_run);

    if cli.dry_run {
        if !cli.json {
            console.line(format_args!("Dry run: no archive was written."));
        }
    } else {
        let overwrite = !cli.no_overwrite;
        let mut targets = vec![paths.output.as_path()];
        if outcome.source_cards.is_some() {
            targets.push(paths.output_source.as_path());
        }
        config::ensure_writable(&targets, overwrite)?;

        destination
            .replace_cards(&outcome.destination_cards)
            .context("failed to update destination cards")?;
        destination
            .commit(&paths.output, overwrite)
            .with_context(|| format!("failed to write {}", paths.output.display()))?;
        summary.destination_output = Some(paths.output.display().to_string());
        if !cli.json {
            console.line(format_args!(
                "Destination deck saved to {}.",
                paths.output.display()
            ));
        }

        if let Some(cards) = &outcome.source_cards {
            source
                .replace_cards(cards)
                .context("failed to update source cards")?;
            source
                .commit(&paths.output_source, overwrite)
                .with_context(|| format!("failed to write {}", paths.output_source.display()))?;
            summary.source_output = Some(paths.output_source.display().to_string());
            if !cli.json {
                console.line(format_args!(
                    "Suspended {} card(s); source deck saved to {}.",
                    outcome.suspended,
                    paths.output_source.display()
                ));
            }
        }
    }

    if cli.json {
        let mut out = io::stdout().lock();
        serde_json::to_writer_pretty(&mut out, &summary).context("failed to write summary")?;
        writeln!(out).context("failed to write summary")?;
    } else {
        console.finish().context("failed to write to stdout")?;
    }
    Ok(())
}
