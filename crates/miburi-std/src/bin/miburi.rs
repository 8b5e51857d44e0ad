use anyhow::{bail, Context};
use clap::{Args, Parser, Subcommand};
use miburi_core::model::{duplicate_modules, readable_objects};
use miburi_core::{Annotator, OidIndex, SchemaEntry, Session, Target};
use miburi_std::loader::{DirectoryLoader, LoadReport, SchemaLoader};
use miburi_std::replay::load_capture;
use miburi_std::report::{self, Format};
use miburi_std::snapshot::{
    compute_fingerprint, is_snapshot_current, read_snapshot, read_snapshot_verified, write_snapshot,
    SnapshotError,
};
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

const DEFAULT_SNAPSHOT: &str = "miburi.snap";

#[derive(Parser)]
#[command(author, version, about = "Resolve SNMP OIDs to MIB names", long_about = None)]
struct Cli {
    /// Log filter (overrides RUST_LOG), e.g. `debug` or `miburi_core=trace`
    #[arg(long, global = true, value_name = "FILTER")]
    log_level: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Args)]
struct SnapshotArg {
    /// Snapshot file
    #[arg(short, long, value_name = "FILE", env = "MIBURI_SNAPSHOT", default_value = DEFAULT_SNAPSHOT)]
    input: PathBuf,
}

#[derive(Subcommand)]
enum Commands {
    /// Load MIB module definitions and write a snapshot
    Dump {
        /// Directories containing module definition files
        #[arg(short = 'd', long = "dir", value_name = "DIR", required = true)]
        dirs: Vec<PathBuf>,

        /// Snapshot file to write
        #[arg(short, long, value_name = "FILE", env = "MIBURI_SNAPSHOT", default_value = DEFAULT_SNAPSHOT)]
        output: PathBuf,

        /// Also scan subdirectories
        #[arg(short, long)]
        recursive: bool,

        /// Rewrite the snapshot even if it matches the module files
        #[arg(short, long)]
        force: bool,
    },
    /// Look up the names of OIDs
    Find {
        /// OIDs to look up
        #[arg(short = 't', long = "oid", value_name = "OID", required = true)]
        oids: Vec<String>,

        #[command(flatten)]
        snapshot: SnapshotArg,

        /// Also print type, enumeration, units and description
        #[arg(short, long)]
        verbose: bool,
    },
    /// Print the snapshot's modules as JSON
    Json {
        #[command(flatten)]
        snapshot: SnapshotArg,
    },
    /// Annotate the results of a walk
    Walk {
        /// Root OIDs to walk
        #[arg(short = 't', long = "oid", value_name = "OID", required = true)]
        oids: Vec<String>,

        /// Recorded walk to replay (JSON list of varbinds)
        #[arg(long, value_name = "CAPTURE")]
        replay: PathBuf,

        /// Host the capture was taken from; only labels the session in logs,
        /// the replay sends nothing over the network
        #[arg(long, default_value = "localhost")]
        host: String,

        /// Community the capture was taken with; only labels the session
        #[arg(short, long, default_value = "public")]
        community: String,

        /// Port the capture was taken from; only labels the session
        #[arg(short, long, default_value_t = miburi_core::transport::DEFAULT_PORT)]
        port: u16,

        #[command(flatten)]
        snapshot: SnapshotArg,

        /// Also print enumeration, units and description
        #[arg(short, long)]
        verbose: bool,

        /// Output JSON
        #[arg(short, long, conflicts_with = "csv")]
        json: bool,

        /// Output CSV
        #[arg(short = 'C', long)]
        csv: bool,
    },
    /// Check whether the snapshot matches the module definition files
    Check {
        /// Directories containing module definition files
        #[arg(short = 'd', long = "dir", value_name = "DIR", required = true)]
        dirs: Vec<PathBuf>,

        #[command(flatten)]
        snapshot: SnapshotArg,

        /// Also scan subdirectories
        #[arg(short, long)]
        recursive: bool,
    },
}

fn init_logging(level: Option<&str>) {
    let filter = match level {
        Some(level) => EnvFilter::new(level),
        None => EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .with_target(false)
        .init();
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(cli.log_level.as_deref());

    match run(cli.command) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("error: {err:#}");
            ExitCode::FAILURE
        }
    }
}

fn run(command: Commands) -> anyhow::Result<()> {
    match command {
        Commands::Dump {
            dirs,
            output,
            recursive,
            force,
        } => dump(&dirs, &output, recursive, force),
        Commands::Find {
            oids,
            snapshot,
            verbose,
        } => find(&oids, &snapshot.input, verbose),
        Commands::Json { snapshot } => {
            let entries = load_entries(&snapshot.input)?;
            let mut out = BufWriter::new(io::stdout().lock());
            report::export_entries_json(&mut out, &entries)?;
            out.flush()?;
            Ok(())
        }
        Commands::Walk {
            oids,
            replay,
            host,
            community,
            port,
            snapshot,
            verbose,
            json,
            csv,
        } => {
            let format = if json {
                Format::Json
            } else if csv {
                Format::Csv
            } else {
                Format::Text
            };
            let target = Target::new(host).community(community).port(port);
            walk(&oids, &replay, target, &snapshot.input, verbose, format)
        }
        Commands::Check {
            dirs,
            snapshot,
            recursive,
        } => check(&dirs, &snapshot.input, recursive),
    }
}

fn load_sources(dirs: &[PathBuf], recursive: bool) -> anyhow::Result<LoadReport> {
    let report = DirectoryLoader::new()
        .recursive(recursive)
        .load_all(dirs)
        .context("failed to load schema modules")?;
    for skipped in &report.skipped {
        eprintln!("Load error (skip): {}: {}", skipped.path.display(), skipped.reason);
    }
    Ok(report)
}

fn load_entries(path: &Path) -> anyhow::Result<Vec<SchemaEntry>> {
    read_snapshot(path).with_context(|| format!("failed to read snapshot {}", path.display()))
}

fn dump(dirs: &[PathBuf], output: &Path, recursive: bool, force: bool) -> anyhow::Result<()> {
    let report = load_sources(dirs, recursive)?;
    let fingerprint = compute_fingerprint(&report.sources);
    if !force && is_snapshot_current(output, &fingerprint) {
        println!("{} is up to date", output.display());
        return Ok(());
    }

    for module in duplicate_modules(&report.entries) {
        tracing::warn!(module, "module loaded more than once");
    }
    let index = OidIndex::build(&report.entries);
    if !index.collisions().is_empty() {
        tracing::warn!(
            collisions = index.collisions().len(),
            "duplicate OID paths; the last module loaded wins"
        );
    }

    write_snapshot(output, &report.entries, Some(fingerprint))
        .with_context(|| format!("failed to write snapshot {}", output.display()))?;

    println!(
        "Wrote {} modules ({} nodes, {} readable objects) to {}",
        report.entries.len(),
        report.node_count(),
        readable_objects(&report.entries),
        output.display()
    );
    Ok(())
}

fn find(oids: &[String], snapshot: &Path, verbose: bool) -> anyhow::Result<()> {
    let entries = load_entries(snapshot)?;
    let index = OidIndex::build(&entries);
    let annotator = Annotator::new(&index).verbose(verbose);

    let mut out = BufWriter::new(io::stdout().lock());
    for oid in oids {
        match annotator.describe(oid) {
            Some(result) => report::write_find_text(&mut out, &result, verbose)?,
            None => {
                out.flush()?;
                eprintln!("name not found for OID: {oid}");
            }
        }
    }
    out.flush()?;
    Ok(())
}

fn walk(
    oids: &[String],
    capture: &Path,
    target: Target,
    snapshot: &Path,
    verbose: bool,
    format: Format,
) -> anyhow::Result<()> {
    let entries = load_entries(snapshot)?;
    let index = OidIndex::build(&entries);
    let annotator = Annotator::new(&index).verbose(verbose);

    let transport = load_capture(capture)
        .with_context(|| format!("failed to load capture {}", capture.display()))?;
    tracing::info!(agent = %target.address(), capture = %capture.display(), "replaying captured walk");
    let mut session = Session::open(transport, target)?;

    let mut results = Vec::new();
    let mut failed = 0;
    for oid in oids {
        if let Err(err) = annotator.walk(&mut session, oid, &mut results) {
            tracing::error!(root = %oid, error = %err, "walk failed");
            failed += 1;
        }
    }
    session.close();

    let mut out = BufWriter::new(io::stdout().lock());
    report::write_results(&mut out, &results, format)?;
    out.flush()?;

    if failed > 0 {
        bail!("{failed} of {} walks failed", oids.len());
    }
    Ok(())
}

fn check(dirs: &[PathBuf], snapshot: &Path, recursive: bool) -> anyhow::Result<()> {
    let report = load_sources(dirs, recursive)?;
    let fingerprint = compute_fingerprint(&report.sources);

    match read_snapshot_verified(snapshot, &fingerprint) {
        Ok(entries) => {
            println!("{} is up to date ({} modules)", snapshot.display(), entries.len());
            Ok(())
        }
        Err(SnapshotError::FingerprintMismatch) => bail!(
            "snapshot {} does not match the module files; regenerate it with `miburi dump`",
            snapshot.display()
        ),
        Err(err) => {
            Err(err).with_context(|| format!("failed to read snapshot {}", snapshot.display()))
        }
    }
}
