use std::io::IsTerminal;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::time::Duration;

use clap::{Parser, Subcommand};
use projmap_core::{Language, ProjmapConfig, ProjmapError, ScanConfig};
use projmap_scan::output::write_map;
use projmap_scan::{analyze_project, Analysis, CancelToken, NoProgress, Progress};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(
    name = "projmap",
    version,
    about = "Map a project's imports, classes and functions to JSON",
    long_about = "projmap walks a project directory, parses every source file with tree-sitter,\n\
                   and writes one JSON document listing each file's imports, classes (with\n\
                   their methods) and top-level functions.\n\n\
                   Examples:\n  \
                     projmap analyze ./my-project                 Print the map to stdout\n  \
                     projmap analyze . --output map.json          Save the map to a file\n  \
                     projmap analyze web --language javascript    Map a JavaScript tree"
)]
struct Cli {
    #[command(subcommand)]
    command: Command,

    /// Path to configuration file (default: .projmap.toml)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Enable verbose output
    #[arg(long, short, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Command {
    /// Build a structural map of a project directory
    #[command(long_about = "Build a structural map of a project directory.\n\n\
        Every file with a matching extension is parsed; files that fail to parse are\n\
        listed in the summary on stderr and left out of the map. The run fails only if\n\
        the directory cannot be scanned or no file parses at all.\n\n\
        Examples:\n  projmap analyze /src/app\n  projmap analyze . --output map.json --exclude build --jobs 4")]
    Analyze {
        /// Project directory to scan
        directory_path: PathBuf,

        /// Write the JSON map to this file instead of stdout
        #[arg(long)]
        output: Option<PathBuf>,

        /// Source language (python, javascript)
        #[arg(long)]
        language: Option<Language>,

        /// Additional directory names to skip (repeatable)
        #[arg(long)]
        exclude: Vec<String>,

        /// Worker threads for parsing (default: one per CPU)
        #[arg(long)]
        jobs: Option<usize>,

        /// Give up after this many seconds
        #[arg(long)]
        timeout: Option<u64>,

        /// Do not honor .gitignore files
        #[arg(long)]
        no_gitignore: bool,
    },
}

struct AnalyzeArgs {
    directory_path: PathBuf,
    output: Option<PathBuf>,
    language: Option<Language>,
    exclude: Vec<String>,
    jobs: Option<usize>,
    timeout: Option<u64>,
    no_gitignore: bool,
}

/// Progress bar on stderr, one tick per processed file.
struct BarProgress(indicatif::ProgressBar);

impl BarProgress {
    fn new() -> Self {
        let pb = indicatif::ProgressBar::new(0);
        if let Ok(style) =
            indicatif::ProgressStyle::with_template("{spinner:.cyan} [{bar:30}] {pos}/{len} files ({elapsed})")
        {
            pb.set_style(style.progress_chars("=> "));
        }
        Self(pb)
    }
}

impl Progress for BarProgress {
    fn start(&self, total: usize) {
        self.0.set_length(total as u64);
        self.0.enable_steady_tick(Duration::from_millis(120));
    }

    fn advance(&self, _path: &Path) {
        self.0.inc(1);
    }

    fn finish(&self) {
        self.0.finish_and_clear();
    }
}

fn init_tracing(verbose: bool) {
    let default_filter = if verbose {
        "projmap=debug,projmap_scan=debug,projmap_core=debug"
    } else {
        "projmap=info,projmap_scan=info,projmap_core=info"
    };
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| default_filter.into()),
        )
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(false)
                .with_writer(std::io::stderr),
        )
        .init();
}

fn load_config(path: Option<&Path>) -> Result<ProjmapConfig, ProjmapError> {
    match path {
        Some(path) => ProjmapConfig::from_file(path),
        None => {
            let default_path = Path::new(".projmap.toml");
            if default_path.exists() {
                ProjmapConfig::from_file(default_path)
            } else {
                Ok(ProjmapConfig::default())
            }
        }
    }
}

/// Layer CLI flags over the `[scan]` section.
fn scan_config(mut scan: ScanConfig, args: &AnalyzeArgs) -> Result<ScanConfig, ProjmapError> {
    if let Some(language) = args.language {
        scan.language = language;
    }
    scan.exclude_dirs.extend(args.exclude.iter().cloned());
    if args.jobs.is_some() {
        scan.jobs = args.jobs;
    }
    if args.timeout.is_some() {
        scan.timeout_secs = args.timeout;
    }
    if args.no_gitignore {
        scan.respect_gitignore = false;
    }
    scan.validate()?;
    Ok(scan)
}

fn print_summary(analysis: &Analysis) {
    eprintln!("--- Analysis Summary ---");
    eprintln!(
        "{} files scanned, {} parsed, {} failed to parse.",
        analysis.candidates,
        analysis.parsed(),
        analysis.failures.len()
    );
    if !analysis.failures.is_empty() {
        eprintln!("Failed files:");
        for failure in &analysis.failures {
            eprintln!("  {} ({})", failure.path.display(), failure.message);
        }
    }
    eprintln!("------------------------");
}

async fn run_analyze(
    config: ProjmapConfig,
    args: AnalyzeArgs,
    verbose: bool,
) -> Result<(), ProjmapError> {
    let scan = scan_config(config.scan, &args)?;

    let cancel = match scan.timeout_secs {
        Some(secs) => CancelToken::with_timeout(Duration::from_secs(secs)),
        None => CancelToken::new(),
    };
    {
        let cancel = cancel.clone();
        tokio::spawn(async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                tracing::warn!("interrupt received, stopping after in-flight files");
                cancel.cancel();
            }
        });
    }

    let show_progress = !verbose && std::io::stderr().is_terminal();
    let root = args.directory_path.clone();
    let analysis = tokio::task::spawn_blocking(move || {
        if show_progress {
            analyze_project(&root, &scan, &cancel, &BarProgress::new())
        } else {
            analyze_project(&root, &scan, &cancel, &NoProgress)
        }
    })
    .await
    .map_err(|e| ProjmapError::Io(std::io::Error::other(e)))??;

    write_map(&analysis.map, args.output.as_deref())?;

    print_summary(&analysis);
    if let Some(output) = &args.output {
        eprintln!("Analysis complete. Map saved to {}", output.display());
    }
    Ok(())
}

fn report(err: ProjmapError) -> ExitCode {
    let code = err.exit_code();
    eprintln!("{:?}", miette::Report::new(err));
    ExitCode::from(code)
}

#[tokio::main]
async fn main() -> ExitCode {
    let _ = miette::set_hook(Box::new(|_| {
        Box::new(
            miette::MietteHandlerOpts::new()
                .terminal_links(true)
                .build(),
        )
    }));
    human_panic::setup_panic!();

    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let config = match load_config(cli.config.as_deref()) {
        Ok(config) => config,
        Err(err) => return report(err),
    };

    let result = match cli.command {
        Command::Analyze {
            directory_path,
            output,
            language,
            exclude,
            jobs,
            timeout,
            no_gitignore,
        } => {
            let args = AnalyzeArgs {
                directory_path,
                output,
                language,
                exclude,
                jobs,
                timeout,
                no_gitignore,
            };
            run_analyze(config, args, cli.verbose).await
        }
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => report(err),
    }
}
