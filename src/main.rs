use clap::{CommandFactory, Parser};
use colored::*;
use env_logger::{Builder, Env, Target};
use findora::cli::{megabytes_to_bytes, Cli, Commands};
use findora::config::Config;
use findora::error::{FindoraError, Result as FindoraResult};
use findora::metrics::Metrics;
use findora::output::{formatter, OutputFormat, OutputFormatterTrait};
use findora::probe::{read_preview, scan_directory};
use findora::{SearchEngine, SearchOptions, SearchOutcome, SearchSession, WalkOptions};
use indicatif::{ProgressBar, ProgressStyle};
use log::{info, warn};
use std::fs;
use std::path::Path;
use std::process::ExitCode;
use std::sync::Arc;
use std::time::{Duration, Instant};

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    if let Err(e) = setup_logging(&cli) {
        eprintln!("{} {e}", "Error:".red().bold());
        return ExitCode::FAILURE;
    }

    let start_time = Instant::now();
    let result = run(cli).await;
    info!(
        "Application finished. Total elapsed time: {:.2?}",
        start_time.elapsed()
    );

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("{} {e}", "Error:".red().bold());
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> FindoraResult<()> {
    let config = load_config(cli.config.as_deref())?;

    match cli.command {
        Commands::Search {
            query,
            path,
            extensions,
            case_sensitive,
            sort,
            context_lines,
            max_size,
            threads,
            no_hidden,
            respect_ignore,
            format,
            stats,
        } => {
            let extensions = extensions.unwrap_or_else(|| config.search.default_extensions.clone());
            let context_lines = context_lines.unwrap_or(config.search.context_lines);
            let max_file_size = match max_size {
                Some(mb) => Some(megabytes_to_bytes(mb)),
                None => config.search.max_file_size,
            };
            let walk = WalkOptions {
                include_hidden: config.walk.include_hidden && !no_hidden,
                respect_ignore_files: config.walk.respect_ignore_files || respect_ignore,
                max_depth: config.walk.max_depth,
            };
            let options = SearchOptions::new(query, &extensions)?
                .with_case_sensitive(case_sensitive || config.search.case_sensitive)
                .with_context_lines(context_lines)
                .with_max_file_size(max_file_size)
                .with_walk_options(walk);
            let criterion = sort.unwrap_or(config.search.sort);

            let metrics = Arc::new(Metrics::new());
            let engine = SearchEngine::new(threads.or(config.search.threads), metrics.clone())?;
            let session = Arc::new(SearchSession::new(Arc::new(engine)));
            {
                let session = session.clone();
                ctrlc::set_handler(move || session.cancel())
                    .map_err(|e| FindoraError::Other(format!("Failed to install Ctrl-C handler: {e}")))?;
            }

            let pb = spinner(format!("Searching {} for '{}'", path.display(), options.query()));
            let outcome = session
                .search(path.clone(), options.clone(), criterion)
                .await;
            pb.finish_and_clear();

            match outcome? {
                SearchOutcome::Canceled => eprintln!("{}", "Search canceled".yellow()),
                SearchOutcome::Complete(results) => {
                    if results.is_empty() && format == OutputFormat::Text {
                        println!("{}", "No matches found".yellow());
                    } else {
                        let output = formatter(format, context_lines).format(
                            &results,
                            options.query(),
                            &path,
                        );
                        println!("{output}");
                    }
                }
            }

            if stats {
                eprintln!("{}", metrics.gather());
            }
        }
        Commands::Scan { path, extensions } => {
            let files = scan_directory(&path, &extensions.unwrap_or_default())?;
            for file in &files {
                println!("{}", file.display());
            }
            eprintln!("{}: {}", "Total files".cyan(), files.len());
        }
        Commands::Preview { file } => {
            let preview = read_preview(&file)?;
            println!("{} {}", "Name:".cyan(), preview.name);
            println!("{} {}", "Path:".cyan(), preview.path.display());
            println!("{}", "-".repeat(40).dimmed());
            println!("{}", preview.content_preview);
        }
        Commands::Completions { shell } => {
            let mut cmd = Cli::command();
            clap_complete::generate(shell, &mut cmd, "findora", &mut std::io::stdout());
        }
    }

    Ok(())
}

fn load_config(explicit: Option<&Path>) -> FindoraResult<Config> {
    if let Some(path) = explicit {
        return Ok(Config::load_from(path)?);
    }
    match Config::load() {
        Ok(config) => Ok(config),
        Err(e) => {
            warn!("Ignoring config file: {e:#}");
            Ok(Config::default())
        }
    }
}

fn spinner(message: String) -> ProgressBar {
    let pb = ProgressBar::new_spinner();
    if let Ok(style) = ProgressStyle::default_spinner()
        .template("{spinner:.green} [{elapsed_precise}] {msg}")
    {
        pb.set_style(style.tick_chars("⠋⠙⠹⠸⠼⠴⠦⠧⠇⠏"));
    }
    pb.set_message(message);
    pb.enable_steady_tick(Duration::from_millis(100));
    pb
}

fn setup_logging(cli: &Cli) -> FindoraResult<()> {
    let level = if cli.verbose { "info" } else { "warn" };
    let mut builder = Builder::from_env(Env::default().default_filter_or(level));

    builder.format(|buf, record| {
        use std::io::Write;
        writeln!(
            buf,
            "{} [{}] [{}] {}",
            chrono::Local::now().format("%Y-%m-%d %H:%M:%S"),
            record.level(),
            record.module_path().unwrap_or("unknown"),
            record.args()
        )
    });

    if let Some(log_path) = &cli.log {
        if let Some(parent_dir) = log_path.parent() {
            if !parent_dir.as_os_str().is_empty() && !parent_dir.exists() {
                fs::create_dir_all(parent_dir)?;
            }
        }
        let log_file = fs::File::create(log_path)?;
        builder.target(Target::Pipe(Box::new(log_file)));
    } else {
        builder.target(Target::Stderr);
    }

    builder
        .try_init()
        .map_err(|e| FindoraError::Other(e.to_string()))?;
    Ok(())
}
