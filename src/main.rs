//! CLI entry point for `spamlens`.

use std::io::Read;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use clap::{CommandFactory, Parser, Subcommand};
use indicatif::{ProgressBar, ProgressStyle};

use spamlens::config::{self, Config};
use spamlens::error::{ErrorClass, SpamError};
use spamlens::model::prediction::PredictionResult;
use spamlens::parser::raw::decode_input;
use spamlens::parser::EmailParser;
use spamlens::predict::Predictor;

#[derive(Parser)]
#[command(
    name = "spamlens",
    version,
    about = "Classify emails as spam or ham and explain the decision"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Config file (overrides $SPAMLENS_CONFIG and the default location)
    #[arg(long, global = true, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Model artifact (JSON)
    #[arg(long, global = true, value_name = "FILE", env = "SPAMLENS_MODEL")]
    model: Option<PathBuf>,

    /// Vectorizer artifact (JSON)
    #[arg(long, global = true, value_name = "FILE", env = "SPAMLENS_VECTORIZER")]
    vectorizer: Option<PathBuf>,

    /// Verbose logging (-v info, -vv debug, -vvv trace)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    verbose: u8,
}

#[derive(Subcommand)]
enum Commands {
    /// Classify a single message (reads stdin when FILE is omitted or "-")
    Predict {
        file: Option<PathBuf>,
        #[arg(long)]
        json: bool,
        /// Number of features in the explanation
        #[arg(long, value_name = "N")]
        top: Option<usize>,
    },
    /// Classify many messages, one result per line
    Batch {
        #[arg(required = true)]
        files: Vec<PathBuf>,
        #[arg(long)]
        json: bool,
    },
    /// Show the tokens extracted from a message without classifying it
    Tokens {
        file: Option<PathBuf>,
        #[arg(long)]
        json: bool,
    },
    /// Report whether the model artifacts are loaded
    Health {
        #[arg(long)]
        json: bool,
    },
    /// Print the effective configuration as TOML
    Config {
        /// Write it to the config file location instead
        #[arg(long)]
        save: bool,
    },
    /// Generate shell completions
    Completions {
        #[arg(value_enum)]
        shell: clap_complete::Shell,
    },
    /// Generate a man page
    Manpage,
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    // Load configuration
    let mut config = match &cli.config {
        Some(path) => config::load_config_from(path),
        None => config::load_config(),
    };
    if let Some(model) = &cli.model {
        config.artifacts.model_path = Some(model.clone());
    }
    if let Some(vectorizer) = &cli.vectorizer {
        config.artifacts.vectorizer_path = Some(vectorizer.clone());
    }

    // Configure logging: stderr + optional log file
    let log_level = match cli.verbose {
        0 => config.general.log_level.clone(),
        1 => "info".to_string(),
        2 => "debug".to_string(),
        _ => "trace".to_string(),
    };
    let _guard = setup_logging(&log_level, &config);

    let result = match cli.command {
        Commands::Predict { file, json, top } => {
            if let Some(top) = top {
                config.classifier.top_features = top;
            }
            cmd_predict(&config, file.as_deref(), json)
        }
        Commands::Batch { files, json } => cmd_batch(&config, &files, json),
        Commands::Tokens { file, json } => cmd_tokens(&config, file.as_deref(), json),
        Commands::Health { json } => cmd_health(&config, json),
        Commands::Config { save } => cmd_config(&config, cli.config.as_deref(), save),
        Commands::Completions { shell } => cmd_completions(shell),
        Commands::Manpage => cmd_manpage(),
    };

    match result {
        Ok(code) => code,
        Err(e) => {
            eprintln!("Error: {e:#}");
            ExitCode::FAILURE
        }
    }
}

/// Set up tracing with stderr output and optional file logging.
fn setup_logging(
    level: &str,
    config: &Config,
) -> Option<tracing_appender::non_blocking::WorkerGuard> {
    use tracing_subscriber::layer::SubscriberExt;
    use tracing_subscriber::util::SubscriberInitExt;

    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(level));

    let stderr_layer = tracing_subscriber::fmt::layer().with_writer(std::io::stderr);

    // Try to set up file logging
    let log_dir = config::cache_dir(config);
    if std::fs::create_dir_all(&log_dir).is_ok() {
        let file_appender = tracing_appender::rolling::never(&log_dir, config::LOG_FILE_NAME);
        let (writer, guard) = tracing_appender::non_blocking(file_appender);
        let file_layer = tracing_subscriber::fmt::layer()
            .with_ansi(false)
            .with_writer(writer);

        tracing_subscriber::registry()
            .with(env_filter)
            .with(stderr_layer)
            .with(file_layer)
            .init();
        Some(guard)
    } else {
        // Fall back to stderr only
        tracing_subscriber::registry()
            .with(env_filter)
            .with(stderr_layer)
            .init();
        None
    }
}

/// Read a message from `path`, or stdin when it is `None` or `-`.
fn read_message(path: Option<&Path>) -> anyhow::Result<String> {
    let bytes = match path {
        Some(p) if p != Path::new("-") => {
            std::fs::read(p).map_err(|e| SpamError::io(p, e))?
        }
        _ => {
            let mut buf = Vec::new();
            std::io::stdin().read_to_end(&mut buf)?;
            buf
        }
    };
    Ok(decode_input(&bytes).into_owned())
}

/// Exit code for a library error: 2 for bad input, 3 when the model is missing.
fn exit_code_for(err: &SpamError) -> ExitCode {
    match err.class() {
        ErrorClass::ClientInput => ExitCode::from(2),
        ErrorClass::Unavailable => ExitCode::from(3),
        ErrorClass::Internal => ExitCode::FAILURE,
    }
}

fn print_error(err: &SpamError, json: bool) {
    if json {
        println!("{}", serde_json::json!({ "error": err.to_string() }));
    } else {
        eprintln!("Error: {err}");
    }
}

fn cmd_predict(config: &Config, file: Option<&Path>, json: bool) -> anyhow::Result<ExitCode> {
    let raw = read_message(file)?;
    let predictor = Predictor::from_config(config);

    match predictor.predict(&raw) {
        Ok(result) => {
            if json {
                println!("{}", serde_json::to_string_pretty(&result)?);
            } else {
                print_prediction_table(&result);
            }
            Ok(ExitCode::SUCCESS)
        }
        Err(e) => {
            print_error(&e, json);
            Ok(exit_code_for(&e))
        }
    }
}

fn cmd_batch(config: &Config, files: &[PathBuf], json: bool) -> anyhow::Result<ExitCode> {
    let predictor = Predictor::from_config(config);
    if !predictor.models_loaded() {
        let err = SpamError::UnavailableModel("model artifacts not loaded".into());
        print_error(&err, json);
        return Ok(exit_code_for(&err));
    }

    let pb = ProgressBar::new(files.len() as u64);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} Classifying [{bar:40.cyan/blue}] {pos}/{len} ({eta})")
            .expect("valid template")
            .progress_chars("#>-"),
    );

    let mut spam = 0usize;
    let mut failed = 0usize;
    for path in files {
        let outcome = read_message(Some(path)).and_then(|raw| Ok(predictor.predict(&raw)?));
        let line = match outcome {
            Ok(result) => {
                if result.is_spam() {
                    spam += 1;
                }
                if json {
                    serde_json::json!({ "file": path, "result": result }).to_string()
                } else {
                    format!(
                        "{:<5} {:>6.2}%  {}",
                        result.prediction,
                        result.probability.spam * 100.0,
                        path.display()
                    )
                }
            }
            Err(e) => {
                failed += 1;
                tracing::warn!(path = %path.display(), error = %e, "Failed to classify message");
                if json {
                    serde_json::json!({ "file": path, "error": format!("{e:#}") }).to_string()
                } else {
                    format!("ERROR {e:#}  {}", path.display())
                }
            }
        };
        pb.suspend(|| println!("{line}"));
        pb.inc(1);
    }
    pb.finish_and_clear();

    if !json {
        eprintln!(
            "{} messages: {} spam, {} ham, {} failed",
            files.len(),
            spam,
            files.len() - spam - failed,
            failed
        );
    }

    Ok(if failed > 0 {
        ExitCode::FAILURE
    } else {
        ExitCode::SUCCESS
    })
}

fn cmd_tokens(config: &Config, file: Option<&Path>, json: bool) -> anyhow::Result<ExitCode> {
    let raw = read_message(file)?;
    let parser = EmailParser::from_config(config);

    let parsed = match parser.parse(&raw) {
        Ok(parsed) => parsed,
        Err(e) => {
            print_error(&e, json);
            return Ok(exit_code_for(&e));
        }
    };

    if json {
        let value = serde_json::json!({
            "content_type": parsed.content_type(),
            "subject_tokens": parsed.subject_tokens(),
            "body_tokens": parsed.body_tokens(),
            "total_tokens": parsed.all_tokens().len(),
        });
        println!("{}", serde_json::to_string_pretty(&value)?);
    } else {
        println!("Content-Type: {}", parsed.content_type());
        println!("Subject:      {}", parsed.subject_tokens().join(" "));
        println!("Body:         {}", parsed.body_tokens().join(" "));
        println!("Total tokens: {}", parsed.all_tokens().len());
    }
    Ok(ExitCode::SUCCESS)
}

fn cmd_health(config: &Config, json: bool) -> anyhow::Result<ExitCode> {
    let predictor = Predictor::from_config(config);
    let health = predictor.health();

    if json {
        println!("{}", serde_json::to_string_pretty(&health)?);
    } else {
        println!("Status:        {}", health.status);
        println!("Models loaded: {}", health.models_loaded);
        for artifact in &health.artifacts {
            println!(
                "  {:<10} {}  sha256:{}",
                artifact.kind,
                artifact.path.display(),
                &artifact.sha256[..16]
            );
        }
    }

    Ok(if health.models_loaded {
        ExitCode::SUCCESS
    } else {
        ExitCode::from(3)
    })
}

fn cmd_config(config: &Config, explicit: Option<&Path>, save: bool) -> anyhow::Result<ExitCode> {
    if save {
        let path = match explicit {
            Some(p) => p.to_path_buf(),
            None => config::config_file_path()
                .ok_or_else(|| anyhow::anyhow!("Could not determine config file path"))?,
        };
        config::save_config(config, &path)?;
        println!("Saved {}", path.display());
    } else {
        print!("{}", toml::to_string_pretty(config)?);
    }
    Ok(ExitCode::SUCCESS)
}

/// Generate shell completions and print to stdout.
fn cmd_completions(shell: clap_complete::Shell) -> anyhow::Result<ExitCode> {
    let mut cmd = Cli::command();
    clap_complete::generate(shell, &mut cmd, "spamlens", &mut std::io::stdout());
    Ok(ExitCode::SUCCESS)
}

/// Generate a man page and print to stdout.
fn cmd_manpage() -> anyhow::Result<ExitCode> {
    let cmd = Cli::command();
    let man = clap_mangen::Man::new(cmd);
    let mut buf = Vec::new();
    man.render(&mut buf)?;
    std::io::Write::write_all(&mut std::io::stdout(), &buf)?;
    Ok(ExitCode::SUCCESS)
}

fn print_prediction_table(result: &PredictionResult) {
    println!("Prediction:   {}", result.prediction);
    println!(
        "Probability:  spam {:.2}%  ham {:.2}%",
        result.probability.spam * 100.0,
        result.probability.ham * 100.0
    );
    println!("Content-Type: {}", result.parsed_content.content_type);
    println!("Tokens:       {}", result.total_tokens);

    if result.feature_weights.is_empty() {
        println!("\nNo known words found in this message.");
        return;
    }

    println!("\n{:<24} {:>10} {:>7}", "Word", "Weight", "Count");
    println!("{}", "─".repeat(43));
    for fw in &result.feature_weights {
        let word: String = fw.word.chars().take(24).collect();
        println!("{:<24} {:>+10.4} {:>7}", word, fw.weight, fw.count);
    }
}
