//! CLI entrypoint for AI Ogiri
//!
//! This is the main binary that wires together all layers using
//! dependency injection.

use anyhow::{Context, Result, anyhow, bail};
use clap::Parser;
use ogiri_application::{
    BackendRoster, BatchOutcome, ConversationLogger, GameParams, InteractiveGame,
    RunBatchGameInput, RunBatchGameUseCase,
};
use ogiri_domain::{BackendId, DomainError, OutputFormat, Topic};
use ogiri_infrastructure::{ConfigLoader, FileConfig, JsonlTranscriptLogger, build_roster};
use ogiri_presentation::{Cli, ConsoleFormatter, GameRepl, StdinJudge, StreamingReporter};
use std::io::{self, Read, Write};
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() {
    let code = match run().await {
        Ok(code) => code,
        Err(e) => {
            eprintln!("\n予期せぬエラーが発生しました: {}", e);
            eprintln!("{:?}", e);
            1
        }
    };
    // A judge prompt may still be blocked on stdin; don't wait for it
    std::process::exit(code);
}

async fn run() -> Result<i32> {
    let cli = Cli::parse();

    // RUST_LOG wins over -v
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(cli.log_level()));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(io::stderr)
        .init();

    if cli.show_config {
        ConfigLoader::print_config_sources(cli.config.as_deref());
        return Ok(0);
    }

    info!("Starting AI Ogiri");

    // === Configuration ===
    let config = if cli.no_config {
        ConfigLoader::load_defaults()
    } else {
        ConfigLoader::load(cli.config.as_deref())
            .map_err(|e| anyhow!("Failed to load configuration: {}", e))?
    };

    match config.check() {
        Ok(warnings) => {
            for issue in warnings {
                warn!("Config: {}", issue);
            }
        }
        Err(e) if !cli.interactive => return Err(e.into()),
        Err(e) => {
            for issue in &e.issues {
                eprintln!("設定エラー: {}", issue);
            }
        }
    }

    if !config.output.color {
        colored::control::set_override(false);
    }

    let backends = if cli.backends.is_empty() {
        config.backends()
    } else {
        cli.backends.clone()
    };
    let params = game_params(&cli, &config)?;

    let transcript = cli.log_file.clone().or_else(|| config.log.transcript.clone());
    let logger: Option<Arc<dyn ConversationLogger>> = match transcript {
        Some(path) => {
            let logger = JsonlTranscriptLogger::open(&path)
                .with_context(|| format!("Failed to open transcript {}", path.display()))?;
            info!("Writing transcript to {}", logger.path().display());
            Some(Arc::new(logger))
        }
        None => None,
    };

    if cli.interactive {
        // Every backend gets an adapter so /backends can switch between them
        let roster = build_roster(&config, &BackendId::ALL)?;
        let mut game = InteractiveGame::new(&backends, roster, params, cli.seed)?;
        if let Some(logger) = logger {
            game = game.with_logger(logger);
        }
        GameRepl::new(game).with_progress(!cli.quiet).run().await?;
        return Ok(0);
    }

    // === Batch mode ===
    let roster = build_roster(&config, &backends)?;
    ensure_available(&roster, &backends)?;

    let Some(topic) = read_topic()? else {
        eprintln!("お題が入力されていません。");
        return Ok(1);
    };

    let cancel = CancellationToken::new();
    let on_signal = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            on_signal.cancel();
        }
    });

    let judge = Arc::new(StdinJudge::stdin());
    let mut use_case =
        RunBatchGameUseCase::new(roster.clone(), judge, params).with_cancellation(cancel);
    if let Some(logger) = logger {
        use_case = use_case.with_logger(logger);
    }

    let reporter = StreamingReporter::stdout().with_quiet(cli.quiet);
    let input = RunBatchGameInput::new(topic, backends).with_seed(cli.seed);
    let result = use_case.execute_with_progress(input, &reporter).await?;

    if result.outcome == BatchOutcome::Interrupted {
        println!("\n\nプログラムが中断されました。これまでの結果を表示します。");
    }

    let format = cli
        .format
        .map(OutputFormat::from)
        .or(config.output.format)
        .unwrap_or_default();
    let output = match format {
        OutputFormat::Text => ConsoleFormatter::format(&result, &roster),
        OutputFormat::Json => ConsoleFormatter::format_json(&result, &roster),
    };
    println!("{}", output);
    io::stdout().flush()?;

    if let BatchOutcome::Aborted(err) = &result.outcome {
        let err = anyhow::Error::new(err.clone()).context("Judge input failed");
        eprintln!("\n予期せぬエラーが発生しました: {:#}", err);
        eprintln!("{:?}", err);
        return Ok(1);
    }

    Ok(0)
}

/// Config values with command-line overrides applied
fn game_params(cli: &Cli, config: &FileConfig) -> Result<GameParams> {
    let mut params = config.game_params();
    if let Some(turns) = cli.turns_per_backend {
        if turns == 0 {
            bail!("--turns-per-backend must be greater than 0");
        }
        params = params.with_turns_per_backend(turns);
    }
    if let Some(seconds) = cli.timeout {
        if seconds == 0 {
            bail!("--timeout must be greater than 0");
        }
        params = params.with_timeout_seconds(Some(seconds));
    }
    Ok(params)
}

/// Batch games need every selected backend up front
fn ensure_available(roster: &BackendRoster, backends: &[BackendId]) -> Result<()> {
    let missing: Vec<String> = roster
        .unavailable()
        .filter(|(backend, _)| backends.contains(backend))
        .map(|(backend, reason)| format!("{}: {}", backend, reason))
        .collect();
    if !missing.is_empty() {
        bail!("Backends unavailable:\n  {}", missing.join("\n  "));
    }
    Ok(())
}

/// Read the topic from stdin until EOF
fn read_topic() -> Result<Option<Topic>> {
    println!("問題を入力してください（終了するには Ctrl+D）:");
    io::stdout().flush()?;

    let mut text = String::new();
    io::stdin()
        .read_to_string(&mut text)
        .context("Failed to read the topic from stdin")?;

    match Topic::new(&text) {
        Ok(topic) => Ok(Some(topic)),
        Err(DomainError::EmptyTopic) => Ok(None),
        Err(e) => Err(e.into()),
    }
}
