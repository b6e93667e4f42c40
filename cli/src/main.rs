//! CLI entrypoint for boardroom
//!
//! This is the main binary that wires together all layers using
//! dependency injection.

use anyhow::{Result, bail};
use boardroom_application::{
    ConversationLogger, NoConversationLogger, NoPresentation, PresentationSink,
    RunComparisonInput, RunComparisonUseCase, RunDeliberationInput, RunDeliberationUseCase,
    SessionStore,
};
use boardroom_domain::{DeliberationPolicy, OutputFormat, PromptTemplate, roster};
use boardroom_infrastructure::{
    ConfigLoader, FetchDiscussionTool, FileConfig, FileLoggingConfig, FileSessionStore,
    JsonlConversationLogger, OpenAiConfig, OpenAiReasoningAgent, ToolRegistry,
};
use boardroom_presentation::{
    Cli, Command, ConsoleFormatter, MarketArgs, ProgressReporter, SimpleProgress,
};
use clap::Parser;
use std::io::IsTerminal;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    if cli.show_config {
        ConfigLoader::print_config_sources(cli.config.as_deref());
        return Ok(());
    }

    let config = if cli.no_config {
        ConfigLoader::load_defaults()
    } else {
        ConfigLoader::load(cli.config.as_deref())?
    };

    // Keep the guard alive so the file writer flushes on exit
    let _log_guard = init_logging(cli.verbose, &config.logging);
    info!("Starting boardroom");

    let Some(command) = cli.command else {
        bail!("No command given. Run `boardroom --help` for usage.");
    };

    if !config.output.color {
        ConsoleFormatter::disable_color();
    }
    let format: OutputFormat = cli
        .output
        .map(Into::into)
        .or(config.output.format)
        .unwrap_or_default();
    let run_id = chrono::Local::now().format("%Y%m%d-%H%M%S").to_string();

    // === Dependency Injection ===
    let store: Arc<dyn SessionStore> = Arc::new(FileSessionStore::new(&config.storage.dir));
    let agent = Arc::new(build_agent(&config, Arc::clone(&store)));

    let cancellation = CancellationToken::new();
    {
        let token = cancellation.clone();
        tokio::spawn(async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                warn!("Interrupted, cancelling the running sessions");
                token.cancel();
            }
        });
    }

    let market = match &command {
        Command::Deliberate(args) => &args.market,
        Command::Compare(args) => &args.market,
    };
    let policy = policy_for(&config, market);
    let presentation = presentation_for(cli.quiet, &config, format, &policy);

    let use_case = RunDeliberationUseCase::new(agent)
        .with_params(config.deliberation.to_params())
        .with_store(store)
        .with_presentation(presentation)
        .with_conversation_logger(conversation_logger(&config.logging, &run_id))
        .with_cancellation(cancellation);

    let output = match command {
        Command::Deliberate(args) => {
            let MarketArgs {
                symbols,
                budget,
                start_year,
                prices,
                ..
            } = args.market;
            let task = PromptTemplate::investment_task(&symbols, budget, start_year, &prices);
            let input =
                RunDeliberationInput::new(args.session_id, roster::investment_house()?, task)
                    .with_policy(policy);

            let result = use_case.execute(input).await?;
            ConsoleFormatter::format_session(&result, format)
        }
        Command::Compare(args) => {
            let MarketArgs {
                symbols,
                budget,
                start_year,
                prices,
                ..
            } = args.market;
            let input = RunComparisonInput::new(symbols, budget, start_year, args.end_year)
                .with_prices(prices)
                .with_session_ids(
                    [format!("{run_id}-house-1"), format!("{run_id}-house-2")],
                    format!("{run_id}-judging"),
                )
                .with_house_policy(policy.clone())
                .with_judging_policy(policy)
                .with_summaries(config.deliberation.summarize && !args.no_summary);

            let result = RunComparisonUseCase::new(use_case).execute(input).await?;
            ConsoleFormatter::format_comparison(&result, format)
        }
    };

    println!("{}", output);

    Ok(())
}

/// Console diagnostics on stderr, plus a daily file when `[logging] dir` is set.
fn init_logging(verbose: u8, config: &FileLoggingConfig) -> Option<WorkerGuard> {
    let filter = match verbose {
        0 => match config.filter.as_deref() {
            Some(directives) => EnvFilter::new(directives),
            None => EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        },
        1 => EnvFilter::new("info"),
        2 => EnvFilter::new("debug"),
        _ => EnvFilter::new("trace"), // -vvv or more
    };
    let console = fmt::layer().with_target(false).with_writer(std::io::stderr);

    match &config.dir {
        Some(dir) => {
            let appender = tracing_appender::rolling::daily(dir, "boardroom.log");
            let (writer, guard) = tracing_appender::non_blocking(appender);
            tracing_subscriber::registry()
                .with(filter)
                .with(console)
                .with(fmt::layer().with_ansi(false).with_writer(writer))
                .init();
            Some(guard)
        }
        None => {
            tracing_subscriber::registry()
                .with(filter)
                .with(console)
                .init();
            None
        }
    }
}

fn build_agent(config: &FileConfig, store: Arc<dyn SessionStore>) -> OpenAiReasoningAgent {
    let provider = OpenAiConfig::from_file(&config.provider);
    if provider.api_key.is_none() {
        warn!(
            "No API key in ${}; requests are sent without authorization",
            config.provider.api_key_env
        );
    }

    // Judges read house transcripts by session id
    let tools = ToolRegistry::new().register(
        &[roster::MANAGER, roster::DECISION_QUALITY_JUDGE],
        Arc::new(FetchDiscussionTool::new(store)),
    );
    OpenAiReasoningAgent::new(provider).with_tools(tools)
}

fn policy_for(config: &FileConfig, market: &MarketArgs) -> DeliberationPolicy {
    let policy = config.deliberation.to_policy();
    match market.turn_budget {
        Some(budget) => policy.with_turn_budget(budget),
        None => policy,
    }
}

fn presentation_for(
    quiet: bool,
    config: &FileConfig,
    format: OutputFormat,
    policy: &DeliberationPolicy,
) -> Arc<dyn PresentationSink> {
    if quiet || format == OutputFormat::Json {
        Arc::new(NoPresentation)
    } else if std::io::stderr().is_terminal() {
        Arc::new(ProgressReporter::new(policy.turn_budget).with_turns(config.output.live))
    } else if config.output.live {
        Arc::new(SimpleProgress)
    } else {
        Arc::new(NoPresentation)
    }
}

fn conversation_logger(config: &FileLoggingConfig, run_id: &str) -> Arc<dyn ConversationLogger> {
    let logger = config
        .dir
        .as_ref()
        .filter(|_| config.conversation)
        .and_then(|dir| JsonlConversationLogger::in_dir(dir, run_id));
    match logger {
        Some(logger) => {
            info!("Conversation log: {}", logger.path().display());
            Arc::new(logger)
        }
        None => Arc::new(NoConversationLogger),
    }
}
