use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;

use analyst_line::clients::{OpenAiClient, TavilyClient};
use analyst_line::transcript::parse_sections;
use analyst_line::{Config, ConfigError, Ctx, NoopSink, Pipeline, RunResponse, TracingSink};
use clap::{Parser, ValueEnum};
use tracing::error;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(
    name = "analyst-line",
    version,
    about = "Run the multi-analyst market research pipeline"
)]
struct Cli {
    /// The question to analyze, e.g. "Analyze AAPL"
    #[arg(required = true, trailing_var_arg = true)]
    query: Vec<String>,

    /// JSON config file; flags and environment override it
    #[arg(short, long)]
    config: Option<PathBuf>,

    #[arg(long, env = "OPENAI_API_KEY", hide_env_values = true)]
    openai_api_key: Option<String>,

    #[arg(long, env = "OPENAI_BASE_URL")]
    openai_base_url: Option<String>,

    #[arg(long, env = "OPENAI_MODEL")]
    model: Option<String>,

    #[arg(long, env = "TAVILY_API_KEY", hide_env_values = true)]
    tavily_api_key: Option<String>,

    #[arg(long)]
    max_results: Option<usize>,

    #[arg(long)]
    timeout_secs: Option<u64>,

    /// Where reasoning calls are reported
    #[arg(long, value_enum, default_value_t = TraceMode::Log)]
    trace: TraceMode,

    /// Print the {status, result|detail} envelope instead of plain text
    #[arg(long, conflicts_with = "sections")]
    json: bool,

    /// Print the transcript as JSON sections
    #[arg(long)]
    sections: bool,
}

#[derive(Clone, Copy, ValueEnum)]
enum TraceMode {
    Log,
    Off,
}

impl Cli {
    fn config(&self) -> Result<Config, ConfigError> {
        let mut config = match &self.config {
            Some(path) => Config::load(path)?,
            None => Config::default(),
        };

        if let Some(v) = &self.openai_api_key {
            config.openai_api_key = v.clone();
        }
        if let Some(v) = &self.openai_base_url {
            config.openai_base_url = v.clone();
        }
        if let Some(v) = &self.model {
            config.model = v.clone();
        }
        if let Some(v) = &self.tavily_api_key {
            config.tavily_api_key = v.clone();
        }
        if let Some(v) = self.max_results {
            config.max_results = v;
        }
        if let Some(v) = self.timeout_secs {
            config.timeout_secs = v;
        }

        config.validate()?;
        Ok(config)
    }
}

fn main() -> ExitCode {
    // .env must be loaded before clap reads the environment
    let _ = dotenvy::dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("analyst_line=info,warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let config = match cli.config() {
        Ok(config) => config,
        Err(e) => {
            error!("{e}");
            return ExitCode::FAILURE;
        }
    };

    let pipeline = match Pipeline::with_max_results(config.max_results) {
        Ok(pipeline) => pipeline,
        Err(e) => {
            error!("pipeline wiring: {e}");
            return ExitCode::FAILURE;
        }
    };

    let mut ctx = Ctx::new(
        Arc::new(OpenAiClient::new(&config)),
        Arc::new(TavilyClient::new(&config)),
    );
    ctx = match cli.trace {
        TraceMode::Log => ctx.with_sink(Arc::new(TracingSink)),
        TraceMode::Off => ctx.with_sink(Arc::new(NoopSink)),
    };

    let query = cli.query.join(" ");
    let response = RunResponse::from_result(pipeline.run(&query, &ctx));
    let ok = response.is_success();

    if cli.json {
        match serde_json::to_string_pretty(&response) {
            Ok(json) => println!("{json}"),
            Err(e) => {
                error!("encoding response: {e}");
                return ExitCode::FAILURE;
            }
        }
    } else {
        match response {
            RunResponse::Success { result } if cli.sections => {
                match serde_json::to_string_pretty(&parse_sections(&result)) {
                    Ok(json) => println!("{json}"),
                    Err(e) => {
                        error!("encoding sections: {e}");
                        return ExitCode::FAILURE;
                    }
                }
            }
            RunResponse::Success { result } => println!("{result}"),
            RunResponse::Error { detail } => error!("analysis failed: {detail}"),
        }
    }

    if ok { ExitCode::SUCCESS } else { ExitCode::FAILURE }
}
