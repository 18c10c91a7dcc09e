// Module-specific lints configuration
#![allow(clippy::uninlined_format_args)]

use anyhow::{anyhow, Context, Result};
use clap::{Args, CommandFactory, Parser, Subcommand, ValueEnum};
use clap_complete::{generate, Shell};
use log::{Level, LevelFilter, Log, Metadata, Record, SetLoggerError};
use rand::rngs::StdRng;
use rand::SeedableRng;
use serde::Serialize;
use std::io::Write;

use dramaline::app_config::{self, Config};
use dramaline::app_controller::Controller;
use dramaline::corpus::Scope;
use dramaline::media::{format_transcoder_time, ClipRequest};
use dramaline::SubtitleLine;

/// CLI Wrapper for LogLevel to implement ValueEnum
#[derive(Debug, Clone, ValueEnum)]
enum CliLogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

impl From<CliLogLevel> for app_config::LogLevel {
    fn from(cli_level: CliLogLevel) -> Self {
        match cli_level {
            CliLogLevel::Error => app_config::LogLevel::Error,
            CliLogLevel::Warn => app_config::LogLevel::Warn,
            CliLogLevel::Info => app_config::LogLevel::Info,
            CliLogLevel::Debug => app_config::LogLevel::Debug,
            CliLogLevel::Trace => app_config::LogLevel::Trace,
        }
    }
}

fn level_filter(level: &app_config::LogLevel) -> LevelFilter {
    match level {
        app_config::LogLevel::Error => LevelFilter::Error,
        app_config::LogLevel::Warn => LevelFilter::Warn,
        app_config::LogLevel::Info => LevelFilter::Info,
        app_config::LogLevel::Debug => LevelFilter::Debug,
        app_config::LogLevel::Trace => LevelFilter::Trace,
    }
}

#[derive(Args, Debug, Clone, Default)]
struct ScopeArgs {
    /// Restrict to a drama id (repeatable, default: all dramas)
    #[arg(short, long = "drama", value_name = "DRAMA_ID")]
    dramas: Vec<String>,
}

impl ScopeArgs {
    fn scope(&self) -> Scope {
        Scope::from_ids(self.dramas.iter().cloned())
    }
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Find lines containing a text or matching a regex
    Search {
        /// Text or pattern to look for
        query: String,

        #[command(flatten)]
        scope: ScopeArgs,

        /// Match case exactly
        #[arg(short = 's', long)]
        case_sensitive: bool,

        /// Treat the query as a regular expression
        #[arg(short, long)]
        regex: bool,
    },

    /// Rank lines that rhyme with a text
    Rhyme {
        /// Text whose last character sets the rhyme
        text: String,

        #[command(flatten)]
        scope: ScopeArgs,

        /// Shortest candidate length
        #[arg(long)]
        min_length: Option<usize>,

        /// Longest candidate length
        #[arg(long)]
        max_length: Option<usize>,

        /// Maximum number of results
        #[arg(short = 'n', long)]
        limit: Option<usize>,
    },

    /// Suggest reply lines for a sentence
    Respond {
        /// Sentence to reply to
        text: String,

        #[command(flatten)]
        scope: ScopeArgs,

        /// Drama the sentence was taken from
        #[arg(long, requires = "from_episode")]
        from_drama: Option<String>,

        /// Episode the sentence was taken from
        #[arg(long, requires = "from_drama")]
        from_episode: Option<String>,

        /// Seed for reproducible suggestions
        #[arg(long)]
        seed: Option<u64>,
    },

    /// Sample short lines at random
    Random {
        #[command(flatten)]
        scope: ScopeArgs,

        /// Number of lines
        #[arg(short = 'n', long)]
        count: Option<usize>,

        /// Seed for reproducible sampling
        #[arg(long)]
        seed: Option<u64>,
    },

    /// Print the subtitle and name events of an episode in order
    Timeline {
        /// Episode identifier, e.g. the episode folder name
        episode: String,

        /// Drama id (default: the configured default drama)
        #[arg(short, long)]
        drama: Option<String>,
    },

    /// Show loaded corpus statistics
    Status,

    /// List configured dramas
    Dramas,

    /// Cut the video clip behind a subtitle line
    Clip {
        /// Drama id
        drama: String,

        /// Episode identifier
        episode: String,

        /// Line start in seconds
        start: f64,

        /// Line end in seconds
        end: f64,

        /// Seconds of context before and after the line
        #[arg(long)]
        context: Option<f64>,
    },

    /// Generate shell completions for dramaline
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
}

/// dramaline - find subtitle lines across TV dramas
#[derive(Parser, Debug)]
#[command(name = "dramaline")]
#[command(version)]
#[command(about = "Search, rhyme and reply lookup over drama subtitles")]
#[command(long_about = "dramaline loads per-episode subtitle annotations of several dramas and answers
substring/regex searches, rhyme queries and reply suggestions over them.

EXAMPLES:
    dramaline search 皇上                       # Lines containing 皇上 in every drama
    dramaline search -r '^臣妾.*$' -d zhenhuan  # Regex search in one drama
    dramaline rhyme 天下 -n 10                  # Ten best rhymes for 天下
    dramaline respond 你怎么来了？ --seed 7     # Reproducible reply suggestions
    dramaline random -n 5                       # Five short random lines
    dramaline timeline 后宫·甄嬛传01            # Events of one episode
    dramaline clip zhenhuan 后宫·甄嬛传01 61.5 64.2
    dramaline completions bash > dramaline.bash

CONFIGURATION:
    Configuration is stored in conf.json by default. You can specify a different
    config file with --config. If the config file doesn't exist, a default one
    will be created automatically.")]
struct CommandLineOptions {
    #[command(subcommand)]
    command: Commands,

    /// Configuration file path
    #[arg(short, long, default_value = "conf.json", global = true)]
    config: String,

    /// Set logging level
    #[arg(short, long, value_enum, global = true)]
    log_level: Option<CliLogLevel>,

    /// Print results as JSON
    #[arg(long, global = true)]
    json: bool,
}

// @struct: Custom logger implementation, filtered by the global max level
struct CustomLogger;

impl CustomLogger {
    // @initializes: Global logger
    fn init(level: LevelFilter) -> Result<(), SetLoggerError> {
        log::set_boxed_logger(Box::new(CustomLogger))?;
        log::set_max_level(level);
        Ok(())
    }

    // @returns: ANSI color and marker for a level
    fn style_for_level(level: Level) -> (&'static str, &'static str) {
        match level {
            Level::Error => ("1;31", "✖"),
            Level::Warn => ("1;33", "⚠"),
            Level::Info => ("1;32", "•"),
            Level::Debug => ("1;36", "·"),
            Level::Trace => ("1;35", "…"),
        }
    }
}

impl Log for CustomLogger {
    fn enabled(&self, metadata: &Metadata) -> bool {
        metadata.level() <= log::max_level()
    }

    fn log(&self, record: &Record) {
        if self.enabled(record.metadata()) {
            let now = chrono::Local::now().format("%H:%M:%S.%3f");
            let (color, marker) = Self::style_for_level(record.level());
            let _ = writeln!(std::io::stderr(), "\x1B[{}m{} {} {}\x1B[0m", color, now, marker, record.args());
        }
    }

    fn flush(&self) {
        let _ = std::io::stderr().flush();
    }
}

fn make_rng(seed: Option<u64>) -> StdRng {
    match seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_os_rng(),
    }
}

fn print_json<T: Serialize + ?Sized>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value).context("Failed to serialize output")?);
    Ok(())
}

fn print_line(line: &SubtitleLine) {
    println!(
        "[{}] {} {} - {}  {}",
        line.drama_id, line.episode_id, line.start_time, line.end_time, line.text
    );
}

fn print_lines(lines: &[SubtitleLine], json: bool) -> Result<()> {
    if json {
        return print_json(lines);
    }
    for line in lines {
        print_line(line);
    }
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    CustomLogger::init(LevelFilter::Info)?;

    let cli = CommandLineOptions::parse();

    if let Commands::Completions { shell } = cli.command {
        let mut cmd = CommandLineOptions::command();
        generate(shell, &mut cmd, "dramaline", &mut std::io::stdout());
        return Ok(());
    }

    let mut config = Config::load_or_create(&cli.config)?;
    if let Some(log_level) = cli.log_level.clone() {
        config.log_level = log_level.into();
    }
    log::set_max_level(level_filter(&config.log_level));

    let controller = Controller::with_config(config)?;
    run_command(&controller, cli.command, cli.json).await
}

async fn run_command(controller: &Controller, command: Commands, json: bool) -> Result<()> {
    let needs_corpus = matches!(
        command,
        Commands::Search { .. }
            | Commands::Rhyme { .. }
            | Commands::Respond { .. }
            | Commands::Random { .. }
            | Commands::Timeline { .. }
            | Commands::Status
    );
    if needs_corpus {
        controller.load_corpus(!json)?;
    }

    match command {
        Commands::Search { query, scope, case_sensitive, regex } => {
            let report = controller.search(&query, &scope.scope(), case_sensitive, regex);
            if json {
                return print_json(&report);
            }
            print_lines(&report.lines, false)?;
            println!("{} line(s) found", report.lines.len());
        }

        Commands::Rhyme { text, scope, min_length, max_length, limit } => {
            let report = controller.rhyme(&text, &scope.scope(), min_length, max_length, limit);
            if json {
                return print_json(&report);
            }
            match &report.source_final {
                Some(source_final) => println!("Rhyming on final '{}'", source_final),
                None => println!("No rhymable final in '{}'", text),
            }
            for scored in &report.matches {
                print!("{:>5.1}  ", scored.score);
                print_line(&scored.line);
            }
        }

        Commands::Respond { text, scope, from_drama, from_episode, seed } => {
            let current = from_drama.as_deref().zip(from_episode.as_deref());
            let lines = controller.respond(&text, current, &scope.scope(), &mut make_rng(seed));
            print_lines(&lines, json)?;
        }

        Commands::Random { scope, count, seed } => {
            let lines = controller.random(&scope.scope(), count, &mut make_rng(seed));
            print_lines(&lines, json)?;
        }

        Commands::Timeline { episode, drama } => {
            let drama_id = match drama {
                Some(id) => id,
                None => controller
                    .catalog()
                    .default_drama()
                    .map(|d| d.id.clone())
                    .ok_or_else(|| anyhow!("No drama given and no default drama configured"))?,
            };
            let entries = controller
                .timeline(&drama_id, &episode)
                .ok_or_else(|| anyhow!("Episode '{}' of '{}' is not loaded", episode, drama_id))?;
            if json {
                return print_json(&entries);
            }
            for entry in &entries {
                println!("{:>10.3}  {:<14} {:<12} {}", entry.seconds, entry.kind.as_str(), entry.timestamp, entry.label);
            }
        }

        Commands::Status => {
            let status = controller.status();
            if json {
                return print_json(&status);
            }
            println!("Loaded at {}", status.loaded_at);
            for drama in &status.stats.dramas {
                println!("  {:<12} {:>4} episodes {:>7} subtitles", drama.drama_id, drama.episode_count, drama.subtitle_count);
            }
            println!(
                "  {:<12} {:>4} episodes {:>7} subtitles",
                "total", status.stats.total_episodes, status.stats.total_subtitles
            );
        }

        Commands::Dramas => {
            let dramas = controller.dramas();
            if json {
                return print_json(&dramas);
            }
            for drama in &dramas {
                println!("{:<12} {} (episodes {}-{})", drama.id, drama.name, drama.episode_start, drama.episode_end);
            }
        }

        Commands::Clip { drama, episode, start, end, context } => {
            let request = ClipRequest {
                drama_id: drama,
                episode_id: episode,
                start_seconds: start,
                end_seconds: end,
                context_seconds: context.unwrap_or(controller.config().clip.context_seconds),
            };
            let clip = controller.clip(&controller.clip_extractor(), &request).await?;
            if json {
                return print_json(&clip);
            }
            println!(
                "{} ({} +{:.1}s{})",
                clip.path.display(),
                format_transcoder_time(clip.window.start),
                clip.window.duration(),
                if clip.cached { ", cached" } else { "" }
            );
        }

        Commands::Completions { .. } => {}
    }

    Ok(())
}
