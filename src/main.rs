//! FanMatch CLI
//!
//! Fetches or reads a FanMatch page and prints its games and day summary.

use clap::{Parser, Subcommand};
use fanmatch::{parse_date_arg, Config, Result};

#[derive(Parser)]
#[command(name = "fanmatch")]
#[command(about = "Extract game predictions and results from FanMatch pages", long_about = None)]
struct Cli {
    /// Config file path
    #[arg(short, long, default_value = "fanmatch.toml")]
    config: String,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Parse a saved FanMatch page
    Parse {
        /// HTML file
        file: String,
        /// Date the page should be for (YYYY-MM-DD)
        #[arg(long)]
        date: Option<String>,
        /// Output format
        #[arg(long, default_value = "table")]
        format: OutputFormat,
    },
    /// Fetch and parse the page for a date (today when omitted)
    Fetch {
        /// Date to fetch (YYYY-MM-DD)
        #[arg(long)]
        date: Option<String>,
        /// Cache directory for HTML pages
        #[arg(long)]
        cache: Option<String>,
        /// Use only cached pages (no network requests)
        #[arg(long)]
        offline: bool,
        /// Output format
        #[arg(long, default_value = "table")]
        format: OutputFormat,
    },
    /// Write a default config file
    Init,
}

#[derive(Clone, Debug)]
enum OutputFormat {
    Table,
    Json,
    Csv,
}

impl std::str::FromStr for OutputFormat {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "table" => Ok(OutputFormat::Table),
            "json" => Ok(OutputFormat::Json),
            "csv" => Ok(OutputFormat::Csv),
            _ => Err(format!("Unknown format: {}. Use table, json, or csv.", s)),
        }
    }
}

fn main() {
    let cli = Cli::parse();

    // Initialize logging
    let log_level = if cli.verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(log_level))
        .format_timestamp(None)
        .init();

    // Load or create config
    let config = if std::path::Path::new(&cli.config).exists() {
        match Config::load(&cli.config) {
            Ok(c) => c,
            Err(e) => {
                eprintln!("Error loading config: {}", e);
                std::process::exit(1);
            }
        }
    } else {
        Config::default()
    };

    let result = match cli.command {
        Commands::Parse { file, date, format } => commands::parse(&config, &file, date, format),
        Commands::Fetch {
            date,
            cache,
            offline,
            format,
        } => commands::fetch(&config, date, cache, offline, format),
        Commands::Init => commands::init(&cli.config),
    };

    if let Err(e) = result {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

mod commands {
    use super::*;
    use fanmatch::{FanMatchPage, FanMatchScraper, FilePageSource, GameRecord, HttpPageSource};

    pub fn init(config_path: &str) -> Result<()> {
        let config = Config::default();
        config.save(config_path)?;
        println!("Created default config at {}", config_path);

        println!("\nNext steps:");
        println!("  1. Edit {} to set a session cookie or cache directory", config_path);
        println!("  2. Run 'fanmatch fetch --date YYYY-MM-DD'");
        Ok(())
    }

    pub fn parse(
        config: &Config,
        file: &str,
        date: Option<String>,
        format: OutputFormat,
    ) -> Result<()> {
        let date = date.as_deref().map(parse_date_arg).transpose()?;
        let scraper = FanMatchScraper::new(FilePageSource::new(file), config)?;
        let page = scraper.fetch(date)?;
        print_page(&page, &format)
    }

    pub fn fetch(
        config: &Config,
        date: Option<String>,
        cache: Option<String>,
        offline: bool,
        format: OutputFormat,
    ) -> Result<()> {
        let date = date.as_deref().map(parse_date_arg).transpose()?;

        let mut source = HttpPageSource::new(&config.source)?;
        if let Some(dir) = cache {
            source = source.with_cache(dir);
        }
        if offline {
            source = source.offline_only(true);
        }

        let scraper = FanMatchScraper::new(source, config)?;
        let page = scraper.fetch(date)?;
        print_page(&page, &format)
    }

    fn print_page(page: &FanMatchPage, format: &OutputFormat) -> Result<()> {
        match format {
            OutputFormat::Table => print_table(page),
            OutputFormat::Json => println!("{}", serde_json::to_string_pretty(page)?),
            OutputFormat::Csv => {
                println!("{}", GameRecord::COLUMNS.join(","));
                for game in &page.games {
                    let row: Vec<String> = game.to_row().iter().map(|v| csv_field(v)).collect();
                    println!("{}", row.join(","));
                }
            }
        }
        Ok(())
    }

    fn print_table(page: &FanMatchPage) {
        let date = page.date.as_deref().unwrap_or("?");
        println!("\nFanMatch {} ({} games)", date, page.games.len());

        if page.games.is_empty() {
            println!("No games.");
            return;
        }

        println!(
            "{:<44} {:>7} {:<22} {:>6} {:<10}",
            "Matchup", "Score", "Prediction", "Prob", "Thrill"
        );
        println!("{}", "-".repeat(93));

        for game in &page.games {
            let score = match (game.team1_score, game.team2_score) {
                (Some(a), Some(b)) => format!("{}-{}", a, b),
                _ => String::new(),
            };
            let prediction = match (&game.predicted_winner, &game.predicted_score) {
                (Some(w), Some(s)) => format!("{} {}", w, s),
                (None, Some(s)) => s.clone(),
                _ => String::new(),
            };
            let thrill = match (game.thrill_score, game.thrill_score_rank) {
                (Some(v), Some(r)) => format!("{:.1} ({})", v, r),
                (Some(v), None) => format!("{:.1}", v),
                _ => String::new(),
            };

            println!(
                "{:<44} {:>7} {:<22} {:>6} {:<10}",
                truncate(&game.matchup(), 44),
                score,
                truncate(&prediction, 22),
                game.win_probability.as_deref().unwrap_or(""),
                thrill
            );
        }

        if let Some(summary) = &page.summary {
            println!("\nDay summary");
            if let Some(v) = summary.points_per_game {
                println!("  Points per game:       {:.1}", v);
            }
            if let Some(v) = summary.average_efficiency {
                println!("  Average efficiency:    {:.1}", v);
            }
            if let Some(v) = summary.mae_margin {
                println!("  MAE (margin):          {:.1}", v);
            }
            if let Some(v) = summary.mae_total_score {
                println!("  MAE (total score):     {:.1}", v);
            }
            if let Some(r) = &summary.favorites_record {
                let expected = summary.favorites_expected_record.as_deref().unwrap_or("?");
                println!("  Favorites:             {} (expected {})", r, expected);
            }
            if let Some(e) = &summary.exact_margin {
                println!("  Exact margin:          {}", e);
            }
            if !summary.lines_of_the_night.is_empty() {
                println!("\nLines of the night");
                for line in &summary.lines_of_the_night {
                    println!("  {}", line);
                }
            }
        }
    }

    fn truncate(s: &str, max: usize) -> String {
        if s.chars().count() <= max {
            s.to_string()
        } else {
            let cut: String = s.chars().take(max.saturating_sub(1)).collect();
            format!("{}…", cut)
        }
    }

    fn csv_field(value: &str) -> String {
        if value.contains([',', '"', '\n']) {
            format!("\"{}\"", value.replace('"', "\"\""))
        } else {
            value.to_string()
        }
    }
}
