use clap::{Parser, Subcommand};
use marquee::fetch::HttpFetcher;
use marquee::gallery::Gallery;
use marquee::schedule::helper::preview_csv;
use marquee::schedule::{ClassSchedule, ScheduleSources};
use marquee::{assets::SiteAssets, config, gen_index, output};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "marquee")]
#[command(about = "Schedule and gallery data tools for a youth theater website")]
#[command(long_about = "\
Schedule and gallery data tools for a youth theater website

The site's class schedule and show photos are maintained by staff in
spreadsheets. This tool loads them the same way the site does, so you can
check what visitors will see, and prepares the static files the gallery
falls back to.

Schedule sources (first success wins):
  remote CSV   → schedule.csv_url  (default /class-schedule/index.csv)
  remote JSON  → schedule.json_url (default /class-schedule/index.json)
  bundled      → built-in schedule, always available

Gallery sources:
  spreadsheet      → gallery.sheet_url, one row per photo
  directory index  → <gallery.base_url>/index.json + <show>/photos.json

Site-relative URLs are fetched against `origin` (or MARQUEE_ORIGIN).

Run 'marquee gen-config' to generate a documented config.toml.")]
#[command(version)]
struct Cli {
    /// Configuration file (missing file = defaults)
    #[arg(long, default_value = "config.toml", global = true)]
    config: PathBuf,

    /// Log debug detail (RUST_LOG still takes precedence)
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Load the class schedule through the source chain and print it
    Schedule,
    /// Load the gallery and print its shows and one show's photos
    Gallery {
        /// Show slug to open (default: the first listed show)
        show: Option<String>,
    },
    /// Write index.json and per-show photos.json files for a folder of shows
    GenIndex {
        /// Directory containing one folder per show
        root: PathBuf,
        /// URL prefix written in front of each photo path (default: none, paths
        /// stay relative to gallery.base_url)
        #[arg(long, default_value = "")]
        prefix: String,
    },
    /// Check a schedule CSV export and optionally convert it to JSON
    ScheduleHelper {
        /// Schedule CSV file
        csv: PathBuf,
        /// Write the parsed rows as JSON to this file
        #[arg(long)]
        output: Option<PathBuf>,
    },
    /// Print a stock config.toml with all options documented
    GenConfig,
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    match cli.command {
        Command::Schedule => {
            let site_config = config::load_config(&cli.config, |k| std::env::var(k).ok())?;
            let assets = SiteAssets::from_config(&site_config);
            let fetcher = HttpFetcher::new(site_config.origin())?;
            let schedule = ClassSchedule::new(fetcher);
            schedule
                .load(&ScheduleSources::from_config(&site_config, &assets))
                .await;
            output::print_schedule(&schedule.state());
        }
        Command::Gallery { show } => {
            let site_config = config::load_config(&cli.config, |k| std::env::var(k).ok())?;
            let fetcher = HttpFetcher::new(site_config.origin())?;
            let gallery = Gallery::new(fetcher, &site_config);
            gallery.load().await;
            gallery.select_show(show.as_deref()).await;
            output::print_gallery(&gallery);
        }
        Command::GenIndex { root, prefix } => {
            let index = gen_index::generate(&root, &prefix)?;
            output::print_gen_index(&root, &index);
        }
        Command::ScheduleHelper { csv, output: json_path } => {
            let text = std::fs::read_to_string(&csv)?;
            let preview = preview_csv(&text)?;
            output::print_preview(&preview);
            if !preview.missing_headers.is_empty() {
                log::warn!(
                    "{} is missing expected columns: {}",
                    csv.display(),
                    preview.missing_headers.join(", ")
                );
            }
            if let Some(path) = json_path {
                std::fs::write(&path, preview.to_json()?)?;
                println!("Wrote {}", path.display());
            }
        }
        Command::GenConfig => {
            print!("{}", config::stock_config_toml());
        }
    }

    Ok(())
}

/// Route `log` output to stderr. `RUST_LOG` overrides the default level.
fn init_logging(verbose: bool) {
    let default_level = if verbose { "debug" } else { "warn" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_level))
        .format_timestamp(None)
        .init();
}
