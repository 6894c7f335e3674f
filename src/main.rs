//! rvtrails - developer CLI
//!
//! Browses the campground directory from a terminal using the same filter,
//! bookmark, throttle and directions logic as the app.
//!
//! # Usage
//!
//! ```bash
//! rvtrails list                                  # Every campground
//! rvtrails list --hookup full --search az        # Full hookups in Arizona
//! rvtrails list --bookmarked                     # Bookmarks only
//! rvtrails show tucson-az-catalina-state-park    # Detail sheet (counts a view)
//! rvtrails bookmark tucson-az-catalina-state-park
//! rvtrails directions <id> --platform android --app google
//! rvtrails stats --json
//! rvtrails --dataset ./campgrounds.json list     # Use another dataset file
//! ```

use clap::{Parser, Subcommand};
use rvtrails::bookmarks::BookmarkStore;
use rvtrails::core::dataset::{self, Dataset};
use rvtrails::core::filter::filter_with_summary;
use rvtrails::directions::{DirectionsAction, DirectionsTarget, Platform, build_urls};
use rvtrails::prefs::{self, MapApp};
use rvtrails::store::FileStore;
use rvtrails::throttle::{ViewDecision, ViewThrottle};
use rvtrails::utils::{strip_html, truncate_string};
use rvtrails::viewport::plan::{FitPlan, plan_fit};
use rvtrails::{CampgroundEntry, Error, FilterCriteria, HookupFilter, Result, billing, config};
use shadow_rs::shadow;
use std::path::PathBuf;
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

shadow!(build);

#[derive(Parser)]
#[command(name = "rvtrails")]
#[command(about = "RV campgrounds with bicycle-trail access", long_about = None)]
struct Cli {
    /// Dataset file to use instead of the bundled one
    #[arg(long, global = true, value_name = "PATH")]
    dataset: Option<PathBuf>,
    /// Log at debug level
    #[arg(short, long, global = true)]
    verbose: bool,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List campgrounds matching the filters
    List {
        /// Hookup filter (all, full or partial)
        #[arg(long, default_value = "all")]
        hookup: HookupFilter,
        /// Search by name, city or state (2+ characters)
        #[arg(short, long, default_value = "")]
        search: String,
        /// Only bookmarked campgrounds
        #[arg(short, long)]
        bookmarked: bool,
        /// Print matching entries as JSON
        #[arg(long)]
        json: bool,
    },
    /// Show a campground's details
    Show {
        /// Stable campground ID (see `list`)
        id: String,
    },
    /// Dataset statistics
    Stats {
        #[arg(long)]
        json: bool,
    },
    /// Toggle a bookmark
    Bookmark { id: String },
    /// List bookmarked campgrounds
    Bookmarks,
    /// Print map app links for a campground
    Directions {
        id: String,
        /// Target platform (ios, android or web)
        #[arg(long, default_value = "ios")]
        platform: Platform,
        /// Map app (apple, google or waze); defaults to the saved preference
        #[arg(long)]
        app: Option<MapApp>,
        /// Search by name instead of routing to the coordinates
        #[arg(long)]
        search: bool,
    },
    /// Build information
    Version,
}

fn init_logging(verbose: bool) {
    let default_level = if verbose { "debug" } else { "info" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    // Set up logging to file
    if let Some(mut log_path) = rvtrails::utils::get_state_dir() {
        log_path.push("rvtrails.log");
        if let Ok(file) = std::fs::File::create(log_path) {
            tracing_subscriber::fmt()
                .with_env_filter(filter)
                .with_ansi(false)
                .with_writer(file)
                .init();
            return;
        }
    }
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn main() -> ExitCode {
    let _ = rvtrails::utils::ensure_dirs();
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let runtime = match tokio::runtime::Runtime::new() {
        Ok(runtime) => runtime,
        Err(e) => {
            eprintln!("Error: failed to start async runtime: {e}");
            return ExitCode::FAILURE;
        }
    };

    match runtime.block_on(handle_cli(cli)) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            if let Some(alert) = e.user_alert() {
                eprintln!("{}: {}", alert.title, alert.message);
                for suggestion in alert.suggestions {
                    eprintln!("  - {suggestion}");
                }
            } else {
                eprintln!("Error: {e}");
            }
            ExitCode::FAILURE
        }
    }
}

fn open_store() -> Result<FileStore> {
    FileStore::open_default()
        .ok_or_else(|| Error::Internal("no data directory available for local storage".into()))
}

async fn load_dataset(override_path: Option<PathBuf>) -> Result<&'static Dataset> {
    let config = config::load_config().await;
    match override_path.or(config.dataset_path) {
        Some(path) => {
            tracing::info!(path = %path.display(), "Loading dataset file");
            dataset::init_global(Dataset::load_file(&path).await?)
        }
        None => Ok(dataset::global()),
    }
}

fn find_entry<'a>(dataset: &'a Dataset, id: &str) -> Result<&'a CampgroundEntry> {
    dataset
        .find(id)
        .ok_or_else(|| Error::NotFound(id.to_string()))
}

fn print_row(entry: &CampgroundEntry, bookmarked: bool) {
    println!(
        "{} {:<48} {:<8} {:<32} {}, {}",
        if bookmarked { "*" } else { " " },
        entry.id(),
        entry.hookup_type,
        truncate_string(entry.name().unwrap_or_default(), 32),
        entry.city,
        entry.state,
    );
}

fn print_detail(entry: &CampgroundEntry) {
    let Some(campground) = &entry.campground else {
        return;
    };
    println!("{}", campground.name);
    println!("{}, {} · {} hookups", entry.city, entry.state, entry.hookup_type);
    if let Some(kind) = &campground.kind {
        println!("Type: {kind}");
    }
    if let Some(c) = entry.coordinate {
        println!("Location: {:.5}, {:.5}", c.latitude, c.longitude);
    }
    if let Some(info) = &campground.info {
        println!("\n{}", strip_html(info));
    }
    if let Some(notes) = &campground.notes {
        println!("\nNotes: {}", strip_html(notes));
    }
    if let Some(link) = &campground.link {
        println!("Website: {link}");
    }
    if let Some(directions) = &entry.directions {
        println!("\nDirections: {}", strip_html(directions));
    }
    if let Some(other) = &entry.other {
        println!("\n{}", strip_html(other));
    }
    for trail in &entry.trails {
        println!("\nTrail: {}", trail.name);
        for (label, value) in [("Distance", &trail.distance), ("Surface", &trail.surface)] {
            if let Some(value) = value {
                println!("  {label}: {value}");
            }
        }
        if let Some(description) = &trail.description {
            println!("  {}", strip_html(description).replace('\n', "\n  "));
        }
    }
    if let Some(contributor) = &entry.contributor {
        match &contributor.location {
            Some(location) => println!("\nContributed by {} ({location})", contributor.name),
            None => println!("\nContributed by {}", contributor.name),
        }
        match (&contributor.blog, &contributor.blog_link) {
            (Some(blog), Some(link)) => println!("  Their blog: {blog} ({link})"),
            (Some(text), None) | (None, Some(text)) => println!("  Their blog: {text}"),
            (None, None) => {}
        }
    }
    match (&entry.blog_post, &entry.blog_post_link) {
        (Some(post), Some(link)) => println!("Blog: {post} ({link})"),
        (Some(text), None) | (None, Some(text)) => println!("Blog: {text}"),
        (None, None) => {}
    }
}

async fn handle_cli(cli: Cli) -> Result<()> {
    if let Commands::Version = cli.command {
        println!("rvtrails {}", build::PKG_VERSION);
        println!("commit: {}{}", build::SHORT_COMMIT, if build::GIT_CLEAN { "" } else { " (dirty)" });
        println!("built:  {}", build::BUILD_TIME);
        println!("rustc:  {}", build::RUST_VERSION);
        return Ok(());
    }

    let store = open_store()?;
    if prefs::is_first_launch(&store).await {
        // stderr keeps `--json` output parseable
        eprintln!("Welcome to rvtrails! Run `rvtrails --help` for commands.\n");
        if let Err(e) = prefs::mark_launched(&store).await {
            tracing::warn!("Could not record first launch: {e}");
        }
    }

    let dataset = load_dataset(cli.dataset).await?;

    match cli.command {
        Commands::List {
            hookup,
            search,
            bookmarked,
            json,
        } => {
            let mut bookmarks = BookmarkStore::new(store);
            let state = bookmarks.load().await.clone();
            let criteria = FilterCriteria::new()
                .with_hookup(hookup)
                .with_search(&search)
                .with_bookmarks(bookmarked, state.ids());
            let (results, summary) = filter_with_summary(dataset.entries(), &criteria);

            if json {
                println!("{}", serde_json::to_string_pretty(&results)?);
                return Ok(());
            }

            for entry in &results {
                print_row(entry, bookmarks.contains(entry.id()));
            }
            println!(
                "\nShowing {} of {} campgrounds",
                summary.matched, summary.displayable
            );
            let single_delta = config::load_config().await.fitter_config().single_result_delta;
            match plan_fit(&criteria, &results, dataset.entries(), single_delta) {
                Some(FitPlan::Single { id, .. }) => println!("Map: zoom to {id} and open its details"),
                Some(plan) => println!("Map: {}", plan.kind()),
                None => println!("Map: unchanged (nothing to show)"),
            }
        }
        Commands::Show { id } => {
            let entry = find_entry(dataset, &id)?;
            let config = config::load_config().await;
            let billing = billing::NoBilling;
            let premium = billing::is_premium(&billing).await;
            let mut throttle = ViewThrottle::new(store, billing, config.throttle_config());

            match throttle.record_view(chrono::Utc::now(), premium).await {
                ViewDecision::Paywall => {
                    println!(
                        "You've used your {} free campground views for now. Upgrade to premium for unlimited access.",
                        config.free_view_limit
                    );
                }
                decision => {
                    print_detail(entry);
                    if let ViewDecision::Allowed { remaining } = decision {
                        println!("\n({remaining} free views left)");
                    }
                }
            }
        }
        Commands::Stats { json } => {
            let stats = dataset.stats();
            if json {
                println!("{}", serde_json::to_string_pretty(&stats)?);
            } else {
                println!("Records:        {}", stats.total);
                println!("Campgrounds:    {}", stats.displayable);
                println!("On the map:     {}", stats.mappable);
                println!("Full hookups:   {}", stats.full_hookups);
                println!("Partial:        {}", stats.partial_hookups);
                println!("States:         {}", stats.states);
                if stats.rejected > 0 {
                    println!("Rejected:       {}", stats.rejected);
                }
            }
        }
        Commands::Bookmark { id } => {
            let entry = find_entry(dataset, &id)?;
            let mut bookmarks = BookmarkStore::new(store);
            let name = entry.name().unwrap_or_default();
            if bookmarks.toggle(entry.id()).await? {
                println!("Bookmarked {name}");
            } else {
                println!("Removed bookmark for {name}");
            }
        }
        Commands::Bookmarks => {
            let mut bookmarks = BookmarkStore::new(store);
            bookmarks.load().await;
            let ids = bookmarks.ids();
            if ids.is_empty() {
                println!("No bookmarks yet. Add one with `rvtrails bookmark <id>`.");
            }
            for id in ids {
                match dataset.find(id) {
                    Some(entry) => print_row(entry, true),
                    // Dataset updates can rename or drop entries
                    None => println!("* {id} (no longer in the directory)"),
                }
            }
        }
        Commands::Directions {
            id,
            platform,
            app,
            search,
        } => {
            let entry = find_entry(dataset, &id)?;
            let app = match app {
                Some(app) => app,
                None => prefs::map_app(&store).await.unwrap_or(match platform {
                    Platform::Ios => MapApp::Apple,
                    Platform::Android | Platform::Web => MapApp::Google,
                }),
            };
            let action = if search {
                DirectionsAction::Search
            } else {
                DirectionsAction::Directions
            };
            let links = build_urls(&DirectionsTarget::from_entry(entry), app, platform, action);
            println!("{} ({action})", app.label());
            if let Some(native) = &links.native {
                println!("  app: {native}");
            }
            println!("  web: {}", links.web);
        }
        Commands::Version => {}
    }
    Ok(())
}
