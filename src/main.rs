use clap::{Parser, Subcommand};
use medley::config::{self, GalleryConfig};
use medley::gallery::Gallery;
use medley::listing::PageSize;
use medley::{output, warm};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "medley")]
#[command(about = "Browsable-media gallery engine", version)]
#[command(long_about = "\
Browsable-media gallery engine

Your filesystem is the data source. Configure one or more root directories;
every path you pass to a command is resolved against them in order, and the
first root containing it wins. Previews are generated lazily into a cache
directory that mirrors the source layout:

  roots[0]/                        cache_dir/
  ├── holidays/                    ├── holidays/
  │   ├── beach.jpg                │   ├── beach.jpg      # bounded preview
  │   ├── clip.mp4                 │   ├── clip.jpg       # grabbed frame
  │   └── shot.nef                 │   ├── shot.jpg
  └── misc/                        │   └── shotORIGINAL.jpg  # full-size conversion
      └── cat.png                  └── misc/
                                       └── cat.jpg

Directories without any media in their subtree are hidden from listings.
Video previews need ffmpeg on PATH; RAW conversion needs ImageMagick.

Run 'medley gen-config' to generate a documented medley.toml.")]
struct Cli {
    /// Configuration file
    #[arg(long, default_value = "medley.toml", global = true)]
    config: PathBuf,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// List a gallery directory
    List {
        /// Logical path relative to the roots (empty for the top level)
        #[arg(default_value = "")]
        path: PathBuf,
        /// Sort key: name | size | created | modified | type | random
        #[arg(long)]
        sort: Option<String>,
        /// Sort order: asc | desc
        #[arg(long)]
        order: Option<String>,
        /// Page number (1-indexed, clamped)
        #[arg(long, default_value_t = 1)]
        page: usize,
        /// Items per page, or "all"
        #[arg(long)]
        per_page: Option<String>,
        /// Case-insensitive substring filter on names
        #[arg(long)]
        filter: Option<String>,
        /// Emit the listing as JSON instead of text
        #[arg(long)]
        json: bool,
    },
    /// Generate (or reuse) the preview for one media file, print its path
    Thumb { path: PathBuf },
    /// Resolve the servable full file for one path, print its path
    View { path: PathBuf },
    /// Pre-generate every missing preview under every root
    Warm,
    /// Validate the configuration and roots without serving anything
    Check,
    /// Print a stock medley.toml with all options documented
    GenConfig,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    // gen-config must work before any config file exists
    if matches!(cli.command, Command::GenConfig) {
        print!("{}", config::stock_config_toml());
        return Ok(());
    }

    let config = GalleryConfig::load(&cli.config)?;
    let gallery = Gallery::new(config)?;

    match cli.command {
        Command::List {
            path,
            sort,
            order,
            page,
            per_page,
            filter,
            json,
        } => {
            let mut query = gallery.default_query();
            if let Some(sort) = sort {
                query.sort = sort.parse()?;
            }
            if let Some(order) = order {
                query.order = order.parse()?;
            }
            if let Some(per_page) = per_page {
                query.page_size = parse_per_page(&per_page)?;
            }
            if let Some(filter) = filter {
                query.filter = filter;
            }
            query.page = page;

            let listing = gallery.list_directory(&path, &query)?;
            if json {
                println!("{}", serde_json::to_string_pretty(&listing)?);
            } else {
                output::print_listing(&listing);
            }
        }
        Command::Thumb { path } => {
            let preview = gallery.thumbnail(&path)?;
            println!("{}", preview.display());
        }
        Command::View { path } => {
            let file = gallery.viewable_file(&path)?;
            println!("{}", file.display());
        }
        Command::Warm => {
            let stats = warm::warm_cache(&gallery);
            println!("{stats}");
        }
        Command::Check => {
            // Gallery::new already validated; report what it accepted
            for root in &gallery.config().roots {
                println!("root: {}", root.display());
            }
            println!("cache: {}", gallery.cache_root().path().display());
            println!("Configuration is valid");
        }
        Command::GenConfig => unreachable!(),
    }

    Ok(())
}

/// Page-size argument: a positive integer or the literal "all".
fn parse_per_page(arg: &str) -> Result<PageSize, String> {
    if arg.eq_ignore_ascii_case("all") {
        return Ok(PageSize::All);
    }
    match arg.parse::<usize>() {
        Ok(n) if n > 0 => Ok(PageSize::Limit(n)),
        _ => Err(format!("invalid per-page value: {arg}")),
    }
}
