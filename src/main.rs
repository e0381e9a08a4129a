use clap::{Parser, Subcommand};
use sketchbook::pipeline::{self, BuildContext};
use sketchbook::{config, output};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "sketchbook")]
#[command(about = "Static site generator for sketch and photo collections")]
#[command(long_about = "\
Static site generator for sketch and photo collections

Every subdirectory of the source root is a collection. Each JPEG in a
collection gets a full-size rendition, a thumbnail, and its own page with
previous/next links. Every collection gets an index page, and the site gets
a homepage listing all collections.

Project structure:

  .
  ├── config.toml                  # Optional, see 'sketchbook gen-config'
  ├── content/sketches/
  │   ├── A/
  │   │   ├── cat.jpg              # IPTC title \"Cat Nap\" → A/cat-nap.html
  │   │   └── dog.jpg              # No title → A/dog.html
  │   └── B/                       # Empty collection → B/index.html only
  ├── templates/
  │   ├── start.html               # Layout header, {{{start}}} in every page
  │   ├── end.html                 # Layout footer, {{{end}}} in every page
  │   ├── index.html               # Homepage
  │   └── sketches/
  │       ├── index.html           # Collection index
  │       └── page.html            # Item page
  └── assets/                      # Copied into the output root

Metadata (IPTC):
  Title:    Object Name (2:05), also used for the page slug
  Caption:  Caption/Abstract (2:120)
  Created:  Date Created (2:55)

Set RUST_LOG to override log filtering (e.g. RUST_LOG=sketchbook=debug).")]
#[command(version)]
struct Cli {
    /// Directory containing config.toml; relative config paths resolve against it
    #[arg(long, default_value = ".", global = true)]
    config_dir: PathBuf,

    /// Source root (one subdirectory per collection)
    #[arg(long, global = true)]
    source: Option<PathBuf>,

    /// Output directory
    #[arg(long, global = true)]
    output: Option<PathBuf>,

    /// Template directory
    #[arg(long, global = true)]
    templates: Option<PathBuf>,

    /// Static asset directory
    #[arg(long, global = true)]
    assets: Option<PathBuf>,

    /// Log per-item progress
    #[arg(short, long, global = true, conflicts_with = "quiet")]
    verbose: bool,

    /// Only log warnings and errors
    #[arg(short, long, global = true)]
    quiet: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Build the site: renditions, pages, indexes, homepage, assets
    Build {
        /// Exit with an error if any item, page, or step failed
        #[arg(long)]
        strict: bool,
    },
    /// Discover collections and read metadata without writing anything
    Check,
    /// Print a stock config.toml with all options documented
    GenConfig,
}

impl Cli {
    fn log_filter(&self) -> EnvFilter {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            let level = if self.verbose {
                "debug"
            } else if self.quiet {
                "warn"
            } else {
                "info"
            };
            EnvFilter::new(format!("sketchbook={level}"))
        })
    }

    /// Load config.toml and apply path overrides from flags.
    fn load_config(&self) -> Result<config::BuildConfig, config::ConfigError> {
        let mut config = config::load_config(&self.config_dir)?;
        let overrides = [
            (&self.source, &mut config.source),
            (&self.output, &mut config.output),
            (&self.templates, &mut config.templates),
            (&self.assets, &mut config.assets),
        ];
        for (flag, target) in overrides {
            if let Some(path) = flag {
                *target = path.clone();
            }
        }
        Ok(config)
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    if let Command::GenConfig = cli.command {
        print!("{}", config::stock_config_toml());
        return Ok(());
    }

    tracing_subscriber::fmt()
        .with_env_filter(cli.log_filter())
        .with_writer(std::io::stderr)
        .init();

    let config = cli.load_config()?;
    let ctx = BuildContext::load(config)?;

    match cli.command {
        Command::Build { strict } => {
            println!(
                "==> Building {} → {}",
                ctx.config.source.display(),
                ctx.config.output.display()
            );
            let summary = pipeline::run(&ctx).await;
            output::print_build_summary(&summary);
            if strict && !summary.is_clean() {
                let message = format!(
                    "build finished with {} failure(s)",
                    summary.failure_count()
                );
                return Err(message.into());
            }
        }
        Command::Check => {
            println!("==> Checking {}", ctx.config.source.display());
            let summary = pipeline::check(&ctx).await;
            output::print_check_inventory(&summary);
            if !summary.is_clean() {
                return Err(format!("found {} problem(s)", summary.failure_count()).into());
            }
            println!("==> Content is valid");
        }
        Command::GenConfig => {}
    }

    Ok(())
}
