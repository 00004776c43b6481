use clap::{Parser, Subcommand};
use folio::emit::{self, EmitOptions};
use folio::imaging::ImageCrateProbe;
use folio::pipeline::{self, BuildContext};
use folio::render::BasicRenderer;
use folio::scanner::RegexScanner;
use folio::sidecar::SidecarCache;
use folio::{config, logger, output};
use std::error::Error;
use std::path::PathBuf;
use std::process::ExitCode;

/// Shared flags for commands that assemble the site.
#[derive(clap::Args, Clone)]
struct CacheArgs {
    /// Ignore sidecar files and derive everything from the sources
    #[arg(long)]
    no_cache: bool,
}

fn version_string() -> &'static str {
    let on_tag = env!("ON_RELEASE_TAG");
    if on_tag == "true" {
        env!("CARGO_PKG_VERSION")
    } else {
        let hash = env!("GIT_HASH");
        if hash.is_empty() {
            "dev@unknown"
        } else {
            // Called once at startup
            Box::leak(format!("dev@{hash}").into_boxed_str())
        }
    }
}

#[derive(Parser)]
#[command(name = "folio")]
#[command(about = "Content pipeline for a personal site")]
#[command(long_about = "\
Content pipeline for a personal site

Builds a blog, micro posts, a gallery, a career page and a project list
into static HTML, with an RSS feed and a sitemap.

Source structure:

  site/
  ├── config.toml                  # Site config (optional)
  ├── data/
  │   ├── posts.json               # Long post metadata
  │   ├── post/2023/hello.html     # Long post bodies, one per key
  │   ├── jobs.json                # Career (optional)
  │   ├── games.json               # Games, joined to jobs by company (optional)
  │   └── hobbies.json             # Projects (optional)
  ├── micro/
  │   ├── thought.md               # Micro post, dated on first sight
  │   └── thought.md.json          # Sidecar written by folio
  └── gallery/
      └── 2021/
          ├── sketch.png           # Image page + copied asset
          └── notes.md             # Page; relative images are copied

Run 'folio gen-config' to generate a documented config.toml.")]
#[command(version = version_string())]
struct Cli {
    /// Site source directory
    #[arg(long, default_value = "site", global = true)]
    source: PathBuf,

    /// Output directory
    #[arg(long, default_value = "public_html", global = true)]
    output: PathBuf,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Assemble the site and write every page, the feed and the sitemap
    Build(CacheArgs),
    /// Assemble the site and print an inventory; writes nothing, not even sidecars
    Check(CacheArgs),
    /// Print a stock config.toml with all options documented
    GenConfig,
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            let mut message = format!("error: {err}");
            let mut source = err.source();
            while let Some(cause) = source {
                message.push_str(&format!("\n  caused by: {cause}"));
                source = cause.source();
            }
            eprintln!("{message}");
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> Result<(), Box<dyn Error>> {
    let cache_args = match cli.command {
        Command::GenConfig => {
            print!("{}", config::stock_config_toml());
            return Ok(());
        }
        Command::Build(ref args) | Command::Check(ref args) => args.clone(),
    };

    let site_config = config::load_config(&cli.source)?;
    logger::configure(&site_config.log)?;

    let probe = ImageCrateProbe;
    let scanner = RegexScanner;
    let mut sidecars = if cache_args.no_cache {
        SidecarCache::disabled()
    } else {
        SidecarCache::enabled()
    };
    if matches!(cli.command, Command::Check(_)) {
        sidecars = sidecars.without_writes();
    }
    let mut ctx =
        BuildContext::new(site_config, &cli.source, &probe, &scanner)?.with_sidecars(sidecars);

    println!("==> Assembling {}", cli.source.display());
    let model = pipeline::assemble(&mut ctx)?;

    match cli.command {
        Command::Check(_) => {
            output::print_check_output(&model);
            println!("==> Content is valid");
        }
        Command::Build(_) => {
            println!("==> Emitting → {}", cli.output.display());
            let gallery_dir = ctx.gallery_dir();
            let static_root = ctx.static_root();
            let options = EmitOptions {
                config: &ctx.config,
                output_root: &cli.output,
                gallery_dir: &gallery_dir,
                static_root: &static_root,
                build_time: ctx.build_time,
            };
            let renderer = BasicRenderer::new(&ctx.config);
            let summary = emit::emit_site(&model, &options, &renderer, ctx.pool())?;
            output::print_build_output(&summary, &cli.output);
            println!("==> Build complete: {}", cli.output.display());
        }
        Command::GenConfig => {}
    }

    Ok(())
}
