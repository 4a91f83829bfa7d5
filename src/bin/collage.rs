use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context as _;
use clap::{Parser, Subcommand};
use collage::{
    AssetCatalog as _, AssetId, CollageOpts, CollageSession, DirCatalog, DirPhotoStore,
    SessionEvent, StoreFormat, Toggle,
};
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "collage", version)]
struct Cli {
    /// Log at debug level (overridden by RUST_LOG).
    #[arg(long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// List the photos of a catalog directory.
    List(ListArgs),
    /// Compose picked photos into a collage and save it.
    Make(MakeArgs),
    /// Print the grid layout for a photo count as JSON.
    Layout(LayoutArgs),
}

#[derive(Parser, Debug)]
struct ListArgs {
    /// Catalog directory.
    #[arg(long)]
    dir: PathBuf,
}

#[derive(Parser, Debug)]
struct MakeArgs {
    /// Catalog directory.
    #[arg(long)]
    dir: PathBuf,

    /// Photo to include (file name in the catalog); repeat 2 to 9 times, in cell order.
    #[arg(long = "pick", required = true)]
    picks: Vec<String>,

    /// Output directory of the photo store.
    #[arg(long)]
    out: PathBuf,

    /// Options JSON (see `CollageOpts`).
    #[arg(long)]
    config: Option<PathBuf>,

    /// Save as JPEG instead of PNG.
    #[arg(long)]
    jpeg: bool,

    /// JPEG quality.
    #[arg(long, default_value_t = 92)]
    quality: u8,
}

#[derive(Parser, Debug)]
struct LayoutArgs {
    /// Number of photos.
    #[arg(long)]
    count: usize,

    /// Canvas side.
    #[arg(long, default_value_t = collage::DEFAULT_CANVAS_SIDE as f64)]
    side: f64,

    /// Gap between cells.
    #[arg(long, default_value_t = collage::DEFAULT_SPACING)]
    spacing: f64,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);
    match cli.cmd {
        Command::List(args) => cmd_list(args),
        Command::Make(args) => cmd_make(args),
        Command::Layout(args) => cmd_layout(args),
    }
}

fn init_tracing(verbose: bool) {
    let default = if verbose { "collage=debug" } else { "collage=info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();
}

fn cmd_list(args: ListArgs) -> anyhow::Result<()> {
    let catalog = DirCatalog::new(&args.dir)?;
    for asset in catalog.assets()? {
        println!("{}\t{}\t{}", asset.id, asset.width, asset.height);
    }
    Ok(())
}

fn cmd_make(args: MakeArgs) -> anyhow::Result<()> {
    let opts = match &args.config {
        Some(path) => CollageOpts::from_path(path)?,
        None => CollageOpts::default(),
    };
    let format = if args.jpeg {
        StoreFormat::Jpeg {
            quality: args.quality,
        }
    } else {
        StoreFormat::Png
    };

    let catalog = Arc::new(DirCatalog::new(&args.dir)?);
    let store = Arc::new(DirPhotoStore::new(&args.out, format)?);
    let mut session = CollageSession::new(catalog, store, opts)?;

    for pick in &args.picks {
        let id = AssetId::new(pick.as_str());
        match session.toggle(&id) {
            Toggle::Added(n) => tracing::debug!(asset = %id, order = n, "selected"),
            Toggle::Removed => tracing::warn!(asset = %id, "picked twice; deselected"),
            Toggle::Full => anyhow::bail!(
                "too many photos: at most {} per collage",
                collage::MAX_PHOTOS
            ),
        }
    }

    let events = session.subscribe();
    session.begin()?;
    let saved = session.save();

    for ev in events.try_iter() {
        if let SessionEvent::Progress(p) = ev {
            tracing::debug!(completed = p.completed, total = p.total, "acquisition progress");
        }
    }

    let saved = saved?;
    let skipped = saved.collage.filled.len() - saved.collage.filled_cells();
    if skipped > 0 {
        eprintln!("warning: {skipped} photo(s) could not be decoded and were left blank");
    }
    println!("{}", args.out.join(&saved.stored.0).display());
    Ok(())
}

fn cmd_layout(args: LayoutArgs) -> anyhow::Result<()> {
    let layout = collage::compute_layout(args.count, args.side, args.spacing);
    let json = serde_json::to_string_pretty(&layout).context("serialize layout")?;
    println!("{json}");
    Ok(())
}
