use anyhow::{bail, Context};
use clap::{Parser, Subcommand};
use mapstack::{
    command::{self, Command},
    core::config::StackConfig,
    layers::{
        manager::LayerManager,
        store::{JsonFileStore, LayerStore, MemoryStore},
    },
    offline::context::{PackContext, ZoomRange},
    LatLng, LatLngBounds,
};
use std::path::{Path, PathBuf};

/// Compose layer stacks, build offline packs and inspect command messages
#[derive(Debug, Parser)]
#[command(name = "mapstack-app", version)]
struct Cli {
    /// JSON configuration file
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    action: Action,
}

#[derive(Debug, Subcommand)]
enum Action {
    /// Import layer definitions, show them all and print the composite style
    Compose {
        files: Vec<PathBuf>,
        /// Cap every source's maxzoom
        #[arg(long)]
        max_tile_zoom: Option<u8>,
    },
    /// Build a pack context for the given layers and print its download command
    Pack {
        files: Vec<PathBuf>,
        #[arg(long)]
        name: String,
        /// south,west,north,east
        #[arg(long, value_delimiter = ',', allow_hyphen_values = true)]
        bounds: Vec<f64>,
        #[arg(long)]
        zoom_from: Option<f64>,
        #[arg(long)]
        zoom_to: Option<f64>,
    },
    /// Decode a command message
    Decode { message: String },
    /// Encode a go command
    EncodeGo {
        #[arg(allow_hyphen_values = true)]
        lat: f64,
        #[arg(allow_hyphen_values = true)]
        lng: f64,
    },
}

fn main() -> anyhow::Result<()> {
    env_logger::init();
    let cli = Cli::parse();

    let mut config = match &cli.config {
        Some(path) => StackConfig::from_file(path)
            .with_context(|| format!("reading config {}", path.display()))?,
        None => StackConfig::default(),
    };

    match cli.action {
        Action::Compose {
            files,
            max_tile_zoom,
        } => {
            if max_tile_zoom.is_some() {
                config.max_tile_zoom = max_tile_zoom;
            }
            let mut manager = load_manager(&config)?;
            for id in import_all(&mut manager, &files)? {
                manager.show(&id, false)?;
            }
            let style = manager.composite_style(&config.compose_options());
            println!("{}", style.to_json_pretty()?);
        }
        Action::Pack {
            files,
            name,
            bounds,
            zoom_from,
            zoom_to,
        } => {
            let [south, west, north, east] = bounds.as_slice() else {
                bail!("--bounds takes south,west,north,east");
            };
            let mut manager = load_manager(&config)?;
            let ids = import_all(&mut manager, &files)?;
            let zoom = ZoomRange::new(
                zoom_from.unwrap_or(config.default_zoom.from),
                zoom_to.unwrap_or(config.default_zoom.to),
            );
            let context = PackContext::build(
                manager.resolve(&ids)?,
                LatLngBounds::from_coords(*south, *west, *north, *east),
                zoom,
                name,
            );
            context.validate()?;
            println!("{}", command::encode(&[Command::Download(context)]));
        }
        Action::Decode { message } => {
            for command in command::decode(&message) {
                println!("{:?}", command);
            }
        }
        Action::EncodeGo { lat, lng } => {
            let coordinate = LatLng::new(lat, lng);
            if !coordinate.is_valid() {
                bail!("coordinate {} is out of range", coordinate);
            }
            println!("{}", command::encode(&[Command::Go(coordinate)]));
        }
    }

    Ok(())
}

fn load_manager(config: &StackConfig) -> anyhow::Result<LayerManager> {
    let store: Box<dyn LayerStore> = match &config.store_path {
        Some(path) => Box::new(JsonFileStore::new(path)),
        None => Box::new(MemoryStore::new()),
    };
    Ok(LayerManager::load(store)?)
}

fn import_all(manager: &mut LayerManager, files: &[PathBuf]) -> anyhow::Result<Vec<String>> {
    files
        .iter()
        .map(|path| {
            let result = manager
                .accept_json(&read(path)?)
                .with_context(|| format!("importing {}", path.display()))?;
            log::info!("{}: {:?}", result.id, result.outcome);
            Ok(result.id)
        })
        .collect()
}

fn read(path: &Path) -> anyhow::Result<Vec<u8>> {
    std::fs::read(path).with_context(|| format!("reading {}", path.display()))
}
