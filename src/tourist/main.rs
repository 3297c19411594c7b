use clap::Parser;
use colored::*;
use directories::ProjectDirs;
use std::path::PathBuf;
use tokio::sync::broadcast::error::TryRecvError;
use tourist::cache::PhotoCache;
use tourist::commands::config::ConfigAction;
use tourist::commands::{CmdMessage, CmdResult, MessageLevel};
use tourist::config::TouristConfig;
use tourist::error::{Result, TouristError};
use tourist::events::ChangeEvent;
use tourist::flickr::FlickrClient;
use tourist::index::{DisplayIndex, DisplayPhoto, DisplayPin};
use tourist::model::{Photo, Pin};
use tourist::store::fs::FileStore;
use tracing_subscriber::EnvFilter;

mod args;
use args::{Cli, Commands, PhotoCommand, PinCommand};

#[tokio::main]
async fn main() {
    if let Err(e) = run().await {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

struct AppContext {
    cache: PhotoCache<FileStore, FlickrClient>,
    data_dir: PathBuf,
}

async fn run() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);
    let ctx = init_context(&cli)?;

    match cli.command {
        Some(Commands::Pin(PinCommand::Add {
            latitude,
            longitude,
        })) => handle_pin_add(&ctx, latitude, longitude),
        Some(Commands::Pin(PinCommand::List)) | None => handle_pin_list(&ctx),
        Some(Commands::Pin(PinCommand::Delete { pin })) => handle_pin_delete(&ctx, &pin),
        Some(Commands::Photos { pin, download }) => handle_photos(&ctx, &pin, download).await,
        Some(Commands::Refresh { pin }) => handle_refresh(&ctx, &pin).await,
        Some(Commands::Images { pin }) => handle_images(&ctx, &pin).await,
        Some(Commands::Photo(PhotoCommand::Delete { pin, photo })) => {
            handle_photo_delete(&ctx, &pin, &photo)
        }
        Some(Commands::Photo(PhotoCommand::Save { pin, photo, path })) => {
            handle_photo_save(&ctx, &pin, &photo, path).await
        }
        Some(Commands::Doctor) => handle_doctor(&ctx),
        Some(Commands::Config { key, value }) => handle_config(&ctx, key, value),
    }
}

fn init_logging(verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("tourist=debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn init_context(cli: &Cli) -> Result<AppContext> {
    let data_dir = match &cli.data_dir {
        Some(dir) => dir.clone(),
        None => ProjectDirs::from("com", "tourist", "tourist")
            .map(|dirs| dirs.data_dir().to_path_buf())
            .ok_or_else(|| TouristError::Config("Could not determine data dir".to_string()))?,
    };

    let config = TouristConfig::load(&data_dir)?.with_env_overrides();
    let source = FlickrClient::new(&config)?;
    let store = FileStore::new(data_dir.clone());

    Ok(AppContext {
        cache: PhotoCache::new(store, source, config),
        data_dir,
    })
}

fn handle_pin_add(ctx: &AppContext, latitude: f64, longitude: f64) -> Result<()> {
    let result = ctx.cache.add_pin(latitude, longitude)?;
    print_messages(&result.messages);
    Ok(())
}

fn handle_pin_list(ctx: &AppContext) -> Result<()> {
    let result = ctx.cache.list_pins()?;
    print_pins(&result.listed_pins);
    Ok(())
}

fn handle_pin_delete(ctx: &AppContext, pin: &str) -> Result<()> {
    let pin = resolve_pin(ctx, pin)?;
    let result = ctx.cache.delete_pin(pin.id)?;
    print_messages(&result.messages);
    Ok(())
}

async fn handle_photos(ctx: &AppContext, pin: &str, download: bool) -> Result<()> {
    let pin = resolve_pin(ctx, pin)?;
    let result = ctx.cache.ensure_photos_loaded(pin.id).await?;
    print_messages(&result.messages);

    if download {
        download_images(ctx, &pin).await?;
    }

    let listing = ctx.cache.list_photos(pin.id)?;
    print_photos(ctx, &pin, &listing.listed_photos);
    Ok(())
}

async fn handle_refresh(ctx: &AppContext, pin: &str) -> Result<()> {
    let pin = resolve_pin(ctx, pin)?;
    let result = ctx.cache.refresh_collection(pin.id).await?;
    print_messages(&result.messages);
    print_photos(ctx, &pin, &result.listed_photos);
    Ok(())
}

async fn handle_images(ctx: &AppContext, pin: &str) -> Result<()> {
    let pin = resolve_pin(ctx, pin)?;
    download_images(ctx, &pin).await
}

/// Resolves every missing image, reporting each cell as its event arrives.
async fn download_images(ctx: &AppContext, pin: &Pin) -> Result<()> {
    let positions: Vec<(uuid::Uuid, DisplayIndex)> = ctx
        .cache
        .list_photos(pin.id)?
        .listed_photos
        .iter()
        .map(|dp| (dp.photo.id(), dp.index))
        .collect();

    let mut events = ctx.cache.subscribe();
    let result = ctx.cache.resolve_images(pin.id).await?;

    loop {
        match events.try_recv() {
            Ok(ChangeEvent::ImageAttached { photo_id, .. }) => {
                if let Some((_, index)) = positions.iter().find(|(id, _)| *id == photo_id) {
                    println!("  {} {}", format!("{:>3}.", index).yellow(), "downloaded".dimmed());
                }
            }
            Ok(_) | Err(TryRecvError::Lagged(_)) => continue,
            Err(TryRecvError::Empty) | Err(TryRecvError::Closed) => break,
        }
    }

    print_messages(&result.messages);
    Ok(())
}

fn handle_photo_delete(ctx: &AppContext, pin: &str, photo: &str) -> Result<()> {
    let photo = resolve_photo(ctx, pin, photo)?;
    let result = ctx.cache.delete_photo(photo.id())?;
    print_messages(&result.messages);
    Ok(())
}

async fn handle_photo_save(ctx: &AppContext, pin: &str, photo: &str, path: PathBuf) -> Result<()> {
    let photo = resolve_photo(ctx, pin, photo)?;
    ctx.cache.resolve_image(photo.id()).await?;

    let photo = ctx.cache.photo(photo.id())?;
    let bytes = photo
        .image()
        .ok_or_else(|| TouristError::Api("Image is still downloading, try again".into()))?;
    std::fs::write(&path, bytes)?;
    print_messages(&[CmdMessage::success(format!(
        "Saved {} ({} bytes)",
        path.display(),
        bytes.len()
    ))]);
    Ok(())
}

fn handle_doctor(ctx: &AppContext) -> Result<()> {
    let result = ctx.cache.doctor()?;
    print_messages(&result.messages);
    Ok(())
}

fn handle_config(ctx: &AppContext, key: Option<String>, value: Option<String>) -> Result<()> {
    let action = match (key, value) {
        (None, _) => ConfigAction::ShowAll,
        (Some(k), None) => ConfigAction::ShowKey(k),
        (Some(k), Some(v)) => ConfigAction::Set(k, v),
    };

    let result: CmdResult = tourist::commands::config::run(&ctx.data_dir, action)?;
    if let Some(config) = &result.config {
        if result.messages.is_empty() {
            for key in TouristConfig::KEYS {
                let value = config.get(key).unwrap_or_default();
                let shown = if *key == "api-key" && !value.is_empty() {
                    "(set)".to_string()
                } else {
                    value
                };
                println!("{} = {}", key, shown);
            }
        }
    }
    print_messages(&result.messages);
    Ok(())
}

fn resolve_pin(ctx: &AppContext, input: &str) -> Result<Pin> {
    let index: DisplayIndex = input.parse().map_err(TouristError::Api)?;
    ctx.cache.pin_at(index)
}

fn resolve_photo(ctx: &AppContext, pin: &str, photo: &str) -> Result<Photo> {
    let pin = resolve_pin(ctx, pin)?;
    let index: DisplayIndex = photo.parse().map_err(TouristError::Api)?;
    ctx.cache.photo_at(pin.id, index)
}

fn print_messages(messages: &[CmdMessage]) {
    for message in messages {
        match message.level {
            MessageLevel::Info => println!("{}", message.content.dimmed()),
            MessageLevel::Success => println!("{}", message.content.green()),
            MessageLevel::Warning => println!("{}", message.content.yellow()),
            MessageLevel::Error => println!("{}", message.content.red()),
        }
    }
}

fn print_pins(pins: &[DisplayPin]) {
    if pins.is_empty() {
        println!("No pins yet. Add one with `tourist pin add <lat> <lon>`.");
        return;
    }

    for dp in pins {
        let photos = match dp.photo_count {
            0 => "no photos".to_string(),
            1 => "1 photo".to_string(),
            n => format!("{} photos", n),
        };
        println!(
            "{} {:>10.5} {:>11.5}  {}",
            format!("{:>3}.", dp.index).yellow(),
            dp.pin.latitude,
            dp.pin.longitude,
            photos.dimmed()
        );
    }
}

const IMAGE_MARKER: &str = "●";
const PENDING_MARKER: &str = "○";

fn print_photos(ctx: &AppContext, pin: &Pin, photos: &[DisplayPhoto]) {
    println!("{}", format!("Photos near {}", pin).bold());
    if photos.is_empty() {
        println!("{}", "No photos.".dimmed());
        return;
    }

    for dp in photos {
        let marker = if dp.photo.has_image() {
            IMAGE_MARKER.green()
        } else {
            PENDING_MARKER.dimmed()
        };
        println!(
            "{} {} {}",
            format!("{:>3}.", dp.index).yellow(),
            marker,
            ctx.cache.source().image_url(dp.photo.remote())
        );
    }
}
