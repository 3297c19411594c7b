use clap::{Parser, Subcommand};
use std::path::PathBuf;

pub const VERSION: &str = concat!(env!("CARGO_PKG_VERSION"), " (", env!("GIT_HASH"), ")");

#[derive(Parser, Debug)]
#[command(name = "tourist", version = VERSION)]
#[command(about = "Pin places and browse a local cache of nearby Flickr photos", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,

    /// Directory holding pins, photos and config
    #[arg(long, env = "TOURIST_HOME", global = true)]
    pub data_dir: Option<PathBuf>,

    /// Verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Manage pins
    #[command(subcommand)]
    Pin(PinCommand),

    /// Show a pin's photos, fetching a page first if it has none
    #[command(alias = "p")]
    Photos {
        /// Pin index (see `pin list`)
        pin: String,

        /// Also download every missing image
        #[arg(short, long)]
        download: bool,
    },

    /// Replace a pin's photos with a fresh page
    Refresh {
        /// Pin index (see `pin list`)
        pin: String,
    },

    /// Download every missing image for a pin
    Images {
        /// Pin index (see `pin list`)
        pin: String,
    },

    /// Manage individual photos
    #[command(subcommand)]
    Photo(PhotoCommand),

    /// Remove orphaned photo records and stray image files
    Doctor,

    /// Get or set configuration
    Config {
        /// Configuration key (e.g., api-key, per-page)
        key: Option<String>,

        /// Value to set (if omitted, prints current value)
        value: Option<String>,
    },
}

#[derive(Subcommand, Debug)]
pub enum PinCommand {
    /// Drop a pin at a coordinate
    #[command(alias = "n", allow_negative_numbers = true)]
    Add {
        /// Latitude in degrees, -90 to 90
        latitude: f64,

        /// Longitude in degrees, -180 to 180
        longitude: f64,
    },

    /// List pins
    #[command(alias = "ls")]
    List,

    /// Delete a pin and all of its photos
    #[command(alias = "rm")]
    Delete {
        /// Pin index
        pin: String,
    },
}

#[derive(Subcommand, Debug)]
pub enum PhotoCommand {
    /// Delete one photo
    #[command(alias = "rm")]
    Delete {
        /// Pin index
        pin: String,

        /// Photo index within the pin
        photo: String,
    },

    /// Write a photo's image to a file, downloading it first if needed
    Save {
        /// Pin index
        pin: String,

        /// Photo index within the pin
        photo: String,

        /// Destination file
        path: PathBuf,
    },
}
