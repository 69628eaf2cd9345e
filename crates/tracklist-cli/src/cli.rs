//! Command-line argument parsing for Tracklist.

use std::path::PathBuf;

use clap::Parser;


/// Tracklist - A terminal playlist manager.
#[derive( Parser, Debug )]
#[command( name = "tracklist" )]
#[command( version, about, long_about = None )]
pub struct Args {
    /// Playlist file to load on startup and save on quit.
    #[arg( short, long )]
    pub playlist: Option<PathBuf>,

    /// Write logs to this file instead of the default location.
    #[arg( long )]
    pub log_file: Option<PathBuf>,

    /// Files or directories to append to the playlist.
    #[arg( trailing_var_arg = true )]
    pub files: Vec<PathBuf>,
}
