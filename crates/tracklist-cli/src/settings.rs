//! Application settings management
//!
//! Handles persistent settings for playlist restore, mouse timing and
//! playback order.

use std::fs;
use std::path::PathBuf;

use serde::{ Deserialize, Serialize };
use tracklist_core::RepeatMode;


/// Application settings.
#[derive( Debug, Clone, PartialEq, Serialize, Deserialize )]
#[serde( default )]
pub struct Settings {
    /// Reload the default playlist on startup and save it on quit
    pub restore_playlist: bool,

    /// Maximum delay between the clicks of a double click, in milliseconds
    pub double_click_ms: u64,

    /// Repeat mode used when advancing tracks
    pub repeat: RepeatMode,

    /// Keep the current track in view when it changes
    pub scroll_to_current: bool,
}


impl Default for Settings {
    fn default() -> Self {
        Self {
            restore_playlist: true,
            double_click_ms: 400,
            repeat: RepeatMode::Off,
            scroll_to_current: true,
        }
    }
}


impl Settings {
    /// Returns the path to the settings file.
    fn settings_path() -> Option<PathBuf> {
        dirs::config_dir().map( |p| p.join( "tracklist" ).join( "settings.json" ) )
    }


    /// Returns the default playlist file, restored on startup.
    pub fn default_playlist_path() -> Option<PathBuf> {
        dirs::data_local_dir().map( |d| d.join( "tracklist" ).join( "default.m3u" ) )
    }


    /// Returns the default log file.
    pub fn default_log_path() -> Option<PathBuf> {
        dirs::data_local_dir().map( |d| d.join( "tracklist" ).join( "tracklist.log" ) )
    }


    /// Loads settings from disk, or returns defaults if not found.
    pub fn load() -> Self {
        let path = match Self::settings_path() {
            Some( p ) => p,
            None => return Self::default(),
        };

        if !path.exists() {
            return Self::default();
        }

        match fs::read_to_string( &path ) {
            Ok( contents ) => Self::from_json( &contents ),
            Err( e ) => {
                tracing::warn!( "Failed to read settings: {}", e );
                Self::default()
            }
        }
    }


    /// Parses settings, falling back to defaults on malformed input.
    fn from_json( contents: &str ) -> Self {
        serde_json::from_str( contents ).unwrap_or_else( |e| {
            tracing::warn!( "Ignoring malformed settings: {}", e );
            Self::default()
        })
    }


    /// Saves settings to disk.
    pub fn save( &self ) {
        let path = match Self::settings_path() {
            Some( p ) => p,
            None => return,
        };

        if let Some( parent ) = path.parent() {
            if !parent.exists() {
                if let Err( e ) = fs::create_dir_all( parent ) {
                    tracing::warn!( "Failed to create settings directory: {}", e );
                    return;
                }
            }
        }

        match serde_json::to_string_pretty( self ) {
            Ok( json ) => {
                if let Err( e ) = fs::write( &path, json ) {
                    tracing::warn!( "Failed to save settings: {}", e );
                }
            }
            Err( e ) => {
                tracing::warn!( "Failed to serialize settings: {}", e );
            }
        }
    }
}


#[cfg( test )]
mod tests {
    use super::*;


    #[test]
    fn test_partial_settings_use_defaults() {
        let settings = Settings::from_json( r#"{ "repeat": "all" }"# );
        assert_eq!( settings.repeat, RepeatMode::All );
        assert_eq!( settings.double_click_ms, 400 );
        assert!( settings.restore_playlist );
    }


    #[test]
    fn test_malformed_settings_fall_back() {
        assert_eq!( Settings::from_json( "not json" ), Settings::default() );
    }
}
