//! Playlist files in extended M3U format.
//!
//! Besides the usual `#EXTINF:<seconds>,<title>` line, each entry may carry a
//! `#TRACKLIST:failed=<0|1>;plays=<n>;position=<f>` line with playback state.

use std::borrow::Cow;
use std::fs::{ self, File };
use std::io::{ BufWriter, Write };
use std::path::Path;

use anyhow::{ Context, Result };
use tracklist_core::{ NewEntry, TrackEntry };


const HEADER: &str = "#EXTM3U";
const EXTINF: &str = "#EXTINF:";
const STATE: &str = "#TRACKLIST:";


/// Saves entries to `path`, creating parent directories as needed.
pub fn save( path: &Path, entries: &[TrackEntry] ) -> Result<()> {
    if let Some( parent ) = path.parent().filter( |p| !p.as_os_str().is_empty() ) {
        fs::create_dir_all( parent )
            .with_context( || format!( "creating {}", parent.display() ) )?;
    }

    let file = File::create( path ).with_context( || format!( "creating {}", path.display() ) )?;
    let mut out = BufWriter::new( file );

    writeln!( out, "{}", HEADER )?;
    for entry in entries {
        writeln!( out, "{}{},{}", EXTINF, entry.duration_seconds, entry.display_text )?;
        writeln!(
            out,
            "{}failed={};plays={};position={}",
            STATE,
            u8::from( entry.is_failed ),
            entry.playback_count,
            entry.last_position
        )?;
        writeln!( out, "{}", entry.file_path.display() )?;
    }
    out.flush()?;

    tracing::info!( "Saved {} entries to {:?}", entries.len(), path );
    Ok(())
}


/// Loads entries from `path`.
///
/// Invalid UTF-8 sequences are replaced, not rejected. Relative entry paths
/// are resolved against the playlist's directory.
pub fn load( path: &Path ) -> Result<Vec<NewEntry>> {
    let bytes = fs::read( path ).with_context( || format!( "reading {}", path.display() ) )?;
    let text = String::from_utf8_lossy( &bytes );
    if matches!( text, Cow::Owned( _ ) ) {
        tracing::warn!( "Playlist {:?} is not valid UTF-8; some paths may be mangled", path );
    }

    let base = path.parent().unwrap_or( Path::new( "" ) );
    let mut entries = Vec::new();
    let mut pending = NewEntry::default();

    for line in text.lines() {
        let trimmed = line.trim();

        if let Some( info ) = trimmed.strip_prefix( EXTINF ) {
            apply_extinf( &mut pending, info );
        } else if let Some( state ) = trimmed.strip_prefix( STATE ) {
            apply_state( &mut pending, state );
        } else if trimmed.is_empty() || trimmed.starts_with( '#' ) {
            continue;
        } else {
            let mut entry = std::mem::take( &mut pending );
            let from_path = NewEntry::from_path( base.join( trimmed ) );
            if entry.display_text.is_empty() {
                entry.display_text = from_path.display_text;
            }
            entry.file_path = from_path.file_path;
            entries.push( entry );
        }
    }

    tracing::info!( "Loaded {} entries from {:?}", entries.len(), path );
    Ok( entries )
}


fn apply_extinf( entry: &mut NewEntry, info: &str ) {
    let ( duration, title ) = info.split_once( ',' ).unwrap_or(( info, "" ));
    // Players write -1 for unknown durations.
    entry.duration_seconds = duration.trim().parse::<i64>()
        .ok()
        .and_then( |d| u32::try_from( d ).ok() )
        .unwrap_or( 0 );
    entry.display_text = title.trim().to_string();
}


fn apply_state( entry: &mut NewEntry, state: &str ) {
    for pair in state.split( ';' ) {
        let Some(( key, value )) = pair.split_once( '=' ) else {
            continue;
        };
        match key.trim() {
            "failed" => entry.is_failed = value.trim() == "1",
            "plays" => entry.playback_count = value.trim().parse().unwrap_or( 0 ),
            "position" => entry.last_position = value.trim().parse().unwrap_or( 0.0 ),
            other => tracing::debug!( "Unknown playlist state key: {}", other ),
        }
    }
}


#[cfg( test )]
mod tests {
    use super::*;
    use std::path::PathBuf;
    use tracklist_core::{ Attribute, PlaylistStore };


    #[test]
    fn test_save_then_load_keeps_playback_state() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join( "lists" ).join( "mix.m3u" );

        let mut store = PlaylistStore::new();
        store.append( NewEntry::from_path( "/music/one.mp3" ).with_text( "One" ).with_duration( 185 ) );
        store.append( NewEntry::from_path( "/music/two.flac" ) );
        store.set_attribute( 1, Attribute::Failed( true ) ).unwrap();
        store.set_attribute( 1, Attribute::PlaybackCount( 4 ) ).unwrap();

        save( &path, &store.export() ).unwrap();
        let loaded = load( &path ).unwrap();

        assert_eq!( loaded.len(), 2 );
        assert_eq!( loaded[ 0 ].display_text, "One" );
        assert_eq!( loaded[ 0 ].duration_seconds, 185 );
        assert_eq!( loaded[ 1 ].file_path, PathBuf::from( "/music/two.flac" ) );
        assert!( loaded[ 1 ].is_failed );
        assert_eq!( loaded[ 1 ].playback_count, 4 );
    }


    #[test]
    fn test_load_plain_m3u() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join( "plain.m3u" );
        fs::write( &path, "#EXTM3U\n#EXTINF:-1,Radio\nhttp-less/stream.mp3\n# comment\n/music/b.ogg\n" ).unwrap();

        let loaded = load( &path ).unwrap();
        assert_eq!( loaded.len(), 2 );
        assert_eq!( loaded[ 0 ].display_text, "Radio" );
        assert_eq!( loaded[ 0 ].duration_seconds, 0 );
        assert_eq!( loaded[ 1 ].display_text, "b.ogg" );
    }


    #[test]
    fn test_load_keeps_entries_around_invalid_utf8() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join( "legacy.m3u" );
        fs::write( &path, b"#EXTM3U\n/music/a.mp3\n/music/Bj\xf6rk.mp3\n/music/c.mp3\n" ).unwrap();

        let loaded = load( &path ).unwrap();
        assert_eq!( loaded.len(), 3 );
        assert_eq!( loaded[ 0 ].file_path, PathBuf::from( "/music/a.mp3" ) );
        assert_eq!( loaded[ 2 ].file_path, PathBuf::from( "/music/c.mp3" ) );
    }


    #[test]
    fn test_load_resolves_relative_paths_against_playlist_dir() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join( "mix.m3u" );
        fs::write( &path, "#EXTM3U\nalbum/01.mp3\n/abs/02.mp3\n" ).unwrap();

        let loaded = load( &path ).unwrap();
        assert_eq!( loaded[ 0 ].file_path, dir.path().join( "album" ).join( "01.mp3" ) );
        assert_eq!( loaded[ 1 ].file_path, PathBuf::from( "/abs/02.mp3" ) );
    }


    #[test]
    fn test_load_missing_file_errors() {
        assert!( load( Path::new( "/nonexistent/tracklist.m3u" ) ).is_err() );
    }
}
