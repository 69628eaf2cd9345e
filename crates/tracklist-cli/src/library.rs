//! Expands dropped or added paths into playlist entries.
//!
//! Directories are walked recursively, following symlinks with loop
//! detection; only files with a supported audio extension become entries.

use std::path::{ Path, PathBuf };

use tracklist_core::NewEntry;
use walkdir::WalkDir;


/// Supported audio file extensions.
const SUPPORTED_EXTENSIONS: &[&str] = &[
    "mp3", "flac", "ogg", "wav", "m4a", "aac", "opus", "wma", "aiff", "alac",
];


/// Expands paths into entries, keeping the given order. Each directory's
/// files are sorted by path.
pub fn expand_paths<P: AsRef<Path>>( paths: &[P] ) -> Vec<NewEntry> {
    let mut files = Vec::new();
    for path in paths {
        let path = path.as_ref();
        if path.is_dir() {
            let mut found = scan_dir( path );
            found.sort();
            files.extend( found );
        } else if is_audio_file( path ) {
            files.push( path.to_path_buf() );
        } else {
            tracing::debug!( "Skipping non-audio path: {:?}", path );
        }
    }

    files.into_iter().map( NewEntry::from_path ).collect()
}


fn scan_dir( dir: &Path ) -> Vec<PathBuf> {
    WalkDir::new( dir )
        .follow_links( true )
        .into_iter()
        .filter_map( |entry| match entry {
            Ok( e ) => Some( e ),
            Err( e ) => {
                tracing::warn!( "Skipping while scanning {:?}: {}", dir, e );
                None
            }
        })
        .filter( |e| e.file_type().is_file() && is_audio_file( e.path() ) )
        .map( |e| e.into_path() )
        .collect()
}


/// Checks if a file has a supported audio extension.
fn is_audio_file( path: &Path ) -> bool {
    path.extension()
        .and_then( |e| e.to_str() )
        .is_some_and( |e| SUPPORTED_EXTENSIONS.contains( &e.to_lowercase().as_str() ) )
}


/// Splits pasted text into paths: one per line, `file://` prefixes and
/// surrounding quotes removed.
pub fn parse_pasted_paths( text: &str ) -> Vec<PathBuf> {
    text.lines()
        .map( |l| l.trim().trim_matches( |c| c == '\'' || c == '"' ) )
        .filter( |l| !l.is_empty() )
        .map( |l| PathBuf::from( l.strip_prefix( "file://" ).unwrap_or( l ) ) )
        .collect()
}


#[cfg( test )]
mod tests {
    use super::*;
    use std::fs;


    #[test]
    fn test_expand_directory_sorted_and_filtered() {
        let dir = tempfile::tempdir().unwrap();
        let sub = dir.path().join( "disc2" );
        fs::create_dir( &sub ).unwrap();
        fs::write( dir.path().join( "b.mp3" ), b"" ).unwrap();
        fs::write( dir.path().join( "a.FLAC" ), b"" ).unwrap();
        fs::write( dir.path().join( "cover.jpg" ), b"" ).unwrap();
        fs::write( sub.join( "c.ogg" ), b"" ).unwrap();

        let entries = expand_paths( &[ dir.path() ] );
        let names: Vec<_> = entries.iter().map( |e| e.display_text.as_str() ).collect();
        assert_eq!( names, vec![ "a.FLAC", "b.mp3", "c.ogg" ] );
    }


    #[test]
    fn test_expand_keeps_argument_order() {
        let dir = tempfile::tempdir().unwrap();
        let z = dir.path().join( "z.mp3" );
        let a = dir.path().join( "a.mp3" );
        fs::write( &z, b"" ).unwrap();
        fs::write( &a, b"" ).unwrap();

        let entries = expand_paths( &[ &z, &a ] );
        assert_eq!( entries[ 0 ].file_path, z );
        assert_eq!( entries[ 1 ].file_path, a );
    }


    #[cfg( unix )]
    #[test]
    fn test_expand_survives_symlink_cycle() {
        let dir = tempfile::tempdir().unwrap();
        fs::write( dir.path().join( "a.mp3" ), b"" ).unwrap();
        std::os::unix::fs::symlink( dir.path(), dir.path().join( "loop" ) ).unwrap();

        let entries = expand_paths( &[ dir.path() ] );
        assert_eq!( entries.len(), 1 );
        assert_eq!( entries[ 0 ].file_path, dir.path().join( "a.mp3" ) );
    }


    #[test]
    fn test_parse_pasted_paths() {
        let paths = parse_pasted_paths( "'/music/a.mp3'\nfile:///music/b.flac\n\n" );
        assert_eq!( paths, vec![ PathBuf::from( "/music/a.mp3" ), PathBuf::from( "/music/b.flac" ) ] );
    }
}
