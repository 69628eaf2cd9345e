//! Track entries held by the playlist store.
//!
//! An entry is created from a [`NewEntry`] when it is inserted into a
//! [`PlaylistStore`](crate::store::PlaylistStore); the store assigns its
//! [`EntryId`] at that moment.

use std::fmt;
use std::path::{ Path, PathBuf };


/// First id handed out by a store. Lower values are reserved.
pub const FIRST_ENTRY_ID: u32 = 1000;


/// Stable identity of an entry, independent of its current row.
#[derive( Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord )]
pub struct EntryId( u32 );


impl EntryId {
    /// The "no entry" id.
    pub const NONE: EntryId = EntryId( 0 );


    /// Wraps a raw id value.
    pub const fn from_raw( raw: u32 ) -> Self {
        Self( raw )
    }


    /// Returns the raw id value.
    pub const fn raw( self ) -> u32 {
        self.0
    }


    /// Returns true if the id lies in the assignable range.
    pub fn is_valid( self ) -> bool {
        self.0 >= FIRST_ENTRY_ID
    }
}


impl fmt::Display for EntryId {
    fn fmt( &self, f: &mut fmt::Formatter<'_> ) -> fmt::Result {
        write!( f, "#{}", self.0 )
    }
}


/// Initial state of an entry that has not been inserted yet.
#[derive( Debug, Clone, Default, PartialEq )]
pub struct NewEntry {
    pub display_text: String,
    pub file_path: PathBuf,
    pub track_info_format_id: u32,
    pub duration_seconds: u32,
    pub last_position: f64,
    pub playback_count: u32,
    pub is_failed: bool,
    pub is_selected: bool,
}


impl NewEntry {
    /// Creates an entry for a file, using the file name as display text.
    pub fn from_path( path: impl Into<PathBuf> ) -> Self {
        let file_path = path.into();
        let display_text = display_name( &file_path );
        Self {
            display_text,
            file_path,
            ..Self::default()
        }
    }


    /// Sets the display text.
    pub fn with_text( mut self, text: impl Into<String> ) -> Self {
        self.display_text = text.into();
        self
    }


    /// Sets the known duration in seconds.
    pub fn with_duration( mut self, seconds: u32 ) -> Self {
        self.duration_seconds = seconds;
        self
    }
}


/// An entry owned by a store.
///
/// Fields other than the id are public for reading; mutation goes through
/// the store so that observers are notified.
#[derive( Debug, Clone, PartialEq )]
pub struct TrackEntry {
    id: EntryId,
    pub display_text: String,
    pub file_path: PathBuf,
    pub track_info_format_id: u32,
    pub duration_seconds: u32,
    pub last_position: f64,
    pub playback_count: u32,
    pub is_failed: bool,
    pub is_selected: bool,
}


impl TrackEntry {
    pub( crate ) fn new( id: EntryId, data: NewEntry ) -> Self {
        Self {
            id,
            display_text: data.display_text,
            file_path: data.file_path,
            track_info_format_id: data.track_info_format_id,
            duration_seconds: data.duration_seconds,
            last_position: data.last_position,
            playback_count: data.playback_count,
            is_failed: data.is_failed,
            is_selected: data.is_selected,
        }
    }


    /// Returns the entry's stable identity.
    pub fn id( &self ) -> EntryId {
        self.id
    }
}


/// Derives a display name from a file path.
fn display_name( path: &Path ) -> String {
    path.file_name()
        .map( |n| n.to_string_lossy().into_owned() )
        .unwrap_or_else( || path.display().to_string() )
}


#[cfg( test )]
mod tests {
    use super::*;


    #[test]
    fn test_from_path_uses_file_name() {
        let entry = NewEntry::from_path( "/music/album/01 - Intro.flac" );
        assert_eq!( entry.display_text, "01 - Intro.flac" );
        assert_eq!( entry.file_path, PathBuf::from( "/music/album/01 - Intro.flac" ) );
        assert!( !entry.is_selected );
    }


    #[test]
    fn test_reserved_ids_are_invalid() {
        assert!( !EntryId::NONE.is_valid() );
        assert!( !EntryId::from_raw( FIRST_ENTRY_ID - 1 ).is_valid() );
        assert!( EntryId::from_raw( FIRST_ENTRY_ID ).is_valid() );
    }
}
