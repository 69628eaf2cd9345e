//! Playback source contract.
//!
//! A playback engine reports progress by entry id. Notices for entries that
//! were removed in the meantime are dropped quietly. Notices must be delivered
//! on the thread that owns the store.

use serde::{ Deserialize, Serialize };

use crate::entry::EntryId;
use crate::event::Attribute;
use crate::store::PlaylistStore;


/// Repeat mode for advancing through the playlist.
#[derive( Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize )]
#[serde( rename_all = "lowercase" )]
pub enum RepeatMode {
    #[default]
    Off,
    One,
    All,
}


impl RepeatMode {
    /// Returns the next mode in the Off → All → One cycle.
    pub fn cycle( self ) -> Self {
        match self {
            RepeatMode::Off => RepeatMode::All,
            RepeatMode::All => RepeatMode::One,
            RepeatMode::One => RepeatMode::Off,
        }
    }


    /// Returns the name of the mode.
    pub fn name( self ) -> &'static str {
        match self {
            RepeatMode::Off => "off",
            RepeatMode::One => "one",
            RepeatMode::All => "all",
        }
    }
}


/// Progress reported by a playback source.
#[derive( Debug, Clone, Copy, PartialEq )]
pub enum PlaybackNotice {
    /// Playback of the entry started; it becomes current.
    Started( EntryId ),

    /// The entry could not be played.
    Failed( EntryId ),

    /// The entry's duration became known.
    Duration( EntryId, u32 ),

    /// Playback position as a fraction of the track, `0.0..=1.0`.
    Position( EntryId, f64 ),

    /// The entry played to the end.
    Finished( EntryId ),

    /// Playback stopped; nothing is current.
    Stopped,
}


impl PlaylistStore {
    /// Applies a playback notice.
    ///
    /// @returns false if the notice referred to an entry that no longer exists
    pub fn apply_playback( &mut self, notice: PlaybackNotice ) -> bool {
        match notice {
            PlaybackNotice::Started( id ) => {
                self.set_attribute_by_id( id, Attribute::Failed( false ) )
                    && self.set_current_id( Some( id ) )
            }
            PlaybackNotice::Failed( id ) => {
                tracing::warn!( "Playback failed for entry {}", id );
                self.set_attribute_by_id( id, Attribute::Failed( true ) )
            }
            PlaybackNotice::Duration( id, seconds ) => {
                self.set_attribute_by_id( id, Attribute::Duration( seconds ) )
            }
            PlaybackNotice::Position( id, position ) => {
                self.set_attribute_by_id( id, Attribute::LastPosition( position.clamp( 0.0, 1.0 ) ) )
            }
            PlaybackNotice::Finished( id ) => {
                let Some( plays ) = self.entry_by_id( id ).map( |e| e.playback_count ) else {
                    return false;
                };
                self.set_attribute_by_id( id, Attribute::PlaybackCount( plays + 1 ) )
                    && self.set_attribute_by_id( id, Attribute::LastPosition( 0.0 ) )
            }
            PlaybackNotice::Stopped => self.set_current_id( None ),
        }
    }


    /// Picks the row to play after the current one.
    ///
    /// Failed entries are skipped. With nothing current, playback starts at
    /// the first playable row.
    pub fn next_row( &self, repeat: RepeatMode ) -> Option<usize> {
        let count = self.count();
        let current = self.current_row();

        if repeat == RepeatMode::One {
            if let Some( row ) = current {
                return Some( row );
            }
        }

        let start = current.map_or( 0, |r| r + 1 );
        let wrap = repeat == RepeatMode::All;
        let candidates: Vec<usize> = if wrap {
            ( start..count ).chain( 0..start.min( count ) ).collect()
        } else {
            ( start..count ).collect()
        };

        candidates.into_iter().find( |&row| self.is_playable( row ) )
    }


    /// Picks the row to play before the current one.
    pub fn previous_row( &self, repeat: RepeatMode ) -> Option<usize> {
        let count = self.count();
        let current = self.current_row()?;

        if repeat == RepeatMode::One {
            return Some( current );
        }

        let wrap = repeat == RepeatMode::All;
        let candidates: Vec<usize> = if wrap {
            ( 0..current ).rev().chain( ( current + 1..count ).rev() ).collect()
        } else {
            ( 0..current ).rev().collect()
        };

        candidates.into_iter().find( |&row| self.is_playable( row ) )
    }


    fn is_playable( &self, row: usize ) -> bool {
        self.get( row ).is_ok_and( |e| !e.is_failed )
    }
}


#[cfg( test )]
mod tests {
    use super::*;
    use crate::entry::NewEntry;


    fn store_of( count: usize ) -> PlaylistStore {
        let mut store = PlaylistStore::new();
        for i in 0..count {
            store.append( NewEntry::default().with_text( format!( "track {}", i ) ) );
        }
        store
    }


    #[test]
    fn test_started_sets_current_and_clears_failure() {
        let mut store = store_of( 3 );
        let id = store.get( 1 ).unwrap().id();
        store.set_attribute( 1, Attribute::Failed( true ) ).unwrap();
        assert!( store.apply_playback( PlaybackNotice::Started( id ) ) );
        assert_eq!( store.current_row(), Some( 1 ) );
        assert!( !store.get( 1 ).unwrap().is_failed );
    }


    #[test]
    fn test_notice_for_removed_entry_is_ignored() {
        let mut store = store_of( 2 );
        let id = store.get( 0 ).unwrap().id();
        store.remove_at( 0 ).unwrap();
        assert!( !store.apply_playback( PlaybackNotice::Duration( id, 200 ) ) );
        assert!( !store.apply_playback( PlaybackNotice::Finished( id ) ) );
        assert_eq!( store.get( 0 ).unwrap().duration_seconds, 0 );
    }


    #[test]
    fn test_finished_counts_play() {
        let mut store = store_of( 1 );
        let id = store.get( 0 ).unwrap().id();
        store.apply_playback( PlaybackNotice::Position( id, 0.5 ) );
        store.apply_playback( PlaybackNotice::Finished( id ) );
        let entry = store.get( 0 ).unwrap();
        assert_eq!( entry.playback_count, 1 );
        assert_eq!( entry.last_position, 0.0 );
    }


    #[test]
    fn test_stopped_clears_current() {
        let mut store = store_of( 2 );
        store.set_current_row( 1 ).unwrap();
        store.apply_playback( PlaybackNotice::Stopped );
        assert_eq!( store.current_row(), None );
    }


    #[test]
    fn test_next_row_skips_failed() {
        let mut store = store_of( 4 );
        store.set_current_row( 0 ).unwrap();
        store.set_attribute( 1, Attribute::Failed( true ) ).unwrap();
        assert_eq!( store.next_row( RepeatMode::Off ), Some( 2 ) );
    }


    #[test]
    fn test_next_row_at_end() {
        let mut store = store_of( 3 );
        store.set_current_row( 2 ).unwrap();
        assert_eq!( store.next_row( RepeatMode::Off ), None );
        assert_eq!( store.next_row( RepeatMode::All ), Some( 0 ) );
        assert_eq!( store.next_row( RepeatMode::One ), Some( 2 ) );
    }


    #[test]
    fn test_next_row_without_current() {
        let store = store_of( 3 );
        assert_eq!( store.next_row( RepeatMode::Off ), Some( 0 ) );
        assert_eq!( PlaylistStore::new().next_row( RepeatMode::All ), None );
    }


    #[test]
    fn test_previous_row() {
        let mut store = store_of( 3 );
        store.set_current_row( 0 ).unwrap();
        assert_eq!( store.previous_row( RepeatMode::Off ), None );
        assert_eq!( store.previous_row( RepeatMode::All ), Some( 2 ) );
        store.set_current_row( 2 ).unwrap();
        assert_eq!( store.previous_row( RepeatMode::Off ), Some( 1 ) );
    }


    #[test]
    fn test_repeat_cycle() {
        assert_eq!( RepeatMode::Off.cycle(), RepeatMode::All );
        assert_eq!( RepeatMode::One.cycle(), RepeatMode::Off );
    }
}
