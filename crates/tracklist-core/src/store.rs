//! Observable playlist store.
//!
//! Holds the ordered track entries, the per-row attributes and the three
//! singleton cursors (current, focused, hovered). Cursors are stored by
//! [`EntryId`] and resolved to a row when queried, so structural mutation
//! never leaves a cursor pointing at the wrong entry.

use std::collections::HashSet;
use std::sync::mpsc::{ self, Receiver, Sender };

use rand::seq::SliceRandom;
use thiserror::Error;

use crate::entry::{ EntryId, NewEntry, TrackEntry, FIRST_ENTRY_ID };
use crate::event::{ Attribute, Role, StoreEvent };


/// Errors returned by store operations. A failed operation applies nothing.
#[derive( Debug, Clone, PartialEq, Eq, Error )]
pub enum StoreError {
    #[error( "Row {row} out of range (count {count})" )]
    OutOfRange { row: usize, count: usize },

    #[error( "Invalid range {start}..={end} (count {count})" )]
    InvalidRange { start: usize, end: usize, count: usize },

    #[error( "Invalid move of {length} rows from {start} to {destination} (count {count})" )]
    InvalidMove { start: usize, length: usize, destination: usize, count: usize },

    #[error( "{role:?} can only be set on a single row" )]
    SingletonRange { role: Role },
}


/// Ordered, observable collection of track entries.
#[derive( Debug )]
pub struct PlaylistStore {
    entries: Vec<TrackEntry>,
    next_id: u32,
    current: Option<EntryId>,
    focused: Option<EntryId>,
    hovered: Option<EntryId>,
    subscribers: Vec<Sender<StoreEvent>>,
}


impl Default for PlaylistStore {
    fn default() -> Self {
        Self::new()
    }
}


impl PlaylistStore {
    /// Creates an empty store.
    pub fn new() -> Self {
        Self {
            entries: Vec::new(),
            next_id: FIRST_ENTRY_ID,
            current: None,
            focused: None,
            hovered: None,
            subscribers: Vec::new(),
        }
    }


    /// Subscribes to change notifications.
    ///
    /// Dropping the receiver unsubscribes on the next emitted event.
    pub fn subscribe( &mut self ) -> Receiver<StoreEvent> {
        let ( tx, rx ) = mpsc::channel();
        self.subscribers.push( tx );
        rx
    }


    /// Gets the number of entries.
    pub fn count( &self ) -> usize {
        self.entries.len()
    }


    /// Returns true if the store is empty.
    pub fn is_empty( &self ) -> bool {
        self.entries.is_empty()
    }


    /// Gets the entry at `row`.
    pub fn get( &self, row: usize ) -> Result<&TrackEntry, StoreError> {
        self.entries.get( row ).ok_or( StoreError::OutOfRange { row, count: self.count() } )
    }


    /// Gets all entries in playback order.
    pub fn entries( &self ) -> &[TrackEntry] {
        &self.entries
    }


    /// Iterates entries in playback order.
    pub fn iter( &self ) -> impl Iterator<Item = &TrackEntry> {
        self.entries.iter()
    }


    /// Resolves an entry id to its current row.
    pub fn row_of( &self, id: EntryId ) -> Option<usize> {
        self.entries.iter().position( |e| e.id() == id )
    }


    /// Looks up an entry by id.
    pub fn entry_by_id( &self, id: EntryId ) -> Option<&TrackEntry> {
        self.entries.iter().find( |e| e.id() == id )
    }


    /// Inserts an entry before `row`, returning its new id.
    pub fn insert( &mut self, entry: NewEntry, row: usize ) -> Result<EntryId, StoreError> {
        if row > self.count() {
            return Err( StoreError::OutOfRange { row, count: self.count() } );
        }

        let id = EntryId::from_raw( self.next_id );
        self.next_id += 1;
        self.entries.insert( row, TrackEntry::new( id, entry ) );
        self.emit( StoreEvent::RowsInserted { first: row, last: row } );
        Ok( id )
    }


    /// Appends an entry, returning its new id.
    pub fn append( &mut self, entry: NewEntry ) -> EntryId {
        let id = EntryId::from_raw( self.next_id );
        self.next_id += 1;
        let row = self.entries.len();
        self.entries.push( TrackEntry::new( id, entry ) );
        self.emit( StoreEvent::RowsInserted { first: row, last: row } );
        id
    }


    /// Removes the entry at `row`.
    pub fn remove_at( &mut self, row: usize ) -> Result<TrackEntry, StoreError> {
        if row >= self.count() {
            return Err( StoreError::OutOfRange { row, count: self.count() } );
        }

        let removed = self.entries.remove( row );
        self.forget_cursors( &[ removed.id() ] );
        self.emit( StoreEvent::RowsRemoved { first: row, last: row } );
        Ok( removed )
    }


    /// Removes every listed row.
    ///
    /// Rows are validated up front, then removed as contiguous runs from the
    /// highest run down so pending row numbers stay valid.
    ///
    /// @returns The number of entries removed
    pub fn remove_many( &mut self, rows: &[usize] ) -> Result<usize, StoreError> {
        let count = self.count();
        if let Some( &row ) = rows.iter().find( |&&r| r >= count ) {
            return Err( StoreError::OutOfRange { row, count } );
        }

        let runs = contiguous_runs( rows );
        let mut removed_ids = Vec::new();
        for &( start, length ) in runs.iter().rev() {
            removed_ids.extend( self.entries.drain( start..start + length ).map( |e| e.id() ) );
            self.emit( StoreEvent::RowsRemoved { first: start, last: start + length - 1 } );
        }

        self.forget_cursors( &removed_ids );
        tracing::debug!( "Removed {} rows in {} runs", removed_ids.len(), runs.len() );
        Ok( removed_ids.len() )
    }


    /// Removes every entry whose id is in `ids`. Unknown ids are ignored.
    pub fn remove_ids( &mut self, ids: &HashSet<EntryId> ) -> usize {
        let rows: Vec<usize> = self.entries.iter()
            .enumerate()
            .filter( |( _, e )| ids.contains( &e.id() ) )
            .map( |( row, _ )| row )
            .collect();

        // Rows come straight from the current entries, so they are in range.
        self.remove_many( &rows ).unwrap_or( 0 )
    }


    /// Removes all entries.
    pub fn remove_all( &mut self ) {
        if self.entries.is_empty() {
            return;
        }

        let last = self.entries.len() - 1;
        self.entries.clear();
        self.current = None;
        self.focused = None;
        self.hovered = None;
        self.emit( StoreEvent::RowsRemoved { first: 0, last } );
    }


    /// Replaces the whole content, as when loading a saved playlist.
    ///
    /// @returns The ids assigned to the new entries, in order
    pub fn replace_all( &mut self, entries: impl IntoIterator<Item = NewEntry> ) -> Vec<EntryId> {
        self.remove_all();
        entries.into_iter().map( |e| self.append( e ) ).collect()
    }


    /// Returns a snapshot of every entry in order, as when saving a playlist.
    pub fn export( &self ) -> Vec<TrackEntry> {
        self.entries.clone()
    }


    /// Moves `length` rows starting at `start` to land before `destination`.
    ///
    /// `destination` is a row number in the pre-move list. A destination equal
    /// to `start` or `start + length` is accepted and leaves the order unchanged.
    pub fn move_range( &mut self, start: usize, length: usize, destination: usize ) -> Result<(), StoreError> {
        let count = self.count();
        let end = start.saturating_add( length );
        if length == 0 || end > count || destination > count || ( destination > start && destination < end ) {
            return Err( StoreError::InvalidMove { start, length, destination, count } );
        }

        if destination == start || destination == end {
            return Ok(());
        }

        let block: Vec<TrackEntry> = self.entries.drain( start..end ).collect();
        let insert_at = if destination > start { destination - length } else { destination };
        self.entries.splice( insert_at..insert_at, block );

        self.emit( StoreEvent::RowsMoved { first: start, last: end - 1, destination } );
        Ok(())
    }


    /// Moves a set of rows, not necessarily contiguous, to land as one block
    /// before `destination`, keeping their relative order.
    pub fn move_set( &mut self, rows: &[usize], destination: usize ) -> Result<(), StoreError> {
        let count = self.count();
        if let Some( &row ) = rows.iter().find( |&&r| r >= count ) {
            return Err( StoreError::OutOfRange { row, count } );
        }
        if destination > count {
            return Err( StoreError::OutOfRange { row: destination, count } );
        }

        // Runs crossing the destination are split so each half stays on its side.
        let mut below = Vec::new();
        let mut above = Vec::new();
        for ( start, length ) in contiguous_runs( rows ) {
            let end = start + length;
            if end <= destination {
                below.push(( start, length ));
            } else if start >= destination {
                above.push(( start, length ));
            } else {
                below.push(( start, destination - start ));
                above.push(( destination, end - destination ));
            }
        }

        // Runs below the destination stack up from the destination downwards.
        // Moving them never shifts rows at or past the destination.
        let mut insert_at = destination;
        for &( start, length ) in below.iter().rev() {
            self.move_range( start, length, insert_at )?;
            insert_at -= length;
        }

        // Runs at or past the destination stack up from the destination upwards.
        let mut insert_at = destination;
        for &( start, length ) in &above {
            self.move_range( start, length, insert_at )?;
            insert_at += length;
        }

        Ok(())
    }


    /// Shuffles the whole playlist. Attributes and cursors follow their entries.
    pub fn shuffle( &mut self ) {
        if self.entries.len() < 2 {
            return;
        }

        self.entries.shuffle( &mut rand::rng() );
        self.emit( StoreEvent::LayoutChanged );
    }


    /// Reads one attribute of the entry at `row`.
    pub fn attribute( &self, row: usize, role: Role ) -> Result<Attribute, StoreError> {
        let entry = self.get( row )?;
        let id = Some( entry.id() );

        Ok( match role {
            Role::Text => Attribute::Text( entry.display_text.clone() ),
            Role::TrackInfoFormatId => Attribute::TrackInfoFormatId( entry.track_info_format_id ),
            Role::FilePath => Attribute::FilePath( entry.file_path.clone() ),
            Role::Duration => Attribute::Duration( entry.duration_seconds ),
            Role::LastPosition => Attribute::LastPosition( entry.last_position ),
            Role::PlaybackCount => Attribute::PlaybackCount( entry.playback_count ),
            Role::Failed => Attribute::Failed( entry.is_failed ),
            Role::Selected => Attribute::Selected( entry.is_selected ),
            Role::Current => Attribute::Current( self.current == id ),
            Role::Focused => Attribute::Focused( self.focused == id ),
            Role::Hovered => Attribute::Hovered( self.hovered == id ),
        })
    }


    /// Sets one attribute on one row.
    ///
    /// Setting a singleton attribute (current, focused, hovered) to true moves
    /// it away from whichever row held it; both rows are notified.
    pub fn set_attribute( &mut self, row: usize, value: Attribute ) -> Result<(), StoreError> {
        if row >= self.count() {
            return Err( StoreError::OutOfRange { row, count: self.count() } );
        }

        let role = value.role();
        match value.singleton_flag() {
            Some( flag ) => self.set_singleton( role, row, flag ),
            None => {
                self.write_field( row, &value );
                self.emit( StoreEvent::changed( row, row, role ) );
            }
        }
        Ok(())
    }


    /// Sets one attribute on rows `start..=end`.
    ///
    /// Fails without touching any row when the range is malformed or out of
    /// bounds. A singleton attribute can only be set to true on a single row.
    pub fn set_attribute_range( &mut self, start: usize, end: usize, value: Attribute ) -> Result<(), StoreError> {
        let count = self.count();
        if start > end || end >= count {
            return Err( StoreError::InvalidRange { start, end, count } );
        }

        let role = value.role();
        match value.singleton_flag() {
            Some( true ) if start != end => Err( StoreError::SingletonRange { role } ),
            Some( true ) => self.set_attribute( start, value ),
            Some( false ) => {
                if let Some( row ) = self.singleton_row( role ).filter( |r| ( start..=end ).contains( r ) ) {
                    self.set_singleton( role, row, false );
                }
                Ok(())
            }
            None => {
                for row in start..=end {
                    self.write_field( row, &value );
                }
                self.emit( StoreEvent::changed( start, end, role ) );
                Ok(())
            }
        }
    }


    /// Sets one attribute on every row. A no-op on an empty store.
    pub fn set_attribute_all( &mut self, value: Attribute ) -> Result<(), StoreError> {
        if self.entries.is_empty() {
            return Ok(());
        }
        self.set_attribute_range( 0, self.entries.len() - 1, value )
    }


    /// Sets one attribute on the entry with `id`.
    ///
    /// @returns false if no such entry exists any more
    pub fn set_attribute_by_id( &mut self, id: EntryId, value: Attribute ) -> bool {
        match self.row_of( id ) {
            Some( row ) => self.set_attribute( row, value ).is_ok(),
            None => {
                tracing::debug!( "Ignoring {:?} for missing entry {}", value.role(), id );
                false
            }
        }
    }


    /// Gets the row of the current (playing) entry.
    pub fn current_row( &self ) -> Option<usize> {
        self.singleton_row( Role::Current )
    }


    /// Gets the current (playing) entry.
    pub fn current_entry( &self ) -> Option<&TrackEntry> {
        self.current.and_then( |id| self.entry_by_id( id ) )
    }


    /// Marks `row` as the current entry.
    pub fn set_current_row( &mut self, row: usize ) -> Result<(), StoreError> {
        self.set_attribute( row, Attribute::Current( true ) )
    }


    /// Marks the entry with `id` as current, or clears the current entry.
    ///
    /// @returns false if `id` names an entry that no longer exists
    pub fn set_current_id( &mut self, id: Option<EntryId> ) -> bool {
        match id {
            Some( id ) => self.set_attribute_by_id( id, Attribute::Current( true ) ),
            None => {
                if let Some( row ) = self.current_row() {
                    self.set_singleton( Role::Current, row, false );
                }
                self.current = None;
                true
            }
        }
    }


    /// Gets the keyboard cursor row.
    pub fn focused_row( &self ) -> Option<usize> {
        self.singleton_row( Role::Focused )
    }


    /// Moves the keyboard cursor to `row`.
    pub fn set_focused_row( &mut self, row: usize ) -> Result<(), StoreError> {
        self.set_attribute( row, Attribute::Focused( true ) )
    }


    /// Gets the pointer cursor row.
    pub fn hovered_row( &self ) -> Option<usize> {
        self.singleton_row( Role::Hovered )
    }


    /// Returns true if `row` is selected. Out-of-range rows are not.
    pub fn is_selected( &self, row: usize ) -> bool {
        self.entries.get( row ).is_some_and( |e| e.is_selected )
    }


    /// Returns the selected rows in ascending order.
    pub fn selected_rows( &self ) -> Vec<usize> {
        self.entries.iter()
            .enumerate()
            .filter( |( _, e )| e.is_selected )
            .map( |( row, _ )| row )
            .collect()
    }


    fn cursor_slot( &mut self, role: Role ) -> &mut Option<EntryId> {
        match role {
            Role::Focused => &mut self.focused,
            Role::Hovered => &mut self.hovered,
            _ => &mut self.current,
        }
    }


    fn singleton_row( &self, role: Role ) -> Option<usize> {
        let id = match role {
            Role::Current => self.current,
            Role::Focused => self.focused,
            Role::Hovered => self.hovered,
            _ => None,
        }?;
        self.row_of( id )
    }


    /// Moves or clears a singleton cursor. State is fully updated before any
    /// notification goes out, so observers never see two holders.
    fn set_singleton( &mut self, role: Role, row: usize, flag: bool ) {
        let id = self.entries[ row ].id();

        if flag {
            let previous_row = self.singleton_row( role );
            *self.cursor_slot( role ) = Some( id );
            if let Some( previous ) = previous_row.filter( |&p| p != row ) {
                self.emit( StoreEvent::changed( previous, previous, role ) );
            }
            self.emit( StoreEvent::changed( row, row, role ) );
        } else if *self.cursor_slot( role ) == Some( id ) {
            *self.cursor_slot( role ) = None;
            self.emit( StoreEvent::changed( row, row, role ) );
        }
    }


    fn write_field( &mut self, row: usize, value: &Attribute ) {
        let entry = &mut self.entries[ row ];
        match value {
            Attribute::Text( text ) => entry.display_text = text.clone(),
            Attribute::TrackInfoFormatId( format ) => entry.track_info_format_id = *format,
            Attribute::FilePath( path ) => entry.file_path = path.clone(),
            Attribute::Duration( seconds ) => entry.duration_seconds = *seconds,
            Attribute::LastPosition( position ) => entry.last_position = *position,
            Attribute::PlaybackCount( plays ) => entry.playback_count = *plays,
            Attribute::Failed( failed ) => entry.is_failed = *failed,
            Attribute::Selected( selected ) => entry.is_selected = *selected,
            Attribute::Current( _ ) | Attribute::Focused( _ ) | Attribute::Hovered( _ ) => {}
        }
    }


    fn forget_cursors( &mut self, removed: &[EntryId] ) {
        for slot in [ &mut self.current, &mut self.focused, &mut self.hovered ] {
            if slot.is_some_and( |id| removed.contains( &id ) ) {
                *slot = None;
            }
        }
    }


    fn emit( &mut self, event: StoreEvent ) {
        self.subscribers.retain( |tx| tx.send( event.clone() ).is_ok() );
    }
}


/// Sorts and deduplicates rows, then groups them into maximal runs of
/// consecutive rows as `(start, length)` pairs in ascending order.
pub fn contiguous_runs( rows: &[usize] ) -> Vec<( usize, usize )> {
    let mut sorted = rows.to_vec();
    sorted.sort_unstable();
    sorted.dedup();

    let mut runs: Vec<( usize, usize )> = Vec::new();
    for row in sorted {
        if let Some(( start, length )) = runs.last_mut() {
            if *start + *length == row {
                *length += 1;
                continue;
            }
        }
        runs.push(( row, 1 ));
    }
    runs
}


#[cfg( test )]
mod tests {
    use super::*;


    fn store_with( names: &[&str] ) -> PlaylistStore {
        let mut store = PlaylistStore::new();
        for name in names {
            store.append( NewEntry::default().with_text( *name ) );
        }
        store
    }


    fn texts( store: &PlaylistStore ) -> Vec<String> {
        store.iter().map( |e| e.display_text.clone() ).collect()
    }


    #[test]
    fn test_ids_start_at_reserved_boundary() {
        let mut store = PlaylistStore::new();
        let first = store.append( NewEntry::default() );
        let second = store.insert( NewEntry::default(), 0 ).unwrap();
        assert_eq!( first.raw(), FIRST_ENTRY_ID );
        assert_eq!( second.raw(), FIRST_ENTRY_ID + 1 );
        assert_eq!( store.get( 0 ).unwrap().id(), second );
    }


    #[test]
    fn test_ids_are_not_reused_after_removal() {
        let mut store = store_with( &[ "A", "B" ] );
        let removed = store.remove_at( 1 ).unwrap().id();
        let added = store.append( NewEntry::default() );
        assert!( added > removed );
    }


    #[test]
    fn test_insert_out_of_range() {
        let mut store = store_with( &[ "A" ] );
        let result = store.insert( NewEntry::default(), 2 );
        assert_eq!( result, Err( StoreError::OutOfRange { row: 2, count: 1 } ) );
        assert_eq!( store.count(), 1 );
    }


    #[test]
    fn test_insert_shifts_rows_and_notifies() {
        let mut store = store_with( &[ "A", "B" ] );
        let rx = store.subscribe();
        store.insert( NewEntry::default().with_text( "X" ), 1 ).unwrap();
        assert_eq!( texts( &store ), vec![ "A", "X", "B" ] );
        assert_eq!( rx.try_recv(), Ok( StoreEvent::RowsInserted { first: 1, last: 1 } ) );
    }


    #[test]
    fn test_get_out_of_range() {
        let store = store_with( &[ "A" ] );
        assert!( matches!( store.get( 1 ), Err( StoreError::OutOfRange { row: 1, count: 1 } ) ) );
    }


    #[test]
    fn test_remove_many_keeps_flags_on_survivors() {
        let mut store = store_with( &[ "A", "B", "C", "D", "E" ] );
        store.set_attribute( 0, Attribute::Failed( true ) ).unwrap();
        store.set_attribute( 2, Attribute::Selected( true ) ).unwrap();
        store.set_attribute( 4, Attribute::PlaybackCount( 7 ) ).unwrap();

        assert_eq!( store.remove_many( &[ 1, 3 ] ), Ok( 2 ) );

        assert_eq!( texts( &store ), vec![ "A", "C", "E" ] );
        assert!( store.get( 0 ).unwrap().is_failed );
        assert!( store.get( 1 ).unwrap().is_selected );
        assert_eq!( store.get( 2 ).unwrap().playback_count, 7 );
    }


    #[test]
    fn test_remove_many_notifies_runs_from_the_top() {
        let mut store = store_with( &[ "A", "B", "C", "D", "E", "F" ] );
        let rx = store.subscribe();
        store.remove_many( &[ 4, 1, 2, 5 ] ).unwrap();

        let events: Vec<_> = rx.try_iter().collect();
        assert_eq!( events, vec![
            StoreEvent::RowsRemoved { first: 4, last: 5 },
            StoreEvent::RowsRemoved { first: 1, last: 2 },
        ]);
        assert_eq!( texts( &store ), vec![ "A", "D" ] );
    }


    #[test]
    fn test_remove_many_rejects_bad_row_without_mutation() {
        let mut store = store_with( &[ "A", "B" ] );
        assert!( store.remove_many( &[ 0, 5 ] ).is_err() );
        assert_eq!( store.count(), 2 );
    }


    #[test]
    fn test_remove_ids() {
        let mut store = store_with( &[ "A", "B", "C" ] );
        let ids: HashSet<EntryId> = [ store.get( 0 ).unwrap().id(), store.get( 2 ).unwrap().id() ].into();
        assert_eq!( store.remove_ids( &ids ), 2 );
        assert_eq!( texts( &store ), vec![ "B" ] );
    }


    #[test]
    fn test_remove_all_clears_cursors() {
        let mut store = store_with( &[ "A", "B" ] );
        store.set_current_row( 1 ).unwrap();
        store.set_focused_row( 0 ).unwrap();
        let rx = store.subscribe();
        store.remove_all();
        assert!( store.is_empty() );
        assert_eq!( store.current_row(), None );
        assert_eq!( store.focused_row(), None );
        assert_eq!( rx.try_recv(), Ok( StoreEvent::RowsRemoved { first: 0, last: 1 } ) );
    }


    #[test]
    fn test_removing_current_entry_clears_it() {
        let mut store = store_with( &[ "A", "B", "C" ] );
        store.set_current_row( 1 ).unwrap();
        store.remove_at( 1 ).unwrap();
        assert_eq!( store.current_row(), None );
        assert!( store.current_entry().is_none() );
    }


    #[test]
    fn test_move_range_down() {
        let mut store = store_with( &[ "A", "B", "C", "D", "E" ] );
        store.move_range( 0, 2, 4 ).unwrap();
        assert_eq!( texts( &store ), vec![ "C", "D", "A", "B", "E" ] );
    }


    #[test]
    fn test_move_range_up() {
        let mut store = store_with( &[ "A", "B", "C", "D", "E" ] );
        let rx = store.subscribe();
        store.move_range( 3, 2, 1 ).unwrap();
        assert_eq!( texts( &store ), vec![ "A", "D", "E", "B", "C" ] );
        assert_eq!( rx.try_recv(), Ok( StoreEvent::RowsMoved { first: 3, last: 4, destination: 1 } ) );
    }


    #[test]
    fn test_move_range_to_end() {
        let mut store = store_with( &[ "A", "B", "C" ] );
        store.move_range( 0, 1, 3 ).unwrap();
        assert_eq!( texts( &store ), vec![ "B", "C", "A" ] );
    }


    #[test]
    fn test_move_range_rejects_invalid() {
        let mut store = store_with( &[ "A", "B", "C", "D" ] );
        assert!( store.move_range( 1, 0, 3 ).is_err() );
        assert!( store.move_range( 2, 3, 0 ).is_err() );
        assert!( store.move_range( 0, 1, 5 ).is_err() );
        assert!( store.move_range( 0, 3, 1 ).is_err() );
        assert_eq!( texts( &store ), vec![ "A", "B", "C", "D" ] );
    }


    #[test]
    fn test_move_range_onto_itself_is_noop() {
        let mut store = store_with( &[ "A", "B", "C" ] );
        let rx = store.subscribe();
        assert!( store.move_range( 1, 1, 1 ).is_ok() );
        assert!( store.move_range( 1, 1, 2 ).is_ok() );
        assert_eq!( texts( &store ), vec![ "A", "B", "C" ] );
        assert!( rx.try_recv().is_err() );
    }


    #[test]
    fn test_move_set_block_to_top() {
        let mut store = store_with( &[ "A", "B", "C", "D", "E" ] );
        store.move_set( &[ 2, 3 ], 0 ).unwrap();
        assert_eq!( texts( &store ), vec![ "C", "D", "A", "B", "E" ] );
    }


    #[test]
    fn test_move_set_scattered_to_end() {
        let mut store = store_with( &[ "A", "B", "C", "D", "E" ] );
        store.move_set( &[ 3, 1 ], 5 ).unwrap();
        assert_eq!( texts( &store ), vec![ "A", "C", "E", "B", "D" ] );
    }


    #[test]
    fn test_move_set_scattered_into_middle() {
        let mut store = store_with( &[ "A", "B", "C", "D", "E", "F" ] );
        store.move_set( &[ 0, 5, 2 ], 4 ).unwrap();
        assert_eq!( texts( &store ), vec![ "B", "D", "A", "C", "F", "E" ] );
    }


    #[test]
    fn test_move_set_destination_inside_run() {
        let mut store = store_with( &[ "A", "B", "C", "D", "E" ] );
        store.move_set( &[ 0, 1, 2, 4 ], 1 ).unwrap();
        assert_eq!( texts( &store ), vec![ "A", "B", "C", "E", "D" ] );
    }


    #[test]
    fn test_move_set_keeps_identity_and_cursors() {
        let mut store = store_with( &[ "A", "B", "C", "D", "E" ] );
        let id_c = store.get( 2 ).unwrap().id();
        store.set_current_row( 2 ).unwrap();
        store.set_focused_row( 4 ).unwrap();

        store.move_set( &[ 2, 3 ], 0 ).unwrap();

        assert_eq!( store.row_of( id_c ), Some( 0 ) );
        assert_eq!( store.current_row(), Some( 0 ) );
        assert_eq!( store.focused_row(), Some( 4 ) );
    }


    #[test]
    fn test_singleton_cursor_moves_atomically() {
        let mut store = store_with( &[ "A", "B", "C" ] );
        store.set_current_row( 0 ).unwrap();
        let rx = store.subscribe();
        store.set_current_row( 2 ).unwrap();

        let holders: Vec<usize> = ( 0..3 )
            .filter( |&r| store.attribute( r, Role::Current ) == Ok( Attribute::Current( true ) ) )
            .collect();
        assert_eq!( holders, vec![ 2 ] );

        let events: Vec<_> = rx.try_iter().collect();
        assert_eq!( events, vec![
            StoreEvent::changed( 0, 0, Role::Current ),
            StoreEvent::changed( 2, 2, Role::Current ),
        ]);
    }


    #[test]
    fn test_clearing_singleton_on_other_row_is_noop() {
        let mut store = store_with( &[ "A", "B" ] );
        store.set_attribute( 0, Attribute::Hovered( true ) ).unwrap();
        store.set_attribute( 1, Attribute::Hovered( false ) ).unwrap();
        assert_eq!( store.hovered_row(), Some( 0 ) );
        store.set_attribute( 0, Attribute::Hovered( false ) ).unwrap();
        assert_eq!( store.hovered_row(), None );
    }


    #[test]
    fn test_range_mutation_is_atomic() {
        let mut store = store_with( &[ "A", "B", "C", "D", "E" ] );
        let rx = store.subscribe();
        let result = store.set_attribute_range( 1, 10, Attribute::Selected( true ) );
        assert_eq!( result, Err( StoreError::InvalidRange { start: 1, end: 10, count: 5 } ) );
        assert!( store.selected_rows().is_empty() );
        assert!( rx.try_recv().is_err() );
    }


    #[test]
    fn test_range_rejects_reversed_bounds() {
        let mut store = store_with( &[ "A", "B", "C" ] );
        assert!( store.set_attribute_range( 2, 1, Attribute::Selected( true ) ).is_err() );
    }


    #[test]
    fn test_range_notifies_once() {
        let mut store = store_with( &[ "A", "B", "C", "D" ] );
        let rx = store.subscribe();
        store.set_attribute_range( 1, 3, Attribute::Selected( true ) ).unwrap();
        assert_eq!( store.selected_rows(), vec![ 1, 2, 3 ] );
        assert_eq!( rx.try_iter().collect::<Vec<_>>(), vec![ StoreEvent::changed( 1, 3, Role::Selected ) ] );
    }


    #[test]
    fn test_singleton_range_rejected() {
        let mut store = store_with( &[ "A", "B" ] );
        let result = store.set_attribute_all( Attribute::Focused( true ) );
        assert_eq!( result, Err( StoreError::SingletonRange { role: Role::Focused } ) );
        assert_eq!( store.focused_row(), None );
    }


    #[test]
    fn test_set_attribute_all_on_empty_store() {
        let mut store = PlaylistStore::new();
        assert!( store.set_attribute_all( Attribute::Selected( false ) ).is_ok() );
    }


    #[test]
    fn test_set_attribute_by_missing_id_is_noop() {
        let mut store = store_with( &[ "A" ] );
        let id = store.get( 0 ).unwrap().id();
        store.remove_all();
        assert!( !store.set_attribute_by_id( id, Attribute::Duration( 30 ) ) );
        assert!( !store.set_current_id( Some( id ) ) );
    }


    #[test]
    fn test_replace_all_and_export() {
        let mut store = store_with( &[ "old" ] );
        let ids = store.replace_all( vec![
            NewEntry::default().with_text( "one" ),
            NewEntry::default().with_text( "two" ),
        ]);
        assert_eq!( ids.len(), 2 );
        let exported = store.export();
        assert_eq!( exported.iter().map( |e| e.id() ).collect::<Vec<_>>(), ids );
        assert_eq!( texts( &store ), vec![ "one", "two" ] );
    }


    #[test]
    fn test_shuffle_keeps_entries() {
        let mut store = store_with( &[ "A", "B", "C", "D", "E", "F" ] );
        store.set_current_row( 3 ).unwrap();
        let id_d = store.get( 3 ).unwrap().id();
        store.shuffle();
        let mut names = texts( &store );
        names.sort();
        assert_eq!( names, vec![ "A", "B", "C", "D", "E", "F" ] );
        assert_eq!( store.current_row(), store.row_of( id_d ) );
    }


    #[test]
    fn test_dropped_subscriber_is_pruned() {
        let mut store = store_with( &[ "A" ] );
        let rx = store.subscribe();
        drop( rx );
        store.append( NewEntry::default() );
        assert!( store.subscribers.is_empty() );
    }


    #[test]
    fn test_contiguous_runs() {
        assert_eq!( contiguous_runs( &[ 5, 1, 2, 2, 7, 6 ] ), vec![ ( 1, 2 ), ( 5, 3 ) ] );
        assert!( contiguous_runs( &[] ).is_empty() );
    }
}
