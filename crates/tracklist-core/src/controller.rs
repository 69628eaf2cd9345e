//! Interaction policy for the playlist view.
//!
//! Translates pointer, keyboard and drop input into store mutations using the
//! usual multi-select list conventions. Rows passed in from the input layer
//! are approximate, so out-of-range rows are ignored or clamped here instead
//! of being reported as errors.

use crate::entry::{ EntryId, NewEntry };
use crate::event::Attribute;
use crate::keys::{ Binding, Key, Modifiers };
use crate::store::{ contiguous_runs, PlaylistStore, StoreError };


/// Actions the controller reports back to its caller.
#[derive( Debug, Clone, Copy, PartialEq, Eq )]
pub enum ControllerEvent {
    /// A row was activated (double click or Enter) and should start playing.
    RowActivated { row: usize, id: EntryId },
}


/// Playlist controller owning its store.
#[derive( Debug )]
pub struct PlaylistController {
    store: PlaylistStore,
    rows_per_page: usize,
}


impl Default for PlaylistController {
    fn default() -> Self {
        Self::new()
    }
}


impl PlaylistController {
    /// Creates a controller with an empty store.
    pub fn new() -> Self {
        Self::with_store( PlaylistStore::new() )
    }


    /// Creates a controller around an existing store.
    pub fn with_store( store: PlaylistStore ) -> Self {
        Self { store, rows_per_page: 1 }
    }


    /// Gets the store.
    pub fn store( &self ) -> &PlaylistStore {
        &self.store
    }


    /// Gets the store for direct mutation by collaborators.
    pub fn store_mut( &mut self ) -> &mut PlaylistStore {
        &mut self.store
    }


    /// Gets the page size used by PageUp/PageDown.
    pub fn rows_per_page( &self ) -> usize {
        self.rows_per_page
    }


    /// Sets the page size used by PageUp/PageDown. Never below one row.
    pub fn set_rows_per_page( &mut self, rows: usize ) {
        self.rows_per_page = rows.max( 1 );
    }


    /// Handles a pointer press on `row`.
    pub fn pointer_down( &mut self, row: usize, modifiers: Modifiers ) {
        if row >= self.store.count() {
            tracing::debug!( "Ignoring press on row {} (count {})", row, self.store.count() );
            return;
        }

        if modifiers.is_empty() {
            if !self.store.is_selected( row ) {
                self.select_only( row, row );
            }
        } else if modifiers.shift {
            let anchor = self.store.focused_row().unwrap_or( row );
            self.select_only( anchor, row );
        } else if modifiers.control {
            self.toggle( row );
        }

        self.focus( row );
    }


    /// Handles a pointer release on `row`. Collapses the selection to `row`
    /// when no modifier is held.
    pub fn pointer_up( &mut self, row: usize, modifiers: Modifiers ) {
        if !modifiers.is_empty() || row >= self.store.count() {
            return;
        }
        self.select_only( row, row );
    }


    /// Handles the pointer entering `row`.
    pub fn pointer_enter( &mut self, row: usize ) {
        if row < self.store.count() {
            log_rejected( self.store.set_attribute( row, Attribute::Hovered( true ) ) );
        }
    }


    /// Handles the pointer leaving `row`.
    pub fn pointer_exit( &mut self, row: usize ) {
        if row < self.store.count() {
            log_rejected( self.store.set_attribute( row, Attribute::Hovered( false ) ) );
        }
    }


    /// Handles a double click. `None` means the click landed outside any row.
    pub fn double_click( &mut self, row: Option<usize> ) -> Option<ControllerEvent> {
        let row = row?;
        let id = self.store.get( row ).ok()?.id();
        tracing::debug!( "Row {} activated ({})", row, id );
        Some( ControllerEvent::RowActivated { row, id } )
    }


    /// Activates the focused row, as Enter does.
    pub fn activate_focused( &mut self ) -> Option<ControllerEvent> {
        let row = self.store.focused_row();
        self.double_click( row )
    }


    /// Handles a key press.
    pub fn key_press( &mut self, key: Key, modifiers: Modifiers ) {
        if key.is_navigation() {
            self.navigate( key, modifiers );
            return;
        }

        match Binding::resolve( key, modifiers ) {
            Some( Binding::SelectAll ) => {
                log_rejected( self.store.set_attribute_all( Attribute::Selected( true ) ) );
            }
            Some( Binding::Delete ) => self.delete_selected(),
            Some( Binding::ToggleFocused ) => {
                if let Some( row ) = self.store.focused_row() {
                    self.toggle( row );
                }
            }
            None => {}
        }
    }


    /// Moves the selected rows as one block to land before `destination`.
    pub fn move_selected( &mut self, destination: usize ) {
        let selected = self.store.selected_rows();
        if selected.is_empty() {
            return;
        }

        let destination = destination.min( self.store.count() );
        log_rejected( self.store.move_set( &selected, destination ) );
    }


    /// Inserts dropped entries as one contiguous block starting at `row`.
    ///
    /// @returns The ids of the inserted entries, in order
    pub fn drop_entries( &mut self, entries: impl IntoIterator<Item = NewEntry>, row: usize ) -> Vec<EntryId> {
        let mut row = row;
        let mut ids = Vec::new();
        for entry in entries {
            row = row.min( self.store.count() );
            match self.store.insert( entry, row ) {
                Ok( id ) => ids.push( id ),
                Err( e ) => tracing::warn!( "Dropped entry rejected: {}", e ),
            }
            row += 1;
        }

        tracing::info!( "Dropped {} entries", ids.len() );
        ids
    }


    fn navigate( &mut self, key: Key, modifiers: Modifiers ) {
        let count = self.store.count();
        if count == 0 {
            return;
        }

        let last = count - 1;
        let page = self.rows_per_page;
        let previous = self.store.focused_row();
        let target = match key {
            Key::Up => previous.map_or( 0, |f| f.saturating_sub( 1 ) ),
            Key::Down => previous.map_or( 0, |f| ( f + 1 ).min( last ) ),
            Key::Home => 0,
            Key::End => last,
            Key::PageUp => previous.map_or( 0, |f| f.saturating_sub( page ) ),
            Key::PageDown => previous.map_or( 0, |f| ( f + page ).min( last ) ),
            _ => return,
        };

        self.focus( target );

        if modifiers.is_empty() {
            self.select_only( target, target );
        } else if modifiers.shift {
            self.select_only( previous.unwrap_or( target ), target );
        }
    }


    fn delete_selected( &mut self ) {
        let selected = self.store.selected_rows();
        let Some( &first ) = selected.first() else {
            return;
        };

        log_rejected( self.store.remove_many( &selected ).map( |_| () ) );

        let count = self.store.count();
        if count == 0 {
            return;
        }

        let row = first.min( count - 1 );
        self.focus( row );
        log_rejected( self.store.set_attribute( row, Attribute::Selected( true ) ) );
    }


    /// Replaces the selection with the inclusive range between `a` and `b`.
    ///
    /// Only rows whose selection changes are written, one range per
    /// contiguous run.
    fn select_only( &mut self, a: usize, b: usize ) {
        let ( start, end ) = if a <= b { ( a, b ) } else { ( b, a ) };
        let range = start..=end;

        let stale: Vec<usize> = self.store.selected_rows()
            .into_iter()
            .filter( |row| !range.contains( row ) )
            .collect();
        let missing: Vec<usize> = range.clone()
            .filter( |&row| !self.store.is_selected( row ) )
            .collect();

        self.set_selected_runs( &stale, false );
        self.set_selected_runs( &missing, true );
    }


    fn set_selected_runs( &mut self, rows: &[usize], selected: bool ) {
        for ( first, length ) in contiguous_runs( rows ) {
            let last = first + length - 1;
            log_rejected( self.store.set_attribute_range( first, last, Attribute::Selected( selected ) ) );
        }
    }


    fn toggle( &mut self, row: usize ) {
        let selected = self.store.is_selected( row );
        log_rejected( self.store.set_attribute( row, Attribute::Selected( !selected ) ) );
    }


    fn focus( &mut self, row: usize ) {
        log_rejected( self.store.set_focused_row( row ) );
    }
}


fn log_rejected( result: Result<(), StoreError> ) {
    if let Err( e ) = result {
        tracing::warn!( "Playlist update rejected: {}", e );
    }
}


#[cfg( test )]
mod tests {
    use super::*;
    use crate::event::{ Role, StoreEvent };


    fn controller_with( names: &[&str] ) -> PlaylistController {
        let mut controller = PlaylistController::new();
        for name in names {
            controller.store_mut().append( NewEntry::default().with_text( *name ) );
        }
        controller
    }


    fn texts( controller: &PlaylistController ) -> Vec<String> {
        controller.store().iter().map( |e| e.display_text.clone() ).collect()
    }


    #[test]
    fn test_click_selects_single_row() {
        let mut c = controller_with( &[ "A", "B", "C" ] );
        c.pointer_down( 0, Modifiers::NONE );
        c.pointer_down( 2, Modifiers::NONE );
        assert_eq!( c.store().selected_rows(), vec![ 2 ] );
        assert_eq!( c.store().focused_row(), Some( 2 ) );
    }


    #[test]
    fn test_click_on_selected_row_keeps_selection_until_release() {
        let mut c = controller_with( &[ "A", "B", "C" ] );
        c.key_press( Key::Char( 'a' ), Modifiers::CONTROL );
        c.pointer_down( 1, Modifiers::NONE );
        assert_eq!( c.store().selected_rows(), vec![ 0, 1, 2 ] );
        c.pointer_up( 1, Modifiers::NONE );
        assert_eq!( c.store().selected_rows(), vec![ 1 ] );
    }


    #[test]
    fn test_shift_click_replaces_selection_with_range() {
        let mut c = controller_with( &[ "A", "B", "C", "D", "E", "F" ] );
        c.pointer_down( 0, Modifiers::CONTROL );
        c.pointer_down( 4, Modifiers::NONE );
        c.pointer_down( 2, Modifiers::SHIFT );
        assert_eq!( c.store().selected_rows(), vec![ 2, 3, 4 ] );
        assert_eq!( c.store().focused_row(), Some( 2 ) );
    }


    #[test]
    fn test_ctrl_click_toggles() {
        let mut c = controller_with( &[ "A", "B", "C" ] );
        c.pointer_down( 0, Modifiers::NONE );
        c.pointer_down( 2, Modifiers::CONTROL );
        assert_eq!( c.store().selected_rows(), vec![ 0, 2 ] );
        c.pointer_down( 0, Modifiers::CONTROL );
        assert_eq!( c.store().selected_rows(), vec![ 2 ] );
    }


    #[test]
    fn test_pointer_out_of_range_ignored() {
        let mut c = controller_with( &[ "A" ] );
        c.pointer_down( 5, Modifiers::NONE );
        c.pointer_up( 5, Modifiers::NONE );
        c.pointer_enter( 5 );
        assert!( c.store().selected_rows().is_empty() );
        assert_eq!( c.store().focused_row(), None );
        assert_eq!( c.store().hovered_row(), None );
    }


    #[test]
    fn test_hover_follows_pointer() {
        let mut c = controller_with( &[ "A", "B" ] );
        c.pointer_enter( 0 );
        c.pointer_enter( 1 );
        c.pointer_exit( 0 );
        assert_eq!( c.store().hovered_row(), Some( 1 ) );
        c.pointer_exit( 1 );
        assert_eq!( c.store().hovered_row(), None );
    }


    #[test]
    fn test_double_click_outside_rows() {
        let mut c = controller_with( &[ "A" ] );
        assert_eq!( c.double_click( None ), None );
        let id = c.store().get( 0 ).unwrap().id();
        assert_eq!( c.double_click( Some( 0 ) ), Some( ControllerEvent::RowActivated { row: 0, id } ) );
    }


    #[test]
    fn test_arrow_keys_clamp_and_collapse_selection() {
        let mut c = controller_with( &[ "A", "B", "C" ] );
        c.key_press( Key::Down, Modifiers::NONE );
        assert_eq!( c.store().focused_row(), Some( 0 ) );
        c.key_press( Key::Up, Modifiers::NONE );
        assert_eq!( c.store().focused_row(), Some( 0 ) );
        c.key_press( Key::End, Modifiers::NONE );
        c.key_press( Key::Down, Modifiers::NONE );
        assert_eq!( c.store().focused_row(), Some( 2 ) );
        assert_eq!( c.store().selected_rows(), vec![ 2 ] );
    }


    #[test]
    fn test_page_keys_use_rows_per_page() {
        let mut c = controller_with( &[ "A", "B", "C", "D", "E", "F", "G" ] );
        c.set_rows_per_page( 3 );
        c.key_press( Key::Home, Modifiers::NONE );
        c.key_press( Key::PageDown, Modifiers::NONE );
        assert_eq!( c.store().focused_row(), Some( 3 ) );
        c.key_press( Key::PageDown, Modifiers::NONE );
        c.key_press( Key::PageDown, Modifiers::NONE );
        assert_eq!( c.store().focused_row(), Some( 6 ) );
        c.key_press( Key::PageUp, Modifiers::NONE );
        assert_eq!( c.store().focused_row(), Some( 3 ) );
    }


    #[test]
    fn test_shift_navigation_selects_range_from_previous_focus() {
        let mut c = controller_with( &[ "A", "B", "C", "D", "E" ] );
        c.pointer_down( 3, Modifiers::NONE );
        c.key_press( Key::Home, Modifiers::SHIFT );
        assert_eq!( c.store().selected_rows(), vec![ 0, 1, 2, 3 ] );
        assert_eq!( c.store().focused_row(), Some( 0 ) );
    }


    #[test]
    fn test_ctrl_navigation_keeps_selection() {
        let mut c = controller_with( &[ "A", "B", "C" ] );
        c.pointer_down( 0, Modifiers::NONE );
        c.key_press( Key::Down, Modifiers::CONTROL );
        c.key_press( Key::Space, Modifiers::CONTROL );
        assert_eq!( c.store().selected_rows(), vec![ 0, 1 ] );
        assert_eq!( c.store().focused_row(), Some( 1 ) );
    }


    #[test]
    fn test_collapse_notifies_only_changed_rows() {
        let mut c = controller_with( &[ "A", "B", "C", "D", "E" ] );
        c.pointer_down( 1, Modifiers::NONE );
        let rx = c.store_mut().subscribe();

        c.key_press( Key::Down, Modifiers::NONE );

        let selection_events: Vec<StoreEvent> = rx.try_iter()
            .filter( |e| matches!( e, StoreEvent::RowsChanged { roles, .. } if roles.contains( &Role::Selected ) ) )
            .collect();
        assert_eq!( selection_events, vec![
            StoreEvent::RowsChanged { first: 1, last: 1, roles: vec![ Role::Selected ] },
            StoreEvent::RowsChanged { first: 2, last: 2, roles: vec![ Role::Selected ] },
        ]);
        assert_eq!( c.store().selected_rows(), vec![ 2 ] );
    }


    #[test]
    fn test_shift_range_skips_rows_already_selected() {
        let mut c = controller_with( &[ "A", "B", "C", "D", "E" ] );
        c.pointer_down( 1, Modifiers::NONE );
        let rx = c.store_mut().subscribe();

        c.pointer_down( 3, Modifiers::SHIFT );

        let selection_events: Vec<StoreEvent> = rx.try_iter()
            .filter( |e| matches!( e, StoreEvent::RowsChanged { roles, .. } if roles.contains( &Role::Selected ) ) )
            .collect();
        assert_eq!( selection_events, vec![
            StoreEvent::RowsChanged { first: 2, last: 3, roles: vec![ Role::Selected ] },
        ]);
        assert_eq!( c.store().selected_rows(), vec![ 1, 2, 3 ] );
    }


    #[test]
    fn test_select_all() {
        let mut c = controller_with( &[ "A", "B", "C" ] );
        c.key_press( Key::Char( 'a' ), Modifiers::CONTROL );
        assert_eq!( c.store().selected_rows(), vec![ 0, 1, 2 ] );
    }


    #[test]
    fn test_delete_selected_refocuses_nearest_row() {
        let mut c = controller_with( &[ "A", "B", "C", "D", "E" ] );
        c.pointer_down( 3, Modifiers::NONE );
        c.pointer_down( 4, Modifiers::CONTROL );
        c.key_press( Key::Delete, Modifiers::NONE );
        assert_eq!( texts( &c ), vec![ "A", "B", "C" ] );
        assert_eq!( c.store().focused_row(), Some( 2 ) );
        assert_eq!( c.store().selected_rows(), vec![ 2 ] );
    }


    #[test]
    fn test_delete_with_nothing_selected_is_noop() {
        let mut c = controller_with( &[ "A", "B" ] );
        c.key_press( Key::Delete, Modifiers::NONE );
        assert_eq!( c.store().count(), 2 );
    }


    #[test]
    fn test_delete_everything() {
        let mut c = controller_with( &[ "A", "B" ] );
        c.key_press( Key::Char( 'a' ), Modifiers::CONTROL );
        c.key_press( Key::Delete, Modifiers::NONE );
        assert!( c.store().is_empty() );
        assert_eq!( c.store().focused_row(), None );
    }


    #[test]
    fn test_move_selected() {
        let mut c = controller_with( &[ "A", "B", "C", "D", "E" ] );
        c.pointer_down( 2, Modifiers::NONE );
        c.pointer_down( 3, Modifiers::SHIFT );
        c.move_selected( 0 );
        assert_eq!( texts( &c ), vec![ "C", "D", "A", "B", "E" ] );
        assert_eq!( c.store().selected_rows(), vec![ 0, 1 ] );
    }


    #[test]
    fn test_move_selected_clamps_destination() {
        let mut c = controller_with( &[ "A", "B", "C" ] );
        c.pointer_down( 0, Modifiers::NONE );
        c.move_selected( 99 );
        assert_eq!( texts( &c ), vec![ "B", "C", "A" ] );
    }


    #[test]
    fn test_drop_entries_inserts_block() {
        let mut c = controller_with( &[ "A", "B" ] );
        let dropped = [ "X", "Y", "Z" ].map( |n| NewEntry::default().with_text( n ) );
        let ids = c.drop_entries( dropped, 1 );
        assert_eq!( ids.len(), 3 );
        assert_eq!( texts( &c ), vec![ "A", "X", "Y", "Z", "B" ] );
    }


    #[test]
    fn test_drop_entries_past_end_appends() {
        let mut c = controller_with( &[ "A" ] );
        let dropped = [ "X", "Y" ].map( |n| NewEntry::default().with_text( n ) );
        c.drop_entries( dropped, 10 );
        assert_eq!( texts( &c ), vec![ "A", "X", "Y" ] );
    }


    #[test]
    fn test_click_then_delete_end_to_end() {
        let mut c = PlaylistController::new();
        for name in [ "A", "B", "C" ] {
            c.store_mut().append( NewEntry::default().with_text( name ) );
        }
        let id_c = c.store().get( 2 ).unwrap().id();

        c.pointer_down( 1, Modifiers::NONE );
        c.key_press( Key::Delete, Modifiers::NONE );

        assert_eq!( c.store().count(), 2 );
        let focused = c.store().focused_row();
        assert_eq!( focused, Some( 1.min( c.store().count() - 1 ) ) );
        assert_eq!( c.store().selected_rows(), vec![ 1 ] );
        assert_eq!( c.store().get( 1 ).unwrap().id(), id_c );
        assert!( !c.store().get( 0 ).unwrap().is_selected );
    }
}
