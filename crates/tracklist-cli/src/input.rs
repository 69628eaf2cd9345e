//! Input handling for the TUI.
//!
//! Translates crossterm events into the controller's key model, tracks
//! double clicks and drags, and provides the command line buffer.

use std::time::{ Duration, Instant };

use crossterm::event::{ KeyCode, KeyModifiers };
use tracklist_core::{ Key, Modifiers };


/// Current input mode of the application.
#[derive( Debug, Clone, Copy, PartialEq, Eq, Default )]
pub enum InputMode {
    /// Normal mode - keys go to the playlist.
    #[default]
    Normal,

    /// Command mode - typing a slash command.
    Command,
}


/// Converts crossterm modifiers.
pub fn modifiers( mods: KeyModifiers ) -> Modifiers {
    Modifiers {
        shift: mods.contains( KeyModifiers::SHIFT ),
        control: mods.contains( KeyModifiers::CONTROL ),
        alt: mods.contains( KeyModifiers::ALT ),
    }
}


/// Converts a crossterm key code to a playlist key.
pub fn key( code: KeyCode ) -> Option<Key> {
    match code {
        KeyCode::Up => Some( Key::Up ),
        KeyCode::Down => Some( Key::Down ),
        KeyCode::Home => Some( Key::Home ),
        KeyCode::End => Some( Key::End ),
        KeyCode::PageUp => Some( Key::PageUp ),
        KeyCode::PageDown => Some( Key::PageDown ),
        KeyCode::Delete => Some( Key::Delete ),
        KeyCode::Enter => Some( Key::Enter ),
        KeyCode::Char( ' ' ) => Some( Key::Space ),
        KeyCode::Char( c ) => Some( Key::Char( c ) ),
        _ => None,
    }
}


/// Detects double clicks on the same row.
#[derive( Debug )]
pub struct ClickTracker {
    interval: Duration,
    last: Option<( Instant, usize )>,
}


impl ClickTracker {
    pub fn new( interval: Duration ) -> Self {
        Self { interval, last: None }
    }


    /// Records a click on `row` at `now`; returns true if it completes a double click.
    pub fn click( &mut self, row: usize, now: Instant ) -> bool {
        let is_double = self.last
            .is_some_and( |( t, r )| r == row && now.duration_since( t ) < self.interval );

        self.last = if is_double { None } else { Some(( now, row )) };
        is_double
    }
}


/// Pointer press that may turn into a drag.
#[derive( Debug, Clone, Copy, PartialEq, Eq )]
pub struct PressState {
    pub row: usize,
    pub dragged: bool,
}


/// Computes where a drag started on row `from` drops the selection.
///
/// Dragging downwards places the block after the row under the pointer,
/// dragging upwards places it before. Releasing outside any row (`None`)
/// moves the block to the end.
pub fn drop_destination( from: usize, target: Option<usize>, count: usize ) -> usize {
    match target {
        Some( t ) if t > from => ( t + 1 ).min( count ),
        Some( t ) => t,
        None => count,
    }
}


/// Input buffer for command text entry.
#[derive( Debug, Default )]
pub struct InputBuffer {
    content: String,
    cursor: usize,
}


impl InputBuffer {
    /// Creates a new empty input buffer.
    pub fn new() -> Self {
        Self::default()
    }


    /// Inserts a character at the cursor position.
    pub fn insert( &mut self, c: char ) {
        self.content.insert( self.cursor, c );
        self.cursor += c.len_utf8();
    }


    /// Deletes the character before the cursor.
    pub fn backspace( &mut self ) {
        if let Some(( i, _ )) = self.content[ ..self.cursor ].char_indices().last() {
            self.content.remove( i );
            self.cursor = i;
        }
    }


    /// Moves cursor left by one character.
    pub fn move_left( &mut self ) {
        if let Some(( i, _ )) = self.content[ ..self.cursor ].char_indices().last() {
            self.cursor = i;
        }
    }


    /// Moves cursor right by one character.
    pub fn move_right( &mut self ) {
        if let Some( c ) = self.content[ self.cursor.. ].chars().next() {
            self.cursor += c.len_utf8();
        }
    }


    /// Clears the buffer.
    pub fn clear( &mut self ) {
        self.content.clear();
        self.cursor = 0;
    }


    /// Gets the current content.
    pub fn content( &self ) -> &str {
        &self.content
    }


    /// Gets the cursor position as character count (for display).
    pub fn cursor_char_pos( &self ) -> usize {
        self.content[ ..self.cursor ].chars().count()
    }
}


#[cfg( test )]
mod tests {
    use super::*;


    #[test]
    fn test_double_click_same_row() {
        let mut tracker = ClickTracker::new( Duration::from_millis( 400 ) );
        let start = Instant::now();
        assert!( !tracker.click( 3, start ) );
        assert!( tracker.click( 3, start + Duration::from_millis( 100 ) ) );
        assert!( !tracker.click( 3, start + Duration::from_millis( 150 ) ) );
    }


    #[test]
    fn test_double_click_needs_same_row_and_timing() {
        let mut tracker = ClickTracker::new( Duration::from_millis( 400 ) );
        let start = Instant::now();
        tracker.click( 1, start );
        assert!( !tracker.click( 2, start + Duration::from_millis( 50 ) ) );
        assert!( !tracker.click( 2, start + Duration::from_millis( 900 ) ) );
    }


    #[test]
    fn test_drop_below_start_lands_after_target() {
        assert_eq!( drop_destination( 1, Some( 3 ), 5 ), 4 );
        assert_eq!( drop_destination( 0, Some( 4 ), 5 ), 5 );
    }


    #[test]
    fn test_drop_above_start_lands_before_target() {
        assert_eq!( drop_destination( 3, Some( 1 ), 5 ), 1 );
        assert_eq!( drop_destination( 3, Some( 0 ), 5 ), 0 );
    }


    #[test]
    fn test_drop_outside_rows_moves_to_end() {
        assert_eq!( drop_destination( 2, None, 5 ), 5 );
    }


    #[test]
    fn test_modifier_translation() {
        let m = modifiers( KeyModifiers::SHIFT | KeyModifiers::CONTROL );
        assert!( m.shift && m.control && !m.alt );
        assert!( modifiers( KeyModifiers::NONE ).is_empty() );
    }


    #[test]
    fn test_buffer_editing_multibyte() {
        let mut buf = InputBuffer::new();
        for c in "añb".chars() {
            buf.insert( c );
        }
        buf.move_left();
        buf.backspace();
        assert_eq!( buf.content(), "ab" );
        assert_eq!( buf.cursor_char_pos(), 1 );
        buf.move_right();
        assert_eq!( buf.cursor_char_pos(), 2 );
    }
}
