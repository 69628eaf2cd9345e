//! View state for the TUI.
//!
//! Defines the available views and the scrolling and formatting helpers used
//! to render playlist rows.


/// Current view mode of the application.
#[derive( Debug, Clone, Copy, PartialEq, Eq, Default )]
pub enum ViewMode {
    /// Playlist view - main view showing the playlist.
    #[default]
    Playlist,

    /// Help overlay - shows available commands.
    Help,
}


/// Scroll state of the playlist list.
#[derive( Debug, Clone, Copy, PartialEq, Eq, Default )]
pub struct Viewport {
    /// First visible row.
    pub offset: usize,

    /// Number of visible rows.
    pub height: usize,
}


impl Viewport {
    /// Scrolls the minimum amount needed to show `row`.
    pub fn ensure_visible( &mut self, row: usize ) {
        if self.height == 0 {
            return;
        }
        if row < self.offset {
            self.offset = row;
        } else if row >= self.offset + self.height {
            self.offset = row + 1 - self.height;
        }
    }


    /// Keeps the offset valid after the list shrank.
    pub fn clamp( &mut self, count: usize ) {
        let max_offset = count.saturating_sub( self.height );
        self.offset = self.offset.min( max_offset );
    }


    /// Maps a screen line within the list to a row, if one is drawn there.
    pub fn row_at( &self, line: usize, count: usize ) -> Option<usize> {
        let row = self.offset + line;
        ( line < self.height && row < count ).then_some( row )
    }
}


/// Formats seconds as `m:ss`, or `h:mm:ss` for long tracks. Zero means unknown.
pub fn format_duration( seconds: u32 ) -> String {
    if seconds == 0 {
        return "--:--".to_string();
    }

    let ( h, m, s ) = ( seconds / 3600, ( seconds / 60 ) % 60, seconds % 60 );
    if h > 0 {
        format!( "{}:{:02}:{:02}", h, m, s )
    } else {
        format!( "{}:{:02}", m, s )
    }
}


#[cfg( test )]
mod tests {
    use super::*;


    #[test]
    fn test_format_duration() {
        assert_eq!( format_duration( 0 ), "--:--" );
        assert_eq!( format_duration( 65 ), "1:05" );
        assert_eq!( format_duration( 3725 ), "1:02:05" );
    }


    #[test]
    fn test_ensure_visible_scrolls_both_ways() {
        let mut vp = Viewport { offset: 0, height: 5 };
        vp.ensure_visible( 7 );
        assert_eq!( vp.offset, 3 );
        vp.ensure_visible( 1 );
        assert_eq!( vp.offset, 1 );
    }


    #[test]
    fn test_row_at() {
        let vp = Viewport { offset: 2, height: 4 };
        assert_eq!( vp.row_at( 0, 10 ), Some( 2 ) );
        assert_eq!( vp.row_at( 3, 4 ), None );
        assert_eq!( vp.row_at( 4, 10 ), None );
    }
}
