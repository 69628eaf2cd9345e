//! Attributes and change notifications.
//!
//! Observers subscribe to a store and receive [`StoreEvent`]s describing the
//! smallest row range touched by each mutation, so a view can redraw
//! incrementally.

use std::path::PathBuf;


/// Per-row attribute kinds.
#[derive( Debug, Clone, Copy, PartialEq, Eq, Hash )]
pub enum Role {
    Text,
    TrackInfoFormatId,
    FilePath,
    Duration,
    LastPosition,
    PlaybackCount,
    Failed,
    Selected,
    Current,
    Focused,
    Hovered,
}


/// A single attribute value, tagged with its role.
#[derive( Debug, Clone, PartialEq )]
pub enum Attribute {
    Text( String ),
    TrackInfoFormatId( u32 ),
    FilePath( PathBuf ),
    Duration( u32 ),
    LastPosition( f64 ),
    PlaybackCount( u32 ),
    Failed( bool ),
    Selected( bool ),
    Current( bool ),
    Focused( bool ),
    Hovered( bool ),
}


impl Attribute {
    /// Returns the role this value applies to.
    pub fn role( &self ) -> Role {
        match self {
            Attribute::Text( _ ) => Role::Text,
            Attribute::TrackInfoFormatId( _ ) => Role::TrackInfoFormatId,
            Attribute::FilePath( _ ) => Role::FilePath,
            Attribute::Duration( _ ) => Role::Duration,
            Attribute::LastPosition( _ ) => Role::LastPosition,
            Attribute::PlaybackCount( _ ) => Role::PlaybackCount,
            Attribute::Failed( _ ) => Role::Failed,
            Attribute::Selected( _ ) => Role::Selected,
            Attribute::Current( _ ) => Role::Current,
            Attribute::Focused( _ ) => Role::Focused,
            Attribute::Hovered( _ ) => Role::Hovered,
        }
    }


    /// Returns the flag carried by a singleton attribute.
    pub( crate ) fn singleton_flag( &self ) -> Option<bool> {
        match self {
            Attribute::Current( v ) | Attribute::Focused( v ) | Attribute::Hovered( v ) => Some( *v ),
            _ => None,
        }
    }
}


/// Change notification emitted by a store.
///
/// Row ranges are inclusive.
#[derive( Debug, Clone, PartialEq )]
pub enum StoreEvent {
    /// Attributes changed on rows `first..=last`.
    RowsChanged { first: usize, last: usize, roles: Vec<Role> },

    /// Rows `first..=last` were inserted.
    RowsInserted { first: usize, last: usize },

    /// Rows `first..=last` were removed.
    RowsRemoved { first: usize, last: usize },

    /// Rows `first..=last` moved to land before `destination`
    /// (in pre-move row numbers).
    RowsMoved { first: usize, last: usize, destination: usize },

    /// The whole order changed; observers should re-read every row.
    LayoutChanged,
}


impl StoreEvent {
    pub( crate ) fn changed( first: usize, last: usize, role: Role ) -> Self {
        StoreEvent::RowsChanged { first, last, roles: vec![ role ] }
    }
}
