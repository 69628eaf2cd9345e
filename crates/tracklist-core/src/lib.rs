//! Tracklist Core - Playlist model and interaction
//!
//! This crate provides the observable playlist store, the controller that
//! turns pointer and keyboard input into store mutations, and the contracts
//! used by playback and persistence collaborators.
//!
//! Everything here is single-threaded: updates from other threads must be
//! marshalled onto the thread that owns the store.

pub mod command;
pub mod controller;
pub mod entry;
pub mod event;
pub mod keys;
pub mod playback;
pub mod store;

pub use command::{ Command, CommandError };
pub use controller::{ ControllerEvent, PlaylistController };
pub use entry::{ EntryId, NewEntry, TrackEntry, FIRST_ENTRY_ID };
pub use event::{ Attribute, Role, StoreEvent };
pub use keys::{ Binding, Key, Modifiers };
pub use playback::{ PlaybackNotice, RepeatMode };
pub use store::{ PlaylistStore, StoreError };
