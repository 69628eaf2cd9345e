//! Tracklist CLI - Terminal playlist manager

mod cli;
mod input;
mod library;
mod playlist_file;
mod settings;
mod view;

use std::fs::{ self, File, OpenOptions };
use std::io;
use std::path::{ Path, PathBuf };
use std::sync::mpsc::Receiver;
use std::sync::Mutex;
use std::time::{ Duration, Instant };

use anyhow::{ Context, Result };
use clap::Parser;
use crossterm::{
    event::{
        self, DisableBracketedPaste, DisableMouseCapture, EnableBracketedPaste, EnableMouseCapture,
        Event, KeyCode, KeyEventKind, KeyModifiers, MouseButton, MouseEventKind,
    },
    terminal::{ disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen },
    ExecutableCommand,
};
use ratatui::{
    prelude::*,
    widgets::{ Block, Borders, List, ListItem, Paragraph, Wrap },
};
use tracing_subscriber::EnvFilter;

use cli::Args;
use input::{ ClickTracker, InputBuffer, InputMode, PressState };
use settings::Settings;
use view::{ format_duration, ViewMode, Viewport };

use tracklist_core::{
    command,
    Command, ControllerEvent, Key, Modifiers, PlaybackNotice, PlaylistController, StoreEvent,
};


/// Application state.
struct App {
    controller: PlaylistController,
    store_events: Receiver<StoreEvent>,
    settings: Settings,
    playlist_path: Option<PathBuf>,
    should_quit: bool,
    needs_redraw: bool,

    // View state
    view_mode: ViewMode,
    viewport: Viewport,
    playlist_area: Option<Rect>,
    help_scroll: u16,

    // Input state
    input_mode: InputMode,
    input_buffer: InputBuffer,
    clicks: ClickTracker,
    press: Option<PressState>,

    // Status message (shown in status bar)
    status_message: Option<String>,
    status_clear_at: Option<Instant>,
}


impl App {
    /// Creates a new App instance.
    fn new( args: &Args, settings: Settings ) -> Self {
        let mut controller = PlaylistController::new();
        let store_events = controller.store_mut().subscribe();

        let playlist_path = args.playlist.clone().or_else( || {
            settings.restore_playlist.then( Settings::default_playlist_path ).flatten()
        });

        let mut app = Self {
            controller,
            store_events,
            clicks: ClickTracker::new( Duration::from_millis( settings.double_click_ms ) ),
            settings,
            playlist_path,
            should_quit: false,
            needs_redraw: true,
            view_mode: ViewMode::Playlist,
            viewport: Viewport::default(),
            playlist_area: None,
            help_scroll: 0,
            input_mode: InputMode::Normal,
            input_buffer: InputBuffer::new(),
            press: None,
            status_message: None,
            status_clear_at: None,
        };

        if let Some( path ) = app.playlist_path.clone().filter( |p| p.exists() ) {
            if !app.load_playlist( path ) {
                // Leave the unreadable file untouched on quit
                app.playlist_path = None;
            }
        }

        if !args.files.is_empty() {
            let entries = library::expand_paths( &args.files );
            let count = app.controller.store().count();
            app.controller.drop_entries( entries, count );
        }

        app
    }


    fn set_status( &mut self, msg: impl Into<String> ) {
        self.status_message = Some( msg.into() );
        self.status_clear_at = Some( Instant::now() + Duration::from_secs( 3 ) );
        self.needs_redraw = true;
    }


    /// Drains store notifications and expires the status message.
    fn tick( &mut self ) {
        let count = self.controller.store().count();
        for event in self.store_events.try_iter() {
            tracing::trace!( "Store event: {:?}", event );
            match event {
                StoreEvent::RowsRemoved { .. } | StoreEvent::LayoutChanged => self.viewport.clamp( count ),
                StoreEvent::RowsChanged { ref roles, first, .. }
                    if self.settings.scroll_to_current && roles.contains( &tracklist_core::Role::Current ) =>
                {
                    if self.controller.store().current_row() == Some( first ) {
                        self.viewport.ensure_visible( first );
                    }
                }
                _ => {}
            }
            self.needs_redraw = true;
        }

        if self.status_clear_at.is_some_and( |t| Instant::now() >= t ) {
            self.status_message = None;
            self.status_clear_at = None;
            self.needs_redraw = true;
        }
    }


    /// Handles a key event.
    fn handle_key( &mut self, code: KeyCode, mods: KeyModifiers ) {
        self.needs_redraw = true;
        match self.input_mode {
            InputMode::Normal => self.handle_normal_key( code, mods ),
            InputMode::Command => self.handle_command_key( code ),
        }
    }


    fn handle_normal_key( &mut self, code: KeyCode, mods: KeyModifiers ) {
        if self.view_mode == ViewMode::Help {
            match code {
                KeyCode::Char( 'q' ) | KeyCode::Esc | KeyCode::Char( '?' ) => self.view_mode = ViewMode::Playlist,
                KeyCode::Up => self.help_scroll = self.help_scroll.saturating_sub( 1 ),
                KeyCode::Down => self.help_scroll = self.help_scroll.saturating_add( 1 ),
                _ => {}
            }
            return;
        }

        let modifiers = input::modifiers( mods );
        let plain = !modifiers.control && !modifiers.alt;

        // App keys; everything else goes to the playlist controller
        match code {
            KeyCode::Char( '/' ) if plain => {
                self.input_mode = InputMode::Command;
                self.input_buffer.clear();
            }
            KeyCode::Char( '?' ) if plain => self.view_mode = ViewMode::Help,
            KeyCode::Char( 'q' ) if plain => self.should_quit = true,
            KeyCode::Char( 'n' ) if plain => self.play_next(),
            KeyCode::Char( 'p' ) if plain => self.play_previous(),
            KeyCode::Char( 's' ) if plain => self.shuffle(),
            KeyCode::Char( 'r' ) if plain => self.set_repeat( self.settings.repeat.cycle() ),
            KeyCode::Enter => {
                let activated = self.controller.activate_focused();
                self.activate( activated );
            }
            KeyCode::Esc => {}
            _ => {
                if let Some( key ) = input::key( code ) {
                    self.controller.key_press( key, modifiers );
                    self.reveal_focus();
                }
            }
        }
    }


    fn handle_command_key( &mut self, code: KeyCode ) {
        match code {
            KeyCode::Enter => {
                let input = self.input_buffer.content().to_string();
                self.input_mode = InputMode::Normal;
                self.input_buffer.clear();
                self.execute_command( &input );
            }
            KeyCode::Esc => {
                self.input_mode = InputMode::Normal;
                self.input_buffer.clear();
            }
            KeyCode::Backspace => self.input_buffer.backspace(),
            KeyCode::Left => self.input_buffer.move_left(),
            KeyCode::Right => self.input_buffer.move_right(),
            KeyCode::Char( c ) => self.input_buffer.insert( c ),
            _ => {}
        }
    }


    /// Handles mouse events.
    fn handle_mouse( &mut self, column: u16, row: u16, kind: MouseEventKind, mods: KeyModifiers ) {
        if self.view_mode != ViewMode::Playlist || self.input_mode != InputMode::Normal {
            return;
        }

        let modifiers = input::modifiers( mods );
        let target = self.row_at( column, row );

        match kind {
            MouseEventKind::Down( MouseButton::Left ) => {
                let Some( target ) = target else {
                    return;
                };
                self.controller.pointer_down( target, modifiers );
                self.press = Some( PressState { row: target, dragged: false } );

                if self.clicks.click( target, Instant::now() ) {
                    let activated = self.controller.double_click( Some( target ) );
                    self.activate( activated );
                }
            }
            MouseEventKind::Drag( MouseButton::Left ) => {
                if let Some( press ) = self.press.as_mut() {
                    press.dragged = true;
                }
                self.hover( target );
            }
            MouseEventKind::Up( MouseButton::Left ) => {
                let Some( press ) = self.press.take() else {
                    return;
                };
                if press.dragged && target != Some( press.row ) {
                    self.drop_selection( press.row, target );
                } else if let Some( target ) = target {
                    self.controller.pointer_up( target, modifiers );
                }
            }
            MouseEventKind::Moved => self.hover( target ),
            MouseEventKind::ScrollUp => {
                self.viewport.offset = self.viewport.offset.saturating_sub( 3 );
                self.needs_redraw = true;
            }
            MouseEventKind::ScrollDown => {
                self.viewport.offset += 3;
                self.viewport.clamp( self.controller.store().count() );
                self.needs_redraw = true;
            }
            _ => {}
        }
    }


    /// Finishes a drag started on `from`. Dropping below the last row moves
    /// the selection to the end.
    fn drop_selection( &mut self, from: usize, target: Option<usize> ) {
        let destination = input::drop_destination( from, target, self.controller.store().count() );
        tracing::debug!( "Drag from row {} dropped before row {}", from, destination );
        self.controller.move_selected( destination );
    }


    fn hover( &mut self, target: Option<usize> ) {
        let hovered = self.controller.store().hovered_row();
        if hovered == target {
            return;
        }
        if let Some( old ) = hovered {
            self.controller.pointer_exit( old );
        }
        if let Some( new ) = target {
            self.controller.pointer_enter( new );
        }
    }


    /// Handles pasted text, which terminals produce for dragged-in files.
    fn handle_paste( &mut self, text: &str ) {
        let paths = library::parse_pasted_paths( text );
        self.add_paths( &paths );
    }


    fn add_paths( &mut self, paths: &[PathBuf] ) {
        let entries = library::expand_paths( paths );
        if entries.is_empty() {
            self.set_status( "No audio files found" );
            return;
        }

        let store = self.controller.store();
        let at = store.focused_row().unwrap_or( store.count() );
        let added = self.controller.drop_entries( entries, at ).len();
        self.set_status( format!( "Added {} tracks", added ) );
    }


    fn row_at( &self, column: u16, row: u16 ) -> Option<usize> {
        let area = self.playlist_area?;
        let inside = column > area.x && column < area.x + area.width.saturating_sub( 1 )
            && row > area.y && row < area.y + area.height.saturating_sub( 1 );
        if !inside {
            return None;
        }
        self.viewport.row_at( ( row - area.y - 1 ) as usize, self.controller.store().count() )
    }


    fn reveal_focus( &mut self ) {
        if let Some( row ) = self.controller.store().focused_row() {
            self.viewport.ensure_visible( row );
        }
    }


    /// Acts as the playback source: an activated row becomes current.
    fn activate( &mut self, event: Option<ControllerEvent> ) {
        let Some( ControllerEvent::RowActivated { id, .. } ) = event else {
            return;
        };

        let store = self.controller.store_mut();
        if store.apply_playback( PlaybackNotice::Started( id ) ) {
            let title = store.current_entry().map( |e| e.display_text.clone() ).unwrap_or_default();
            tracing::info!( "Playing {}: {}", id, title );
            self.set_status( format!( "Playing: {}", title ) );
        }
    }


    fn play_next( &mut self ) {
        let store = self.controller.store();
        let next = store.next_row( self.settings.repeat ).and_then( |r| store.get( r ).ok() ).map( |e| e.id() );
        self.play_id( next );
    }


    fn play_previous( &mut self ) {
        let store = self.controller.store();
        let prev = store.previous_row( self.settings.repeat ).and_then( |r| store.get( r ).ok() ).map( |e| e.id() );
        self.play_id( prev );
    }


    fn play_id( &mut self, id: Option<tracklist_core::EntryId> ) {
        match id {
            Some( id ) => {
                let row = self.controller.store().row_of( id );
                self.activate( row.map( |row| ControllerEvent::RowActivated { row, id } ) );
            }
            None => {
                self.controller.store_mut().apply_playback( PlaybackNotice::Stopped );
                self.set_status( "End of playlist" );
            }
        }
    }


    fn shuffle( &mut self ) {
        self.controller.store_mut().shuffle();
        self.set_status( "Playlist shuffled" );
    }


    fn set_repeat( &mut self, mode: tracklist_core::RepeatMode ) {
        self.settings.repeat = mode;
        self.set_status( format!( "Repeat: {}", mode.name() ) );
    }


    fn execute_command( &mut self, input: &str ) {
        let result = Command::parse( input )
            .map_err( anyhow::Error::from )
            .and_then( |cmd| self.run_command( cmd ) );

        if let Err( e ) = result {
            tracing::warn!( "Command '{}' failed: {:#}", input, e );
            self.set_status( format!( "Error: {:#}", e ) );
        }
    }


    fn run_command( &mut self, cmd: Command ) -> Result<()> {
        match cmd {
            Command::Add { path } => self.add_paths( &[ path ] ),
            Command::Remove => self.controller.key_press( Key::Delete, Modifiers::NONE ),
            Command::Clear => {
                self.controller.store_mut().remove_all();
                self.set_status( "Playlist cleared" );
            }
            Command::SelectAll => self.controller.key_press( Key::Char( 'a' ), Modifiers::CONTROL ),
            Command::Shuffle => self.shuffle(),
            Command::Repeat { mode } => {
                let mode = mode.unwrap_or_else( || self.settings.repeat.cycle() );
                self.set_repeat( mode );
            }
            Command::Save { path } => {
                let path = self.resolve_playlist_path( path )?;
                playlist_file::save( &path, &self.controller.store().export() )?;
                self.set_status( format!( "Saved {}", path.display() ) );
            }
            Command::Load { path } => {
                let path = self.resolve_playlist_path( path )?;
                self.load_playlist( path );
            }
            Command::Next => self.play_next(),
            Command::Prev => self.play_previous(),
            Command::Stop => {
                self.controller.store_mut().apply_playback( PlaybackNotice::Stopped );
            }
            Command::Help => self.view_mode = ViewMode::Help,
            Command::Quit => self.should_quit = true,
        }
        Ok(())
    }


    fn resolve_playlist_path( &self, path: Option<PathBuf> ) -> Result<PathBuf> {
        path.or_else( || self.playlist_path.clone() )
            .ok_or_else( || anyhow::anyhow!( "no playlist file given" ) )
    }


    /// Replaces the playlist with the contents of `path`.
    ///
    /// @returns false if the file could not be read; the playlist is unchanged
    fn load_playlist( &mut self, path: PathBuf ) -> bool {
        match playlist_file::load( &path ) {
            Ok( entries ) => {
                let loaded = self.controller.store_mut().replace_all( entries ).len();
                self.viewport.offset = 0;
                self.set_status( format!( "Loaded {} tracks", loaded ) );
                true
            }
            Err( e ) => {
                tracing::warn!( "Failed to load playlist {:?}: {:#}", path, e );
                self.set_status( format!( "Load failed: {:#}", e ) );
                false
            }
        }
    }


    /// Saves the playlist and settings before exit.
    fn save_session( &self ) {
        if let Some( path ) = &self.playlist_path {
            if let Err( e ) = playlist_file::save( path, &self.controller.store().export() ) {
                tracing::warn!( "Failed to save playlist {:?}: {:#}", path, e );
            }
        }
        self.settings.save();
    }
}


/// Opens the log file for appending, creating its directory first.
fn open_log_file( path: &Path ) -> Result<File> {
    if let Some( parent ) = path.parent() {
        fs::create_dir_all( parent )
            .with_context( || format!( "creating {}", parent.display() ) )?;
    }
    let file = OpenOptions::new().create( true ).append( true ).open( path )
        .with_context( || format!( "opening {}", path.display() ) )?;
    Ok( file )
}


/// Installs the file logger. Logging is skipped if the file cannot be opened.
fn init_logging( path: Option<PathBuf> ) {
    let Some( path ) = path.or_else( Settings::default_log_path ) else {
        return;
    };

    let file = match open_log_file( &path ) {
        Ok( f ) => f,
        Err( e ) => {
            eprintln!( "tracklist: cannot open log file {}: {:#}", path.display(), e );
            return;
        }
    };

    let filter = EnvFilter::try_from_env( "TRACKLIST_LOG" ).unwrap_or_else( |_| EnvFilter::new( "info" ) );
    tracing_subscriber::fmt()
        .with_env_filter( filter )
        .with_writer( Mutex::new( file ) )
        .with_ansi( false )
        .init();
}


fn main() -> Result<()> {
    let args = Args::parse();
    init_logging( args.log_file.clone() );

    let settings = Settings::load();
    let mut app = App::new( &args, settings );
    tracing::info!( "Started with {} tracks", app.controller.store().count() );

    // Setup terminal
    enable_raw_mode()?;
    io::stdout().execute( EnterAlternateScreen )?;
    io::stdout().execute( EnableMouseCapture )?;
    io::stdout().execute( EnableBracketedPaste )?;

    let result = run( &mut app );

    // Cleanup
    io::stdout().execute( DisableBracketedPaste )?;
    io::stdout().execute( DisableMouseCapture )?;
    disable_raw_mode()?;
    io::stdout().execute( LeaveAlternateScreen )?;

    app.save_session();
    result
}


/// Main loop.
fn run( app: &mut App ) -> Result<()> {
    let mut terminal = Terminal::new( CrosstermBackend::new( io::stdout() ) )?;

    loop {
        app.tick();

        if app.needs_redraw {
            terminal.draw( |frame| draw_ui( frame, app ) )?;
            app.needs_redraw = false;
        }

        if event::poll( Duration::from_millis( 100 ) )? {
            match event::read()? {
                Event::Key( key ) if key.kind == KeyEventKind::Press => {
                    app.handle_key( key.code, key.modifiers );
                }
                Event::Mouse( mouse ) => {
                    app.handle_mouse( mouse.column, mouse.row, mouse.kind, mouse.modifiers );
                }
                Event::Paste( text ) => app.handle_paste( &text ),
                Event::Resize( _, _ ) => app.needs_redraw = true,
                _ => {}
            }
        }

        if app.should_quit {
            tracing::info!( "Quitting" );
            return Ok(());
        }
    }
}


/// Draws the main UI.
fn draw_ui( frame: &mut Frame, app: &mut App ) {
    let chunks = Layout::default()
        .direction( Direction::Vertical )
        .constraints([
            Constraint::Length( 1 ),  // Header
            Constraint::Min( 3 ),     // Playlist
            Constraint::Length( 1 ),  // Status / command line
        ])
        .split( frame.area() );

    draw_header( frame, app, chunks[ 0 ] );
    match app.view_mode {
        ViewMode::Playlist => draw_playlist( frame, app, chunks[ 1 ] ),
        ViewMode::Help => draw_help( frame, app, chunks[ 1 ] ),
    }
    draw_status( frame, app, chunks[ 2 ] );
}


fn draw_header( frame: &mut Frame, app: &App, area: Rect ) {
    let now_playing = app.controller.store().current_entry()
        .map( |e| format!( "▶ {}", e.display_text ) )
        .unwrap_or_else( || "■ Stopped".to_string() );
    let line = Line::from( vec![
        Span::styled( " tracklist ", Style::default().fg( Color::Black ).bg( Color::Cyan ) ),
        Span::raw( format!( " {}  [repeat: {}]", now_playing, app.settings.repeat.name() ) ),
    ]);
    frame.render_widget( Paragraph::new( line ), area );
}


fn draw_playlist( frame: &mut Frame, app: &mut App, area: Rect ) {
    app.playlist_area = Some( area );
    app.viewport.height = area.height.saturating_sub( 2 ) as usize;
    app.controller.set_rows_per_page( app.viewport.height );

    let store = app.controller.store();
    let current = store.current_row();
    let focused = store.focused_row();
    let hovered = store.hovered_row();
    let width = area.width.saturating_sub( 2 ) as usize;

    let items: Vec<ListItem> = store.entries()
        .iter()
        .enumerate()
        .skip( app.viewport.offset )
        .take( app.viewport.height )
        .map( |( row, entry )| {
            let marker = if Some( row ) == current { "▶" } else { " " };
            let cursor = if Some( row ) == focused { ">" } else { " " };
            let duration = format_duration( entry.duration_seconds );
            let label = format!( "{}{}{:>4}. {}", cursor, marker, row + 1, entry.display_text );
            let padding = width.saturating_sub( label.chars().count() + duration.len() ).max( 1 );

            let mut style = Style::default();
            if entry.is_failed {
                style = style.fg( Color::Red ).add_modifier( Modifier::CROSSED_OUT );
            } else if Some( row ) == current {
                style = style.fg( Color::Green ).add_modifier( Modifier::BOLD );
            }
            if entry.is_selected {
                style = style.bg( Color::DarkGray );
            }
            if Some( row ) == hovered {
                style = style.add_modifier( Modifier::UNDERLINED );
            }

            ListItem::new( format!( "{}{}{}", label, " ".repeat( padding ), duration ) ).style( style )
        })
        .collect();

    let title = format!( " Playlist ({}) ", store.count() );
    let list = List::new( items ).block( Block::default().borders( Borders::ALL ).title( title ) );
    frame.render_widget( list, area );
}


fn draw_help( frame: &mut Frame, app: &App, area: Rect ) {
    let help = Paragraph::new( command::help_text() )
        .block( Block::default().borders( Borders::ALL ).title( " Help " ) )
        .wrap( Wrap { trim: false } )
        .scroll(( app.help_scroll, 0 ));
    frame.render_widget( help, area );
}


fn draw_status( frame: &mut Frame, app: &App, area: Rect ) {
    if app.input_mode == InputMode::Command {
        frame.render_widget( Paragraph::new( format!( "/{}", app.input_buffer.content() ) ), area );
        let x = area.x + 1 + app.input_buffer.cursor_char_pos() as u16;
        frame.set_cursor_position(( x.min( area.x + area.width.saturating_sub( 1 ) ), area.y ));
        return;
    }

    let store = app.controller.store();
    let text = app.status_message.clone().unwrap_or_else( || {
        format!(
            "{} tracks, {} selected  |  ? help  / command  q quit",
            store.count(),
            store.selected_rows().len()
        )
    });
    frame.render_widget( Paragraph::new( text ).style( Style::default().fg( Color::Gray ) ), area );
}


#[cfg( test )]
mod tests {
    use super::*;


    fn args_with_playlist( path: PathBuf ) -> Args {
        Args { playlist: Some( path ), log_file: None, files: Vec::new() }
    }


    #[test]
    fn test_log_file_creates_missing_directories() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join( "logs" ).join( "tracklist.log" );
        assert!( open_log_file( &path ).is_ok() );
        assert!( path.exists() );
    }


    #[test]
    fn test_log_file_reports_directory_failure() {
        let dir = tempfile::tempdir().unwrap();
        let blocker = dir.path().join( "not-a-dir" );
        fs::write( &blocker, b"" ).unwrap();

        let err = open_log_file( &blocker.join( "tracklist.log" ) ).unwrap_err();
        assert!( format!( "{:#}", err ).contains( "creating" ) );
    }


    #[test]
    fn test_unreadable_playlist_is_not_saved_over() {
        let dir = tempfile::tempdir().unwrap();
        // A directory exists but cannot be read as a playlist
        let app = App::new( &args_with_playlist( dir.path().to_path_buf() ), Settings::default() );

        assert!( app.playlist_path.is_none() );
        assert!( app.controller.store().is_empty() );
    }


    #[test]
    fn test_readable_playlist_keeps_its_path() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join( "mix.m3u" );
        fs::write( &path, "#EXTM3U\n/music/a.mp3\n" ).unwrap();

        let app = App::new( &args_with_playlist( path.clone() ), Settings::default() );

        assert_eq!( app.playlist_path, Some( path ) );
        assert_eq!( app.controller.store().count(), 1 );
    }
}
