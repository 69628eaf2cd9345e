//! Slash command parsing.
//!
//! Commands typed after a leading `/` in the UI's command line. Parsing only;
//! the UI decides how to execute them.

use std::path::PathBuf;
use std::str::FromStr;

use thiserror::Error;

use crate::playback::RepeatMode;


/// Errors that can occur during command parsing.
#[derive( Debug, Error )]
pub enum CommandError {
    #[error( "Unknown command: {0}" )]
    Unknown( String ),

    #[error( "Invalid argument: {0}" )]
    InvalidArgument( String ),

    #[error( "Missing argument: {0}" )]
    MissingArgument( String ),
}


/// Parsed slash command.
#[derive( Debug, Clone, PartialEq )]
pub enum Command {
    // Playlist commands
    Add { path: PathBuf },
    Remove,
    Clear,
    SelectAll,
    Shuffle,
    Repeat { mode: Option<RepeatMode> },
    Save { path: Option<PathBuf> },
    Load { path: Option<PathBuf> },

    // Playback commands
    Next,
    Prev,
    Stop,

    // UI commands
    Help,
    Quit,
}


impl FromStr for RepeatMode {
    type Err = CommandError;


    fn from_str( s: &str ) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "off" | "0" => Ok( RepeatMode::Off ),
            "one" | "1" => Ok( RepeatMode::One ),
            "all" | "2" => Ok( RepeatMode::All ),
            _ => Err( CommandError::InvalidArgument(
                format!( "Invalid repeat mode: '{}'. Use 'off', 'one', or 'all'", s )
            )),
        }
    }
}


impl Command {
    /// Parses a command string (without the leading `/`).
    ///
    /// @param input - The command string to parse
    ///
    /// @returns The parsed command or an error
    pub fn parse( input: &str ) -> Result<Self, CommandError> {
        let input = input.trim();
        let mut parts = input.splitn( 2, ' ' );
        let cmd = parts.next().unwrap_or( "" ).to_lowercase();
        let args = parts.next().map( |s| s.trim() ).filter( |s| !s.is_empty() );

        match cmd.as_str() {
            "add" | "a" => {
                let path = args
                    .ok_or_else( || CommandError::MissingArgument( "path".into() ) )?;
                Ok( Command::Add { path: PathBuf::from( path ) } )
            }
            "remove" | "rm" | "del" => Ok( Command::Remove ),
            "clear" | "cl" => Ok( Command::Clear ),
            "selectall" | "all" => Ok( Command::SelectAll ),
            "shuffle" | "sh" => Ok( Command::Shuffle ),
            "repeat" | "rep" => {
                let mode = args.map( |s| s.parse() ).transpose()?;
                Ok( Command::Repeat { mode } )
            }
            "save" | "w" => Ok( Command::Save { path: args.map( PathBuf::from ) } ),
            "load" | "o" => Ok( Command::Load { path: args.map( PathBuf::from ) } ),

            "next" | "n" => Ok( Command::Next ),
            "prev" | "previous" | "pr" => Ok( Command::Prev ),
            "stop" | "st" => Ok( Command::Stop ),

            "help" | "h" => Ok( Command::Help ),
            "quit" | "q" | "exit" => Ok( Command::Quit ),

            "" => Err( CommandError::Unknown( "empty command".into() ) ),
            other => Err( CommandError::Unknown( other.to_string() ) ),
        }
    }
}


/// Returns help text listing all available commands and keys.
pub fn help_text() -> &'static str {
    r#"Playlist Commands:
  /add <path>       Add file or folder at the cursor
  /remove           Remove selected tracks
  /clear            Clear playlist
  /selectall        Select every track
  /shuffle          Shuffle playlist order
  /repeat [mode]    Set repeat (off/one/all)
  /save [path]      Save playlist
  /load [path]      Load playlist

Playback Commands:
  /next /prev       Next or previous track
  /stop             Stop playback

Keys:
  Up/Down PgUp/PgDn Home/End   Move cursor (Shift extends)
  Ctrl+A            Select all
  Ctrl+Space        Toggle selection at cursor
  Delete            Remove selected tracks
  Enter             Play track at cursor
  Mouse drag        Move selected tracks
  /                 Command line
  ?                 This help
  q                 Quit"#
}


#[cfg( test )]
mod tests {
    use super::*;


    #[test]
    fn test_parse_add() {
        let cmd = Command::parse( "add /path/to/file.mp3" ).unwrap();
        assert_eq!( cmd, Command::Add { path: PathBuf::from( "/path/to/file.mp3" ) } );
    }


    #[test]
    fn test_parse_add_alias() {
        let cmd = Command::parse( "a /music" ).unwrap();
        assert_eq!( cmd, Command::Add { path: PathBuf::from( "/music" ) } );
    }


    #[test]
    fn test_parse_save_without_path() {
        assert_eq!( Command::parse( "save" ).unwrap(), Command::Save { path: None } );
        assert_eq!(
            Command::parse( "w  mix.m3u " ).unwrap(),
            Command::Save { path: Some( PathBuf::from( "mix.m3u" ) ) }
        );
    }


    #[test]
    fn test_parse_repeat_with_mode() {
        let cmd = Command::parse( "repeat all" ).unwrap();
        assert_eq!( cmd, Command::Repeat { mode: Some( RepeatMode::All ) } );
    }


    #[test]
    fn test_parse_repeat_toggle() {
        let cmd = Command::parse( "repeat" ).unwrap();
        assert_eq!( cmd, Command::Repeat { mode: None } );
    }


    #[test]
    fn test_parse_repeat_invalid() {
        let result = Command::parse( "repeat sometimes" );
        assert!( matches!( result, Err( CommandError::InvalidArgument( _ ) ) ) );
    }


    #[test]
    fn test_parse_unknown() {
        let result = Command::parse( "foobar" );
        assert!( matches!( result, Err( CommandError::Unknown( _ ) ) ) );
    }


    #[test]
    fn test_parse_missing_arg() {
        let result = Command::parse( "add" );
        assert!( matches!( result, Err( CommandError::MissingArgument( _ ) ) ) );
    }
}
