//! Toolkit-independent keyboard model used by the controller.


/// Keys the playlist controller understands.
#[derive( Debug, Clone, Copy, PartialEq, Eq )]
pub enum Key {
    Up,
    Down,
    Home,
    End,
    PageUp,
    PageDown,
    Space,
    Delete,
    Enter,
    Char( char ),
}


impl Key {
    /// Returns true for keys that move the keyboard cursor.
    pub fn is_navigation( self ) -> bool {
        matches!( self, Key::Up | Key::Down | Key::Home | Key::End | Key::PageUp | Key::PageDown )
    }
}


/// Modifier keys held during an input event.
#[derive( Debug, Clone, Copy, PartialEq, Eq, Default )]
pub struct Modifiers {
    pub shift: bool,
    pub control: bool,
    pub alt: bool,
}


impl Modifiers {
    pub const NONE: Modifiers = Modifiers { shift: false, control: false, alt: false };
    pub const SHIFT: Modifiers = Modifiers { shift: true, control: false, alt: false };
    pub const CONTROL: Modifiers = Modifiers { shift: false, control: true, alt: false };


    /// Returns true if no modifier is held.
    pub fn is_empty( self ) -> bool {
        !( self.shift || self.control || self.alt )
    }
}


/// Standard list bindings resolved from a key press.
#[derive( Debug, Clone, Copy, PartialEq, Eq )]
pub enum Binding {
    SelectAll,
    Delete,
    ToggleFocused,
}


impl Binding {
    /// Resolves a key press to a standard binding, if it matches one.
    pub fn resolve( key: Key, modifiers: Modifiers ) -> Option<Binding> {
        match ( key, modifiers ) {
            ( Key::Char( 'a' ) | Key::Char( 'A' ), Modifiers { control: true, shift: false, alt: false } ) => {
                Some( Binding::SelectAll )
            }
            ( Key::Delete, m ) if m.is_empty() => Some( Binding::Delete ),
            ( Key::Space, Modifiers { control: true, shift: false, alt: false } ) => Some( Binding::ToggleFocused ),
            _ => None,
        }
    }
}


#[cfg( test )]
mod tests {
    use super::*;


    #[test]
    fn test_resolve_select_all() {
        assert_eq!( Binding::resolve( Key::Char( 'a' ), Modifiers::CONTROL ), Some( Binding::SelectAll ) );
        assert_eq!( Binding::resolve( Key::Char( 'a' ), Modifiers::NONE ), None );
    }


    #[test]
    fn test_resolve_delete_requires_no_modifier() {
        assert_eq!( Binding::resolve( Key::Delete, Modifiers::NONE ), Some( Binding::Delete ) );
        assert_eq!( Binding::resolve( Key::Delete, Modifiers::SHIFT ), None );
    }


    #[test]
    fn test_resolve_toggle() {
        assert_eq!( Binding::resolve( Key::Space, Modifiers::CONTROL ), Some( Binding::ToggleFocused ) );
        assert_eq!( Binding::resolve( Key::Space, Modifiers::NONE ), None );
    }
}
