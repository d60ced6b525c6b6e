use winit::keyboard::KeyCode;

/// No-argument commands the host can issue. Keyboard and the debug overlay
/// both produce these.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    TogglePause,
    Reset,
    ToggleDebug,
    Quit,
}

/// Key bindings, also shown in the debug overlay.
pub const KEY_HELP: &str = "Space/P: Pause | R: Reset | F12: Debug | ESC: Quit";

/// Map a pressed key to a command.
pub fn command_for_key(code: KeyCode) -> Option<Command> {
    match code {
        KeyCode::Space | KeyCode::KeyP => Some(Command::TogglePause),
        KeyCode::KeyR => Some(Command::Reset),
        KeyCode::F12 => Some(Command::ToggleDebug),
        KeyCode::Escape => Some(Command::Quit),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bindings() {
        assert_eq!(command_for_key(KeyCode::Space), Some(Command::TogglePause));
        assert_eq!(command_for_key(KeyCode::KeyP), Some(Command::TogglePause));
        assert_eq!(command_for_key(KeyCode::KeyR), Some(Command::Reset));
        assert_eq!(command_for_key(KeyCode::F12), Some(Command::ToggleDebug));
        assert_eq!(command_for_key(KeyCode::Escape), Some(Command::Quit));
        assert_eq!(command_for_key(KeyCode::KeyQ), None);
        assert_eq!(command_for_key(KeyCode::Enter), None);
    }
}
