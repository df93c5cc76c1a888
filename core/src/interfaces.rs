//! Seams toward the device input layer and the optional protocol sender.

use std::time::Duration;

use thiserror::Error;

use crate::{KeyBinding, MouseButton, Position, ScreenPoint, SkillId};

/// Simulated device input aimed at the game window.
///
/// Calls are fire-and-forget. Implementations embed their own short
/// randomized press/release delays.
pub trait InputDispatcher {
    /// Moves the pointer to the screen coordinate.
    fn move_pointer(&mut self, point: ScreenPoint);

    /// Moves the pointer to the screen coordinate and clicks the button.
    fn click(&mut self, button: MouseButton, point: ScreenPoint);

    /// Presses and releases the key (and modifier) of the binding.
    fn press_key_binding(&mut self, binding: KeyBinding);

    /// Blocks the calling thread so the game can settle before the next read.
    fn settle(&mut self, delay: Duration) {
        std::thread::sleep(delay);
    }
}

/// Errors reported by a [`ProtocolSender`].
#[derive(Debug, Error)]
pub enum ProtocolError {
    /// The sender has no live connection to the game client.
    #[error("protocol sender is not connected")]
    Disconnected,
    /// The game client refused the command.
    #[error("{command} command was rejected: {reason}")]
    Rejected {
        /// Name of the refused command.
        command: &'static str,
        /// Reason supplied by the client.
        reason: String,
    },
}

/// Low-level command channel that bypasses simulated input.
pub trait ProtocolSender {
    /// Teleports the player to the world position.
    fn teleport(&mut self, position: Position) -> Result<(), ProtocolError>;

    /// Binds the skill to the right mouse button.
    fn select_skill(&mut self, skill: SkillId) -> Result<(), ProtocolError>;
}
