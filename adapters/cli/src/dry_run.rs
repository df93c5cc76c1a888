//! Input and protocol adapters that describe commands instead of sending them.

use std::{cell::RefCell, rc::Rc, time::Duration};

use waypoint_core::{
    InputDispatcher, KeyBinding, MouseButton, Position, ProtocolError, ProtocolSender,
    ScreenPoint, SkillId,
};

/// Ordered log of everything the adapters were asked to do.
pub(crate) type Transcript = Rc<RefCell<Vec<String>>>;

/// Dispatcher that records input instead of driving a device. Settle
/// delays are recorded, not slept.
#[derive(Debug)]
pub(crate) struct DryRunDispatcher {
    transcript: Transcript,
}

impl DryRunDispatcher {
    pub(crate) fn new(transcript: Transcript) -> Self {
        Self { transcript }
    }

    fn record(&self, line: String) {
        self.transcript.borrow_mut().push(line);
    }
}

impl InputDispatcher for DryRunDispatcher {
    fn move_pointer(&mut self, point: ScreenPoint) {
        self.record(format!("move pointer to ({}, {})", point.x, point.y));
    }

    fn click(&mut self, button: MouseButton, point: ScreenPoint) {
        self.record(format!("{button:?} click at ({}, {})", point.x, point.y));
    }

    fn press_key_binding(&mut self, binding: KeyBinding) {
        let [key, modifier] = binding.effective();
        self.record(format!("press key {key} (modifier {modifier})"));
    }

    fn settle(&mut self, delay: Duration) {
        self.record(format!("wait {} ms", delay.as_millis()));
    }
}

/// Protocol sender that either accepts or rejects every command.
#[derive(Debug)]
pub(crate) struct DryRunSender {
    transcript: Transcript,
    reject: bool,
}

impl DryRunSender {
    pub(crate) fn new(transcript: Transcript, reject: bool) -> Self {
        Self { transcript, reject }
    }

    fn answer(&self, command: &'static str, line: String) -> Result<(), ProtocolError> {
        self.transcript.borrow_mut().push(line);
        if self.reject {
            Err(ProtocolError::Rejected {
                command,
                reason: "dry run configured to reject".to_owned(),
            })
        } else {
            Ok(())
        }
    }
}

impl ProtocolSender for DryRunSender {
    fn teleport(&mut self, position: Position) -> Result<(), ProtocolError> {
        self.answer(
            "teleport",
            format!("protocol teleport to ({}, {})", position.x(), position.y()),
        )
    }

    fn select_skill(&mut self, skill: SkillId) -> Result<(), ProtocolError> {
        self.answer("select skill", format!("protocol select skill {}", skill.get()))
    }
}
