//! The action protocol dispatched by the poll engine.
//!
//! Actions are evaluated positionally within a pair's action list. Most are
//! non-terminating; only `Return` (or an empty action list) ends a poll.

use std::fmt;

/// A side-effecting procedure bound with its arguments, carried by
/// [`Action::Call`].
pub struct Callback(Box<dyn FnMut()>);

impl Callback {
    pub fn new<F: FnMut() + 'static>(f: F) -> Self {
        Self(Box::new(f))
    }

    pub fn invoke(&mut self) {
        (self.0)()
    }
}

impl fmt::Debug for Callback {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Callback")
    }
}

/// One step of a check pair's action list.
///
/// The enum is non-exhaustive on purpose: dispatch sites must carry a
/// wildcard arm, and a variant added later is logged and skipped there
/// instead of breaking every dispatch site at once.
#[derive(Debug)]
#[non_exhaustive]
pub enum Action {
    /// Explicit no-op; continues with the next action.
    Continue,
    /// Click the first match's representative point, then continue.
    ClickIt,
    /// Remove this pair from the active poll set, then continue.
    RemoveMe,
    /// Invoke the bound procedure, then continue.
    Call(Callback),
    /// Terminate the poll with this pair's matches and payload.
    Return,
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;
    use std::rc::Rc;

    #[test]
    fn test_callback_invokes_bound_closure() {
        let count = Rc::new(Cell::new(0));
        let handle = Rc::clone(&count);
        let mut cb = Callback::new(move || handle.set(handle.get() + 1));

        cb.invoke();
        cb.invoke();
        assert_eq!(count.get(), 2);
    }

    #[test]
    fn test_action_debug_elides_closure() {
        let action = Action::Call(Callback::new(|| {}));
        assert_eq!(format!("{action:?}"), "Call(Callback)");
    }
}
