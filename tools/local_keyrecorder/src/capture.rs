//! Capture pipeline: binds to the input surface and fans records out to the
//! log store and the console.

use std::cell::{Cell, RefCell};
use std::fmt::Display;
use std::io::{self, Write};
use std::rc::Rc;

use crate::error::LogStoreError;
use crate::log_store::LogStore;
use crate::record::{session_start_line, Clock, KeyEvent, KeyRecord, SystemClock};

/// Callback the host surface invokes once per key press.
pub type KeyHandler = Box<dyn FnMut(KeyEvent)>;

/// A visible text-entry region that can report its own key presses.
pub trait KeySurface {
    /// Registers the single handler for key presses on this surface.
    fn on_key_event(&mut self, handler: KeyHandler);
}

/// Stdout echo plus the stderr error channel.
pub struct Console {
    out: Box<dyn Write>,
    err: Box<dyn Write>,
}

impl Console {
    pub fn new(out: impl Write + 'static, err: impl Write + 'static) -> Self {
        Self {
            out: Box::new(out),
            err: Box::new(err),
        }
    }

    pub fn stdio() -> Self {
        Self::new(io::stdout(), io::stderr())
    }

    /// Writes `text` as-is and flushes so the echo is never delayed.
    pub fn echo(&mut self, text: &str) {
        let result = self
            .out
            .write_all(text.as_bytes())
            .and_then(|_| self.out.flush());
        if let Err(err) = result {
            self.report("Console echo failed", err);
        }
    }

    pub fn report(&mut self, what: &str, err: impl Display) {
        let _ = writeln!(self.err, "{what}: {err}");
        let _ = self.err.flush();
    }
}

/// Owns the recording flag and turns key events into log lines.
///
/// Single-threaded: shared with the surface through `Rc`, state behind
/// `Cell`/`RefCell`.
pub struct CapturePipeline {
    store: LogStore,
    console: RefCell<Console>,
    clock: Box<dyn Clock>,
    recording: Cell<bool>,
}

impl CapturePipeline {
    pub fn new(store: LogStore, console: Console) -> Self {
        Self::with_clock(store, console, SystemClock)
    }

    pub fn with_clock(store: LogStore, console: Console, clock: impl Clock + 'static) -> Self {
        Self {
            store,
            console: RefCell::new(console),
            clock: Box::new(clock),
            recording: Cell::new(false),
        }
    }

    pub fn store(&self) -> &LogStore {
        &self.store
    }

    pub fn is_recording(&self) -> bool {
        self.recording.get()
    }

    /// Binds to `surface` and writes the session-start marker.
    ///
    /// Returns `false` without side effects if already recording. There is no
    /// way back to idle.
    pub fn activate<S>(self: &Rc<Self>, surface: &mut S) -> bool
    where
        S: KeySurface + ?Sized,
    {
        if self.recording.get() {
            return false;
        }
        let pipeline = Rc::clone(self);
        surface.on_key_event(Box::new(move |event| pipeline.on_key_event(&event)));
        self.recording.set(true);
        let _ = self.emit(&session_start_line(self.clock.now()));
        true
    }

    /// Formats and emits one event. Failures are reported, never returned.
    pub fn on_key_event(&self, event: &KeyEvent) {
        let record = KeyRecord::from_event(self.clock.now(), event);
        let _ = self.emit(&record.to_line());
    }

    /// Appends `text` to the log, then echoes it to stdout.
    ///
    /// The echo happens even when the append failed; the failure is reported
    /// on the error channel and handed back for callers that care.
    pub fn emit(&self, text: &str) -> Result<(), LogStoreError> {
        let appended = self.store.append(text);
        let mut console = self.console.borrow_mut();
        if let Err(err) = &appended {
            console.report("Failed to write log", err);
        }
        console.echo(text);
        appended
    }
}

#[cfg(test)]
pub(crate) mod test_support {
    use std::cell::RefCell;
    use std::io::{self, Write};
    use std::rc::Rc;

    use chrono::{DateTime, Utc};

    use super::{KeyHandler, KeySurface};
    use crate::record::{Clock, KeyEvent};

    /// Cloneable in-memory writer.
    #[derive(Clone, Default)]
    pub struct SharedBuffer(Rc<RefCell<Vec<u8>>>);

    impl SharedBuffer {
        pub fn contents(&self) -> String {
            String::from_utf8(self.0.borrow().clone()).unwrap()
        }
    }

    impl Write for SharedBuffer {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            self.0.borrow_mut().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    /// Clock that returns queued instants, repeating the last one.
    pub struct ScriptedClock(RefCell<Vec<DateTime<Utc>>>);

    impl ScriptedClock {
        pub fn new(mut instants: Vec<DateTime<Utc>>) -> Self {
            instants.reverse();
            Self(RefCell::new(instants))
        }
    }

    impl Clock for ScriptedClock {
        fn now(&self) -> DateTime<Utc> {
            let mut queue = self.0.borrow_mut();
            if queue.len() > 1 {
                queue.pop().unwrap()
            } else {
                queue[0]
            }
        }
    }

    /// Surface driven by the test instead of a window.
    #[derive(Default)]
    pub struct ScriptedSurface {
        handler: Option<KeyHandler>,
        pub registrations: usize,
    }

    impl ScriptedSurface {
        pub fn press(&mut self, character: &str, keysym: &str) {
            let handler = self.handler.as_mut().expect("no handler registered");
            handler(KeyEvent::new(Some(character), keysym));
        }
    }

    impl KeySurface for ScriptedSurface {
        fn on_key_event(&mut self, handler: KeyHandler) {
            self.registrations += 1;
            self.handler = Some(handler);
        }
    }
}
