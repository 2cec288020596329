use std::cell::Cell;
use std::sync::{Arc, Weak};

use log::{Level, LevelFilter, Log, Metadata, Record};
use parking_lot::RwLock;

use crate::event::{AppEvent, Dispatcher, EventKind};
use crate::util::time;

/// Target used for messages that were already put on the console directly
pub const CONSOLE_TARGET: &str = "schnizzle::console";

/// Records at this level or more severe reach the console
const CONSOLE_LEVEL: Level = Level::Info;

/// Formats a console line: `HH:MM:SS LEVEL message`
pub fn console_line(level: Level, message: &str) -> String {
    format!("{} {:<5} {}", time::clock_prefix(), level, message)
}

/// Handle to the dispatcher that receives forwarded records. Nothing is
/// forwarded until a dispatcher is attached, or after it is dropped.
#[derive(Debug, Clone, Default)]
pub struct ConsoleSink {
    dispatcher: Arc<RwLock<Option<Weak<Dispatcher>>>>,
}

impl ConsoleSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn attach(&self, dispatcher: &Arc<Dispatcher>) {
        *self.dispatcher.write() = Some(Arc::downgrade(dispatcher));
    }

    pub fn detach(&self) {
        *self.dispatcher.write() = None;
    }

    fn send(&self, level: Level, message: &str) {
        let dispatcher = self.dispatcher.read().as_ref().and_then(Weak::upgrade);
        if let Some(dispatcher) = dispatcher {
            let line = console_line(level, message);
            dispatcher.dispatch_event(AppEvent::from_source("log", EventKind::Log(line)));
        }
    }
}

thread_local! {
    static FORWARDING: Cell<bool> = const { Cell::new(false) };
}

/// Writes to stderr through `env_logger` and forwards this crate's records
/// of `Info` and above to the console as `Log` events.
pub struct ConsoleLogger {
    inner: env_logger::Logger,
    sink: ConsoleSink,
}

impl ConsoleLogger {
    pub fn new(inner: env_logger::Logger, sink: ConsoleSink) -> Self {
        Self { inner, sink }
    }

    fn forwards(&self, metadata: &Metadata<'_>) -> bool {
        metadata.level() <= CONSOLE_LEVEL
            && metadata.target() != CONSOLE_TARGET
            && metadata.target().starts_with(env!("CARGO_CRATE_NAME"))
    }

    /// Level the `log` facade must let through for both outputs
    pub fn max_level(&self) -> LevelFilter {
        self.inner.filter().max(CONSOLE_LEVEL.to_level_filter())
    }
}

impl Log for ConsoleLogger {
    fn enabled(&self, metadata: &Metadata<'_>) -> bool {
        self.inner.enabled(metadata) || self.forwards(metadata)
    }

    fn log(&self, record: &Record<'_>) {
        self.inner.log(record);
        if !self.forwards(record.metadata()) {
            return;
        }
        // Records logged by event handlers while a line is being delivered stay on stderr
        FORWARDING.with(|forwarding| {
            if forwarding.replace(true) {
                return;
            }
            self.sink.send(record.level(), &record.args().to_string());
            forwarding.set(false);
        });
    }

    fn flush(&self) {
        self.inner.flush();
    }
}

/// Installs the global logger. `RUST_LOG` controls stderr as usual; the
/// returned sink is attached to a dispatcher once one exists.
pub fn init() -> Result<ConsoleSink, log::SetLoggerError> {
    let sink = ConsoleSink::new();
    let logger = ConsoleLogger::new(env_logger::Builder::from_default_env().build(), sink.clone());
    let max_level = logger.max_level();
    log::set_boxed_logger(Box::new(logger))?;
    log::set_max_level(max_level);
    Ok(sink)
}
