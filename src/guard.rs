//! One-time initialization and serialization of the native engine.
//!
//! libpostal keeps global state and makes no reentrancy promises, so an
//! [`Engine`] owns its [`NativeEngine`] behind a single [`Mutex`]. The same
//! lock covers setup and every later native call: setup runs lazily under the
//! lock on first use, exactly once, and a failed setup is remembered for the
//! rest of the process.

use std::sync::{Mutex, MutexGuard, OnceLock};
use std::time::Instant;

use log::{error, info};

use crate::engine::{Libpostal, NativeEngine};
use crate::error::{Error, Result};
use crate::stats::{EngineStats, StatsRecorder};
use crate::PostalConfig;

static GLOBAL: OnceLock<Engine<Libpostal>> = OnceLock::new();

#[derive(Debug)]
enum InitState {
    Uninitialized,
    Ready,
    Failed(Error),
}

/// Native engine plus its lifecycle flag. Only reachable through the lock.
#[derive(Debug)]
pub(crate) struct EngineState<E> {
    pub(crate) native: E,
    init: InitState,
}

/// A lazily initialized, mutually exclusive handle to a native parser.
///
/// Most callers use the process-wide [`Engine::global`] through
/// [`crate::parse_address`], the only engine over the real libpostal. Tests
/// and embedders can build their own around any other [`NativeEngine`].
#[derive(Debug)]
pub struct Engine<E> {
    state: Mutex<EngineState<E>>,
    stats: StatsRecorder,
}

impl<E: NativeEngine> Engine<E> {
    /// Wrap a native engine. Nothing is loaded until first use.
    pub fn new(native: E) -> Self {
        Self {
            state: Mutex::new(EngineState {
                native,
                init: InitState::Uninitialized,
            }),
            stats: StatsRecorder::default(),
        }
    }

    /// Run native setup if it has not run yet.
    ///
    /// Concurrent first callers block on the lock; only one of them calls
    /// into the library. Every caller sees the same outcome.
    ///
    /// # Errors
    ///
    /// [`Error::InitializationFailed`] if either setup stage failed, now or on
    /// an earlier call, and [`Error::LockPoisoned`] if a previous holder of
    /// the lock panicked. Both are fatal.
    pub fn initialize(&self) -> Result<()> {
        self.lock_ready().map(drop)
    }

    /// Whether setup has completed successfully.
    pub fn is_initialized(&self) -> bool {
        self.state
            .lock()
            .map(|state| matches!(state.init, InitState::Ready))
            .unwrap_or(false)
    }

    /// Counters for this engine.
    pub fn stats(&self) -> EngineStats {
        self.stats.snapshot()
    }

    pub(crate) fn recorder(&self) -> &StatsRecorder {
        &self.stats
    }

    /// Take the engine lock, initializing first if needed.
    ///
    /// The returned guard must be held for the whole native exchange.
    pub(crate) fn lock_ready(&self) -> Result<MutexGuard<'_, EngineState<E>>> {
        let mut state = self.state.lock().map_err(|_| Error::LockPoisoned)?;

        if let InitState::Failed(err) = &state.init {
            return Err(err.clone());
        }
        if matches!(state.init, InitState::Ready) {
            return Ok(state);
        }

        self.stats.record_setup();
        let started = Instant::now();

        // SAFETY: the engine lock is held
        let failed_stage = if !unsafe { state.native.setup() } {
            Some("libpostal_setup")
        } else if !unsafe { state.native.setup_parser() } {
            Some("libpostal_setup_parser")
        } else {
            None
        };

        match failed_stage {
            None => {
                info!("libpostal loaded in {:?}", started.elapsed());
                state.init = InitState::Ready;
                Ok(state)
            }
            Some(stage) => {
                let message = match state.native.failure_hint() {
                    Some(hint) => format!("{stage} failed ({hint})"),
                    None => format!("{stage} failed"),
                };
                error!("Could not load libpostal: {message}");

                let err = Error::initialization_failed(message);
                state.init = InitState::Failed(err.clone());
                Err(err)
            }
        }
    }
}

impl Engine<Libpostal> {
    /// The process-wide libpostal engine.
    ///
    /// Created on first access from [`PostalConfig::from_env`] unless
    /// [`Engine::configure_global`] ran first.
    pub fn global() -> &'static Self {
        GLOBAL.get_or_init(|| Engine::new(Libpostal::with_config(&PostalConfig::from_env())))
    }

    /// Create the process-wide engine with an explicit configuration.
    ///
    /// # Errors
    ///
    /// [`Error::AlreadyConfigured`] if the global engine already exists.
    pub fn configure_global(config: PostalConfig) -> Result<&'static Self> {
        let mut created = false;
        let engine = GLOBAL.get_or_init(|| {
            created = true;
            Engine::new(Libpostal::with_config(&config))
        });

        if created {
            Ok(engine)
        } else {
            Err(Error::AlreadyConfigured)
        }
    }
}
