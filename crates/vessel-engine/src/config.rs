use std::cell::RefCell;

use rand::rngs::StdRng;
use rand::SeedableRng;
use serde::Deserialize;

/// Largest sequence length a resize may request by default.
pub const DEFAULT_MAX_LEN: usize = 1 << 24;

/// Engine tunables.
///
/// The engine is single threaded; the active configuration is kept per
/// thread and replaced with [`configure`].
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Resizing past this length reports `Status::OutOfMemory`.
    pub max_len: usize,
    /// Seed for the shuffle generator. `None` seeds from the OS.
    pub shuffle_seed: Option<u64>,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            max_len: DEFAULT_MAX_LEN,
            shuffle_seed: None,
        }
    }
}

impl EngineConfig {
    /// Defaults overridden by `VESSEL_MAX_LEN` and `VESSEL_SHUFFLE_SEED`.
    /// Unparseable values are ignored.
    pub fn from_env() -> Self {
        let mut config = Self::default();

        if let Some(max_len) = read_env("VESSEL_MAX_LEN") {
            config.max_len = max_len;
        }
        if let Some(seed) = read_env("VESSEL_SHUFFLE_SEED") {
            config.shuffle_seed = Some(seed);
        }

        config
    }
}

fn read_env<T: std::str::FromStr>(name: &str) -> Option<T> {
    let raw = std::env::var(name).ok()?;
    match raw.trim().parse() {
        Ok(value) => Some(value),
        Err(_) => {
            log::warn!("ignoring unparseable {}={:?}", name, raw);
            None
        }
    }
}

struct EngineState {
    config: EngineConfig,
    rng: StdRng,
}

impl EngineState {
    fn new(config: EngineConfig) -> Self {
        let rng = match config.shuffle_seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        Self { config, rng }
    }
}

thread_local! {
    static STATE: RefCell<EngineState> = RefCell::new(EngineState::new(EngineConfig::from_env()));
}

/// Replace the active configuration for the current thread.
/// Also reseeds the shuffle generator.
pub fn configure(config: EngineConfig) {
    log::debug!("engine configured: {:?}", config);
    STATE.with(|state| *state.borrow_mut() = EngineState::new(config));
}

/// The active configuration for the current thread
pub fn config() -> EngineConfig {
    STATE.with(|state| state.borrow().config.clone())
}

pub(crate) fn with_rng<R>(f: impl FnOnce(&mut StdRng) -> R) -> R {
    STATE.with(|state| f(&mut state.borrow_mut().rng))
}
