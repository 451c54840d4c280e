use tokio::time::Instant;

use combat_core::GameTime;

/// Simulation clock: milliseconds since the runtime started.
///
/// Built on tokio's clock so tests with a paused runtime control it.
#[derive(Clone, Copy, Debug)]
pub struct GameClock {
    origin: Instant,
}

impl GameClock {
    pub fn start() -> Self {
        Self {
            origin: Instant::now(),
        }
    }

    pub fn now(&self) -> GameTime {
        GameTime(self.origin.elapsed().as_millis() as u64)
    }
}

impl Default for GameClock {
    fn default() -> Self {
        Self::start()
    }
}
