/// Events emitted during a simulation step.
/// The driver consumes these for logging.

use crate::domain::entity::PlatformId;

#[derive(Clone, Debug, PartialEq)]
pub enum GameEvent {
    Bounced { id: PlatformId, boost: bool },
    PlatformBroken { id: PlatformId },
    PlatformRecycled { culled: PlatformId, spawned: PlatformId },
    SpeedChanged { speed: f32 },
    PlayerFell { score: u32 },
}
