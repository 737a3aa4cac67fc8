//! Event log for things the presentation layer may want to react to.

use crossbeam_channel::{bounded, Receiver, Sender, TrySendError};
use serde::{Deserialize, Serialize};
use survivors_common::EntityId;
use tracing::trace;

use crate::monster::MonsterKind;
use crate::session::GamePhase;
use crate::weapon::WeaponKind;

/// Pending events kept by a default log.
pub const EVENT_LOG_CAPACITY: usize = 1024;

/// Events produced by the simulation during a tick.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum GameEvent {
    /// Session moved to another phase
    PhaseChanged {
        /// Previous phase
        from: GamePhase,
        /// New phase
        to: GamePhase,
    },
    /// Monster entered the level
    MonsterSpawned {
        /// Monster ID
        id: EntityId,
        /// Monster variant
        kind: MonsterKind,
    },
    /// Monster died from damage and dropped loot
    MonsterKilled {
        /// Monster ID
        id: EntityId,
        /// XP dropped
        xp_value: u32,
    },
    /// Monster removed without a kill (touched the player, left the level)
    MonsterDespawned {
        /// Monster ID
        id: EntityId,
    },
    /// Player lost health
    PlayerHurt {
        /// Health lost this tick
        damage: i32,
        /// Health remaining
        health: i32,
    },
    /// XP picked up
    XpCollected {
        /// Amount gained
        value: u32,
    },
    /// Player healed by a cake or a level-up
    Healed {
        /// Health restored
        amount: i32,
    },
    /// XP crossed the cap
    LevelUp {
        /// New player level
        level: u32,
        /// XP needed for the next level
        xp_cap: u32,
    },
    /// A new weapon was added
    WeaponAcquired {
        /// Weapon kind
        kind: WeaponKind,
    },
    /// An owned weapon gained a level
    WeaponUpgraded {
        /// Weapon kind
        kind: WeaponKind,
        /// New level
        level: usize,
    },
    /// The game ended
    GameOver {
        /// Whether the player survived until the win time
        won: bool,
        /// Level reached
        level: u32,
        /// Game seconds survived
        time: f64,
    },
}

/// Bounded event queue drained once per frame.
///
/// Backed by a bounded channel: publishing never blocks and events are
/// dropped while the queue is full.
#[derive(Debug)]
pub struct EventLog {
    sender: Sender<GameEvent>,
    receiver: Receiver<GameEvent>,
}

impl Default for EventLog {
    fn default() -> Self {
        Self::new(EVENT_LOG_CAPACITY)
    }
}

impl EventLog {
    /// Creates a new event log holding at most `capacity` pending events.
    #[must_use]
    pub fn new(capacity: usize) -> Self {
        let (sender, receiver) = bounded(capacity);
        Self { sender, receiver }
    }

    /// Records an event, dropping it if the log is full.
    pub fn publish(&self, event: GameEvent) {
        if let Err(TrySendError::Full(event)) = self.sender.try_send(event) {
            trace!("Event log full, dropping {:?}", event);
        }
    }

    /// Takes all pending events in publish order.
    pub fn drain(&self) -> Vec<GameEvent> {
        self.receiver.try_iter().collect()
    }

    /// Moves all pending events from `other` into this log.
    pub fn absorb(&self, other: &EventLog) {
        for event in other.receiver.try_iter() {
            self.publish(event);
        }
    }

    /// Returns the number of pending events.
    #[must_use]
    pub fn pending_count(&self) -> usize {
        self.receiver.len()
    }
}
