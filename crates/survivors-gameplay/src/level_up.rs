//! Level-up menu.
//!
//! Built once per level-up from the owned weapons. Offers upgrades for
//! owned weapons below their cap and acquisitions for weapons not owned
//! yet, sampled down to the configured count. With nothing left to offer
//! the menu resolves to a heal straight away.

use serde::{Deserialize, Serialize};

use crate::input::InputState;
use crate::weapon::{Weapon, WeaponCatalog, WeaponKind};

/// One entry of the menu.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum LevelUpChoice {
    /// Level up an owned weapon
    Upgrade {
        /// Weapon to upgrade
        kind: WeaponKind,
        /// Level it will reach
        next_level: usize,
    },
    /// Add a weapon not owned yet
    Acquire {
        /// Weapon to add
        kind: WeaponKind,
    },
}

impl LevelUpChoice {
    /// The weapon this choice refers to.
    #[must_use]
    pub fn kind(&self) -> WeaponKind {
        match *self {
            Self::Upgrade { kind, .. } | Self::Acquire { kind } => kind,
        }
    }
}

/// What the menu resolved to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum LevelUpOutcome {
    /// A weapon choice
    Choice(LevelUpChoice),
    /// Nothing to offer, restore health instead
    Heal,
}

/// A menu entry with its display text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LevelUpOption {
    /// The choice
    pub choice: LevelUpChoice,
    /// Heading, e.g. `Arrow (level 3)`
    pub title: String,
    /// Upgrade text from the progression table
    pub description: String,
}

/// Weapon choice menu shown while the game is in its level-up flow.
#[derive(Debug, Clone)]
pub struct LevelUpMenu {
    options: Vec<LevelUpOption>,
    cursor: usize,
    chosen: Option<LevelUpOutcome>,
}

impl LevelUpMenu {
    /// Builds the menu from the owned `weapons`.
    ///
    /// At most `count` options are shown; larger candidate sets are sampled
    /// with `rng`.
    pub fn new(
        weapons: &[Weapon],
        catalog: &WeaponCatalog,
        count: usize,
        rng: &mut fastrand::Rng,
    ) -> Self {
        let mut options: Vec<LevelUpOption> = weapons
            .iter()
            .filter(|w| !w.is_max_level())
            .map(|w| LevelUpOption {
                choice: LevelUpChoice::Upgrade {
                    kind: w.kind(),
                    next_level: w.level() + 1,
                },
                title: format!("{} (level {})", w.name(), w.level() + 2),
                description: w
                    .next_stats()
                    .map(|s| s.description.clone())
                    .unwrap_or_default(),
            })
            .collect();

        for kind in WeaponKind::ALL {
            if weapons.iter().any(|w| w.kind() == kind) {
                continue;
            }
            options.push(LevelUpOption {
                choice: LevelUpChoice::Acquire { kind },
                title: format!("{} (new)", kind.name()),
                description: catalog
                    .table(kind)
                    .get(0)
                    .map(|s| s.description.clone())
                    .unwrap_or_default(),
            });
        }

        if options.len() > count {
            rng.shuffle(&mut options);
            options.truncate(count);
        }

        let chosen = options.is_empty().then_some(LevelUpOutcome::Heal);
        Self {
            options,
            cursor: 0,
            chosen,
        }
    }

    /// Offered options.
    #[must_use]
    pub fn options(&self) -> &[LevelUpOption] {
        &self.options
    }

    /// Index of the highlighted option.
    #[must_use]
    pub fn cursor(&self) -> usize {
        self.cursor
    }

    /// The resolved outcome, once confirmed.
    #[must_use]
    pub fn chosen(&self) -> Option<LevelUpOutcome> {
        self.chosen
    }

    /// Moves the cursor up, wrapping to the last option.
    pub fn move_up(&mut self) {
        if !self.options.is_empty() {
            self.cursor = (self.cursor + self.options.len() - 1) % self.options.len();
        }
    }

    /// Moves the cursor down, wrapping to the first option.
    pub fn move_down(&mut self) {
        if !self.options.is_empty() {
            self.cursor = (self.cursor + 1) % self.options.len();
        }
    }

    /// Handles the buttons pressed this frame. Returns the outcome once the
    /// menu is resolved; later calls keep returning it unchanged.
    pub fn update(&mut self, pressed: &InputState) -> Option<LevelUpOutcome> {
        if self.chosen.is_some() {
            return self.chosen;
        }
        if pressed.up {
            self.move_up();
        }
        if pressed.down {
            self.move_down();
        }
        if pressed.confirm {
            self.chosen = self
                .options
                .get(self.cursor)
                .map(|o| LevelUpOutcome::Choice(o.choice));
        }
        self.chosen
    }
}
