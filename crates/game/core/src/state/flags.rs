use bitflags::bitflags;

bitflags! {
    /// Boolean conditions of a living that the combat rules branch on.
    ///
    /// Crowd-control flags are set by effect collaborators; the combat engine
    /// only reads them, except `ACTIVE` which the runtime clears on removal.
    #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default)]
    #[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
    pub struct LivingFlags: u16 {
        /// Present in the world and simulated.
        const ACTIVE           = 1 << 0;
        const STUNNED          = 1 << 1;
        const MEZZED           = 1 << 2;
        const SITTING          = 1 << 3;
        const DISARMED         = 1 << 4;
        const SILENCED         = 1 << 5;
        const BERSERK          = 1 << 6;
        const MOVING           = 1 << 7;
        /// Cannot be selected as an attack target.
        const UNTARGETABLE     = 1 << 8;
        /// Evade, parry and block are suppressed.
        const DEFENSE_DISABLED = 1 << 9;
        const STEALTHED        = 1 << 10;
        /// Death has been processed; set once so dying is idempotent.
        const DEAD             = 1 << 11;
    }
}

impl LivingFlags {
    /// Stunned or mesmerized: no swings, no active defenses.
    pub fn is_incapacitated(self) -> bool {
        self.intersects(Self::STUNNED | Self::MEZZED)
    }
}
