//! Attack record and result types.

use strum::Display;

use crate::state::{DamageType, EntityId, GameTime, HitLocation, Living, SpellId, Weapon};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Display)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum AttackType {
    MeleeOneHand,
    MeleeTwoHand,
    MeleeDualWield,
    Ranged,
    Spell,
}

impl AttackType {
    pub const fn is_melee(self) -> bool {
        matches!(
            self,
            Self::MeleeOneHand | Self::MeleeTwoHand | Self::MeleeDualWield
        )
    }
}

/// Final outcome of one swing.
///
/// The first seven variants are validation failures: nothing was rolled
/// and the defender is untouched.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Display)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum AttackResult {
    NoTarget,
    NoValidTarget,
    TargetNotVisible,
    TargetDead,
    OutOfRange,
    NotAllowedServerRules,
    Phaseshift,

    Missed,
    Evaded,
    Parried,
    Blocked,
    Fumbled,
    Bodyguarded,
    Grappled,
    HitUnstyled,
    HitStyle,
}

impl AttackResult {
    pub const fn is_hit(self) -> bool {
        matches!(self, Self::HitUnstyled | Self::HitStyle)
    }

    pub const fn is_invalid(self) -> bool {
        matches!(
            self,
            Self::NoTarget
                | Self::NoValidTarget
                | Self::TargetNotVisible
                | Self::TargetDead
                | Self::OutOfRange
                | Self::NotAllowedServerRules
                | Self::Phaseshift
        )
    }

    /// The defender was actually engaged: it joins the fight, is interrupted
    /// and has its combat timestamps refreshed.
    pub const fn is_engagement(self) -> bool {
        !self.is_invalid() && !matches!(self, Self::Bodyguarded)
    }

    /// Result code sent with the combat animation.
    pub const fn animation_code(self) -> u8 {
        match self {
            Self::Missed => 0,
            Self::Parried => 1,
            Self::Blocked => 2,
            Self::Evaded => 3,
            Self::Fumbled => 4,
            Self::HitUnstyled | Self::HitStyle => 10,
            Self::Bodyguarded | Self::Grappled => 11,
            _ => 0x80,
        }
    }
}

/// A combat style as the resolver sees it.
///
/// The style engine decides whether a style actually executes; these are
/// the bonuses the defense chain needs up front.
#[derive(Clone, Debug, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct StyleInfo {
    pub id: u16,
    pub name: String,
    pub to_hit_bonus: i32,
    pub defense_bonus: i32,
    pub bonus_damage: i32,
    /// Opener usable only from stealth; suppresses evade, parry and block.
    pub stealth_opener: bool,
    pub animation: u16,
    pub procs: Vec<SpellId>,
}

/// Inputs to one swing.
#[derive(Clone, Debug, PartialEq)]
pub struct SwingRequest {
    pub weapon: Option<Weapon>,
    pub style: Option<StyleInfo>,
    pub effectiveness: f64,
    pub interrupt_duration: u32,
    pub dual_wield: bool,
    pub ignore_line_of_sight: bool,
    pub now: GameTime,
}

impl SwingRequest {
    /// Full-effectiveness swing with the attacker's active weapon.
    pub fn primary(attacker: &Living, interrupt_duration: u32, now: GameTime) -> Self {
        Self {
            weapon: attacker.active_weapon().cloned(),
            style: None,
            effectiveness: 1.0,
            interrupt_duration,
            dual_wield: false,
            ignore_line_of_sight: false,
            now,
        }
    }

    pub fn with_style(mut self, style: StyleInfo) -> Self {
        self.style = Some(style);
        self
    }

    /// Off-hand swing with the attacker's left-hand weapon.
    pub fn off_hand(attacker: &Living, effectiveness: f64, interrupt_duration: u32, now: GameTime) -> Self {
        Self {
            weapon: attacker.equipment.off_hand_weapon().cloned(),
            style: None,
            effectiveness,
            interrupt_duration,
            dual_wield: true,
            ignore_line_of_sight: false,
            now,
        }
    }
}

/// Everything known about one swing. Built fresh per swing and discarded
/// after notification.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct AttackRecord {
    pub attacker: EntityId,
    /// Current defender; guard and intercept may redirect it.
    pub target: Option<EntityId>,
    pub weapon: Option<Weapon>,
    pub style: Option<StyleInfo>,
    pub attack_type: AttackType,
    pub damage_type: DamageType,
    pub hit_location: Option<HitLocation>,
    pub damage: i32,
    pub critical_damage: i32,
    pub uncapped_damage: i32,
    pub style_damage: i32,
    pub modifier: i32,
    pub result: AttackResult,
    pub animation_id: u16,
    pub style_procs: Vec<SpellId>,
    /// Shield procs earned by a successful block.
    pub defender_procs: Vec<SpellId>,
    pub off_hand: bool,
    pub effectiveness: f64,
    pub interrupt_duration: u32,
    pub pvp: bool,
    pub at: GameTime,
}

impl AttackRecord {
    pub fn new(attacker: &Living, target: Option<EntityId>, request: &SwingRequest) -> Self {
        let attack_type = if request.weapon.as_ref().is_some_and(Weapon::is_ranged) {
            AttackType::Ranged
        } else {
            attacker.attack_type(request.dual_wield)
        };
        Self {
            attacker: attacker.id,
            target,
            damage_type: request
                .weapon
                .as_ref()
                .map_or(DamageType::Natural, |w| w.damage_type),
            weapon: request.weapon.clone(),
            style: request.style.clone(),
            attack_type,
            hit_location: None,
            damage: 0,
            critical_damage: 0,
            uncapped_damage: 0,
            style_damage: 0,
            modifier: 0,
            result: AttackResult::NoTarget,
            animation_id: 0,
            style_procs: Vec::new(),
            defender_procs: Vec::new(),
            off_hand: request.dual_wield,
            effectiveness: request.effectiveness,
            interrupt_duration: request.interrupt_duration,
            pvp: false,
            at: request.now,
        }
    }

    /// Health the defender loses if this record is applied.
    pub fn total_damage(&self) -> i32 {
        if self.result.is_hit() {
            self.damage + self.critical_damage
        } else {
            0
        }
    }

    pub fn is_redirected_from(&self, defender: EntityId) -> bool {
        self.target.is_some_and(|t| t != defender)
    }
}
