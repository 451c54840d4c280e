use std::collections::HashMap;

use strum::{Display, EnumIter};
use tracing::warn;

use crate::combat::AttackType;
use crate::error::LivingError;
use crate::schedule::AttackScheduler;
use crate::state::{
    ActiveWeaponSlot, AttackerRegistry, EffectList, EntityId, Equipment, GameTime, LivingFlags,
    Position, ResourceMeter, SpellId, TempProperties, Weapon, is_in_front,
};
use crate::stats::{Ability, Property};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default, Display)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Realm {
    #[default]
    None,
    Albion,
    Midgard,
    Hibernia,
}

/// Closed set of living kinds. Behavior that differs by kind matches on this.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum LivingKind {
    Player {
        realm: Realm,
    },
    Npc {
        realm: Realm,
    },
    /// Controlled pet. `owner_is_player` is fixed at summon time.
    Pet {
        owner: EntityId,
        owner_is_player: bool,
        realm: Realm,
    },
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Display, EnumIter)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ResourceKind {
    Health,
    Mana,
    Endurance,
}

/// Why a resource changed; carried on events and logs.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Display)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ChangeReason {
    Damage,
    Regeneration,
    Spell,
    Ability,
    Unknown,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum RangedAttackType {
    #[default]
    Normal,
    Critical,
    /// Enhanced long shot; pierces bladeturn.
    Long,
    Volley,
    /// Drawn shot cannot be interrupted by non-melee attacks.
    SureShot,
    /// Next interval is halved.
    RapidFire,
}

/// What a ranged attacker does when its shot is drawn.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum RangedPolicy {
    Hold,
    #[default]
    Fire,
    Stop,
}

/// How mana behaves over time.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum PowerProfile {
    #[default]
    Standard,
    /// Mana regenerates while fighting and drains by `per_tick` otherwise.
    /// The timer never stops on full or empty.
    Drain { per_tick: u32 },
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct CastState {
    pub spell: SpellId,
    pub interruptible: bool,
}

/// Counters maintained by effect collaborators.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct StackCounters {
    pub disease: u16,
    pub turn_disable: u16,
}

#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Living {
    pub id: EntityId,
    pub name: String,
    pub kind: LivingKind,
    pub level: u8,
    pub position: Position,
    pub heading: u16,

    pub health: ResourceMeter,
    pub mana: ResourceMeter,
    pub endurance: ResourceMeter,

    pub flags: LivingFlags,
    pub active_slot: ActiveWeaponSlot,
    pub equipment: Equipment,
    pub effects: EffectList,
    pub attackers: AttackerRegistry,
    pub temp: TempProperties,
    pub attack: AttackScheduler,
    pub ranged_type: RangedAttackType,
    pub ranged_policy: RangedPolicy,
    pub power_profile: PowerProfile,
    pub casting: Option<CastState>,
    pub stacks: StackCounters,

    base_properties: HashMap<Property, i32>,
    abilities: HashMap<Ability, u8>,
}

impl Living {
    pub fn new(id: EntityId, name: impl Into<String>, kind: LivingKind, level: u8) -> Self {
        Self {
            id,
            name: name.into(),
            kind,
            level,
            position: Position::default(),
            heading: 0,
            health: ResourceMeter::full(100),
            mana: ResourceMeter::full(0),
            endurance: ResourceMeter::full(100),
            flags: LivingFlags::ACTIVE,
            active_slot: ActiveWeaponSlot::Standard,
            equipment: Equipment::default(),
            effects: EffectList::new(),
            attackers: AttackerRegistry::new(),
            temp: TempProperties::default(),
            attack: AttackScheduler::new(),
            ranged_type: RangedAttackType::Normal,
            ranged_policy: RangedPolicy::Fire,
            power_profile: PowerProfile::Standard,
            casting: None,
            stacks: StackCounters::default(),
            base_properties: HashMap::new(),
            abilities: HashMap::new(),
        }
    }

    pub fn validate(&self) -> Result<(), LivingError> {
        if self.health.maximum == 0 {
            return Err(LivingError::ZeroMaxHealth { id: self.id });
        }
        if self.level == 0 {
            return Err(LivingError::ZeroLevel { id: self.id });
        }
        if let LivingKind::Pet { owner, .. } = self.kind
            && owner == self.id
        {
            return Err(LivingError::SelfOwned { id: self.id });
        }
        Ok(())
    }

    // ===== identity =====

    pub fn is_alive(&self) -> bool {
        self.health.current > 0
    }

    pub fn is_active(&self) -> bool {
        self.flags.contains(LivingFlags::ACTIVE)
    }

    pub fn is_player(&self) -> bool {
        matches!(self.kind, LivingKind::Player { .. })
    }

    pub fn realm(&self) -> Realm {
        match self.kind {
            LivingKind::Player { realm }
            | LivingKind::Npc { realm }
            | LivingKind::Pet { realm, .. } => realm,
        }
    }

    /// A player, or a pet whose controlling owner is a player.
    pub fn is_player_controlled(&self) -> bool {
        match self.kind {
            LivingKind::Player { .. } => true,
            LivingKind::Pet {
                owner_is_player, ..
            } => owner_is_player,
            LivingKind::Npc { .. } => false,
        }
    }

    // ===== properties =====

    pub fn base_property(&self, property: Property) -> i32 {
        self.base_properties.get(&property).copied().unwrap_or(0)
    }

    pub fn set_base_property(&mut self, property: Property, value: i32) {
        self.base_properties.insert(property, value);
    }

    pub fn ability_level(&self, ability: Ability) -> u8 {
        self.abilities.get(&ability).copied().unwrap_or(0)
    }

    pub fn has_ability(&self, ability: Ability) -> bool {
        self.ability_level(ability) > 0
    }

    pub fn set_ability(&mut self, ability: Ability, level: u8) {
        if level == 0 {
            self.abilities.remove(&ability);
        } else {
            self.abilities.insert(ability, level);
        }
    }

    // ===== weapons =====

    pub fn active_weapon(&self) -> Option<&Weapon> {
        self.equipment.active_weapon(self.active_slot)
    }

    pub fn is_ranged_active(&self) -> bool {
        self.active_slot == ActiveWeaponSlot::Distance
    }

    /// Attack type of a swing from the active slot.
    pub fn attack_type(&self, off_hand: bool) -> AttackType {
        match self.active_slot {
            ActiveWeaponSlot::Distance => AttackType::Ranged,
            ActiveWeaponSlot::TwoHanded => AttackType::MeleeTwoHand,
            ActiveWeaponSlot::Standard if off_hand => AttackType::MeleeDualWield,
            ActiveWeaponSlot::Standard => AttackType::MeleeOneHand,
        }
    }

    /// True if the dual-wield off-hand swing is available.
    pub fn can_dual_wield(&self) -> bool {
        self.active_slot == ActiveWeaponSlot::Standard
            && self.has_ability(Ability::DualWield)
            && self.equipment.off_hand_weapon().is_some()
    }

    // ===== geometry =====

    pub fn distance_to(&self, other: &Living) -> Option<f64> {
        self.position.distance_to(&other.position)
    }

    pub fn is_within(&self, other: &Living, radius: u32) -> bool {
        self.position.is_within(&other.position, radius)
    }

    pub fn is_facing(&self, other: &Living, view_degrees: u16) -> bool {
        is_in_front(&self.position, self.heading, &other.position, view_degrees)
    }

    /// Turns towards `target` unless turning is disabled.
    pub fn turn_to(&mut self, target: &Position) -> bool {
        if self.stacks.turn_disable > 0 {
            return false;
        }
        self.heading = self.position.heading_to(target);
        true
    }

    // ===== resources =====

    pub fn meter(&self, kind: ResourceKind) -> &ResourceMeter {
        match kind {
            ResourceKind::Health => &self.health,
            ResourceKind::Mana => &self.mana,
            ResourceKind::Endurance => &self.endurance,
        }
    }

    fn meter_mut(&mut self, kind: ResourceKind) -> &mut ResourceMeter {
        match kind {
            ResourceKind::Health => &mut self.health,
            ResourceKind::Mana => &mut self.mana,
            ResourceKind::Endurance => &mut self.endurance,
        }
    }

    /// Applies `delta` clamped to the pool and returns the change actually applied.
    ///
    /// A dead living is unaffected. Health reaching its maximum clears the
    /// experience-credit map.
    pub fn change_resource(&mut self, kind: ResourceKind, delta: i64) -> i64 {
        if !self.is_alive() {
            return 0;
        }
        let applied = self.meter_mut(kind).apply(delta);
        if kind == ResourceKind::Health && self.health.is_full() {
            self.attackers.clear_credit();
        }
        applied
    }

    pub fn change_health(&mut self, delta: i64) -> i64 {
        self.change_resource(ResourceKind::Health, delta)
    }

    pub fn change_mana(&mut self, delta: i64) -> i64 {
        self.change_resource(ResourceKind::Mana, delta)
    }

    pub fn change_endurance(&mut self, delta: i64) -> i64 {
        self.change_resource(ResourceKind::Endurance, delta)
    }

    // ===== engagement =====

    pub fn add_attacker(&mut self, attacker: EntityId) -> bool {
        self.attackers.add(self.id, attacker)
    }

    pub fn remove_attacker(&mut self, attacker: EntityId) -> bool {
        self.attackers.remove(attacker)
    }

    /// Incapacitating crowd control, or an uninterruptible cast in progress.
    pub fn is_busy(&self) -> bool {
        self.flags.is_incapacitated() || self.casting.is_some_and(|c| !c.interruptible)
    }

    pub fn in_combat(&self, now: GameTime, window_ms: u64) -> bool {
        self.temp.in_combat(now, window_ms)
    }

    // ===== stacks =====

    pub fn add_disease(&mut self) {
        self.stacks.disease = self.stacks.disease.saturating_add(1);
    }

    pub fn remove_disease(&mut self) {
        match self.stacks.disease.checked_sub(1) {
            Some(v) => self.stacks.disease = v,
            None => warn!(living = %self.id, "disease stack underflow, clamped at 0"),
        }
    }

    pub fn is_diseased(&self) -> bool {
        self.stacks.disease > 0
    }

    pub fn disable_turning(&mut self) {
        self.stacks.turn_disable = self.stacks.turn_disable.saturating_add(1);
    }

    pub fn enable_turning(&mut self) {
        match self.stacks.turn_disable.checked_sub(1) {
            Some(v) => self.stacks.turn_disable = v,
            None => warn!(living = %self.id, "turn-disable stack underflow, clamped at 0"),
        }
    }
}

/// Entities that may act on behalf of another.
pub trait HasControllingOwner {
    fn controlling_owner(&self) -> Option<EntityId>;

    /// Entity that receives experience credit for this one's damage.
    fn credit_source(&self) -> EntityId;
}

impl HasControllingOwner for Living {
    fn controlling_owner(&self) -> Option<EntityId> {
        match self.kind {
            LivingKind::Pet { owner, .. } => Some(owner),
            _ => None,
        }
    }

    fn credit_source(&self) -> EntityId {
        self.controlling_owner().unwrap_or(self.id)
    }
}

/// Entities protected by third parties through guard-style effects.
pub trait CanBeGuarded {
    /// Ids of every protector or related party referenced by active effects.
    fn protectors(&self) -> Vec<EntityId>;
}

impl CanBeGuarded for Living {
    fn protectors(&self) -> Vec<EntityId> {
        self.effects.related_entities()
    }
}

pub trait IsStealthable {
    fn is_stealthed(&self) -> bool;

    /// Drops stealth; returns true if the living was hidden.
    fn reveal(&mut self) -> bool;
}

impl IsStealthable for Living {
    fn is_stealthed(&self) -> bool {
        self.flags.contains(LivingFlags::STEALTHED)
    }

    fn reveal(&mut self) -> bool {
        let was = self.is_stealthed();
        self.flags.remove(LivingFlags::STEALTHED);
        was
    }
}
