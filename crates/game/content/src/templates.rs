//! Living templates: the data a spawn is built from.

use std::collections::BTreeMap;

use combat_core::state::{
    ActiveWeaponSlot, Effect, Equipment, PowerProfile, RangedPolicy, ResourceMeter,
};
use combat_core::{Ability, EntityId, Living, LivingError, LivingKind, Position, Property, Realm};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum TemplateKind {
    Player,
    Npc,
    /// Needs an owner at spawn time, see [`LivingTemplate::instantiate_pet`].
    Pet { owner_is_player: bool },
}

#[cfg(feature = "serde")]
fn default_endurance() -> u32 {
    100
}

/// Static description of a living.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct LivingTemplate {
    pub name: String,
    pub kind: TemplateKind,
    #[cfg_attr(feature = "serde", serde(default))]
    pub realm: Realm,
    pub level: u8,
    pub max_health: u32,
    #[cfg_attr(feature = "serde", serde(default))]
    pub max_mana: u32,
    #[cfg_attr(feature = "serde", serde(default = "default_endurance"))]
    pub max_endurance: u32,
    /// Base property values, primary stats included.
    #[cfg_attr(feature = "serde", serde(default))]
    pub properties: Vec<(Property, i32)>,
    #[cfg_attr(feature = "serde", serde(default))]
    pub abilities: Vec<(Ability, u8)>,
    #[cfg_attr(feature = "serde", serde(default))]
    pub equipment: Equipment,
    #[cfg_attr(feature = "serde", serde(default))]
    pub active_slot: ActiveWeaponSlot,
    #[cfg_attr(feature = "serde", serde(default))]
    pub ranged_policy: RangedPolicy,
    #[cfg_attr(feature = "serde", serde(default))]
    pub power_profile: PowerProfile,
    /// Permanent effects applied at spawn.
    #[cfg_attr(feature = "serde", serde(default))]
    pub effects: Vec<Effect>,
}

impl LivingTemplate {
    fn build(&self, id: EntityId, kind: LivingKind, position: Position) -> Result<Living, LivingError> {
        let mut living = Living::new(id, self.name.clone(), kind, self.level);
        living.position = position;
        living.health = ResourceMeter::full(self.max_health);
        living.mana = ResourceMeter::full(self.max_mana);
        living.endurance = ResourceMeter::full(self.max_endurance);
        for &(property, value) in &self.properties {
            living.set_base_property(property, value);
        }
        for &(ability, level) in &self.abilities {
            living.set_ability(ability, level);
        }
        living.equipment = self.equipment.clone();
        living.active_slot = self.active_slot;
        living.ranged_policy = self.ranged_policy;
        living.power_profile = self.power_profile;
        for effect in &self.effects {
            living.effects.add(effect.clone(), None);
        }
        living.validate()?;
        Ok(living)
    }

    /// Spawns a player or NPC. A pet template spawned this way owns itself
    /// and is rejected.
    pub fn instantiate(&self, id: EntityId, position: Position) -> Result<Living, LivingError> {
        let kind = match self.kind {
            TemplateKind::Player => LivingKind::Player { realm: self.realm },
            TemplateKind::Npc => LivingKind::Npc { realm: self.realm },
            TemplateKind::Pet { owner_is_player } => LivingKind::Pet {
                owner: id,
                owner_is_player,
                realm: self.realm,
            },
        };
        self.build(id, kind, position)
    }

    /// Spawns a pet controlled by `owner`, whatever the template kind.
    pub fn instantiate_pet(
        &self,
        id: EntityId,
        owner: EntityId,
        owner_is_player: bool,
        position: Position,
    ) -> Result<Living, LivingError> {
        let kind = LivingKind::Pet {
            owner,
            owner_is_player,
            realm: self.realm,
        };
        self.build(id, kind, position)
    }
}

/// Templates keyed by name, in a stable order.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct TemplateCatalog {
    templates: BTreeMap<String, LivingTemplate>,
}

impl TemplateCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a template. Returns the one it replaced, if any.
    pub fn insert(&mut self, key: impl Into<String>, template: LivingTemplate) -> Option<LivingTemplate> {
        self.templates.insert(key.into(), template)
    }

    pub fn get(&self, key: &str) -> Option<&LivingTemplate> {
        self.templates.get(key)
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.templates.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.templates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.templates.is_empty()
    }
}
