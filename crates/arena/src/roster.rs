//! The demo skirmish: who fights, where they stand and whom they attack.
use anyhow::{Context, Result};
use combat_content::{LivingTemplate, TemplateCatalog, TemplateKind};
use combat_core::state::{
    ActiveWeaponSlot, DamageType, Effect, Equipment, OffHand, PowerProfile, RangedPolicy, Weapon,
    WeaponHand,
};
use combat_core::{Ability, EntityId, Position, Property, Realm};
use combat_runtime::CombatHandle;
use tracing::info;

fn template(name: &str, kind: TemplateKind, realm: Realm, level: u8, max_health: u32) -> LivingTemplate {
    LivingTemplate {
        name: name.to_string(),
        kind,
        realm,
        level,
        max_health,
        max_mana: 0,
        max_endurance: 100,
        properties: vec![
            (Property::Strength, 60),
            (Property::Dexterity, 60),
            (Property::Quickness, 60),
        ],
        abilities: Vec::new(),
        equipment: Equipment::default(),
        active_slot: ActiveWeaponSlot::Standard,
        ranged_policy: RangedPolicy::Fire,
        power_profile: PowerProfile::Standard,
        effects: Vec::new(),
    }
}

/// Templates used when no data directory is configured.
pub fn builtin_catalog() -> TemplateCatalog {
    let mut catalog = TemplateCatalog::new();

    let mut knight = template("Sir Aldric", TemplateKind::Player, Realm::Albion, 20, 900);
    knight.properties.push((Property::Strength, 85));
    knight.abilities = vec![(Ability::Parry, 5), (Ability::Shield, 4)];
    knight.equipment.main_hand = Some(Weapon::new("broadsword", DamageType::Slash, 37, WeaponHand::OneHanded));
    catalog.insert("knight", knight);

    let mut berserker = template("Hrolf", TemplateKind::Player, Realm::Midgard, 20, 850);
    berserker.abilities = vec![(Ability::DualWield, 4), (Ability::Evade, 2)];
    berserker.equipment.main_hand = Some(Weapon::new("war axe", DamageType::Slash, 40, WeaponHand::OneHanded));
    berserker.equipment.off_hand = Some(OffHand::Weapon(Weapon::new(
        "hand axe",
        DamageType::Slash,
        28,
        WeaponHand::LeftHand,
    )));
    catalog.insert("berserker", berserker);

    let wolf = template(
        "war hound",
        TemplateKind::Pet {
            owner_is_player: true,
        },
        Realm::Albion,
        15,
        400,
    );
    catalog.insert("hound", wolf);

    let mut troll = template("cave troll", TemplateKind::Npc, Realm::None, 22, 1500);
    troll.active_slot = ActiveWeaponSlot::TwoHanded;
    troll.equipment.two_hand = Some(Weapon::new("club", DamageType::Crush, 45, WeaponHand::TwoHanded));
    troll.effects = vec![Effect::AntiPoison];
    catalog.insert("troll", troll);

    catalog
}

fn lookup<'a>(catalog: &'a TemplateCatalog, key: &str) -> Result<&'a LivingTemplate> {
    catalog
        .get(key)
        .with_context(|| format!("template '{key}' missing from catalog"))
}

/// Ids of the spawned combatants.
#[derive(Clone, Copy, Debug)]
pub struct Skirmish {
    pub knight: EntityId,
    pub berserker: EntityId,
    pub hound: EntityId,
    pub troll: EntityId,
}

impl Skirmish {
    pub fn ids(&self) -> [EntityId; 4] {
        [self.knight, self.berserker, self.hound, self.troll]
    }
}

/// Spawns the four combatants facing each other and starts every attack.
pub async fn stage(handle: &CombatHandle, catalog: &TemplateCatalog) -> Result<Skirmish> {
    let knight_template = lookup(catalog, "knight")?;
    let knight = handle
        .spawn(|id| knight_template.instantiate(id, Position::new(1, 0, 0, 0)))
        .await?;

    let berserker_template = lookup(catalog, "berserker")?;
    let berserker = handle
        .spawn(|id| {
            let mut living = berserker_template.instantiate(id, Position::new(1, 0, 120, 0))?;
            // half a turn: facing the knight
            living.heading = 2048;
            Ok(living)
        })
        .await?;

    let hound_template = lookup(catalog, "hound")?;
    let hound = handle
        .spawn(|id| hound_template.instantiate_pet(id, knight, true, Position::new(1, 40, 60, 0)))
        .await?;

    let troll_template = lookup(catalog, "troll")?;
    let troll = handle
        .spawn(|id| troll_template.instantiate(id, Position::new(1, -60, 60, 0)))
        .await?;

    let skirmish = Skirmish {
        knight,
        berserker,
        hound,
        troll,
    };
    for (attacker, target) in [
        (knight, berserker),
        (berserker, knight),
        (hound, berserker),
        (troll, knight),
    ] {
        let started = handle.start_attack(attacker, target).await?;
        info!(target: "arena", %attacker, %target, started, "attack ordered");
    }
    Ok(skirmish)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builtin_catalog_instantiates() {
        let catalog = builtin_catalog();
        assert_eq!(catalog.len(), 4);

        let knight = lookup(&catalog, "knight")
            .unwrap()
            .instantiate(EntityId(1), Position::default())
            .unwrap();
        assert_eq!(knight.base_property(Property::Strength), 85);
        assert!(knight.active_weapon().is_some());

        let hound = lookup(&catalog, "hound")
            .unwrap()
            .instantiate_pet(EntityId(2), EntityId(1), true, Position::default())
            .unwrap();
        assert!(hound.is_player_controlled());
        assert!(lookup(&catalog, "dragon").is_err());
    }

    #[test]
    fn shipped_data_matches_the_builtin_roster() {
        let factory = combat_content::ContentFactory::new(
            std::path::Path::new(env!("CARGO_MANIFEST_DIR")).join("data"),
        );
        let shipped = factory.load_templates().unwrap();
        let builtin = builtin_catalog();
        assert_eq!(
            shipped.keys().collect::<Vec<_>>(),
            builtin.keys().collect::<Vec<_>>()
        );
        for key in builtin.keys() {
            let (a, b) = (lookup(&shipped, key).unwrap(), lookup(&builtin, key).unwrap());
            assert_eq!((&a.name, a.kind, a.realm, a.level), (&b.name, b.kind, b.realm, b.level));
            assert_eq!(a.active_slot, b.active_slot);
        }

        let combat = factory.load_config().unwrap();
        assert_eq!(combat.melee_range, 160);
    }
}
