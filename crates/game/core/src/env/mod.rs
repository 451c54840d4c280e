//! Collaborator traits ("oracles") the combat rules consume.
//!
//! The core never owns a clock, a spatial index, a spell system or a network
//! connection. Each of those is reached through a small trait; the
//! [`CombatEnv`] aggregate bundles them so resolution functions take a single
//! argument. Neutral implementations (`NoStyles`, `NoSpells`, ...) let tests
//! and headless tools run without the full world.
mod presentation;
mod rng;
mod rules;
mod spatial;
mod styles;

pub use presentation::{
    CombatAnimation, MessageChannel, NoSpells, NullPresentation, PresentationSink, ProcSource,
    ProcTrigger, SpellOracle,
};
pub use rng::{RngOracle, SequenceRng, StdRngOracle};
pub use rules::{RuleOracle, StandardRules};
pub use spatial::{GroupOracle, GroupView, NoGroups, NoSpatial, SpatialKind, SpatialOracle};
pub use styles::{FlatStyles, NoStyles, StyleOracle};

use crate::config::CombatConfig;
use crate::state::Living;
use crate::stats::{Property, PropertyOracle};

static STANDARD_RULES: StandardRules = StandardRules;
static NO_STYLES: NoStyles = NoStyles;
static NO_SPATIAL: NoSpatial = NoSpatial;
static NULL_PRESENTATION: NullPresentation = NullPresentation;
static NO_SPELLS: NoSpells = NoSpells;
static NO_GROUPS: NoGroups = NoGroups;

/// Everything a resolution function may consult.
#[derive(Clone, Copy)]
pub struct CombatEnv<'a> {
    pub config: &'a CombatConfig,
    pub properties: &'a dyn PropertyOracle,
    pub rng: &'a dyn RngOracle,
    pub rules: &'a dyn RuleOracle,
    pub styles: &'a dyn StyleOracle,
    pub spatial: &'a dyn SpatialOracle,
    pub presentation: &'a dyn PresentationSink,
    pub spells: &'a dyn SpellOracle,
    pub groups: &'a dyn GroupOracle,
}

impl<'a> CombatEnv<'a> {
    /// Environment with standard rules and neutral collaborators.
    pub fn new(
        config: &'a CombatConfig,
        properties: &'a dyn PropertyOracle,
        rng: &'a dyn RngOracle,
    ) -> Self {
        Self {
            config,
            properties,
            rng,
            rules: &STANDARD_RULES,
            styles: &NO_STYLES,
            spatial: &NO_SPATIAL,
            presentation: &NULL_PRESENTATION,
            spells: &NO_SPELLS,
            groups: &NO_GROUPS,
        }
    }

    pub fn with_rules(mut self, rules: &'a dyn RuleOracle) -> Self {
        self.rules = rules;
        self
    }

    pub fn with_styles(mut self, styles: &'a dyn StyleOracle) -> Self {
        self.styles = styles;
        self
    }

    pub fn with_spatial(mut self, spatial: &'a dyn SpatialOracle) -> Self {
        self.spatial = spatial;
        self
    }

    pub fn with_presentation(mut self, presentation: &'a dyn PresentationSink) -> Self {
        self.presentation = presentation;
        self
    }

    pub fn with_spells(mut self, spells: &'a dyn SpellOracle) -> Self {
        self.spells = spells;
        self
    }

    pub fn with_groups(mut self, groups: &'a dyn GroupOracle) -> Self {
        self.groups = groups;
        self
    }

    /// Shorthand for [`PropertyOracle::modified_value`].
    pub fn prop(&self, living: &Living, property: Property) -> i32 {
        self.properties.modified_value(living, property)
    }
}

impl std::fmt::Debug for CombatEnv<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CombatEnv")
            .field("config", self.config)
            .finish_non_exhaustive()
    }
}
