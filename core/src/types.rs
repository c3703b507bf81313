use parity_scale_codec::{Decode, Encode};
use scale_info::TypeInfo;
use serde::{Deserialize, Serialize};

/// Fixed-point fraction: `BPS` (10_000) is 1.0.
pub type Bps = i32;

/// One whole in basis points.
pub const BPS: Bps = 10_000;

/// Resource meter ceiling; reaching it enables the ultimate.
pub const RAGE_MAX: i32 = 100;

/// Lane slot index, 1..=9 on each side.
pub type Slot = u8;

/// Multiply `value` by a basis-point fraction, flooring the result.
pub fn apply_bps(value: i32, bps: Bps) -> i32 {
    let scaled = (value as i64 * bps as i64).div_euclid(BPS as i64);
    scaled.clamp(i32::MIN as i64, i32::MAX as i64) as i32
}

/// Compose two basis-point multipliers.
pub fn mul_bps(a: Bps, b: Bps) -> Bps {
    apply_bps(a, b)
}

/// Identifier of a catalog archetype
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Encode,
    Decode,
    TypeInfo,
    Serialize,
    Deserialize,
)]
#[serde(transparent)]
pub struct ArchetypeId(pub u32);

/// Identifier of a live unit instance
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Encode,
    Decode,
    TypeInfo,
    Serialize,
    Deserialize,
)]
#[serde(transparent)]
pub struct InstanceId(pub u32);

#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Encode,
    Decode,
    TypeInfo,
    Serialize,
    Deserialize,
)]
#[serde(rename_all = "camelCase")]
pub enum Side {
    Ally,
    Enemy,
}

impl Side {
    pub fn opponent(self) -> Side {
        match self {
            Side::Ally => Side::Enemy,
            Side::Enemy => Side::Ally,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Side::Ally => "ally",
            Side::Enemy => "enemy",
        }
    }
}

/// A pair of values, one per side.
#[derive(Debug, Clone, Default, PartialEq, Eq, Encode, Decode, TypeInfo, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Sides<T> {
    pub ally: T,
    pub enemy: T,
}

impl<T> Sides<T> {
    pub fn new(ally: T, enemy: T) -> Self {
        Self { ally, enemy }
    }

    pub fn get(&self, side: Side) -> &T {
        match side {
            Side::Ally => &self.ally,
            Side::Enemy => &self.enemy,
        }
    }

    pub fn get_mut(&mut self, side: Side) -> &mut T {
        match side {
            Side::Ally => &mut self.ally,
            Side::Enemy => &mut self.enemy,
        }
    }
}

/// Grid coordinate. Column `x` runs 0..7 from the ally edge, row `y` 0..3.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Encode,
    Decode,
    TypeInfo,
    Serialize,
    Deserialize,
)]
pub struct Cell {
    pub x: i32,
    pub y: i32,
}

impl Cell {
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Encode, Decode, TypeInfo, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum DamageType {
    Physical,
    Arcane,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Encode, Decode, TypeInfo, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum AttackType {
    Basic,
    Ability,
}

/// Derived combat stats. `armor` and `resist` are mitigation fractions in bps.
#[derive(Debug, Clone, PartialEq, Eq, Encode, Decode, TypeInfo, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Stats {
    pub hp_max: i32,
    pub attack: i32,
    pub will: i32,
    pub armor: Bps,
    pub resist: Bps,
    pub agility: i32,
    pub perception: i32,
    pub speed: i32,
}

impl Stats {
    pub fn new(hp_max: i32, attack: i32, will: i32) -> Self {
        Self {
            hp_max,
            attack,
            will,
            armor: 0,
            resist: 0,
            agility: 0,
            perception: 0,
            speed: 0,
        }
    }

    pub fn with_defense(mut self, armor: Bps, resist: Bps) -> Self {
        self.armor = armor;
        self.resist = resist;
        self
    }

    /// Defensive stat relevant to a damage type
    pub fn defense(&self, dtype: DamageType) -> Bps {
        match dtype {
            DamageType::Physical => self.armor,
            DamageType::Arcane => self.resist,
        }
    }

    /// Offensive stat relevant to a damage type
    pub fn power(&self, dtype: DamageType) -> i32 {
        match dtype {
            DamageType::Physical => self.attack,
            DamageType::Arcane => self.will,
        }
    }
}
