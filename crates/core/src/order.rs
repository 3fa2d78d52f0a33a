//! Sort order for character searches.

use serde::{Deserialize, Serialize};

use crate::character::CharacterColumn;

/// Sort direction. Unrecognized values decode to `Unknown` and apply no
/// ordering.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum OrderDirection {
    Asc,
    Desc,
    #[serde(other)]
    Unknown,
}

impl OrderDirection {
    pub fn as_sql(&self) -> Option<&'static str> {
        match self {
            OrderDirection::Asc => Some("ASC"),
            OrderDirection::Desc => Some("DESC"),
            OrderDirection::Unknown => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        self.as_sql().unwrap_or("UNKNOWN")
    }
}

impl From<&str> for OrderDirection {
    fn from(s: &str) -> Self {
        match s {
            "ASC" => OrderDirection::Asc,
            "DESC" => OrderDirection::Desc,
            _ => OrderDirection::Unknown,
        }
    }
}

/// A sortable character attribute.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum CharacterOrderField {
    Health,
    Attack,
    Defence,
    ElementEnergy,
    UniqueAbilityScore,
    #[serde(other)]
    Unknown,
}

impl CharacterOrderField {
    /// Column the field sorts by. `None` leaves the store's default order.
    pub fn column(&self) -> Option<CharacterColumn> {
        match self {
            CharacterOrderField::Health => Some(CharacterColumn::Health),
            CharacterOrderField::Attack => Some(CharacterColumn::Attack),
            CharacterOrderField::Defence => Some(CharacterColumn::Defence),
            CharacterOrderField::ElementEnergy => Some(CharacterColumn::ElementEnergy),
            CharacterOrderField::UniqueAbilityScore => Some(CharacterColumn::UniqueAbilityScore),
            CharacterOrderField::Unknown => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            CharacterOrderField::Health => "HEALTH",
            CharacterOrderField::Attack => "ATTACK",
            CharacterOrderField::Defence => "DEFENCE",
            CharacterOrderField::ElementEnergy => "ELEMENT_ENERGY",
            CharacterOrderField::UniqueAbilityScore => "UNIQUE_ABILITY_SCORE",
            CharacterOrderField::Unknown => "UNKNOWN",
        }
    }
}

impl From<&str> for CharacterOrderField {
    fn from(s: &str) -> Self {
        match s {
            "HEALTH" => CharacterOrderField::Health,
            "ATTACK" => CharacterOrderField::Attack,
            "DEFENCE" => CharacterOrderField::Defence,
            "ELEMENT_ENERGY" => CharacterOrderField::ElementEnergy,
            "UNIQUE_ABILITY_SCORE" => CharacterOrderField::UniqueAbilityScore,
            _ => CharacterOrderField::Unknown,
        }
    }
}

/// A complete ordering: field and direction always travel together.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Order {
    pub field: CharacterOrderField,
    pub direction: OrderDirection,
}

impl Order {
    pub fn new(field: CharacterOrderField, direction: OrderDirection) -> Self {
        Self { field, direction }
    }

    /// `(column, "ASC" | "DESC")` to sort by, or `None` when either half is
    /// unrecognized.
    pub fn clause(&self) -> Option<(CharacterColumn, &'static str)> {
        Some((self.field.column()?, self.direction.as_sql()?))
    }
}
