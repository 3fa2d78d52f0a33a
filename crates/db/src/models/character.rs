//! Character row model.

use serde::Serialize;
use sqlx::FromRow;
use teyvat_core::character::{Element, Region, WeaponKind};
use teyvat_core::types::DbId;

/// A row from the `characters` table.
#[derive(Debug, Clone, PartialEq, FromRow, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Character {
    pub id: DbId,
    /// Unique across the table.
    pub name: String,
    pub rarelity: i32,
    #[sqlx(try_from = "String")]
    pub element: Element,
    pub health: i32,
    pub attack: i32,
    pub defence: i32,
    #[sqlx(flatten)]
    pub unique_ability: UniqueAbility,
    pub element_energy: i32,
    #[sqlx(try_from = "String")]
    pub region: Region,
    #[sqlx(try_from = "String")]
    pub weapon_kind: WeaponKind,
}

/// The character's signature stat bonus.
#[derive(Debug, Clone, PartialEq, FromRow, Serialize)]
pub struct UniqueAbility {
    #[sqlx(rename = "unique_ability")]
    pub kind: String,
    /// Percentages are stored normalized to `[0, 1]`.
    #[sqlx(rename = "unique_ability_score")]
    pub score: f64,
}
