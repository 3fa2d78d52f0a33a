//! Character filter model: comparison criteria and the predicates they
//! produce.
//!
//! Predicates here are plain values. The database layer renders them into
//! parameterized SQL; nothing in this module touches a query builder.

use serde::{Deserialize, Serialize};

use crate::character::{CharacterColumn, Element, Region, WeaponKind};
use crate::numeric::Numeric;
use crate::wire::empty_as_none;

// ---------------------------------------------------------------------------
// Operators
// ---------------------------------------------------------------------------

/// Comparison operator as received from the API.
///
/// Unrecognized wire values decode to `Unknown`, which never produces a
/// predicate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum ComparisonOperator {
    Eq,
    Lt,
    Lte,
    Gt,
    Gte,
    #[serde(other)]
    Unknown,
}

impl ComparisonOperator {
    /// The SQL comparison primitive, or `None` for `Unknown`.
    pub fn comparison(&self) -> Option<Comparison> {
        match self {
            ComparisonOperator::Eq => Some(Comparison::Eq),
            ComparisonOperator::Lt => Some(Comparison::Lt),
            ComparisonOperator::Lte => Some(Comparison::Lte),
            ComparisonOperator::Gt => Some(Comparison::Gt),
            ComparisonOperator::Gte => Some(Comparison::Gte),
            ComparisonOperator::Unknown => None,
        }
    }
}

impl From<&str> for ComparisonOperator {
    fn from(s: &str) -> Self {
        match s {
            "EQ" => ComparisonOperator::Eq,
            "LT" => ComparisonOperator::Lt,
            "LTE" => ComparisonOperator::Lte,
            "GT" => ComparisonOperator::Gt,
            "GTE" => ComparisonOperator::Gte,
            _ => ComparisonOperator::Unknown,
        }
    }
}

/// A comparison primitive the store understands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Comparison {
    Eq,
    Lt,
    Lte,
    Gt,
    Gte,
}

impl Comparison {
    pub fn as_sql(&self) -> &'static str {
        match self {
            Comparison::Eq => "=",
            Comparison::Lt => "<",
            Comparison::Lte => "<=",
            Comparison::Gt => ">",
            Comparison::Gte => ">=",
        }
    }
}

// ---------------------------------------------------------------------------
// Predicates
// ---------------------------------------------------------------------------

/// Right-hand side of a rendered predicate.
#[derive(Debug, Clone, PartialEq)]
pub enum Operand {
    Text(String),
    Int(i64),
    Numeric(Numeric),
}

/// One `column <op> operand` clause. A filter yields a list of these,
/// combined conjunctively.
#[derive(Debug, Clone, PartialEq)]
pub struct Predicate {
    pub column: CharacterColumn,
    pub comparison: Comparison,
    pub operand: Operand,
}

impl Predicate {
    fn eq(column: CharacterColumn, operand: Operand) -> Self {
        Self {
            column,
            comparison: Comparison::Eq,
            operand,
        }
    }
}

// ---------------------------------------------------------------------------
// Criteria
// ---------------------------------------------------------------------------

/// Range or equality test against a numeric column.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ComparisonCriterion {
    pub op: ComparisonOperator,
    pub value: Option<Numeric>,
}

impl ComparisonCriterion {
    pub fn new(op: ComparisonOperator, value: impl Into<Numeric>) -> Self {
        Self {
            op,
            value: Some(value.into()),
        }
    }

    /// The predicate this criterion applies to `column`.
    ///
    /// Returns `None` when there is no operand, when the operand is
    /// [`Numeric::Unknown`], or when the operator is unrecognized. An
    /// unusable criterion is skipped rather than failing the search.
    pub fn to_predicate(&self, column: CharacterColumn) -> Option<Predicate> {
        let value = self.value.filter(Numeric::is_known)?;
        let comparison = self.op.comparison()?;
        Some(Predicate {
            column,
            comparison,
            operand: Operand::Numeric(value),
        })
    }
}

/// Optional filters over the character catalog.
///
/// Enum filters decode `""` as "not provided"; an explicit `"UNKNOWN"` (or
/// any unrecognized name) filters for rows stored as `UNKNOWN`. An empty
/// `unique_ability_kind` and `rarelity == 0` also mean "not provided", so a
/// caller cannot ask for those values explicitly.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CharacterFilterCriteria {
    #[serde(deserialize_with = "empty_as_none")]
    pub element: Option<Element>,
    #[serde(deserialize_with = "empty_as_none")]
    pub weapon_kind: Option<WeaponKind>,
    #[serde(deserialize_with = "empty_as_none")]
    pub region: Option<Region>,
    pub unique_ability_kind: String,
    pub rarelity: i32,
    pub health: Option<ComparisonCriterion>,
    pub attack: Option<ComparisonCriterion>,
    pub defence: Option<ComparisonCriterion>,
    pub element_energy: Option<ComparisonCriterion>,
    pub unique_ability_score: Option<ComparisonCriterion>,
}

impl CharacterFilterCriteria {
    /// Every predicate the present filters contribute, in a stable order.
    pub fn predicates(&self) -> Vec<Predicate> {
        let mut predicates = Vec::new();

        if let Some(element) = self.element {
            predicates.push(Predicate::eq(
                CharacterColumn::Element,
                Operand::Text(element.as_str().to_string()),
            ));
        }
        if let Some(region) = self.region {
            predicates.push(Predicate::eq(
                CharacterColumn::Region,
                Operand::Text(region.as_str().to_string()),
            ));
        }
        if !self.unique_ability_kind.is_empty() {
            predicates.push(Predicate::eq(
                CharacterColumn::UniqueAbility,
                Operand::Text(self.unique_ability_kind.clone()),
            ));
        }
        if let Some(weapon_kind) = self.weapon_kind {
            predicates.push(Predicate::eq(
                CharacterColumn::WeaponKind,
                Operand::Text(weapon_kind.as_str().to_string()),
            ));
        }
        if self.rarelity != 0 {
            predicates.push(Predicate::eq(
                CharacterColumn::Rarelity,
                Operand::Int(self.rarelity.into()),
            ));
        }

        let ranges = [
            (&self.health, CharacterColumn::Health),
            (&self.attack, CharacterColumn::Attack),
            (&self.defence, CharacterColumn::Defence),
            (&self.element_energy, CharacterColumn::ElementEnergy),
            (&self.unique_ability_score, CharacterColumn::UniqueAbilityScore),
        ];
        predicates.extend(
            ranges
                .into_iter()
                .filter_map(|(criterion, column)| criterion.as_ref()?.to_predicate(column)),
        );

        predicates
    }
}
