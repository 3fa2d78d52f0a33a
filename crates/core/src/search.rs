//! Arguments for a character search and their validation.

use std::fmt;

use serde::Deserialize;

use crate::filter::CharacterFilterCriteria;
use crate::order::{CharacterOrderField, Order, OrderDirection};
use crate::wire::empty_as_none;

/// A single problem found in [`SearchArgs`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum SearchArgsError {
    #[error("order direction is required when an order field is given")]
    InvalidOrderDirection,

    #[error("order field is required when an order direction is given")]
    InvalidCharacterOrderField,

    #[error("limit must be greater than zero")]
    InvalidLimit,
}

/// Every violation found by [`SearchArgs::validate`]. Never empty.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationErrors(Vec<SearchArgsError>);

impl ValidationErrors {
    pub fn errors(&self) -> &[SearchArgsError] {
        &self.0
    }

    pub fn contains(&self, error: SearchArgsError) -> bool {
        self.0.contains(&error)
    }
}

impl fmt::Display for ValidationErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, error) in self.0.iter().enumerate() {
            if i > 0 {
                f.write_str("; ")?;
            }
            write!(f, "{error}")?;
        }
        Ok(())
    }
}

impl std::error::Error for ValidationErrors {}

/// Page size, ordering and filters for one search call.
///
/// The two order halves are kept apart so a request carrying only one of
/// them can be reported instead of silently ignored. On the wire an empty
/// string leaves a half unset.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SearchArgs {
    pub limit: u32,
    #[serde(deserialize_with = "empty_as_none")]
    pub order_field: Option<CharacterOrderField>,
    #[serde(deserialize_with = "empty_as_none")]
    pub order_direction: Option<OrderDirection>,
    pub criteria: Option<CharacterFilterCriteria>,
}

impl SearchArgs {
    pub fn new(limit: u32) -> Self {
        Self {
            limit,
            ..Default::default()
        }
    }

    pub fn with_order(mut self, field: CharacterOrderField, direction: OrderDirection) -> Self {
        self.order_field = Some(field);
        self.order_direction = Some(direction);
        self
    }

    pub fn with_criteria(mut self, criteria: CharacterFilterCriteria) -> Self {
        self.criteria = Some(criteria);
        self
    }

    /// The ordering when both halves are present.
    pub fn order(&self) -> Option<Order> {
        Some(Order::new(self.order_field?, self.order_direction?))
    }

    /// Check every rule and report all violations together.
    pub fn validate(&self) -> Result<(), ValidationErrors> {
        let mut errors = Vec::new();

        match (self.order_field, self.order_direction) {
            (Some(_), None) => errors.push(SearchArgsError::InvalidOrderDirection),
            (None, Some(_)) => errors.push(SearchArgsError::InvalidCharacterOrderField),
            _ => {}
        }
        if self.limit == 0 {
            errors.push(SearchArgsError::InvalidLimit);
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(ValidationErrors(errors))
        }
    }

    /// Order field name for logging, empty when unset.
    pub fn order_field_name(&self) -> &'static str {
        self.order_field.map_or("", |f| f.as_str())
    }

    /// Order direction name for logging, empty when unset.
    pub fn order_direction_name(&self) -> &'static str {
        self.order_direction.map_or("", |d| d.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;

    #[test]
    fn zero_limit_without_order_reports_only_limit() {
        let err = SearchArgs::new(0).validate().unwrap_err();
        assert_eq!(err.errors(), &[SearchArgsError::InvalidLimit]);
    }

    #[test]
    fn field_without_direction_reports_direction() {
        let args = SearchArgs {
            limit: 5,
            order_field: Some(CharacterOrderField::from("HEALTH")),
            ..Default::default()
        };
        let err = args.validate().unwrap_err();
        assert_eq!(err.errors(), &[SearchArgsError::InvalidOrderDirection]);
    }

    #[test]
    fn direction_without_field_reports_field() {
        let args = SearchArgs {
            limit: 5,
            order_direction: Some(OrderDirection::Asc),
            ..Default::default()
        };
        let err = args.validate().unwrap_err();
        assert_eq!(err.errors(), &[SearchArgsError::InvalidCharacterOrderField]);
    }

    #[test]
    fn all_violations_are_collected() {
        let args = SearchArgs {
            limit: 0,
            order_direction: Some(OrderDirection::Desc),
            ..Default::default()
        };
        let err = args.validate().unwrap_err();
        assert!(err.contains(SearchArgsError::InvalidCharacterOrderField));
        assert!(err.contains(SearchArgsError::InvalidLimit));
        assert_eq!(err.errors().len(), 2);
        assert_eq!(
            err.to_string(),
            "order field is required when an order direction is given; \
             limit must be greater than zero"
        );
    }

    #[test]
    fn complete_order_is_valid() {
        let args = SearchArgs::new(10)
            .with_order(CharacterOrderField::Attack, OrderDirection::Desc)
            .with_criteria(CharacterFilterCriteria::default());
        assert_matches!(args.validate(), Ok(()));
        assert_eq!(
            args.order(),
            Some(Order::new(CharacterOrderField::Attack, OrderDirection::Desc))
        );
    }

    #[test]
    fn unknown_order_halves_still_count_as_present() {
        let args = SearchArgs::new(1).with_order(CharacterOrderField::Unknown, OrderDirection::Asc);
        assert_matches!(args.validate(), Ok(()));
        assert_eq!(args.order().and_then(|o| o.clause()), None);
    }

    #[test]
    fn log_names_are_empty_when_unset() {
        let args = SearchArgs::new(3);
        assert_eq!(args.order_field_name(), "");
        assert_eq!(args.order_direction_name(), "");
        let args = args.with_order(CharacterOrderField::Health, OrderDirection::Asc);
        assert_eq!(args.order_field_name(), "HEALTH");
        assert_eq!(args.order_direction_name(), "ASC");
    }

    #[test]
    fn deserializes_from_camel_case() {
        let args: SearchArgs = serde_json::from_value(serde_json::json!({
            "limit": 20,
            "orderField": "DEFENCE",
            "orderDirection": "ASC",
            "criteria": { "region": "LIYUE" }
        }))
        .unwrap();
        assert_eq!(args.limit, 20);
        assert_eq!(
            args.order(),
            Some(Order::new(CharacterOrderField::Defence, OrderDirection::Asc))
        );
        assert_eq!(
            args.criteria.and_then(|c| c.region),
            Some(crate::character::Region::Liyue)
        );
    }

    #[test]
    fn empty_wire_order_halves_are_unset() {
        let args: SearchArgs = serde_json::from_value(serde_json::json!({
            "limit": 0,
            "orderField": "",
            "orderDirection": ""
        }))
        .unwrap();
        assert_eq!(args.order_field, None);
        assert_eq!(args.order_direction, None);
        assert_eq!(args.validate().unwrap_err().errors(), &[SearchArgsError::InvalidLimit]);

        let args: SearchArgs = serde_json::from_value(serde_json::json!({
            "limit": 5,
            "orderField": "HEALTH",
            "orderDirection": ""
        }))
        .unwrap();
        assert_eq!(args.order_field, Some(CharacterOrderField::Health));
        assert_eq!(args.order_direction, None);
        assert_eq!(
            args.validate().unwrap_err().errors(),
            &[SearchArgsError::InvalidOrderDirection]
        );
    }

    #[test]
    fn unrecognized_wire_order_half_still_counts_as_present() {
        let args: SearchArgs = serde_json::from_value(serde_json::json!({
            "limit": 5,
            "orderField": "NAME",
            "orderDirection": "ASC"
        }))
        .unwrap();
        assert_eq!(args.order_field, Some(CharacterOrderField::Unknown));
        assert_matches!(args.validate(), Ok(()));
    }
}
