//! Character domain enumerations and the `characters` column set.
//!
//! Enumerations are stored as their `SCREAMING_SNAKE_CASE` names. Values the
//! catalog does not know decode as `Unknown` instead of failing the row.

use serde::{Deserialize, Serialize};

/// Defines a closed string enumeration with an `Unknown` fallback.
macro_rules! string_enum {
    (
        $(#[$meta:meta])*
        $name:ident { $($variant:ident => $wire:literal),+ $(,)? }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
        #[serde(rename_all = "SCREAMING_SNAKE_CASE")]
        pub enum $name {
            $($variant,)+
            #[default]
            #[serde(other)]
            Unknown,
        }

        impl $name {
            /// All known variants, `Unknown` excluded.
            pub const ALL: &'static [$name] = &[$($name::$variant),+];

            /// The stored / wire name.
            pub fn as_str(&self) -> &'static str {
                match self {
                    $name::Unknown => "UNKNOWN",
                    $($name::$variant => $wire,)+
                }
            }
        }

        impl From<&str> for $name {
            fn from(s: &str) -> Self {
                match s {
                    $($wire => $name::$variant,)+
                    _ => $name::Unknown,
                }
            }
        }

        impl From<String> for $name {
            fn from(s: String) -> Self {
                $name::from(s.as_str())
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.write_str(self.as_str())
            }
        }
    };
}

string_enum! {
    /// Elemental affinity of a character.
    Element {
        Pyro => "PYRO",
        Hydro => "HYDRO",
        Cryo => "CRYO",
        Electro => "ELECTRO",
        Anemo => "ANEMO",
        Geo => "GEO",
        Dendro => "DENDRO",
    }
}

string_enum! {
    /// Weapon class a character wields.
    WeaponKind {
        Sword => "SWORD",
        Claymore => "CLAYMORE",
        Bow => "BOW",
        Catalyst => "CATALYST",
        Polearm => "POLEARM",
    }
}

string_enum! {
    /// Home region of a character.
    Region {
        Mondstadt => "MONDSTADT",
        Liyue => "LIYUE",
        Inazuma => "INAZUMA",
        Sumeru => "SUMERU",
        Fontaine => "FONTAINE",
        Natlan => "NATLAN",
        Snezhnaya => "SNEZHNAYA",
    }
}

impl Region {
    /// Localized display name. Empty for `Unknown`.
    pub fn display_name(&self) -> &'static str {
        match self {
            Region::Mondstadt => "モンド",
            Region::Liyue => "璃月",
            Region::Inazuma => "稲妻",
            Region::Sumeru => "スメール",
            Region::Fontaine => "フォンテーヌ",
            Region::Natlan => "ナタ",
            Region::Snezhnaya => "スネージナヤ",
            Region::Unknown => "",
        }
    }
}

/// Columns of the `characters` table that filters and orderings may target.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CharacterColumn {
    Name,
    Rarelity,
    Element,
    WeaponKind,
    Region,
    UniqueAbility,
    UniqueAbilityScore,
    Health,
    Attack,
    Defence,
    ElementEnergy,
}

impl CharacterColumn {
    pub fn as_str(&self) -> &'static str {
        match self {
            CharacterColumn::Name => "name",
            CharacterColumn::Rarelity => "rarelity",
            CharacterColumn::Element => "element",
            CharacterColumn::WeaponKind => "weapon_kind",
            CharacterColumn::Region => "region",
            CharacterColumn::UniqueAbility => "unique_ability",
            CharacterColumn::UniqueAbilityScore => "unique_ability_score",
            CharacterColumn::Health => "health",
            CharacterColumn::Attack => "attack",
            CharacterColumn::Defence => "defence",
            CharacterColumn::ElementEnergy => "element_energy",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_known_wire_names() {
        assert_eq!(Element::from("PYRO"), Element::Pyro);
        assert_eq!(WeaponKind::from("POLEARM"), WeaponKind::Polearm);
        assert_eq!(Region::from("SNEZHNAYA"), Region::Snezhnaya);
    }

    #[test]
    fn unrecognized_names_fall_back_to_unknown() {
        assert_eq!(Element::from("pyro"), Element::Unknown);
        assert_eq!(WeaponKind::from(""), WeaponKind::Unknown);
        assert_eq!(Region::from(String::from("KHAENRIAH")), Region::Unknown);
    }

    #[test]
    fn as_str_round_trips_every_variant() {
        for element in Element::ALL {
            assert_eq!(Element::from(element.as_str()), *element);
        }
        for kind in WeaponKind::ALL {
            assert_eq!(WeaponKind::from(kind.as_str()), *kind);
        }
        for region in Region::ALL {
            assert_eq!(Region::from(region.as_str()), *region);
        }
    }

    #[test]
    fn serde_uses_wire_names_and_tolerates_unknown() {
        assert_eq!(serde_json::to_string(&Element::Dendro).unwrap(), "\"DENDRO\"");
        let parsed: WeaponKind = serde_json::from_str("\"BOW\"").unwrap();
        assert_eq!(parsed, WeaponKind::Bow);
        let unknown: Region = serde_json::from_str("\"ATLANTIS\"").unwrap();
        assert_eq!(unknown, Region::Unknown);
    }

    #[test]
    fn region_display_names() {
        assert_eq!(Region::Mondstadt.display_name(), "モンド");
        assert_eq!(Region::Liyue.display_name(), "璃月");
        assert_eq!(Region::Unknown.display_name(), "");
    }

    #[test]
    fn default_is_unknown() {
        assert_eq!(Element::default(), Element::Unknown);
        assert_eq!(Element::Unknown.as_str(), "UNKNOWN");
    }
}
