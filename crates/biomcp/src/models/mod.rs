//! Shared model helpers.
//!
//! Upstream APIs use SCREAMING_SNAKE codes for their enumerations. The
//! [`api_enum!`] macro declares such an enum once and derives the string
//! round-trip, `Display`, `FromStr` and serde impls from the same table.
//! Parsing is case-insensitive and treats spaces as underscores, so
//! `"early phase1"` reads as `EARLY_PHASE1`.

mod inputs;

pub use inputs::{
    ArticleDetailsInput, ArticleSearchInput, TrialDetailInput, TrialSearchInput,
    VariantDetailsInput, VariantSearchInput,
};

use serde::{Deserialize, Deserializer};

/// Normalize a user-supplied choice for comparison with an enum code.
#[must_use]
pub fn normalize_choice(raw: &str) -> String {
    raw.trim().to_lowercase().replace(' ', "_")
}

/// Format a float the way upstream query syntax expects: integral values keep
/// one decimal (`40.0`), others use the shortest exact form (`-74.006`).
#[must_use]
pub fn decimal(value: f64) -> String {
    if value.is_finite() && value.fract() == 0.0 {
        format!("{value:.1}")
    } else {
        value.to_string()
    }
}

/// Declare a string-coded enum.
///
/// ```ignore
/// api_enum! {
///     /// Trial phase.
///     pub enum TrialPhase {
///         Phase1 => "PHASE1",
///         Phase2 => "PHASE2",
///     }
/// }
/// ```
macro_rules! api_enum {
    (
        $(#[$meta:meta])*
        $vis:vis enum $name:ident {
            $( $(#[$vmeta:meta])* $variant:ident => $code:literal ),+ $(,)?
        }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
        $vis enum $name {
            $( $(#[$vmeta])* $variant ),+
        }

        impl $name {
            /// Every variant, in declaration order.
            pub const ALL: &'static [Self] = &[$(Self::$variant),+];

            /// Upstream code for this variant.
            #[must_use]
            pub const fn as_str(self) -> &'static str {
                match self {
                    $(Self::$variant => $code),+
                }
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl std::str::FromStr for $name {
            type Err = String;

            fn from_str(raw: &str) -> Result<Self, Self::Err> {
                let wanted = $crate::models::normalize_choice(raw);
                Self::ALL
                    .iter()
                    .copied()
                    .find(|v| $crate::models::normalize_choice(v.as_str()) == wanted)
                    .ok_or_else(|| {
                        let choices: Vec<&str> = Self::ALL.iter().map(|v| v.as_str()).collect();
                        format!(
                            "invalid {} '{}', expected one of: {}",
                            stringify!($name),
                            raw,
                            choices.join(", ")
                        )
                    })
            }
        }

        impl serde::Serialize for $name {
            fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
                serializer.serialize_str(self.as_str())
            }
        }

        impl<'de> serde::Deserialize<'de> for $name {
            fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
                let raw = <String as serde::Deserialize>::deserialize(deserializer)?;
                raw.parse().map_err(serde::de::Error::custom)
            }
        }
    };
}

pub(crate) use api_enum;

/// Accept `null`, a single string, or a list of strings.
#[derive(Deserialize)]
#[serde(untagged)]
enum OneOrMany {
    One(String),
    Many(Vec<String>),
}

/// Deserialize a list field that callers may pass as a bare string.
pub fn string_list<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Option::<OneOrMany>::deserialize(deserializer)? {
        None => Vec::new(),
        Some(OneOrMany::One(value)) => vec![value],
        Some(OneOrMany::Many(values)) => values,
    })
}
