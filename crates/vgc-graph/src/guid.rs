//! Stable unique identifiers for graph outputs.

use std::fmt;

use rand::Rng;
use serde::de::Error as _;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// A 128-bit unique id, serialized as 32 hex digits.
///
/// Default outputs carry fixed well-known guids; custom outputs get random
/// ones, regenerated on collision.
#[derive(Clone, Copy, Debug, Hash, Eq, PartialEq, Ord, PartialOrd)]
pub struct Guid(pub u128);

impl Guid {
    pub const fn from_u128(v: u128) -> Self {
        Self(v)
    }

    pub fn new_random() -> Self {
        Self(rand::thread_rng().gen())
    }

    pub fn is_valid(&self) -> bool {
        self.0 != 0
    }
}

impl fmt::Display for Guid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:032x}", self.0)
    }
}

impl Serialize for Guid {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_string())
    }
}

impl<'de> Deserialize<'de> for Guid {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let text = String::deserialize(deserializer)?;
        u128::from_str_radix(&text, 16)
            .map(Guid)
            .map_err(|_| D::Error::custom(format!("invalid guid: {text}")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn random_guids_differ() {
        assert_ne!(Guid::new_random(), Guid::new_random());
    }

    #[test]
    fn zero_is_invalid() {
        assert!(!Guid(0).is_valid());
        assert!(Guid(1).is_valid());
    }

    #[test]
    fn json_round_trip() {
        let guid = Guid(0xdead_beef);
        let text = serde_json::to_string(&guid).unwrap();
        let back: Guid = serde_json::from_str(&text).unwrap();
        assert_eq!(guid, back);
    }
}
