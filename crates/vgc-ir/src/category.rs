//! Pin data categories and runtime values.

use std::fmt;

use serde::{Deserialize, Serialize};

/// The data category carried by a pin or output.
///
/// Connections are only legal between pins of equal category. `Seed` pins
/// are resolved at compile time and never appear in executable steps.
#[derive(Clone, Copy, Debug, Hash, Eq, PartialEq, Serialize, Deserialize)]
pub enum DataCategory {
    Float,
    Int,
    Bool,
    Color,
    Material,
    Seed,
}

impl fmt::Display for DataCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Float => "Float",
            Self::Int => "Int",
            Self::Bool => "Bool",
            Self::Color => "Color",
            Self::Material => "Material",
            Self::Seed => "Seed",
        })
    }
}

/// A runtime value flowing through the variable buffer.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Value {
    Float(f32),
    Int(i32),
    Bool(bool),
    Color([f32; 4]),
    /// A material index. The richer material model lives in the runtime
    /// consumer; the compiler only carries the index through.
    Material(f32),
    Seed(i32),
}

impl Value {
    /// The category this value belongs to.
    pub fn category(&self) -> DataCategory {
        match self {
            Self::Float(_) => DataCategory::Float,
            Self::Int(_) => DataCategory::Int,
            Self::Bool(_) => DataCategory::Bool,
            Self::Color(_) => DataCategory::Color,
            Self::Material(_) => DataCategory::Material,
            Self::Seed(_) => DataCategory::Seed,
        }
    }

    /// A zero-like default for a category, used to pre-fill variable buffers.
    pub fn zero(category: DataCategory) -> Self {
        match category {
            DataCategory::Float => Self::Float(0.0),
            DataCategory::Int => Self::Int(0),
            DataCategory::Bool => Self::Bool(false),
            DataCategory::Color => Self::Color([0.0; 4]),
            DataCategory::Material => Self::Material(0.0),
            DataCategory::Seed => Self::Seed(0),
        }
    }

    /// Extracts a float, or `None` for other categories.
    pub fn as_float(&self) -> Option<f32> {
        match *self {
            Self::Float(v) | Self::Material(v) => Some(v),
            _ => None,
        }
    }

    /// Extracts an int, or `None` for other categories.
    pub fn as_int(&self) -> Option<i32> {
        match *self {
            Self::Int(v) => Some(v),
            _ => None,
        }
    }

    /// Extracts a bool, or `None` for other categories.
    pub fn as_bool(&self) -> Option<bool> {
        match *self {
            Self::Bool(v) => Some(v),
            _ => None,
        }
    }

    /// Extracts a seed, or `None` for other categories.
    pub fn as_seed(&self) -> Option<i32> {
        match *self {
            Self::Seed(v) => Some(v),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn value_categories() {
        assert_eq!(Value::Float(1.0).category(), DataCategory::Float);
        assert_eq!(Value::Seed(3).category(), DataCategory::Seed);
        assert_eq!(Value::Bool(true).category(), DataCategory::Bool);
    }

    #[test]
    fn zero_matches_category() {
        for cat in [
            DataCategory::Float,
            DataCategory::Int,
            DataCategory::Bool,
            DataCategory::Color,
            DataCategory::Material,
            DataCategory::Seed,
        ] {
            assert_eq!(Value::zero(cat).category(), cat);
        }
    }

    #[test]
    fn category_display() {
        assert_eq!(DataCategory::Float.to_string(), "Float");
        assert_eq!(DataCategory::Seed.to_string(), "Seed");
    }
}
