//! The closed node-kind enumeration.
//!
//! Every node in an authored or compilation graph is one of these kinds.
//! A kind statically declares its pin signatures; evaluation, interval
//! transfer, and C++ emission dispatch over it by `match` (see `eval`,
//! `range`, and `cpp`), so adding a kind is a compile-checked change in a
//! handful of places rather than a new subclass.

use serde::{Deserialize, Serialize};

use crate::category::DataCategory;

/// Binary float operators.
#[derive(Clone, Copy, Debug, Hash, Eq, PartialEq, Serialize, Deserialize)]
pub enum BinaryOp {
    Add,
    Subtract,
    Multiply,
    Divide,
    Min,
    Max,
    Pow,
}

/// Unary float operators.
#[derive(Clone, Copy, Debug, Hash, Eq, PartialEq, Serialize, Deserialize)]
pub enum UnaryOp {
    Negate,
    Abs,
    Sqrt,
    Floor,
    Ceil,
    Sin,
    Cos,
    OneMinus,
}

/// Float comparison operators producing Bool.
#[derive(Clone, Copy, Debug, Hash, Eq, PartialEq, Serialize, Deserialize)]
pub enum CompareOp {
    Less,
    LessEqual,
    Greater,
    GreaterEqual,
}

/// The noise algorithm a [`NodeKind::Noise`] node samples.
#[derive(Clone, Copy, Debug, Hash, Eq, PartialEq, Serialize, Deserialize)]
pub enum NoiseAlgorithm {
    Perlin,
    Simplex,
    Cellular,
    ValueCubic,
}

/// Parameters of a noise node.
///
/// `resolved_seed` is filled in by lowering once the seed input chain has
/// been folded to a constant; authored graphs leave it `None`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct NoiseParams {
    pub algorithm: NoiseAlgorithm,
    pub frequency: f32,
    pub amplitude: f32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub resolved_seed: Option<i32>,
}

/// Signature of one input or output pin.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PinSignature {
    pub name: &'static str,
    pub category: DataCategory,
}

const fn pin(name: &'static str, category: DataCategory) -> PinSignature {
    PinSignature { name, category }
}

/// One computation kind with its compile-time parameters.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum NodeKind {
    /// Sample-position coordinates.
    X,
    Y,
    Z,

    Constant(f32),
    IntConstant(i32),
    BoolConstant(bool),
    ColorConstant([f32; 4]),
    SeedConstant(i32),

    Binary(BinaryOp),
    Unary(UnaryOp),
    /// `clamp(Input, Min, Max)`, identical to `min(max(Input, Min), Max)`.
    Clamp,
    /// `A + (B - A) * Alpha`.
    Lerp,
    /// Picks `True` or `False` from a Bool condition.
    Select,
    Compare(CompareOp),

    Noise(NoiseParams),

    /// Mixes two seeds into one.
    CombineSeeds,
    /// Rounds a float to the nearest int.
    RoundToInt,
    IntToFloat,
    /// Wraps a float index into the material channel.
    FlattenMaterial,

    /// Cycle-breaking seed relay: its feedback input is not a data
    /// dependency and is severed before lowering.
    SeedRelay { name: String, default_seed: i32 },

    /// Reference to a named macro graph; inlined away before analysis.
    Macro { name: String },
    /// Placeholder inside a macro graph for the caller's i-th input.
    MacroInput { index: u32, category: DataCategory },
    /// Placeholder inside a macro graph for the macro's i-th output.
    MacroOutput { index: u32, category: DataCategory },

    /// Names a value so `LocalVariableUsage` nodes can reference it
    /// without drawing a wire; collapsed to direct edges by a pass.
    LocalVariableDeclaration { name: String, category: DataCategory },
    LocalVariableUsage { name: String, category: DataCategory },

    /// Terminal feeding a graph output.
    Output { index: u32, category: DataCategory },
}

impl NodeKind {
    /// Display name used in diagnostics and dumps.
    pub fn name(&self) -> &'static str {
        match self {
            Self::X => "X",
            Self::Y => "Y",
            Self::Z => "Z",
            Self::Constant(_) => "Constant",
            Self::IntConstant(_) => "IntConstant",
            Self::BoolConstant(_) => "BoolConstant",
            Self::ColorConstant(_) => "ColorConstant",
            Self::SeedConstant(_) => "SeedConstant",
            Self::Binary(op) => match op {
                BinaryOp::Add => "Add",
                BinaryOp::Subtract => "Subtract",
                BinaryOp::Multiply => "Multiply",
                BinaryOp::Divide => "Divide",
                BinaryOp::Min => "Min",
                BinaryOp::Max => "Max",
                BinaryOp::Pow => "Pow",
            },
            Self::Unary(op) => match op {
                UnaryOp::Negate => "Negate",
                UnaryOp::Abs => "Abs",
                UnaryOp::Sqrt => "Sqrt",
                UnaryOp::Floor => "Floor",
                UnaryOp::Ceil => "Ceil",
                UnaryOp::Sin => "Sin",
                UnaryOp::Cos => "Cos",
                UnaryOp::OneMinus => "OneMinus",
            },
            Self::Clamp => "Clamp",
            Self::Lerp => "Lerp",
            Self::Select => "Select",
            Self::Compare(op) => match op {
                CompareOp::Less => "Less",
                CompareOp::LessEqual => "LessEqual",
                CompareOp::Greater => "Greater",
                CompareOp::GreaterEqual => "GreaterEqual",
            },
            Self::Noise(_) => "Noise",
            Self::CombineSeeds => "CombineSeeds",
            Self::RoundToInt => "RoundToInt",
            Self::IntToFloat => "IntToFloat",
            Self::FlattenMaterial => "FlattenMaterial",
            Self::SeedRelay { .. } => "SeedRelay",
            Self::Macro { .. } => "Macro",
            Self::MacroInput { .. } => "MacroInput",
            Self::MacroOutput { .. } => "MacroOutput",
            Self::LocalVariableDeclaration { .. } => "LocalVariableDeclaration",
            Self::LocalVariableUsage { .. } => "LocalVariableUsage",
            Self::Output { .. } => "Output",
        }
    }

    /// Input pin signatures.
    ///
    /// `Macro` reports no pins here; its arity comes from the referenced
    /// macro graph and is resolved by the graph layer.
    pub fn input_pins(&self) -> Vec<PinSignature> {
        use DataCategory::*;
        match self {
            Self::X
            | Self::Y
            | Self::Z
            | Self::Constant(_)
            | Self::IntConstant(_)
            | Self::BoolConstant(_)
            | Self::ColorConstant(_)
            | Self::SeedConstant(_)
            | Self::Macro { .. }
            | Self::MacroInput { .. }
            | Self::LocalVariableUsage { .. } => vec![],

            Self::Binary(_) => vec![pin("A", Float), pin("B", Float)],
            Self::Unary(_) => vec![pin("Input", Float)],
            Self::Clamp => vec![pin("Input", Float), pin("Min", Float), pin("Max", Float)],
            Self::Lerp => vec![pin("A", Float), pin("B", Float), pin("Alpha", Float)],
            Self::Select => vec![pin("Condition", Bool), pin("True", Float), pin("False", Float)],
            Self::Compare(_) => vec![pin("A", Float), pin("B", Float)],
            Self::Noise(_) => vec![
                pin("X", Float),
                pin("Y", Float),
                pin("Z", Float),
                pin("Seed", Seed),
            ],
            Self::CombineSeeds => vec![pin("A", Seed), pin("B", Seed)],
            Self::RoundToInt => vec![pin("Input", Float)],
            Self::IntToFloat => vec![pin("Input", Int)],
            Self::FlattenMaterial => vec![pin("Index", Float)],
            Self::SeedRelay { .. } => vec![pin("Seed", Seed)],
            Self::MacroOutput { category, .. } => vec![pin("Input", *category)],
            Self::LocalVariableDeclaration { category, .. } => vec![pin("Input", *category)],
            Self::Output { category, .. } => vec![pin("Input", *category)],
        }
    }

    /// Output pin signatures.
    pub fn output_pins(&self) -> Vec<PinSignature> {
        use DataCategory::*;
        match self {
            Self::X | Self::Y | Self::Z => vec![pin("Value", Float)],
            Self::Constant(_) => vec![pin("Value", Float)],
            Self::IntConstant(_) => vec![pin("Value", Int)],
            Self::BoolConstant(_) => vec![pin("Value", Bool)],
            Self::ColorConstant(_) => vec![pin("Value", Color)],
            Self::SeedConstant(_) => vec![pin("Seed", Seed)],
            Self::Binary(_) | Self::Unary(_) | Self::Clamp | Self::Lerp | Self::Select => {
                vec![pin("Result", Float)]
            }
            Self::Compare(_) => vec![pin("Result", Bool)],
            Self::Noise(_) => vec![pin("Value", Float)],
            Self::CombineSeeds => vec![pin("Seed", Seed)],
            Self::RoundToInt => vec![pin("Result", Int)],
            Self::IntToFloat => vec![pin("Result", Float)],
            Self::FlattenMaterial => vec![pin("Material", Material)],
            Self::SeedRelay { .. } => vec![pin("Seed", Seed)],
            Self::Macro { .. } => vec![],
            Self::MacroInput { category, .. } => vec![pin("Value", *category)],
            Self::MacroOutput { category, .. } => vec![pin("Value", *category)],
            Self::LocalVariableDeclaration { .. } => vec![],
            Self::LocalVariableUsage { category, .. } => vec![pin("Value", *category)],
            Self::Output { .. } => vec![],
        }
    }

    /// True for kinds that only structure the graph and must be gone by the
    /// time a permutation is lowered to steps.
    pub fn is_structural(&self) -> bool {
        matches!(
            self,
            Self::Macro { .. }
                | Self::MacroInput { .. }
                | Self::MacroOutput { .. }
                | Self::LocalVariableDeclaration { .. }
                | Self::LocalVariableUsage { .. }
                | Self::SeedRelay { .. }
        )
    }

    /// True for kinds whose output is resolved at compile time rather than
    /// executed per sample.
    pub fn is_seed_producer(&self) -> bool {
        matches!(
            self,
            Self::SeedConstant(_) | Self::CombineSeeds | Self::SeedRelay { .. }
        )
    }
}
