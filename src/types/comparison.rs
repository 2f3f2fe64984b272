//! Comparison kinds shared by constraints and data-feature cluster keys.

/// The comparison a constraint enforces between a field's bound and its
/// goal, or a cluster key's field and a runtime key's field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub enum ComparisonKind {
    Less,
    LessOrEqual,
    Greater,
    GreaterOrEqual,
}

impl ComparisonKind {
    /// Whether this comparator is a "greater" family member, meaning the
    /// constraint evaluator should use the field's *lower* bound.
    pub fn is_greater_family(&self) -> bool {
        matches!(self, ComparisonKind::Greater | ComparisonKind::GreaterOrEqual)
    }

    /// True if `value <comparator> goal`.
    pub fn holds(&self, value: f64, goal: f64) -> bool {
        match self {
            ComparisonKind::Less => value < goal,
            ComparisonKind::LessOrEqual => value <= goal,
            ComparisonKind::Greater => value > goal,
            ComparisonKind::GreaterOrEqual => value >= goal,
        }
    }
}

/// Comparison kind for one axis of a data-feature cluster key, including
/// "don't-care" (always valid).
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub enum ClusterComparisonKind {
    LessOrEqual,
    GreaterOrEqual,
    DontCare,
}

impl ClusterComparisonKind {
    /// True if a cluster's stored `value` is valid against a `runtime`
    /// value under this comparator.
    pub fn is_valid(&self, stored: f64, runtime: f64) -> bool {
        match self {
            ClusterComparisonKind::LessOrEqual => stored <= runtime,
            ClusterComparisonKind::GreaterOrEqual => stored >= runtime,
            ClusterComparisonKind::DontCare => true,
        }
    }
}
