//! CLI value enums and domain type conversions.

use clap::ValueEnum;

use crate::domain::RelationshipType;
use crate::links::CyclePolicy;

/// Relationship type for CLI arguments
#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum RelationshipTypeArg {
    /// Ordering link: the source depends on the target
    Dependency,
    /// Informational link, no ordering
    Complements,
}

impl std::fmt::Display for RelationshipTypeArg {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(RelationshipType::from(*self).as_str())
    }
}

impl From<RelationshipTypeArg> for RelationshipType {
    fn from(arg: RelationshipTypeArg) -> Self {
        match arg {
            RelationshipTypeArg::Dependency => RelationshipType::Dependency,
            RelationshipTypeArg::Complements => RelationshipType::Complements,
        }
    }
}

/// Cycle policy for CLI arguments
#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum CyclePolicyArg {
    /// Reject dependency links that would create a cycle
    Strict,
    /// Allow them with a warning
    Advisory,
}

impl From<CyclePolicyArg> for CyclePolicy {
    fn from(arg: CyclePolicyArg) -> Self {
        match arg {
            CyclePolicyArg::Strict => CyclePolicy::Strict,
            CyclePolicyArg::Advisory => CyclePolicy::Advisory,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn relationship_arg_displays_wire_name() {
        assert_eq!(RelationshipTypeArg::Dependency.to_string(), "dependency");
        assert_eq!(
            RelationshipType::from(RelationshipTypeArg::Complements),
            RelationshipType::Complements
        );
    }

    #[test]
    fn cycle_policy_arg_converts() {
        assert_eq!(CyclePolicy::from(CyclePolicyArg::Advisory), CyclePolicy::Advisory);
    }
}
