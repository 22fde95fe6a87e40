//! Operation names accepted by `invoke`

use std::fmt;
use std::str::FromStr;

use crate::domain::result::Error;

/// A contract operation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operation {
    Initialize,
    Transfer,
    Delete,
    Query,
    GetCallerData,
}

impl Operation {
    pub const ALL: [Operation; 5] = [
        Operation::Initialize,
        Operation::Transfer,
        Operation::Delete,
        Operation::Query,
        Operation::GetCallerData,
    ];

    /// Canonical name
    pub fn name(self) -> &'static str {
        match self {
            Operation::Initialize => "initialize",
            Operation::Transfer => "transfer",
            Operation::Delete => "delete",
            Operation::Query => "query",
            Operation::GetCallerData => "getCallerData",
        }
    }

    /// Whether the operation writes to the ledger
    pub fn is_mutation(self) -> bool {
        matches!(
            self,
            Operation::Initialize | Operation::Transfer | Operation::Delete
        )
    }
}

impl FromStr for Operation {
    type Err = Error;

    /// Accepts the canonical names plus the legacy `init`, `invoke` and
    /// `callerData` spellings
    fn from_str(name: &str) -> Result<Self, Self::Err> {
        match name {
            "initialize" | "init" => Ok(Operation::Initialize),
            "transfer" | "invoke" => Ok(Operation::Transfer),
            "delete" => Ok(Operation::Delete),
            "query" => Ok(Operation::Query),
            "getCallerData" | "callerData" => Ok(Operation::GetCallerData),
            other => Err(Error::UnknownOperation(other.to_string())),
        }
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_canonical_names_round_trip() {
        for op in Operation::ALL {
            assert_eq!(op.name().parse::<Operation>().unwrap(), op);
        }
    }

    #[test]
    fn test_legacy_aliases() {
        assert_eq!("init".parse::<Operation>().unwrap(), Operation::Initialize);
        assert_eq!("invoke".parse::<Operation>().unwrap(), Operation::Transfer);
        assert_eq!(
            "callerData".parse::<Operation>().unwrap(),
            Operation::GetCallerData
        );
    }

    #[test]
    fn test_mutations() {
        let mutations: Vec<_> = Operation::ALL.into_iter().filter(|op| op.is_mutation()).collect();
        assert_eq!(
            mutations,
            vec![Operation::Initialize, Operation::Transfer, Operation::Delete]
        );
    }

    #[test]
    fn test_unknown_operation() {
        let err = "varunWrite".parse::<Operation>().unwrap_err();
        assert!(matches!(err, Error::UnknownOperation(ref name) if name == "varunWrite"));
        // Names are case sensitive
        assert!("Query".parse::<Operation>().is_err());
    }
}
