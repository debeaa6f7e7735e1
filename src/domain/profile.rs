use super::money::Balance;
use super::ProfileId;
use serde::{Deserialize, Serialize};

#[derive(Debug, Serialize, Deserialize, PartialEq, Eq, Clone, Copy)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Client,
    Contractor,
}

/// An account-holder in the marketplace ledger.
///
/// A profile plays exactly one role: clients own contracts and pay for jobs,
/// contractors perform jobs and receive payments. The balance is the only
/// mutable field in this core, and it is only mutated through a locked
/// transaction.
#[derive(Debug, Serialize, Deserialize, PartialEq, Clone)]
pub struct Profile {
    pub id: ProfileId,
    pub first_name: String,
    pub last_name: String,
    pub profession: String,
    pub role: Role,
    pub balance: Balance,
}

impl Profile {
    pub fn is_client(&self) -> bool {
        self.role == Role::Client
    }

    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn profile(role: Role) -> Profile {
        Profile {
            id: 1,
            first_name: "Ada".to_string(),
            last_name: "Lovelace".to_string(),
            profession: "Engineer".to_string(),
            role,
            balance: Balance::new(dec!(100.0)),
        }
    }

    #[test]
    fn test_role_check() {
        assert!(profile(Role::Client).is_client());
        assert!(!profile(Role::Contractor).is_client());
    }

    #[test]
    fn test_role_deserialization() {
        let role: Role = serde_json::from_str("\"client\"").unwrap();
        assert_eq!(role, Role::Client);
        let role: Role = serde_json::from_str("\"contractor\"").unwrap();
        assert_eq!(role, Role::Contractor);
    }

    #[test]
    fn test_full_name() {
        assert_eq!(profile(Role::Client).full_name(), "Ada Lovelace");
    }
}
