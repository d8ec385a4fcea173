//! Membership snapshot.

use crate::domain::GroupError;
use shared_types::GroupPayload;
use std::collections::BTreeSet;

/// Addresses authorized on one partition: admins and members, de-duplicated.
///
/// Immutable; the client replaces the whole snapshot on every update.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MembershipGroup {
    partition_id: String,
    admins: BTreeSet<String>,
    addresses: BTreeSet<String>,
}

impl MembershipGroup {
    /// Empty group: nobody is authorized.
    pub fn empty(partition_id: impl Into<String>) -> Self {
        Self {
            partition_id: partition_id.into(),
            admins: BTreeSet::new(),
            addresses: BTreeSet::new(),
        }
    }

    /// Snapshot from a contract payload, without validation.
    pub fn from_payload(partition_id: impl Into<String>, payload: &GroupPayload) -> Self {
        Self {
            partition_id: partition_id.into(),
            admins: payload.admin.iter().cloned().collect(),
            addresses: payload.addresses(),
        }
    }

    /// Snapshot from the initial `getGroup` read.
    ///
    /// The payload must name `partition_id` and authorize at least one
    /// address.
    pub fn from_initial(partition_id: &str, payload: &GroupPayload) -> Result<Self, GroupError> {
        if payload.group_id != partition_id {
            return Err(GroupError::InvalidGroup(format!(
                "requested {}, got {:?}",
                partition_id, payload.group_id
            )));
        }
        let group = Self::from_payload(partition_id, payload);
        if group.addresses.is_empty() {
            return Err(GroupError::InvalidGroup(format!(
                "group {} has no addresses",
                partition_id
            )));
        }
        Ok(group)
    }

    pub fn partition_id(&self) -> &str {
        &self.partition_id
    }

    pub fn admins(&self) -> &BTreeSet<String> {
        &self.admins
    }

    /// Authorized addresses.
    pub fn addresses(&self) -> &BTreeSet<String> {
        &self.addresses
    }

    pub fn contains(&self, address: &str) -> bool {
        self.addresses.contains(address)
    }

    pub fn is_empty(&self) -> bool {
        self.addresses.is_empty()
    }

    pub fn len(&self) -> usize {
        self.addresses.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn payload(name: &str, admin: &[&str], identities: &[&str]) -> GroupPayload {
        GroupPayload {
            group_id: name.into(),
            admin: admin.iter().map(|s| s.to_string()).collect(),
            identities: identities.iter().map(|s| s.to_string()).collect(),
        }
    }

    #[test]
    fn test_union_of_admins_and_members() {
        let group = MembershipGroup::from_initial("para1", &payload("para1", &["A", "B"], &["A", "B", "C"])).unwrap();
        let addrs: Vec<&str> = group.addresses().iter().map(String::as_str).collect();
        assert_eq!(addrs, vec!["A", "B", "C"]);
        assert_eq!(group.admins().len(), 2);
    }

    #[test]
    fn test_name_mismatch_is_invalid() {
        let err = MembershipGroup::from_initial("para1", &payload("para2", &["A"], &[])).unwrap_err();
        assert!(matches!(err, GroupError::InvalidGroup(_)));
    }

    #[test]
    fn test_empty_group_is_invalid() {
        let err = MembershipGroup::from_initial("para1", &payload("para1", &[], &[])).unwrap_err();
        assert!(matches!(err, GroupError::InvalidGroup(_)));
    }
}
