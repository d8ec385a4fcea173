//! Handling of non-success `getGroup` statuses.

use serde::{Deserialize, Serialize};

/// Contract call succeeded.
pub const STATUS_SUCCESS: i32 = 200;
/// Caller is not authenticated to the contract.
pub const STATUS_UNAUTHORIZED: i32 = 401;
/// Caller is not permitted to read the group.
pub const STATUS_FORBIDDEN: i32 = 403;

/// Which non-success statuses start the cache empty instead of failing init.
///
/// Either way the client subscribes, so an empty cache heals on the next
/// membership event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DegradePolicy {
    /// Only 401/403 degrade; other failures abort init.
    #[default]
    UnauthorizedOnly,
    /// Every non-success status degrades.
    AnyNonSuccess,
}

impl DegradePolicy {
    /// Whether `status` starts the cache empty rather than failing init.
    pub fn degrades(self, status: i32) -> bool {
        match self {
            DegradePolicy::UnauthorizedOnly => {
                status == STATUS_UNAUTHORIZED || status == STATUS_FORBIDDEN
            }
            DegradePolicy::AnyNonSuccess => status != STATUS_SUCCESS,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unauthorized_only() {
        let policy = DegradePolicy::UnauthorizedOnly;
        assert!(policy.degrades(403));
        assert!(policy.degrades(401));
        assert!(!policy.degrades(500));
        assert!(!policy.degrades(404));
    }

    #[test]
    fn test_any_non_success() {
        let policy = DegradePolicy::AnyNonSuccess;
        assert!(policy.degrades(500));
        assert!(!policy.degrades(200));
    }

    #[test]
    fn test_config_names() {
        let p: DegradePolicy = serde_json::from_str(r#""any_non_success""#).unwrap();
        assert_eq!(p, DegradePolicy::AnyNonSuccess);
    }
}
