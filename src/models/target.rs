//! Parent targets shared by the join resources.

/// The entity a data store, network or backup server is joined to.
///
/// OnApp exposes the same join endpoints under individual hypervisors and
/// under hypervisor zones.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum JoinTarget {
    /// A single hypervisor (compute resource).
    Hypervisor(u64),
    /// A hypervisor zone (compute zone).
    HypervisorZone(u64),
}

impl JoinTarget {
    /// Path prefix of the parent entity, e.g. `settings/hypervisors/3`.
    pub fn path(&self) -> String {
        match self {
            Self::Hypervisor(id) => format!("settings/hypervisors/{id}"),
            Self::HypervisorZone(id) => format!("settings/hypervisor_zones/{id}"),
        }
    }

    /// Build a target from the `target_join_type`/`target_join_id` pair the
    /// API reports on join records.
    pub fn from_parts(join_type: &str, id: u64) -> Option<Self> {
        match join_type {
            "Hypervisor" => Some(Self::Hypervisor(id)),
            "HypervisorGroup" | "HypervisorZone" => Some(Self::HypervisorZone(id)),
            _ => None,
        }
    }
}

impl Default for JoinTarget {
    fn default() -> Self {
        Self::Hypervisor(0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_join_target_path() {
        assert_eq!(JoinTarget::Hypervisor(3).path(), "settings/hypervisors/3");
        assert_eq!(
            JoinTarget::HypervisorZone(9).path(),
            "settings/hypervisor_zones/9"
        );
    }

    #[test]
    fn test_join_target_from_parts() {
        assert_eq!(
            JoinTarget::from_parts("HypervisorGroup", 4),
            Some(JoinTarget::HypervisorZone(4))
        );
        assert_eq!(
            JoinTarget::from_parts("Hypervisor", 1),
            Some(JoinTarget::Hypervisor(1))
        );
        assert_eq!(JoinTarget::from_parts("DataStore", 1), None);
    }
}
