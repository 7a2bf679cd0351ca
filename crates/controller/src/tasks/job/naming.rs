/// Prefix of every StatefulSet created for a Job
pub const STATEFUL_SET_PREFIX: &str = "stateful-";

/// Prefix of the claim template (and matching volume mount) name
pub const VOLUME_CLAIM_PREFIX: &str = "pod";

pub struct ResourceNaming;

impl ResourceNaming {
    /// StatefulSet name for a Job. This is the only link between a Job and
    /// its StatefulSet besides the owner reference, so it must stay stable.
    pub fn stateful_set_name(job_name: &str) -> String {
        format!("{STATEFUL_SET_PREFIX}{job_name}")
    }

    pub fn volume_claim_name(volume_name: &str) -> String {
        format!("{VOLUME_CLAIM_PREFIX}{volume_name}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stateful_set_name_has_prefix() {
        assert_eq!(ResourceNaming::stateful_set_name("n"), "stateful-n");
        assert_eq!(
            ResourceNaming::stateful_set_name("batch1"),
            "stateful-batch1"
        );
    }

    #[test]
    fn volume_claim_name_is_concatenated_without_separator() {
        assert_eq!(ResourceNaming::volume_claim_name("v"), "podv");
        assert_eq!(ResourceNaming::volume_claim_name("data"), "poddata");
    }
}
