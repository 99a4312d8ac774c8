use proposal_core::Proposal;
use proposal_types::{DiskSize, Issue, ProposalSettings};

pub fn descriptions(issues: &[Issue]) -> Vec<&str> {
    issues.iter().map(|issue| issue.description.as_str()).collect()
}

pub fn mount_paths(settings: &ProposalSettings) -> Vec<&str> {
    settings
        .volumes
        .iter()
        .map(|volume| volume.mount_path.as_str())
        .collect()
}

pub fn volume_sizes(settings: &ProposalSettings, mount_path: &str) -> (DiskSize, DiskSize) {
    let volume = settings
        .volume(mount_path)
        .unwrap_or_else(|| panic!("volume {mount_path} missing"));
    (volume.min_size, volume.max_size)
}

pub fn assert_succeeded(proposal: &Proposal) {
    assert!(
        proposal.succeeded(),
        "proposal failed: {:?}",
        proposal.issues()
    );
}
