//! Host edit requests and operating system filter options.

use std::cmp::Reverse;

use inventory_api_models::{HostPatchRequest, OperatingSystemCount};

use crate::features::groups::logic::StatusMessages;
use crate::features::hosts::HostSource;
use crate::models::FilterTerm;

/// Filter key the operating system options are selected under.
pub const OPERATING_SYSTEM_FILTER: &str = "operating_system";

/// One editable host field with its new value.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum HostEdit {
    /// Rename the host.
    DisplayName(String),
    /// Change the hostname Ansible connects to.
    AnsibleHost(String),
}

impl HostEdit {
    /// Trimmed edit; a display name may not be blank.
    #[must_use]
    pub fn normalized(self) -> Option<Self> {
        match self {
            Self::DisplayName(name) => {
                let name = name.trim();
                (!name.is_empty()).then(|| Self::DisplayName(name.to_string()))
            }
            Self::AnsibleHost(host) => Some(Self::AnsibleHost(host.trim().to_string())),
        }
    }

    /// `PATCH` body carrying only the edited field.
    #[must_use]
    pub fn request(&self) -> HostPatchRequest {
        match self {
            Self::DisplayName(name) => HostPatchRequest {
                display_name: Some(name.clone()),
                ..HostPatchRequest::default()
            },
            Self::AnsibleHost(host) => HostPatchRequest {
                ansible_host: Some(host.clone()),
                ..HostPatchRequest::default()
            },
        }
    }

    /// Toast text for the edit.
    #[must_use]
    pub fn messages(&self) -> StatusMessages {
        match self {
            Self::DisplayName(name) => StatusMessages {
                success: "Display name has been updated".to_string(),
                failure: format!("Failed to update display name to {name}"),
            },
            Self::AnsibleHost(host) => StatusMessages {
                success: "Ansible hostname has been updated".to_string(),
                failure: format!("Failed to update Ansible hostname to {host}"),
            },
        }
    }
}

/// Send one edit and return the messages to show.
///
/// # Errors
/// Propagates the source failure unchanged.
pub async fn edit_host<S>(source: &S, id: &str, edit: &HostEdit) -> anyhow::Result<StatusMessages>
where
    S: HostSource + ?Sized,
{
    source.patch_host(id, &edit.request()).await?;
    Ok(edit.messages())
}

/// Filter options for the operating system category, newest release first per
/// distribution. CentOS releases are left out unless `show_centos` is set.
#[must_use]
pub fn os_filter_options(
    reported: Vec<OperatingSystemCount>,
    show_centos: bool,
) -> Vec<FilterTerm> {
    let mut reported: Vec<OperatingSystemCount> = reported
        .into_iter()
        .filter(|os| show_centos || !is_centos(&os.value.name))
        .collect();
    reported.sort_by_key(|os| {
        (os.value.name.clone(), Reverse(os.value.major), Reverse(os.value.minor))
    });
    reported.dedup_by(|next, kept| next.value == kept.value);
    reported
        .into_iter()
        .map(|os| {
            let label = os.value.label();
            FilterTerm::new(OPERATING_SYSTEM_FILTER, label.clone(), label)
        })
        .collect()
}

fn is_centos(name: &str) -> bool {
    name.to_ascii_lowercase().starts_with("centos")
}
