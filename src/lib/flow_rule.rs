// SPDX-License-Identifier: Apache-2.0

use crate::{
    ErrorKind, FlowDeleteRequest, FlowEntry, SdnError, SouthboundClient,
};

#[derive(Debug, Clone)]
/// Validate operator submitted flow entries and forward them to the
/// controller.
///
/// Failures are returned to the caller unchanged and never retried: adding
/// or deleting flows is not idempotent on a stateful switch.
pub struct FlowRuleProxy {
    client: SouthboundClient,
}

impl FlowRuleProxy {
    pub fn new(client: SouthboundClient) -> Self {
        Self { client }
    }

    /// Install `entry` on switch `switch_id`, overriding any `dpid` the entry
    /// carries.
    pub async fn add(
        &self,
        switch_id: u64,
        entry: &FlowEntry,
    ) -> Result<(), SdnError> {
        validate_flow_entry_for_add(entry)?;
        if let Some(dpid) = entry.dpid {
            if dpid != switch_id {
                log::warn!(
                    "Ignoring dpid {dpid} of flow entry, adding to \
                    selected switch {switch_id}"
                );
            }
        }
        log::info!(
            "Adding flow entry with priority {:?} to switch {switch_id}",
            entry.priority
        );
        self.client.add_flow_entry(switch_id, entry).await
    }

    /// Delete flows matching `entry` on switch `switch_id`.
    ///
    /// The controller deletes by match: an entry without priority is
    /// identified as priority 1 and without table id as table 0. When
    /// several entries share the same identification, the controller decides
    /// which ones are removed.
    ///
    /// The entry must carry a match, an explicit empty match is required to
    /// delete every flow of the switch.
    pub async fn delete(
        &self,
        switch_id: u64,
        entry: &FlowEntry,
    ) -> Result<(), SdnError> {
        validate_flow_entry_for_delete(entry)?;
        let request = FlowDeleteRequest::new(switch_id, entry);
        log::info!(
            "Deleting flow entry with table {} priority {} from switch \
            {switch_id}",
            request.table_id,
            request.priority
        );
        self.client.delete_flow_entry(switch_id, &request).await
    }
}

pub(crate) fn validate_flow_entry_for_add(
    entry: &FlowEntry,
) -> Result<(), SdnError> {
    if entry.priority.is_none() {
        let e = SdnError::new(
            ErrorKind::ValidationError,
            "Flow entry priority is mandatory when adding".to_string(),
        );
        log::error!("{}", e);
        return Err(e);
    }
    if entry.flow_match.is_none() {
        let e = SdnError::new(
            ErrorKind::ValidationError,
            "Flow entry match is mandatory when adding, use empty match \
            for wildcard"
                .to_string(),
        );
        log::error!("{}", e);
        return Err(e);
    }
    Ok(())
}

pub(crate) fn validate_flow_entry_for_delete(
    entry: &FlowEntry,
) -> Result<(), SdnError> {
    match entry.flow_match.as_ref() {
        None => {
            let e = SdnError::new(
                ErrorKind::ValidationError,
                "Flow entry match is mandatory when deleting, use empty \
                match to delete all flows"
                    .to_string(),
            );
            log::error!("{}", e);
            Err(e)
        }
        Some(flow_match) => {
            if flow_match.is_empty() {
                log::warn!("Empty match, deleting all flows of the table");
            }
            Ok(())
        }
    }
}
