// SPDX-License-Identifier: Apache-2.0

use std::sync::Arc;

use tokio::sync::watch;

use crate::{
    fetch_switch_view, ErrorKind, FlowEntry, FlowRuleProxy, SdnError,
    SouthboundClient, SwitchView,
};

#[derive(Debug, Clone, Default, PartialEq, Eq)]
#[non_exhaustive]
/// What subscribers of [SwitchStateAggregator] observe.
pub struct SwitchViewState {
    pub view: Option<Arc<SwitchView>>,
    /// Error of the last refresh, cleared by next successful one.
    pub error: Option<SdnError>,
}

/// Owner of the selected switch cursor and of the [SwitchView] of that
/// switch.
///
/// The view is replaced wholesale by a successful refresh and left untouched
/// by a failed one. Flow mutations are followed by a refresh instead of
/// editing the view locally, the controller is the only source of truth for
/// flow table content.
pub struct SwitchStateAggregator {
    client: SouthboundClient,
    proxy: FlowRuleProxy,
    selected: Option<u64>,
    current: Option<Arc<SwitchView>>,
    state_tx: watch::Sender<SwitchViewState>,
}

impl SwitchStateAggregator {
    pub fn new(client: SouthboundClient) -> Self {
        let (state_tx, _) = watch::channel(SwitchViewState::default());
        Self {
            proxy: FlowRuleProxy::new(client.clone()),
            client,
            selected: None,
            current: None,
            state_tx,
        }
    }

    pub fn selected(&self) -> Option<u64> {
        self.selected
    }

    pub fn current_view(&self) -> Option<&SwitchView> {
        self.current.as_deref()
    }

    pub fn subscribe(&self) -> watch::Receiver<SwitchViewState> {
        self.state_tx.subscribe()
    }

    /// Move the cursor and refresh. Selecting `None` clears current view.
    pub async fn select(
        &mut self,
        switch_id: Option<u64>,
    ) -> Result<(), SdnError> {
        self.selected = switch_id;
        match switch_id {
            Some(id) => {
                log::debug!("Switch {id} selected");
                self.refresh().await
            }
            None => {
                log::debug!("Switch selection cleared");
                self.current = None;
                self.publish(None);
                Ok(())
            }
        }
    }

    /// Fetch flow table, descriptor and aggregate statistics of the selected
    /// switch concurrently and replace the current view once all three
    /// succeeded. No-op when nothing is selected.
    pub async fn refresh(&mut self) -> Result<(), SdnError> {
        let id = match self.selected {
            Some(id) => id,
            None => {
                log::debug!("No switch selected, nothing to refresh");
                return Ok(());
            }
        };
        match fetch_switch_view(&self.client, id).await {
            Ok(view) => {
                log::debug!(
                    "Switch {id} refreshed with {} flow entries",
                    view.flow_table.len()
                );
                self.current = Some(Arc::new(view));
                self.publish(None);
                Ok(())
            }
            Err(e) => {
                log::warn!("{e}");
                self.publish(Some(e.clone()));
                Err(e)
            }
        }
    }

    pub async fn apply_add(
        &mut self,
        entry: &FlowEntry,
    ) -> Result<(), SdnError> {
        let id = self.selected_switch()?;
        self.proxy.add(id, entry).await?;
        self.refresh().await
    }

    pub async fn apply_delete(
        &mut self,
        entry: &FlowEntry,
    ) -> Result<(), SdnError> {
        let id = self.selected_switch()?;
        self.proxy.delete(id, entry).await?;
        self.refresh().await
    }

    fn selected_switch(&self) -> Result<u64, SdnError> {
        self.selected.ok_or_else(|| {
            SdnError::new(
                ErrorKind::InvalidArgument,
                "No switch selected".to_string(),
            )
        })
    }

    fn publish(&self, error: Option<SdnError>) {
        let new_state = SwitchViewState {
            view: self.current.clone(),
            error,
        };
        self.state_tx.send_if_modified(|state| {
            if state == &new_state {
                false
            } else {
                *state = new_state;
                true
            }
        });
    }
}
