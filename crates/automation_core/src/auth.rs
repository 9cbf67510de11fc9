//! Authorization layer: bot capabilities and the trusted forwarder
//!
//! `BotAuth` answers "may this agent trigger this subscription";
//! `ProxyAuth` is the only path through which the strategy executor
//! reaches proxy-owned state. Both fail closed.

use crate::{AutomationError, AutomationResult};
use dashmap::DashMap;
use recipe_core::types::{Address, SubId};
use std::collections::HashSet;
use tracing::{debug, warn};

/// Per-subscription capability list of approved executor bots
#[derive(Default)]
pub struct BotAuth {
    approvals: DashMap<SubId, HashSet<Address>>,
}

impl BotAuth {
    /// Create an empty capability list
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Grant `bot` the right to execute `sub_id`
    pub fn approve(&self, sub_id: SubId, bot: Address) {
        debug!(sub_id, %bot, "approving bot");
        self.approvals.entry(sub_id).or_default().insert(bot);
    }

    /// Remove `bot` from the capability list of `sub_id`
    pub fn revoke(&self, sub_id: SubId, bot: Address) {
        if let Some(mut entry) = self.approvals.get_mut(&sub_id) {
            entry.value_mut().remove(&bot);
        }
    }

    /// Check whether `bot` may execute `sub_id`
    ///
    /// Pure read; calling twice with unchanged state returns the same
    /// result.
    #[must_use]
    pub fn is_approved(&self, sub_id: SubId, bot: Address) -> bool {
        self.approvals
            .get(&sub_id)
            .is_some_and(|entry| entry.value().contains(&bot))
    }
}

/// Trusted forwarder: proxy owners grant execution authority
///
/// A forwarder may act on a proxy only while a grant exists; everything
/// else is rejected before any proxy-owned state is touched.
#[derive(Default)]
pub struct ProxyAuth {
    grants: DashMap<Address, HashSet<Address>>,
}

impl ProxyAuth {
    /// Create an empty grant table
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Record that `proxy` trusts `forwarder`
    pub fn authorize(&self, proxy: Address, forwarder: Address) {
        debug!(%proxy, %forwarder, "authorizing forwarder");
        self.grants.entry(proxy).or_default().insert(forwarder);
    }

    /// Remove a grant
    pub fn revoke(&self, proxy: Address, forwarder: Address) {
        if let Some(mut entry) = self.grants.get_mut(&proxy) {
            entry.value_mut().remove(&forwarder);
        }
    }

    /// Check whether `proxy` trusts `forwarder`
    #[must_use]
    pub fn is_authorized(&self, proxy: Address, forwarder: Address) -> bool {
        self.grants
            .get(&proxy)
            .is_some_and(|entry| entry.value().contains(&forwarder))
    }

    /// Run `op` under the proxy's identity if the grant exists
    ///
    /// # Errors
    ///
    /// Returns error when `proxy` has not authorized `forwarder`;
    /// otherwise `op`'s own result
    pub fn execute_as<T>(
        &self,
        forwarder: Address,
        proxy: Address,
        op: impl FnOnce() -> AutomationResult<T>,
    ) -> AutomationResult<T> {
        if !self.is_authorized(proxy, forwarder) {
            warn!(%proxy, %forwarder, "forwarder not authorized on proxy");
            return Err(AutomationError::ProxyNotAuthorized { proxy, forwarder });
        }
        op()
    }
}
