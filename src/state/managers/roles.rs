//! Role metadata and membership tables.

use crate::state::journal::JournaledMap;
use crate::state::records::{Access, RoleConfig};
use gatehouse_abi::{Address, RoleId};

/// Role configuration and the `(role, account)` membership table.
///
/// `PUBLIC` is never stored here; its membership is synthesized by the authority.
#[derive(Default)]
pub struct RoleManager {
    configs: JournaledMap<RoleId, RoleConfig>,
    members: JournaledMap<(RoleId, Address), Access>,
}

impl RoleManager {
    /// Configuration for `role`; unconfigured roles are administered and
    /// guarded by `ADMIN` with no grant delay.
    pub fn config(&self, role: RoleId) -> RoleConfig {
        self.configs.get(&role).unwrap_or_default()
    }

    pub fn update_config<R>(&self, role: RoleId, f: impl FnOnce(&mut RoleConfig) -> R) -> R {
        self.configs.update(role, f)
    }

    pub fn access(&self, role: RoleId, account: Address) -> Option<Access> {
        self.members.get(&(role, account))
    }

    pub fn set_access(&self, role: RoleId, account: Address, access: Access) {
        self.members.insert((role, account), access);
    }

    pub fn remove_access(&self, role: RoleId, account: Address) -> Option<Access> {
        self.members.remove(&(role, account))
    }

    pub(crate) fn checkpoint(&self) -> [usize; 2] {
        [self.configs.checkpoint(), self.members.checkpoint()]
    }

    pub(crate) fn revert_to(&self, cp: [usize; 2]) {
        self.members.revert_to(cp[1]);
        self.configs.revert_to(cp[0]);
    }

    pub(crate) fn commit(&self) {
        self.configs.commit();
        self.members.commit();
    }
}
