//! Target configuration and function → role wiring.

use crate::state::journal::JournaledMap;
use crate::state::records::TargetConfig;
use gatehouse_abi::{Address, RoleId, Selector};

#[derive(Default)]
pub struct TargetManager {
    configs: JournaledMap<Address, TargetConfig>,
    function_roles: JournaledMap<(Address, Selector), RoleId>,
}

impl TargetManager {
    pub fn config(&self, target: Address) -> TargetConfig {
        self.configs.get(&target).unwrap_or_default()
    }

    pub fn update_config<R>(&self, target: Address, f: impl FnOnce(&mut TargetConfig) -> R) -> R {
        self.configs.update(target, f)
    }

    /// Role required to call `selector` on `target`; `ADMIN` until configured.
    pub fn function_role(&self, target: Address, selector: Selector) -> RoleId {
        self.function_roles
            .get(&(target, selector))
            .unwrap_or(RoleId::ADMIN)
    }

    pub fn set_function_role(&self, target: Address, selector: Selector, role: RoleId) {
        self.function_roles.insert((target, selector), role);
    }

    pub(crate) fn checkpoint(&self) -> [usize; 2] {
        [self.configs.checkpoint(), self.function_roles.checkpoint()]
    }

    pub(crate) fn revert_to(&self, cp: [usize; 2]) {
        self.function_roles.revert_to(cp[1]);
        self.configs.revert_to(cp[0]);
    }

    pub(crate) fn commit(&self) {
        self.configs.commit();
        self.function_roles.commit();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_function_role_defaults_to_admin() {
        let targets = TargetManager::default();
        let t = Address::from_low_u64(7);
        assert_eq!(targets.function_role(t, Selector::from(1)), RoleId::ADMIN);
        targets.set_function_role(t, Selector::from(1), RoleId(5));
        assert_eq!(targets.function_role(t, Selector::from(1)), RoleId(5));
        assert_eq!(targets.function_role(t, Selector::from(2)), RoleId::ADMIN);
    }

    #[test]
    fn test_closed_flag_defaults_open() {
        let targets = TargetManager::default();
        let t = Address::from_low_u64(7);
        assert!(!targets.config(t).closed);
        targets.update_config(t, |cfg| cfg.closed = true);
        assert!(targets.config(t).closed);
    }
}
