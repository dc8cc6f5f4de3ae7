use std::sync::Arc;

use loyalty_dispatch::Dispatcher;
use loyalty_pkpass::PassBuilder;
use loyalty_provisioning::Provisioner;
use loyalty_wallet_pass::WalletPass;

use crate::notifications::NotificationHub;

/// Everything the handlers share.
#[non_exhaustive]
pub struct ServiceState {
    pub provisioner: Provisioner,
    pub dispatcher: Dispatcher,
    pub wallet_pass: Arc<dyn WalletPass>,
    /// Absent when no signing material is configured.
    pub passes: Option<PassBuilder>,
    pub notifications: NotificationHub,
}

impl ServiceState {
    #[must_use]
    pub fn new(
        provisioner: Provisioner,
        dispatcher: Dispatcher,
        wallet_pass: Arc<dyn WalletPass>,
        passes: Option<PassBuilder>,
        notifications: NotificationHub,
    ) -> Self {
        Self {
            provisioner,
            dispatcher,
            wallet_pass,
            passes,
            notifications,
        }
    }
}

impl std::fmt::Debug for ServiceState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ServiceState")
            .field("provisioner", &self.provisioner)
            .field("dispatcher", &self.dispatcher)
            .field("passes", &self.passes)
            .field("notifications", &self.notifications)
            .finish_non_exhaustive()
    }
}
