use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use tracing::info;

use crate::config::UserConfig;
use crate::host::{HostServices, SubMenuSpec};
use crate::menu::QueueAfterMenu;
use crate::ready::wait_until_ready;

/// A registered "Add to Queue After..." submenu 🎵
pub struct Extension {
    menu: Arc<QueueAfterMenu>,
    spec: SubMenuSpec,
}

impl Extension {
    /// Wait for the host, then register the submenu.
    pub async fn start(services: HostServices, config: &UserConfig) -> Result<Self> {
        let interval = Duration::from_millis(config.readiness.poll_interval_ms.max(1));
        let deadline = config.readiness.timeout_ms.map(Duration::from_millis);

        wait_until_ready(services.probe.as_ref(), interval, deadline)
            .await
            .context("Host never became ready")?;

        let menu = Arc::new(QueueAfterMenu::new(&services, config.slot_count()));
        let spec = SubMenuSpec {
            label: config.menu_label.clone(),
            item_count: menu.slots(),
        };

        services
            .menu
            .register_submenu(spec.clone(), menu.clone())
            .context("Failed to register context menu")?;

        info!(label = %spec.label, slots = spec.item_count, "Context menu registered");
        Ok(Self { menu, spec })
    }

    pub fn menu(&self) -> &Arc<QueueAfterMenu> {
        &self.menu
    }

    pub fn spec(&self) -> &SubMenuSpec {
        &self.spec
    }
}
