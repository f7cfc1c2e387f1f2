// Domain models: derived container views and settings-store rows

mod compose;
mod container;
mod settings;

pub use compose::{ComposeFile, ComposeService};
pub use container::{ContainerUsage, ContainerView, FleetMetrics, FleetSummary, PortView};
pub use settings::{
    ContainerSettings, ContainerSettingsPatch, Group, GroupLink, MigrationRow, NotificationLink,
    NotificationPlatform, NotificationTrigger, ServerEntry,
};
