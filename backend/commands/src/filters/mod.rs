pub mod access;
pub mod constraint;
pub mod cooldown;
pub mod mute;

pub use access::{ChannelTypeFilter, PermissionFilter};
pub use constraint::ConstraintFilter;
pub use cooldown::CooldownFilter;
pub use mute::MuteFilter;
