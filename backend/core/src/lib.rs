pub mod error;
pub mod event;
pub mod message;
pub mod settings;
pub mod traits;

pub use error::ChatError;
pub use event::{Author, ChannelKind, MessageEvent};
pub use message::Message;
pub use settings::ScopeSettings;
pub use traits::{MessageSender, SettingsProvider, StaticSettings};
