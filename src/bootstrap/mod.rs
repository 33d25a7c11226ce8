mod events;
mod server;
mod shutdown;

pub use self::events::{event_channel, EventSender, SwitchEvent};
pub use self::server::Server;
pub use self::shutdown::{ShutdownManager, ShutdownState};
