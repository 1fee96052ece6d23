//! Realtime fan-out: the hub actor, its wire format and the outbox pump.

pub mod hub;
pub mod outbox;
pub mod protocol;

pub use hub::{ActiveGames, Broadcast, BroadcastHub, Connection, Outbox, Register, SubscriberCount, Unregister};
pub use outbox::{pump_outbox, EventSink, PumpExit, SinkError};
pub use protocol::{EventType, WireEvent};
