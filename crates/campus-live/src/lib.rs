//! Real-time announcement channel for Campus Live.
//!
//! A club posts an announcement; every connected observer sees it pushed
//! within the same critical section that assigned its sequence id.
//!
//! # Components
//!
//! | Component | Type | Role |
//! |-----------|------|------|
//! | Update store | [`UpdateStore`] | append-only, in-memory record sequence |
//! | Broadcast hub | [`BroadcastHub`] | set of observer queues, best-effort fan-out |
//! | Mutation gateway | [`LiveService::publish`] | validate, append, push |
//! | Sequencer | [`LiveService`] | one lock serializing appends, pushes and registrations |
//! | Observer session | [`ObserverSession`] | client-side fold of frames into a newest-first view |
//!
//! # Delivery contract
//!
//! A new observer receives one [`LiveFrame::Snapshot`] holding every record
//! appended so far, then one [`LiveFrame::Increment`] per later publish, in
//! publish order. Registration happens under the same lock as publishing,
//! so each record is either in the snapshot or delivered as an increment,
//! never both. Delivery is best-effort: a full or closed observer queue
//! never fails the publish.
//!
//! [`LiveFrame::Snapshot`]: campus_types::LiveFrame::Snapshot
//! [`LiveFrame::Increment`]: campus_types::LiveFrame::Increment

mod error;
mod gateway;
mod hub;
mod observer;
mod service;
mod store;

pub use error::{LiveError, PublishError};
pub use gateway::validate_announcement;
pub use hub::{BroadcastHub, ConnectionId, DeliveryReport, ObserverConnection};
pub use observer::{CloseCause, FrameOutcome, ObserverError, ObserverSession, SessionState};
pub use service::{LiveService, Subscription, DEFAULT_QUEUE_CAPACITY};
pub use store::UpdateStore;
