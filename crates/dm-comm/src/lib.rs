//! `dm-comm`: the communication substrate.
//!
//! # Crate layout
//!
//! | Module       | Contents                                                    |
//! |--------------|-------------------------------------------------------------|
//! | [`endpoint`] | `Role`, `Endpoint` (position, radius, reliability)          |
//! | [`api`]      | `CommunicationApi<M>` trait, `Envelope<M>`                  |
//! | [`model`]    | `CommunicationModel<M>`, `CommHandle`, `DeliveryStats`      |
//! | [`error`]    | `CommError`, `CommResult<T>`                                |
//!
//! # Delivery model
//!
//! `send` and `broadcast` never call a recipient directly.  They resolve the
//! recipient set at call time (range and reliability are evaluated against
//! the sender's registered endpoint) and push [`Envelope`]s onto a FIFO
//! queue.  The scheduler drains that queue to empty before the step ends,
//! so every message chain started in step N resolves within step N.
//!
//! An envelope whose recipient has been unregistered by the time it is
//! popped is dropped and counted; it is never retried.

pub mod api;
pub mod endpoint;
pub mod error;
pub mod model;


pub use api::{CommunicationApi, Envelope};
pub use endpoint::{Endpoint, Role};
pub use error::{CommError, CommResult};
pub use model::{CommHandle, CommunicationModel, DeliveryStats};
