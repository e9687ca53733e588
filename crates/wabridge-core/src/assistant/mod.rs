//! Remote assistant service abstractions.
//!
//! - `AssistantApi` / `AssistantAdmin`: RPITIT port traits for the remote service
//! - `RunPoller`: waits for a run to finish and extracts the reply

pub mod api;
pub mod poller;
