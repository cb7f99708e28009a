//! Pharmacy order fulfillment lifecycle.
//!
//! `stage` classifies an order for display, `actions` decides which
//! transitions are legal, `transition` plans the field changes of a transition
//! and `executor` applies it against the store and the order API.

pub mod actions;
pub mod error;
pub mod executor;
pub mod stage;
pub mod transition;

pub use actions::{TransitionAction, legal_actions, primary_action};
pub use error::LifecycleError;
pub use executor::execute;
pub use stage::{Stage, StageIcon, classify};
