use thiserror::Error;

use crate::{client::ApiError, lifecycle::actions::TransitionAction, lifecycle::stage::Stage};

#[derive(Debug, Error)]
pub enum LifecycleError {
    #[error("Order {0} not found")]
    OrderNotFound(String),

    #[error("Action {action} is not allowed for order {order_id} in stage {stage:?}")]
    IllegalTransition {
        order_id: String,
        action: TransitionAction,
        stage: Stage,
    },

    #[error("Action {action} must be explicitly confirmed")]
    ConfirmationRequired { action: TransitionAction },

    #[error("A transition for order {0} is already in progress, please wait")]
    TransitionInProgress(String),

    #[error("Remote update for order {order_id} failed during {action}")]
    RemoteUpdateFailed {
        order_id: String,
        action: TransitionAction,
        #[source]
        source: ApiError,
    },
}
