mod common;

use std::sync::Arc;

use chrono::Utc;
use common::{FakeOrderApi, order};
use pharmacy_fulfillment::{
    lifecycle::{LifecycleError, Stage, TransitionAction, classify, execute, legal_actions},
    models::{DeliveryStatus, OrderStatus},
    store::OrderStore,
};

use TransitionAction::*;

#[tokio::test]
async fn legacy_unpaid_pending_order_only_offers_legacy_complete() {
    let o = order("legacy", OrderStatus::Pending, false);
    assert_eq!(classify(&o), Stage::Pending);
    assert_eq!(legal_actions(&o), vec![LegacyComplete]);

    let store = OrderStore::with_orders([o]);
    let api = FakeOrderApi::default();
    let done = execute(&store, &api, "legacy", LegacyComplete, false)
        .await
        .unwrap();
    assert_eq!(done.status, OrderStatus::Completed);
    assert_eq!(done.delivery_status, Some(DeliveryStatus::Delivered));
    assert!(legal_actions(&done).is_empty());
    assert_eq!(api.calls(), vec!["status:legacy:completed"]);
}

#[tokio::test]
async fn happy_path_from_payment_to_delivery() {
    let store = OrderStore::with_orders([order("o1", OrderStatus::PaymentPending, true)]);
    let api = FakeOrderApi::default();

    let o = store.get("o1").await.unwrap();
    assert_eq!(legal_actions(&o), vec![Accept, Reject]);

    let accepted = execute(&store, &api, "o1", Accept, false).await.unwrap();
    assert_eq!(accepted.status, OrderStatus::Accepted);
    assert!(accepted.pharmacy_accepted);
    assert!(accepted.accepted_at.is_some());
    assert_eq!(legal_actions(&accepted), vec![Confirm]);

    let preparing = execute(&store, &api, "o1", Confirm, false).await.unwrap();
    assert_eq!(preparing.status, OrderStatus::Preparing);
    assert_eq!(preparing.delivery_status, Some(DeliveryStatus::Preparing));
    assert_eq!(legal_actions(&preparing), vec![OutForDelivery, MarkDelivered]);

    let dispatched = execute(&store, &api, "o1", OutForDelivery, false)
        .await
        .unwrap();
    assert_eq!(classify(&dispatched), Stage::OutForDelivery);
    assert_eq!(legal_actions(&dispatched), vec![MarkDelivered]);

    let delivered = execute(&store, &api, "o1", MarkDelivered, false)
        .await
        .unwrap();
    assert_eq!(delivered.status, OrderStatus::Delivered);
    assert_eq!(delivered.delivery_status, Some(DeliveryStatus::Delivered));
    assert!(delivered.delivered_at.is_some());
    assert!(delivered.rejected_at.is_none());
    assert!(legal_actions(&delivered).is_empty());

    assert_eq!(
        api.calls(),
        vec![
            "accept:o1",
            "status:o1:preparing",
            "status:o1:out_for_delivery",
            "status:o1:delivered",
        ]
    );
    assert_eq!(store.get("o1").await.unwrap(), delivered);
}

#[tokio::test]
async fn failed_confirm_rolls_back_to_snapshot() {
    let mut accepted = order("o2", OrderStatus::Accepted, true);
    accepted.pharmacy_accepted = true;
    accepted.accepted_at = Some(Utc::now());
    let store = OrderStore::with_orders([accepted.clone()]);
    let api = FakeOrderApi::default();
    api.fail_updates(true);

    let err = execute(&store, &api, "o2", Confirm, false).await.unwrap_err();
    assert!(matches!(
        err,
        LifecycleError::RemoteUpdateFailed { action: Confirm, .. }
    ));

    let after = store.get("o2").await.unwrap();
    assert_eq!(after, accepted);
    assert!(after.preparing_at.is_none());
    assert!(!store.is_in_flight("o2").await);
    assert_eq!(legal_actions(&after), vec![Confirm]);

    // retry succeeds once the order API recovers
    api.fail_updates(false);
    let retried = execute(&store, &api, "o2", Confirm, false).await.unwrap();
    assert_eq!(retried.status, OrderStatus::Preparing);
}

#[tokio::test]
async fn illegal_action_makes_no_remote_call() {
    let store = OrderStore::with_orders([order("o3", OrderStatus::PaymentPending, true)]);
    let api = FakeOrderApi::default();

    let err = execute(&store, &api, "o3", OutForDelivery, false)
        .await
        .unwrap_err();
    assert!(matches!(err, LifecycleError::IllegalTransition { .. }));
    assert!(api.calls().is_empty());
    assert_eq!(
        store.get("o3").await.unwrap().status,
        OrderStatus::PaymentPending
    );
}

#[tokio::test]
async fn reject_without_confirmation_is_refused() {
    let store = OrderStore::with_orders([order("o4", OrderStatus::PaymentPending, true)]);
    let api = FakeOrderApi::default();

    let err = execute(&store, &api, "o4", Reject, false).await.unwrap_err();
    assert!(matches!(err, LifecycleError::ConfirmationRequired { .. }));
    assert!(api.calls().is_empty());

    let rejected = execute(&store, &api, "o4", Reject, true).await.unwrap();
    assert!(rejected.pharmacy_rejected);
    assert!(!rejected.pharmacy_accepted);
    assert!(rejected.rejected_at.is_some());
    assert!(rejected.accepted_at.is_none());
    assert_eq!(api.calls(), vec!["status:o4:rejected"]);

    let err = execute(&store, &api, "o4", Accept, false).await.unwrap_err();
    assert!(matches!(err, LifecycleError::IllegalTransition { .. }));
}

#[tokio::test]
async fn duplicate_request_while_in_flight_is_refused() {
    let store = Arc::new(OrderStore::with_orders([order(
        "o5",
        OrderStatus::PaymentPending,
        true,
    )]));
    let api = Arc::new(FakeOrderApi::default());
    let release = api.hold_updates();

    let first = {
        let store = store.clone();
        let api = api.clone();
        tokio::spawn(async move { execute(&store, api.as_ref(), "o5", Accept, false).await })
    };

    while !store.is_in_flight("o5").await {
        tokio::task::yield_now().await;
    }

    let err = execute(&store, api.as_ref(), "o5", Accept, false)
        .await
        .unwrap_err();
    assert!(matches!(err, LifecycleError::TransitionInProgress(_)));

    release.add_permits(1);
    let accepted = first.await.unwrap().unwrap();
    assert_eq!(accepted.status, OrderStatus::Accepted);
    assert!(!store.is_in_flight("o5").await);
    assert_eq!(api.calls(), vec!["accept:o5"]);
}

#[tokio::test]
async fn refresh_during_transition_keeps_optimistic_patch() {
    let store = Arc::new(OrderStore::with_orders([order(
        "o6",
        OrderStatus::PaymentPending,
        true,
    )]));
    let api = Arc::new(FakeOrderApi::default());
    let release = api.hold_updates();

    let pending = {
        let store = store.clone();
        let api = api.clone();
        tokio::spawn(async move { execute(&store, api.as_ref(), "o6", Accept, false).await })
    };
    while !store.is_in_flight("o6").await {
        tokio::task::yield_now().await;
    }

    // the order API has not seen the accept yet
    let ticket = store.refresh_ticket().await;
    store
        .replace_all(
            vec![order("o6", OrderStatus::PaymentPending, true)],
            ticket,
            Utc::now(),
        )
        .await;
    assert_eq!(
        store.get("o6").await.unwrap().status,
        OrderStatus::Accepted
    );

    release.add_permits(1);
    pending.await.unwrap().unwrap();
    assert_eq!(
        store.get("o6").await.unwrap().status,
        OrderStatus::Accepted
    );
}

#[tokio::test]
async fn transitions_on_different_orders_do_not_block_each_other() {
    let store = Arc::new(OrderStore::with_orders([
        order("a", OrderStatus::PaymentPending, true),
        order("b", OrderStatus::PaymentPending, true),
    ]));
    let api = Arc::new(FakeOrderApi::default());
    let release = api.hold_updates();

    let first = {
        let store = store.clone();
        let api = api.clone();
        tokio::spawn(async move { execute(&store, api.as_ref(), "a", Accept, false).await })
    };
    while !store.is_in_flight("a").await {
        tokio::task::yield_now().await;
    }

    let second = {
        let store = store.clone();
        let api = api.clone();
        tokio::spawn(async move { execute(&store, api.as_ref(), "b", Accept, false).await })
    };
    while !store.is_in_flight("b").await {
        tokio::task::yield_now().await;
    }

    release.add_permits(2);
    assert!(first.await.unwrap().is_ok());
    assert!(second.await.unwrap().is_ok());
}
