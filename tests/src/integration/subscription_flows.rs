//! Update-stream flows across the whole notifier: tracking, account
//! impact, forced creation/removal notices and session isolation.

#[cfg(test)]
mod tests {
    use crate::integration::fixtures::*;
    use ln_02_change_notifier::{LedgerObserver, NotifierConfig, NotifyError};
    use serde_json::{json, Value};
    use shared_types::{ObjectKind, PublicKey};

    #[tokio::test]
    async fn test_tracked_object_delivered_untracked_ignored() {
        let node = TestNode::start(NotifierConfig::default());
        node.seed(account(1, "alice"));
        node.seed(asset(5, "GOLD"));

        let session = node.session();
        let (cb, mut rx) = recorder();
        {
            let mut session = session.lock();
            session.subscribe(cb, false).unwrap();
            session.get_objects(&[ObjectKind::Account.id(1)]);
        }

        // Same batch: one tracked, one untracked
        node.change(vec![account(1, "alice"), asset(5, "GOLD")], &[]);

        let batch = next_batch(&mut rx).await;
        let items = batch.as_array().unwrap();
        assert_eq!(items.len(), 1);
        assert_eq!(items[0]["id"], "1.2.1");
        assert_eq!(items[0]["name"], "alice");
        assert_no_batch(&mut rx).await;
    }

    #[tokio::test]
    async fn test_resubscribe_forgets_tracked_items() {
        let node = TestNode::start(NotifierConfig::default());
        node.seed(asset(5, "GOLD"));
        let session = node.session();

        let (first, mut first_rx) = recorder();
        session.lock().subscribe(first, false).unwrap();
        session.lock().get_assets(&["1.3.5".parse().unwrap()]);

        let (second, mut second_rx) = recorder();
        session.lock().subscribe(second, false).unwrap();
        assert_eq!(session.lock().registry().tracked_item_count(), 0);

        node.change(vec![asset(5, "GOLD")], &[]);
        assert_no_batch(&mut second_rx).await;
        assert_no_batch(&mut first_rx).await;
    }

    #[tokio::test]
    async fn test_full_account_subscription_caps_at_limit() {
        let node = TestNode::start(NotifierConfig::default());
        let names: Vec<String> = (0..150).map(|i| format!("user-{i:03}")).collect();
        for (i, name) in names.iter().enumerate() {
            node.seed(account(100 + i as u64, name));
        }

        let session = node.session();
        let (cb, _rx) = recorder();
        let mut session = session.lock();
        session.subscribe(cb, false).unwrap();

        let results = session.get_full_accounts(&names, true);
        assert_eq!(results.len(), 150);
        assert_eq!(session.registry().watched_accounts().len(), 100);
    }

    #[tokio::test]
    async fn test_account_impact_delivers_untracked_objects() {
        let node = TestNode::start(NotifierConfig::default());
        node.seed(account(7, "bob"));

        let session = node.session();
        let (cb, mut rx) = recorder();
        {
            let mut session = session.lock();
            session.subscribe(cb, false).unwrap();
            let full = session.get_full_accounts(&["1.2.7".to_string()], true);
            assert_eq!(full["1.2.7"].account.name, "bob");
        }

        node.change(vec![balance(40, 7, 0, 500)], &[7]);
        let batch = next_batch(&mut rx).await;
        assert_eq!(batch[0]["id"], "2.5.40");
        assert_eq!(batch[0]["balance"], 500);

        // Another account's balance stays quiet
        node.change(vec![balance(41, 8, 0, 10)], &[8]);
        assert_no_batch(&mut rx).await;
    }

    #[tokio::test]
    async fn test_notify_all_requires_node_opt_in() {
        let node = TestNode::start(NotifierConfig::default());
        let session = node.session();
        let (cb, _rx) = recorder();
        assert_eq!(
            session.lock().subscribe(cb, true),
            Err(NotifyError::SubscribeToAllDisabled)
        );
        assert!(!session.lock().registry().is_subscribed());
    }

    #[tokio::test]
    async fn test_notify_all_sees_creations_and_removals_only() {
        let node = TestNode::start(NotifierConfig::default().with_subscribe_to_all(true));
        let session = node.session();
        let (cb, mut rx) = recorder();
        session.lock().subscribe(cb, true).unwrap();

        node.create(vec![asset(9, "SILVER")], &[]);
        assert_eq!(next_batch(&mut rx).await, json!([{
            "id": "1.3.9", "symbol": "SILVER", "precision": 5, "issuer": "1.2.0"
        }]));

        // Changes still need interest
        node.change(vec![asset(9, "SILVER")], &[]);
        assert_no_batch(&mut rx).await;

        node.remove(&[ObjectKind::Asset.id(9)], &[]);
        assert_eq!(next_batch(&mut rx).await, json!(["1.3.9"]));
    }

    #[tokio::test]
    async fn test_removal_of_tracked_order_delivers_bare_id() {
        let node = TestNode::start(NotifierConfig::default());
        node.seed(limit_order(3, 1, 0, 5));

        let session = node.session();
        let (cb, mut rx) = recorder();
        {
            let mut session = session.lock();
            session.subscribe(cb, false).unwrap();
            session.get_objects(&[ObjectKind::LimitOrder.id(3)]);
        }

        node.remove(&[ObjectKind::LimitOrder.id(3)], &[]);
        assert_eq!(next_batch(&mut rx).await, json!(["1.7.3"]));
        assert!(node.ledger.is_empty());
    }

    #[tokio::test]
    async fn test_key_reference_lookup_arms_accounts() {
        let node = TestNode::start(NotifierConfig::default());
        node.seed(account(12, "carol"));

        let session = node.session();
        let (cb, mut rx) = recorder();
        {
            let mut session = session.lock();
            session.subscribe(cb, false).unwrap();
            let refs = session.get_key_references(&[key(12), PublicKey([9; 33])]);
            // Matched through the derived address and through the key
            assert_eq!(refs[0].len(), 2);
            assert!(refs[0].iter().all(|id| id.to_string() == "1.2.12"));
            assert!(refs[1].is_empty());
        }

        node.change(vec![account(12, "carol")], &[]);
        assert_eq!(next_batch(&mut rx).await[0]["name"], "carol");
    }

    #[tokio::test]
    async fn test_untracked_noise_stays_near_false_positive_rate() {
        let node = TestNode::start(NotifierConfig::default());
        let session = node.session();
        let (cb, mut rx) = recorder();
        {
            let mut session = session.lock();
            session.subscribe(cb, false).unwrap();
            let tracked: Vec<_> = (0..50).map(|i| ObjectKind::AccountBalance.id(i)).collect();
            session.get_objects(&tracked);
        }

        let noise: Vec<_> = (10_000..11_000)
            .map(|i| {
                let object = balance(i, 1, 0, 1);
                node.seed(object);
                ObjectKind::AccountBalance.id(i)
            })
            .collect();
        node.hub.on_changed(&noise, &accounts(&[]));

        let delivered = match tokio::time::timeout(QUIET_PERIOD, rx.recv()).await {
            Ok(Some(Value::Array(items))) => items.len(),
            _ => 0,
        };
        assert!(delivered <= 30, "{delivered} false positives out of 1000");
    }

    #[tokio::test]
    async fn test_sessions_are_isolated() {
        let node = TestNode::start(NotifierConfig::default());
        node.seed(asset(1, "AAA"));
        node.seed(asset(2, "BBB"));

        let first = node.session();
        let second = node.session();
        let (cb_first, mut rx_first) = recorder();
        let (cb_second, mut rx_second) = recorder();
        first.lock().subscribe(cb_first, false).unwrap();
        second.lock().subscribe(cb_second, false).unwrap();
        first.lock().get_assets(&["1.3.1".parse().unwrap()]);
        second.lock().get_assets(&["1.3.2".parse().unwrap()]);

        node.change(vec![asset(1, "AAA")], &[]);
        assert_eq!(next_batch(&mut rx_first).await[0]["symbol"], "AAA");
        assert_no_batch(&mut rx_second).await;

        second.lock().close();
        node.change(vec![asset(2, "BBB")], &[]);
        assert_no_batch(&mut rx_second).await;
    }

    #[tokio::test]
    async fn test_deliveries_show_up_in_metrics() {
        let node = TestNode::start(NotifierConfig::default());
        node.seed(asset(3, "CASH"));
        let session = node.session();
        let (cb, mut rx) = recorder();
        {
            let mut session = session.lock();
            session.subscribe(cb, false).unwrap();
            session.get_objects(&[ObjectKind::Asset.id(3)]);
        }

        let delivered = || {
            ledger_telemetry::NOTIFICATIONS_DELIVERED
                .with_label_values(&["updates"])
                .get()
        };
        let before = delivered();
        node.change(vec![asset(3, "CASH")], &[]);
        next_batch(&mut rx).await;
        assert!(delivered() >= before + 1.0);

        let text = ledger_telemetry::encode_metrics().unwrap();
        assert!(text.contains("ln_notifier_notifications_delivered_total"));
        assert!(text.contains("ln_notifier_filter_items_tracked_total"));
    }

    #[tokio::test]
    async fn test_pending_transactions_and_block_ids() {
        let mut node = TestNode::start(NotifierConfig::default());
        let session = node.session();
        let (blocks, mut block_rx) = recorder();
        session.lock().subscribe_block_applied(Some(blocks));

        let id = node.apply_block(vec![transfer(1, 2)]);
        assert_eq!(next_batch(&mut block_rx).await, json!(id.to_string()));

        session.lock().subscribe_block_applied(None);
        node.apply_block(vec![]);
        assert_no_batch(&mut block_rx).await;
        node.hub.shutdown().await;
    }
}
