//! Market fan-out flows: order changes and fills reach only the
//! subscribers of their trading pair.

#[cfg(test)]
mod tests {
    use crate::integration::fixtures::*;
    use ln_02_change_notifier::{NotifierConfig, NotifyError};
    use serde_json::json;
    use shared_types::{AssetId, ObjectKind};

    #[tokio::test]
    async fn test_fill_reaches_only_its_market() {
        let mut node = TestNode::start(NotifierConfig::default());
        let session = node.session();
        let (gold, mut gold_rx) = recorder();
        let (silver, mut silver_rx) = recorder();
        {
            let mut session = session.lock();
            session.subscribe_market(gold, AssetId(0), AssetId(5)).unwrap();
            session.subscribe_market(silver, AssetId(0), AssetId(6)).unwrap();
        }

        node.apply_block(vec![fill(3, 1, 0, 5), transfer(1, 2)]);

        let batch = next_batch(&mut gold_rx).await;
        let entries = batch.as_array().unwrap();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0][0]["fill_order"]["order_id"], "1.7.3");
        assert_eq!(entries[0][1], json!("void"));
        assert_no_batch(&mut silver_rx).await;
    }

    #[tokio::test]
    async fn test_order_lifecycle_on_subscribed_pair() {
        let node = TestNode::start(NotifierConfig::default());
        let session = node.session();
        let (cb, mut rx) = recorder();
        session
            .lock()
            .subscribe_market(cb, AssetId(0), AssetId(5))
            .unwrap();

        node.create(vec![limit_order(4, 1, 5, 0), limit_order(5, 1, 0, 6)], &[1]);
        let batch = next_batch(&mut rx).await;
        assert_eq!(batch.as_array().unwrap().len(), 1);
        assert_eq!(batch[0]["id"], "1.7.4");
        assert_eq!(batch[0]["seller"], "1.2.1");

        node.remove(&[ObjectKind::LimitOrder.id(4)], &[1]);
        assert_eq!(next_batch(&mut rx).await, json!(["1.7.4"]));

        node.remove(&[ObjectKind::LimitOrder.id(5)], &[1]);
        assert_no_batch(&mut rx).await;
    }

    #[tokio::test]
    async fn test_pair_order_does_not_matter() {
        let mut node = TestNode::start(NotifierConfig::default());
        let session = node.session();
        let (cb, mut rx) = recorder();
        session
            .lock()
            .subscribe_market(cb, AssetId(5), AssetId(0))
            .unwrap();
        assert_eq!(session.lock().registry().market_pairs().count(), 1);

        node.apply_block(vec![fill(8, 2, 5, 0), fill(9, 3, 0, 5)]);
        let batch = next_batch(&mut rx).await;
        assert_eq!(batch.as_array().unwrap().len(), 2);
        assert_eq!(batch[0][0]["fill_order"]["order_id"], "1.7.8");
        assert_eq!(batch[1][0]["fill_order"]["order_id"], "1.7.9");

        session
            .lock()
            .unsubscribe_market(AssetId(0), AssetId(5))
            .unwrap();
        node.apply_block(vec![fill(10, 2, 5, 0)]);
        assert_no_batch(&mut rx).await;
    }

    #[tokio::test]
    async fn test_same_asset_market_rejected() {
        let node = TestNode::start(NotifierConfig::default());
        let session = node.session();
        let (cb, _rx) = recorder();

        let result = session.lock().subscribe_market(cb, AssetId(3), AssetId(3));
        assert!(matches!(result, Err(NotifyError::SameAssetMarket { .. })));
        assert!(!session.lock().registry().has_market_subscriptions());
    }

    #[tokio::test]
    async fn test_market_and_update_streams_are_independent() {
        let node = TestNode::start(NotifierConfig::default());
        node.seed(account(1, "alice"));
        let session = node.session();
        let (updates, mut update_rx) = recorder();
        let (market, mut market_rx) = recorder();
        {
            let mut session = session.lock();
            session.subscribe(updates, false).unwrap();
            session.get_full_accounts(&["alice".to_string()], true);
            session.subscribe_market(market, AssetId(0), AssetId(5)).unwrap();
        }

        node.create(vec![limit_order(20, 1, 0, 5)], &[1]);
        assert_eq!(next_batch(&mut update_rx).await[0]["id"], "1.7.20");
        assert_eq!(next_batch(&mut market_rx).await[0]["id"], "1.7.20");

        session.lock().unsubscribe_all();
        node.create(vec![limit_order(21, 1, 0, 5)], &[1]);
        assert_no_batch(&mut update_rx).await;
        assert_no_batch(&mut market_rx).await;
    }
}
