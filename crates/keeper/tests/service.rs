//! # Keeper Service Tests
//!
//! Drives the keeper loop with a manual clock: request, delivery through the
//! scheduled oracle task, rebase and persistence.

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::time::Duration;

    use nextcopper_core::{AccountId, ElasticState, Fixed12, GenesisParams, ManualClock, RebaseEngine, RecordingFeed};
    use nextcopper_keeper::config::reference_config;
    use nextcopper_keeper::{
        run_scheduled_oracle, ChannelFeed, Keeper, KeeperError, ScheduledOracle, SharedState, StateStore,
    };
    use tempfile::TempDir;
    use tokio::sync::Mutex;
    use tokio_test::assert_ok;

    const PERIOD: u64 = 50;

    fn treasury() -> AccountId {
        AccountId::from("treasury")
    }

    fn reference_state() -> SharedState {
        let state = ElasticState::genesis(GenesisParams::reference(treasury())).unwrap();
        Arc::new(Mutex::new(state))
    }

    async fn wait_until_ready(state: &SharedState, height: u64) {
        let ready = tokio::time::timeout(Duration::from_secs(5), async {
            loop {
                if state.lock().await.is_rebase_ready(height) {
                    break;
                }
                tokio::task::yield_now().await;
            }
        })
        .await;
        assert!(ready.is_ok(), "oracle never delivered for block {}", height);
    }

    #[tokio::test]
    async fn test_request_deliver_rebase_cycle() {
        let state = reference_state();
        let clock = Arc::new(ManualClock::default());
        let mut keeper = Keeper::new(
            state.clone(),
            RebaseEngine::default(),
            clock.clone(),
            RecordingFeed::new(),
            None,
            false,
        );

        let report = keeper.tick().await.unwrap();
        assert!(!report.changed_state());

        clock.advance_blocks(PERIOD);
        let report = keeper.tick().await.unwrap();
        let request = report.requested.expect("request due at the first boundary");
        assert_eq!(request.period_index, 1);
        assert!(report.rebased.is_none());

        // Gate stays closed until the oracle answers
        assert!(!keeper.tick().await.unwrap().changed_state());

        state
            .lock()
            .await
            .deliver_observation(1, Fixed12::from_int(400_000), "1.424".parse().unwrap());

        let report = keeper.tick().await.unwrap();
        let outcome = report.rebased.expect("rebase ready after delivery");
        assert_eq!(outcome.supply_after, Fixed12::from_int(6_989_200));
        assert!(report.requested.is_none());
        assert_eq!(state.lock().await.balance_of(&treasury()), Fixed12::from_int(6_989_200));

        assert_ok!(keeper.health_check().await);
    }

    #[tokio::test]
    async fn test_scheduled_oracle_replays_reference_rounds() {
        let config = reference_config().unwrap();
        let state = reference_state();
        let clock = Arc::new(ManualClock::default());

        let (feed, requests) = ChannelFeed::channel();
        let oracle = ScheduledOracle::from_config(&config.oracle).unwrap();
        let oracle_task = tokio::spawn(run_scheduled_oracle(oracle, requests, state.clone(), None, Duration::ZERO));

        let mut keeper = Keeper::new(state.clone(), RebaseEngine::default(), clock.clone(), feed, None, false);

        for round in 1..=14u64 {
            let height = clock.advance_blocks(PERIOD);
            let report = keeper.tick().await.unwrap();
            assert_eq!(report.requested.map(|r| r.period_index), Some(round));

            wait_until_ready(&state, height).await;
            let report = keeper.tick().await.unwrap();
            assert!(report.rebased.is_some(), "round {} did not rebase", round);
        }

        {
            let state = state.lock().await;
            assert_eq!(state.total_supply(), Fixed12::from_int(7_839_322));
            assert_eq!(state.block_reward_rate(), Fixed12::from_raw(11_703_117_616));
            assert_eq!(state.period().rebase_count(), 14);
        }

        // Dropping the keeper drops the only feed and ends the oracle task
        drop(keeper);
        assert_ok!(oracle_task.await);
    }

    #[tokio::test]
    async fn test_dry_run_changes_nothing() {
        let state = reference_state();
        let clock = Arc::new(ManualClock::default());
        let mut keeper = Keeper::new(
            state.clone(),
            RebaseEngine::default(),
            clock.clone(),
            RecordingFeed::new(),
            None,
            true,
        );
        let before = state.lock().await.clone();

        clock.advance_blocks(PERIOD);
        assert!(!keeper.tick().await.unwrap().changed_state());

        state
            .lock()
            .await
            .deliver_observation(1, Fixed12::from_int(400_000), "1.424".parse().unwrap());
        assert!(!keeper.tick().await.unwrap().changed_state());

        let after = state.lock().await.clone();
        assert_eq!(after.ledger(), before.ledger());
        assert_eq!(after.period(), before.period());
        assert_eq!(after.request, before.request);
    }

    #[tokio::test]
    async fn test_state_is_persisted_after_changes() {
        let temp_dir = TempDir::new().unwrap();
        let store = StateStore::new(temp_dir.path().join("state.json"));
        let state = reference_state();
        let clock = Arc::new(ManualClock::default());
        let mut keeper = Keeper::new(
            state.clone(),
            RebaseEngine::default(),
            clock.clone(),
            RecordingFeed::new(),
            Some(store.clone()),
            false,
        );

        keeper.tick().await.unwrap();
        assert!(store.load().unwrap().is_none());

        clock.advance_blocks(PERIOD);
        keeper.tick().await.unwrap();
        let saved = store.load().unwrap().expect("state saved after request");
        assert_eq!(saved.request.requested_period_index, Some(1));
        assert_eq!(saved, *state.lock().await);
    }

    #[tokio::test]
    async fn test_oracle_delivery_is_persisted_before_rebase() {
        let temp_dir = TempDir::new().unwrap();
        let store = StateStore::new(temp_dir.path().join("state.json"));
        let config = reference_config().unwrap();
        let state = reference_state();
        let clock = Arc::new(ManualClock::default());

        let (feed, requests) = ChannelFeed::channel();
        let oracle = ScheduledOracle::from_config(&config.oracle).unwrap();
        let oracle_task = tokio::spawn(run_scheduled_oracle(
            oracle,
            requests,
            state.clone(),
            Some(store.clone()),
            Duration::ZERO,
        ));

        let mut keeper = Keeper::new(state.clone(), RebaseEngine::default(), clock.clone(), feed, None, false);
        let height = clock.advance_blocks(PERIOD);
        keeper.tick().await.unwrap();
        wait_until_ready(&state, height).await;

        // A restart at this point resumes with the delivery and rebases without a new request
        let restored = store.load().unwrap().expect("delivery saved by the oracle task");
        assert!(restored.is_rebase_ready(height));
        assert_eq!(restored.observation().quantity, Fixed12::from_int(400_000));

        let restored = Arc::new(Mutex::new(restored));
        let mut restarted = Keeper::new(
            restored.clone(),
            RebaseEngine::default(),
            clock.clone(),
            RecordingFeed::new(),
            None,
            false,
        );
        let report = restarted.tick().await.unwrap();
        assert_eq!(report.rebased.map(|o| o.supply_after), Some(Fixed12::from_int(6_989_200)));
        assert!(report.requested.is_none());

        drop(keeper);
        assert_ok!(oracle_task.await);
    }

    #[tokio::test]
    async fn test_closed_oracle_is_recoverable() {
        let (feed, requests) = ChannelFeed::channel();
        drop(requests);

        let state = reference_state();
        let clock = Arc::new(ManualClock::default());
        let mut keeper = Keeper::new(state.clone(), RebaseEngine::default(), clock.clone(), feed, None, false);

        clock.advance_blocks(PERIOD);
        let err = keeper.tick().await.unwrap_err();
        assert!(matches!(err, KeeperError::Rebase(_)));
        assert!(!err.is_fatal());
        assert!(!state.lock().await.request.has_requested());
    }

    #[test]
    fn test_health_check_flags_clock_behind_last_rebase() {
        let state = reference_state();
        let clock = Arc::new(ManualClock::default());
        let keeper = Keeper::new(state.clone(), RebaseEngine::default(), clock, RecordingFeed::new(), None, false);

        tokio_test::block_on(async {
            {
                let mut state = state.lock().await;
                state.deliver_observation(2, Fixed12::from_int(400_000), "1.424".parse().unwrap());
                RebaseEngine::default().rebase(&mut state, 100).unwrap();
                assert_eq!(state.period().last_rebase_block(), 100);
            }

            // Keeper clock is still at block 0
            let err = keeper.health_check().await.unwrap_err();
            assert!(matches!(err, KeeperError::StateError(_)));
        });
    }
}
