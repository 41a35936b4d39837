//! # Registry Flows
//!
//! Scenarios that cross several operations:
//!
//! 1. **Agent life**: create, fund, withdraw, pause, terminate
//! 2. **Ownership**: transfers through `OwnershipTransfers` move every owner right
//! 3. **Concurrency**: parallel callers never lose value or reuse ids
//! 4. **Events**: each committed mutation emits exactly one event
//! 5. **Telemetry**: operations reach the Prometheus registry

#[cfg(test)]
mod tests {
    use crate::fixtures::*;
    use agent_registry::prelude::*;
    use futures::future::join_all;
    use std::collections::HashSet;
    use std::sync::Arc;

    fn open_registry() -> (Arc<TestRegistryService>, Arc<InMemoryPayouts>) {
        let payouts = Arc::new(InMemoryPayouts::new());
        let registry = AgentRegistryService::open(
            RegistryConfig::new(GOVERNANCE),
            Arc::new(InMemoryStore::new()),
            payouts.clone(),
            logic_directory(),
        )
        .unwrap();
        (Arc::new(registry), payouts)
    }

    // =========================================================================
    // AGENT LIFE
    // =========================================================================

    #[tokio::test]
    async fn test_full_agent_life() {
        let (registry, payouts) = open_registry();

        let id = registry.create_agent(BOB, echo_agent(ALICE)).await.unwrap();
        assert_eq!(id, AgentId(1));

        registry.fund(CAROL, id, U256::from(1_000)).await.unwrap();
        registry.withdraw(ALICE, id, U256::from(400)).await.unwrap();
        assert_eq!(payouts.received(ALICE), U256::from(400));

        let output = registry
            .execute_action(ALICE, id, b"status".to_vec())
            .await
            .unwrap();
        assert_eq!(output, b"status");

        registry.pause(ALICE, id).await.unwrap();
        assert!(registry
            .execute_action(ALICE, id, b"status".to_vec())
            .await
            .is_err());
        registry.unpause(ALICE, id).await.unwrap();
        registry.terminate(ALICE, id).await.unwrap();

        let state = registry.get_state(id).await.unwrap();
        assert_eq!(state.status, AgentStatus::Terminated);
        assert_eq!(state.balance, U256::from(600));
        assert!(registry.audit().await.is_valid());

        // The tombstone keeps its id; the next agent gets a fresh one.
        let next = registry.create_agent(ALICE, echo_agent(ALICE)).await.unwrap();
        assert_eq!(next, AgentId(2));
    }

    #[tokio::test]
    async fn test_rejected_operations_change_nothing() {
        let (registry, payouts) = open_registry();
        let id = registry.create_agent(ALICE, echo_agent(ALICE)).await.unwrap();
        registry.fund(BOB, id, U256::from(50)).await.unwrap();
        let before = registry.snapshot().await;
        let events_before = registry.events_since(0).await.len();

        let failures = [
            registry.withdraw(ALICE, id, U256::from(51)).await,
            registry.withdraw(BOB, id, U256::from(1)).await,
            registry.pause(BOB, id).await,
            registry.set_logic_address(ALICE, id, Address::ZERO).await,
            registry.set_metadata_uri(CAROL, id, "x".to_string()).await,
            registry.unpause(ALICE, id).await,
            registry.set_global_pause(ALICE, true).await,
        ];
        assert!(failures.iter().all(Result::is_err));

        assert_eq!(registry.snapshot().await, before);
        assert_eq!(registry.events_since(0).await.len(), events_before);
        assert_eq!(payouts.received(ALICE), U256::zero());
    }

    #[tokio::test]
    async fn test_global_pause_scenario() {
        let (registry, _) = open_registry();
        let id = registry.create_agent(ALICE, echo_agent(ALICE)).await.unwrap();
        registry.fund(BOB, id, U256::from(10)).await.unwrap();

        registry.set_global_pause(GOVERNANCE, true).await.unwrap();
        assert!(matches!(
            registry.withdraw(ALICE, id, U256::from(1)).await,
            Err(RegistryError::GloballyPaused { .. })
        ));
        assert!(registry.create_agent(ALICE, echo_agent(ALICE)).await.is_err());

        registry.set_global_pause(GOVERNANCE, false).await.unwrap();
        registry.withdraw(ALICE, id, U256::from(1)).await.unwrap();
        assert_eq!(registry.get_state(id).await.unwrap().balance, U256::from(9));
    }

    // =========================================================================
    // OWNERSHIP
    // =========================================================================

    #[tokio::test]
    async fn test_transfer_moves_all_owner_rights() {
        let (registry, payouts) = open_registry();
        let transfers = OwnershipTransfers::new(
            registry.clone(),
            registry.take_transfer_authority().unwrap(),
        );
        let id = registry.create_agent(ALICE, echo_agent(ALICE)).await.unwrap();
        registry.fund(CAROL, id, U256::from(100)).await.unwrap();

        transfers.transfer(ALICE, ALICE, BOB, id).await.unwrap();
        assert_eq!(registry.get_state(id).await.unwrap().owner, BOB);

        assert!(registry.withdraw(ALICE, id, U256::from(1)).await.is_err());
        assert!(registry.pause(ALICE, id).await.is_err());
        assert!(registry
            .update_metadata(ALICE, id, AgentMetadata::default())
            .await
            .is_err());

        registry.withdraw(BOB, id, U256::from(100)).await.unwrap();
        assert_eq!(payouts.received(BOB), U256::from(100));
        assert_eq!(payouts.received(ALICE), U256::zero());

        let events = registry.events_since(0).await;
        assert!(events.iter().any(|r| r.event
            == RegistryEvent::OwnerChanged {
                id,
                previous: ALICE,
                new: BOB
            }));
    }

    #[tokio::test]
    async fn test_transfer_rejections() {
        let (registry, _) = open_registry();
        let transfers = OwnershipTransfers::new(
            registry.clone(),
            registry.take_transfer_authority().unwrap(),
        );
        let id = registry.create_agent(ALICE, echo_agent(ALICE)).await.unwrap();

        // Not the holder.
        assert!(transfers.transfer(BOB, BOB, CAROL, id).await.is_err());
        // Holder signs for someone else's token.
        assert!(transfers.transfer(BOB, ALICE, CAROL, id).await.is_err());
        // Burn.
        assert!(transfers.transfer(ALICE, ALICE, Address::ZERO, id).await.is_err());
        // Unknown agent.
        assert_eq!(
            transfers
                .transfer(ALICE, ALICE, BOB, AgentId(42))
                .await
                .unwrap_err()
                .kind(),
            ErrorKind::NotFound
        );
        assert_eq!(registry.get_state(id).await.unwrap().owner, ALICE);
    }

    #[tokio::test]
    async fn test_transfer_chain() {
        let (registry, _) = open_registry();
        let transfers = OwnershipTransfers::new(
            registry.clone(),
            registry.take_transfer_authority().unwrap(),
        );
        let id = registry.create_agent(ALICE, echo_agent(ALICE)).await.unwrap();

        transfers.transfer(ALICE, ALICE, BOB, id).await.unwrap();
        transfers.transfer(BOB, BOB, CAROL, id).await.unwrap();
        assert!(transfers.transfer(ALICE, ALICE, BOB, id).await.is_err());

        assert_eq!(registry.agents_of(CAROL).await, vec![id]);
        assert!(registry.agents_of(ALICE).await.is_empty());
        assert!(registry.agents_of(BOB).await.is_empty());
    }

    // =========================================================================
    // CONCURRENCY
    // =========================================================================

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_creates_get_distinct_ids() {
        let (registry, _) = open_registry();

        let handles = (0..32).map(|_| {
            let registry = registry.clone();
            tokio::spawn(async move { registry.create_agent(ALICE, echo_agent(ALICE)).await })
        });
        let ids: Vec<AgentId> = join_all(handles)
            .await
            .into_iter()
            .map(|joined| joined.unwrap().unwrap())
            .collect();

        let unique: HashSet<_> = ids.iter().copied().collect();
        assert_eq!(unique.len(), 32);
        assert_eq!(registry.next_agent_id().await, AgentId(33));
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_ledger_conserves_value() {
        let (registry, payouts) = open_registry();
        let id = registry.create_agent(ALICE, echo_agent(ALICE)).await.unwrap();
        registry.fund(BOB, id, U256::from(500)).await.unwrap();

        let funders = (0..50).map(|_| {
            let registry = registry.clone();
            tokio::spawn(async move { registry.fund(BOB, id, U256::from(10)).await })
        });
        let withdrawers = (0..50).map(|_| {
            let registry = registry.clone();
            tokio::spawn(async move { registry.withdraw(ALICE, id, U256::from(7)).await })
        });
        let funded = join_all(funders).await;
        let withdrawn = join_all(withdrawers).await;

        // Callers that hit an in-flight withdrawal are turned away whole.
        let settled = |results: Vec<Result<Result<(), RegistryError>, _>>| {
            results
                .into_iter()
                .map(|joined| joined.unwrap())
                .inspect(|result| {
                    if let Err(err) = result {
                        assert!(matches!(err, RegistryError::Reentrant { .. }), "{err}");
                    }
                })
                .filter(Result::is_ok)
                .count()
        };
        let deposits = settled(funded);
        let paid = settled(withdrawn);

        let expected = U256::from(500 + 10 * deposits) - U256::from(7 * paid);
        assert_eq!(registry.get_state(id).await.unwrap().balance, expected);
        assert_eq!(payouts.received(ALICE), U256::from(7 * paid));
        assert!(registry.audit().await.is_valid());
    }

    // =========================================================================
    // EVENTS
    // =========================================================================

    #[tokio::test]
    async fn test_one_event_per_mutation() {
        let (registry, _) = open_registry();
        let id = registry.create_agent(ALICE, echo_agent(ALICE)).await.unwrap();
        registry.fund(BOB, id, U256::from(5)).await.unwrap();
        registry.withdraw(ALICE, id, U256::from(5)).await.unwrap();
        registry
            .set_metadata_uri(ALICE, id, "ipfs://v2".to_string())
            .await
            .unwrap();
        registry.set_global_pause(GOVERNANCE, true).await.unwrap();
        registry.set_governance(GOVERNANCE, CAROL).await.unwrap();

        let names: Vec<&str> = registry
            .events_since(0)
            .await
            .iter()
            .map(|r| r.event.name())
            .collect();
        assert_eq!(names.len(), 6);
        assert_eq!(registry.stats().await.operations_committed, 6);

        let tail = registry.events_since(4).await;
        assert_eq!(tail.len(), 2);
        assert_eq!(tail[0].sequence, 5);
    }

    // =========================================================================
    // TELEMETRY
    // =========================================================================

    #[tokio::test]
    async fn test_operations_reach_metrics() {
        let (registry, _) = open_registry();
        let id = registry.create_agent(ALICE, echo_agent(ALICE)).await.unwrap();
        registry.fund(BOB, id, U256::from(3)).await.unwrap();
        assert!(registry.withdraw(BOB, id, U256::from(1)).await.is_err());

        let exported = agent_telemetry::encode_metrics().unwrap();
        for name in [
            "ar_registry_operations_total",
            "ar_registry_rejections_total",
            "ar_registry_agents_created_total",
            "ar_ledger_value_deposited_total",
        ] {
            assert!(exported.contains(name), "{name} missing from export");
        }
    }
}
