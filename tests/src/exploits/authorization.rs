//! # Authorization Attacks
//!
//! **Attack Vectors:**
//! - a previous owner replays owner operations after the agent was transferred
//! - a non-governance principal tries to seize the registry-wide settings
//! - a forged or foreign transfer authority tries to rewrite ownership
//! - the null principal tries to act as owner or governance
//!
//! **Defense:** every mutation re-reads the current owner and governance
//! principal under the state lock, and ownership sync requires the
//! capability issued once to the transfer mechanism of that very registry.

#[cfg(test)]
mod tests {
    use crate::fixtures::*;
    use agent_registry::prelude::*;
    use std::sync::Arc;

    fn open_registry() -> Arc<TestRegistryService> {
        Arc::new(
            AgentRegistryService::open(
                RegistryConfig::new(GOVERNANCE),
                Arc::new(InMemoryStore::new()),
                Arc::new(InMemoryPayouts::new()),
                logic_directory(),
            )
            .unwrap(),
        )
    }

    // =========================================================================
    // OLD OWNER REPLAY
    // =========================================================================

    #[tokio::test]
    async fn test_old_owner_replay_after_transfer() {
        let registry = open_registry();
        let transfers = OwnershipTransfers::new(
            registry.clone(),
            registry.take_transfer_authority().unwrap(),
        );
        let id = registry.create_agent(ALICE, echo_agent(ALICE)).await.unwrap();
        registry.fund(CAROL, id, U256::from(500)).await.unwrap();
        transfers.transfer(ALICE, ALICE, BOB, id).await.unwrap();
        let before = registry.snapshot().await;

        let replays = [
            registry.withdraw(ALICE, id, U256::from(500)).await,
            registry.set_logic_address(ALICE, id, CAROL).await,
            registry
                .update_metadata(ALICE, id, AgentMetadata::default())
                .await,
            registry
                .set_metadata_uri(ALICE, id, "ipfs://stolen".to_string())
                .await,
            registry.pause(ALICE, id).await,
            registry.terminate(ALICE, id).await,
            registry.execute_action(ALICE, id, Vec::new()).await.map(drop),
            // The old owner cannot pull the token back either.
            transfers.transfer(ALICE, BOB, ALICE, id).await,
        ];
        for replay in replays {
            assert_eq!(replay.unwrap_err().kind(), ErrorKind::Authorization);
        }

        assert_eq!(registry.snapshot().await, before);
        assert_eq!(registry.payouts().received(ALICE), U256::zero());
    }

    // =========================================================================
    // GOVERNANCE TAKEOVER
    // =========================================================================

    #[tokio::test]
    async fn test_non_governance_takeover() {
        let registry = open_registry();
        let id = registry.create_agent(ALICE, echo_agent(ALICE)).await.unwrap();

        for attacker in [ALICE, BOB, Address::ZERO] {
            for result in [
                registry.set_governance(attacker, attacker).await,
                registry.set_global_pause(attacker, true).await,
                registry
                    .set_module_registry(attacker, Address::repeat_byte(0x66))
                    .await,
            ] {
                assert!(matches!(result, Err(RegistryError::NotGovernance { .. })));
            }
        }

        assert_eq!(registry.governance().await, GOVERNANCE);
        assert!(!registry.global_pause().await);
        assert_eq!(registry.module_registry().await, None);
    }

    #[tokio::test]
    async fn test_governance_has_no_owner_rights() {
        let registry = open_registry();
        let id = registry.create_agent(ALICE, echo_agent(ALICE)).await.unwrap();
        registry.fund(BOB, id, U256::from(10)).await.unwrap();

        assert!(registry.withdraw(GOVERNANCE, id, U256::from(10)).await.is_err());
        assert!(registry.terminate(GOVERNANCE, id).await.is_err());
        assert!(registry
            .set_logic_address(GOVERNANCE, id, CAROL)
            .await
            .is_err());
        assert_eq!(registry.payouts().received(GOVERNANCE), U256::zero());
    }

    #[tokio::test]
    async fn test_rotated_governance_loses_rights() {
        let registry = open_registry();
        registry.set_governance(GOVERNANCE, CAROL).await.unwrap();

        assert!(registry.set_global_pause(GOVERNANCE, true).await.is_err());
        assert!(registry.set_governance(GOVERNANCE, GOVERNANCE).await.is_err());
        assert_eq!(registry.governance().await, CAROL);
    }

    // =========================================================================
    // OWNERSHIP SYNC FORGERY
    // =========================================================================

    #[tokio::test]
    async fn test_foreign_authority_rejected() {
        let registry = open_registry();
        let decoy = open_registry();
        let id = registry.create_agent(ALICE, echo_agent(ALICE)).await.unwrap();

        // An authority legitimately issued by another registry instance.
        let foreign = decoy.take_transfer_authority().unwrap();
        assert!(matches!(
            registry
                .on_ownership_transferred(&foreign, id, ALICE, BOB)
                .await,
            Err(RegistryError::InvalidTransferAuthority)
        ));

        // A transfer mechanism built around it is just as powerless.
        let rogue = OwnershipTransfers::new(registry.clone(), foreign);
        assert!(rogue.transfer(ALICE, ALICE, BOB, id).await.is_err());
        assert_eq!(registry.get_state(id).await.unwrap().owner, ALICE);
    }

    #[tokio::test]
    async fn test_authority_cannot_be_claimed_twice() {
        let registry = open_registry();
        let legitimate = registry.take_transfer_authority();
        assert!(legitimate.is_some());
        assert!(registry.take_transfer_authority().is_none());
    }

    #[tokio::test]
    async fn test_authority_cannot_forge_previous_owner() {
        let registry = open_registry();
        let authority = registry.take_transfer_authority().unwrap();
        let id = registry.create_agent(ALICE, echo_agent(ALICE)).await.unwrap();

        let err = registry
            .on_ownership_transferred(&authority, id, BOB, CAROL)
            .await
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Validation);
        assert!(registry
            .on_ownership_transferred(&authority, id, ALICE, Address::ZERO)
            .await
            .is_err());
        assert_eq!(registry.get_state(id).await.unwrap().owner, ALICE);
    }

    // =========================================================================
    // NULL PRINCIPAL
    // =========================================================================

    #[tokio::test]
    async fn test_null_principal_cannot_own() {
        let registry = open_registry();
        assert!(registry
            .create_agent(ALICE, echo_agent(Address::ZERO))
            .await
            .is_err());
        assert_eq!(registry.agent_count().await, 0);
        assert_eq!(registry.next_agent_id().await, AgentId(1));
    }
}
