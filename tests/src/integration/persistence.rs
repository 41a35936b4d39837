//! # Persistence Tests
//!
//! Registry state on a `FileSnapshotStore` across restarts:
//!
//! - committed operations survive a reopen, rejected ones leave no trace
//! - a version 1 snapshot is upgraded once and rewritten as version 2
//! - a data directory can be served by one registry at a time
//! - a damaged snapshot refuses to open instead of serving partial state

#[cfg(test)]
mod tests {
    use crate::fixtures::*;
    use agent_registry::adapters::codec::{encode_v1_snapshot, MAGIC};
    use agent_registry::domain::schema::{AgentRecordV1, SnapshotV1, SCHEMA_VERSION};
    use agent_registry::prelude::*;
    use std::collections::BTreeMap;
    use std::path::Path;
    use std::sync::Arc;
    use tempfile::TempDir;

    type FileRegistry = AgentRegistryService<FileSnapshotStore, InMemoryPayouts, StaticLogicDirectory>;

    fn open_at(dir: &Path, config: RegistryConfig) -> Result<FileRegistry, RegistryError> {
        AgentRegistryService::open(
            config,
            Arc::new(FileSnapshotStore::open(dir)?),
            Arc::new(InMemoryPayouts::new()),
            logic_directory(),
        )
    }

    fn open(dir: &Path) -> FileRegistry {
        open_at(dir, RegistryConfig::new(GOVERNANCE)).unwrap()
    }

    fn schema_version(dir: &Path) -> u32 {
        let bytes = std::fs::read(dir.join("registry.snapshot")).unwrap();
        assert_eq!(bytes[..4], MAGIC);
        u32::from_le_bytes([bytes[4], bytes[5], bytes[6], bytes[7]])
    }

    #[tokio::test]
    async fn test_state_survives_restart() {
        let dir = TempDir::new().unwrap();
        let metadata = AgentMetadata {
            persona: "{\"name\":\"scout\"}".to_string(),
            vault_uri: "ipfs://vault".to_string(),
            vault_hash: Hash::new([7; 32]),
            ..AgentMetadata::default()
        };

        let (alice_agent, bob_agent) = {
            let registry = open(dir.path());
            let a = registry
                .create_agent(
                    ALICE,
                    echo_agent(ALICE).with_metadata(metadata.clone()),
                )
                .await
                .unwrap();
            let b = registry.create_agent(BOB, echo_agent(BOB)).await.unwrap();
            registry.fund(CAROL, a, U256::from(900)).await.unwrap();
            registry.withdraw(ALICE, a, U256::from(300)).await.unwrap();
            registry.pause(BOB, b).await.unwrap();
            registry
                .set_module_registry(GOVERNANCE, Address::repeat_byte(0x77))
                .await
                .unwrap();
            registry.set_global_pause(GOVERNANCE, true).await.unwrap();
            // Rejected: must not be persisted.
            assert!(registry.withdraw(ALICE, a, U256::from(10_000)).await.is_err());
            (a, b)
        };

        let registry = open(dir.path());
        let a = registry.get_state(alice_agent).await.unwrap();
        assert_eq!(a.owner, ALICE);
        assert_eq!(a.balance, U256::from(600));
        assert_eq!(registry.get_metadata(alice_agent).await.unwrap(), metadata);
        assert_eq!(
            registry.get_state(bob_agent).await.unwrap().status,
            AgentStatus::Paused
        );
        assert_eq!(registry.next_agent_id().await, AgentId(3));
        assert!(registry.global_pause().await);
        assert_eq!(
            registry.module_registry().await,
            Some(Address::repeat_byte(0x77))
        );
        assert!(registry.audit().await.is_valid());
        // Events are not carried across restarts.
        assert!(registry.events_since(0).await.is_empty());
    }

    #[tokio::test]
    async fn test_persisted_governance_survives_restart() {
        let dir = TempDir::new().unwrap();
        {
            let registry = open(dir.path());
            registry.set_governance(GOVERNANCE, CAROL).await.unwrap();
        }

        // The configured principal only seeds a fresh registry.
        let registry = open(dir.path());
        assert_eq!(registry.governance().await, CAROL);
        assert!(registry.set_global_pause(GOVERNANCE, true).await.is_err());
        registry.set_global_pause(CAROL, true).await.unwrap();
    }

    #[tokio::test]
    async fn test_ids_not_reused_after_restart() {
        let dir = TempDir::new().unwrap();
        {
            let registry = open(dir.path());
            for _ in 0..3 {
                registry.create_agent(ALICE, echo_agent(ALICE)).await.unwrap();
            }
            registry.terminate(ALICE, AgentId(3)).await.unwrap();
        }

        let registry = open(dir.path());
        let id = registry.create_agent(BOB, echo_agent(BOB)).await.unwrap();
        assert_eq!(id, AgentId(4));
        assert_eq!(registry.agent_count().await, 4);
    }

    #[tokio::test]
    async fn test_v1_snapshot_is_upgraded_once() {
        let dir = TempDir::new().unwrap();
        let record = AgentRecordV1 {
            id: AgentId(1),
            owner: ALICE,
            logic: ECHO_LOGIC,
            status: AgentStatus::Active,
            balance: U256::from(250),
            persona: "legacy persona".to_string(),
            memory: String::new(),
            voice_hash: "voice-1".to_string(),
            animation_uri: "ipfs://anim".to_string(),
            metadata_uri: "ipfs://legacy".to_string(),
        };
        let v1 = SnapshotV1 {
            governance: GOVERNANCE,
            global_pause: false,
            next_id: 2,
            agents: BTreeMap::from([(AgentId(1), record)]),
        };
        {
            let store = FileSnapshotStore::open(dir.path()).unwrap();
            store.write_raw(&encode_v1_snapshot(&v1).unwrap()).unwrap();
        }
        assert_eq!(schema_version(dir.path()), 1);

        {
            let registry = open(dir.path());
            assert_eq!(schema_version(dir.path()), SCHEMA_VERSION);

            let metadata = registry.get_metadata(AgentId(1)).await.unwrap();
            assert_eq!(metadata.persona, "legacy persona");
            assert_eq!(metadata.voice_hash, "voice-1");
            assert!(metadata.vault_uri.is_empty());
            assert_eq!(
                registry.get_metadata_uri(AgentId(1)).await.unwrap(),
                "ipfs://legacy"
            );
            assert_eq!(registry.module_registry().await, None);

            // Upgraded balances are fully withdrawable.
            registry
                .withdraw(ALICE, AgentId(1), U256::from(250))
                .await
                .unwrap();
            assert!(registry.audit().await.is_valid());
        }

        let registry = open(dir.path());
        assert_eq!(
            registry.get_state(AgentId(1)).await.unwrap().balance,
            U256::zero()
        );
    }

    #[test]
    fn test_directory_single_writer() {
        let dir = TempDir::new().unwrap();
        let first = open(dir.path());
        assert!(matches!(
            open_at(dir.path(), RegistryConfig::new(GOVERNANCE)),
            Err(RegistryError::Storage(StoreError::Locked { .. }))
        ));
        drop(first);
        assert!(open_at(dir.path(), RegistryConfig::new(GOVERNANCE)).is_ok());
    }

    #[test]
    fn test_damaged_snapshot_refuses_to_open() {
        let dir = TempDir::new().unwrap();
        drop(open(dir.path()));

        let path = dir.path().join("registry.snapshot");
        let mut bytes = std::fs::read(&path).unwrap();
        bytes.truncate(bytes.len() - 3);
        std::fs::write(&path, bytes).unwrap();

        let err = open_at(dir.path(), RegistryConfig::new(GOVERNANCE))
            .err()
            .unwrap();
        assert_eq!(err.kind(), ErrorKind::Storage);
    }

    #[test]
    fn test_future_schema_refuses_to_open() {
        let dir = TempDir::new().unwrap();
        let mut bytes = MAGIC.to_vec();
        bytes.extend_from_slice(&(SCHEMA_VERSION + 1).to_le_bytes());
        {
            let store = FileSnapshotStore::open(dir.path()).unwrap();
            store.write_raw(&bytes).unwrap();
        }

        assert!(matches!(
            open_at(dir.path(), RegistryConfig::new(GOVERNANCE)),
            Err(RegistryError::Storage(StoreError::UnsupportedVersion { .. }))
        ));
    }

    #[test]
    fn test_from_env_lookup_drives_file_store() {
        let dir = TempDir::new().unwrap();
        let data_dir = dir.path().join("registry");
        let data_dir_str = data_dir.to_string_lossy().to_string();
        let config = RegistryConfig::from_lookup(|key| match key {
            "AR_GOVERNANCE" => Some(format!("{GOVERNANCE:?}")),
            "AR_DATA_DIR" => Some(data_dir_str.clone()),
            _ => None,
        })
        .unwrap();

        let store_dir = config.data_dir.clone().unwrap();
        let registry = open_at(&store_dir, config).unwrap();
        assert_eq!(registry.store().dir(), data_dir.as_path());
        assert!(data_dir.join("registry.snapshot").exists());
    }
}
