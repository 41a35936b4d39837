//! # Agent Registry Service
//!
//! Wires the domain to the outbound ports and implements the inbound API.
//!
//! ## Execution Model
//!
//! All registry state sits behind one `tokio::sync::RwLock`. Every mutation:
//!
//! 1. takes the write lock,
//! 2. checks existence, authorization, pause policy, in-flight guard and the
//!    termination freeze (in that order),
//! 3. applies the change, persists the full state, and restores the previous
//!    values if either step fails,
//! 4. appends exactly one event.
//!
//! `withdraw` is the only operation that awaits an external collaborator. It
//! commits the debit first, marks the agent in-flight, releases the lock for
//! the payout, then either records the withdrawal or reverses the debit.
//!
//! ## Settlement
//!
//! A withdrawal whose future is dropped mid-payout leaves a [`Settlement`]
//! behind. So does a reversal that could not be persisted. Queued settlements
//! are applied by the next mutation to take the write lock, before its own
//! gate runs. The agent stays in-flight, and every mutation against it is
//! rejected with `Reentrant`, until its settlement is durable.

use crate::adapters::{InMemoryPayouts, InMemoryStore, StaticLogicDirectory};
use crate::config::RegistryConfig;
use crate::domain::authorization::{authorize, Operation};
use crate::domain::entities::{AgentRecord, AgentState, RegistrySettings, RegistryState};
use crate::domain::invariants::{check_all_invariants, InvariantCheckResult};
use crate::domain::ledger::{self, LedgerTotals};
use crate::domain::lifecycle::{AgentStatus, LifecycleAction};
use crate::domain::metadata::AgentMetadata;
use crate::domain::value_objects::{Address, AgentId, U256};
use crate::errors::{RegistryError, StoreError};
use crate::events::{EventLog, EventRecord, RegistryEvent};
use crate::ports::inbound::{
    AgentRegistryApi, CreateAgentRequest, OwnershipSync, TransferAuthority,
};
use crate::ports::outbound::{ActionContext, LoadedState, LogicDirectory, PayoutGateway, RegistryStore};
use crate::telemetry;

use async_trait::async_trait;
use std::collections::HashSet;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use parking_lot::Mutex;
use tokio::sync::{RwLock, RwLockWriteGuard};
use tracing::{debug, error, info, instrument, warn};
use uuid::Uuid;

/// Statistics for the registry service (since process start).
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct ServiceStats {
    /// Mutating operations that committed.
    pub operations_committed: u64,
    /// Mutating operations that were rejected or rolled back.
    pub operations_rejected: u64,
    /// Value credited by `fund`.
    pub total_deposited: U256,
    /// Value paid out by `withdraw`.
    pub total_withdrawn: U256,
    /// Withdrawals rolled back because the payout failed.
    pub payout_failures: u64,
}

struct RegistryInner {
    state: RegistryState,
    in_flight: HashSet<AgentId>,
    events: EventLog,
}

/// Values restored when a mutation or its persist fails.
struct Checkpoint {
    settings: RegistrySettings,
    next_id: u64,
    totals: LedgerTotals,
    record: Option<(AgentId, Option<AgentRecord>)>,
}

impl Checkpoint {
    fn capture(state: &RegistryState, touched: Option<AgentId>) -> Self {
        Self {
            settings: state.settings.clone(),
            next_id: state.next_id,
            totals: state.totals,
            record: touched.map(|id| (id, state.agents.get(&id).cloned())),
        }
    }

    fn restore(self, state: &mut RegistryState) {
        state.settings = self.settings;
        state.next_id = self.next_id;
        state.totals = self.totals;
        match self.record {
            Some((id, Some(record))) => {
                state.agents.insert(id, record);
            }
            Some((id, None)) => {
                state.agents.remove(&id);
            }
            None => {}
        }
    }
}

/// Outstanding end of a withdrawal whose debit is already committed.
#[derive(Clone, Copy, Debug)]
struct Settlement {
    id: AgentId,
    amount: U256,
    /// The payout returned `Ok`; only the in-flight mark and the event remain.
    paid: bool,
}

/// Queues its settlement if dropped before [`PendingPayout::disarm`].
///
/// A payout cancelled before it returned is treated as not paid.
struct PendingPayout<'a> {
    queue: &'a Mutex<Vec<Settlement>>,
    settlement: Settlement,
    armed: bool,
}

impl<'a> PendingPayout<'a> {
    fn new(queue: &'a Mutex<Vec<Settlement>>, id: AgentId, amount: U256) -> Self {
        Self {
            queue,
            settlement: Settlement {
                id,
                amount,
                paid: false,
            },
            armed: true,
        }
    }

    fn mark_paid(&mut self) {
        self.settlement.paid = true;
    }

    fn disarm(mut self) -> Settlement {
        self.armed = false;
        self.settlement
    }
}

impl Drop for PendingPayout<'_> {
    fn drop(&mut self) {
        if self.armed {
            let settlement = self.settlement;
            warn!(
                agent_id = %settlement.id,
                amount = %settlement.amount,
                paid = settlement.paid,
                "withdrawal abandoned before settling, queued"
            );
            self.queue.lock().push(settlement);
        }
    }
}

/// The agent registry.
pub struct AgentRegistryService<S: RegistryStore, P: PayoutGateway, L: LogicDirectory> {
    /// Service configuration.
    config: RegistryConfig,
    /// Durable state.
    store: Arc<S>,
    /// External value transfer.
    payouts: Arc<P>,
    /// Logic reference resolution.
    logic: Arc<L>,
    /// Registry state, in-flight withdrawals and the event log.
    inner: RwLock<RegistryInner>,
    /// Withdrawals waiting to be settled under the write lock.
    settlements: Mutex<Vec<Settlement>>,
    /// Service statistics.
    stats: RwLock<ServiceStats>,
    /// Binds the transfer authority to this instance.
    instance_id: Uuid,
    authority_issued: AtomicBool,
}

/// Registry wired to the in-memory adapters.
pub type TestRegistryService =
    AgentRegistryService<InMemoryStore, InMemoryPayouts, StaticLogicDirectory>;

impl<S: RegistryStore, P: PayoutGateway, L: LogicDirectory> AgentRegistryService<S, P, L> {
    /// Opens the registry on top of `store`.
    ///
    /// A fresh store is seeded with `config.governance`. A snapshot written by
    /// an older schema is upgraded and written back before anything else
    /// happens. The loaded state is audited before it is served.
    ///
    /// # Errors
    ///
    /// - [`RegistryError::InvalidInput`] for an invalid configuration
    /// - [`RegistryError::Storage`] if the store fails or the state is inconsistent
    pub fn open(
        config: RegistryConfig,
        store: Arc<S>,
        payouts: Arc<P>,
        logic: Arc<L>,
    ) -> Result<Self, RegistryError> {
        config
            .validate()
            .map_err(|e| RegistryError::invalid(e.to_string()))?;

        let state = match store.load()? {
            Some(LoadedState {
                state,
                upgraded_from,
            }) => {
                if let Some(version) = upgraded_from {
                    info!(from = version, agents = state.agents.len(), "upgrading registry snapshot");
                    store.persist(&state)?;
                }
                state
            }
            None => {
                let state = RegistryState::new(config.governance);
                store.persist(&state)?;
                info!(governance = %config.governance, "initialized new registry");
                state
            }
        };

        if let InvariantCheckResult::Invalid(violations) = check_all_invariants(&state) {
            let summary = violations
                .iter()
                .map(ToString::to_string)
                .collect::<Vec<_>>()
                .join("; ");
            error!(%summary, "registry state failed its audit");
            return Err(StoreError::Corrupted(summary).into());
        }

        let instance_id = Uuid::new_v4();
        info!(
            %instance_id,
            agents = state.agents.len(),
            next_id = state.next_id,
            "agent registry opened"
        );

        Ok(Self {
            config,
            store,
            payouts,
            logic,
            inner: RwLock::new(RegistryInner {
                state,
                in_flight: HashSet::new(),
                events: EventLog::new(),
            }),
            settlements: Mutex::new(Vec::new()),
            stats: RwLock::new(ServiceStats::default()),
            instance_id,
            authority_issued: AtomicBool::new(false),
        })
    }

    /// Hands out the ownership transfer authority. Returns None after the first call.
    pub fn take_transfer_authority(&self) -> Option<TransferAuthority> {
        if self.authority_issued.swap(true, Ordering::SeqCst) {
            warn!("transfer authority requested again");
            None
        } else {
            Some(TransferAuthority::new(self.instance_id))
        }
    }

    /// Instance id of this registry.
    pub fn instance_id(&self) -> Uuid {
        self.instance_id
    }

    /// Active configuration.
    pub fn config(&self) -> &RegistryConfig {
        &self.config
    }

    /// Display name of the identity collection.
    pub fn collection_name(&self) -> &str {
        &self.config.collection_name
    }

    /// Ticker symbol of the identity collection.
    pub fn collection_symbol(&self) -> &str {
        &self.config.collection_symbol
    }

    /// The store adapter.
    pub fn store(&self) -> &Arc<S> {
        &self.store
    }

    /// The payout adapter.
    pub fn payouts(&self) -> &Arc<P> {
        &self.payouts
    }

    /// Get current service statistics.
    pub async fn stats(&self) -> ServiceStats {
        self.stats.read().await.clone()
    }

    /// Withdrawals still waiting to be settled.
    pub fn unsettled_withdrawals(&self) -> usize {
        self.settlements.lock().len()
    }

    /// Audits the current state.
    pub async fn audit(&self) -> InvariantCheckResult {
        check_all_invariants(&self.inner.read().await.state)
    }

    /// Copy of the current state.
    pub async fn snapshot(&self) -> RegistryState {
        self.inner.read().await.state.clone()
    }

    // -------------------------------------------------------------------------
    // Internals
    // -------------------------------------------------------------------------

    async fn observe<T>(
        &self,
        operation: Operation,
        result: Result<T, RegistryError>,
    ) -> Result<T, RegistryError> {
        let mut stats = self.stats.write().await;
        match &result {
            Ok(_) => {
                stats.operations_committed += 1;
                telemetry::committed(operation);
            }
            Err(err) => {
                stats.operations_rejected += 1;
                warn!(%operation, kind = %err.kind(), error = %err, "operation rejected");
                telemetry::rejected(operation, err.kind());
            }
        }
        result
    }

    /// Write lock with every queued settlement applied that can be.
    async fn write(&self) -> RwLockWriteGuard<'_, RegistryInner> {
        let mut inner = self.inner.write().await;
        let queued = std::mem::take(&mut *self.settlements.lock());
        if queued.is_empty() {
            return inner;
        }

        let mut paid_out = U256::zero();
        let mut retry = Vec::new();
        for settlement in queued {
            match self.settle(&mut inner, settlement) {
                Ok(()) if settlement.paid => paid_out = paid_out.saturating_add(settlement.amount),
                Ok(()) => info!(agent_id = %settlement.id, "abandoned withdrawal reversed"),
                Err(e) => {
                    error!(agent_id = %settlement.id, error = %e, "withdrawal still unsettled");
                    retry.push(settlement);
                }
            }
        }
        if !retry.is_empty() {
            self.settlements.lock().extend(retry);
        }
        if !paid_out.is_zero() {
            let mut stats = self.stats.write().await;
            stats.total_withdrawn = stats.total_withdrawn.saturating_add(paid_out);
            drop(stats);
            telemetry::value_moved(false, paid_out);
        }
        inner
    }

    /// Ends a withdrawal: records a completed payout, or durably reverses the debit.
    ///
    /// On error nothing changed and the agent stays in-flight.
    fn settle(&self, inner: &mut RegistryInner, settlement: Settlement) -> Result<(), RegistryError> {
        let Settlement { id, amount, paid } = settlement;
        let RegistryInner {
            state,
            in_flight,
            events,
        } = inner;
        if paid {
            events.push(RegistryEvent::Withdrawn { id, amount });
        } else {
            self.commit(state, Some(id), |state| {
                let RegistryState { agents, totals, .. } = state;
                let record = agents
                    .get_mut(&id)
                    .ok_or(RegistryError::AgentNotFound { id })?;
                record.balance = ledger::credit(record.balance, amount)?;
                totals.reverse_withdrawal(amount)?;
                Ok(())
            })?;
        }
        in_flight.remove(&id);
        Ok(())
    }

    /// Existence, authorization, pause policy, in-flight guard, termination freeze.
    fn gate(
        &self,
        inner: &RegistryInner,
        operation: Operation,
        caller: Address,
        id: AgentId,
    ) -> Result<(), RegistryError> {
        let state = &inner.state;
        let record = state.agent(id)?;
        authorize(operation, caller, Some(record.owner), state.settings.governance)?;
        self.config
            .pause_policy
            .check(state.settings.global_pause, operation)?;
        if inner.in_flight.contains(&id) {
            return Err(RegistryError::Reentrant { id, operation });
        }
        if record.status.is_terminal() && self.config.termination_policy.freezes(operation) {
            return Err(RegistryError::AgentTerminated { id, operation });
        }
        Ok(())
    }

    /// Applies `mutate` and persists; on any failure the touched values are restored.
    fn commit<T>(
        &self,
        state: &mut RegistryState,
        touched: Option<AgentId>,
        mutate: impl FnOnce(&mut RegistryState) -> Result<T, RegistryError>,
    ) -> Result<T, RegistryError> {
        let checkpoint = Checkpoint::capture(state, touched);
        let outcome = match mutate(state) {
            Ok(value) => match self.store.persist(state) {
                Ok(()) => Ok(value),
                Err(e) => {
                    error!(error = %e, "failed to persist registry state");
                    Err(RegistryError::from(e))
                }
            },
            Err(e) => Err(e),
        };
        if outcome.is_err() {
            checkpoint.restore(state);
        }
        outcome
    }

    /// Gated, committed mutation of one agent record that emits one event.
    async fn mutate_agent<T>(
        &self,
        operation: Operation,
        caller: Address,
        id: AgentId,
        mutate: impl FnOnce(&mut AgentRecord, &mut LedgerTotals) -> Result<(T, RegistryEvent), RegistryError>,
    ) -> Result<T, RegistryError> {
        let _timer = telemetry::timer();
        let mut inner = self.write().await;
        self.gate(&inner, operation, caller, id)?;

        let RegistryInner { state, events, .. } = &mut *inner;
        let (value, event) = self.commit(state, Some(id), |state| {
            let RegistryState { agents, totals, .. } = state;
            let record = agents
                .get_mut(&id)
                .ok_or(RegistryError::AgentNotFound { id })?;
            mutate(record, totals)
        })?;
        events.push(event);
        Ok(value)
    }

    /// Governance-gated, committed mutation of the registry settings.
    async fn mutate_settings(
        &self,
        operation: Operation,
        caller: Address,
        mutate: impl FnOnce(&mut RegistrySettings) -> Result<RegistryEvent, RegistryError>,
    ) -> Result<(), RegistryError> {
        let _timer = telemetry::timer();
        let mut inner = self.write().await;
        authorize(operation, caller, None, inner.state.settings.governance)?;

        let RegistryInner { state, events, .. } = &mut *inner;
        let event = self.commit(state, None, |state| mutate(&mut state.settings))?;
        events.push(event);
        Ok(())
    }

    async fn transition(
        &self,
        operation: Operation,
        action: LifecycleAction,
        caller: Address,
        id: AgentId,
    ) -> Result<(), RegistryError> {
        self.mutate_agent(operation, caller, id, |record, _| {
            let from = record.status;
            let to = from
                .apply(action)
                .map_err(|t| RegistryError::InvalidTransition {
                    id,
                    from: t.from,
                    action: t.action,
                })?;
            record.status = to;
            info!(agent_id = %id, %from, %to, "agent status changed");
            Ok(((), RegistryEvent::StatusChanged { id, from, to }))
        })
        .await
    }

    #[instrument(skip(self, request), fields(caller = %caller, owner = %request.owner))]
    async fn create_agent_inner(
        &self,
        caller: Address,
        request: CreateAgentRequest,
    ) -> Result<AgentId, RegistryError> {
        let _timer = telemetry::timer();
        let operation = Operation::CreateAgent;
        let mut inner = self.write().await;
        let settings = &inner.state.settings;
        authorize(operation, caller, None, settings.governance)?;
        self.config
            .pause_policy
            .check(settings.global_pause, operation)?;
        if request.logic.is_zero() {
            return Err(RegistryError::invalid("logic address is zero"));
        }
        if request.owner.is_zero() {
            return Err(RegistryError::invalid("owner address is zero"));
        }

        let RegistryInner { state, events, .. } = &mut *inner;
        let touched = state.peek_next_id();
        let CreateAgentRequest {
            owner,
            logic,
            metadata_uri,
            metadata,
        } = request;
        let id = self.commit(state, Some(touched), |state| {
            let id = state.allocate_id()?;
            let record = AgentRecord::new(id, owner, logic, metadata_uri, metadata.unwrap_or_default());
            state.agents.insert(id, record);
            Ok(id)
        })?;
        events.push(RegistryEvent::Created { id, owner, logic });
        telemetry::agent_created();
        info!(agent_id = %id, "agent created");
        Ok(id)
    }

    #[instrument(skip(self), fields(caller = %caller, agent_id = %id, amount = %amount))]
    async fn fund_inner(&self, caller: Address, id: AgentId, amount: U256) -> Result<(), RegistryError> {
        self.mutate_agent(Operation::Fund, caller, id, |record, totals| {
            record.balance = ledger::credit(record.balance, amount)?;
            totals.record_deposit(amount)?;
            Ok(((), RegistryEvent::Funded { id, amount }))
        })
        .await?;

        let mut stats = self.stats.write().await;
        stats.total_deposited = stats.total_deposited.saturating_add(amount);
        drop(stats);
        telemetry::value_moved(true, amount);
        Ok(())
    }

    #[instrument(skip(self), fields(caller = %caller, agent_id = %id, amount = %amount))]
    async fn withdraw_inner(
        &self,
        caller: Address,
        id: AgentId,
        amount: U256,
    ) -> Result<(), RegistryError> {
        // Effects first: the debit is committed before any value leaves.
        let (owner, mut pending) = {
            let _timer = telemetry::timer();
            let mut inner = self.write().await;
            self.gate(&inner, Operation::Withdraw, caller, id)?;

            let RegistryInner {
                state, in_flight, ..
            } = &mut *inner;
            let owner = self.commit(state, Some(id), |state| {
                let RegistryState { agents, totals, .. } = state;
                let record = agents
                    .get_mut(&id)
                    .ok_or(RegistryError::AgentNotFound { id })?;
                record.balance = ledger::debit(record.balance, amount)?;
                totals.record_withdrawal(amount)?;
                Ok(record.owner)
            })?;
            in_flight.insert(id);
            (owner, PendingPayout::new(&self.settlements, id, amount))
        };

        debug!(recipient = %owner, "balance debited, releasing payout");
        let payout = self.payouts.pay(owner, amount).await;
        if payout.is_ok() {
            pending.mark_paid();
        }

        let mut inner = self.write().await;
        let settlement = pending.disarm();
        let settled = self.settle(&mut inner, settlement);
        if settled.is_err() {
            self.settlements.lock().push(settlement);
        }
        drop(inner);

        match payout {
            Ok(()) => {
                settled?;
                let mut stats = self.stats.write().await;
                stats.total_withdrawn = stats.total_withdrawn.saturating_add(amount);
                drop(stats);
                telemetry::value_moved(false, amount);
                info!("withdrawal paid out");
                Ok(())
            }
            Err(err) => {
                self.stats.write().await.payout_failures += 1;
                telemetry::payout_failed();
                match settled {
                    Ok(()) => {
                        error!(error = %err, "payout failed, debit reversed");
                        Err(RegistryError::PayoutFailed(err))
                    }
                    Err(e) => {
                        error!(
                            payout_error = %err,
                            error = %e,
                            "payout failed and the reversal is not durable yet, agent stays blocked"
                        );
                        Err(e)
                    }
                }
            }
        }
    }

    #[instrument(skip(self, payload), fields(caller = %caller, agent_id = %id, bytes = payload.len()))]
    async fn execute_action_inner(
        &self,
        caller: Address,
        id: AgentId,
        payload: Vec<u8>,
    ) -> Result<Vec<u8>, RegistryError> {
        let (logic_ref, handler, context) = {
            let inner = self.write().await;
            self.gate(&inner, Operation::ExecuteAction, caller, id)?;
            let record = inner.state.agent(id)?;
            if record.status != AgentStatus::Active {
                return Err(RegistryError::AgentNotActive {
                    id,
                    status: record.status,
                });
            }
            let handler = self.logic.resolve(record.logic).ok_or_else(|| {
                RegistryError::invalid(format!("no logic registered for {:?}", record.logic))
            })?;
            let context = ActionContext {
                agent_id: id,
                owner: record.owner,
                balance: record.balance,
            };
            (record.logic, handler, context)
        };

        let output = handler.handle_action(&context, &payload)?;
        self.write().await.events.push(RegistryEvent::ActionExecuted {
            id,
            logic: logic_ref,
        });
        debug!(output_bytes = output.len(), "action executed");
        Ok(output)
    }

    #[instrument(skip(self, authority), fields(agent_id = %id, previous = %previous, new_owner = %new_owner))]
    async fn sync_owner_inner(
        &self,
        authority: &TransferAuthority,
        id: AgentId,
        previous: Address,
        new_owner: Address,
    ) -> Result<(), RegistryError> {
        if authority.registry() != self.instance_id {
            return Err(RegistryError::InvalidTransferAuthority);
        }
        let operation = Operation::SyncOwnership;
        let mut inner = self.write().await;
        let record = inner.state.agent(id)?;
        if inner.in_flight.contains(&id) {
            return Err(RegistryError::Reentrant { id, operation });
        }
        if record.owner != previous {
            return Err(RegistryError::invalid("transfer from incorrect owner"));
        }
        if new_owner.is_zero() {
            return Err(RegistryError::invalid("new owner is zero"));
        }

        let RegistryInner { state, events, .. } = &mut *inner;
        self.commit(state, Some(id), |state| {
            state.agent_mut(id)?.owner = new_owner;
            Ok(())
        })?;
        events.push(RegistryEvent::OwnerChanged {
            id,
            previous,
            new: new_owner,
        });
        info!("agent owner synchronized");
        Ok(())
    }
}

/// Create a registry with in-memory adapters (for testing).
///
/// # Errors
///
/// [`RegistryError::InvalidInput`] if `governance` is the zero address.
pub fn create_test_service(governance: Address) -> Result<TestRegistryService, RegistryError> {
    AgentRegistryService::open(
        RegistryConfig::new(governance),
        Arc::new(InMemoryStore::new()),
        Arc::new(InMemoryPayouts::new()),
        Arc::new(StaticLogicDirectory::new()),
    )
}

// =============================================================================
// AgentRegistryApi Implementation
// =============================================================================

#[async_trait]
impl<S: RegistryStore, P: PayoutGateway, L: LogicDirectory> AgentRegistryApi
    for AgentRegistryService<S, P, L>
{
    async fn create_agent(
        &self,
        caller: Address,
        request: CreateAgentRequest,
    ) -> Result<AgentId, RegistryError> {
        let result = self.create_agent_inner(caller, request).await;
        self.observe(Operation::CreateAgent, result).await
    }

    async fn get_state(&self, id: AgentId) -> Result<AgentState, RegistryError> {
        Ok(self.inner.read().await.state.agent(id)?.state())
    }

    async fn get_metadata(&self, id: AgentId) -> Result<AgentMetadata, RegistryError> {
        Ok(self.inner.read().await.state.agent(id)?.metadata.clone())
    }

    async fn get_metadata_uri(&self, id: AgentId) -> Result<String, RegistryError> {
        Ok(self.inner.read().await.state.agent(id)?.metadata_uri.clone())
    }

    async fn set_logic_address(
        &self,
        caller: Address,
        id: AgentId,
        logic: Address,
    ) -> Result<(), RegistryError> {
        let result = self
            .mutate_agent(Operation::SetLogicAddress, caller, id, |record, _| {
                if logic.is_zero() {
                    return Err(RegistryError::invalid("logic address is zero"));
                }
                let old = std::mem::replace(&mut record.logic, logic);
                Ok(((), RegistryEvent::LogicUpdated { id, old, new: logic }))
            })
            .await;
        self.observe(Operation::SetLogicAddress, result).await
    }

    async fn update_metadata(
        &self,
        caller: Address,
        id: AgentId,
        metadata: AgentMetadata,
    ) -> Result<(), RegistryError> {
        let result = self
            .mutate_agent(Operation::UpdateMetadata, caller, id, |record, _| {
                record.metadata = metadata;
                Ok(((), RegistryEvent::MetadataUpdated { id }))
            })
            .await;
        self.observe(Operation::UpdateMetadata, result).await
    }

    async fn set_metadata_uri(
        &self,
        caller: Address,
        id: AgentId,
        uri: String,
    ) -> Result<(), RegistryError> {
        let result = self
            .mutate_agent(Operation::SetMetadataUri, caller, id, |record, _| {
                record.metadata_uri = uri;
                Ok(((), RegistryEvent::MetadataUpdated { id }))
            })
            .await;
        self.observe(Operation::SetMetadataUri, result).await
    }

    async fn pause(&self, caller: Address, id: AgentId) -> Result<(), RegistryError> {
        let result = self
            .transition(Operation::Pause, LifecycleAction::Pause, caller, id)
            .await;
        self.observe(Operation::Pause, result).await
    }

    async fn unpause(&self, caller: Address, id: AgentId) -> Result<(), RegistryError> {
        let result = self
            .transition(Operation::Unpause, LifecycleAction::Unpause, caller, id)
            .await;
        self.observe(Operation::Unpause, result).await
    }

    async fn terminate(&self, caller: Address, id: AgentId) -> Result<(), RegistryError> {
        let result = self
            .transition(Operation::Terminate, LifecycleAction::Terminate, caller, id)
            .await;
        self.observe(Operation::Terminate, result).await
    }

    async fn fund(&self, caller: Address, id: AgentId, amount: U256) -> Result<(), RegistryError> {
        let result = self.fund_inner(caller, id, amount).await;
        self.observe(Operation::Fund, result).await
    }

    async fn withdraw(
        &self,
        caller: Address,
        id: AgentId,
        amount: U256,
    ) -> Result<(), RegistryError> {
        let result = self.withdraw_inner(caller, id, amount).await;
        self.observe(Operation::Withdraw, result).await
    }

    async fn execute_action(
        &self,
        caller: Address,
        id: AgentId,
        payload: Vec<u8>,
    ) -> Result<Vec<u8>, RegistryError> {
        let result = self.execute_action_inner(caller, id, payload).await;
        self.observe(Operation::ExecuteAction, result).await
    }

    async fn governance(&self) -> Address {
        self.inner.read().await.state.settings.governance
    }

    async fn set_governance(&self, caller: Address, new: Address) -> Result<(), RegistryError> {
        let result = self
            .mutate_settings(Operation::SetGovernance, caller, |settings| {
                if new.is_zero() {
                    return Err(RegistryError::invalid("governance address is zero"));
                }
                let old = std::mem::replace(&mut settings.governance, new);
                info!(%old, %new, "governance changed");
                Ok(RegistryEvent::GovernanceChanged { old, new })
            })
            .await;
        self.observe(Operation::SetGovernance, result).await
    }

    async fn global_pause(&self) -> bool {
        self.inner.read().await.state.settings.global_pause
    }

    async fn set_global_pause(&self, caller: Address, value: bool) -> Result<(), RegistryError> {
        let result = self
            .mutate_settings(Operation::SetGlobalPause, caller, |settings| {
                settings.global_pause = value;
                info!(value, "global pause written");
                Ok(RegistryEvent::GlobalPauseChanged { value })
            })
            .await;
        self.observe(Operation::SetGlobalPause, result).await
    }

    async fn module_registry(&self) -> Option<Address> {
        let reference = self.inner.read().await.state.settings.module_registry;
        (!reference.is_zero()).then_some(reference)
    }

    async fn set_module_registry(
        &self,
        caller: Address,
        registry: Address,
    ) -> Result<(), RegistryError> {
        let result = self
            .mutate_settings(Operation::SetModuleRegistry, caller, |settings| {
                let old = std::mem::replace(&mut settings.module_registry, registry);
                Ok(RegistryEvent::ModuleRegistryChanged { old, new: registry })
            })
            .await;
        self.observe(Operation::SetModuleRegistry, result).await
    }

    async fn next_agent_id(&self) -> AgentId {
        self.inner.read().await.state.peek_next_id()
    }

    async fn agent_count(&self) -> usize {
        self.inner.read().await.state.agents.len()
    }

    async fn agents_of(&self, owner: Address) -> Vec<AgentId> {
        self.inner.read().await.state.agents_of(owner)
    }

    async fn events_since(&self, after: u64) -> Vec<EventRecord> {
        self.inner.read().await.events.since(after)
    }
}

#[async_trait]
impl<S: RegistryStore, P: PayoutGateway, L: LogicDirectory> OwnershipSync
    for AgentRegistryService<S, P, L>
{
    async fn on_ownership_transferred(
        &self,
        authority: &TransferAuthority,
        id: AgentId,
        previous: Address,
        new_owner: Address,
    ) -> Result<(), RegistryError> {
        let result = self
            .sync_owner_inner(authority, id, previous, new_owner)
            .await;
        self.observe(Operation::SyncOwnership, result).await
    }
}

// =============================================================================
// TESTS
// =============================================================================
