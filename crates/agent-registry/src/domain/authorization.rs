//! # Authorization Gate
//!
//! Every registry operation maps to exactly one [`PermissionClass`]. The gate
//! resolves the caller against the agent owner or the governance principal,
//! and applies the two registry-wide policies:
//!
//! | Policy | Question it answers |
//! |--------|---------------------|
//! | [`PausePolicy`] | Which operations does `global_pause = true` disable? |
//! | [`TerminationPolicy`] | Which operations does a Terminated agent still accept? |
//!
//! ## Permission Matrix
//!
//! | Class | Operations |
//! |-------|------------|
//! | Owner | pause, unpause, terminate, set_logic_address, update_metadata, set_metadata_uri, withdraw, execute_action |
//! | Governance | set_governance, set_global_pause, set_module_registry |
//! | Transfer authority | on_ownership_transferred |
//! | Open | create_agent, fund, reads |

use crate::domain::value_objects::Address;
use crate::errors::RegistryError;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

// =============================================================================
// OPERATIONS
// =============================================================================

/// Registry operations subject to authorization and policy.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Operation {
    /// Allocate a new agent.
    CreateAgent,
    /// Read owner, logic, status, balance.
    GetState,
    /// Read extended metadata.
    GetMetadata,
    /// Read the metadata URI.
    GetMetadataUri,
    /// Replace the logic reference.
    SetLogicAddress,
    /// Replace extended metadata.
    UpdateMetadata,
    /// Replace the metadata URI.
    SetMetadataUri,
    /// Active → Paused.
    Pause,
    /// Paused → Active.
    Unpause,
    /// Active | Paused → Terminated.
    Terminate,
    /// Deposit value into an agent.
    Fund,
    /// Withdraw value to the owner.
    Withdraw,
    /// Invoke the agent's logic capability.
    ExecuteAction,
    /// Replace the governance principal.
    SetGovernance,
    /// Toggle the registry-wide pause flag.
    SetGlobalPause,
    /// Replace the module registry reference.
    SetModuleRegistry,
    /// Synchronize the owner after an external transfer.
    SyncOwnership,
}

impl Operation {
    /// Every operation, in declaration order.
    pub const ALL: [Operation; 17] = [
        Self::CreateAgent,
        Self::GetState,
        Self::GetMetadata,
        Self::GetMetadataUri,
        Self::SetLogicAddress,
        Self::UpdateMetadata,
        Self::SetMetadataUri,
        Self::Pause,
        Self::Unpause,
        Self::Terminate,
        Self::Fund,
        Self::Withdraw,
        Self::ExecuteAction,
        Self::SetGovernance,
        Self::SetGlobalPause,
        Self::SetModuleRegistry,
        Self::SyncOwnership,
    ];

    /// Stable snake_case name used in logs, metrics and configuration.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::CreateAgent => "create_agent",
            Self::GetState => "get_state",
            Self::GetMetadata => "get_metadata",
            Self::GetMetadataUri => "get_metadata_uri",
            Self::SetLogicAddress => "set_logic_address",
            Self::UpdateMetadata => "update_metadata",
            Self::SetMetadataUri => "set_metadata_uri",
            Self::Pause => "pause",
            Self::Unpause => "unpause",
            Self::Terminate => "terminate",
            Self::Fund => "fund",
            Self::Withdraw => "withdraw",
            Self::ExecuteAction => "execute_action",
            Self::SetGovernance => "set_governance",
            Self::SetGlobalPause => "set_global_pause",
            Self::SetModuleRegistry => "set_module_registry",
            Self::SyncOwnership => "on_ownership_transferred",
        }
    }

    /// Permission required to perform this operation.
    #[must_use]
    pub const fn permission(self) -> PermissionClass {
        match self {
            Self::CreateAgent
            | Self::Fund
            | Self::GetState
            | Self::GetMetadata
            | Self::GetMetadataUri => PermissionClass::Open,
            Self::SetLogicAddress
            | Self::UpdateMetadata
            | Self::SetMetadataUri
            | Self::Pause
            | Self::Unpause
            | Self::Terminate
            | Self::Withdraw
            | Self::ExecuteAction => PermissionClass::Owner,
            Self::SetGovernance | Self::SetGlobalPause | Self::SetModuleRegistry => {
                PermissionClass::Governance
            }
            Self::SyncOwnership => PermissionClass::TransferAuthority,
        }
    }

    /// Returns true for pure reads.
    #[must_use]
    pub const fn is_read(self) -> bool {
        matches!(
            self,
            Self::GetState | Self::GetMetadata | Self::GetMetadataUri
        )
    }

    /// Returns true for the owner-initiated lifecycle transitions.
    #[must_use]
    pub const fn is_lifecycle(self) -> bool {
        matches!(self, Self::Pause | Self::Unpause | Self::Terminate)
    }

    /// Whether a global pause may ever disable this operation.
    ///
    /// Reads, governance operations and ownership sync always stay available.
    #[must_use]
    pub const fn is_pausable(self) -> bool {
        !self.is_read()
            && matches!(
                self.permission(),
                PermissionClass::Open | PermissionClass::Owner
            )
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Operation {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim();
        Self::ALL
            .into_iter()
            .find(|op| op.name() == wanted)
            .ok_or_else(|| format!("unknown operation {wanted:?}"))
    }
}

// =============================================================================
// PERMISSION CLASSES
// =============================================================================

/// Who may perform an operation.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum PermissionClass {
    /// Any caller.
    Open,
    /// Only the current owner of the agent.
    Owner,
    /// Only the governance principal.
    Governance,
    /// Only the holder of the registry's transfer authority.
    TransferAuthority,
}

impl fmt::Display for PermissionClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Open => "open",
            Self::Owner => "owner",
            Self::Governance => "governance",
            Self::TransferAuthority => "transfer authority",
        };
        f.write_str(name)
    }
}

/// Resolve `caller` against the permission class of `operation`.
///
/// `owner` is the current owner of the targeted agent, if the operation
/// targets one. Transfer-authority operations are checked by capability, not
/// by caller, and are rejected here.
///
/// # Errors
///
/// [`RegistryError::NotAgentOwner`] or [`RegistryError::NotGovernance`] when the
/// caller lacks the required right.
pub fn authorize(
    operation: Operation,
    caller: Address,
    owner: Option<Address>,
    governance: Address,
) -> Result<(), RegistryError> {
    match operation.permission() {
        PermissionClass::Open => Ok(()),
        PermissionClass::Owner => match owner {
            Some(owner) if owner == caller && !caller.is_zero() => Ok(()),
            _ => Err(RegistryError::NotAgentOwner { caller, operation }),
        },
        PermissionClass::Governance => {
            if caller == governance && !caller.is_zero() {
                Ok(())
            } else {
                Err(RegistryError::NotGovernance { caller, operation })
            }
        }
        PermissionClass::TransferAuthority => Err(RegistryError::InvalidTransferAuthority),
    }
}

// =============================================================================
// PAUSE POLICY
// =============================================================================

/// Operations disabled while the global pause flag is set.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PausePolicy {
    blocked: BTreeSet<Operation>,
}

impl PausePolicy {
    /// Builds a policy from an explicit operation set.
    ///
    /// # Errors
    ///
    /// [`RegistryError::InvalidInput`] if an operation can never be paused
    /// (reads, governance operations, ownership sync).
    pub fn new(operations: impl IntoIterator<Item = Operation>) -> Result<Self, RegistryError> {
        let mut blocked = BTreeSet::new();
        for operation in operations {
            if !operation.is_pausable() {
                return Err(RegistryError::invalid(format!(
                    "operation {operation} cannot be disabled by global pause"
                )));
            }
            blocked.insert(operation);
        }
        Ok(Self { blocked })
    }

    /// A policy under which the global pause disables nothing.
    #[must_use]
    pub fn disabled() -> Self {
        Self {
            blocked: BTreeSet::new(),
        }
    }

    /// Every pausable operation.
    #[must_use]
    pub fn everything() -> Self {
        Self {
            blocked: Operation::ALL
                .into_iter()
                .filter(|op| op.is_pausable())
                .collect(),
        }
    }

    /// Parses a comma-separated list of operation names.
    ///
    /// # Errors
    ///
    /// [`RegistryError::InvalidInput`] for unknown or unpausable names.
    pub fn parse(list: &str) -> Result<Self, RegistryError> {
        let operations = list
            .split(',')
            .map(str::trim)
            .filter(|name| !name.is_empty())
            .map(|name| name.parse::<Operation>().map_err(RegistryError::invalid))
            .collect::<Result<Vec<_>, _>>()?;
        Self::new(operations)
    }

    /// Whether `operation` is disabled while paused.
    #[must_use]
    pub fn blocks(&self, operation: Operation) -> bool {
        self.blocked.contains(&operation)
    }

    /// Rejects `operation` if the registry is paused and the policy disables it.
    ///
    /// # Errors
    ///
    /// [`RegistryError::GloballyPaused`].
    pub fn check(&self, global_pause: bool, operation: Operation) -> Result<(), RegistryError> {
        if global_pause && self.blocks(operation) {
            Err(RegistryError::GloballyPaused { operation })
        } else {
            Ok(())
        }
    }

    /// Iterates the disabled operations.
    pub fn operations(&self) -> impl Iterator<Item = Operation> + '_ {
        self.blocked.iter().copied()
    }
}

impl Default for PausePolicy {
    /// Disables value movement, agent creation and action execution.
    fn default() -> Self {
        Self {
            blocked: [
                Operation::CreateAgent,
                Operation::Fund,
                Operation::Withdraw,
                Operation::ExecuteAction,
            ]
            .into_iter()
            .collect(),
        }
    }
}

// =============================================================================
// TERMINATION POLICY
// =============================================================================

/// What a Terminated agent still accepts.
///
/// Reads and ownership sync always work. Lifecycle operations fall through to
/// the state machine, which rejects them. Everything else is frozen unless
/// listed here.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TerminationPolicy {
    /// Let the owner recover the balance of a Terminated agent.
    pub allow_withdraw_after_termination: bool,
}

impl TerminationPolicy {
    /// Whether a Terminated agent rejects `operation` outright.
    #[must_use]
    pub fn freezes(&self, operation: Operation) -> bool {
        match operation {
            op if op.is_read() || op.is_lifecycle() => false,
            Operation::SyncOwnership => false,
            Operation::Withdraw => !self.allow_withdraw_after_termination,
            _ => true,
        }
    }
}

// =============================================================================
// TESTS
// =============================================================================
