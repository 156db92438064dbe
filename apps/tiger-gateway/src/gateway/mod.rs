//! Gateway core.
//!
//! One worker thread per session owns every broker handle and all
//! reconciliation state. The host talks to it through [`TigerGateway`],
//! which only enqueues [`Task`]s.

mod contracts;
mod core;
mod emitter;
mod market_data;
mod orders;
mod reconnect;
mod registry;
mod session;
mod supervisor;
mod task;
pub mod translator;
mod worker;

pub use contracts::ContractCache;
pub use self::core::{GatewayCore, PushBridge};
pub use emitter::Emitter;
pub use market_data::{BAR_TIME_FORMAT, MarketDataReconciler};
pub use orders::OrderManager;
pub use reconnect::{ReconnectConfig, ReconnectPolicy};
pub use registry::{IdentifierRegistry, LOCAL_ID_BASE, RegistryError};
pub use session::{ConnectionStatus, SessionState, SharedStatus, SubConnection};
pub use supervisor::TigerGateway;
pub use task::{ConnectionKind, Task, TaskSender, task_queue};
pub use worker::{WorkerHandle, WorkerTiming, execute, spawn_worker};
