//! Studio dashboard domain core
//!
//! # Overview
//!
//! In-process stores for a subscriber / content studio dashboard:
//!
//! - **Subscribers** (`stores::subscriber`): subscribers, tags, recovery notes,
//!   attachments and castings
//! - **Sales** (`stores::sales`): plans, promotions, videos, sales and the
//!   casting ↔ project links
//! - **Projects** (`stores::project`): production projects
//! - **Metrics** (`metrics`): counts, distributions and totals computed on demand
//! - **Notify** (`notify`): outbound sale notices over a webhook
//! - **Dashboard** (`dashboard`): the facade that spans stores
//!
//! # Layout
//!
//! ```text
//! studio-core/src/
//! ├── core/          # configuration, startup
//! ├── stores/        # state containers + sale status rules
//! ├── notify/        # SaleNotifier + webhook transport
//! ├── storage.rs     # redb snapshot persistence
//! ├── events.rs      # store change broadcasts
//! ├── metrics.rs     # derived numbers
//! ├── dashboard.rs   # cross-store operations and views
//! └── utils/         # logging, validation
//! ```

pub mod core;
pub mod dashboard;
pub mod events;
pub mod metrics;
pub mod notify;
pub mod storage;
pub mod stores;
pub mod utils;

pub use core::{Config, Studio};
pub use dashboard::{CastingDetail, Dashboard, Overview, SaleLine, SubscriberDetail};
pub use events::{ChangeAction, EntityKind, StoreEvent};
pub use notify::{SaleNotice, SaleNotifier, WebhookNotifier};
pub use storage::SnapshotStorage;
pub use stores::{ProjectStore, SalesStore, SubscriberStore};
pub use utils::{AppError, AppResult, ErrorCategory, ErrorCode};

pub use utils::logger::{LogGuard, init_logger};
