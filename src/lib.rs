pub mod model;
pub mod query;
pub mod debounce;
pub mod pagination;
pub mod remote;
pub mod controller;
pub mod import;
pub mod transport;
pub mod http;
pub mod client;
pub mod config;
pub mod logging;
pub mod theme;

// Data model
pub use model::{
    Difficulty, ExportFormat, GlobalStats, ImportFileType, ImportJob, ImportStatus, Page, Question,
    Trajectory, TrajectoryDetail,
};

// Query construction and list state
pub use query::{
    FilterField, FilterKind, FilterSet, FilterValue, JumpFilter, NumericFilter, QueryParams,
    SortDir, SortField, SortSpec, TrajectoryQuery,
};
pub use controller::{FetchRequest, ListResult, TrajectoryListController};
pub use debounce::Debouncer;
pub use remote::{Remote, Seq};
pub use import::{ImportAction, ImportPhase, ImportTracker};

// REST access
pub use transport::{ApiError, ApiRequest, Transport};
pub use http::HttpTransport;
pub use client::ApiClient;

pub use config::AppConfig;
pub use theme::{Theme, ThemeColors, ThemeManager};
