pub mod auth;
pub mod cache;
pub mod scanner;
pub mod signals;
pub mod sqlite_store;
pub mod watchlist;

pub use auth::{AuthError, AuthService};
pub use cache::TickerCache;
pub use scanner::{ScanError, ScanService};
pub use sqlite_store::SqliteStore;
pub use watchlist::WatchlistService;
