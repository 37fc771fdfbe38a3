pub mod auth;
pub mod history;
pub mod scan;

pub use auth::*;
pub use history::*;
pub use scan::*;
