pub mod store;
pub mod history;
pub mod paths;
pub mod wizard;
pub mod manager;

pub use store::{SqliteStore, StoreError};
pub use history::HistoryLog;
pub use paths::PathLog;
pub use wizard::QueryWizard;
pub use manager::InteractionState;
