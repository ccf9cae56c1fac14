pub mod error;
pub mod record;
pub mod token;
pub mod textfile;
pub mod surgery;
pub mod cache;
pub mod exclude;
pub mod discovery;
pub mod scanner;
pub mod store;
pub mod config;
pub mod editor;
pub mod session;
pub mod render;

pub use error::{Result, TodoError};
pub use record::{Priority, Record};
pub use token::{Token, TokenGrammar};
pub use surgery::{Removal, SourceEditor};
pub use exclude::ExclusionList;
pub use discovery::{find_folder, find_project_root};
pub use scanner::{ScanReport, Scanner};
pub use store::TodoStore;
pub use config::{Config, ConfigManager, Scope};
pub use session::{ProjectPaths, ScanSummary, Session};
