//! Admin-side services: user directory, configuration editing and the
//! search audit log.

pub mod config_editor;
pub mod logs;
pub mod users;

pub use self::config_editor::ConfigEditor;
pub use self::logs::SearchLogPager;
pub use self::users::UserDirectory;
