//! Shared search state, the recent-search list and the lookup flow.

pub mod coordinator;
pub mod recent;
pub mod run;

pub use self::coordinator::{HandlerId, RateLimitCounters, SearchCoordinator, SearchHandler};
pub use self::recent::{JsonFileStore, MemoryRecentStore, RecentSearches, RecentStore};
pub use self::run::{RATE_LIMITED_MESSAGE, SEARCH_FAILED_MESSAGE, SearchResult, run_search};
