//! Filter criteria, pagination cursor and the store that owns them.

mod criteria;
mod cursor;
mod store;
mod subscription;

pub use criteria::{FilterCriteria, FilterError, FilterKey};
pub use cursor::{PageCursor, PageRequest, DEFAULT_PER_PAGE};
pub use store::{FilterSnapshot, FilterStateStore, DEFAULT_DEBOUNCE};
pub use subscription::FilterSubscription;
