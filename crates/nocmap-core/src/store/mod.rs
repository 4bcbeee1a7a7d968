// ── Reactive data store ──
//
// Latest site config and status snapshot with push-based change
// notification.

mod data_store;

pub use data_store::DataStore;
