pub mod record_selector;

pub use record_selector::RecordSelector;
