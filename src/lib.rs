// Expose modules for testing
pub mod events;
pub mod hotkey;
pub mod launcher;
pub mod storage;
pub mod testing;
pub mod ui;
