pub mod agent;
pub mod memory;

pub use agent::{Agent, Disposition, Tolerance};
pub use memory::{Ledger, MemoryWindow, Outcome};
