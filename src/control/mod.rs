mod filter;
mod inertia;
mod lag;
mod lead;
mod pid;

pub use filter::LeadLag;
pub use inertia::Inertia;
pub use lag::{Lag, Lag2};
pub use lead::Lead;
pub use pid::Pid;
