// Quiz flow: fetch a question set, collect answers, submit as one batch,
// follow the server's retry chain.
// The state machine is pure; sessions own the fetch lifecycle around it.

pub mod handlers;
pub mod machine;
pub mod registry;
pub mod session;

pub use registry::SessionRegistry;
