pub mod caller;
pub mod errors;
pub mod future;
pub mod mock;
pub mod transport;
pub mod types;
pub mod prelude;
