pub mod binding;
pub mod builders;
pub mod host_value;
pub mod runtime;
pub mod session;

pub use binding::{Driver, bind_scalar, bind_vector};
pub use host_value::HostValue;
pub use runtime::{BridgeState, HOST_GLOBAL, Runtime, SCRIPT_EXTENSION, definitions_in};
pub use session::SessionStore;
