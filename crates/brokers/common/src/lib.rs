pub mod simulated;

pub use simulated::{SimulatedBroker, SimulatedBrokerConfig, SimulatedBrokerFactory};
