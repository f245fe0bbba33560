pub mod alerts;
pub mod analytics;
pub mod engine;
pub mod error;
pub mod flights;
pub mod record;
pub mod rng;
pub mod scenario;
pub mod scheduler;
pub mod sink;
pub mod weather;
pub mod zones;

pub use engine::{DegradationEngine, SimulationContext, Thresholds};
pub use error::{RecordError, SimError};
pub use record::RunwayRecord;
pub use scenario::{Scenario, ScenarioLoader};
pub use scheduler::DayScheduler;
