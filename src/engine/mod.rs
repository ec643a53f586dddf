//! Simulation engine
//!
//! Clock, scheduler and resolver are leaf pieces; `SessionController` ties
//! them together and is the only thing that mutates session state.

pub mod clock;
pub mod history;
pub mod observer;
pub mod realtime;
pub mod resolver;
pub mod result;
pub mod scheduler;
pub mod session;

pub use clock::{ClockState, SimulationClock};
pub use history::{DecisionRecord, EventHistory};
pub use observer::{RecordingObserver, SessionObserver, TracingObserver};
pub use realtime::{RealtimeOptions, SessionCommand};
pub use resolver::{DecisionResolver, Resolution};
pub use result::{CompletionReason, PendingDecision, SessionResult, SessionSnapshot};
pub use scheduler::EventScheduler;
pub use session::{SessionController, SessionState, TickReport};
