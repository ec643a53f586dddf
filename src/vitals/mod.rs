//! Patient physiology: channels, readings and the drift/impact model

pub mod channel;
pub mod model;
pub mod signs;

pub use channel::{ChannelRange, VitalChannel, VitalStatus};
pub use model::VitalsModel;
pub use signs::{VitalSigns, VitalsDelta};
