pub mod feed;
mod loop_worker;
pub mod options;
pub mod sensor;

pub use feed::{PositionFeed, SubscriptionHandle};
pub use options::FeedOptions;
pub use sensor::{ChannelSensor, PositionSensor, SensorCommand, SensorEvent, SensorSink, WatchId};
