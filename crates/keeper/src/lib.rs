pub mod clock;
pub mod config;
pub mod error;
pub mod keeper;
pub mod oracle;
pub mod replay;
pub mod store;

pub use clock::WallClock;
pub use config::{create_example_config, KeeperConfig, PolicyKind};
pub use error::{KeeperError, KeeperResult};
pub use keeper::{Keeper, SharedState, TickReport};
pub use oracle::{run_scheduled_oracle, ChannelFeed, ScheduledOracle};
pub use replay::{replay, ReplayReport};
pub use store::StateStore;
