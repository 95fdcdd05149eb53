// Optional zenoh telemetry: wheel commands and controller status as JSON

use tracing::{info, warn};
use zenoh::pubsub::Publisher;
use zenoh::Session;

use crate::config::{TOPIC_RT_WHEELS, TOPIC_STATE};
use crate::messages::{ControllerStatus, WheelCommand};

pub struct Telemetry {
    _session: Session,
    pub_wheels: Publisher<'static>,
    pub_state: Publisher<'static>,
}

impl Telemetry {
    pub async fn open() -> Result<Self, Box<dyn std::error::Error + Send + Sync>> {
        info!("Opening Zenoh session...");
        let session = zenoh::open(zenoh::Config::default()).await?;

        let pub_wheels = session.declare_publisher(TOPIC_RT_WHEELS).await?;
        let pub_state = session.declare_publisher(TOPIC_STATE).await?;
        info!("Publishing to: {}, {}", TOPIC_RT_WHEELS, TOPIC_STATE);

        Ok(Self {
            _session: session,
            pub_wheels,
            pub_state,
        })
    }

    /// Publish one tick; failures are logged, never propagated into the loop
    pub async fn publish(&self, wheels: WheelCommand, status: &ControllerStatus) {
        match serde_json::to_string(&wheels) {
            Ok(json) => {
                if let Err(e) = self.pub_wheels.put(json).await {
                    warn!("Failed to publish wheel command: {}", e);
                }
            }
            Err(e) => warn!("Failed to encode wheel command: {}", e),
        }

        match serde_json::to_string(status) {
            Ok(json) => {
                if let Err(e) = self.pub_state.put(json).await {
                    warn!("Failed to publish controller status: {}", e);
                }
            }
            Err(e) => warn!("Failed to encode controller status: {}", e),
        }
    }
}
