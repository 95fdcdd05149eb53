// Fixed-rate simulation loop hosting the controller
// One tick: advance the simulated robot, poll the TCP channel once, drain the
// keyboard, step the controller, publish telemetry.

use std::time::Instant;
use tokio::time::{interval, MissedTickBehavior};
use tracing::{info, warn};

use crate::channel::CommandChannel;
use crate::config::ControllerConfig;
use crate::controller::{ControllerState, StepOutcome};
use crate::keyboard::TerminalKeyboard;
use crate::robot::SimRobot;
use crate::telemetry::Telemetry;

pub async fn run(config: ControllerConfig) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    let mut channel = CommandChannel::bind(&config.bind_addr())?;

    let telemetry = if config.no_telemetry {
        None
    } else {
        Some(Telemetry::open().await?)
    };

    let mut robot = SimRobot::new(config.time_step(), config.arena_half_size);
    let mut state = ControllerState::from_config(&mut robot, &config);

    // No terminal (e.g. piped stdin): run network-only
    let mut keyboard = match TerminalKeyboard::enable() {
        Ok(keyboard) => Some(keyboard),
        Err(e) => {
            warn!("Keyboard unavailable, local controls disabled: {}", e);
            None
        }
    };

    let mut tick = interval(config.time_step());
    tick.set_missed_tick_behavior(MissedTickBehavior::Skip);

    let ctrl_c = tokio::signal::ctrl_c();
    tokio::pin!(ctrl_c);

    info!(
        "Controller started: {}ms tick, participant={}, mode={:?}, trial={}",
        config.time_step().as_millis(),
        config.participant,
        config.mode,
        config.trial
    );

    loop {
        tokio::select! {
            _ = tick.tick() => {}
            _ = &mut ctrl_c => {
                info!("Interrupted, stopping controller");
                break;
            }
        }

        robot.advance();

        let network = channel.poll();
        let keys = keyboard.as_mut().map(TerminalKeyboard::poll).unwrap_or_default();

        let outcome = state.step(&mut robot, network, &keys, Instant::now());

        if let Some(telemetry) = &telemetry {
            telemetry.publish(state.output(), &state.status(robot.pose())).await;
        }

        if outcome == StepOutcome::Terminate {
            break;
        }
    }

    if state.recorder().is_running() {
        warn!(
            "Exiting with trial {} still running; it was not recorded",
            state.recorder().trial_number()
        );
    }
    info!("Controller stopped");
    Ok(())
}
