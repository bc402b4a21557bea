use crate::net::channel::Transport;
use crate::net::error::SessionError;
use crate::robot::Robot;
use lumen::logging;

/// Drives a single accepted connection to completion: construct a fresh
/// robot, authenticate it, walk it to the origin and retrieve the secret
/// message. Protocol violations are reported to the client with their wire
/// code; collision exhaustion and transport failures close the connection
/// silently. The transport is shut down on every exit path.
pub fn run<T: Transport>(transport: T, log: logging::Logger) {
    let mut robot = Robot::new(transport, log.new(logging::o!()));

    match robot.drive() {
        Ok(()) => {
            logging::info!(log, "session completed"; "context" => "session");
        }
        Err(SessionError::Protocol(error)) => {
            robot.channel.send_error(error);

            logging::info!(log, "session failed"; "context" => "session", "error" => ?error);
        }
        Err(SessionError::CollisionBudget) => {
            logging::info!(log, "collision budget exhausted"; "context" => "session");
        }
        Err(SessionError::Transport(kind)) => {
            logging::debug!(log, "transport failure"; "context" => "session", "kind" => ?kind);
        }
    }

    robot.channel.close();
}
