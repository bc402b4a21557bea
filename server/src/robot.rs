use crate::net::channel::{Channel, Transport};
use crate::net::codec::{self, Command, Expected};
use crate::net::error::{SessionError, SessionResult};
use lumen::logging;

/// Collisions beyond this budget abort the session.
pub const MAX_COLLISIONS: u32 = 20;

/// Grid coordinates of a robot.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub struct Position {
    pub x: i32,
    pub y: i32,
}

impl Position {
    pub const ORIGIN: Position = Position { x: 0, y: 0 };

    /// Coordinate along the given axis.
    #[inline]
    pub fn along(&self, axis: Axis) -> i32 {
        match axis {
            Axis::X => self.x,
            Axis::Y => self.y,
        }
    }
}

/// Navigation axis, in the order they are cleared.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum Axis {
    X,
    Y,
}

/// Compass facing of a robot. `North` points towards +y, `East` towards +x.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum Heading {
    North,
    East,
    South,
    West,
}

impl Heading {
    /// Facing after a single clockwise quarter turn.
    #[inline]
    pub fn clockwise(self) -> Heading {
        match self {
            Heading::North => Heading::East,
            Heading::East => Heading::South,
            Heading::South => Heading::West,
            Heading::West => Heading::North,
        }
    }

    /// Compass heading in degrees.
    #[inline]
    pub fn degrees(self) -> u16 {
        match self {
            Heading::North => 0,
            Heading::East => 90,
            Heading::South => 180,
            Heading::West => 270,
        }
    }
}

/// Per connection robot state. Created on accept, owned by the session task
/// and discarded when the connection closes.
pub struct Robot<T: Transport> {
    pub(crate) channel: Channel<T>,
    pub(crate) position: Position,
    pub(crate) heading: Heading,
    pub(crate) collisions: u32,
    pub(crate) log: logging::Logger,
}

impl<T: Transport> Robot<T> {
    pub fn new(transport: T, log: logging::Logger) -> Robot<T> {
        Robot {
            channel: Channel::new(transport, log.new(logging::o!())),
            position: Position::ORIGIN,
            heading: Heading::North,
            collisions: 0,
            log,
        }
    }

    /// Runs the full protocol: authentication, navigation to the origin and
    /// message pickup.
    pub fn drive(&mut self) -> SessionResult<()> {
        self.channel.reset_read_timeout()?;

        self.authenticate()?;
        self.infer_heading()?;
        self.navigate()?;
        self.pickup()
    }

    /// Reads a coordinate response and applies it to the tracked position.
    pub(crate) fn read_position(&mut self) -> SessionResult<Position> {
        let frame = self.channel.recv(Expected::Coords)?;

        self.position = codec::parse_position(&frame)?;

        Ok(self.position)
    }

    /// Registers a collision, aborting the session once the budget runs out.
    pub(crate) fn register_collision(&mut self) -> SessionResult<()> {
        self.collisions += 1;

        logging::debug!(self.log, "collision registered";
                        "context" => "navigate",
                        "collisions" => self.collisions);

        if self.collisions > MAX_COLLISIONS {
            return Err(SessionError::CollisionBudget);
        }

        Ok(())
    }

    /// Retrieves the secret message at the origin and logs the robot out.
    fn pickup(&mut self) -> SessionResult<()> {
        self.channel.send(Command::GetMessage)?;

        let message = self.channel.recv(Expected::Message)?;

        logging::info!(self.log, "secret message retrieved";
                       "context" => "pickup",
                       "message" => %String::from_utf8_lossy(&message));

        self.channel.send(Command::Logout)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::net::testing::MockTransport;

    fn make_robot(transport: MockTransport) -> Robot<MockTransport> {
        Robot::new(transport, logging::Logger::root(logging::Discard, logging::o!()))
    }

    #[test]
    fn test_heading_clockwise_cycle() {
        // Four quarter turns return every facing to itself
        for &heading in &[Heading::North, Heading::East, Heading::South, Heading::West] {
            assert_eq!(heading.clockwise().clockwise().clockwise().clockwise(), heading);
        }

        assert_eq!(Heading::North.clockwise(), Heading::East);
        assert_eq!(Heading::West.clockwise(), Heading::North);
    }

    #[test]
    fn test_heading_degrees() {
        assert_eq!(Heading::North.degrees(), 0);
        assert_eq!(Heading::East.degrees(), 90);
        assert_eq!(Heading::South.degrees(), 180);
        assert_eq!(Heading::West.degrees(), 270);
    }

    #[test]
    fn test_position_along() {
        let position = Position { x: 3, y: -7 };

        assert_eq!(position.along(Axis::X), 3);
        assert_eq!(position.along(Axis::Y), -7);
    }

    #[test]
    fn test_read_position_updates_state() {
        let mut robot = make_robot(MockTransport::new(b"OK 4 -2\x07\x08"));

        let position = robot.read_position().unwrap();

        assert_eq!(position, Position { x: 4, y: -2 });
        assert_eq!(robot.position, position);
    }

    #[test]
    fn test_register_collision_budget() {
        let mut robot = make_robot(MockTransport::new(b""));

        for _ in 0..MAX_COLLISIONS {
            robot.register_collision().unwrap();
        }

        assert_eq!(robot.collisions, MAX_COLLISIONS);
        assert_eq!(robot.register_collision().unwrap_err(), SessionError::CollisionBudget);
    }

    #[test]
    fn test_pickup() {
        let mut robot = make_robot(MockTransport::new(b"Secret\x07\x08"));

        robot.pickup().unwrap();

        assert_eq!(
            robot.channel.transport().outbound,
            b"105 GET MESSAGE\x07\x08106 LOGOUT\x07\x08"
        );
    }
}
