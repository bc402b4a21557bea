use crate::net::channel::Transport;
use crate::net::codec::Command;
use crate::net::error::SessionResult;
use crate::robot::{Axis, Heading, Robot};
use lumen::choose;
use lumen::logging;

impl<T: Transport> Robot<T> {
    /// Derives the robot's facing from two observed positions. The first
    /// turn reveals the starting position, the following move reveals the
    /// direction. A robot blocked on its very first move keeps turning and
    /// retrying, consuming collision budget each time.
    pub(crate) fn infer_heading(&mut self) -> SessionResult<()> {
        loop {
            self.channel.send(Command::TurnLeft)?;
            let old = self.read_position()?;

            self.channel.send(Command::Move)?;
            let new = self.read_position()?;

            if new.y == old.y {
                if new.x > old.x {
                    self.heading = Heading::East;
                } else if new.x < old.x {
                    self.heading = Heading::West;
                } else {
                    // Obstacle right in front, the next turn rotates away
                    // from it
                    self.register_collision()?;
                    continue;
                }
            } else if new.y > old.y {
                self.heading = Heading::North;
            } else {
                self.heading = Heading::South;
            }

            logging::debug!(self.log, "initial conditions established";
                            "context" => "navigate",
                            "x" => new.x,
                            "y" => new.y,
                            "heading" => self.heading.degrees());

            return Ok(());
        }
    }

    /// Clears the x axis, then the y axis, ending at the origin.
    pub(crate) fn navigate(&mut self) -> SessionResult<()> {
        if self.position.x != 0 {
            self.rotate(choose!(self.position.x > 0 => Heading::West, Heading::East))?;
        }

        self.advance(Axis::X)?;

        if self.position.y != 0 {
            self.rotate(choose!(self.position.y > 0 => Heading::South, Heading::North))?;
        }

        self.advance(Axis::Y)?;

        logging::debug!(self.log, "origin reached";
                        "context" => "navigate",
                        "collisions" => self.collisions);

        Ok(())
    }

    /// Turns the robot clockwise until it faces `target`. The coordinate
    /// echoes carry no position change but are parsed to keep the framing
    /// aligned.
    fn rotate(&mut self, target: Heading) -> SessionResult<()> {
        while self.heading != target {
            self.channel.send(Command::TurnRight)?;
            self.read_position()?;
            self.heading = self.heading.clockwise();
        }

        Ok(())
    }

    /// Moves towards 0 on `axis` one step at a time, detouring around any
    /// obstacle in the way.
    fn advance(&mut self, axis: Axis) -> SessionResult<()> {
        while self.position.along(axis) != 0 {
            let before = self.position.along(axis);

            self.channel.send(Command::Move)?;
            self.read_position()?;

            if self.position.along(axis) == before {
                self.register_collision()?;
                self.circumnavigate(axis)?;
            }
        }

        Ok(())
    }

    /// Scripted detour around a blocking obstacle. The sequence has zero net
    /// rotation, so the tracked heading stays valid at exit. The target axis
    /// can be reached mid-detour, in which case the remaining steps are
    /// skipped.
    fn circumnavigate(&mut self, axis: Axis) -> SessionResult<()> {
        self.step(Command::TurnLeft)?;
        self.step(Command::Move)?;
        self.step(Command::TurnRight)?;
        self.step(Command::Move)?;

        if self.position.along(axis) == 0 {
            return Ok(());
        }

        self.step(Command::Move)?;
        self.step(Command::TurnRight)?;
        self.step(Command::Move)?;
        self.step(Command::TurnLeft)
    }

    /// Issues a single command and consumes the coordinate echo.
    fn step(&mut self, command: Command) -> SessionResult<()> {
        self.channel.send(command)?;
        self.read_position()?;

        Ok(())
    }
}
