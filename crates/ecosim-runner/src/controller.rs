//! Play/pause and speed gate around `World::update`, plus the line commands
//! that drive it.

use thiserror::Error;

#[derive(Error, Debug, PartialEq)]
pub enum ControlError {
    #[error("speed must be non-negative and finite, got {0}")]
    InvalidSpeed(f32),

    #[error("unknown command: {0}")]
    UnknownCommand(String),

    #[error("missing or malformed argument for {0}")]
    BadArgument(&'static str),
}

/// External clock gate: the world never knows whether it is paused
#[derive(Debug, Clone)]
pub struct SimulationController {
    running: bool,
    speed: f32,
}

impl SimulationController {
    pub fn new(speed: f32, running: bool) -> Result<Self, ControlError> {
        let mut controller = Self {
            running,
            speed: 1.0,
        };
        controller.set_speed(speed)?;
        Ok(controller)
    }

    pub fn toggle_pause(&mut self) {
        self.running = !self.running;
    }

    pub fn set_paused(&mut self, paused: bool) {
        self.running = !paused;
    }

    pub fn set_speed(&mut self, multiplier: f32) -> Result<(), ControlError> {
        if !(multiplier.is_finite() && multiplier >= 0.0) {
            return Err(ControlError::InvalidSpeed(multiplier));
        }
        self.speed = multiplier;
        Ok(())
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    pub fn speed(&self) -> f32 {
        self.speed
    }

    /// Simulated seconds for a frame of `frame_dt` real seconds, or `None`
    /// while paused
    pub fn scaled_dt(&self, frame_dt: f32) -> Option<f32> {
        self.running.then(|| frame_dt.max(0.0) * self.speed)
    }
}

impl Default for SimulationController {
    fn default() -> Self {
        Self {
            running: true,
            speed: 1.0,
        }
    }
}

/// Commands accepted on stdin while the simulation runs
#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    TogglePause,
    Pause,
    Resume,
    Speed(f32),
    FoodInterval(f32),
    Snapshot,
    Quit,
}

impl Command {
    pub fn parse(line: &str) -> Result<Self, ControlError> {
        let mut parts = line.split_whitespace();
        let name = parts.next().unwrap_or_default();

        let command = match name {
            "toggle" | "p" => Command::TogglePause,
            "pause" => Command::Pause,
            "resume" | "play" => Command::Resume,
            "speed" => Command::Speed(parse_arg(parts.next(), "speed")?),
            "food-interval" => Command::FoodInterval(parse_arg(parts.next(), "food-interval")?),
            "snapshot" => Command::Snapshot,
            "quit" | "q" => Command::Quit,
            other => return Err(ControlError::UnknownCommand(other.to_string())),
        };

        Ok(command)
    }
}

fn parse_arg(arg: Option<&str>, name: &'static str) -> Result<f32, ControlError> {
    arg.and_then(|a| a.parse().ok())
        .ok_or(ControlError::BadArgument(name))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pause_gates_dt() {
        let mut controller = SimulationController::default();
        assert_eq!(controller.scaled_dt(0.016), Some(0.016));

        controller.toggle_pause();
        assert!(!controller.is_running());
        assert_eq!(controller.scaled_dt(0.016), None);

        controller.set_paused(false);
        assert!(controller.is_running());
    }

    #[test]
    fn test_speed_scales_dt() {
        let mut controller = SimulationController::new(2.0, true).unwrap();
        assert_eq!(controller.scaled_dt(0.5), Some(1.0));

        controller.set_speed(0.0).unwrap();
        assert_eq!(controller.scaled_dt(0.5), Some(0.0));
        assert_eq!(controller.scaled_dt(-1.0), Some(0.0));
    }

    #[test]
    fn test_invalid_speed_rejected() {
        let mut controller = SimulationController::default();
        assert_eq!(controller.set_speed(-1.0), Err(ControlError::InvalidSpeed(-1.0)));
        assert!(controller.set_speed(f32::NAN).is_err());
        assert_eq!(controller.speed(), 1.0);
        assert!(SimulationController::new(f32::INFINITY, true).is_err());
    }

    #[test]
    fn test_parse_commands() {
        assert_eq!(Command::parse("p").unwrap(), Command::TogglePause);
        assert_eq!(Command::parse("pause").unwrap(), Command::Pause);
        assert_eq!(Command::parse("  speed 4 ").unwrap(), Command::Speed(4.0));
        assert_eq!(
            Command::parse("food-interval 0.5").unwrap(),
            Command::FoodInterval(0.5)
        );
        assert_eq!(Command::parse("quit").unwrap(), Command::Quit);
    }

    #[test]
    fn test_parse_errors() {
        assert_eq!(
            Command::parse("speed fast"),
            Err(ControlError::BadArgument("speed"))
        );
        assert_eq!(
            Command::parse("food-interval"),
            Err(ControlError::BadArgument("food-interval"))
        );
        assert!(matches!(
            Command::parse("jump"),
            Err(ControlError::UnknownCommand(_))
        ));
    }
}
