use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum TrackError {
    #[error("indicator is already running")]
    AlreadyRunning,
}

/// What a single advance did to the indicator.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Step {
    /// The indicator moved and is still travelling.
    Moved,
    /// The indicator reached the end of the track and stopped itself.
    EndOfTrack,
    /// The track was not running; nothing happened.
    Stationary,
}

/// Moving indicator along a 0..track-length percentage track.
///
/// Advancing is cooperative: the owner calls `advance` once per animation
/// tick, so wall-time to cross the track is refresh rate times speed, not a
/// fixed duration. Stopping freezes the position for inspection.
#[derive(Clone, Debug)]
pub struct Track {
    position: f64,
    speed: f64,
    length: f64,
    running: bool,
}

impl Track {
    pub fn new(length: f64) -> Self {
        Self {
            position: 0.0,
            speed: 0.0,
            length,
            running: false,
        }
    }

    /// Begin a run from position zero at the given speed.
    pub fn start(&mut self, speed: f64) -> Result<(), TrackError> {
        if self.running {
            return Err(TrackError::AlreadyRunning);
        }
        self.position = 0.0;
        self.speed = speed;
        self.running = true;
        Ok(())
    }

    /// Move the indicator one step. Clamps at the end of the track and stops
    /// itself there.
    pub fn advance(&mut self) -> Step {
        if !self.running {
            return Step::Stationary;
        }

        self.position += self.speed;
        if self.position >= self.length {
            self.position = self.length;
            self.running = false;
            return Step::EndOfTrack;
        }
        Step::Moved
    }

    /// Freeze the indicator where it is. Idempotent.
    pub fn stop(&mut self) {
        self.running = false;
    }

    pub fn reset(&mut self) {
        self.position = 0.0;
        self.running = false;
    }

    pub fn position(&self) -> f64 {
        self.position
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    pub fn speed(&self) -> f64 {
        self.speed
    }

    pub fn length(&self) -> f64 {
        self.length
    }
}
