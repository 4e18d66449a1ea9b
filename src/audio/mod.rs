//! # Audio Module
//!
//! Fire-and-forget sound requests emitted by the simulation. Playback, pools
//! and decoding live behind the [`AudioSink`] trait.

use serde::{Deserialize, Serialize};

/// Sound categories the simulation can request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SoundKind {
    Gunshot,
    VampireDie1,
    VampireDie2,
    Bat,
    PlayerHurt,
    PlayerDie,
    Gib,
    Pickup,
    Rescue,
    ExitOpen,
}

/// A single request to play a sound at the given volume.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SoundRequest {
    pub kind: SoundKind,
    pub volume: f64,
}

impl SoundRequest {
    pub fn new(kind: SoundKind, volume: f64) -> Self {
        Self { kind, volume }
    }
}

/// Consumer of sound requests.
pub trait AudioSink {
    /// Plays the sound; failures are the sink's business, not the caller's.
    fn play(&mut self, request: SoundRequest);
}

/// Sink that records requests in the debug log.
#[derive(Debug, Default)]
pub struct LoggingAudioSink {
    pub played: u64,
}

impl AudioSink for LoggingAudioSink {
    fn play(&mut self, request: SoundRequest) {
        self.played += 1;
        log::debug!("sound {:?} at volume {:.2}", request.kind, request.volume);
    }
}

/// Sink used with `--mute`.
#[derive(Debug, Default)]
pub struct MutedAudioSink;

impl AudioSink for MutedAudioSink {
    fn play(&mut self, _request: SoundRequest) {}
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_logging_sink_counts_requests() {
        let mut sink = LoggingAudioSink::default();
        sink.play(SoundRequest::new(SoundKind::Gunshot, 0.4));
        sink.play(SoundRequest::new(SoundKind::PlayerDie, 1.6));
        assert_eq!(sink.played, 2);
    }
}
