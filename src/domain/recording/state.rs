//! Encoder and recording state machines

use std::fmt;

use crate::domain::error::StateError;

/// Encoder adapter states
///
/// State machine:
///   IDLE -> ENCODING (encode)
///   IDLE | ENCODING -> FINISHED (finish)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum EncoderState {
    #[default]
    Idle,
    Encoding,
    Finished,
}

impl EncoderState {
    /// Get the string representation
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Idle => "idle",
            Self::Encoding => "encoding",
            Self::Finished => "finished",
        }
    }

    /// Transition into ENCODING for an incoming block
    pub fn begin_encode(&mut self) -> Result<(), StateError> {
        match self {
            Self::Idle | Self::Encoding => {
                *self = Self::Encoding;
                Ok(())
            }
            Self::Finished => Err(self.reject("encode")),
        }
    }

    /// Transition into FINISHED
    pub fn begin_finish(&mut self) -> Result<(), StateError> {
        match self {
            Self::Idle | Self::Encoding => {
                *self = Self::Finished;
                Ok(())
            }
            Self::Finished => Err(self.reject("finish")),
        }
    }

    fn reject(&self, action: &'static str) -> StateError {
        StateError {
            current_state: self.as_str(),
            action,
        }
    }
}

impl fmt::Display for EncoderState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Recording session states
///
/// State machine:
///   IDLE | STOPPED -> RECORDING (start)
///   RECORDING -> STOPPED (stop, finish)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum RecordingState {
    #[default]
    Idle,
    Recording,
    Stopped,
}

impl RecordingState {
    /// Get the string representation
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Idle => "idle",
            Self::Recording => "recording",
            Self::Stopped => "stopped",
        }
    }

    /// Check if currently recording
    pub fn is_recording(&self) -> bool {
        *self == Self::Recording
    }

    /// Build the error for an action not allowed in this state
    pub fn reject(&self, action: &'static str) -> StateError {
        StateError {
            current_state: self.as_str(),
            action,
        }
    }
}

impl fmt::Display for RecordingState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
