//! Frames: the append-only execution trace.
//!
//! A frame is immutable once recorded. Its description is derived from the
//! stored result on demand and cached.

use std::cell::OnceCell;
use std::collections::BTreeMap;
use std::rc::Rc;

use jiki_types::{Location, RuntimeError};
use serde::ser::SerializeMap;
use serde::{Serialize, Serializer};

use crate::describe::{describe_frame, Description, DescriptionContext};
use crate::external::ExecutionContext;
use crate::object::RuntimeObject;
use crate::result::EvaluationResult;

pub type Variables = BTreeMap<String, RuntimeObject>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum FrameStatus {
    Success,
    Error,
}

/// When frame descriptions are produced.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ExecutionMode {
    /// On first access.
    #[default]
    Standard,
    /// As each frame is recorded.
    Testing,
    /// Never; descriptions are neither computed nor serialized.
    Benchmark,
}

#[derive(Debug, Clone)]
pub struct Frame {
    pub line: u32,
    /// Exact source text of the executed construct.
    pub code: String,
    pub location: Location,
    pub status: FrameStatus,
    pub result: Option<EvaluationResult>,
    pub error: Option<RuntimeError>,
    /// Virtual milliseconds since execution began.
    pub time: f64,
    /// `time` in hundredths of a millisecond.
    pub timeline_time: u64,
    pub variables: Variables,
    pub prior_variables: Variables,
    mode: ExecutionMode,
    context: Rc<DescriptionContext>,
    description: OnceCell<Description>,
}

impl Frame {
    /// The frame's narration, computed on first call.
    ///
    /// Always `None` in [`ExecutionMode::Benchmark`].
    pub fn description(&self) -> Option<&Description> {
        if self.mode == ExecutionMode::Benchmark {
            return None;
        }
        Some(self.description.get_or_init(|| {
            describe_frame(self.result.as_ref(), self.error.as_ref(), &self.context)
        }))
    }

    /// Whether the description has been computed yet.
    pub fn has_description(&self) -> bool {
        self.description.get().is_some()
    }
}

impl Serialize for Frame {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(None)?;
        map.serialize_entry("line", &self.line)?;
        map.serialize_entry("code", &self.code)?;
        map.serialize_entry("status", &self.status)?;
        if let Some(result) = &self.result {
            map.serialize_entry("result", result)?;
        }
        if let Some(error) = &self.error {
            map.serialize_entry("error", error)?;
        }
        map.serialize_entry("time", &self.time)?;
        map.serialize_entry("timelineTime", &self.timeline_time)?;
        map.serialize_entry("variables", &self.variables)?;
        map.serialize_entry("priorVariables", &self.prior_variables)?;
        if let Some(description) = self.description.get() {
            map.serialize_entry("description", description)?;
        }
        map.end()
    }
}

/// Outcome recorded for one frame.
#[derive(Debug, Clone)]
pub enum FrameOutcome {
    Success(EvaluationResult),
    Error(RuntimeError),
}

/// Appends frames and owns the virtual clock.
#[derive(Debug)]
pub struct FrameRecorder {
    frames: Vec<Frame>,
    mode: ExecutionMode,
    description_context: Rc<DescriptionContext>,
    clock: ExecutionContext,
}

impl FrameRecorder {
    pub fn new(mode: ExecutionMode, description_context: DescriptionContext) -> Self {
        Self {
            frames: Vec::new(),
            mode,
            description_context: Rc::new(description_context),
            clock: ExecutionContext::new(),
        }
    }

    /// Record a frame stamped with the current time, then advance the clock
    /// by one frame.
    pub fn add_frame(
        &mut self,
        location: Location,
        code: &str,
        outcome: FrameOutcome,
        variables: Variables,
        prior_variables: Variables,
    ) {
        let micros = self.clock.current_time_in_micros();
        let (status, result, error) = match outcome {
            FrameOutcome::Success(result) => (FrameStatus::Success, Some(result), None),
            FrameOutcome::Error(error) => (FrameStatus::Error, None, Some(error)),
        };
        let frame = Frame {
            line: location.line,
            code: code.to_string(),
            location,
            status,
            result,
            error,
            time: micros as f64 / 1000.0,
            timeline_time: micros.saturating_add(5) / 10,
            variables,
            prior_variables,
            mode: self.mode,
            context: Rc::clone(&self.description_context),
            description: OnceCell::new(),
        };
        if self.mode == ExecutionMode::Testing {
            frame.description();
        }
        tracing::trace!(line = frame.line, status = ?frame.status, time = frame.time, "frame");
        self.frames.push(frame);
        self.clock.advance_frame();
    }

    pub fn frames(&self) -> &[Frame] {
        &self.frames
    }

    pub fn into_frames(self) -> Vec<Frame> {
        self.frames
    }

    pub fn has_error(&self) -> bool {
        self.frames.iter().any(|f| f.status == FrameStatus::Error)
    }

    pub fn clock(&self) -> &ExecutionContext {
        &self.clock
    }

    pub fn clock_mut(&mut self) -> &mut ExecutionContext {
        &mut self.clock
    }
}
