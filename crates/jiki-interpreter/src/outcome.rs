//! What the interpreter entry points hand back.

use jiki_eval::{Frame, FrameStatus, RuntimeObject};
use jiki_types::SyntaxError;
use serde::ser::SerializeMap;
use serde::{Serialize, Serializer};

/// Result of [`interpret`](crate::interpret).
///
/// A runtime failure is reported only on the last frame; `error` holds
/// syntax errors, which prevent execution altogether.
#[derive(Debug, Serialize)]
pub struct InterpretResult {
    pub frames: Vec<Frame>,
    pub error: Option<SyntaxError>,
    pub success: bool,
}

impl InterpretResult {
    pub(crate) fn syntax_error(error: SyntaxError) -> Self {
        Self {
            frames: Vec::new(),
            error: Some(error),
            success: false,
        }
    }

    pub(crate) fn from_frames(frames: Vec<Frame>) -> Self {
        let success = frames.iter().all(|f| f.status == FrameStatus::Success);
        Self {
            frames,
            error: None,
            success,
        }
    }

    /// The frame that ended execution, if a runtime error did.
    pub fn runtime_error_frame(&self) -> Option<&Frame> {
        self.frames
            .last()
            .filter(|frame| frame.status == FrameStatus::Error)
    }
}

/// Result of [`compile`](crate::compile).
///
/// Serializes as `{}` on success and as
/// `{ "type": "CompilationError", "error": ..., "frames": [] }` otherwise.
#[derive(Debug, Clone, PartialEq)]
pub enum CompileResult {
    Success,
    CompilationError { error: SyntaxError },
}

impl CompileResult {
    pub fn is_success(&self) -> bool {
        matches!(self, CompileResult::Success)
    }

    pub fn error(&self) -> Option<&SyntaxError> {
        match self {
            CompileResult::Success => None,
            CompileResult::CompilationError { error } => Some(error),
        }
    }
}

impl Serialize for CompileResult {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            CompileResult::Success => serializer.serialize_map(Some(0))?.end(),
            CompileResult::CompilationError { error } => {
                let mut map = serializer.serialize_map(Some(3))?;
                map.serialize_entry("type", "CompilationError")?;
                map.serialize_entry("error", error)?;
                map.serialize_entry("frames", &[] as &[Frame])?;
                map.end()
            }
        }
    }
}

/// Result of [`evaluate_function`](crate::evaluate_function).
#[derive(Debug, Serialize)]
pub struct FunctionResult {
    /// What the function returned; absent when anything failed.
    pub value: Option<RuntimeObject>,
    pub frames: Vec<Frame>,
    pub error: Option<SyntaxError>,
    pub success: bool,
}
