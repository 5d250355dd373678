//! Language feature configuration.
//!
//! Host applications restrict or relax the accepted language per exercise.
//! The struct deserializes from camelCase JSON with every field optional.

use crate::ast::NodeKind;
use serde::{Deserialize, Serialize};

pub const DEFAULT_MAX_TOTAL_LOOP_ITERATIONS: u64 = 10_000;
pub const DEFAULT_MAX_TOTAL_EXECUTION_TIME_MS: u64 = 10_000;
pub const DEFAULT_MAX_CALL_DEPTH: usize = 200;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct LanguageFeatures {
    /// Permit `let x` in a nested scope when an enclosing scope has `x`.
    pub allow_shadowing: bool,
    /// Permit non-boolean values in conditions and logical operators.
    pub allow_truthiness: bool,
    /// Permit mixed-type arithmetic, comparison and concatenation.
    pub allow_type_coercion: bool,
    /// Node kinds rejected at parse time.
    pub exclude_list: Option<Vec<NodeKind>>,
    /// When present, the only node kinds accepted at parse time.
    #[serde(alias = "allowedNodes")]
    pub include_list: Option<Vec<NodeKind>>,
    pub max_total_loop_iterations: u64,
    /// Budget in virtual milliseconds.
    pub max_total_execution_time: u64,
    pub max_call_depth: usize,
}

impl Default for LanguageFeatures {
    fn default() -> Self {
        Self {
            allow_shadowing: false,
            allow_truthiness: false,
            allow_type_coercion: false,
            exclude_list: None,
            include_list: None,
            max_total_loop_iterations: DEFAULT_MAX_TOTAL_LOOP_ITERATIONS,
            max_total_execution_time: DEFAULT_MAX_TOTAL_EXECUTION_TIME_MS,
            max_call_depth: DEFAULT_MAX_CALL_DEPTH,
        }
    }
}

impl LanguageFeatures {
    /// Load features from a JSON object, filling unspecified fields with defaults.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    /// Whether a node of `kind` may appear in a program.
    ///
    /// The exclude list wins over the include list.
    pub fn is_node_allowed(&self, kind: NodeKind) -> bool {
        if self
            .exclude_list
            .as_ref()
            .is_some_and(|excluded| excluded.contains(&kind))
        {
            return false;
        }
        self.include_list
            .as_ref()
            .is_none_or(|included| included.contains(&kind))
    }
}
