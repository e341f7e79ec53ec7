//! View options and dynamic call arguments

use std::time::Duration;

use serde_json::Value;

use crate::application::{ApplicationError, ApplicationResult};

/// Filter delay used when none is configured.
pub const DEFAULT_FILTER_DELAY: Duration = Duration::from_millis(500);

/// How long filter input waits before the filter runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FilterDelay {
    /// Run the filter synchronously on every input.
    Immediate,
    /// Run once no further input arrived for the given duration.
    Debounced(Duration),
}

impl FilterDelay {
    /// `0` is the immediate sentinel.
    pub fn from_millis(ms: u64) -> Self {
        if ms == 0 {
            FilterDelay::Immediate
        } else {
            FilterDelay::Debounced(Duration::from_millis(ms))
        }
    }
}

impl Default for FilterDelay {
    fn default() -> Self {
        FilterDelay::Debounced(DEFAULT_FILTER_DELAY)
    }
}

/// Tree-wide view options.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ViewOptions {
    /// Labels are inserted as markup rather than text
    pub html_labels: bool,
    /// Render the filter controls and react to filter input
    pub filter: bool,
    pub filter_delay: FilterDelay,
}

impl Default for ViewOptions {
    fn default() -> Self {
        Self {
            html_labels: false,
            filter: true,
            filter_delay: FilterDelay::default(),
        }
    }
}

/// How many generations a render materializes.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum RenderDepth {
    #[default]
    Unlimited,
    /// `Levels(0)` is the root plus its immediate children; each further
    /// level adds one generation.
    Levels(usize),
}

impl RenderDepth {
    /// Generations below the root that get elements, `None` for all.
    pub(crate) fn generations(self) -> Option<usize> {
        match self {
            RenderDepth::Unlimited => None,
            RenderDepth::Levels(n) => Some(n.saturating_add(1)),
        }
    }
}

impl From<Option<usize>> for RenderDepth {
    fn from(depth: Option<usize>) -> Self {
        depth.map_or(RenderDepth::Unlimited, RenderDepth::Levels)
    }
}

/// Argument of `set_selection`: one value or several.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SelectionArg {
    One(String),
    Many(Vec<String>),
}

impl SelectionArg {
    pub fn values(&self) -> &[String] {
        match self {
            SelectionArg::One(value) => std::slice::from_ref(value),
            SelectionArg::Many(values) => values,
        }
    }
}

impl From<&str> for SelectionArg {
    fn from(value: &str) -> Self {
        SelectionArg::One(value.to_string())
    }
}

impl From<String> for SelectionArg {
    fn from(value: String) -> Self {
        SelectionArg::One(value)
    }
}

impl From<Vec<String>> for SelectionArg {
    fn from(values: Vec<String>) -> Self {
        SelectionArg::Many(values)
    }
}

impl From<&[&str]> for SelectionArg {
    fn from(values: &[&str]) -> Self {
        SelectionArg::Many(values.iter().map(|v| v.to_string()).collect())
    }
}

impl<const N: usize> From<[&str; N]> for SelectionArg {
    fn from(values: [&str; N]) -> Self {
        SelectionArg::Many(values.iter().map(|v| v.to_string()).collect())
    }
}

impl TryFrom<Value> for SelectionArg {
    type Error = ApplicationError;

    /// Accepts a string or an array of strings.
    fn try_from(value: Value) -> ApplicationResult<Self> {
        match value {
            Value::String(s) => Ok(SelectionArg::One(s)),
            Value::Array(items) => items
                .into_iter()
                .map(|item| match item {
                    Value::String(s) => Ok(s),
                    other => Err(ApplicationError::InvalidArgument(format!(
                        "selection entries must be strings, got {other}"
                    ))),
                })
                .collect::<ApplicationResult<Vec<_>>>()
                .map(SelectionArg::Many),
            other => Err(ApplicationError::InvalidArgument(format!(
                "selection must be a string or a list of strings, got {other}"
            ))),
        }
    }
}
