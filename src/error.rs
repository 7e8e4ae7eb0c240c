use thiserror::Error;

/// Errors raised while building a command frame.
///
/// These only happen when a caller hands the codec parameters that do not
/// match a template, which is a bug in the caller rather than something the
/// device can cause.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum Error {
    /// A parameter value does not fit into the bytes reserved for it.
    #[error("parameter {index} ({value:#x}) does not fit in {width} byte(s)")]
    ParameterOverflow { index: usize, width: usize, value: u32 },

    /// Wrong number of parameter values for the template.
    #[error("template {template} takes {expected} parameter(s), got {actual}")]
    ParameterCount {
        template: &'static str,
        expected: usize,
        actual: usize,
    },

    /// The encoded frame would not fit into the frame buffer.
    #[error("frame of {len} bytes exceeds the frame buffer")]
    FrameTooLong { len: usize },
}
