use thiserror::Error;

/// Errors that can surface from a dispatch call
///
/// Under the default [`MismatchPolicy::Skip`](super::MismatchPolicy::Skip) no
/// dispatch ever fails: unknown names, unknown targets and signature
/// mismatches are all silent no-ops. Handler panics are never caught and do
/// not appear here.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DispatchError {
    #[error(
        "Signature mismatch on event {event} for {target}: registered {registered}, dispatched {dispatched}"
    )]
    SignatureMismatch {
        event: String,
        target: String,
        registered: &'static str,
        dispatched: &'static str,
    },
}

impl DispatchError {
    pub(crate) fn signature_mismatch(
        event: &str,
        target: impl std::fmt::Debug,
        registered: &'static str,
        dispatched: &'static str,
    ) -> Self {
        DispatchError::SignatureMismatch {
            event: event.to_string(),
            target: format!("{:?}", target),
            registered,
            dispatched,
        }
    }
}
