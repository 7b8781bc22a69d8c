mod draft;
mod form;

pub use draft::{CommentDraft, ValidationError};
pub use form::{CommentForm, SubmissionState, SubmitOutcome};
