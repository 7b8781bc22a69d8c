use thiserror::Error;

/// Field-level problems shown next to the comment box.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValidationError {
    #[error("Comment is required")]
    Required,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CommentDraft {
    pub comment: String,
}

impl CommentDraft {
    pub fn new(comment: impl Into<String>) -> Self {
        Self {
            comment: comment.into(),
        }
    }

    /// The text to submit, exactly as typed. Blank text is rejected.
    pub fn validate(&self) -> Result<&str, ValidationError> {
        if self.comment.trim().is_empty() {
            return Err(ValidationError::Required);
        }
        Ok(&self.comment)
    }

    pub fn is_dirty(&self) -> bool {
        !self.comment.is_empty()
    }

    pub fn clear(&mut self) {
        self.comment.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_required_message() {
        assert_eq!(ValidationError::Required.to_string(), "Comment is required");
    }

    #[test]
    fn test_blank_drafts_are_rejected() {
        assert_eq!(CommentDraft::default().validate(), Err(ValidationError::Required));
        assert_eq!(CommentDraft::new(" \n\t ").validate(), Err(ValidationError::Required));
    }

    #[test]
    fn test_valid_draft_keeps_whitespace() {
        let draft = CommentDraft::new("  nice post \n");
        assert_eq!(draft.validate(), Ok("  nice post \n"));
        assert!(draft.is_dirty());
    }

    #[test]
    fn test_clear() {
        let mut draft = CommentDraft::new("text");
        draft.clear();
        assert!(!draft.is_dirty());
    }
}
