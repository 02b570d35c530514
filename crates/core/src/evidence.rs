//! Evidence/justification gate.
//!
//! Every status change and area transfer must carry a justification note of
//! at least [`MIN_NOTES_LEN`] characters after trimming. There is no
//! exemption list; "low risk" transitions are gated exactly like the rest.
//! File evidence is optional, screened per file so one bad file never sinks
//! the rest of a batch.

use std::fmt;

use crate::error::CoreError;

/// Minimum trimmed length for transition justification notes.
pub const MIN_NOTES_LEN: usize = 10;

/// Maximum size for an evidence file submitted with a transition.
pub const EVIDENCE_MAX_FILE_BYTES: i64 = 5 * 1024 * 1024;

/// Maximum size for a general ticket attachment.
pub const GENERAL_MAX_FILE_BYTES: i64 = 10 * 1024 * 1024;

/// MIME types accepted as transition evidence.
pub const EVIDENCE_ALLOWED_MIME_TYPES: &[&str] = &[
    "image/jpeg",
    "image/png",
    "image/gif",
    "image/webp",
    "application/pdf",
];

/// MIME types accepted as general ticket attachments: the evidence set plus
/// Office documents.
pub const GENERAL_ALLOWED_MIME_TYPES: &[&str] = &[
    "image/jpeg",
    "image/png",
    "image/gif",
    "image/webp",
    "application/pdf",
    "application/msword",
    "application/vnd.openxmlformats-officedocument.wordprocessingml.document",
    "application/vnd.ms-excel",
    "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet",
    "application/vnd.ms-powerpoint",
    "application/vnd.openxmlformats-officedocument.presentationml.presentation",
];

/// Which rule set applies to an uploaded file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AttachmentKind {
    /// Transition evidence: images and PDF, up to 5MB.
    Evidence,
    /// General ticket attachment: adds Office documents, up to 10MB.
    General,
}

impl AttachmentKind {
    pub fn parse(value: &str) -> Result<Self, CoreError> {
        match value {
            "evidence" => Ok(AttachmentKind::Evidence),
            "general" => Ok(AttachmentKind::General),
            other => Err(CoreError::Validation(format!(
                "Invalid attachment kind '{other}'. Must be one of: evidence, general"
            ))),
        }
    }

    pub fn max_bytes(self) -> i64 {
        match self {
            AttachmentKind::Evidence => EVIDENCE_MAX_FILE_BYTES,
            AttachmentKind::General => GENERAL_MAX_FILE_BYTES,
        }
    }

    pub fn allowed_mime_types(self) -> &'static [&'static str] {
        match self {
            AttachmentKind::Evidence => EVIDENCE_ALLOWED_MIME_TYPES,
            AttachmentKind::General => GENERAL_ALLOWED_MIME_TYPES,
        }
    }
}

/// A specific reason the gate rejected a submission.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EvidenceViolation {
    NotesTooShort { length: usize },
    FileTypeRejected { mime_type: String },
    FileTooLarge { size_bytes: i64, max_bytes: i64 },
}

impl EvidenceViolation {
    /// Stable machine-readable code surfaced to API clients.
    pub fn code(&self) -> &'static str {
        match self {
            EvidenceViolation::NotesTooShort { .. } => "notes_too_short",
            EvidenceViolation::FileTypeRejected { .. } => "file_type_rejected",
            EvidenceViolation::FileTooLarge { .. } => "file_too_large",
        }
    }
}

impl fmt::Display for EvidenceViolation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EvidenceViolation::NotesTooShort { length } => write!(
                f,
                "notes must have at least {MIN_NOTES_LEN} characters after trimming \
                 (got {length})"
            ),
            EvidenceViolation::FileTypeRejected { mime_type } => {
                write!(f, "file type '{mime_type}' is not allowed")
            }
            EvidenceViolation::FileTooLarge {
                size_bytes,
                max_bytes,
            } => write!(f, "file size {size_bytes} exceeds the {max_bytes} byte limit"),
        }
    }
}

/// A file proposed for upload or referenced as transition evidence.
#[derive(Debug, Clone)]
pub struct FileCandidate {
    pub original_name: String,
    pub mime_type: String,
    pub size_bytes: i64,
}

/// A per-file rejection produced by [`screen_files`].
#[derive(Debug, Clone)]
pub struct FileRejection {
    pub original_name: String,
    pub violation: EvidenceViolation,
}

/// Validate transition justification notes.
pub fn validate_notes(notes: &str) -> Result<(), EvidenceViolation> {
    let length = notes.trim().chars().count();
    if length < MIN_NOTES_LEN {
        return Err(EvidenceViolation::NotesTooShort { length });
    }
    Ok(())
}

/// Check a single file against the rule set for `kind`.
///
/// Type is checked before size, so a disallowed oversized file reports the
/// type violation.
pub fn check_file(
    kind: AttachmentKind,
    mime_type: &str,
    size_bytes: i64,
) -> Result<(), EvidenceViolation> {
    if !kind.allowed_mime_types().contains(&mime_type) {
        return Err(EvidenceViolation::FileTypeRejected {
            mime_type: mime_type.to_string(),
        });
    }
    let max_bytes = kind.max_bytes();
    if size_bytes > max_bytes {
        return Err(EvidenceViolation::FileTooLarge {
            size_bytes,
            max_bytes,
        });
    }
    Ok(())
}

/// Screen a batch of candidate files, judging each one individually.
///
/// Returns the indices of accepted candidates and a rejection (with reason)
/// for each failed one. A failure never aborts evaluation of the rest of the
/// batch.
pub fn screen_files(
    kind: AttachmentKind,
    files: &[FileCandidate],
) -> (Vec<usize>, Vec<FileRejection>) {
    let mut accepted = Vec::new();
    let mut rejected = Vec::new();
    for (index, file) in files.iter().enumerate() {
        match check_file(kind, &file.mime_type, file.size_bytes) {
            Ok(()) => accepted.push(index),
            Err(violation) => rejected.push(FileRejection {
                original_name: file.original_name.clone(),
                violation,
            }),
        }
    }
    (accepted, rejected)
}

/// Gate a proposed transition: notes are mandatory, evidence files must all
/// conform to the evidence rule set.
///
/// This is the server-side re-derivation of the same rules applied at upload
/// time; `files` here are the stored attachments the transition references,
/// so any violation means the referenced evidence is unusable and the whole
/// transition is rejected.
pub fn validate_transition_evidence(
    notes: &str,
    files: &[FileCandidate],
) -> Result<(), CoreError> {
    validate_notes(notes).map_err(CoreError::EvidenceRejected)?;
    for file in files {
        check_file(AttachmentKind::Evidence, &file.mime_type, file.size_bytes)
            .map_err(CoreError::EvidenceRejected)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn candidate(name: &str, mime: &str, size: i64) -> FileCandidate {
        FileCandidate {
            original_name: name.to_string(),
            mime_type: mime.to_string(),
            size_bytes: size,
        }
    }

    #[test]
    fn test_notes_shorter_than_ten_chars_rejected() {
        let result = validate_notes("curto");
        assert_eq!(result.unwrap_err().code(), "notes_too_short");
    }

    #[test]
    fn test_notes_whitespace_is_trimmed_before_counting() {
        // 9 meaningful characters padded to look longer.
        assert!(validate_notes("  a b c d e      ").is_err());
        assert!(validate_notes("  justificativa  ").is_ok());
    }

    #[test]
    fn test_notes_exactly_ten_chars_accepted() {
        assert!(validate_notes("a".repeat(10).as_str()).is_ok());
        assert!(validate_notes("a".repeat(9).as_str()).is_err());
    }

    #[test]
    fn test_evidence_accepts_images_and_pdf_only() {
        for mime in EVIDENCE_ALLOWED_MIME_TYPES {
            assert!(check_file(AttachmentKind::Evidence, mime, 1024).is_ok());
        }
        let result = check_file(AttachmentKind::Evidence, "application/zip", 1024);
        assert_eq!(result.unwrap_err().code(), "file_type_rejected");
    }

    #[test]
    fn test_office_documents_allowed_only_for_general_attachments() {
        let docx =
            "application/vnd.openxmlformats-officedocument.wordprocessingml.document";
        assert!(check_file(AttachmentKind::General, docx, 1024).is_ok());
        assert!(check_file(AttachmentKind::Evidence, docx, 1024).is_err());
    }

    #[test]
    fn test_evidence_file_over_five_megabytes_rejected() {
        let six_mb = 6 * 1024 * 1024;
        let result = check_file(AttachmentKind::Evidence, "image/png", six_mb);
        assert_eq!(result.unwrap_err().code(), "file_too_large");
        // The same size is fine as a general attachment (10MB cap).
        assert!(check_file(AttachmentKind::General, "image/png", six_mb).is_ok());
    }

    #[test]
    fn test_size_exactly_at_limit_accepted() {
        assert!(check_file(AttachmentKind::Evidence, "image/png", EVIDENCE_MAX_FILE_BYTES).is_ok());
        assert!(
            check_file(AttachmentKind::Evidence, "image/png", EVIDENCE_MAX_FILE_BYTES + 1).is_err()
        );
    }

    #[test]
    fn test_batch_screening_judges_each_file_individually() {
        // Scenario: a 6MB PNG and a valid 1MB PDF in the same batch; the PNG
        // is rejected with file_too_large, the PDF is still accepted.
        let files = vec![
            candidate("print.png", "image/png", 6 * 1024 * 1024),
            candidate("laudo.pdf", "application/pdf", 1024 * 1024),
        ];
        let (accepted, rejected) = screen_files(AttachmentKind::Evidence, &files);
        assert_eq!(accepted, vec![1]);
        assert_eq!(rejected.len(), 1);
        assert_eq!(rejected[0].original_name, "print.png");
        assert_eq!(rejected[0].violation.code(), "file_too_large");
    }

    #[test]
    fn test_empty_batch_screens_clean() {
        let (accepted, rejected) = screen_files(AttachmentKind::Evidence, &[]);
        assert!(accepted.is_empty());
        assert!(rejected.is_empty());
    }

    #[test]
    fn test_transition_gate_passes_with_notes_only() {
        assert!(validate_transition_evidence("Iniciando atendimento agora", &[]).is_ok());
    }

    #[test]
    fn test_transition_gate_reports_notes_too_short() {
        let result = validate_transition_evidence("ok", &[]);
        match result.unwrap_err() {
            crate::error::CoreError::EvidenceRejected(v) => {
                assert_eq!(v.code(), "notes_too_short")
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_transition_gate_rejects_invalid_referenced_file() {
        let files = vec![candidate("planilha.xlsx", "application/vnd.ms-excel", 1024)];
        let result = validate_transition_evidence("Justificativa valida", &files);
        match result.unwrap_err() {
            crate::error::CoreError::EvidenceRejected(v) => {
                assert_eq!(v.code(), "file_type_rejected")
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_attachment_kind_parse() {
        assert_eq!(
            AttachmentKind::parse("evidence").unwrap(),
            AttachmentKind::Evidence
        );
        assert_eq!(
            AttachmentKind::parse("general").unwrap(),
            AttachmentKind::General
        );
        assert!(AttachmentKind::parse("anexo").is_err());
    }
}
