use tracing::{debug, info};

use super::index::{covers, CommentableIndex};
use super::types::{
    Annotation, CrossHunkPolicy, Rejection, RejectionReason, Side, ValidatedComment,
    ValidationOutcome,
};
use crate::diff::{normalize_path, DiffDocument};

/// Checks candidate annotations against the commentable lines of a diff.
///
/// Holds no mutable state, so one validator can be shared by reference and
/// called any number of times with identical results.
#[derive(Debug, Clone)]
pub struct AnnotationValidator {
    index: CommentableIndex,
    policy: CrossHunkPolicy,
}

impl AnnotationValidator {
    pub fn new(document: &DiffDocument, policy: CrossHunkPolicy) -> Self {
        Self {
            index: CommentableIndex::new(document),
            policy,
        }
    }

    pub fn index(&self) -> &CommentableIndex {
        &self.index
    }

    /// Validate one annotation.
    ///
    /// Checks run in order: known file, positive non-inverted range, range
    /// contained in the commentable lines allowed by the policy.
    pub fn validate(&self, annotation: &Annotation) -> Result<ValidatedComment, RejectionReason> {
        let path = normalize_path(&annotation.path);
        let hunks = self
            .index
            .hunks(path)
            .ok_or_else(|| RejectionReason::UnknownFile {
                path: annotation.path.clone(),
            })?;

        let (start, end) = check_range(annotation.start_line, annotation.end_line)?;

        let contained = match self.policy {
            CrossHunkPolicy::Strict => hunks.iter().any(|lines| covers(lines, start, end)),
            CrossHunkPolicy::FileUnion => self
                .index
                .file_lines(path)
                .is_some_and(|lines| covers(lines, start, end)),
        };
        if !contained {
            return Err(RejectionReason::OutOfHunkRange {
                path: path.to_string(),
                start,
                end,
            });
        }

        Ok(ValidatedComment {
            path: path.to_string(),
            start_line: start,
            end_line: end,
            body: annotation.body.clone(),
            side: Side::Right,
        })
    }

    /// Validate a batch, keeping input order. A rejection never stops the
    /// remaining annotations from being checked.
    pub fn validate_all<'a, I>(&self, annotations: I) -> ValidationOutcome
    where
        I: IntoIterator<Item = &'a Annotation>,
    {
        let mut outcome = ValidationOutcome::default();
        for annotation in annotations {
            match self.validate(annotation) {
                Ok(comment) => outcome.accepted.push(comment),
                Err(reason) => {
                    debug!(
                        path = %annotation.path,
                        start = annotation.start_line,
                        end = annotation.end_line,
                        reason = reason.code(),
                        "rejected annotation: {reason}"
                    );
                    outcome.rejected.push(Rejection {
                        annotation: annotation.clone(),
                        reason,
                    });
                }
            }
        }
        info!(
            accepted = outcome.accepted.len(),
            rejected = outcome.rejected.len(),
            "validated annotations"
        );
        outcome
    }
}

/// Validate a single annotation against `document` under the strict
/// single-hunk policy.
///
/// Reads the document's hunks directly and builds no index. For a batch,
/// [`AnnotationValidator`] answers each check from its precomputed sets.
pub fn validate(
    annotation: &Annotation,
    document: &DiffDocument,
) -> Result<ValidatedComment, RejectionReason> {
    let file = document
        .file(&annotation.path)
        .ok_or_else(|| RejectionReason::UnknownFile {
            path: annotation.path.clone(),
        })?;

    let (start, end) = check_range(annotation.start_line, annotation.end_line)?;

    if !file.hunks.iter().any(|hunk| hunk.covers(start, end)) {
        return Err(RejectionReason::OutOfHunkRange {
            path: file.path.clone(),
            start,
            end,
        });
    }

    Ok(ValidatedComment {
        path: file.path.clone(),
        start_line: start,
        end_line: end,
        body: annotation.body.clone(),
        side: Side::Right,
    })
}

fn check_range(start: i64, end: i64) -> Result<(usize, usize), RejectionReason> {
    let malformed = || RejectionReason::MalformedRange { start, end };
    if start <= 0 || end <= 0 {
        return Err(malformed());
    }
    if start > end {
        return Err(RejectionReason::InvertedRange { start, end });
    }
    let start_line = usize::try_from(start).map_err(|_| malformed())?;
    let end_line = usize::try_from(end).map_err(|_| malformed())?;
    Ok((start_line, end_line))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::diff::parse_document;

    const APP_DIFF: &str = "\
diff --git a/src/app.py b/src/app.py
index 1111111..2222222 100644
--- a/src/app.py
+++ b/src/app.py
@@ -10,3 +10,4 @@ def handler():
     ctx = load()
+    a = 1
+    b = 2
     return ctx
@@ -30,2 +31,3 @@
 x = 1
+y = 2
 z = 3
";

    fn annotation(path: &str, start: i64, end: i64) -> Annotation {
        Annotation {
            path: path.to_string(),
            start_line: start,
            end_line: end,
            body: "looks off".to_string(),
        }
    }

    fn strict() -> AnnotationValidator {
        AnnotationValidator::new(&parse_document(APP_DIFF), CrossHunkPolicy::Strict)
    }

    #[test]
    fn test_accepts_range_inside_hunk() {
        let comment = strict().validate(&annotation("src/app.py", 11, 12)).unwrap();
        assert_eq!(comment.path, "src/app.py");
        assert_eq!((comment.start_line, comment.end_line), (11, 12));
        assert_eq!(comment.body, "looks off");
        assert_eq!(comment.side, Side::Right);
    }

    #[test]
    fn test_accepts_exact_hunk_boundaries() {
        assert!(strict().validate(&annotation("src/app.py", 10, 13)).is_ok());
        assert!(strict().validate(&annotation("src/app.py", 31, 33)).is_ok());
    }

    #[test]
    fn test_accepts_prefixed_path() {
        let comment = strict().validate(&annotation("b/src/app.py", 10, 10)).unwrap();
        assert_eq!(comment.path, "src/app.py");
    }

    #[test]
    fn test_rejects_line_before_hunk() {
        let err = strict().validate(&annotation("src/app.py", 9, 10)).unwrap_err();
        assert_eq!(
            err,
            RejectionReason::OutOfHunkRange {
                path: "src/app.py".to_string(),
                start: 9,
                end: 10
            }
        );
    }

    #[test]
    fn test_rejects_one_past_hunk_end() {
        let err = strict().validate(&annotation("src/app.py", 14, 14)).unwrap_err();
        assert_eq!(err.code(), "OutOfHunkRange");
    }

    #[test]
    fn test_rejects_range_spanning_hunks() {
        let err = strict().validate(&annotation("src/app.py", 13, 31)).unwrap_err();
        assert_eq!(err.code(), "OutOfHunkRange");
    }

    #[test]
    fn test_one_past_end_rejected_even_if_next_hunk_starts_there() {
        let diff = "diff --git a/f b/f\n@@ -1,2 +1,2 @@\n a\n b\n@@ -3,2 +3,2 @@\n c\n d\n";
        let validator = AnnotationValidator::new(&parse_document(diff), CrossHunkPolicy::Strict);
        // 3 is commentable in the second hunk, but 2..3 crosses the boundary
        assert!(validator.validate(&annotation("f", 3, 3)).is_ok());
        let err = validator.validate(&annotation("f", 2, 3)).unwrap_err();
        assert_eq!(err.code(), "OutOfHunkRange");
    }

    #[test]
    fn test_file_union_policy_allows_adjacent_hunks() {
        let diff = "diff --git a/f b/f\n@@ -1,2 +1,2 @@\n a\n b\n@@ -3,2 +3,2 @@\n c\n d\n";
        let validator =
            AnnotationValidator::new(&parse_document(diff), CrossHunkPolicy::FileUnion);
        assert!(validator.validate(&annotation("f", 2, 3)).is_ok());
        // still rejects gaps in the union
        let lenient = AnnotationValidator::new(&parse_document(APP_DIFF), CrossHunkPolicy::FileUnion);
        assert!(lenient.validate(&annotation("src/app.py", 13, 31)).is_err());
    }

    #[test]
    fn test_rejects_unknown_file() {
        let err = strict().validate(&annotation("missing.py", 1, 1)).unwrap_err();
        assert_eq!(
            err,
            RejectionReason::UnknownFile {
                path: "missing.py".to_string()
            }
        );
    }

    #[test]
    fn test_rejects_inverted_range() {
        let err = strict().validate(&annotation("src/app.py", 12, 11)).unwrap_err();
        assert_eq!(err, RejectionReason::InvertedRange { start: 12, end: 11 });
    }

    #[test]
    fn test_rejects_non_positive_lines() {
        let v = strict();
        assert_eq!(v.validate(&annotation("src/app.py", 0, 11)).unwrap_err().code(), "MalformedRange");
        assert_eq!(v.validate(&annotation("src/app.py", -3, -1)).unwrap_err().code(), "MalformedRange");
    }

    #[test]
    fn test_unknown_file_checked_before_range() {
        let err = strict().validate(&annotation("missing.py", 5, 2)).unwrap_err();
        assert_eq!(err.code(), "UnknownFile");
    }

    #[test]
    fn test_removed_lines_are_not_commentable() {
        let diff = "diff --git a/f b/f\n@@ -1,3 +1,2 @@\n a\n-gone\n b\n";
        let validator = AnnotationValidator::new(&parse_document(diff), CrossHunkPolicy::Strict);
        assert!(validator.validate(&annotation("f", 1, 2)).is_ok());
        assert!(validator.validate(&annotation("f", 3, 3)).is_err());
    }

    #[test]
    fn test_file_without_hunks_rejects_as_out_of_range() {
        let diff = "diff --git a/f b/f\n@@ broken @@\n+x\n";
        let validator = AnnotationValidator::new(&parse_document(diff), CrossHunkPolicy::Strict);
        let err = validator.validate(&annotation("f", 1, 1)).unwrap_err();
        assert_eq!(err.code(), "OutOfHunkRange");
    }

    #[test]
    fn test_validate_is_idempotent() {
        let doc = parse_document(APP_DIFF);
        for a in [
            annotation("src/app.py", 11, 12),
            annotation("src/app.py", 9, 10),
            annotation("nope", 1, 1),
        ] {
            assert_eq!(validate(&a, &doc), validate(&a, &doc));
        }
    }

    #[test]
    fn test_validate_all_partitions_in_order() {
        let annotations = vec![
            annotation("src/app.py", 11, 12),
            annotation("src/app.py", 9, 10),
            annotation("missing.py", 1, 1),
            annotation("src/app.py", 12, 11),
            annotation("src/app.py", 32, 32),
        ];
        let outcome = strict().validate_all(&annotations);
        assert_eq!(outcome.accepted.len(), 2);
        assert_eq!(outcome.accepted[0].start_line, 11);
        assert_eq!(outcome.accepted[1].start_line, 32);
        let codes: Vec<_> = outcome.rejected.iter().map(|r| r.reason.code()).collect();
        assert_eq!(codes, vec!["OutOfHunkRange", "UnknownFile", "InvertedRange"]);
        assert_eq!(outcome.rejected[1].annotation.path, "missing.py");
    }

    #[test]
    fn test_shared_validator_across_threads() {
        let validator = strict();
        let a = annotation("src/app.py", 11, 12);
        std::thread::scope(|s| {
            let handles: Vec<_> = (0..4).map(|_| s.spawn(|| validator.validate(&a))).collect();
            for handle in handles {
                assert!(handle.join().unwrap().is_ok());
            }
        });
    }

    #[test]
    fn test_free_validate_matches_strict_validator() {
        let document = parse_document(APP_DIFF);
        let validator = AnnotationValidator::new(&document, CrossHunkPolicy::Strict);
        for path in ["src/app.py", "b/src/app.py", "missing.py"] {
            for start in -1..36 {
                for end in [start - 1, start, start + 1, start + 3] {
                    let a = annotation(path, start, end);
                    assert_eq!(validate(&a, &document), validator.validate(&a), "{path}:{start}-{end}");
                }
            }
        }
    }
}
