pub mod index;
pub mod types;
pub mod validator;

pub use index::CommentableIndex;
pub use types::{
    Annotation, CrossHunkPolicy, Rejection, RejectionReason, Side, ValidatedComment,
    ValidationOutcome,
};
pub use validator::{validate, AnnotationValidator};

#[cfg(test)]
mod tests {
    use super::*;
    use crate::diff::parse_document;

    /// The full round trip on the documented example diff.
    #[test]
    fn test_app_py_scenario() {
        let diff = "\
diff --git a/src/app.py b/src/app.py
--- a/src/app.py
+++ b/src/app.py
@@ -10,3 +10,4 @@
 def run():
+    setup()
+    go()
 return
";
        let document = parse_document(diff);
        let index = CommentableIndex::new(&document);
        let lines: Vec<_> = index.hunk_lines("src/app.py", 0).unwrap().iter().copied().collect();
        assert_eq!(lines, vec![10, 11, 12, 13]);

        let make = |path: &str, start, end| Annotation {
            path: path.to_string(),
            start_line: start,
            end_line: end,
            body: "comment".to_string(),
        };

        assert!(validate(&make("src/app.py", 11, 12), &document).is_ok());
        assert!(matches!(
            validate(&make("src/app.py", 9, 10), &document),
            Err(RejectionReason::OutOfHunkRange { .. })
        ));
        assert!(matches!(
            validate(&make("missing.py", 11, 12), &document),
            Err(RejectionReason::UnknownFile { .. })
        ));
        assert!(matches!(
            validate(&make("src/app.py", 12, 11), &document),
            Err(RejectionReason::InvertedRange { .. })
        ));
    }

    #[test]
    fn test_empty_document_rejects_everything() {
        let document = parse_document("not a diff at all\n");
        let validator = AnnotationValidator::new(&document, CrossHunkPolicy::Strict);
        let annotations = vec![Annotation {
            path: "src/app.py".to_string(),
            start_line: 1,
            end_line: 1,
            body: String::new(),
        }];
        let outcome = validator.validate_all(&annotations);
        assert!(outcome.accepted.is_empty());
        assert_eq!(outcome.rejected.len(), 1);
        assert_eq!(outcome.rejected[0].reason.code(), "UnknownFile");
        assert_eq!(
            outcome.rejected[0].reason,
            RejectionReason::UnknownFile {
                path: "src/app.py".to_string()
            }
        );
    }

    #[test]
    fn test_unusable_line_values_are_rejected_per_record() {
        let document = parse_document("diff --git a/a b/a\n@@ -1 +1,4 @@\n+w\n+x\n+y\n+z\n");
        let annotations = crate::input::parse_annotations(
            "inline",
            r#"[{"path": "a", "line": 3, "body": "ok"}, {"path": "a", "line": "soon", "body": "bad"}]"#,
        )
        .unwrap();
        let outcome = AnnotationValidator::new(&document, CrossHunkPolicy::Strict).validate_all(&annotations);
        assert_eq!(outcome.accepted.len(), 1);
        assert_eq!(outcome.accepted[0].start_line, 3);
        assert_eq!(outcome.rejected.len(), 1);
        assert_eq!(outcome.rejected[0].reason.code(), "MalformedRange");
    }
}
