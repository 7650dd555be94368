//! Unified-diff hunk parsing and review-comment position validation.
//!
//! Raw diff text flows one way: [`diff::lexer`] classifies lines,
//! [`diff::builder`] folds them into a [`diff::DiffDocument`],
//! [`review::CommentableIndex`] derives the commentable new-file lines and
//! [`review::AnnotationValidator`] checks candidate comments against them.

pub mod config;
pub mod diff;
pub mod input;
pub mod publish;
pub mod report;
pub mod review;
