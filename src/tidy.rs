//! Mechanical code quality checks over `src/`.
//!
//! An AST-based lint pass run as a unit test. It assumes `rustfmt --check` and
//! `cargo clippy` run separately in CI and only covers what those cannot:
//!
//! **Critical** (fails the test)
//! - No `.unwrap()` or `.expect()` outside test code.
//! - Public functions, methods and structs are documented.
//! - Public parameters spell out wire field names (`frame_type`, not `ft`).
//! - No catch-all modules such as `utils.rs`.
//! - No `FIXME` comments.
//!
//! **Ratchet** (fails the test, raise the limit consciously)
//! - Module size high-water mark.
//! - Struct field count.

use std::fs;
use std::path::{Path, PathBuf};

use proc_macro2::Span;
use syn::spanned::Spanned;
use syn::visit::{self, Visit};
use syn::{
    Attribute, ExprMethodCall, FnArg, ImplItemFn, ItemFn, ItemMod, ItemStruct, Pat, PatType,
    Signature, Visibility,
};

// --- Configuration Constants ---

/// Max fields in any struct.
const STRUCT_FIELD_COUNT_MAX: usize = 12;

/// Max lines in any single module.
const MODULE_SIZE_HIGH_WATER_MARK: usize = 700;

/// Abbreviated public parameter names and their required spelling.
const PARAMETER_ABBREVIATIONS: &[(&str, &str)] = &[
    ("ft", "frame_type"),
    ("cmr", "codec_mode_request"),
    ("pt", "payload_type"),
    ("buf", "buffer"),
];

/// Module names that collect unrelated code.
const ANTI_PATTERN_MODULES: &[&str] = &["utils.rs", "helpers.rs", "misc.rs", "common.rs"];

// --- Data Structures for Tidy Checks ---

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
enum Severity {
    Ratchet,
    Critical,
}

#[derive(Debug)]
struct TidyViolation {
    severity: Severity,
    path: String,
    line: usize,
    message: String,
}

impl TidyViolation {
    fn new(severity: Severity, path: &Path, span: Span, message: impl Into<String>) -> Self {
        TidyViolation {
            severity,
            path: path.to_string_lossy().to_string(),
            line: span.start().line,
            message: message.into(),
        }
    }
}

struct SourceFile<'a> {
    path: &'a Path,
    text: &'a str,
}

// --- AST-Based Visitor ---

/// Walks a `syn::File`, tracking whether the current item sits under `#[cfg(test)]`.
struct TidyVisitor<'a> {
    file: &'a SourceFile<'a>,
    test_depth: usize,
    violations: Vec<TidyViolation>,
}

fn is_cfg_test(attrs: &[Attribute]) -> bool {
    attrs.iter().any(|attr| {
        attr.path().is_ident("cfg")
            && attr
                .parse_args::<syn::Ident>()
                .is_ok_and(|ident| ident == "test")
    })
}

fn has_doc(attrs: &[Attribute]) -> bool {
    attrs.iter().any(|attr| attr.path().is_ident("doc"))
}

impl<'a> TidyVisitor<'a> {
    fn new(file: &'a SourceFile<'a>) -> Self {
        Self {
            file,
            test_depth: 0,
            violations: Vec::new(),
        }
    }

    fn in_test_code(&self) -> bool {
        self.test_depth > 0
    }

    fn add_violation(&mut self, severity: Severity, span: Span, message: impl Into<String>) {
        self.violations
            .push(TidyViolation::new(severity, self.file.path, span, message));
    }

    fn check_public_fn(&mut self, attrs: &[Attribute], sig: &Signature) {
        if !has_doc(attrs) {
            self.add_violation(
                Severity::Critical,
                sig.fn_token.span(),
                format!("Public function '{}' must have documentation.", sig.ident),
            );
        }

        for arg in &sig.inputs {
            if let FnArg::Typed(PatType { pat, .. }) = arg {
                if let Pat::Ident(pat_ident) = &**pat {
                    let name = pat_ident.ident.to_string();
                    if let Some((_, spelled)) = PARAMETER_ABBREVIATIONS
                        .iter()
                        .find(|(short, _)| *short == name)
                    {
                        self.add_violation(
                            Severity::Critical,
                            pat_ident.span(),
                            format!("Public API parameter '{}' must be named '{}'.", name, spelled),
                        );
                    }
                }
            }
        }
    }
}

impl<'ast, 'a> Visit<'ast> for TidyVisitor<'a> {
    fn visit_item_mod(&mut self, item: &'ast ItemMod) {
        let is_test = is_cfg_test(&item.attrs);
        if is_test {
            self.test_depth += 1;
        }
        visit::visit_item_mod(self, item);
        if is_test {
            self.test_depth -= 1;
        }
    }

    fn visit_item_fn(&mut self, item: &'ast ItemFn) {
        let is_test = is_cfg_test(&item.attrs);
        if is_test {
            self.test_depth += 1;
        }
        if matches!(item.vis, Visibility::Public(_)) && !self.in_test_code() {
            self.check_public_fn(&item.attrs, &item.sig);
        }
        visit::visit_item_fn(self, item);
        if is_test {
            self.test_depth -= 1;
        }
    }

    fn visit_impl_item_fn(&mut self, item: &'ast ImplItemFn) {
        if matches!(item.vis, Visibility::Public(_)) && !self.in_test_code() {
            self.check_public_fn(&item.attrs, &item.sig);
        }
        visit::visit_impl_item_fn(self, item);
    }

    fn visit_item_struct(&mut self, item: &'ast ItemStruct) {
        if item.fields.len() > STRUCT_FIELD_COUNT_MAX {
            self.add_violation(
                Severity::Ratchet,
                item.ident.span(),
                format!(
                    "Struct '{}' has {} fields, exceeding the max of {}. Consider decomposition.",
                    item.ident,
                    item.fields.len(),
                    STRUCT_FIELD_COUNT_MAX
                ),
            );
        }

        if matches!(item.vis, Visibility::Public(_))
            && !self.in_test_code()
            && !has_doc(&item.attrs)
        {
            self.add_violation(
                Severity::Critical,
                item.struct_token.span(),
                format!("Public struct '{}' must have documentation.", item.ident),
            );
        }

        visit::visit_item_struct(self, item);
    }

    fn visit_expr_method_call(&mut self, call: &'ast ExprMethodCall) {
        if !self.in_test_code() {
            if call.method == "unwrap" {
                self.add_violation(
                    Severity::Critical,
                    call.method.span(),
                    "Do not use .unwrap() in production code; propagate the error.",
                );
            } else if call.method == "expect" {
                self.add_violation(
                    Severity::Critical,
                    call.method.span(),
                    "Do not use .expect() in production code; use structured errors.",
                );
            }
        }
        visit::visit_expr_method_call(self, call);
    }
}

// --- Standalone Tidy Checks (No AST Required) ---

fn check_for_fixme(file: &SourceFile, violations: &mut Vec<TidyViolation>) {
    for (i, line) in file.text.lines().enumerate() {
        if line.contains("FIXME") {
            violations.push(TidyViolation {
                severity: Severity::Critical,
                path: file.path.to_string_lossy().to_string(),
                line: i + 1,
                message: "FIXME comments are not allowed in the main branch.".to_string(),
            });
        }
    }
}

fn check_for_anti_pattern_modules(paths: &[PathBuf], violations: &mut Vec<TidyViolation>) {
    for path in paths {
        let is_anti_pattern = path
            .file_name()
            .map(|name| name.to_string_lossy())
            .is_some_and(|name| ANTI_PATTERN_MODULES.contains(&name.as_ref()));
        if is_anti_pattern {
            violations.push(TidyViolation {
                severity: Severity::Critical,
                path: path.display().to_string(),
                line: 0,
                message: "Anti-pattern module name found. Use focused, descriptive module names."
                    .to_string(),
            });
        }
    }
}

fn list_rust_files() -> Vec<PathBuf> {
    let root = Path::new(env!("CARGO_MANIFEST_DIR")).join("src");
    walkdir::WalkDir::new(root)
        .into_iter()
        .filter_map(Result::ok)
        .filter(|e| e.file_type().is_file() && e.path().extension().is_some_and(|ext| ext == "rs"))
        .map(|e| e.path().to_path_buf())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn violations_in(source: &str) -> Vec<TidyViolation> {
        let path = Path::new("src/sample.rs");
        let file = SourceFile { path, text: source };
        let ast = syn::parse_file(source).unwrap();
        let mut visitor = TidyVisitor::new(&file);
        visitor.visit_file(&ast);
        visitor.violations
    }

    #[test]
    fn tidy_main() {
        let files = list_rust_files();
        assert!(!files.is_empty(), "no sources found under src/");

        let mut all_violations = Vec::new();
        let mut max_module_loc = 0;

        for path in &files {
            if path.ends_with("tidy.rs") {
                continue;
            }

            let source_text = fs::read_to_string(path).expect("Failed to read file");
            let file = SourceFile {
                path,
                text: &source_text,
            };
            max_module_loc = max_module_loc.max(source_text.lines().count());

            check_for_fixme(&file, &mut all_violations);

            match syn::parse_file(&source_text) {
                Ok(ast) => {
                    let mut visitor = TidyVisitor::new(&file);
                    visitor.visit_file(&ast);
                    all_violations.extend(visitor.violations);
                }
                Err(e) => {
                    all_violations.push(TidyViolation::new(
                        Severity::Critical,
                        path,
                        e.span(),
                        format!("Failed to parse file: {}", e),
                    ));
                }
            }
        }

        check_for_anti_pattern_modules(&files, &mut all_violations);

        if max_module_loc > MODULE_SIZE_HIGH_WATER_MARK {
            all_violations.push(TidyViolation {
                severity: Severity::Ratchet,
                path: "Project-wide".to_string(),
                line: 0,
                message: format!(
                    "A module has grown to {} lines, exceeding the high-water mark of {}.",
                    max_module_loc, MODULE_SIZE_HIGH_WATER_MARK
                ),
            });
        }

        if all_violations.is_empty() {
            return;
        }

        all_violations.sort_by_key(|v| (v.severity, v.path.clone(), v.line));
        panic!(
            "\n--- Tidy Failures ---\n{}\n",
            all_violations
                .iter()
                .map(|v| format!("[{:?}] {}:{}: {}", v.severity, v.path, v.line, v.message))
                .collect::<Vec<_>>()
                .join("\n")
        );
    }

    #[test]
    fn flags_unwrap_outside_tests_only() {
        let violations = violations_in(
            r#"
            fn parse(x: Option<u8>) -> u8 { let v = x.unwrap(); v }

            #[cfg(test)]
            mod tests {
                fn helper(x: Option<u8>) -> u8 { x.unwrap() }
            }
            "#,
        );
        assert_eq!(violations.len(), 1);
        assert!(violations[0].message.contains(".unwrap()"));
    }

    #[test]
    fn flags_undocumented_public_method() {
        let violations = violations_in(
            r#"
            /// Documented.
            pub struct Frame;
            impl Frame {
                pub fn len(&self) -> usize { 0 }
            }
            "#,
        );
        assert_eq!(violations.len(), 1);
        assert!(violations[0].message.contains("'len'"));
    }

    #[test]
    fn flags_abbreviated_parameter() {
        let violations = violations_in(
            r#"
            /// Looks up a size.
            pub fn size_of(ft: u8) -> usize { ft as usize }
            "#,
        );
        assert_eq!(violations.len(), 1);
        assert!(violations[0].message.contains("'frame_type'"));
    }

    #[test]
    fn flags_anti_pattern_module_names() {
        let mut violations = Vec::new();
        check_for_anti_pattern_modules(
            &[PathBuf::from("src/toc.rs"), PathBuf::from("src/utils.rs")],
            &mut violations,
        );
        assert_eq!(violations.len(), 1);
        assert_eq!(violations[0].path, "src/utils.rs");
    }
}
