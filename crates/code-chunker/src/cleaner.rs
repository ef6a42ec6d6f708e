//! Source cleaning applied to file contents before they are packed into chunks.

use once_cell::sync::Lazy;
use regex::Regex;

static LINE_COMMENT: Lazy<Regex> = Lazy::new(|| Regex::new(r"//.*").expect("valid regex"));
static BLOCK_COMMENT: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?s)/\*.*?\*/").expect("valid regex"));
static PRINT_CALL: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"System\.out\.print\s*\(.*?\)\s*;").expect("valid regex"));
static PRINTLN_CALL: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"System\.out\.println\s*\(.*?\)\s*;").expect("valid regex"));
static SEPARATOR: Lazy<Regex> = Lazy::new(|| Regex::new(r"[=_\-]{5,}").expect("valid regex"));
static BLANK_LINES: Lazy<Regex> = Lazy::new(|| Regex::new(r"\n\s*\n").expect("valid regex"));

/// Strip comments, console printing, and visual noise from Java source.
///
/// Line structure is kept (blank lines are collapsed) so the result stays
/// readable inside a prompt.
pub fn clean_java_source(code: &str) -> String {
    let code = LINE_COMMENT.replace_all(code, "");
    let code = BLOCK_COMMENT.replace_all(&code, "");
    let code = PRINT_CALL.replace_all(&code, r#"sout("")"#);
    let code = PRINTLN_CALL.replace_all(&code, r#"soutl("")"#);
    let code = SEPARATOR.replace_all(&code, "");
    let code = BLANK_LINES.replace_all(&code, "\n");
    code.replace('\t', "    ").trim().to_string()
}
