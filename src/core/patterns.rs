//! Extraction rules for translatable strings.
//!
//! Rules are grouped by the syntactic context they recognise. Function-call
//! rules run against the raw file content; annotated property and variable
//! rules run against a normalized copy (see [`normalize_for_annotations`]) so
//! an annotation on one line can match a declaration on the next.

use std::sync::LazyLock;

use regex::Regex;

/// Syntactic context a [`PatternRule`] recognises.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PatternKind {
    /// `__('...')`, `trans('...')`, `@lang('...')`.
    FunctionCall,
    /// Class property carrying `/** @trans */` or `#[Trans]`.
    AnnotatedProperty,
    /// Local variable carrying `/** @trans */`.
    AnnotatedVariable,
}

impl PatternKind {
    pub fn as_str(self) -> &'static str {
        match self {
            PatternKind::FunctionCall => "function-call",
            PatternKind::AnnotatedProperty => "annotated-property",
            PatternKind::AnnotatedVariable => "annotated-variable",
        }
    }

    /// Whether the rule matches against normalized rather than raw content.
    pub fn uses_normalized_content(self) -> bool {
        !matches!(self, PatternKind::FunctionCall)
    }
}

/// A named category owning an ordered list of extraction patterns.
///
/// Capture group 1 of every pattern yields the raw literal text, with escape
/// sequences still in place.
#[derive(Debug)]
pub struct PatternRule {
    kind: PatternKind,
    patterns: Vec<Regex>,
}

impl PatternRule {
    pub fn new(kind: PatternKind, patterns: Vec<Regex>) -> Self {
        Self { kind, patterns }
    }

    pub fn kind(&self) -> PatternKind {
        self.kind
    }

    pub fn patterns(&self) -> &[Regex] {
        &self.patterns
    }

    /// Collect every raw capture of this rule in `content`, unescaped.
    pub fn captures<'a>(&'a self, content: &'a str) -> impl Iterator<Item = String> + 'a {
        self.patterns.iter().flat_map(move |re| {
            re.captures_iter(content)
                .filter_map(|caps| caps.get(1))
                .map(|m| unescape(m.as_str()))
        })
    }
}

/// The full set of rules, built once and shared across every file scan.
#[derive(Debug)]
pub struct PatternSet {
    rules: Vec<PatternRule>,
}

impl PatternSet {
    pub fn new(rules: Vec<PatternRule>) -> Self {
        Self { rules }
    }

    pub fn rules(&self) -> &[PatternRule] {
        &self.rules
    }

    /// Run every rule against `content`, normalizing once for the rules that
    /// need it.
    pub fn extract(&self, content: &str) -> Vec<(PatternKind, String)> {
        let mut normalized: Option<String> = None;
        let mut found = Vec::new();

        for rule in &self.rules {
            let haystack = if rule.kind.uses_normalized_content() {
                normalized.get_or_insert_with(|| normalize_for_annotations(content))
            } else {
                content
            };
            found.extend(rule.captures(haystack).map(|s| (rule.kind, s)));
        }

        found
    }
}

impl Default for PatternSet {
    fn default() -> Self {
        Self::new(vec![
            function_call_rule(),
            annotated_property_rule(),
            annotated_variable_rule(),
        ])
    }
}

fn compile(patterns: &[&str]) -> Vec<Regex> {
    patterns
        .iter()
        .map(|p| Regex::new(p).unwrap_or_else(|e| panic!("built-in pattern {p:?} is invalid: {e}")))
        .collect()
}

fn function_call_rule() -> PatternRule {
    // Quoted literal allowing escaped characters, followed by `,` or `)`.
    PatternRule::new(
        PatternKind::FunctionCall,
        compile(&[
            r#"(?s)__\(\s*'((?:[^'\\]|\\.)*)'\s*[,)]"#,
            r#"(?s)__\(\s*"((?:[^"\\]|\\.)*)"\s*[,)]"#,
            r#"(?s)trans\(\s*'((?:[^'\\]|\\.)*)'\s*[,)]"#,
            r#"(?s)trans\(\s*"((?:[^"\\]|\\.)*)"\s*[,)]"#,
            r#"(?s)@lang\(\s*'((?:[^'\\]|\\.)*)'\s*[,)]"#,
            r#"(?s)@lang\(\s*"((?:[^"\\]|\\.)*)"\s*[,)]"#,
        ]),
    )
}

const VISIBILITY: &str = r"(?:public|protected|private)\s+(?:[a-zA-Z_|?\\]+\s+)?\$\w+\s*=\s*";

/// Single- and double-quoted literals with escapes, capturing the body.
const LITERALS: [&str; 2] = [r#"'((?:[^'\\]|\\.)*)'"#, r#""((?:[^"\\]|\\.)*)""#];

/// Expand a `{lit}` template into one pattern per quote style.
fn quoted(template: &str) -> Vec<String> {
    LITERALS
        .iter()
        .map(|lit| format!("(?s){}", template.replace("{lit}", lit)))
        .collect()
}

fn annotated_property_rule() -> PatternRule {
    let templates = [
        // protected string $title = 'Text'; /** @trans */
        format!(r"{VISIBILITY}{{lit}}[^;]*?;?\s*/\*\*\s*@trans\s*\*/"),
        // /** @trans */ protected string $title = 'Text';
        format!(r"/\*\*\s*@trans\s*\*/[^;{{}}]*?{VISIBILITY}{{lit}}"),
        // #[Trans], #[Trans()], #[Some\Namespace\Trans]
        format!(r"#\[\\?(?:\w+\\)*Trans(?:\(\))?\][^;{{}}]*?{VISIBILITY}{{lit}}"),
    ];
    let patterns: Vec<String> = templates.iter().flat_map(|t| quoted(t)).collect();
    let patterns: Vec<&str> = patterns.iter().map(String::as_str).collect();

    PatternRule::new(PatternKind::AnnotatedProperty, compile(&patterns))
}

fn annotated_variable_rule() -> PatternRule {
    let templates = [
        // $title = 'Text' /** @trans */;
        r"\$\w+\s*=\s*{lit}[^;]*?;?\s*/\*\*\s*@trans\s*\*/",
        // $title = /** @trans */ 'Text';
        r"\$\w+\s*=\s*/\*\*\s*@trans\s*\*/\s*{lit}",
    ];
    let patterns: Vec<String> = templates.iter().flat_map(|t| quoted(t)).collect();
    let patterns: Vec<&str> = patterns.iter().map(String::as_str).collect();

    PatternRule::new(PatternKind::AnnotatedVariable, compile(&patterns))
}

static LINE_COMMENT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?m)//.*$").expect("valid regex"));
static LINE_BREAK: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\s*\n\s*").expect("valid regex"));
static ATTRIBUTE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"#\[([^\]]+)\]\s*").expect("valid regex"));
static DOCBLOCK: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"/\*\*([^*]+)\*/\s*").expect("valid regex"));

/// Strip `//` comments and collapse line breaks to single spaces.
///
/// Multi-line literals are flattened as a side effect, so text matched by the
/// annotation rules loses embedded newlines.
pub fn normalize_for_annotations(content: &str) -> String {
    let content = LINE_COMMENT.replace_all(content, "");
    let content = LINE_BREAK.replace_all(&content, " ");
    let content = ATTRIBUTE.replace_all(&content, "#[$1] ");
    DOCBLOCK.replace_all(&content, "/**$1*/ ").into_owned()
}

/// Resolve `\'`, `\"` and `\\`; any other escape is left untouched.
pub fn unescape(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    let mut chars = raw.chars();

    while let Some(c) = chars.next() {
        if c != '\\' {
            out.push(c);
            continue;
        }
        match chars.next() {
            Some(next @ ('\'' | '"' | '\\')) => out.push(next),
            Some(next) => {
                out.push('\\');
                out.push(next);
            }
            None => out.push('\\'),
        }
    }

    out
}
