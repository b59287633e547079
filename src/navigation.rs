//! Jump-to-definition for divert targets.
//!
//! Resolution is approximate. Each component of a dotted path `a.b.c` is
//! matched against the nearest `name` token to the previous match, so a
//! same-named symbol in a different scope can win.

use std::sync::LazyLock;

use regex::Regex;

pub const DIVERT_TARGET_KIND: &str = "divert.target";
pub const INCLUDE_PATH_KIND: &str = "include.filepath";
pub const INCLUDE_UNSUPPORTED_MESSAGE: &str = "Jumping to INCLUDEs not yet supported!";

static PARAMETER_LIST: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\([^)]*\)").expect("parameter regex must compile"));

/// 0-based editor position.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct Position {
    pub row: usize,
    pub column: usize,
}

impl Position {
    pub fn new(row: usize, column: usize) -> Self {
        Self { row, column }
    }
}

/// Highlighter token. `row` and `column` locate its first character.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    pub kind: String,
    pub text: String,
    pub row: usize,
    pub column: usize,
}

impl Token {
    pub fn new(kind: impl Into<String>, text: impl Into<String>, row: usize, column: usize) -> Self {
        Self {
            kind: kind.into(),
            text: text.into(),
            row,
            column,
        }
    }

    #[must_use]
    pub fn position(&self) -> Position {
        Position::new(self.row, self.column)
    }

    /// Any token class mentioning `name` (knot names, stitch names, labels).
    #[must_use]
    pub fn is_name(&self) -> bool {
        self.kind.contains("name")
    }

    fn covers(&self, position: Position) -> bool {
        self.row == position.row
            && position.column >= self.column
            && position.column < self.column + self.text.chars().count()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DivertJump {
    /// The clicked token is not navigable.
    NotADivert,
    IncludeUnsupported,
    /// Last position matched along the path.
    Target(Position),
    /// Not even the first path component was found.
    Unresolved,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PointerStyle {
    Default,
    Pointer,
}

/// Index of the token under `position`, if any.
#[must_use]
pub fn token_index_at(tokens: &[Token], position: Position) -> Option<usize> {
    tokens.iter().position(|token| token.covers(position))
}

#[must_use]
pub fn token_at(tokens: &[Token], position: Position) -> Option<&Token> {
    token_index_at(tokens, position).map(|index| &tokens[index])
}

/// Cursor shape while hovering `position`.
#[must_use]
pub fn pointer_style(tokens: &[Token], position: Position, modifier_held: bool) -> PointerStyle {
    if !modifier_held {
        return PointerStyle::Default;
    }

    match token_at(tokens, position) {
        Some(token) if token.kind == DIVERT_TARGET_KIND || token.kind == INCLUDE_PATH_KIND => {
            PointerStyle::Pointer
        }
        _ => PointerStyle::Default,
    }
}

/// Resolves the divert target under `clicked` to a definition position.
#[must_use]
pub fn resolve_divert(tokens: &[Token], clicked: Position) -> DivertJump {
    let Some(start) = token_index_at(tokens, clicked) else {
        return DivertJump::NotADivert;
    };

    let token = &tokens[start];
    if token.kind == INCLUDE_PATH_KIND {
        return DivertJump::IncludeUnsupported;
    }
    if token.kind != DIVERT_TARGET_KIND {
        return DivertJump::NotADivert;
    }

    let mut current = start;
    let mut found_any = false;
    for component in token.text.split('.') {
        let name = component_name(component);
        let Some(next) = nearest_name(tokens, current, &name) else {
            break;
        };
        current = next;
        found_any = true;
    }

    if found_any {
        DivertJump::Target(tokens[current].position())
    } else {
        DivertJump::Unresolved
    }
}

/// Strips parameter lists, so `knot(x, y)` becomes `knot`.
fn component_name(component: &str) -> String {
    PARAMETER_LIST.replace_all(component, "").trim().to_string()
}

/// Closest `name` token with matching text, searching both directions from
/// `from` inclusive. Forward wins only when strictly closer by row.
fn nearest_name(tokens: &[Token], from: usize, name: &str) -> Option<usize> {
    let matches = |token: &Token| token.is_name() && token.text == name;

    let forward = (from..tokens.len()).find(|&index| matches(&tokens[index]));
    let backward = (0..=from).rev().find(|&index| matches(&tokens[index]));

    let origin_row = tokens[from].row;
    match (forward, backward) {
        (Some(forward), Some(backward)) => {
            if tokens[forward].row.abs_diff(origin_row) < tokens[backward].row.abs_diff(origin_row)
            {
                Some(forward)
            } else {
                Some(backward)
            }
        }
        (forward, backward) => forward.or(backward),
    }
}
