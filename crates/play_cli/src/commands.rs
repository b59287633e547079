/// One line of player input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PlayerInput {
    Choose(usize),
    Rewind,
    Back,
    NextIssue,
    Line(usize),
    Issues,
    Help,
    Quit,
    Unknown(String),
}

pub const HELP_TEXT: &str =
    "Enter a choice number, or one of :rewind, :back, :next, :issues, :line N, :help, :quit";

/// Parses a line typed by the player. Blank lines yield `None`.
pub fn parse_input(input: &str) -> Option<PlayerInput> {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        return None;
    }

    if let Ok(choice_number) = trimmed.parse::<usize>() {
        return Some(PlayerInput::Choose(choice_number));
    }

    if !trimmed.starts_with(':') {
        return Some(PlayerInput::Unknown(trimmed.to_string()));
    }

    let mut parts = trimmed.split_whitespace();
    let command = parts.next().unwrap_or(trimmed);
    let argument = parts.next();

    let parsed = match (command, argument) {
        (":rewind", None) => PlayerInput::Rewind,
        (":back", None) => PlayerInput::Back,
        (":next", None) => PlayerInput::NextIssue,
        (":issues", None) => PlayerInput::Issues,
        (":help", None) => PlayerInput::Help,
        (":quit" | ":q", None) => PlayerInput::Quit,
        (":line", Some(line)) => match line.parse::<usize>() {
            Ok(line) if line > 0 => PlayerInput::Line(line),
            _ => PlayerInput::Unknown(trimmed.to_string()),
        },
        _ => PlayerInput::Unknown(trimmed.to_string()),
    };

    Some(parsed)
}
