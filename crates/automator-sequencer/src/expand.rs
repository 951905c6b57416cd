//! Action list expansion
//!
//! A command may carry a repeat suffix, `<text>x<N>`, standing for N copies
//! of `<text>`. Expansion rewrites such commands into explicit entries once,
//! before a run starts.

use automator_core::Action;

/// Largest repeat count accepted by the shorthand
pub const MAX_REPEAT: usize = 10_000;

/// A command with a repeat suffix, e.g. `"left x3"`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RepeatShorthand<'a> {
    /// Command to repeat, trailing whitespace removed
    pub text: &'a str,
    /// Number of copies; zero removes the command
    pub count: usize,
}

impl<'a> RepeatShorthand<'a> {
    /// Parse `<text>x<N>` where N is a non-empty run of ASCII digits ending
    /// the string. Anything else, including counts above [`MAX_REPEAT`], is
    /// not a shorthand.
    pub fn parse(command: &'a str) -> Option<Self> {
        let (text, count) = command.rsplit_once('x')?;
        if count.is_empty() || !count.bytes().all(|b| b.is_ascii_digit()) {
            return None;
        }
        let count = count.parse::<usize>().ok().filter(|n| *n <= MAX_REPEAT)?;

        Some(Self {
            text: text.trim_end(),
            count,
        })
    }
}

/// Expand repeat shorthands into a flat action list
///
/// Non-command actions and commands without a suffix pass through
/// unchanged, in order.
pub fn expand_actions<I>(actions: I) -> Vec<Action>
where
    I: IntoIterator<Item = Action>,
{
    let mut expanded = Vec::new();

    for action in actions {
        if let Action::Command(command) = &action {
            if let Some(repeat) = RepeatShorthand::parse(command) {
                expanded.extend(
                    std::iter::repeat_with(|| Action::command(repeat.text)).take(repeat.count),
                );
                continue;
            }
        }
        expanded.push(action);
    }

    expanded
}
