//! Maps a typed line onto a conversation event for whatever is mounted.

use std::path::PathBuf;

use conversation::{Affordance, MountedInput, UserEvent};

pub const QUIT: &str = ":keluar";
pub const RESTART: &str = ":baru";

#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    Event(UserEvent),
    Quit,
    Ignore,
    Invalid(String),
}

pub fn parse_line(mounted: &MountedInput, line: &str) -> Command {
    let line = line.trim();
    if line.is_empty() {
        return Command::Ignore;
    }
    if line.eq_ignore_ascii_case(QUIT) || line.eq_ignore_ascii_case(":quit") {
        return Command::Quit;
    }
    if line.eq_ignore_ascii_case(RESTART) {
        return Command::Event(UserEvent::Restart);
    }
    if !mounted.enabled {
        return Command::Invalid(conversation::prompts::BUSY_HINT.to_string());
    }

    match &mounted.affordance {
        Affordance::Upload => Command::Event(UserEvent::ImageSelected {
            path: PathBuf::from(strip_quotes(line)),
        }),
        Affordance::Text => Command::Event(UserEvent::QuestionSubmitted(line.to_string())),
        Affordance::Options(options) => {
            let chosen = line
                .parse::<usize>()
                .ok()
                .and_then(|n| n.checked_sub(1))
                .and_then(|index| options.get(index))
                .or_else(|| {
                    options
                        .iter()
                        .find(|option| option.title.eq_ignore_ascii_case(line))
                });
            match chosen {
                Some(option) => Command::Event(UserEvent::OptionChosen {
                    action: option.action.clone(),
                }),
                None => Command::Invalid(format!("Pilih nomor 1-{}.", options.len())),
            }
        }
    }
}

/// Terminals wrap dropped file paths in quotes.
fn strip_quotes(line: &str) -> &str {
    for quote in ['"', '\''] {
        if let Some(inner) = line
            .strip_prefix(quote)
            .and_then(|rest| rest.strip_suffix(quote))
        {
            return inner;
        }
    }
    line
}
