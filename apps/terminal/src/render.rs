//! Line-oriented renderers for the conversation log and input area.

use std::io::Write;

use conversation::{prompts, Affordance, InputAffordance, MessageLog};
use shared::domain::{Message, Sender};
use tracing::warn;

pub(crate) const ERASE_PREVIOUS_LINE: &str = "\x1b[1A\x1b[2K";

fn prefix(sender: Sender) -> &'static str {
    match sender {
        Sender::User => "you>",
        Sender::Bot => "bot>",
    }
}

/// Writes each message as `bot> ...` / `you> ...`; continuation lines are
/// indented under the prefix.
pub struct TerminalLog<W: Write> {
    out: W,
    placeholder_lines: Option<usize>,
}

impl<W: Write> TerminalLog<W> {
    pub fn new(out: W) -> Self {
        Self {
            out,
            placeholder_lines: None,
        }
    }

    #[cfg(test)]
    pub fn into_inner(self) -> W {
        self.out
    }

    fn write_message(&mut self, message: &Message) -> usize {
        let mut lines = 0;
        let mut rendered = String::new();
        for (index, line) in message.text.lines().enumerate() {
            let lead = if index == 0 {
                prefix(message.sender)
            } else {
                "    "
            };
            rendered.push_str(&format!("{lead} {line}\n"));
            lines += 1;
        }
        if lines == 0 {
            rendered.push_str(&format!("{}\n", prefix(message.sender)));
            lines = 1;
        }

        if let Err(err) = self
            .out
            .write_all(rendered.as_bytes())
            .and_then(|_| self.out.flush())
        {
            warn!(%err, "failed to write chat message");
        }
        lines
    }
}

impl<W: Write> MessageLog for TerminalLog<W> {
    fn append(&mut self, message: Message) {
        self.placeholder_lines = None;
        self.write_message(&message);
    }

    fn append_placeholder(&mut self, message: Message) {
        let lines = self.write_message(&message);
        self.placeholder_lines = Some(lines);
    }

    fn retract_placeholder(&mut self) {
        let Some(lines) = self.placeholder_lines.take() else {
            return;
        };
        let erase = ERASE_PREVIOUS_LINE.repeat(lines);
        if let Err(err) = self
            .out
            .write_all(erase.as_bytes())
            .and_then(|_| self.out.flush())
        {
            warn!(%err, "failed to erase placeholder");
        }
    }
}

/// Prints what the user can type next whenever the input area changes.
pub struct TerminalInput<W: Write> {
    out: W,
    mounted: Option<Affordance>,
}

impl<W: Write> TerminalInput<W> {
    pub fn new(out: W) -> Self {
        Self { out, mounted: None }
    }

    #[cfg(test)]
    pub fn into_inner(self) -> W {
        self.out
    }

    fn show(&mut self) {
        let Some(affordance) = &self.mounted else {
            return;
        };
        let text = match affordance {
            Affordance::Upload => format!(
                "[{}] ketik path berkas gambar (:keluar untuk berhenti)\n",
                prompts::UPLOAD_BUTTON
            ),
            Affordance::Text => format!(
                "[{}] (:baru untuk gambar lain)\n",
                prompts::QUESTION_HINT
            ),
            Affordance::Options(options) => {
                let mut text = String::from("Pilih opsi (:baru untuk gambar lain):\n");
                for (index, option) in options.iter().enumerate() {
                    text.push_str(&format!("  {}. {}\n", index + 1, option.title));
                }
                text
            }
        };
        if let Err(err) = self
            .out
            .write_all(text.as_bytes())
            .and_then(|_| self.out.flush())
        {
            warn!(%err, "failed to write input prompt");
        }
    }
}

impl<W: Write> InputAffordance for TerminalInput<W> {
    fn mount(&mut self, affordance: &Affordance, enabled: bool) {
        self.mounted = Some(affordance.clone());
        if enabled {
            self.show();
        }
    }

    fn set_enabled(&mut self, enabled: bool) {
        if enabled {
            self.show();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use shared::domain::HandlingOption;

    fn rendered(bytes: Vec<u8>) -> String {
        String::from_utf8(bytes).expect("utf8")
    }

    #[test]
    fn multi_line_messages_are_indented() {
        let mut log = TerminalLog::new(Vec::new());
        log.append(Message::bot("Hasil Diagnosis:\n- Penyakit: Blight"));
        log.append(Message::user("Apa obatnya?"));
        assert_eq!(
            rendered(log.into_inner()),
            "bot> Hasil Diagnosis:\n     - Penyakit: Blight\nyou> Apa obatnya?\n"
        );
    }

    #[test]
    fn retract_erases_only_the_placeholder_lines() {
        let mut log = TerminalLog::new(Vec::new());
        log.append_placeholder(Message::bot("..."));
        log.retract_placeholder();
        log.retract_placeholder();
        log.append(Message::bot("Gunakan fungisida."));
        assert_eq!(
            rendered(log.into_inner()),
            format!("bot> ...\n{ERASE_PREVIOUS_LINE}bot> Gunakan fungisida.\n")
        );
    }

    #[test]
    fn options_are_listed_with_numbers() {
        let mut input = TerminalInput::new(Vec::new());
        input.mount(
            &Affordance::Options(vec![HandlingOption::new("Cara Mengobati", "treatment")]),
            true,
        );
        input.set_enabled(false);
        assert_eq!(
            rendered(input.into_inner()),
            "Pilih opsi (:baru untuk gambar lain):\n  1. Cara Mengobati\n"
        );
    }
}
