//! Blocking line-based console transport.

use std::io::{self, BufRead, BufReader, Stdin, Stdout, Write};

use town_events::Notification;

use super::{Inbound, Transport};
use crate::error::TransportError;

/// Reads the human's lines from `R` and prints notifications to `W`.
///
/// End of input, or a line equal to the exit token (case-insensitive), ends
/// the conversation.
pub struct ConsoleTransport<R, W> {
    reader: R,
    writer: W,
    exit_token: String,
}

impl ConsoleTransport<BufReader<Stdin>, Stdout> {
    /// Console on the process's stdin/stdout.
    pub fn stdio(exit_token: impl Into<String>) -> Self {
        Self::new(BufReader::new(io::stdin()), io::stdout(), exit_token)
    }
}

impl<R: BufRead, W: Write> ConsoleTransport<R, W> {
    pub fn new(reader: R, writer: W, exit_token: impl Into<String>) -> Self {
        Self {
            reader,
            writer,
            exit_token: exit_token.into(),
        }
    }

    /// Returns the writer, e.g. to inspect captured output.
    pub fn into_writer(self) -> W {
        self.writer
    }
}

impl<R: BufRead, W: Write> Transport for ConsoleTransport<R, W> {
    fn send(&mut self, notification: &Notification) -> Result<(), TransportError> {
        if notification.expects_reply() {
            // Prompt stays on the same line as the answer
            write!(self.writer, "{}", notification.message)?;
        } else {
            writeln!(self.writer, "{}", notification.message)?;
        }
        self.writer.flush()?;
        Ok(())
    }

    fn receive(&mut self) -> Result<Inbound, TransportError> {
        let mut line = String::new();
        if self.reader.read_line(&mut line)? == 0 {
            return Ok(Inbound::End);
        }
        let line = line.trim();
        if line.eq_ignore_ascii_case(&self.exit_token) {
            return Ok(Inbound::End);
        }
        Ok(Inbound::Message(line.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;
    use town_events::Role;

    #[test]
    fn test_reads_lines_until_exit_token() {
        let input = Cursor::new("hello there\n  how are you? \nEXIT\nignored\n");
        let mut console = ConsoleTransport::new(input, Vec::new(), "exit");

        assert_eq!(console.receive().unwrap(), Inbound::Message("hello there".into()));
        assert_eq!(console.receive().unwrap(), Inbound::Message("how are you?".into()));
        assert_eq!(console.receive().unwrap(), Inbound::End);
    }

    #[test]
    fn test_end_of_input_ends_conversation() {
        let mut console = ConsoleTransport::new(Cursor::new(""), Vec::new(), "exit");
        assert_eq!(console.receive().unwrap(), Inbound::End);
    }

    #[test]
    fn test_prompts_stay_on_one_line() {
        let mut console = ConsoleTransport::new(Cursor::new(""), Vec::new(), "exit");
        console
            .send(&Notification::inform(Role::System, "The world has something else happening..."))
            .unwrap();
        console.send(&Notification::ask_human("Your move: ")).unwrap();

        let out = String::from_utf8(console.into_writer()).unwrap();
        assert_eq!(out, "The world has something else happening...\nYour move: ");
    }
}
