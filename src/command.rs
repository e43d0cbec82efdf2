/// A parsed command ready to run on the playback thread.
///
/// Out of scope per the spec: this crate does not implement a real command
/// language. `ParsedCommand` is the minimal stand-in the dispatch/reply path
/// needs to exist and be testable.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedCommand {
    pub argv: Vec<String>,
}

/// External collaborator: turns host-supplied argv or a command line into a
/// `ParsedCommand`, or reports that parsing failed.
pub trait CommandParser: Send + Sync {
    /// Parses an argv-style command. Returns `None` on a syntax error.
    fn parse_argv(&self, argv: &[String]) -> Option<ParsedCommand>;

    /// Parses a single command line (whitespace-delimited, no quoting
    /// support - real quoting/escaping lives in the external parser this
    /// trait stands in for).
    fn parse_line(&self, line: &str) -> Option<ParsedCommand>;
}

/// Minimal built-in parser: rejects empty argv/lines, otherwise accepts
/// anything. Good enough to drive the dispatch/reply machinery in tests and
/// demos without pulling in a real command grammar.
#[derive(Debug, Default, Clone, Copy)]
pub struct SimpleCommandParser;

impl CommandParser for SimpleCommandParser {
    fn parse_argv(&self, argv: &[String]) -> Option<ParsedCommand> {
        if argv.is_empty() || argv[0].is_empty() {
            return None;
        }
        Some(ParsedCommand {
            argv: argv.to_vec(),
        })
    }

    fn parse_line(&self, line: &str) -> Option<ParsedCommand> {
        let argv: Vec<String> = line.split_whitespace().map(str::to_owned).collect();
        self.parse_argv(&argv)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_empty_input() {
        let p = SimpleCommandParser;
        assert!(p.parse_argv(&[]).is_none());
        assert!(p.parse_line("   ").is_none());
    }

    #[test]
    fn accepts_well_formed_command() {
        let p = SimpleCommandParser;
        let cmd = p.parse_line("loadfile test.mkv").unwrap();
        assert_eq!(cmd.argv, vec!["loadfile", "test.mkv"]);
    }
}
