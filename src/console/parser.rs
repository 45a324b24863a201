//! Command line parser
//!
//! Arguments are separated by any number of blanks (space or tab).

/// Blank as the shell understands it.
#[inline]
pub fn is_blank(c: u8) -> bool {
    c == b' ' || c == b'\t'
}

/// Parsed command: first token plus the unsplit remainder.
#[derive(Debug, Clone, Copy)]
pub struct ParsedCommand<'a> {
    /// The command name (first token)
    pub command: &'a str,
    rest: &'a str,
}

impl<'a> ParsedCommand<'a> {
    /// Create empty command
    pub const fn empty() -> Self {
        Self {
            command: "",
            rest: "",
        }
    }

    /// Iterate over the arguments.
    pub fn args(&self) -> Args<'a> {
        Args { rest: self.rest }
    }

    /// Get argument by index (0-based)
    pub fn arg(&self, idx: usize) -> Option<&'a str> {
        self.args().nth(idx)
    }
}

/// Blank-separated token iterator.
#[derive(Debug, Clone)]
pub struct Args<'a> {
    rest: &'a str,
}

impl<'a> Args<'a> {
    /// Text not yet consumed (leading blanks stripped).
    pub fn remainder(&self) -> &'a str {
        self.rest.trim_start_matches(|c: char| c == ' ' || c == '\t')
    }
}

impl<'a> Iterator for Args<'a> {
    type Item = &'a str;

    fn next(&mut self) -> Option<&'a str> {
        let s = self.remainder();
        if s.is_empty() {
            self.rest = s;
            return None;
        }
        let end = s.bytes().position(is_blank).unwrap_or(s.len());
        self.rest = &s[end..];
        Some(&s[..end])
    }
}

/// Parse a command line into command and arguments
pub fn parse_line(line: &str) -> ParsedCommand<'_> {
    let mut args = Args { rest: line };
    let command = args.next().unwrap_or("");
    ParsedCommand {
        command,
        rest: args.rest,
    }
}

/// Hex number, the whole token must be digits (no `0x`).
pub fn parse_hex_u32(token: &str) -> Option<u32> {
    if token.is_empty() || token.len() > 8 || !token.bytes().all(|c| c.is_ascii_hexdigit()) {
        return None;
    }
    u32::from_str_radix(token, 16).ok()
}

/// Decimal number, or hex with a `0x` prefix.
pub fn parse_int(token: &str) -> Option<u32> {
    match token.strip_prefix("0x").or_else(|| token.strip_prefix("0X")) {
        Some(hex) => parse_hex_u32(hex),
        None if !token.is_empty() && token.bytes().all(|c| c.is_ascii_digit()) => token.parse().ok(),
        None => None,
    }
}

/// Two hex digits to a byte.
pub fn parse_hex_byte(pair: &[u8]) -> Option<u8> {
    match pair {
        [hi, lo] => Some((hex_digit(*hi)? << 4) | hex_digit(*lo)?),
        _ => None,
    }
}

fn hex_digit(c: u8) -> Option<u8> {
    (c as char).to_digit(16).map(|d| d as u8)
}
