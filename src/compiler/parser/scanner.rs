use std::cell::Cell;

use crate::compiler::ast::{Duration, TimeUnit};
use crate::compiler::source::{Offset, Span};
use crate::diagnostics::TracingConfig;

/// The result of a grammar rule which matched: the position just past the
/// matched text and the value built from it.
#[derive(Debug, PartialEq)]
pub(super) struct Parsed<T> {
    pub pos: usize,
    pub value: T,
}

/// Read-only view over the text of one sequencer file.  Rules are plain
/// functions taking the scanner and a start position; they either return a
/// [`Parsed`] value or `None` without side effects, which lets the caller try
/// the next alternative at the same position.
pub(super) struct Scanner<'a> {
    src: &'a str,
    text: &'a [u8],
    base: Offset,
    tracing: TracingConfig,

    /// The furthest position any rule managed to advance to.  When the
    /// document fails to parse, this points into the offending line.
    furthest: Cell<usize>,
}

impl<'a> Scanner<'a> {
    pub fn new(src: &'a str, base: Offset, tracing: TracingConfig) -> Scanner<'a> {
        Scanner {
            src,
            text: src.as_bytes(),
            base,
            tracing,
            furthest: Cell::new(0),
        }
    }

    pub fn len(&self) -> usize {
        self.text.len()
    }

    pub fn at_end(&self, pos: usize) -> bool {
        pos >= self.text.len()
    }

    pub fn byte(&self, pos: usize) -> Option<u8> {
        self.text.get(pos).copied()
    }

    pub fn slice(&self, low: usize, high: usize) -> &'a str {
        &self.src[low..high]
    }

    pub fn branch<'s>(&'s self, pos: usize) -> Branch<'s, 'a> {
        Branch {
            scanner: self,
            start: pos,
            index: pos,
        }
    }

    /// Converts a local range of this file into a span in the global offset space.
    pub fn span(&self, low: usize, high: usize) -> Span {
        Span::new(self.base.add(low), self.base.add(high))
    }

    pub fn furthest(&self) -> usize {
        self.furthest.get()
    }

    fn mark(&self, pos: usize) {
        if pos > self.furthest.get() {
            self.furthest.set(pos)
        }
    }

    /// Returns the start of the line containing `pos` and the position of its
    /// line break (or the end of the text).
    pub fn line_bounds(&self, pos: usize) -> (usize, usize) {
        let pos = pos.min(self.text.len());
        let start = self.text[..pos]
            .iter()
            .rposition(|&c| c == b'\n' || c == b'\r')
            .map(|nl| nl + 1)
            .unwrap_or(0);
        let end = self.text[pos..]
            .iter()
            .position(|&c| c == b'\n' || c == b'\r')
            .map(|nl| pos + nl)
            .unwrap_or(self.text.len());
        (start, end)
    }

    /// 1-based line number of `pos`
    pub fn line_of(&self, pos: usize) -> usize {
        let pos = pos.min(self.text.len());
        self.text[..pos].iter().filter(|&&c| c == b'\n').count() + 1
    }

    pub fn trace(&self, rule: &str, pos: usize) {
        if self.tracing == TracingConfig::Off {
            return;
        }

        let line = self.line_of(pos);
        if self.tracing.includes(line) {
            println!("{} <- L{}", rule, line)
        }
    }

    /// EMPTY_LINE ::= SPACE* COMMENT? NEWLINE
    ///
    /// A blank last line without a line break also counts, as long as it is
    /// not empty.
    pub fn empty_line(&self, pos: usize) -> Option<usize> {
        let mut branch = self.branch(pos);
        branch.zmsp();
        branch.comment();
        if branch.newline() || (branch.at_end() && branch.index > pos) {
            Some(branch.index)
        } else {
            None
        }
    }

    /// Skips any number of empty lines.  Always succeeds.
    pub fn empty_lines(&self, pos: usize) -> usize {
        let mut pos = pos;
        while let Some(next) = self.empty_line(pos) {
            pos = next;
        }
        pos
    }
}

/// A cursor which advances over the text of a [`Scanner`] without
/// committing.  When a rule has matched, `merge` turns the branch into a
/// [`Parsed`] value carrying the new position; dropping the branch abandons
/// whatever was consumed.
pub(super) struct Branch<'s, 'a> {
    scanner: &'s Scanner<'a>,
    start: usize,
    index: usize,
}

impl<'s, 'a> Branch<'s, 'a> {
    /// Accepts this branch as the match of the current rule.
    pub fn merge<T>(self, value: T) -> Option<Parsed<T>> {
        Some(Parsed {
            pos: self.index,
            value,
        })
    }

    /// The span of text consumed by this branch so far.
    pub fn span(&self) -> Span {
        self.scanner.span(self.start, self.index)
    }

    /// Span from `low` up to the cursor.
    pub fn span_from(&self, low: usize) -> Span {
        self.scanner.span(low, self.index)
    }

    pub fn pos(&self) -> usize {
        self.index
    }

    pub fn at_end(&self) -> bool {
        self.scanner.at_end(self.index)
    }

    /// Returns the byte pointed at by the cursor.
    pub fn peek(&self) -> Option<u8> {
        self.scanner.byte(self.index)
    }

    /// Advances the cursor one byte and returns the byte that was pointed to
    /// before the advance.
    pub fn next(&mut self) -> Option<u8> {
        let c = self.peek()?;
        self.index += 1;
        self.scanner.mark(self.index);
        Some(c)
    }

    /// Advances the cursor one byte if it matches `t`.
    pub fn next_if(&mut self, t: u8) -> bool {
        match self.peek() {
            Some(c) if c == t => self.next().is_some(),
            _ => false,
        }
    }

    /// Advances past `t` if the remaining text starts with it.  Otherwise the
    /// cursor does not move.
    pub fn next_if_word(&mut self, t: &str) -> bool {
        let end = self.index + t.len();
        if end <= self.scanner.len() && &self.scanner.text[self.index..end] == t.as_bytes() {
            self.index = end;
            self.scanner.mark(end);
            true
        } else {
            false
        }
    }

    fn next_while<F: Fn(u8) -> bool>(&mut self, test: F) -> usize {
        let start = self.index;
        while let Some(c) = self.peek() {
            if !test(c) {
                break;
            }
            self.next();
        }
        self.index - start
    }

    /// Runs `f` and rewinds the cursor if it does not match.
    pub fn attempt<T, F: FnOnce(&mut Self) -> Option<T>>(&mut self, f: F) -> Option<T> {
        let index = self.index;
        let r = f(self);
        if r.is_none() {
            self.index = index;
        }
        r
    }

    /// Runs a sub-rule at the cursor and advances past it if it matches.
    pub fn rule<T, R: Fn(&Scanner<'a>, usize) -> Option<Parsed<T>>>(&mut self, r: R) -> Option<T> {
        let parsed = r(self.scanner, self.index)?;
        self.index = parsed.pos;
        Some(parsed.value)
    }

    /// ZMSP ::= [ \t]*
    pub fn zmsp(&mut self) {
        self.next_while(|c| c == b' ' || c == b'\t');
    }

    /// OMSP ::= [ \t]+
    pub fn omsp(&mut self) -> bool {
        self.next_while(|c| c == b' ' || c == b'\t') > 0
    }

    /// NEWLINE ::= \n | \r\n | \r
    pub fn newline(&mut self) -> bool {
        self.next_if_word("\r\n") || self.next_if(b'\n') || self.next_if(b'\r')
    }

    /// COMMENT ::= '#' .* up to the line break.  Returns the trimmed text.
    pub fn comment(&mut self) -> Option<String> {
        if !self.next_if(b'#') {
            return None;
        }
        let start = self.index;
        self.next_while(|c| c != b'\n' && c != b'\r');
        Some(self.scanner.slice(start, self.index).trim().into())
    }

    /// SPACE* COMMENT? (NEWLINE | EOF)
    ///
    /// Closes a definition line and returns its comment, which is empty when
    /// the line has none.
    pub fn line_end(&mut self) -> Option<String> {
        self.attempt(|b| {
            b.zmsp();
            let comment = b.comment().unwrap_or_default();
            if b.newline() || b.at_end() {
                Some(comment)
            } else {
                None
            }
        })
    }

    /// Skips any number of empty lines.
    pub fn empty_lines(&mut self) {
        self.index = self.scanner.empty_lines(self.index);
    }

    /// Consumes one empty line if there is one.
    pub fn empty_line(&mut self) -> bool {
        match self.scanner.empty_line(self.index) {
            Some(next) => {
                self.index = next;
                true
            }
            None => false,
        }
    }

    /// NAME ::= [A-Za-z][0-9A-Za-z_]*
    pub fn name(&mut self) -> Option<String> {
        match self.peek() {
            Some(c) if c.is_ascii_alphabetic() => (),
            _ => return None,
        }
        let start = self.index;
        self.next_while(|c| c.is_ascii_alphanumeric() || c == b'_');
        Some(self.scanner.slice(start, self.index).into())
    }

    /// INTEGER ::= [0-9]+
    pub fn integer(&mut self) -> Option<u64> {
        self.attempt(|b| {
            let start = b.index;
            if b.next_while(|c| c.is_ascii_digit()) == 0 {
                return None;
            }
            b.scanner.slice(start, b.index).parse::<u64>().ok()
        })
    }

    /// ADDRESS ::= (0x)?[0-9a-fA-F]+, always read as hexadecimal
    pub fn address(&mut self) -> Option<u64> {
        self.attempt(|b| {
            if !b.next_if_word("0x") {
                b.next_if_word("0X");
            }
            let start = b.index;
            if b.next_while(|c| c.is_ascii_hexdigit()) == 0 {
                return None;
            }
            u64::from_str_radix(b.scanner.slice(start, b.index), 16).ok()
        })
    }

    /// BIT ::= '0' | '1'
    pub fn bit(&mut self) -> Option<bool> {
        if self.next_if(b'0') {
            Some(false)
        } else if self.next_if(b'1') {
            Some(true)
        } else {
            None
        }
    }

    /// DURATION ::= INTEGER SPACE* ('ns' | 'us' | 'ms' | 's')
    pub fn duration(&mut self) -> Option<Duration> {
        self.attempt(|b| {
            let magnitude = b.integer()?;
            b.zmsp();
            let unit = TimeUnit::ALL
                .iter()
                .find(|u| b.next_if_word(u.keyword()))
                .copied()?;
            Some(Duration::new(magnitude, unit))
        })
    }

    /// FILE ::= [0-9A-Za-z_\-./]+
    pub fn file_name(&mut self) -> Option<String> {
        let start = self.index;
        let n = self.next_while(|c| c.is_ascii_alphanumeric() || b"_-./".contains(&c));
        if n == 0 {
            None
        } else {
            Some(self.scanner.slice(start, self.index).into())
        }
    }

    /// SPACE* NAME SPACE* ':' as found at the start of function and routine
    /// blocks and of definition lines.
    pub fn label(&mut self) -> Option<String> {
        self.attempt(|b| {
            b.zmsp();
            let name = b.name()?;
            b.zmsp();
            if b.next_if(b':') {
                Some(name)
            } else {
                None
            }
        })
    }

    /// SPACE* KEYWORD SPACE* ':' for the `clocks:`, `slices:` and `constants:`
    /// lines of a function block.
    pub fn keyword_label(&mut self, keyword: &str) -> bool {
        self.attempt(|b| {
            b.zmsp();
            if !b.next_if_word(keyword) {
                return None;
            }
            b.zmsp();
            if b.next_if(b':') {
                Some(())
            } else {
                None
            }
        })
        .is_some()
    }
}
