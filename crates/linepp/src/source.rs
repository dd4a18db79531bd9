//! Line sources feeding the preprocessor
//!
//! The preprocessor never performs I/O itself; it pulls raw lines through the
//! [`LineSource`] contract. Adapters are provided for borrowed text, buffered
//! readers and plain iterators of strings.

use std::io::{self, BufRead};

/// Supplies raw lines, without their terminators, until end of input
pub trait LineSource {
    /// Fetch the next line, or `None` at end of input
    fn next_line(&mut self) -> io::Result<Option<String>>;
}

impl<T: LineSource + ?Sized> LineSource for &mut T {
    fn next_line(&mut self) -> io::Result<Option<String>> {
        (**self).next_line()
    }
}

impl<T: LineSource + ?Sized> LineSource for Box<T> {
    fn next_line(&mut self) -> io::Result<Option<String>> {
        (**self).next_line()
    }
}

/// Lines of an in-memory string (`\n` and `\r\n` terminators)
pub struct StrSource<'a> {
    lines: std::str::Lines<'a>,
}

impl<'a> StrSource<'a> {
    pub fn new(text: &'a str) -> Self {
        Self { lines: text.lines() }
    }
}

impl LineSource for StrSource<'_> {
    fn next_line(&mut self) -> io::Result<Option<String>> {
        Ok(self.lines.next().map(str::to_string))
    }
}

/// Lines pulled lazily from a buffered reader
pub struct ReaderSource<R> {
    reader: R,
    buffer: String,
}

impl<R: BufRead> ReaderSource<R> {
    pub fn new(reader: R) -> Self {
        Self {
            reader,
            buffer: String::new(),
        }
    }
}

impl<R: BufRead> LineSource for ReaderSource<R> {
    fn next_line(&mut self) -> io::Result<Option<String>> {
        self.buffer.clear();
        if self.reader.read_line(&mut self.buffer)? == 0 {
            return Ok(None);
        }

        if self.buffer.ends_with('\n') {
            self.buffer.pop();
            if self.buffer.ends_with('\r') {
                self.buffer.pop();
            }
        }

        Ok(Some(self.buffer.clone()))
    }
}

/// Adapts any iterator of owned lines
pub struct IterSource<I> {
    lines: I,
}

impl<I: Iterator<Item = String>> IterSource<I> {
    pub fn new(lines: impl IntoIterator<IntoIter = I>) -> Self {
        Self {
            lines: lines.into_iter(),
        }
    }
}

impl<I: Iterator<Item = String>> LineSource for IterSource<I> {
    fn next_line(&mut self) -> io::Result<Option<String>> {
        Ok(self.lines.next())
    }
}
