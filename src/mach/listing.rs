use crate::error;
use crate::lang::{Error, Line, LineNumber, MAX_LINE_LEN, MAX_LINE_NUMBER};
use std::collections::{btree_map::Values, BTreeMap};
use std::ops::Bound::{Excluded, Unbounded};
use std::sync::Arc;

/// ## Program store
///
/// Lines are kept sorted by number in a shared map; cloning a listing is
/// cheap and edits copy only when a clone is still alive.
#[derive(Debug, Clone, Default)]
pub struct Listing {
    source: Arc<BTreeMap<LineNumber, Line>>,
}

impl Listing {
    pub fn clear(&mut self) {
        self.source = Arc::default();
    }

    pub fn is_empty(&self) -> bool {
        self.source.is_empty()
    }

    pub fn len(&self) -> usize {
        self.source.len()
    }

    pub fn insert(&mut self, line: Line) -> Option<Line> {
        Arc::make_mut(&mut self.source).insert(line.number(), line)
    }

    pub fn remove(&mut self, ln: LineNumber) -> Option<Line> {
        if !self.source.contains_key(&ln) {
            return None;
        }
        Arc::make_mut(&mut self.source).remove(&ln)
    }

    /// Stores `text` as line `ln`. Blank text deletes the line.
    pub fn set_line(&mut self, ln: LineNumber, text: &str) -> Result<(), Error> {
        if ln == 0 || ln > MAX_LINE_NUMBER {
            return Err(error!(SyntaxError; "INVALID LINE NUMBER"));
        }
        if text.len() > MAX_LINE_LEN {
            return Err(error!(LineBufferOverflow, ln));
        }
        if text.trim().is_empty() {
            self.remove(ln);
        } else {
            self.insert(Line::new(ln, text));
        }
        Ok(())
    }

    pub fn get(&self, ln: LineNumber) -> Option<&Line> {
        self.source.get(&ln)
    }

    pub fn contains(&self, ln: LineNumber) -> bool {
        self.source.contains_key(&ln)
    }

    pub fn first(&self) -> Option<LineNumber> {
        self.source.keys().next().copied()
    }

    /// Smallest stored line number strictly greater than `ln`.
    pub fn next_line_after(&self, ln: LineNumber) -> Option<LineNumber> {
        self.source
            .range((Excluded(ln), Unbounded))
            .next()
            .map(|(ln, _)| *ln)
    }

    pub fn lines(&self) -> Values<'_, LineNumber, Line> {
        self.source.values()
    }

    /// Lines strictly after `ln`, in order.
    pub fn lines_after(&self, ln: LineNumber) -> impl Iterator<Item = &Line> {
        self.source.range((Excluded(ln), Unbounded)).map(|(_, line)| line)
    }

    /// Loads program text, one numbered line per text line. A bare
    /// number deletes that line.
    pub fn load_str(&mut self, text: &str) -> Result<(), Error> {
        for line in text.lines() {
            if line.trim().is_empty() {
                continue;
            }
            let (ln, rest) = Line::split_number(line)?;
            self.set_line(ln, rest)?;
        }
        Ok(())
    }
}

impl std::fmt::Display for Listing {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        for line in self.lines() {
            writeln!(f, "{}", line)?;
        }
        Ok(())
    }
}
