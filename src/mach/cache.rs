use super::{Listing, Program};
use crate::lang::Error;
use crc::{crc64, Hasher64};
use log::debug;
use std::sync::Arc;

#[derive(Debug)]
struct Entry {
    digest: u64,
    program: Arc<Program>,
}

/// ## Compilation cache
///
/// Remembers the last program compiled and the digest of the listing it
/// came from. Any edit marks the entry stale so the next request
/// recompiles once. A failed compile leaves the old entry in place.
#[derive(Debug, Default)]
pub struct Cache {
    entry: Option<Entry>,
    stale: bool,
    compilations: usize,
}

impl Cache {
    pub fn new() -> Cache {
        Cache::default()
    }

    /// CRC-64 over every line number and its text, in line order.
    pub fn digest(listing: &Listing) -> u64 {
        let mut digest = crc64::Digest::new(crc64::ECMA);
        for line in listing.lines() {
            digest.write(&line.number().to_le_bytes());
            digest.write(line.source().as_bytes());
            digest.write(b"\n");
        }
        digest.sum64()
    }

    pub fn ensure_compiled(&mut self, listing: &Listing) -> Result<Arc<Program>, Error> {
        let digest = Cache::digest(listing);
        if let Some(entry) = &self.entry {
            if !self.stale && entry.digest == digest {
                debug!("compile cache hit {:016x}", digest);
                return Ok(Arc::clone(&entry.program));
            }
        }
        debug!("compiling {} lines, digest {:016x}", listing.len(), digest);
        let program = Arc::new(Program::compile(listing)?);
        debug!(
            "compiled {} instructions, {} constants",
            program.len(),
            program.constants().len()
        );
        self.compilations += 1;
        self.entry = Some(Entry {
            digest,
            program: Arc::clone(&program),
        });
        self.stale = false;
        Ok(program)
    }

    pub fn invalidate(&mut self) {
        self.stale = true;
    }

    pub fn clear(&mut self) {
        self.entry = None;
        self.stale = false;
    }

    /// The last good compile, even when an edit has made it stale.
    pub fn program(&self) -> Option<&Arc<Program>> {
        self.entry.as_ref().map(|entry| &entry.program)
    }

    pub fn is_cached(&self) -> bool {
        self.entry.is_some()
    }

    pub fn is_stale(&self) -> bool {
        self.stale
    }

    /// Number of successful compiles so far.
    pub fn compilations(&self) -> usize {
        self.compilations
    }
}
