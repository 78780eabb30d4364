//! The adaptive code table.
//!
//! Every code owns one small record naming its prefix code and the byte appended to it, so a
//! sequence is never stored as a whole. A separate successor index answers the question the
//! encoder asks all the time: which code, if any, extends `prefix` by `byte`?
use crate::config::Config;
use crate::Code;

/// Number of seed codes, one for each byte value.
pub const SEEDS: usize = 256;

/// The string table of one coding pass.
///
/// Codes `0..256` are the single bytes and are never removed. Every other code is an existing
/// code extended by exactly one byte. Once [`max_entries`] codes exist the table is frozen and
/// all further insertions are ignored.
///
/// [`max_entries`]: #method.max_entries
pub struct Dictionary {
    /// One link for each assigned code.
    links: Vec<Link>,
    /// The successor index.
    tree: Tree,
    max_entries: usize,
}

#[derive(Clone, Copy)]
struct Link {
    prefix: Code,
    byte: u8,
    /// The first byte of the whole sequence.
    first: u8,
    /// The length of the whole sequence.
    depth: u32,
}

/// One tree node for at most each code.
/// To avoid using too much memory we keep nodes with few successors in optimized form. This form
/// doesn't offer lookup by indexing but instead does a linear search.
#[derive(Default)]
struct Tree {
    simples: Vec<Simple>,
    complex: Vec<Full>,
    keys: Vec<CompressedKey>,
}

#[derive(Clone, Copy)]
enum FullKey {
    NoSuccessor,
    Simple(u32),
    Full(u32),
}

/// A `FullKey` with its tag in the two high bits.
#[derive(Clone, Copy)]
struct CompressedKey(u32);

const KEY_TAG_SHIFT: u32 = 30;
const KEY_INDEX_MASK: u32 = (1 << KEY_TAG_SHIFT) - 1;

const SHORT: usize = 16;

/// Marks an unused slot of a `Full` node.
const NO_CODE: Code = Code::MAX;

#[derive(Clone, Copy)]
struct Simple {
    codes: [Code; SHORT],
    chars: [u8; SHORT],
    count: u8,
}

#[derive(Clone, Copy)]
struct Full {
    char_continuation: [Code; 256],
}

impl Dictionary {
    /// Create a table seeded with the 256 single bytes.
    pub fn new(config: Config) -> Self {
        let mut dict = Dictionary {
            links: Vec::new(),
            tree: Tree::default(),
            max_entries: config.max_entries(),
        };
        dict.reset();
        dict
    }

    /// Drop all learned codes, keeping only the seeds.
    pub fn reset(&mut self) {
        self.links.clear();
        self.links.extend((0..=u8::MAX).map(Link::base));
        self.tree.reset();
    }

    /// The number of assigned codes.
    pub fn size(&self) -> usize {
        self.links.len()
    }

    /// The configured capacity.
    pub fn max_entries(&self) -> usize {
        self.max_entries
    }

    pub fn is_full(&self) -> bool {
        self.links.len() >= self.max_entries
    }

    /// Find the code of a complete sequence.
    pub fn lookup(&self, sequence: &[u8]) -> Option<Code> {
        let (&first, rest) = sequence.split_first()?;
        rest.iter()
            .try_fold(Code::from(first), |code, &byte| self.successor(code, byte))
    }

    /// Add a sequence that extends an existing one by its last byte.
    ///
    /// Returns the new code. Nothing happens, and `None` is returned, when the table is full,
    /// the sequence is already present, or its prefix is not.
    pub fn insert(&mut self, sequence: &[u8]) -> Option<Code> {
        let (&last, prefix) = sequence.split_last()?;
        let prefix = self.lookup(prefix)?;
        if self.successor(prefix, last).is_some() {
            return None;
        }
        self.append(prefix, last)
    }

    /// The code that extends `prefix` by `byte`.
    pub fn successor(&self, prefix: Code, byte: u8) -> Option<Code> {
        self.tree.at_key(prefix, byte)
    }

    /// Assign the next code to `prefix` extended by `byte`.
    ///
    /// The caller must have checked that the extension is not yet present, see [`successor`].
    /// Returns `None` if the table is full or `prefix` is not assigned.
    ///
    /// [`successor`]: #method.successor
    pub fn append(&mut self, prefix: Code, byte: u8) -> Option<Code> {
        if self.is_full() {
            return None;
        }

        let base = *self.links.get(prefix as usize)?;
        debug_assert!(self.successor(prefix, byte).is_none());
        let code = self.tree.append(prefix, byte);
        debug_assert_eq!(code as usize, self.links.len());
        self.links.push(Link {
            prefix,
            byte,
            first: base.first,
            depth: base.depth + 1,
        });

        if self.is_full() {
            tracing::trace!(entries = self.links.len(), "dictionary full, freezing");
        }

        Some(code)
    }

    /// The length of the sequence of `code`.
    pub fn depth(&self, code: Code) -> Option<usize> {
        self.links.get(code as usize).map(|link| link.depth as usize)
    }

    /// The first byte of the sequence of `code`.
    pub fn first_byte(&self, code: Code) -> Option<u8> {
        self.links.get(code as usize).map(|link| link.first)
    }

    /// Append the sequence of `code` to `out`, returning its length.
    pub fn write_sequence(&self, code: Code, out: &mut Vec<u8>) -> Option<usize> {
        let depth = self.depth(code)?;
        let start = out.len();
        out.resize(start + depth, 0);

        let mut code_iter = code;
        for ch in out[start..].iter_mut().rev() {
            let link = &self.links[code_iter as usize];
            *ch = link.byte;
            code_iter = link.prefix;
        }

        Some(depth)
    }

    /// The sequence of `code`.
    pub fn sequence(&self, code: Code) -> Option<Vec<u8>> {
        let mut out = Vec::new();
        self.write_sequence(code, &mut out)?;
        Some(out)
    }
}

impl Link {
    fn base(byte: u8) -> Self {
        Link {
            prefix: Code::from(byte),
            byte,
            first: byte,
            depth: 1,
        }
    }
}

impl Tree {
    fn reset(&mut self) {
        self.simples.clear();
        self.complex.clear();
        self.keys.clear();
        self.keys.resize(SEEDS, FullKey::NoSuccessor.into());
    }

    fn at_key(&self, code: Code, ch: u8) -> Option<Code> {
        let key = *self.keys.get(code as usize)?;
        match FullKey::from(key) {
            FullKey::NoSuccessor => None,
            FullKey::Simple(idx) => {
                let nexts = &self.simples[idx as usize];
                let successors = nexts
                    .codes
                    .iter()
                    .zip(nexts.chars.iter())
                    .take(usize::from(nexts.count));
                for (&scode, &sch) in successors {
                    if sch == ch {
                        return Some(scode);
                    }
                }

                None
            }
            FullKey::Full(idx) => {
                let full = &self.complex[idx as usize];
                let precode = full.char_continuation[usize::from(ch)];
                if precode != NO_CODE {
                    Some(precode)
                } else {
                    None
                }
            }
        }
    }

    /// Register the successor of `code` by `ch` under the next free code and return that code.
    fn append(&mut self, code: Code, ch: u8) -> Code {
        let next = self.keys.len() as Code;
        let key = self.keys[code as usize];
        match FullKey::from(key) {
            FullKey::NoSuccessor => {
                let new_key = FullKey::Simple(self.simples.len() as u32);
                let mut simple = Simple::default();
                simple.codes[0] = next;
                simple.chars[0] = ch;
                simple.count = 1;
                self.simples.push(simple);
                self.keys[code as usize] = new_key.into();
            }
            FullKey::Simple(idx) if usize::from(self.simples[idx as usize].count) < SHORT => {
                let nexts = &mut self.simples[idx as usize];
                let nidx = usize::from(nexts.count);
                nexts.chars[nidx] = ch;
                nexts.codes[nidx] = next;
                nexts.count += 1;
            }
            FullKey::Simple(idx) => {
                // The short form ran out of space, move all successors to a direct table.
                let new_key = FullKey::Full(self.complex.len() as u32);
                let simple = &self.simples[idx as usize];
                let mut full = Full {
                    char_continuation: [NO_CODE; 256],
                };
                for (&pch, &pcont) in simple.chars.iter().zip(simple.codes.iter()) {
                    full.char_continuation[usize::from(pch)] = pcont;
                }
                full.char_continuation[usize::from(ch)] = next;
                self.complex.push(full);
                self.keys[code as usize] = new_key.into();
            }
            FullKey::Full(idx) => {
                let full = &mut self.complex[idx as usize];
                full.char_continuation[usize::from(ch)] = next;
            }
        }
        self.keys.push(FullKey::NoSuccessor.into());
        next
    }
}

impl Default for FullKey {
    fn default() -> Self {
        FullKey::NoSuccessor
    }
}

impl Default for Simple {
    fn default() -> Self {
        Simple {
            codes: [0; SHORT],
            chars: [0; SHORT],
            count: 0,
        }
    }
}

impl From<CompressedKey> for FullKey {
    fn from(CompressedKey(key): CompressedKey) -> Self {
        match key >> KEY_TAG_SHIFT {
            0 => FullKey::Full(key & KEY_INDEX_MASK),
            1 => FullKey::Simple(key & KEY_INDEX_MASK),
            _ => FullKey::NoSuccessor,
        }
    }
}

impl From<FullKey> for CompressedKey {
    fn from(full: FullKey) -> Self {
        CompressedKey(match full {
            FullKey::NoSuccessor => 2 << KEY_TAG_SHIFT,
            FullKey::Simple(idx) => (1 << KEY_TAG_SHIFT) | idx,
            FullKey::Full(idx) => idx,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::{Dictionary, SEEDS, SHORT};
    use crate::config::Config;

    fn small() -> Dictionary {
        Dictionary::new(Config::new(9).unwrap())
    }

    #[test]
    fn seeded_with_all_bytes() {
        let dict = small();
        assert_eq!(dict.size(), SEEDS);
        for byte in 0..=u8::MAX {
            assert_eq!(dict.lookup(&[byte]), Some(u32::from(byte)));
            assert_eq!(dict.sequence(u32::from(byte)), Some(vec![byte]));
        }
        assert_eq!(dict.lookup(&[]), None);
        assert_eq!(dict.lookup(b"ab"), None);
    }

    #[test]
    fn insert_requires_prefix() {
        let mut dict = small();
        assert_eq!(dict.insert(b"abc"), None);
        assert_eq!(dict.insert(b"ab"), Some(256));
        assert_eq!(dict.insert(b"ab"), None);
        assert_eq!(dict.insert(b"abc"), Some(257));
        assert_eq!(dict.insert(b"a"), None);
        assert_eq!(dict.insert(b""), None);
        assert_eq!(dict.lookup(b"abc"), Some(257));
        assert_eq!(dict.sequence(257).as_deref(), Some(&b"abc"[..]));
        assert_eq!(dict.first_byte(257), Some(b'a'));
        assert_eq!(dict.depth(257), Some(3));
        assert_eq!(dict.size(), 258);
    }

    #[test]
    fn many_successors_stay_reachable() {
        let mut dict = small();
        // Enough successors of one code to leave the short form.
        let count = SHORT * 3;
        for byte in 0..count as u8 {
            assert_eq!(dict.append(0, byte), Some((SEEDS + usize::from(byte)) as u32));
        }
        for byte in 0..count as u8 {
            assert_eq!(dict.successor(0, byte), Some((SEEDS + usize::from(byte)) as u32));
        }
        assert_eq!(dict.successor(0, 0xff), None);
    }

    #[test]
    fn freezes_when_full() {
        let mut dict = small();
        let mut byte = 0u8;
        let mut prefix = 0;
        while !dict.is_full() {
            let code = dict.append(prefix, byte).unwrap();
            prefix = code;
            byte = byte.wrapping_add(1);
        }
        assert_eq!(dict.size(), 512);
        assert_eq!(dict.append(0, 0xff), None);
        assert_eq!(dict.insert(&[0, 0xff]), None);
        assert_eq!(dict.size(), 512);
        assert_eq!(dict.depth(511), Some(257));
    }

    #[test]
    fn reset_forgets_learned_codes() {
        let mut dict = small();
        dict.insert(b"xy").unwrap();
        dict.reset();
        assert_eq!(dict.size(), SEEDS);
        assert_eq!(dict.lookup(b"xy"), None);
        assert_eq!(dict.insert(b"xy"), Some(256));
    }
}
