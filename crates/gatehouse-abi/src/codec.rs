//! Word-oriented encoding of call arguments and return values.
//!
//! Every value occupies one or more 32-byte words:
//!
//! | Kind | Head word | Tail |
//! |------|-----------|------|
//! | `address` | right-aligned | - |
//! | `uintN` | right-aligned big-endian | - |
//! | `bool` | `0` or `1` | - |
//! | `bytes4` | left-aligned | - |
//! | `bytes`, `string` | offset of tail | length word, data padded to 32 |
//! | `bytes4[]` | offset of tail | length word, one word per element |

use crate::error::{AbiError, Result};
use crate::types::{Address, OperationId, Selector};

/// Size of one encoded word.
pub const WORD: usize = 32;

/// A value to encode.
#[derive(Debug, Clone, Copy)]
pub enum Token<'a> {
    Address(Address),
    Uint(u64),
    Bool(bool),
    Selector(Selector),
    Word([u8; WORD]),
    Bytes(&'a [u8]),
    Str(&'a str),
    Selectors(&'a [Selector]),
}

impl Token<'_> {
    fn is_dynamic(&self) -> bool {
        matches!(self, Token::Bytes(_) | Token::Str(_) | Token::Selectors(_))
    }
}

impl From<Address> for Token<'_> {
    fn from(v: Address) -> Self {
        Token::Address(v)
    }
}

impl From<OperationId> for Token<'_> {
    fn from(v: OperationId) -> Self {
        Token::Word(v.0)
    }
}

/// Encode a tuple of tokens.
pub fn encode(tokens: &[Token<'_>]) -> Vec<u8> {
    let head_len = tokens.len() * WORD;
    let mut head = Vec::with_capacity(head_len);
    let mut tail = Vec::new();

    for token in tokens {
        if token.is_dynamic() {
            head.extend_from_slice(&uint_word((head_len + tail.len()) as u64));
            encode_tail(token, &mut tail);
        } else {
            head.extend_from_slice(&static_word(token));
        }
    }

    head.extend_from_slice(&tail);
    head
}

/// Encode a call: the selector followed by the encoded arguments.
pub fn encode_call(selector: Selector, tokens: &[Token<'_>]) -> Vec<u8> {
    let mut out = Vec::with_capacity(4 + tokens.len() * WORD);
    out.extend_from_slice(selector.as_bytes());
    out.extend_from_slice(&encode(tokens));
    out
}

fn static_word(token: &Token<'_>) -> [u8; WORD] {
    match *token {
        Token::Address(a) => address_word(a),
        Token::Uint(n) => uint_word(n),
        Token::Bool(b) => uint_word(u64::from(b)),
        Token::Selector(s) => selector_word(s),
        Token::Word(w) => w,
        Token::Bytes(_) | Token::Str(_) | Token::Selectors(_) => {
            unreachable!("dynamic tokens are encoded as tails")
        }
    }
}

fn encode_tail(token: &Token<'_>, tail: &mut Vec<u8>) {
    match *token {
        Token::Bytes(data) => push_padded(tail, data),
        Token::Str(s) => push_padded(tail, s.as_bytes()),
        Token::Selectors(list) => {
            tail.extend_from_slice(&uint_word(list.len() as u64));
            for sel in list {
                tail.extend_from_slice(&selector_word(*sel));
            }
        }
        _ => {}
    }
}

fn push_padded(tail: &mut Vec<u8>, data: &[u8]) {
    tail.extend_from_slice(&uint_word(data.len() as u64));
    tail.extend_from_slice(data);
    let rem = data.len() % WORD;
    if rem != 0 {
        tail.resize(tail.len() + (WORD - rem), 0);
    }
}

/// Encode an unsigned integer as a word.
pub fn uint_word(n: u64) -> [u8; WORD] {
    let mut w = [0u8; WORD];
    w[WORD - 8..].copy_from_slice(&n.to_be_bytes());
    w
}

/// Encode an address as a word.
pub fn address_word(a: Address) -> [u8; WORD] {
    let mut w = [0u8; WORD];
    w[WORD - 20..].copy_from_slice(a.as_bytes());
    w
}

/// Encode a selector as a (left-aligned) word.
pub fn selector_word(s: Selector) -> [u8; WORD] {
    let mut w = [0u8; WORD];
    w[..4].copy_from_slice(s.as_bytes());
    w
}

/// Interpret a word as an unsigned integer of at most `bits` bits.
pub fn word_to_uint(word: &[u8; WORD], bits: u32) -> Result<u64> {
    let leading = WORD - 8;
    if word[..leading].iter().any(|b| *b != 0) {
        return Err(AbiError::IntegerOverflow { bits });
    }
    let mut buf = [0u8; 8];
    buf.copy_from_slice(&word[leading..]);
    let n = u64::from_be_bytes(buf);
    if bits < 64 && n >> bits != 0 {
        return Err(AbiError::IntegerOverflow { bits });
    }
    Ok(n)
}

/// Interpret a word as a canonical boolean.
pub fn word_to_bool(word: &[u8; WORD]) -> Result<bool> {
    match word_to_uint(word, 8) {
        Ok(0) => Ok(false),
        Ok(1) => Ok(true),
        _ => Err(AbiError::NonCanonicalBool),
    }
}

/// Sequential reader over an encoded tuple.
///
/// The decoder is positioned on the head section; dynamic values are followed
/// through their offsets, relative to the start of the tuple.
#[derive(Debug, Clone)]
pub struct Decoder<'a> {
    data: &'a [u8],
    pos: usize,
}

impl<'a> Decoder<'a> {
    /// Create a decoder over an encoded tuple (no selector).
    pub fn new(data: &'a [u8]) -> Self {
        Self { data, pos: 0 }
    }

    /// Create a decoder over call data, skipping the 4-byte selector.
    pub fn for_call(data: &'a [u8]) -> Result<Self> {
        data.get(4..)
            .map(Self::new)
            .ok_or(AbiError::MissingSelector)
    }

    fn word_at(&self, offset: usize) -> Result<[u8; WORD]> {
        let end = offset.checked_add(WORD).ok_or(AbiError::BadOffset(offset))?;
        let slice = self.data.get(offset..end).ok_or(AbiError::ShortInput {
            offset,
            needed: WORD,
            available: self.data.len().saturating_sub(offset),
        })?;
        let mut w = [0u8; WORD];
        w.copy_from_slice(slice);
        Ok(w)
    }

    /// Read the next raw head word.
    pub fn word(&mut self) -> Result<[u8; WORD]> {
        let w = self.word_at(self.pos)?;
        self.pos += WORD;
        Ok(w)
    }

    pub fn address(&mut self) -> Result<Address> {
        let w = self.word()?;
        if w[..WORD - 20].iter().any(|b| *b != 0) {
            return Err(AbiError::DirtyAddress);
        }
        let mut a = [0u8; 20];
        a.copy_from_slice(&w[WORD - 20..]);
        Ok(Address(a))
    }

    pub fn uint(&mut self, bits: u32) -> Result<u64> {
        word_to_uint(&self.word()?, bits)
    }

    pub fn uint32(&mut self) -> Result<u32> {
        // Width is checked by `uint`, the cast cannot truncate.
        self.uint(32).map(|n| n as u32)
    }

    pub fn bool(&mut self) -> Result<bool> {
        word_to_bool(&self.word()?)
    }

    pub fn selector(&mut self) -> Result<Selector> {
        let w = self.word()?;
        Ok(Selector([w[0], w[1], w[2], w[3]]))
    }

    pub fn operation_id(&mut self) -> Result<OperationId> {
        self.word().map(OperationId)
    }

    fn tail_offset(&mut self) -> Result<usize> {
        let raw = self.uint(64)?;
        let offset = usize::try_from(raw).map_err(|_| AbiError::BadOffset(usize::MAX))?;
        if offset > self.data.len() {
            return Err(AbiError::BadOffset(offset));
        }
        Ok(offset)
    }

    /// Read a dynamic `bytes` value.
    pub fn bytes(&mut self) -> Result<Vec<u8>> {
        let offset = self.tail_offset()?;
        let len = word_to_uint(&self.word_at(offset)?, 64)? as usize;
        let start = offset + WORD;
        let end = start.checked_add(len).ok_or(AbiError::BadOffset(offset))?;
        self.data
            .get(start..end)
            .map(<[u8]>::to_vec)
            .ok_or(AbiError::ShortInput {
                offset: start,
                needed: len,
                available: self.data.len().saturating_sub(start),
            })
    }

    /// Read a dynamic `string` value.
    pub fn string(&mut self) -> Result<String> {
        String::from_utf8(self.bytes()?).map_err(|_| AbiError::InvalidUtf8)
    }

    /// Read a dynamic `bytes4[]` value.
    pub fn selectors(&mut self) -> Result<Vec<Selector>> {
        let offset = self.tail_offset()?;
        let len = word_to_uint(&self.word_at(offset)?, 32)? as usize;
        let mut out = Vec::with_capacity(len.min(1024));
        for i in 0..len {
            let w = self.word_at(offset + WORD * (i + 1))?;
            out.push(Selector([w[0], w[1], w[2], w[3]]));
        }
        Ok(out)
    }
}
