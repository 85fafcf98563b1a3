use std::fmt;
use std::ops::{BitAnd, BitOr, BitOrAssign};
use std::str::FromStr;

/// Header and buffering options for a [`Logger`](crate::Logger).
///
/// Flags combine with `|`:
///
/// ```
/// # use alog::Flags;
/// let flags = Flags::DATE | Flags::TIME | Flags::UTC;
/// assert!(flags.contains(Flags::TIME));
/// assert!(!flags.contains(Flags::PREFIX));
/// ```
#[derive(Copy, Clone, Default, PartialEq, Eq, Hash)]
pub struct Flags(u16);

impl Flags {
    /// No header, no buffering.
    pub const NONE: Flags = Flags(0);
    /// `hh:mm:ss` time of day.
    pub const TIME: Flags = Flags(1 << 0);
    /// `MM/DD` date.
    pub const MMDD: Flags = Flags(1 << 1);
    /// Microseconds after the seconds field. Implies [`Flags::TIME`].
    pub const MICROSEC: Flags = Flags(1 << 2);
    /// Render the logger's prefix.
    pub const PREFIX: Flags = Flags(1 << 3);
    /// Use UTC instead of the local time zone.
    pub const UTC: Flags = Flags(1 << 4);
    /// Full `YYYY/MM/DD` date.
    pub const DATE: Flags = Flags(1 << 5);
    /// Buffer records in a 2 KiB arena.
    pub const BUF_SMALL: Flags = Flags(1 << 6);
    /// Buffer records in a 4 KiB arena. Wins over [`Flags::BUF_SMALL`].
    pub const BUF_LARGE: Flags = Flags(1 << 7);
    /// `MM/DD hh:mm:ss prefix`.
    pub const STD: Flags = Flags(Self::MMDD.0 | Self::TIME.0 | Self::PREFIX.0);

    const NAMES: [(&'static str, Flags); 8] = [
        ("time", Self::TIME),
        ("mmdd", Self::MMDD),
        ("microsec", Self::MICROSEC),
        ("prefix", Self::PREFIX),
        ("utc", Self::UTC),
        ("date", Self::DATE),
        ("buf_small", Self::BUF_SMALL),
        ("buf_large", Self::BUF_LARGE),
    ];

    #[inline]
    pub const fn from_bits(bits: u16) -> Self {
        Flags(bits)
    }

    #[inline]
    pub const fn bits(self) -> u16 {
        self.0
    }

    /// True if every bit of `other` is set.
    #[inline]
    pub const fn contains(self, other: Flags) -> bool {
        self.0 & other.0 == other.0
    }

    /// True if any bit of `other` is set.
    #[inline]
    pub const fn intersects(self, other: Flags) -> bool {
        self.0 & other.0 != 0
    }

    #[inline]
    pub const fn is_empty(self) -> bool {
        self.0 == 0
    }

    /// The buffering mode these flags select.
    pub const fn buffer_mode(self) -> BufferMode {
        if self.intersects(Self::BUF_LARGE) {
            BufferMode::Large
        } else if self.intersects(Self::BUF_SMALL) {
            BufferMode::Small
        } else {
            BufferMode::Unbuffered
        }
    }
}

impl BitOr for Flags {
    type Output = Flags;
    fn bitor(self, rhs: Flags) -> Flags {
        Flags(self.0 | rhs.0)
    }
}

impl BitOrAssign for Flags {
    fn bitor_assign(&mut self, rhs: Flags) {
        self.0 |= rhs.0;
    }
}

impl BitAnd for Flags {
    type Output = Flags;
    fn bitand(self, rhs: Flags) -> Flags {
        Flags(self.0 & rhs.0)
    }
}

impl From<u16> for Flags {
    fn from(bits: u16) -> Self {
        Flags(bits)
    }
}

impl fmt::Display for Flags {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut first = true;
        for (name, flag) in Self::NAMES {
            if self.contains(flag) {
                if !first {
                    f.write_str("|")?;
                }
                f.write_str(name)?;
                first = false;
            }
        }
        if first {
            f.write_str("none")?;
        }
        Ok(())
    }
}

impl fmt::Debug for Flags {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Flags({self})")
    }
}

/// Parses names separated by `|`, `,` or whitespace, case-insensitively.
///
/// Besides the single flag names, `std` expands to [`Flags::STD`] and
/// `none` (or an empty string) to no flags.
impl FromStr for Flags {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut flags = Flags::NONE;
        for word in split_words(s) {
            if word.eq_ignore_ascii_case("std") {
                flags |= Flags::STD;
            } else if word.eq_ignore_ascii_case("none") {
                continue;
            } else {
                let flag = Self::NAMES
                    .iter()
                    .find(|(name, _)| word.eq_ignore_ascii_case(name))
                    .map(|&(_, flag)| flag)
                    .ok_or_else(|| ParseError::new("flag", word))?;
                flags |= flag;
            }
        }
        Ok(flags)
    }
}

pub(crate) fn split_words(s: &str) -> impl Iterator<Item = &str> {
    s.split(|c: char| c == '|' || c == ',' || c.is_whitespace())
        .filter(|w| !w.is_empty())
}

/// How a logger holds records before writing them to its sink.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum BufferMode {
    /// Every record is written through as soon as it is formatted.
    Unbuffered,
    /// Records accumulate until the buffer grows past 2 KiB.
    Small,
    /// Records accumulate until the buffer grows past 4 KiB.
    Large,
}

impl BufferMode {
    /// Flush threshold in bytes. Zero for unbuffered mode.
    pub const fn capacity(self) -> usize {
        match self {
            BufferMode::Unbuffered => 0,
            BufferMode::Small => 2048,
            BufferMode::Large => 4096,
        }
    }

    pub const fn is_buffered(self) -> bool {
        !matches!(self, BufferMode::Unbuffered)
    }
}

/// A flag or level name that could not be recognized.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseError {
    kind: &'static str,
    word: String,
}

impl ParseError {
    pub(crate) fn new(kind: &'static str, word: &str) -> Self {
        Self { kind, word: word.to_owned() }
    }

    /// The offending word.
    pub fn word(&self) -> &str {
        &self.word
    }
}

impl fmt::Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown {} name: {:?}", self.kind, self.word)
    }
}

impl std::error::Error for ParseError {}
