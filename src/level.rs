use std::fmt;
use std::ops::BitOr;
use std::str::FromStr;

use crate::flags::{split_words, ParseError};

/// Severity of a record passed to the level-gated entry points.
#[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[repr(u8)]
pub enum Level {
    Debug = 1 << 0,
    Info = 1 << 1,
    Warn = 1 << 2,
    Error = 1 << 3,
    Fatal = 1 << 4,
}

impl Level {
    pub const fn as_str(self) -> &'static str {
        match self {
            Level::Debug => "debug",
            Level::Info => "info",
            Level::Warn => "warn",
            Level::Error => "error",
            Level::Fatal => "fatal",
        }
    }

    const ALL: [Level; 5] = [Level::Debug, Level::Info, Level::Warn, Level::Error, Level::Fatal];
}

impl fmt::Display for Level {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<log::Level> for Level {
    fn from(level: log::Level) -> Self {
        match level {
            log::Level::Error => Level::Error,
            log::Level::Warn => Level::Warn,
            log::Level::Info => Level::Info,
            log::Level::Debug | log::Level::Trace => Level::Debug,
        }
    }
}

impl BitOr for Level {
    type Output = LevelSet;
    fn bitor(self, rhs: Level) -> LevelSet {
        LevelSet::from(self) | LevelSet::from(rhs)
    }
}

/// A set of enabled levels.
///
/// ```
/// # use alog::{Level, LevelSet};
/// let set = Level::Warn | Level::Error;
/// assert!(set.contains(Level::Warn));
/// assert!(!set.contains(Level::Info));
/// assert!(LevelSet::ALL.contains(Level::Debug));
/// ```
#[derive(Copy, Clone, PartialEq, Eq, Hash)]
pub struct LevelSet(u8);

impl LevelSet {
    pub const NONE: LevelSet = LevelSet(0);
    pub const ALL: LevelSet = LevelSet(0b1_1111);

    #[inline]
    pub const fn from_bits(bits: u8) -> Self {
        LevelSet(bits & Self::ALL.0)
    }

    #[inline]
    pub const fn bits(self) -> u8 {
        self.0
    }

    #[inline]
    pub const fn contains(self, level: Level) -> bool {
        self.0 & level as u8 != 0
    }

    pub const fn union(self, other: LevelSet) -> LevelSet {
        LevelSet(self.0 | other.0)
    }

    pub const fn difference(self, other: LevelSet) -> LevelSet {
        LevelSet(self.0 & !other.0)
    }
}

/// Everything except [`Level::Debug`].
impl Default for LevelSet {
    fn default() -> Self {
        Level::Info | Level::Warn | Level::Error | Level::Fatal
    }
}

impl From<Level> for LevelSet {
    fn from(level: Level) -> Self {
        LevelSet(level as u8)
    }
}

impl BitOr for LevelSet {
    type Output = LevelSet;
    fn bitor(self, rhs: LevelSet) -> LevelSet {
        self.union(rhs)
    }
}

impl BitOr<Level> for LevelSet {
    type Output = LevelSet;
    fn bitor(self, rhs: Level) -> LevelSet {
        self.union(rhs.into())
    }
}

impl fmt::Display for LevelSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if *self == Self::ALL {
            return f.write_str("all");
        }
        let mut first = true;
        for level in Level::ALL.into_iter().filter(|l| self.contains(*l)) {
            if !first {
                f.write_str("|")?;
            }
            f.write_str(level.as_str())?;
            first = false;
        }
        if first {
            f.write_str("none")?;
        }
        Ok(())
    }
}

impl fmt::Debug for LevelSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "LevelSet({self})")
    }
}

impl FromStr for LevelSet {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut set = LevelSet::NONE;
        for word in split_words(s) {
            if word.eq_ignore_ascii_case("all") {
                set = LevelSet::ALL;
            } else if word.eq_ignore_ascii_case("none") {
                continue;
            } else {
                let level = Level::ALL
                    .into_iter()
                    .find(|l| word.eq_ignore_ascii_case(l.as_str()))
                    .ok_or_else(|| ParseError::new("level", word))?;
                set = set | level;
            }
        }
        Ok(set)
    }
}
