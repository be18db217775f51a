//! The fixed table of substitution operators.
//!
//! Each [`Operator`] variant is one row of the `(symbol, arity)` table.
//! Position-sensitive symbols are split at parse time: `${#x}` is
//! [`Operator::Length`] while `${x#pat}` is [`Operator::RemoveSmallestPrefix`],
//! so nothing downstream has to guess from the symbol alone.
//!
//! Patterns are literal substrings, not globs. The "smallest" and "largest"
//! variants of the removal operators therefore behave the same; they stay
//! distinct so the tree keeps what the source said.

use std::ops::RangeInclusive;

use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operator {
    /// `$x`, `${x}`
    Identity,
    /// `${#x}`
    Length,
    /// `${x#pat}`
    RemoveSmallestPrefix,
    /// `${x##pat}`
    RemoveLargestPrefix,
    /// `${x%pat}`
    RemoveSmallestSuffix,
    /// `${x%%pat}`
    RemoveLargestSuffix,
    /// `${x/pat/rep}`
    ReplaceFirst,
    /// `${x//pat/rep}`
    ReplaceAll,
    /// `${x/#pat/rep}`
    ReplacePrefix,
    /// `${x/%pat/rep}`
    ReplaceSuffix,
    /// `${x:offset}`, `${x:offset:length}`
    Substring,
    /// `${x=word}`
    AssignDefault,
    /// `${x:=word}`
    AssignDefaultOnNull,
    /// `${x:-word}`
    UseDefault,
    /// `${x:?word}`
    Required,
    /// `${x:+word}`
    UseAlternative,
    /// `${x,}`
    LowercaseFirst,
    /// `${x,,}`
    LowercaseAll,
    /// `${x^}`
    UppercaseFirst,
    /// `${x^^}`
    UppercaseAll,
}

/// Every operator, in table order.
pub const OPERATORS: [Operator; 20] = [
    Operator::Identity,
    Operator::Length,
    Operator::RemoveSmallestPrefix,
    Operator::RemoveLargestPrefix,
    Operator::RemoveSmallestSuffix,
    Operator::RemoveLargestSuffix,
    Operator::ReplaceFirst,
    Operator::ReplaceAll,
    Operator::ReplacePrefix,
    Operator::ReplaceSuffix,
    Operator::Substring,
    Operator::AssignDefault,
    Operator::AssignDefaultOnNull,
    Operator::UseDefault,
    Operator::Required,
    Operator::UseAlternative,
    Operator::LowercaseFirst,
    Operator::LowercaseAll,
    Operator::UppercaseFirst,
    Operator::UppercaseAll,
];

/// Look up the operator for `symbol` applied to `arity` arguments.
///
/// Shorthand for [`Operator::lookup`].
pub fn lookup(symbol: &str, arity: usize) -> Option<Operator> {
    Operator::lookup(symbol, arity)
}

/// Failure of an operator applied to a value.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum OperatorError {
    /// `${x:?message}` on an unset or empty value. Carries the message,
    /// which may be empty.
    #[error("{0}")]
    Required(String),

    #[error("invalid substring {what} `{value}`: expected an integer")]
    InvalidNumber { what: &'static str, value: String },

    #[error("substring length {0} ends before the offset")]
    NegativeLength(i64),

    #[error("operator `{symbol}` takes {expected} argument(s), got {got}")]
    Arity {
        symbol: &'static str,
        expected: String,
        got: usize,
    },
}

impl Operator {
    pub fn lookup(symbol: &str, arity: usize) -> Option<Operator> {
        let op = match (symbol, arity) {
            ("", 0) => Operator::Identity,
            ("#", 0) => Operator::Length,
            ("#", 1) => Operator::RemoveSmallestPrefix,
            ("##", 1) => Operator::RemoveLargestPrefix,
            ("%", 1) => Operator::RemoveSmallestSuffix,
            ("%%", 1) => Operator::RemoveLargestSuffix,
            ("/", 1 | 2) => Operator::ReplaceFirst,
            ("//", 1 | 2) => Operator::ReplaceAll,
            ("/#", 1 | 2) => Operator::ReplacePrefix,
            ("/%", 1 | 2) => Operator::ReplaceSuffix,
            (":", 1 | 2) => Operator::Substring,
            ("=", 1) => Operator::AssignDefault,
            (":=", 1) => Operator::AssignDefaultOnNull,
            (":-", 1) => Operator::UseDefault,
            (":?", 1) => Operator::Required,
            (":+", 1) => Operator::UseAlternative,
            (",", 0) => Operator::LowercaseFirst,
            (",,", 0) => Operator::LowercaseAll,
            ("^", 0) => Operator::UppercaseFirst,
            ("^^", 0) => Operator::UppercaseAll,
            _ => return None,
        };
        Some(op)
    }

    /// The operator as written in source. Empty for [`Operator::Identity`].
    pub fn symbol(&self) -> &'static str {
        match self {
            Operator::Identity => "",
            Operator::Length | Operator::RemoveSmallestPrefix => "#",
            Operator::RemoveLargestPrefix => "##",
            Operator::RemoveSmallestSuffix => "%",
            Operator::RemoveLargestSuffix => "%%",
            Operator::ReplaceFirst => "/",
            Operator::ReplaceAll => "//",
            Operator::ReplacePrefix => "/#",
            Operator::ReplaceSuffix => "/%",
            Operator::Substring => ":",
            Operator::AssignDefault => "=",
            Operator::AssignDefaultOnNull => ":=",
            Operator::UseDefault => ":-",
            Operator::Required => ":?",
            Operator::UseAlternative => ":+",
            Operator::LowercaseFirst => ",",
            Operator::LowercaseAll => ",,",
            Operator::UppercaseFirst => "^",
            Operator::UppercaseAll => "^^",
        }
    }

    /// How many arguments the operator accepts.
    ///
    /// Replacement operators take an optional replacement (`${x/pat}`
    /// deletes the first match), substring an optional length.
    pub fn arity(&self) -> RangeInclusive<usize> {
        match self {
            Operator::Identity
            | Operator::Length
            | Operator::LowercaseFirst
            | Operator::LowercaseAll
            | Operator::UppercaseFirst
            | Operator::UppercaseAll => 0..=0,
            Operator::ReplaceFirst
            | Operator::ReplaceAll
            | Operator::ReplacePrefix
            | Operator::ReplaceSuffix
            | Operator::Substring => 1..=2,
            Operator::RemoveSmallestPrefix
            | Operator::RemoveLargestPrefix
            | Operator::RemoveSmallestSuffix
            | Operator::RemoveLargestSuffix
            | Operator::AssignDefault
            | Operator::AssignDefaultOnNull
            | Operator::UseDefault
            | Operator::Required
            | Operator::UseAlternative => 1..=1,
        }
    }

    /// Whether applying this operator to `value` produces a default that
    /// should be written back to the value store (`=` and `:=`).
    pub fn assigns(&self, value: Option<&str>) -> bool {
        match self {
            Operator::AssignDefault => value.is_none(),
            Operator::AssignDefaultOnNull => is_null(value),
            _ => false,
        }
    }

    /// Apply the operator to a resolved value (`None` = unset) and its
    /// evaluated arguments. Pure: no side effects, same input same output.
    pub fn apply(&self, value: Option<&str>, args: &[String]) -> Result<String, OperatorError> {
        let arity = self.arity();
        if !arity.contains(&args.len()) {
            let expected = if arity.start() == arity.end() {
                arity.start().to_string()
            } else {
                format!("{} to {}", arity.start(), arity.end())
            };
            return Err(OperatorError::Arity {
                symbol: self.symbol(),
                expected,
                got: args.len(),
            });
        }

        let s = value.unwrap_or("");
        let arg = |i: usize| args.get(i).map(String::as_str).unwrap_or("");

        let result = match self {
            Operator::Identity => s.to_string(),
            Operator::Length => s.chars().count().to_string(),

            Operator::RemoveSmallestPrefix | Operator::RemoveLargestPrefix => {
                s.strip_prefix(arg(0)).unwrap_or(s).to_string()
            }
            Operator::RemoveSmallestSuffix | Operator::RemoveLargestSuffix => {
                s.strip_suffix(arg(0)).unwrap_or(s).to_string()
            }

            Operator::ReplaceFirst => replace(s, arg(0), arg(1), Some(1)),
            Operator::ReplaceAll => replace(s, arg(0), arg(1), None),
            Operator::ReplacePrefix => match s.strip_prefix(arg(0)) {
                Some(rest) => format!("{}{rest}", arg(1)),
                None => s.to_string(),
            },
            Operator::ReplaceSuffix => match s.strip_suffix(arg(0)) {
                Some(rest) => format!("{rest}{}", arg(1)),
                None => s.to_string(),
            },

            Operator::Substring => substring(s, arg(0), args.get(1).map(String::as_str))?,

            Operator::AssignDefault => match value {
                Some(v) => v.to_string(),
                None => arg(0).to_string(),
            },
            Operator::AssignDefaultOnNull | Operator::UseDefault => {
                if is_null(value) {
                    arg(0).to_string()
                } else {
                    s.to_string()
                }
            }
            Operator::Required => {
                if is_null(value) {
                    return Err(OperatorError::Required(arg(0).to_string()));
                }
                s.to_string()
            }
            Operator::UseAlternative => {
                if is_null(value) {
                    String::new()
                } else {
                    arg(0).to_string()
                }
            }

            Operator::LowercaseFirst => map_first(s, |c| c.to_lowercase().collect()),
            Operator::LowercaseAll => s.to_lowercase(),
            Operator::UppercaseFirst => map_first(s, |c| c.to_uppercase().collect()),
            Operator::UppercaseAll => s.to_uppercase(),
        };

        Ok(result)
    }
}

/// Unset or set to the empty string.
fn is_null(value: Option<&str>) -> bool {
    value.is_none_or(str::is_empty)
}

fn replace(s: &str, pattern: &str, replacement: &str, limit: Option<usize>) -> String {
    // An empty pattern matches nowhere.
    if pattern.is_empty() {
        return s.to_string();
    }
    match limit {
        Some(n) => s.replacen(pattern, replacement, n),
        None => s.replace(pattern, replacement),
    }
}

fn map_first(s: &str, f: impl FnOnce(char) -> String) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => f(first) + chars.as_str(),
        None => String::new(),
    }
}

fn parse_number(what: &'static str, raw: &str) -> Result<i64, OperatorError> {
    raw.trim()
        .parse::<i64>()
        .map_err(|_| OperatorError::InvalidNumber {
            what,
            value: raw.to_string(),
        })
}

/// Character-indexed substring. Negative offsets and lengths count from
/// the end of the value.
fn substring(s: &str, offset: &str, length: Option<&str>) -> Result<String, OperatorError> {
    let chars: Vec<char> = s.chars().collect();
    let len = chars.len() as i64;

    let offset = parse_number("offset", offset)?;
    let start = if offset < 0 { len + offset } else { offset };
    if start < 0 || start >= len {
        return Ok(String::new());
    }

    let end = match length {
        None => len,
        Some(raw) => {
            let length = parse_number("length", raw)?;
            if length < 0 {
                let end = len + length;
                if end < start {
                    return Err(OperatorError::NegativeLength(length));
                }
                end
            } else {
                start.saturating_add(length).min(len)
            }
        }
    };

    Ok(chars[start as usize..end as usize].iter().collect())
}
