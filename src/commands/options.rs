//! Option values and coercion
//!
//! Both invocation paths end up here: free-text message tokens are classified by
//! [`coerce_free_text`], typed interaction options are mapped by [`coerce_typed`].
//! Neither function fails; anything unrecognised becomes a string or a raw
//! passthrough.
//!
//! - **Version**: 1.2.0
//! - **Since**: 0.1.0
//!
//! ## Changelog
//! - 1.2.0: Boolean words (yes/no/on/off) for free-text tokens
//! - 1.1.0: Attachment options keep their identifier in a typed slot
//! - 1.0.0: Initial coercion rules

use regex::Regex;
use serde_json::{json, Value};
use std::fmt;
use std::sync::OnceLock;

use crate::gateway::event::StructuredOption;

const YES: [&str; 4] = ["yes", "y", "on", "true"];
const NO: [&str; 4] = ["no", "n", "off", "false"];

static MENTION_PATTERN: OnceLock<Regex> = OnceLock::new();

fn mention_pattern() -> &'static Regex {
    MENTION_PATTERN.get_or_init(|| Regex::new(r"[0-9]{17,19}").expect("mention pattern is valid"))
}

/// Option type tags, numbered the way the platform numbers them
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OptionKind {
    SubCommand,
    SubCommandGroup,
    String,
    Integer,
    Boolean,
    User,
    Channel,
    Role,
    Mentionable,
    Number,
    Attachment,
    Unknown(u8),
}

impl OptionKind {
    pub fn code(self) -> u8 {
        match self {
            OptionKind::SubCommand => 1,
            OptionKind::SubCommandGroup => 2,
            OptionKind::String => 3,
            OptionKind::Integer => 4,
            OptionKind::Boolean => 5,
            OptionKind::User => 6,
            OptionKind::Channel => 7,
            OptionKind::Role => 8,
            OptionKind::Mentionable => 9,
            OptionKind::Number => 10,
            OptionKind::Attachment => 11,
            OptionKind::Unknown(code) => code,
        }
    }

    pub fn from_code(code: u8) -> Self {
        match code {
            1 => OptionKind::SubCommand,
            2 => OptionKind::SubCommandGroup,
            3 => OptionKind::String,
            4 => OptionKind::Integer,
            5 => OptionKind::Boolean,
            6 => OptionKind::User,
            7 => OptionKind::Channel,
            8 => OptionKind::Role,
            9 => OptionKind::Mentionable,
            10 => OptionKind::Number,
            11 => OptionKind::Attachment,
            other => OptionKind::Unknown(other),
        }
    }

    pub fn is_nesting(self) -> bool {
        matches!(self, OptionKind::SubCommand | OptionKind::SubCommandGroup)
    }
}

/// The single populated value of an option. Which variant is present is
/// authoritative for type dispatch.
#[derive(Debug, Clone, PartialEq)]
pub enum OptionSlot {
    String(String),
    Number(f64),
    Integer(i64),
    Boolean(bool),
    User(u64),
    Role(u64),
    Channel(u64),
    Mentionable(String),
    Attachment(String),
    Otherwise(Value),
}

/// A coerced argument, either top-level or nested under a sub-command marker
#[derive(Debug, Clone, PartialEq)]
pub struct OptionValue {
    /// Declared option name, or the positional index rendered as text
    pub name: String,
    pub kind: OptionKind,
    pub slot: OptionSlot,
    /// The value as received, kept for convenience reads
    pub raw: Value,
    pub options: Vec<OptionValue>,
    pub focused: bool,
}

impl OptionValue {
    fn nesting(name: &str, kind: OptionKind, options: Vec<OptionValue>) -> Self {
        OptionValue {
            name: name.to_string(),
            kind,
            slot: OptionSlot::Otherwise(Value::Null),
            raw: Value::Null,
            options,
            focused: false,
        }
    }

    pub fn sub_command(name: &str, options: Vec<OptionValue>) -> Self {
        Self::nesting(name, OptionKind::SubCommand, options)
    }

    pub fn sub_command_group(name: &str, options: Vec<OptionValue>) -> Self {
        Self::nesting(name, OptionKind::SubCommandGroup, options)
    }

    fn scalar(name: String, kind: OptionKind, slot: OptionSlot, raw: Value) -> Self {
        OptionValue {
            name,
            kind,
            slot,
            raw,
            options: Vec::new(),
            focused: false,
        }
    }
}

impl fmt::Display for OptionValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.slot {
            OptionSlot::String(s) | OptionSlot::Mentionable(s) | OptionSlot::Attachment(s) => {
                write!(f, "{s}")
            }
            OptionSlot::Number(n) => write!(f, "{n}"),
            OptionSlot::Integer(i) => write!(f, "{i}"),
            OptionSlot::Boolean(b) => write!(f, "{b}"),
            OptionSlot::User(id) | OptionSlot::Role(id) | OptionSlot::Channel(id) => {
                write!(f, "{id}")
            }
            OptionSlot::Otherwise(Value::String(s)) => write!(f, "{s}"),
            OptionSlot::Otherwise(Value::Null) => write!(f, "{}", self.name),
            OptionSlot::Otherwise(other) => write!(f, "{other}"),
        }
    }
}

/// Declared option of a command, sub-command or group entry
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OptionDeclaration {
    pub name: String,
    pub kind: OptionKind,
    pub description: String,
    pub required: bool,
}

impl OptionDeclaration {
    pub fn new(name: impl Into<String>, kind: OptionKind) -> Self {
        OptionDeclaration {
            name: name.into(),
            kind,
            description: String::new(),
            required: false,
        }
    }

    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    pub fn required(mut self, required: bool) -> Self {
        self.required = required;
        self
    }
}

/// Classify a free-text token. First matching rule wins:
/// 17-19 digit run (mention or snowflake), numeric literal, yes-word, no-word, string.
pub fn coerce_free_text(token: &str, index: usize) -> OptionValue {
    let name = index.to_string();

    if let Some(found) = mention_pattern().find(token) {
        let id = found.as_str().to_string();
        return OptionValue::scalar(
            name,
            OptionKind::Mentionable,
            OptionSlot::Mentionable(id.clone()),
            json!(id),
        );
    }

    if let Some(number) = parse_numeric_literal(token) {
        return OptionValue::scalar(
            name,
            OptionKind::Number,
            OptionSlot::Number(number),
            json!(number),
        );
    }

    let lowered = token.to_lowercase();
    if YES.contains(&lowered.as_str()) {
        return OptionValue::scalar(
            name,
            OptionKind::Boolean,
            OptionSlot::Boolean(true),
            json!(true),
        );
    }
    if NO.contains(&lowered.as_str()) {
        return OptionValue::scalar(
            name,
            OptionKind::Boolean,
            OptionSlot::Boolean(false),
            json!(false),
        );
    }

    OptionValue::scalar(
        name,
        OptionKind::String,
        OptionSlot::String(token.to_string()),
        json!(token),
    )
}

/// Map an already-typed interaction option onto its slot, recursing into nested
/// options. Values that do not fit their declared type fall back to `Otherwise`.
pub fn coerce_typed(option: &StructuredOption) -> OptionValue {
    let raw = option.value.clone().unwrap_or(Value::Null);

    let slot = match option.kind {
        OptionKind::String => raw.as_str().map(|s| OptionSlot::String(s.to_string())),
        OptionKind::Number => raw.as_f64().map(OptionSlot::Number),
        OptionKind::Integer => raw
            .as_i64()
            .or_else(|| raw.as_f64().filter(|n| n.fract() == 0.0).map(|n| n as i64))
            .map(OptionSlot::Integer),
        OptionKind::Boolean => raw.as_bool().map(OptionSlot::Boolean),
        OptionKind::User => snowflake(&raw).map(OptionSlot::User),
        OptionKind::Role => snowflake(&raw).map(OptionSlot::Role),
        OptionKind::Channel => snowflake(&raw).map(OptionSlot::Channel),
        OptionKind::Attachment => raw.as_str().map(|s| OptionSlot::Attachment(s.to_string())),
        OptionKind::Mentionable
        | OptionKind::SubCommand
        | OptionKind::SubCommandGroup
        | OptionKind::Unknown(_) => None,
    }
    .unwrap_or_else(|| OptionSlot::Otherwise(raw.clone()));

    OptionValue {
        name: option.name.clone(),
        kind: option.kind,
        slot,
        raw,
        options: option.options.iter().map(coerce_typed).collect(),
        focused: option.focused,
    }
}

/// Identifiers arrive as decimal strings; tolerate plain integers too
fn snowflake(raw: &Value) -> Option<u64> {
    match raw {
        Value::String(s) => s.trim().parse().ok(),
        Value::Number(n) => n.as_u64(),
        _ => None,
    }
}

/// Accumulate in `f64` so literals wider than 64 bits still parse, rounded
fn fold_radix_digits(digits: &str, radix: u32) -> Option<f64> {
    if digits.is_empty() {
        return None;
    }
    digits.chars().try_fold(0.0_f64, |acc, c| {
        c.to_digit(radix).map(|digit| acc * f64::from(radix) + f64::from(digit))
    })
}

/// Locale-invariant numeric literal: decimal with optional sign, fraction and
/// exponent, `Infinity`, or unsigned `0x`/`0o`/`0b` integers. NaN never parses.
fn parse_numeric_literal(token: &str) -> Option<f64> {
    let trimmed = token.trim();
    if trimmed.is_empty() {
        return None;
    }

    let (sign, body) = match trimmed.strip_prefix('-') {
        Some(rest) => (-1.0, rest),
        None => (1.0, trimmed.strip_prefix('+').unwrap_or(trimmed)),
    };

    if body == "Infinity" {
        return Some(sign * f64::INFINITY);
    }

    if body.len() == trimmed.len() {
        let radixes = [("0x", 16), ("0X", 16), ("0o", 8), ("0O", 8), ("0b", 2), ("0B", 2)];
        for (prefix, radix) in radixes {
            if let Some(digits) = body.strip_prefix(prefix) {
                return fold_radix_digits(digits, radix);
            }
        }
    }

    let well_formed = body.bytes().any(|b| b.is_ascii_digit())
        && body
            .bytes()
            .all(|b| b.is_ascii_digit() || matches!(b, b'.' | b'e' | b'E' | b'+' | b'-'));
    if !well_formed {
        return None;
    }

    trimmed.parse::<f64>().ok().filter(|n| !n.is_nan())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_free_text_number() {
        let opt = coerce_free_text("42", 0);
        assert_eq!(opt.name, "0");
        assert_eq!(opt.kind, OptionKind::Number);
        assert_eq!(opt.slot, OptionSlot::Number(42.0));
    }

    #[test]
    fn test_free_text_number_forms() {
        for (token, expected) in [
            ("-3.5", -3.5),
            ("1e3", 1000.0),
            (".5", 0.5),
            ("+7", 7.0),
            ("0x1F", 31.0),
            ("0b101", 5.0),
        ] {
            assert_eq!(
                coerce_free_text(token, 0).slot,
                OptionSlot::Number(expected),
                "token {token}"
            );
        }
        assert_eq!(
            coerce_free_text("-Infinity", 0).slot,
            OptionSlot::Number(f64::NEG_INFINITY)
        );
    }

    #[test]
    fn test_free_text_wide_radix_literals_stay_numbers() {
        let opt = coerce_free_text("0xffffffffffffffffffff", 0);
        assert_eq!(opt.kind, OptionKind::Number);
        let OptionSlot::Number(value) = opt.slot.clone() else {
            panic!("expected a number, got {:?}", opt.slot);
        };
        assert!((value / 1.2089258196146292e24 - 1.0).abs() < 1e-12);

        assert_eq!(
            coerce_free_text("0x1ffffffffffffffff", 0).slot,
            OptionSlot::Number(2f64.powi(65))
        );
        assert_eq!(coerce_free_text("0o777", 0).slot, OptionSlot::Number(511.0));
    }

    #[test]
    fn test_free_text_rejects_bad_radix_digits() {
        for token in ["0x", "0xg1", "0b102", "0o8"] {
            assert_eq!(
                coerce_free_text(token, 0).kind,
                OptionKind::String,
                "token {token}"
            );
        }
    }

    #[test]
    fn test_free_text_rejects_non_js_numbers() {
        for token in ["nan", "NaN", "inf", "1_000", "1e", "-0x10", "12abc", "."] {
            assert_eq!(
                coerce_free_text(token, 0).kind,
                OptionKind::String,
                "token {token}"
            );
        }
    }

    #[test]
    fn test_free_text_booleans() {
        assert_eq!(coerce_free_text("yes", 0).slot, OptionSlot::Boolean(true));
        assert_eq!(coerce_free_text("Y", 0).slot, OptionSlot::Boolean(true));
        assert_eq!(coerce_free_text("ON", 0).slot, OptionSlot::Boolean(true));
        assert_eq!(coerce_free_text("true", 0).slot, OptionSlot::Boolean(true));
        assert_eq!(coerce_free_text("off", 0).slot, OptionSlot::Boolean(false));
        assert_eq!(coerce_free_text("No", 0).slot, OptionSlot::Boolean(false));
        assert_eq!(coerce_free_text("FALSE", 0).slot, OptionSlot::Boolean(false));
    }

    #[test]
    fn test_free_text_string() {
        let opt = coerce_free_text("hello", 3);
        assert_eq!(opt.name, "3");
        assert_eq!(opt.slot, OptionSlot::String("hello".to_string()));
        assert_eq!(opt.raw, json!("hello"));
    }

    #[test]
    fn test_free_text_mention_wins_over_markup() {
        let opt = coerce_free_text("<@123456789012345678>", 1);
        assert_eq!(opt.kind, OptionKind::Mentionable);
        assert_eq!(
            opt.slot,
            OptionSlot::Mentionable("123456789012345678".to_string())
        );
    }

    #[test]
    fn test_free_text_bare_snowflake_is_mentionable_not_number() {
        let opt = coerce_free_text("81384788765712384", 0);
        assert_eq!(opt.kind, OptionKind::Mentionable);
    }

    #[test]
    fn test_free_text_short_digit_run_is_number() {
        assert_eq!(coerce_free_text("1234567890123456", 0).kind, OptionKind::Number);
    }

    #[test]
    fn test_typed_identifiers_parse_from_strings() {
        let user = coerce_typed(&StructuredOption::new(
            "target",
            OptionKind::User,
            Some(json!("80351110224678912")),
        ));
        assert_eq!(user.slot, OptionSlot::User(80351110224678912));

        let channel = coerce_typed(&StructuredOption::new(
            "where",
            OptionKind::Channel,
            Some(json!("41771983423143937")),
        ));
        assert_eq!(channel.slot, OptionSlot::Channel(41771983423143937));
    }

    #[test]
    fn test_typed_scalars() {
        let s = coerce_typed(&StructuredOption::new("q", OptionKind::String, Some(json!("hi"))));
        assert_eq!(s.slot, OptionSlot::String("hi".to_string()));

        let i = coerce_typed(&StructuredOption::new("n", OptionKind::Integer, Some(json!(5))));
        assert_eq!(i.slot, OptionSlot::Integer(5));

        let b = coerce_typed(&StructuredOption::new("b", OptionKind::Boolean, Some(json!(false))));
        assert_eq!(b.slot, OptionSlot::Boolean(false));
    }

    #[test]
    fn test_typed_passthrough_kinds_use_otherwise() {
        let m = coerce_typed(&StructuredOption::new(
            "who",
            OptionKind::Mentionable,
            Some(json!("80351110224678912")),
        ));
        assert_eq!(m.kind, OptionKind::Mentionable);
        assert_eq!(m.slot, OptionSlot::Otherwise(json!("80351110224678912")));
        assert_eq!(m.raw, json!("80351110224678912"));
    }

    #[test]
    fn test_typed_mismatched_value_falls_back() {
        let opt = coerce_typed(&StructuredOption::new(
            "flag",
            OptionKind::Boolean,
            Some(json!("maybe")),
        ));
        assert_eq!(opt.slot, OptionSlot::Otherwise(json!("maybe")));
    }

    #[test]
    fn test_typed_recurses_into_sub_commands() {
        let tree = StructuredOption::new("ping", OptionKind::SubCommand, None).with_options(vec![
            StructuredOption::new("0", OptionKind::Boolean, Some(json!(true))),
        ]);
        let opt = coerce_typed(&tree);
        assert_eq!(opt.slot, OptionSlot::Otherwise(Value::Null));
        assert_eq!(opt.options.len(), 1);
        assert_eq!(opt.options[0].slot, OptionSlot::Boolean(true));
    }

    #[test]
    fn test_kind_codes_round_trip() {
        for code in 1..=11 {
            assert_eq!(OptionKind::from_code(code).code(), code);
        }
        assert_eq!(OptionKind::from_code(42), OptionKind::Unknown(42));
    }
}
