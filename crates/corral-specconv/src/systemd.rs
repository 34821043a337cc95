//! Systemd unit properties carried in annotations.
//!
//! An annotation `org.systemd.property.<Name>` with a value such as
//! `uint64 123`, `456`, `2.5` or `'text'` becomes one unit property. Names
//! ending in `Sec` are seconds and are rewritten to the `USec` form systemd
//! expects.

use std::collections::BTreeMap;

use corral_common::constants::{MIN_SYSTEMD_PROPERTY_NAME_LEN, SYSTEMD_PROPERTY_PREFIX};
use corral_common::error::{CorralError, Result};
use corral_config::cgroup::{PropertyValue, SystemdProperty};

const USEC_PER_SEC: u64 = 1_000_000;

/// A parsed annotation value, before conversion to a unit property.
#[derive(Debug, Clone, PartialEq)]
pub enum AnnotationValue {
    /// `byte N`.
    U8(u8),
    /// `uint16 N`.
    U16(u16),
    /// `uint32 N`.
    U32(u32),
    /// `uint64 N`.
    U64(u64),
    /// `int16 N`.
    I16(i16),
    /// `int32 N`, and bare integers that fit.
    I32(i32),
    /// `int64 N`, and bare integers too wide for 32 bits.
    I64(i64),
    /// A bare decimal fraction.
    Double(f64),
    /// A quoted string.
    Str(String),
}

fn invalid(name: &str, message: impl Into<String>) -> CorralError {
    CorralError::InvalidSystemdProperty {
        name: name.to_string(),
        message: message.into(),
    }
}

fn parse_tagged<T: std::str::FromStr>(literal: &str) -> Option<T> {
    literal.trim().parse().ok()
}

/// A bare number: an integer if it parses as one, otherwise a finite
/// decimal. Words such as `inf` or `true` are not numbers here.
fn parse_bare(raw: &str) -> Option<AnnotationValue> {
    if let Ok(v) = raw.parse::<i32>() {
        return Some(AnnotationValue::I32(v));
    }
    if let Ok(v) = raw.parse::<i64>() {
        return Some(AnnotationValue::I64(v));
    }
    if let Ok(v) = raw.parse::<u64>() {
        return Some(AnnotationValue::U64(v));
    }
    let numeric = raw
        .chars()
        .all(|c| c.is_ascii_digit() || matches!(c, '.' | '-' | '+' | 'e' | 'E'));
    if !numeric || !raw.chars().any(|c| c.is_ascii_digit()) {
        return None;
    }
    raw.parse::<f64>()
        .ok()
        .filter(|v| v.is_finite())
        .map(AnnotationValue::Double)
}

impl AnnotationValue {
    /// Parses the textual value of a property annotation.
    ///
    /// # Errors
    ///
    /// Returns [`CorralError::InvalidSystemdProperty`] for unknown type tags,
    /// literals that do not fit their tag, and unquoted non-numeric text.
    pub fn parse(name: &str, raw: &str) -> Result<Self> {
        let raw = raw.trim();
        if raw.len() >= 2 && raw.starts_with('\'') && raw.ends_with('\'') {
            return Ok(Self::Str(raw[1..raw.len() - 1].to_string()));
        }

        if let Some((tag, literal)) = raw.split_once(' ') {
            let parsed = match tag {
                "byte" => parse_tagged(literal).map(Self::U8),
                "uint16" => parse_tagged(literal).map(Self::U16),
                "uint32" => parse_tagged(literal).map(Self::U32),
                "uint64" => parse_tagged(literal).map(Self::U64),
                "int16" => parse_tagged(literal).map(Self::I16),
                "int32" => parse_tagged(literal).map(Self::I32),
                "int64" => parse_tagged(literal).map(Self::I64),
                _ => return Err(invalid(name, format!("unknown type {tag:?} in {raw:?}"))),
            };
            return parsed.ok_or_else(|| invalid(name, format!("{literal:?} is not a valid {tag}")));
        }

        parse_bare(raw).ok_or_else(|| invalid(name, format!("unsupported value {raw:?}")))
    }

    /// Widens to an unsigned 64-bit value. Negative numbers and fractions
    /// have no such representation.
    #[must_use]
    pub fn to_u64(&self) -> Option<u64> {
        match self {
            Self::U8(v) => Some(u64::from(*v)),
            Self::U16(v) => Some(u64::from(*v)),
            Self::U32(v) => Some(u64::from(*v)),
            Self::U64(v) => Some(*v),
            Self::I16(v) => u64::try_from(*v).ok(),
            Self::I32(v) => u64::try_from(*v).ok(),
            Self::I64(v) => u64::try_from(*v).ok(),
            Self::Double(v) => {
                if v.fract() == 0.0 {
                    Self::Double(*v).scaled(1)
                } else {
                    None
                }
            }
            Self::Str(_) => None,
        }
    }

    /// Seconds to microseconds.
    #[must_use]
    pub fn to_usec(&self) -> Option<u64> {
        match self {
            Self::Double(_) => self.scaled(USEC_PER_SEC),
            other => other.to_u64()?.checked_mul(USEC_PER_SEC),
        }
    }

    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss, clippy::cast_precision_loss)]
    fn scaled(&self, factor: u64) -> Option<u64> {
        let Self::Double(v) = self else {
            return None;
        };
        let scaled = (v * factor as f64).round();
        if scaled < 0.0 || scaled >= u64::MAX as f64 {
            return None;
        }
        Some(scaled as u64)
    }
}

/// `TimeoutStopSec` style names: a lowercase letter right before `Sec`.
/// `USec`, `NSec` and a bare `Sec` do not qualify.
fn is_sec_suffix(name: &str) -> bool {
    name.strip_suffix("Sec")
        .and_then(|stem| stem.chars().next_back())
        .is_some_and(|c| c.is_ascii_lowercase())
}

fn check_name(name: &str) -> Result<()> {
    if name.len() < MIN_SYSTEMD_PROPERTY_NAME_LEN {
        return Err(invalid(name, "name is too short"));
    }
    if !name.chars().all(|c| c.is_ascii_alphabetic()) {
        return Err(invalid(name, "name must consist of ASCII letters only"));
    }
    Ok(())
}

/// Coerces one annotation into a unit property.
///
/// # Errors
///
/// Returns [`CorralError::InvalidSystemdProperty`] when the name or value
/// is unusable.
pub fn coerce_property(name: &str, raw: &str) -> Result<SystemdProperty> {
    check_name(name)?;
    let value = AnnotationValue::parse(name, raw)?;

    if is_sec_suffix(name) {
        if matches!(value, AnnotationValue::Str(_)) {
            return Err(invalid(name, "time properties need a numeric value"));
        }
        let usec = value
            .to_usec()
            .ok_or_else(|| invalid(name, format!("{raw:?} is not a valid duration")))?;
        return Ok(SystemdProperty {
            name: format!("{}USec", &name[..name.len() - "Sec".len()]),
            value: PropertyValue::Uint64(usec),
        });
    }

    let value = match value {
        AnnotationValue::Str(s) => PropertyValue::Str(s),
        numeric => PropertyValue::Uint64(
            numeric
                .to_u64()
                .ok_or_else(|| invalid(name, format!("{raw:?} is not an unsigned integer")))?,
        ),
    };
    Ok(SystemdProperty {
        name: name.to_string(),
        value,
    })
}

/// Collects the unit properties declared in `annotations`. Keys outside the
/// property prefix are ignored. Any bad property fails the whole set.
///
/// # Errors
///
/// Returns the first [`CorralError::InvalidSystemdProperty`] encountered.
pub fn init_systemd_props(annotations: &BTreeMap<String, String>) -> Result<Vec<SystemdProperty>> {
    annotations
        .iter()
        .filter_map(|(key, value)| {
            key.strip_prefix(SYSTEMD_PROPERTY_PREFIX)
                .map(|name| coerce_property(name, value))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn props(key: &str, value: &str) -> Result<Vec<SystemdProperty>> {
        init_systemd_props(&BTreeMap::from([(key.to_string(), value.to_string())]))
    }

    fn single(key: &str, value: &str) -> SystemdProperty {
        let mut out = props(key, value).unwrap();
        assert_eq!(out.len(), 1, "{key}={value}");
        out.remove(0)
    }

    #[test]
    fn tagged_usec_value_is_kept() {
        let p = single("org.systemd.property.TimeoutStopUSec", "uint64 123456789");
        assert_eq!(p.name, "TimeoutStopUSec");
        assert_eq!(p.value, PropertyValue::Uint64(123_456_789));
    }

    #[test]
    fn sec_is_converted_for_every_numeric_type() {
        let p = single("org.systemd.property.TimeoutStopSec", "456");
        assert_eq!(p.name, "TimeoutStopUSec");
        assert_eq!(p.value, PropertyValue::Uint64(456_000_000));

        for tag in ["byte", "int16", "uint16", "int32", "uint32", "int64", "uint64"] {
            let p = single("org.systemd.property.TimeoutStopSec", &format!("{tag} 234"));
            assert_eq!(p.name, "TimeoutStopUSec", "{tag}");
            assert_eq!(p.value, PropertyValue::Uint64(234_000_000), "{tag}");
        }
    }

    #[test]
    fn bare_sec_is_not_a_time_property() {
        let p = single("org.systemd.property.Sec", "5");
        assert_eq!(p.name, "Sec");
        assert_eq!(p.value, PropertyValue::Uint64(5));
    }

    #[test]
    fn uppercase_before_sec_is_not_renamed() {
        let p = single("org.systemd.property.TimeoutABSec", "5");
        assert_eq!(p.name, "TimeoutABSec");
        assert_eq!(p.value, PropertyValue::Uint64(5));
    }

    #[test]
    fn sec_fraction_is_rounded_to_microseconds() {
        let p = single("org.systemd.property.TimeoutStopSec", "234.789");
        assert_eq!(p.value, PropertyValue::Uint64(234_789_000));
    }

    #[test]
    fn sec_with_bool_fails() {
        assert!(props("org.systemd.property.TimeoutStopSec", "false").is_err());
    }

    #[test]
    fn sec_with_string_fails() {
        let msg = props("org.systemd.property.TimeoutStopSec", "'covfefe'")
            .unwrap_err()
            .to_string();
        assert!(msg.contains("TimeoutStopSec"), "got: {msg}");
    }

    #[test]
    fn quoted_string_property() {
        let p = single("org.systemd.property.CollectMode", "'inactive-or-failed'");
        assert_eq!(p.name, "CollectMode");
        assert_eq!(p.value, PropertyValue::Str("inactive-or-failed".into()));
    }

    #[test]
    fn unrelated_annotation_is_ignored() {
        assert!(props("some.other.annotation", "0").unwrap().is_empty());
    }

    #[test]
    fn short_name_fails() {
        assert!(props("org.systemd.property.Xo", "1").is_err());
    }

    #[test]
    fn non_letter_name_fails() {
        assert!(props("org.systemd.property.Number1", "1").is_err());
    }

    #[test]
    fn unquoted_word_fails() {
        assert!(props("org.systemd.property.ValidName", "invalid-value").is_err());
    }

    #[test]
    fn negative_value_fails() {
        assert!(props("org.systemd.property.CPUWeight", "int32 -5").is_err());
        assert!(props("org.systemd.property.TimeoutStopSec", "-1").is_err());
    }

    #[test]
    fn literal_out_of_tag_range_fails() {
        let msg = props("org.systemd.property.CPUWeight", "byte 300")
            .unwrap_err()
            .to_string();
        assert!(msg.contains("byte"), "got: {msg}");
    }

    #[test]
    fn unknown_tag_fails() {
        assert!(props("org.systemd.property.CPUWeight", "float 1").is_err());
    }

    #[test]
    fn bare_integer_beyond_i32_is_widened() {
        let p = single("org.systemd.property.MemoryMax", "8589934592");
        assert_eq!(p.value, PropertyValue::Uint64(8_589_934_592));
    }

    #[test]
    fn one_bad_property_fails_the_set() {
        let annotations = BTreeMap::from([
            ("org.systemd.property.CollectMode".to_string(), "'inactive-or-failed'".to_string()),
            ("org.systemd.property.Xo".to_string(), "1".to_string()),
        ]);
        assert!(init_systemd_props(&annotations).is_err());
    }

    #[test]
    fn bare_value_types() {
        assert_eq!(AnnotationValue::parse("X", "7").unwrap(), AnnotationValue::I32(7));
        assert_eq!(
            AnnotationValue::parse("X", "1.5").unwrap(),
            AnnotationValue::Double(1.5)
        );
        assert!(AnnotationValue::parse("X", "inf").is_err());
        assert!(AnnotationValue::parse("X", "NaN").is_err());
    }
}
