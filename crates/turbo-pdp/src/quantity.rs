//! Quantity stepper arithmetic.

/// Which stepper control was clicked.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QuantityStep {
    Increment,
    Decrement,
}

/// `min` / `max` of a quantity input.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct QuantityBounds {
    /// Without a minimum, decrement never fires.
    pub min: Option<i64>,
    /// Without a maximum (or with `0`), increment is unbounded. Storefront
    /// templates render `max="0"` for products with no purchase limit.
    pub max: Option<i64>,
}

impl QuantityBounds {
    /// Read bounds from raw attribute values.
    pub fn from_attrs(min: Option<&str>, max: Option<&str>) -> Self {
        Self {
            min: min.and_then(parse_int),
            max: max.and_then(parse_int),
        }
    }

    fn allows_increment(&self, current: i64) -> bool {
        match self.max {
            None | Some(0) => true,
            Some(max) => current < max,
        }
    }

    fn allows_decrement(&self, current: i64) -> bool {
        self.min.is_some_and(|min| current > min)
    }
}

/// Apply one click of a stepper. Returns `current` unchanged when the
/// bound forbids the step.
pub fn step_quantity(current: i64, step: QuantityStep, bounds: QuantityBounds) -> i64 {
    match step {
        QuantityStep::Increment if bounds.allows_increment(current) => current.saturating_add(1),
        QuantityStep::Decrement if bounds.allows_decrement(current) => current.saturating_sub(1),
        _ => current,
    }
}

/// Parse a leading base-10 integer the way form controls report numbers:
/// leading whitespace and a sign are accepted, parsing stops at the first
/// non-digit, and no digits at all yields `None`.
pub fn parse_int(raw: &str) -> Option<i64> {
    let s = raw.trim_start();
    let (negative, digits) = match s.as_bytes().first() {
        Some(b'-') => (true, &s[1..]),
        Some(b'+') => (false, &s[1..]),
        _ => (false, s),
    };

    let end = digits
        .bytes()
        .position(|b| !b.is_ascii_digit())
        .unwrap_or(digits.len());
    if end == 0 {
        return None;
    }

    let magnitude: i64 = digits[..end].parse().ok()?;
    Some(if negative { -magnitude } else { magnitude })
}
