//! Number formatting for item values and axis ticks.

use super::value_objects::Notation;

const HUMAN_TIERS: [(f64, &str); 4] = [(1e12, "T"), (1e9, "B"), (1e6, "M"), (1e3, "K")];
/// Smallest magnitude the human notation prints without an exponent.
const HUMAN_PLAIN_MIN: f64 = 0.01;
const HUMAN_MAX_EXPONENT: i32 = 15;

/// Formats values in the active [`Notation`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct NumberFormatter {
    notation: Notation,
}

impl NumberFormatter {
    pub fn new(notation: Notation) -> Self {
        Self { notation }
    }

    pub fn notation(&self) -> Notation {
        self.notation
    }

    pub fn set_notation(&mut self, notation: Notation) {
        self.notation = notation;
    }

    pub fn format(&self, value: f64) -> String {
        if !value.is_finite() {
            return value.to_string();
        }
        if value == 0.0 {
            return "0".to_string();
        }
        match self.notation {
            Notation::Scientific => scientific(value),
            Notation::Mathematical => mathematical(value),
            Notation::Human => human(value),
        }
    }

    /// Label for the gridline at `10^exponent`.
    ///
    /// Built from the exponent directly so that labels stay exact where the
    /// floating-point power would not be.
    pub fn format_power_of_ten(&self, exponent: i32) -> String {
        match self.notation {
            Notation::Scientific => format!("1e{exponent}"),
            Notation::Mathematical => power_label(exponent),
            Notation::Human => {
                if (-2..HUMAN_MAX_EXPONENT).contains(&exponent) {
                    human(10f64.powi(exponent))
                } else {
                    power_label(exponent)
                }
            }
        }
    }
}

/// Splits `value` into a mantissa in `[1, 10)` rounded to two decimals and a
/// base-10 exponent.
pub fn decompose(value: f64) -> (f64, i32) {
    if value == 0.0 || !value.is_finite() {
        return (value, 0);
    }
    let mut exponent = value.abs().log10().floor() as i32;
    let mut mantissa = scale_down(value, exponent);
    mantissa = round2(mantissa);
    if mantissa.abs() >= 10.0 {
        mantissa = round2(mantissa / 10.0);
        exponent += 1;
    } else if mantissa.abs() < 1.0 {
        mantissa = round2(mantissa * 10.0);
        exponent -= 1;
    }
    (mantissa, exponent)
}

fn scale_down(value: f64, exponent: i32) -> f64 {
    // 10^-exponent overflows past ~308 decades, split the division
    if exponent < -300 {
        (value * 1e300) / 10f64.powi(exponent + 300)
    } else if exponent > 300 {
        (value / 1e300) / 10f64.powi(exponent - 300)
    } else {
        value / 10f64.powi(exponent)
    }
}

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

fn trimmed(value: f64) -> String {
    let text = format!("{value:.2}");
    let text = text.trim_end_matches('0').trim_end_matches('.');
    if text == "-0" { "0".to_string() } else { text.to_string() }
}

fn superscript(exponent: i32) -> String {
    exponent
        .to_string()
        .chars()
        .map(|ch| match ch {
            '-' => '⁻',
            '0' => '⁰',
            '1' => '¹',
            '2' => '²',
            '3' => '³',
            '4' => '⁴',
            '5' => '⁵',
            '6' => '⁶',
            '7' => '⁷',
            '8' => '⁸',
            _ => '⁹',
        })
        .collect()
}

fn power_label(exponent: i32) -> String {
    format!("10{}", superscript(exponent))
}

fn scientific(value: f64) -> String {
    let (mantissa, exponent) = decompose(value);
    format!("{}e{}", trimmed(mantissa), exponent)
}

fn mathematical(value: f64) -> String {
    let (mantissa, exponent) = decompose(value);
    if exponent == 0 {
        trimmed(mantissa)
    } else if mantissa == 1.0 {
        power_label(exponent)
    } else {
        format!("{}×{}", trimmed(mantissa), power_label(exponent))
    }
}

fn human(value: f64) -> String {
    let magnitude = value.abs();
    if round2(magnitude / 1e12) >= 1000.0 || magnitude < HUMAN_PLAIN_MIN {
        return mathematical(value);
    }
    for (divisor, suffix) in HUMAN_TIERS {
        let scaled = round2(value / divisor);
        if scaled.abs() >= 1.0 {
            return format!("{}{}", trimmed(scaled), suffix);
        }
    }
    trimmed(value)
}
