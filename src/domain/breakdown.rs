//! Ordered, human-readable breakdown of an estimate.

use super::entities::{EstimateNote, EstimateResult, EstimateVariant, RateType};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LineKind {
    Service,
    Base,
    Note,
    Surcharge,
    Subtotal,
    Anodes,
    Minimum,
    Total,
}

#[derive(Clone, Debug, PartialEq)]
pub struct BreakdownLine {
    pub kind: LineKind,
    pub label: String,
    pub amount: Option<f64>,
}

impl BreakdownLine {
    fn new(kind: LineKind, label: impl Into<String>, amount: Option<f64>) -> Self {
        Self {
            kind,
            label: label.into(),
            amount,
        }
    }

    pub fn render(&self) -> String {
        match (self.kind, self.amount) {
            (LineKind::Surcharge, Some(amount)) => {
                format!("  - {}: {}", self.label, format_usd(amount))
            }
            (LineKind::Note, _) => format!("  ({})", self.label),
            (_, Some(amount)) => format!("{}: {}", self.label, format_usd(amount)),
            (_, None) => self.label.clone(),
        }
    }
}

pub fn breakdown_lines(result: &EstimateResult) -> Vec<BreakdownLine> {
    let mut lines = Vec::new();

    if result.is_empty() {
        lines.push(BreakdownLine::new(
            LineKind::Service,
            "Select a service or anodes to see an estimate.",
            None,
        ));
        return lines;
    }

    lines.push(BreakdownLine::new(
        LineKind::Service,
        format!("Service: {}", result.service_name),
        None,
    ));

    if result.base_rate > 0.0 {
        let base_label = match (result.rate_type, result.boat_length_feet) {
            (RateType::PerFoot, Some(feet)) => {
                format!("Base ({}/ft x {}ft)", format_usd(result.base_rate), trim_number(feet))
            }
            _ => "Flat rate".to_string(),
        };
        lines.push(BreakdownLine::new(
            LineKind::Base,
            base_label,
            Some(result.raw_base_amount),
        ));
    }

    for note in &result.notes {
        if let EstimateNote::BaseFloored { floored, .. } = note {
            lines.push(BreakdownLine::new(
                LineKind::Note,
                format!(
                    "adjusted to {} minimum base rate; surcharges use this amount",
                    format_usd(*floored)
                ),
                None,
            ));
        }
    }

    for item in &result.surcharges {
        lines.push(BreakdownLine::new(
            LineKind::Surcharge,
            format!("{} surcharge (+{})", item.label, format_percent(item.percent)),
            Some(item.amount),
        ));
    }

    if result.has_note(|note| matches!(note, EstimateNote::FoulingNotApplicable)) {
        lines.push(BreakdownLine::new(
            LineKind::Note,
            "growth surcharge: N/A for this service",
            None,
        ));
    }

    lines.push(BreakdownLine::new(
        LineKind::Subtotal,
        "Subtotal",
        Some(result.subtotal),
    ));

    if result.anode_count > 0 {
        let each = result.anode_installation_amount / f64::from(result.anode_count);
        lines.push(BreakdownLine::new(
            LineKind::Anodes,
            format!(
                "Anode installation ({} @ {} each)",
                result.anode_count,
                format_usd(each)
            ),
            Some(result.anode_installation_amount),
        ));
    }

    for note in &result.notes {
        if let EstimateNote::MinimumApplied { minimum } = note {
            lines.push(BreakdownLine::new(
                LineKind::Minimum,
                "Applied minimum charge",
                Some(*minimum),
            ));
        }
    }

    let total_label = match result.variant {
        EstimateVariant::ClientQuote => "Total Estimate",
        EstimateVariant::Exact => "Total",
    };
    lines.push(BreakdownLine::new(
        LineKind::Total,
        total_label,
        Some(result.final_amount),
    ));

    lines
}

pub fn render_text(result: &EstimateResult) -> String {
    breakdown_lines(result)
        .iter()
        .map(BreakdownLine::render)
        .collect::<Vec<_>>()
        .join("\n")
}

/// `$1,234.50`; negatives as `-$12.00`.
pub fn format_usd(amount: f64) -> String {
    let cents = (amount.abs() * 100.0).round() as u64;
    let dollars = cents / 100;
    let digits = dollars.to_string();
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (idx, ch) in digits.chars().enumerate() {
        if idx > 0 && (digits.len() - idx) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }
    let sign = if amount < 0.0 && cents > 0 { "-" } else { "" };
    format!("{sign}${grouped}.{:02}", cents % 100)
}

/// `0.25` -> `25%`, `0.0375` -> `3.75%`.
pub fn format_percent(fraction: f64) -> String {
    let value = fraction * 100.0;
    let text = format!("{value:.2}");
    let text = text.trim_end_matches('0').trim_end_matches('.');
    format!("{text}%")
}

fn trim_number(value: f64) -> String {
    let text = format!("{value:.2}");
    text.trim_end_matches('0').trim_end_matches('.').to_string()
}
