use dioxus::prelude::*;

use dive_estimator::domain::{format_usd, BreakdownLine, LineKind};

#[component]
pub fn BreakdownTable(lines: Vec<BreakdownLine>) -> Element {
    rsx! {
        ul { class: "breakdown",
            for line in lines {
                li { class: "{line_class(line.kind)}",
                    span { "{line.label}" }
                    if let Some(amount) = line.amount {
                        span { class: "amount", "{format_usd(amount)}" }
                    }
                }
            }
        }
    }
}

fn line_class(kind: LineKind) -> &'static str {
    match kind {
        LineKind::Service => "breakdown-line service",
        LineKind::Base | LineKind::Anodes => "breakdown-line",
        LineKind::Note => "breakdown-line note",
        LineKind::Surcharge => "breakdown-line surcharge",
        LineKind::Subtotal => "breakdown-line subtotal",
        LineKind::Minimum => "breakdown-line minimum",
        LineKind::Total => "breakdown-line total",
    }
}
