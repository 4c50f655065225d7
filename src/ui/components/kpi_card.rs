use dioxus::prelude::*;

use dive_estimator::domain::Audience;

use crate::ui::theme;

#[component]
pub fn KpiCard(title: String, value: String, description: Option<String>, audience: Audience) -> Element {
    rsx! {
        div {
            class: "{theme::panel(audience)} kpi",
            h3 { class: "field-label", "{title}" }
            p { class: "kpi-value {theme::accent_text(audience)}", "{value}" }
            if let Some(desc) = description {
                p { class: "kpi-desc muted", "{desc}" }
            }
        }
    }
}
