use dioxus::prelude::*;
use serde::Serialize;

use dive_estimator::domain::Audience;

use crate::ui::theme;

/// Wire key of a form enum (`"powerboat"`, `"7-12_months"`).
pub fn option_key<T: Serialize>(value: &T) -> String {
    serde_json::to_value(value)
        .ok()
        .and_then(|value| value.as_str().map(str::to_string))
        .unwrap_or_default()
}

/// `(key, label)` pairs for a button group.
pub fn options_of<T: Serialize + Copy>(values: &[T], label: impl Fn(&T) -> String) -> Vec<(String, String)> {
    values
        .iter()
        .map(|value| (option_key(value), label(value)))
        .collect()
}

#[component]
pub fn OptionGroup(
    title: String,
    options: Vec<(String, String)>,
    selected: String,
    audience: Audience,
    onselect: EventHandler<String>,
) -> Element {
    let buttons: Vec<_> = options
        .into_iter()
        .map(|(key, label)| {
            let class = theme::option_button(audience, key == selected);
            (key, label, class)
        })
        .collect();

    rsx! {
        div { class: "field",
            span { class: "field-label", "{title}" }
            div { class: "option-group",
                for (key, label, class) in buttons {
                    button {
                        class: "{class}",
                        onclick: move |_| onselect.call(key.clone()),
                        "{label}"
                    }
                }
            }
        }
    }
}
