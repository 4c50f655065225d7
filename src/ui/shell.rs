use dioxus::prelude::*;

use dive_estimator::{
    domain::{AppState, Audience},
    util::version::{version_label, APP_NAME},
};

use crate::app::{persist_user_state, Route};
use crate::ui::theme;

#[component]
pub fn Shell(children: Element) -> Element {
    let state = use_context::<Signal<AppState>>();
    let audience = state.with(|s| s.audience);
    let current_route = use_route::<Route>();
    let nav = use_navigator();

    let switch_to = move |target: Audience| {
        let mut state = state;
        state.with_mut(|s| s.audience = target);
        persist_user_state(&state);
        let landing = match target {
            Audience::Customer => Route::Estimate {},
            Audience::Admin => Route::Admin {},
        };
        nav.push(landing);
    };

    let tagline = match audience {
        Audience::Customer => "Instant estimate for your hull",
        Audience::Admin => "Charge what the diver saw",
    };

    rsx! {
        div { class: "{theme::root_class(audience)}",
            header { class: "app-header",
                div { class: "brand",
                    span { class: "brand-icon", "{audience.emoji()}" }
                    div {
                        h1 { "{APP_NAME}" }
                        p { class: "muted", "{tagline}" }
                    }
                }

                div { class: "audience-switch",
                    for target in [Audience::Customer, Audience::Admin] {
                        button {
                            class: "{theme::option_button(audience, audience == target)}",
                            onclick: move |_| switch_to(target),
                            "{target.emoji()} {target.name()}"
                        }
                    }
                }

                nav { class: "nav",
                    match audience {
                        Audience::Customer => rsx! {
                            NavButton { active: matches!(current_route, Route::Estimate {}), onclick: move |_| { nav.push(Route::Estimate {}); }, label: "Estimate" }
                            NavButton { active: matches!(current_route, Route::Quotes {}), onclick: move |_| { nav.push(Route::Quotes {}); }, label: "My quotes" }
                        },
                        Audience::Admin => rsx! {
                            NavButton { active: matches!(current_route, Route::Admin {}), onclick: move |_| { nav.push(Route::Admin {}); }, label: "Charge" }
                            NavButton { active: matches!(current_route, Route::Estimate {}), onclick: move |_| { nav.push(Route::Estimate {}); }, label: "Calculator" }
                            NavButton { active: matches!(current_route, Route::Quotes {}), onclick: move |_| { nav.push(Route::Quotes {}); }, label: "Quotes" }
                        },
                    }
                    NavButton { active: matches!(current_route, Route::Settings {}), onclick: move |_| { nav.push(Route::Settings {}); }, label: "⚙️" }
                }
            }
            main { class: "app-main",
                {children}
            }
            footer { class: "app-footer muted", "{version_label()}" }
        }
    }
}

#[component]
fn NavButton(active: bool, onclick: EventHandler<()>, label: &'static str) -> Element {
    rsx! {
        button {
            class: "{theme::nav_button(active)}",
            onclick: move |_| onclick.call(()),
            "{label}"
        }
    }
}
