//! Audience-specific class helpers; the classes live in `assets/main.css`.

use dive_estimator::domain::Audience;

pub fn root_class(audience: Audience) -> &'static str {
    match audience {
        Audience::Customer => "app-shell theme-customer",
        Audience::Admin => "app-shell theme-admin",
    }
}

// ============================================
// BUTTONS
// ============================================

pub fn btn_primary(audience: Audience) -> &'static str {
    match audience {
        Audience::Customer => "btn btn-primary",
        Audience::Admin => "btn btn-primary btn-admin",
    }
}

pub fn btn_ghost(_audience: Audience) -> &'static str {
    "btn btn-ghost"
}

pub fn nav_button(active: bool) -> &'static str {
    if active {
        "nav-btn active"
    } else {
        "nav-btn"
    }
}

pub fn option_button(audience: Audience, active: bool) -> &'static str {
    match (audience, active) {
        (Audience::Customer, true) => "option active",
        (Audience::Admin, true) => "option active option-admin",
        (_, false) => "option",
    }
}

// ============================================
// PANELS / TEXT
// ============================================

pub fn panel(audience: Audience) -> &'static str {
    match audience {
        Audience::Customer => "panel",
        Audience::Admin => "panel panel-admin",
    }
}

pub fn accent_text(audience: Audience) -> &'static str {
    match audience {
        Audience::Customer => "accent",
        Audience::Admin => "accent accent-admin",
    }
}

pub fn status_badge(status: dive_estimator::domain::QuoteStatus) -> &'static str {
    use dive_estimator::domain::QuoteStatus;

    match status {
        QuoteStatus::Sent => "badge badge-sent",
        QuoteStatus::Viewed => "badge badge-viewed",
        QuoteStatus::Accepted => "badge badge-accepted",
        QuoteStatus::Rejected => "badge badge-rejected",
        QuoteStatus::Expired => "badge badge-expired",
    }
}
