//! Pricing and surcharge estimator for hull cleaning and dive services.
//!
//! The desktop binary, the admin charge screen and the checkout gate all price
//! through [`domain::estimate`] and bound-check through [`domain::PriceValidator`].

pub mod domain;
pub mod infra;
pub mod util;
