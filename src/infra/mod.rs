pub mod checkout;
pub mod quote_log;
