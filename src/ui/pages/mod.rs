pub mod admin_charge;
pub mod estimate;
pub mod quotes;
pub mod settings;

pub use admin_charge::AdminChargePage;
pub use estimate::EstimatePage;
pub use quotes::QuotesPage;
pub use settings::SettingsPage;
