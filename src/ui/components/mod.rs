pub mod breakdown_table;
pub mod kpi_card;
pub mod option_group;
pub mod toast;
