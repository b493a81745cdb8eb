pub mod form;
pub mod health;
pub mod mail;
pub mod shows;
pub mod uploads;
