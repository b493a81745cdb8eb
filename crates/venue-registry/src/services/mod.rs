pub mod mailing;
pub mod shows;
