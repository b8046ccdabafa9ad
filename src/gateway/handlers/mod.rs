pub mod accounts;
pub mod entries;
pub mod health;
pub mod transfers;
pub mod users;
