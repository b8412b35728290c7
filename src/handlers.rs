pub mod auth;
pub mod catalog;
pub mod companies;
pub mod crm;
pub mod documents;
pub mod offers;
pub mod settings;
pub mod users;
