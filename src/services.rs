pub mod auth;
pub mod document_service;
pub mod offer_service;
pub mod pricing;
