pub mod admin_handlers;
pub mod auth_handlers;
pub mod dashboard;
pub mod fee_handlers;
pub mod invoice_handlers;
pub mod payment_handlers;
