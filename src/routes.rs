//! Route registration, shared by the server binary and the test harness.

use actix_web::{HttpResponse, web};
use serde_json::json;

use crate::handlers::{
    admin_handlers, auth_handlers, dashboard, fee_handlers, invoice_handlers, payment_handlers,
};

pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg
        // Public routes
        .route("/login", web::get().to(auth_handlers::login_page))
        .route("/login", web::post().to(auth_handlers::login_submit))
        // Root redirect
        .route(
            "/",
            web::get().to(|| async {
                HttpResponse::SeeOther()
                    .insert_header(("Location", "/dashboard"))
                    .finish()
            }),
        )
        // Session
        .route("/logout", web::post().to(auth_handlers::logout))
        .route("/profile", web::get().to(auth_handlers::profile))
        .route("/profile", web::post().to(auth_handlers::profile_update))
        // Dashboard
        .route("/dashboard", web::get().to(dashboard::index))
        // Invoices
        .route("/invoices", web::get().to(invoice_handlers::list))
        .route("/invoices/{id}", web::get().to(invoice_handlers::detail))
        .route("/invoices/{id}/pay", web::post().to(invoice_handlers::pay))
        .route("/invoices/{id}/void", web::post().to(invoice_handlers::void))
        .route("/invoices/{id}/download", web::get().to(invoice_handlers::download))
        // Payments
        .route("/payments", web::get().to(payment_handlers::list))
        .route("/payments/export", web::get().to(payment_handlers::export))
        .route("/payments/{id}/refund", web::post().to(payment_handlers::refund))
        .route("/payments/{id}/reconcile", web::post().to(payment_handlers::reconcile))
        .route("/payment-history", web::get().to(payment_handlers::history))
        // Fees
        .route("/fees", web::get().to(fee_handlers::payer_fees))
        .route("/admin/fee-schedules", web::get().to(fee_handlers::admin_schedules))
        .route(
            "/admin/fee-schedules/{id}/approve",
            web::post().to(fee_handlers::approve_schedule),
        )
        // Admin area
        .route("/admin/students", web::get().to(admin_handlers::students))
        .route("/admin/institutions", web::get().to(admin_handlers::institutions))
        .route("/admin/support/tickets", web::get().to(admin_handlers::support_tickets))
        .route(
            "/admin/finance/transactions",
            web::get().to(admin_handlers::finance_transactions),
        )
        .route("/admin/reconciliation", web::get().to(admin_handlers::reconciliation))
        .route("/admin/merchants/onboarding", web::get().to(admin_handlers::merchants))
        .route("/admin/reports", web::get().to(admin_handlers::reports))
        .route("/admin/admins", web::get().to(admin_handlers::admins))
        .route("/admin/users/{id}", web::post().to(admin_handlers::update_user))
        // Default 404 (registered last)
        .default_service(web::to(|| async {
            HttpResponse::NotFound().json(json!({ "error": "not_found" }))
        }));
}
