use actix_session::Session;
use actix_web::{HttpResponse, web};
use chrono::{Local, Timelike};
use serde::Deserialize;
use serde_json::json;

use crate::auth::ability::{Action, Field, SubjectFields, SubjectKind};
use crate::auth::cache::AbilityCache;
use crate::auth::session::AbilityContext;
use crate::auth::visibility;
use crate::directory::Directory;
use crate::errors::AppError;

#[derive(Deserialize)]
pub struct DashboardQuery {
    /// Path of a denied navigation, tagged by the route guard.
    pub denied: Option<String>,
}

fn time_greeting(name: &str) -> String {
    let hour = Local::now().hour();
    let period = match hour {
        5..=11 => "Good morning",
        12..=16 => "Good afternoon",
        _ => "Good evening",
    };
    format!("{period}, {name}")
}

/// Role-aware landing page: counts over what the identity may read, plus
/// action sections that appear only when the matching ability query holds.
pub async fn index(
    directory: web::Data<Directory>,
    abilities: web::Data<AbilityCache>,
    session: Session,
    query: web::Query<DashboardQuery>,
) -> Result<HttpResponse, AppError> {
    let ctx = AbilityContext::load(&session, &directory, &abilities);
    let user = ctx.require_user()?;
    let ability = &ctx.ability;

    let visible_invoices = ability.filter_accessible(Action::Read, directory.invoices().to_vec());
    let visible_payments = ability.filter_accessible(Action::Read, directory.payments().to_vec());
    let outstanding_cents: i64 = visible_invoices
        .iter()
        .filter(|inv| inv.is_payable())
        .map(|inv| inv.amount_cents)
        .sum();

    let mut sections = serde_json::Map::new();

    // Payer quick actions: only when some visible invoice is payable.
    let payable = visible_invoices
        .iter()
        .find(|inv| inv.is_payable() && ability.can(Action::Pay, *inv));
    if let Some(invoice) = payable {
        sections.insert(
            "pay_next".to_string(),
            json!({ "invoice_id": invoice.id, "reference": invoice.reference }),
        );
    }

    // Reconciliation panel. Tenant-scoped reconcilers match through the
    // overlaid institution id; cross-tenant ones match unconditionally.
    let mut payment_scope = SubjectFields::new(SubjectKind::Payment);
    if let Some(institution_id) = user.institution_id.as_deref() {
        payment_scope = payment_scope.with(Field::InstitutionId, institution_id);
    }
    let reconciliation = visibility::when(
        ability,
        Action::Reconcile,
        &payment_scope,
        || {
            let unmatched = directory
                .reconciliations()
                .iter()
                .filter(|r| !r.matched)
                .count();
            json!({ "unmatched": unmatched })
        },
    );
    if let Some(fragment) = reconciliation {
        sections.insert("reconciliation".to_string(), fragment);
    }

    // Pending fee approvals, for identities holding the approve flag.
    let pending_approvals: Vec<&str> = directory
        .fee_schedules()
        .iter()
        .filter(|fs| !fs.approved && ability.can(Action::Approve, *fs))
        .map(|fs| fs.id.as_str())
        .collect();
    if !pending_approvals.is_empty() {
        sections.insert("fee_approvals".to_string(), json!({ "pending": pending_approvals }));
    }

    let support_queue = visibility::when(
        ability,
        Action::Manage,
        &SubjectFields::new(SubjectKind::SupportTicket),
        || json!({ "open_tickets": directory.tickets().len() }),
    );
    if let Some(fragment) = support_queue {
        sections.insert("support_queue".to_string(), fragment);
    }

    Ok(HttpResponse::Ok().json(json!({
        "greeting": time_greeting(&user.name),
        "role": user.role,
        "denied": query.denied,
        "invoice_count": visible_invoices.len(),
        "payment_count": visible_payments.len(),
        "outstanding_cents": outstanding_cents,
        "sections": sections,
    })))
}
