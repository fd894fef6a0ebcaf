//! Admin-area behavior: tenant scoping, fee approval, staff management.

mod common;

use actix_web::http::StatusCode;
use actix_web::test;
use common::*;

#[actix_web::test]
async fn institution_admin_student_roster_is_tenant_scoped() {
    let app = init_app().await;
    let session = sign_in(&app, INSTITUTION_ADMIN_EMAIL).await;

    let body = get_json(&app, &session, "/admin/students").await;
    assert_eq!(body["count"], 3);
    assert!(
        body["students"]
            .as_array()
            .unwrap()
            .iter()
            .all(|s| s["institution_id"] == "sch-1")
    );
}

#[actix_web::test]
async fn super_admin_sees_every_student() {
    let app = init_app().await;
    let session = sign_in(&app, SUPER_ADMIN_EMAIL).await;

    let body = get_json(&app, &session, "/admin/students").await;
    assert_eq!(body["count"], 4);
}

#[actix_web::test]
async fn fee_schedule_listing_follows_tenant_scope() {
    let app = init_app().await;
    let session = sign_in(&app, INSTITUTION_ADMIN_EMAIL).await;

    let body = get_json(&app, &session, "/admin/fee-schedules").await;
    let ids: Vec<&str> = body["fee_schedules"]
        .as_array()
        .unwrap()
        .iter()
        .map(|fs| fs["id"].as_str().unwrap())
        .collect();
    assert_eq!(ids, vec!["fsch-1", "fsch-2"]);
}

#[actix_web::test]
async fn approve_fees_flag_approves_within_the_tenant() {
    let app = init_app().await;
    let session = sign_in(&app, INSTITUTION_ADMIN_EMAIL).await;

    let req = session
        .apply_mutating(test::TestRequest::post().uri("/admin/fee-schedules/fsch-1/approve"))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let body: serde_json::Value = test::read_body_json(resp).await;
    assert_eq!(body["approved_by"], "iadm-1");
}

#[actix_web::test]
async fn approval_does_not_cross_the_tenant_boundary() {
    let app = init_app().await;
    let session = sign_in(&app, INSTITUTION_ADMIN_EMAIL).await;

    // fsch-3 belongs to the other institution; the ability is scoped.
    let req = session
        .apply_mutating(test::TestRequest::post().uri("/admin/fee-schedules/fsch-3/approve"))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::FORBIDDEN);
}

#[actix_web::test]
async fn approving_twice_conflicts() {
    let app = init_app().await;
    let session = sign_in(&app, INSTITUTION_ADMIN_EMAIL).await;

    let req = session
        .apply_mutating(test::TestRequest::post().uri("/admin/fee-schedules/fsch-2/approve"))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::CONFLICT);
}

#[actix_web::test]
async fn support_reads_the_ticket_queue() {
    let app = init_app().await;
    let session = sign_in(&app, SUPPORT_EMAIL).await;

    let body = get_json(&app, &session, "/admin/support/tickets").await;
    assert_eq!(body["tickets"].as_array().unwrap().len(), 2);
}

#[actix_web::test]
async fn reports_are_scoped_per_role() {
    let app = init_app().await;

    // Institution admin: only the tenant report.
    let session = sign_in(&app, INSTITUTION_ADMIN_EMAIL).await;
    let body = get_json(&app, &session, "/admin/reports").await;
    let ids: Vec<&str> = body["reports"]
        .as_array()
        .unwrap()
        .iter()
        .map(|r| r["id"].as_str().unwrap())
        .collect();
    assert_eq!(ids, vec!["rep-1"]);

    // Finance: unscoped read, both reports.
    let session = sign_in(&app, FINANCE_EMAIL).await;
    let body = get_json(&app, &session, "/admin/reports").await;
    assert_eq!(body["reports"].as_array().unwrap().len(), 2);
}

#[actix_web::test]
async fn reconciliation_listing_respects_tenancy() {
    let app = init_app().await;

    let session = sign_in(&app, INSTITUTION_ADMIN_EMAIL).await;
    let body = get_json(&app, &session, "/admin/reconciliation").await;
    assert_eq!(body["reconciliations"].as_array().unwrap().len(), 1);
    assert_eq!(body["reconciliations"][0]["id"], "rec-1");

    let session = sign_in(&app, FINANCE_EMAIL).await;
    let body = get_json(&app, &session, "/admin/reconciliation").await;
    assert_eq!(body["reconciliations"].as_array().unwrap().len(), 2);
}

#[actix_web::test]
async fn institution_admin_reconciles_only_tenant_payments() {
    let app = init_app().await;
    let session = sign_in(&app, INSTITUTION_ADMIN_EMAIL).await;

    let req = session
        .apply_mutating(test::TestRequest::post().uri("/payments/pay-1/reconcile"))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);

    let req = session
        .apply_mutating(test::TestRequest::post().uri("/payments/pay-3/reconcile"))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::FORBIDDEN);
}

#[actix_web::test]
async fn merchant_sees_the_onboarding_queue() {
    let app = init_app().await;
    let session = sign_in(&app, MERCHANT_EMAIL).await;

    let body = get_json(&app, &session, "/admin/merchants/onboarding").await;
    assert_eq!(body["merchants"].as_array().unwrap().len(), 1);
}

#[actix_web::test]
async fn super_admin_manages_every_account() {
    let app = init_app().await;
    let session = sign_in(&app, SUPER_ADMIN_EMAIL).await;

    let body = get_json(&app, &session, "/admin/admins").await;
    assert_eq!(body["admins"].as_array().unwrap().len(), 9);
}

#[actix_web::test]
async fn support_override_extends_to_editing_user_records() {
    let app = init_app().await;

    // Plain support cannot touch another account.
    let session = sign_in(&app, SUPPORT_EMAIL).await;
    let req = session
        .apply_mutating(test::TestRequest::post().uri("/admin/users/par-1"))
        .set_json(serde_json::json!({ "name": "Edited" }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::FORBIDDEN);

    // The override flag unlocks it.
    let session = sign_in(&app, SUPPORT_LEAD_EMAIL).await;
    let req = session
        .apply_mutating(test::TestRequest::post().uri("/admin/users/par-1"))
        .set_json(serde_json::json!({ "name": "Edited" }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);
}

#[actix_web::test]
async fn self_edit_works_through_the_unlisted_admin_path_too() {
    // /admin/users/{id} is not in the route table; only the ability layer
    // guards it, and the self-profile rule lets an account edit itself.
    let app = init_app().await;
    let session = sign_in(&app, PARENT_EMAIL).await;

    let req = session
        .apply_mutating(test::TestRequest::post().uri("/admin/users/par-1"))
        .set_json(serde_json::json!({ "name": "Ngozi E." }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);

    let req = session
        .apply_mutating(test::TestRequest::post().uri("/admin/users/gua-1"))
        .set_json(serde_json::json!({ "name": "Nope" }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::FORBIDDEN);
}

#[actix_web::test]
async fn payer_fee_view_joins_assignments_and_schedules() {
    let app = init_app().await;
    let session = sign_in(&app, PARENT_EMAIL).await;

    let body = get_json(&app, &session, "/fees").await;
    let per_student = body["fees"].as_array().unwrap();
    assert_eq!(per_student.len(), 2);
    assert_eq!(per_student[0]["student"]["id"], "stu-1");
    assert_eq!(per_student[0]["schedules"][0]["id"], "fsch-1");
    assert_eq!(per_student[1]["student"]["id"], "stu-2");
    assert_eq!(per_student[1]["schedules"][0]["id"], "fsch-2");
}
