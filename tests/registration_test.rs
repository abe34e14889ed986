mod common;

use chrono::{Duration, Utc};
use clubpass::{
    domain::{MembershipTier, PaymentMethod, PaymentPurpose},
    error::AppError,
    payments::ChargeStatus,
    service::EnrollRequest,
};

#[tokio::test]
async fn test_paid_registration_creates_member_and_payment() -> anyhow::Result<()> {
    let t = common::test_context().await?;
    t.gateway
        .insert_intent("pi_paid", ChargeStatus::Succeeded, 5000, "eur")
        .await;

    let mut request = common::register_request("paid@example.com");
    request.membership_type = Some(MembershipTier::Vip);
    request.payment_intent_id = Some("pi_paid".to_string());

    let member = t.ctx.registration_service.register(request).await?;

    assert_eq!(member.membership_type, MembershipTier::Vip);
    assert_eq!(member.payment_method, PaymentMethod::CreditCard);
    assert_eq!(member.transaction_id.as_deref(), Some("pi_paid"));
    assert_eq!(
        member.photo_url,
        format!("memory://user_photos/{}-selfie.png", member.id)
    );
    assert_eq!(
        member.id_photo_url,
        format!("memory://user_id_photos/{}-id.png", member.id)
    );

    let payments = t.ctx.payment_repo.find_by_member(member.id).await?;
    assert_eq!(payments.len(), 1);
    assert_eq!(payments[0].purpose, PaymentPurpose::Registration);
    assert_eq!(payments[0].amount_cents, 5000);
    assert_eq!(payments[0].transaction_id.as_deref(), Some("pi_paid"));

    assert_eq!(t.store.keys().await.len(), 2);

    Ok(())
}

#[tokio::test]
async fn test_resident_exemption_ignores_selected_tier() -> anyhow::Result<()> {
    let t = common::test_context().await?;

    let mut request = common::register_request("resident@example.com");
    request.resident_exemption = true;
    request.membership_type = Some(MembershipTier::Vip);
    request.payment_intent_id = None;

    let member = t.ctx.registration_service.register(request).await?;

    assert_eq!(member.membership_type, MembershipTier::Regular);
    assert_eq!(member.payment_method, PaymentMethod::Exempt);
    assert!(member.transaction_id.is_none());
    assert!(t.ctx.payment_repo.find_by_member(member.id).await?.is_empty());

    Ok(())
}

#[tokio::test]
async fn test_missing_photo_creates_nothing() -> anyhow::Result<()> {
    let t = common::test_context().await?;

    let mut request = common::register_request("nophoto@example.com");
    request.resident_exemption = true;
    request.selfie = None;

    let err = t.ctx.registration_service.register(request).await.unwrap_err();

    assert!(matches!(err, AppError::Validation(_)));
    assert_eq!(t.ctx.member_repo.count().await?, 0);
    assert!(t.ctx.member_repo.find_by_email("nophoto@example.com").await?.is_none());
    assert!(t.store.is_empty().await);

    Ok(())
}

#[tokio::test]
async fn test_field_validation() -> anyhow::Result<()> {
    let t = common::test_context().await?;

    let mut bad_email = common::register_request("not-an-email");
    bad_email.resident_exemption = true;
    assert!(matches!(
        t.ctx.registration_service.register(bad_email).await,
        Err(AppError::Validation(_))
    ));

    let mut mismatch = common::register_request("mismatch@example.com");
    mismatch.resident_exemption = true;
    mismatch.password_confirmation = "something else".to_string();
    match t.ctx.registration_service.register(mismatch).await {
        Err(AppError::Validation(msg)) => assert!(msg.contains("Passwords do not match")),
        other => panic!("expected validation error, got {:?}", other.map(|m| m.id)),
    }

    let mut underage = common::register_request("young@example.com");
    underage.resident_exemption = true;
    underage.date_of_birth = Some((Utc::now() - Duration::days(365 * 18)).date_naive());
    assert!(matches!(
        t.ctx.registration_service.register(underage).await,
        Err(AppError::Validation(_))
    ));

    let mut unknown_club = common::register_request("club@example.com");
    unknown_club.resident_exemption = true;
    unknown_club.club = "Somewhere Else".to_string();
    assert!(matches!(
        t.ctx.registration_service.register(unknown_club).await,
        Err(AppError::Validation(_))
    ));

    let mut no_tier = common::register_request("notier@example.com");
    no_tier.membership_type = None;
    no_tier.payment_intent_id = Some("pi_x".to_string());
    assert!(matches!(
        t.ctx.registration_service.register(no_tier).await,
        Err(AppError::Validation(_))
    ));

    let mut no_payment = common::register_request("nopay@example.com");
    no_payment.payment_intent_id = None;
    assert!(matches!(
        t.ctx.registration_service.register(no_payment).await,
        Err(AppError::Validation(_))
    ));

    let mut not_image = common::register_request("text@example.com");
    not_image.resident_exemption = true;
    not_image.id_photo = Some("data:text/plain;base64,aGVsbG8=".to_string());
    assert!(matches!(
        t.ctx.registration_service.register(not_image).await,
        Err(AppError::Validation(_))
    ));

    assert_eq!(t.ctx.member_repo.count().await?, 0);
    assert!(t.store.is_empty().await);

    Ok(())
}

#[tokio::test]
async fn test_duplicate_email_rejected() -> anyhow::Result<()> {
    let t = common::test_context().await?;

    let mut first = common::register_request("taken@example.com");
    first.resident_exemption = true;
    t.ctx.registration_service.register(first).await?;

    let mut second = common::register_request("TAKEN@example.com");
    second.resident_exemption = true;
    match t.ctx.registration_service.register(second).await {
        Err(AppError::Conflict(msg)) => assert_eq!(msg, "Email already in use"),
        other => panic!("expected conflict, got {:?}", other.map(|m| m.id)),
    }

    Ok(())
}

#[tokio::test]
async fn test_unsettled_payment_rejected_before_upload() -> anyhow::Result<()> {
    let t = common::test_context().await?;
    t.gateway
        .insert_intent("pi_pending", ChargeStatus::RequiresPaymentMethod, 2500, "eur")
        .await;

    let mut request = common::register_request("pending@example.com");
    request.payment_intent_id = Some("pi_pending".to_string());

    let err = t.ctx.registration_service.register(request).await.unwrap_err();

    assert!(matches!(err, AppError::Payment(_)));
    assert_eq!(t.ctx.member_repo.count().await?, 0);
    assert!(t.store.is_empty().await);

    Ok(())
}

#[tokio::test]
async fn test_underpaid_or_wrong_currency_rejected() -> anyhow::Result<()> {
    let t = common::test_context().await?;
    t.gateway
        .insert_intent("pi_cheap", ChargeStatus::Succeeded, 2500, "eur")
        .await;
    t.gateway
        .insert_intent("pi_usd", ChargeStatus::Succeeded, 5000, "usd")
        .await;

    let mut cheap = common::register_request("cheap@example.com");
    cheap.membership_type = Some(MembershipTier::Vip);
    cheap.payment_intent_id = Some("pi_cheap".to_string());
    assert!(matches!(
        t.ctx.registration_service.register(cheap).await,
        Err(AppError::Payment(_))
    ));

    let mut usd = common::register_request("usd@example.com");
    usd.payment_intent_id = Some("pi_usd".to_string());
    assert!(matches!(
        t.ctx.registration_service.register(usd).await,
        Err(AppError::Payment(_))
    ));

    Ok(())
}

#[tokio::test]
async fn test_payment_cannot_be_applied_twice() -> anyhow::Result<()> {
    let t = common::test_context().await?;
    t.gateway
        .insert_intent("pi_once", ChargeStatus::Succeeded, 2500, "eur")
        .await;

    let mut first = common::register_request("first@example.com");
    first.payment_intent_id = Some("pi_once".to_string());
    t.ctx.registration_service.register(first).await?;

    let mut second = common::register_request("second@example.com");
    second.payment_intent_id = Some("pi_once".to_string());
    assert!(matches!(
        t.ctx.registration_service.register(second).await,
        Err(AppError::Conflict(_))
    ));
    assert_eq!(t.ctx.member_repo.count().await?, 1);

    Ok(())
}

#[tokio::test]
async fn test_registration_without_processor_is_unavailable() -> anyhow::Result<()> {
    let pool = common::memory_pool().await?;
    let t = common::context_with_pool(pool, false)?;

    let mut request = common::register_request("noproc@example.com");
    request.payment_intent_id = Some("pi_any".to_string());
    assert!(matches!(
        t.ctx.registration_service.register(request).await,
        Err(AppError::ServiceUnavailable(_))
    ));

    // Exempt signups never touch the processor
    let mut exempt = common::register_request("exempt@example.com");
    exempt.resident_exemption = true;
    t.ctx.registration_service.register(exempt).await?;

    Ok(())
}

#[tokio::test]
async fn test_cash_enrollment() -> anyhow::Result<()> {
    let t = common::test_context().await?;
    let base = common::register_request("cash@example.com");

    let member = t
        .ctx
        .registration_service
        .enroll(EnrollRequest {
            email: base.email,
            password: base.password,
            first_name: base.first_name,
            last_name: base.last_name,
            date_of_birth: base.date_of_birth,
            place_of_birth: base.place_of_birth,
            country: base.country,
            club: base.club,
            identification_type: base.identification_type,
            identification_number: base.identification_number,
            membership_type: Some(MembershipTier::Vip),
            selfie: base.selfie,
            id_photo: base.id_photo,
        })
        .await?;

    assert_eq!(member.membership_type, MembershipTier::Vip);
    assert_eq!(member.payment_method, PaymentMethod::Cash);
    assert!(member.transaction_id.is_none());

    let payments = t.ctx.payment_repo.find_by_member(member.id).await?;
    assert_eq!(payments.len(), 1);
    assert_eq!(payments[0].purpose, PaymentPurpose::Enrollment);
    assert_eq!(payments[0].amount_cents, t.settings.membership.vip_fee_cents);
    assert_eq!(payments[0].payment_method, PaymentMethod::Cash);

    Ok(())
}
