mod common;

use clubpass::{
    domain::{one_year_after, MembershipTier, PaymentPurpose},
    error::AppError,
    payments::ChargeStatus,
};

#[tokio::test]
async fn test_succeeded_charge_upgrades_to_vip() -> anyhow::Result<()> {
    let t = common::test_context().await?;
    let member =
        common::insert_member(t.ctx.member_repo.as_ref(), "up@example.com", "Ana", "Garcia").await?;

    let handle = t.ctx.payment_service.create_upgrade_intent(member.id).await?;
    assert_eq!(handle.amount_cents, t.settings.membership.upgrade_fee_cents);
    let intent = t.gateway.intent(&handle.payment_intent_id).await.unwrap();
    assert_eq!(intent.metadata.get("member_id"), Some(&member.id.to_string()));

    // Client confirms the charge
    assert!(t.gateway.set_status(&handle.payment_intent_id, ChargeStatus::Succeeded).await);

    let upgraded = t
        .ctx
        .member_service
        .upgrade(member.id, &handle.payment_intent_id)
        .await?;

    assert_eq!(upgraded.membership_type, MembershipTier::Vip);
    let upgraded_at = upgraded.upgraded_at.expect("upgrade date is set");
    assert_eq!(upgraded.expires_at, one_year_after(upgraded_at));

    let payments = t.ctx.payment_repo.find_by_member(member.id).await?;
    assert_eq!(payments.len(), 1);
    assert_eq!(payments[0].purpose, PaymentPurpose::Upgrade);
    assert_eq!(payments[0].transaction_id.as_deref(), Some(handle.payment_intent_id.as_str()));

    Ok(())
}

#[tokio::test]
async fn test_declined_charge_leaves_member_unchanged() -> anyhow::Result<()> {
    let t = common::test_context().await?;
    let member =
        common::insert_member(t.ctx.member_repo.as_ref(), "declined@example.com", "Ana", "Garcia").await?;
    t.gateway
        .insert_intent("pi_declined", ChargeStatus::Canceled, 2500, "eur")
        .await;

    let err = t
        .ctx
        .member_service
        .upgrade(member.id, "pi_declined")
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::Payment(_)));

    let after = t.ctx.member_service.get(member.id).await?;
    assert_eq!(after.membership_type, MembershipTier::Regular);
    assert!(after.upgraded_at.is_none());
    assert_eq!(after.expires_at, member.expires_at);
    assert!(t.ctx.payment_repo.find_by_member(member.id).await?.is_empty());

    Ok(())
}

#[tokio::test]
async fn test_vip_member_cannot_upgrade_again() -> anyhow::Result<()> {
    let t = common::test_context().await?;
    let mut new_member = common::new_member("vip@example.com", "Ana", "Garcia").await?;
    new_member.membership_type = MembershipTier::Vip;
    let member = t.ctx.member_repo.create(new_member).await?;

    t.gateway
        .insert_intent("pi_vip", ChargeStatus::Succeeded, 2500, "eur")
        .await;

    assert!(matches!(
        t.ctx.member_service.upgrade(member.id, "pi_vip").await,
        Err(AppError::BadRequest(_))
    ));

    Ok(())
}

#[tokio::test]
async fn test_upgrade_payment_is_single_use() -> anyhow::Result<()> {
    let t = common::test_context().await?;
    let first =
        common::insert_member(t.ctx.member_repo.as_ref(), "one@example.com", "Ana", "Garcia").await?;
    let second =
        common::insert_member(t.ctx.member_repo.as_ref(), "two@example.com", "Bea", "Lopez").await?;

    let handle = t.ctx.payment_service.create_upgrade_intent(first.id).await?;
    t.gateway.set_status(&handle.payment_intent_id, ChargeStatus::Succeeded).await;

    t.ctx.member_service.upgrade(first.id, &handle.payment_intent_id).await?;

    // Retrying with the same charge is refused
    assert!(matches!(
        t.ctx.member_service.upgrade(second.id, &handle.payment_intent_id).await,
        Err(AppError::Conflict(_))
    ));
    let second = t.ctx.member_service.get(second.id).await?;
    assert_eq!(second.membership_type, MembershipTier::Regular);

    Ok(())
}

#[tokio::test]
async fn test_upgrade_charge_belongs_to_its_member() -> anyhow::Result<()> {
    let t = common::test_context().await?;
    let payer =
        common::insert_member(t.ctx.member_repo.as_ref(), "payer@example.com", "Ana", "Garcia").await?;
    let other =
        common::insert_member(t.ctx.member_repo.as_ref(), "other@example.com", "Bea", "Lopez").await?;

    let handle = t.ctx.payment_service.create_upgrade_intent(payer.id).await?;
    t.gateway.set_status(&handle.payment_intent_id, ChargeStatus::Succeeded).await;

    match t.ctx.member_service.upgrade(other.id, &handle.payment_intent_id).await {
        Err(AppError::Payment(msg)) => assert_eq!(msg, "This payment was not made for your upgrade"),
        other => panic!("expected payment error, got {:?}", other.map(|m| m.membership_type)),
    }
    let other = t.ctx.member_service.get(other.id).await?;
    assert_eq!(other.membership_type, MembershipTier::Regular);
    assert!(t.ctx.payment_repo.find_by_member(other.id).await?.is_empty());

    // A settled charge without upgrade metadata is refused as well
    t.gateway
        .insert_intent("pi_untagged", ChargeStatus::Succeeded, 2500, "eur")
        .await;
    assert!(matches!(
        t.ctx.member_service.upgrade(payer.id, "pi_untagged").await,
        Err(AppError::Payment(_))
    ));

    // The payer can still redeem it
    let upgraded = t.ctx.member_service.upgrade(payer.id, &handle.payment_intent_id).await?;
    assert_eq!(upgraded.membership_type, MembershipTier::Vip);

    Ok(())
}
