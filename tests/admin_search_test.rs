mod common;

use chrono::{Duration, Utc};
use clubpass::{
    domain::{MemberQuery, PaymentMethod},
    error::AppError,
};

#[tokio::test]
async fn test_transaction_search_is_exact() -> anyhow::Result<()> {
    let t = common::test_context().await?;
    let repo = t.ctx.member_repo.as_ref();

    for (email, tx) in [
        ("a@example.com", Some("pi_abc")),
        ("b@example.com", Some("pi_abcd")),
        ("c@example.com", None),
    ] {
        let mut member = common::new_member(email, "Test", "Member").await?;
        if let Some(tx) = tx {
            member.payment_method = PaymentMethod::CreditCard;
            member.transaction_id = Some(tx.to_string());
        }
        repo.create(member).await?;
    }

    let found = t.ctx.member_service.by_transaction_id("  pi_abc ").await?;
    assert_eq!(found.len(), 1);
    assert_eq!(found[0].email, "a@example.com");

    assert!(t.ctx.member_service.by_transaction_id("pi_ab").await?.is_empty());

    for empty in ["", "   "] {
        match t.ctx.member_service.by_transaction_id(empty).await {
            Err(AppError::Validation(msg)) => assert_eq!(msg, "Please enter a transaction ID"),
            other => panic!("expected validation error, got {:?}", other.map(|m| m.len())),
        }
    }

    Ok(())
}

#[tokio::test]
async fn test_activation_day_and_method_filters() -> anyhow::Result<()> {
    let t = common::test_context().await?;
    let repo = t.ctx.member_repo.as_ref();

    let mut yesterday = common::new_member("y@example.com", "Yolanda", "Perez").await?;
    yesterday.activated_at = Utc::now() - Duration::days(1);
    repo.create(yesterday).await?;
    common::insert_member(repo, "t@example.com", "Tomas", "Vidal").await?;

    let today = Utc::now().date_naive();
    let activated_today = t.ctx.member_service.activated_on(today).await?;
    assert_eq!(activated_today.len(), 1);
    assert_eq!(activated_today[0].email, "t@example.com");

    let cash = t.ctx.member_service.by_payment_method("cash").await?;
    assert_eq!(cash.len(), 2);
    assert!(matches!(
        t.ctx.member_service.by_payment_method("bitcoin").await,
        Err(AppError::BadRequest(_))
    ));

    let prefix = t.ctx.member_service.by_name_prefix("  YOL").await?;
    assert_eq!(prefix.len(), 1);

    let text = t.ctx.member_service.search_text("vidal").await?;
    assert_eq!(text.len(), 1);
    assert_eq!(text[0].first_name, "Tomas");

    Ok(())
}

#[tokio::test]
async fn test_text_search_folds_accented_capitals() -> anyhow::Result<()> {
    let t = common::test_context().await?;
    let repo = t.ctx.member_repo.as_ref();

    common::insert_member(repo, "angel@example.com", "Ángel", "Ñúñez").await?;
    common::insert_member(repo, "other@example.com", "Tomas", "Vidal").await?;

    for term in ["Ángel", "ángel", "ÁNGEL", "ñúñez"] {
        let found = t.ctx.member_service.search_text(term).await?;
        assert_eq!(found.len(), 1, "search for {:?}", term);
        assert_eq!(found[0].email, "angel@example.com");
    }

    let found = repo.search(&MemberQuery::Text("ángel".to_string())).await?;
    assert_eq!(found.len(), 1);

    let prefix = t.ctx.member_service.by_name_prefix("ÁNG").await?;
    assert_eq!(prefix.len(), 1);

    Ok(())
}
