mod common;

use std::sync::Arc;

use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use uuid::Uuid;

use clubpass::{
    domain::AccessDecision,
    repository::{AccessTokenRepository, SqliteAccessTokenRepository, SqliteMemberRepository},
    service::access_service::AccessService,
};

#[tokio::test]
async fn test_first_scan_granted_then_already_used() -> anyhow::Result<()> {
    let t = common::test_context().await?;
    let member =
        common::insert_member(t.ctx.member_repo.as_ref(), "scan@example.com", "Ana", "Garcia").await?;

    let issued = t.ctx.access_service.issue(member.id).await?;
    assert_eq!(issued.token.len(), 64);
    assert!(issued.qr_svg.contains("<svg"));
    assert!(issued.qr_data_url.starts_with("data:image/svg+xml;base64,"));

    let stored = t.ctx.access_token_repo.find_by_token(&issued.token).await?.unwrap();
    assert!(!stored.used);

    assert_eq!(t.ctx.access_service.check_token(&issued.token).await, AccessDecision::Granted);

    let stored = t.ctx.access_token_repo.find_by_token(&issued.token).await?.unwrap();
    assert!(stored.used);
    assert!(stored.used_at.is_some());

    for _ in 0..3 {
        assert_eq!(
            t.ctx.access_service.check_token(&issued.token).await,
            AccessDecision::AlreadyUsed
        );
    }

    Ok(())
}

#[tokio::test]
async fn test_unknown_token_is_invalid() -> anyhow::Result<()> {
    let t = common::test_context().await?;

    assert_eq!(t.ctx.access_service.check_token("nope").await, AccessDecision::Invalid);
    assert_eq!(t.ctx.access_service.check_token("   ").await, AccessDecision::Invalid);

    Ok(())
}

#[tokio::test]
async fn test_tokens_are_listed_per_member() -> anyhow::Result<()> {
    let t = common::test_context().await?;
    let member =
        common::insert_member(t.ctx.member_repo.as_ref(), "list@example.com", "Ana", "Garcia").await?;

    let first = t.ctx.access_service.issue(member.id).await?;
    let second = t.ctx.access_service.issue(member.id).await?;
    assert_ne!(first.token, second.token);

    let tokens = t.ctx.access_service.list(member.id).await?;
    assert_eq!(tokens.len(), 2);

    Ok(())
}

#[tokio::test]
async fn test_concurrent_scans_grant_exactly_once() -> anyhow::Result<()> {
    let path = std::env::temp_dir().join(format!("clubpass-scan-{}.db", Uuid::new_v4()));
    let options = SqliteConnectOptions::new()
        .filename(&path)
        .create_if_missing(true);
    let pool = SqlitePoolOptions::new()
        .max_connections(8)
        .connect_with(options)
        .await?;
    sqlx::migrate!("./migrations").run(&pool).await?;

    let member_repo = SqliteMemberRepository::new(pool.clone());
    let member = common::insert_member(&member_repo, "race@example.com", "Ana", "Garcia").await?;

    let token_repo = Arc::new(SqliteAccessTokenRepository::new(pool.clone()));
    let service = Arc::new(AccessService::new(token_repo));
    let issued = service.issue(member.id).await?;

    let mut handles = Vec::new();
    for _ in 0..16 {
        let service = service.clone();
        let token = issued.token.clone();
        handles.push(tokio::spawn(async move { service.check_token(&token).await }));
    }

    let mut granted = 0;
    for handle in handles {
        if handle.await? == AccessDecision::Granted {
            granted += 1;
        }
    }
    assert_eq!(granted, 1);

    pool.close().await;
    let _ = std::fs::remove_file(&path);

    Ok(())
}
