mod common;

use clubpass::{auth::AuthService, error::AppError};

fn token_from(body: &str) -> String {
    let start = body.find("token=").expect("link in body") + "token=".len();
    body[start..]
        .chars()
        .take_while(|c| c.is_ascii_hexdigit())
        .collect()
}

#[tokio::test]
async fn test_unknown_email_sends_nothing() -> anyhow::Result<()> {
    let t = common::test_context().await?;

    t.ctx.password_reset_service.request("ghost@example.com").await?;
    assert!(t.mailer.sent().await.is_empty());

    Ok(())
}

#[tokio::test]
async fn test_reset_flow() -> anyhow::Result<()> {
    let t = common::test_context().await?;
    let member =
        common::insert_member(t.ctx.member_repo.as_ref(), "reset@example.com", "Ana", "Garcia").await?;
    let (_session, session_token) = t.ctx.auth_service.create_session(member.id).await?;

    t.ctx.password_reset_service.request("reset@example.com").await?;

    let sent = t.mailer.sent().await;
    assert_eq!(sent.len(), 1);
    assert_eq!(sent[0].to, "reset@example.com");
    assert!(sent[0]
        .body
        .contains(&format!("{}/reset-password?token=", t.settings.server.base_url)));
    let token = token_from(&sent[0].body);
    assert_eq!(token.len(), 64);

    assert!(matches!(
        t.ctx.password_reset_service.confirm(&token, "short").await,
        Err(AppError::Validation(_))
    ));

    t.ctx.password_reset_service.confirm(&token, "a brand new secret").await?;

    let credentials = t.ctx.member_repo.find_credentials("reset@example.com").await?.unwrap();
    assert!(AuthService::verify_password("a brand new secret", &credentials.password_hash).await?);
    assert!(t.ctx.auth_service.validate_session(&session_token).await?.is_none());

    // Tokens work once
    assert!(matches!(
        t.ctx.password_reset_service.confirm(&token, "yet another secret").await,
        Err(AppError::BadRequest(_))
    ));

    Ok(())
}
