//! Credential store tests

use backend_im::authn::token::{delete_token, load_token, save_token, Token};
use backend_im::errors::CliError;
use backend_im::storage::layout::StorageLayout;
use tokio_test::{assert_err, assert_ok};

#[tokio::test]
async fn test_token_round_trip() {
    let dir = tempfile::tempdir().unwrap();
    let layout = StorageLayout::new(dir.path().join(".backend-im"));

    save_token(&layout, &Token::bearer("mock_token_1234", 3600))
        .await
        .unwrap();
    let token = load_token(&layout).await.unwrap();

    assert_eq!(token.expose(), "mock_token_1234");
    assert_eq!(token.token_type, "Bearer");
    assert_eq!(token.expires_in, 3600);
    assert_eq!(token.authorization(), "Bearer mock_token_1234");
}

#[cfg(unix)]
#[tokio::test]
async fn test_token_file_is_private() {
    use std::os::unix::fs::PermissionsExt;

    let dir = tempfile::tempdir().unwrap();
    let layout = StorageLayout::new(dir.path().join(".backend-im"));
    save_token(&layout, &Token::bearer("secret", 60)).await.unwrap();

    let file_mode = std::fs::metadata(layout.token_file().path())
        .unwrap()
        .permissions()
        .mode();
    assert_eq!(file_mode & 0o777, 0o600);

    let dir_mode = std::fs::metadata(layout.config_dir().path())
        .unwrap()
        .permissions()
        .mode();
    assert_eq!(dir_mode & 0o777, 0o700);
}

#[tokio::test]
async fn test_missing_token_asks_for_login() {
    let dir = tempfile::tempdir().unwrap();
    let layout = StorageLayout::new(dir.path().join(".backend-im"));

    match load_token(&layout).await {
        Err(CliError::AuthError(message)) => assert!(message.contains("backend-im login")),
        other => panic!("expected an auth error, got {:?}", other),
    }
}

#[tokio::test]
async fn test_delete_token() {
    let dir = tempfile::tempdir().unwrap();
    let layout = StorageLayout::new(dir.path().join(".backend-im"));

    assert_ok!(delete_token(&layout).await);
    assert_ok!(save_token(&layout, &Token::bearer("t", 60)).await);
    assert_ok!(delete_token(&layout).await);

    assert!(!layout.token_file().exists().await);
    assert_err!(load_token(&layout).await);
}

#[tokio::test]
async fn test_corrupt_token_file() {
    let dir = tempfile::tempdir().unwrap();
    let layout = StorageLayout::new(dir.path().join(".backend-im"));
    layout.token_file().write_string("not json").await.unwrap();

    assert!(matches!(
        load_token(&layout).await,
        Err(CliError::AuthError(_))
    ));
}
