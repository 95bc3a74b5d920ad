use std::sync::Arc;

use chrono::Utc;

use anoy_auth_types::session::{Authority, Principal};
use anoy_board::error::BoardServiceError;
use anoy_board::usecase::activity_id::CheckActivityIdUseCase;
use anoy_board::usecase::login::{LoginInput, LoginUseCase};
use anoy_board::usecase::moderation::SetStatusUseCase;
use anoy_board::usecase::signup::{SignupInput, SignupUseCase};
use anoy_board::usecase::verification::{SendCodeUseCase, VerifyCodeUseCase};
use anoy_domain::account::StatusChange;
use anoy_testing::auth::test_codec;

use crate::helpers::{MemoryStore, RecordingMailer, cheap_hashing};

#[tokio::test]
async fn should_walk_verification_signup_and_availability() {
    let store = MemoryStore::new();
    let mailer = RecordingMailer::default();

    let send = SendCodeUseCase {
        verifications: store.clone(),
        mailer: mailer.clone(),
        enabled: true,
    };
    let verify = VerifyCodeUseCase {
        verifications: store.clone(),
    };
    let signup = SignupUseCase {
        accounts: store.clone(),
        verifications: store.clone(),
        hashing: cheap_hashing(),
        verification_enabled: true,
    };
    let check = CheckActivityIdUseCase {
        accounts: store.clone(),
    };

    assert!(send.execute("a@x.com").await.unwrap());
    let code = mailer.last_code_for("a@x.com").unwrap();
    let wrong = if code == "000000" { "000001" } else { "000000" };

    let before = store.snapshot().await.verifications["a@x.com"].clone();
    assert!(!verify.execute("a@x.com", wrong).await.unwrap());
    assert_eq!(store.snapshot().await.verifications["a@x.com"], before);

    assert!(verify.execute("a@x.com", &code).await.unwrap());

    signup
        .execute(SignupInput {
            email: "a@x.com".into(),
            password: "pw".into(),
            activity_id: "Foo".into(),
        })
        .await
        .unwrap();

    let err = signup
        .execute(SignupInput {
            email: "a@x.com".into(),
            password: "pw".into(),
            activity_id: "bar".into(),
        })
        .await
        .unwrap_err();
    assert!(matches!(err, BoardServiceError::EmailAlreadyRegistered));
    assert_eq!(err.to_string(), "email already registered");

    assert!(!check.execute("FOO ").await.unwrap());
}

#[tokio::test]
async fn should_block_indefinite_suspension_until_reactivated() {
    let store = MemoryStore::new();
    let codec = Arc::new(test_codec());

    let bob = SignupUseCase {
        accounts: store.clone(),
        verifications: store.clone(),
        hashing: cheap_hashing(),
        verification_enabled: false,
    }
    .execute(SignupInput {
        email: "bob@x.com".into(),
        password: "hunter2".into(),
        activity_id: "Bob1".into(),
    })
    .await
    .unwrap();

    let admin = SetStatusUseCase {
        store: store.clone(),
    };
    let login = LoginUseCase {
        accounts: store.clone(),
        hashing: cheap_hashing(),
        codec: codec.clone(),
    };
    let creds = || LoginInput {
        email: "bob@x.com".into(),
        password: "hunter2".into(),
    };

    admin
        .execute(bob, StatusChange::Suspend { until: None })
        .await
        .unwrap();
    let err = login.execute(creds()).await.unwrap_err();
    assert!(matches!(err, BoardServiceError::AccountSuspended { until: None }));
    assert_eq!(err.to_string(), "account is suspended indefinitely");

    admin.execute(bob, StatusChange::Activate).await.unwrap();
    let out = login.execute(creds()).await.unwrap();

    let verified = codec.verify(&out.token).unwrap();
    assert_eq!(verified.activity_id.as_deref(), Some("bob1"));
    assert_eq!(verified.role.as_deref(), Some("USER"));
    assert!(verified.expires_at > Utc::now().timestamp() as u64);

    let principal = Principal::from_token(verified);
    assert!(principal.has_authority(Authority::User));
    assert!(!principal.has_authority(Authority::Admin));
}
