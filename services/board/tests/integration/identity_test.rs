use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};

use anoy_auth_types::token::TokenCodec;
use anoy_board::domain::repository::{AccountRepository, VerificationRepository};
use anoy_board::domain::types::{Account, NewAccount, VerificationRecord};
use anoy_board::error::BoardServiceError;
use anoy_board::usecase::account::{GetMeUseCase, UpdateActivityIdUseCase};
use anoy_board::usecase::activity_id::CheckActivityIdUseCase;
use anoy_board::usecase::login::{LoginInput, LoginUseCase};
use anoy_board::usecase::signup::{SignupInput, SignupUseCase};
use anoy_board::usecase::verification::{
    SendCodeUseCase, VERIFICATION_MAIL_SUBJECT, VerifyCodeUseCase,
};
use anoy_domain::account::{AccountStatus, Lifecycle, Role, StatusChange};
use anoy_domain::pagination::{Page, PageRequest};
use anoy_testing::auth::test_codec;

use crate::helpers::{MemoryStore, RecordingMailer, cheap_hashing};

fn signup_usecase(store: &MemoryStore, verification: bool) -> SignupUseCase<MemoryStore, MemoryStore> {
    SignupUseCase {
        accounts: store.clone(),
        verifications: store.clone(),
        hashing: cheap_hashing(),
        verification_enabled: verification,
    }
}

fn login_usecase(store: &MemoryStore, codec: Arc<TokenCodec>) -> LoginUseCase<MemoryStore> {
    LoginUseCase {
        accounts: store.clone(),
        hashing: cheap_hashing(),
        codec,
    }
}

fn input(email: &str, password: &str, activity_id: &str) -> SignupInput {
    SignupInput {
        email: email.to_owned(),
        password: password.to_owned(),
        activity_id: activity_id.to_owned(),
    }
}

fn login_input(email: &str, password: &str) -> LoginInput {
    LoginInput {
        email: email.to_owned(),
        password: password.to_owned(),
    }
}

async fn signed_up(store: &MemoryStore, email: &str, activity_id: &str) -> i64 {
    signup_usecase(store, false)
        .execute(input(email, "pw", activity_id))
        .await
        .unwrap()
}

// ── CheckActivityId ──────────────────────────────────────────────────────────

#[tokio::test]
async fn should_flip_availability_after_signup() {
    let store = MemoryStore::new();
    let check = CheckActivityIdUseCase {
        accounts: store.clone(),
    };

    assert!(check.execute("Neo").await.unwrap());
    signed_up(&store, "neo@x.com", "Neo").await;
    assert!(!check.execute("neo").await.unwrap());
    assert!(!check.execute("  NEO ").await.unwrap());
}

#[tokio::test]
async fn should_report_blank_and_overlong_ids_unavailable() {
    let check = CheckActivityIdUseCase {
        accounts: MemoryStore::new(),
    };
    assert!(!check.execute("").await.unwrap());
    assert!(!check.execute("   ").await.unwrap());
    assert!(!check.execute(&"a".repeat(65)).await.unwrap());
    assert!(check.execute(&"a".repeat(64)).await.unwrap());
}

// ── SendCode / VerifyCode ────────────────────────────────────────────────────

#[tokio::test]
async fn should_mail_code_and_store_normalized_record() {
    let store = MemoryStore::new();
    let mailer = RecordingMailer::default();
    let usecase = SendCodeUseCase {
        verifications: store.clone(),
        mailer: mailer.clone(),
        enabled: true,
    };

    assert!(usecase.execute("  A@X.com ").await.unwrap());

    let sent = mailer.sent.lock().unwrap().clone();
    assert_eq!(sent.len(), 1);
    assert_eq!(sent[0].to, "a@x.com");
    assert_eq!(sent[0].subject, VERIFICATION_MAIL_SUBJECT);

    let record = store.snapshot().await.verifications["a@x.com"].clone();
    assert_eq!(Some(record.code.clone()), mailer.last_code_for("a@x.com"));
    assert_eq!(record.verified_at, None);
    assert!(record.expires_at > Utc::now() + Duration::minutes(59));
}

#[tokio::test]
async fn should_overwrite_previous_code_on_resend() {
    let store = MemoryStore::new();
    let mut old = VerificationRecord::issue("a@x.com".into(), "999999".into(), Utc::now());
    old.verified_at = Some(Utc::now());
    store.put_verification(old).await;

    let usecase = SendCodeUseCase {
        verifications: store.clone(),
        mailer: RecordingMailer::default(),
        enabled: true,
    };
    usecase.execute("a@x.com").await.unwrap();

    let tables = store.snapshot().await;
    assert_eq!(tables.verifications.len(), 1);
    assert_eq!(tables.verifications["a@x.com"].verified_at, None);
}

#[tokio::test]
async fn should_skip_sending_when_verification_disabled() {
    let store = MemoryStore::new();
    let mailer = RecordingMailer::default();
    let usecase = SendCodeUseCase {
        verifications: store.clone(),
        mailer: mailer.clone(),
        enabled: false,
    };

    assert!(!usecase.execute("a@x.com").await.unwrap());
    assert!(mailer.sent.lock().unwrap().is_empty());
    assert!(store.snapshot().await.verifications.is_empty());
}

#[tokio::test]
async fn should_surface_mail_failure() {
    let store = MemoryStore::new();
    let usecase = SendCodeUseCase {
        verifications: store.clone(),
        mailer: RecordingMailer::failing(),
        enabled: true,
    };

    let err = usecase.execute("a@x.com").await.unwrap_err();
    assert!(matches!(err, BoardServiceError::MailDelivery(_)));
}

#[tokio::test]
async fn should_reject_blank_email_for_send_code() {
    let usecase = SendCodeUseCase {
        verifications: MemoryStore::new(),
        mailer: RecordingMailer::default(),
        enabled: true,
    };
    let err = usecase.execute("   ").await.unwrap_err();
    assert!(matches!(err, BoardServiceError::InvalidInput(_)));
}

#[tokio::test]
async fn should_verify_only_exact_unexpired_code() {
    let store = MemoryStore::new();
    store
        .put_verification(VerificationRecord::issue(
            "a@x.com".into(),
            "012345".into(),
            Utc::now(),
        ))
        .await;
    let verify = VerifyCodeUseCase {
        verifications: store.clone(),
    };

    assert!(!verify.execute("a@x.com", "12345").await.unwrap());
    assert!(!verify.execute("a@x.com", "").await.unwrap());
    assert!(!verify.execute("b@x.com", "012345").await.unwrap());
    assert_eq!(store.snapshot().await.verifications["a@x.com"].verified_at, None);

    assert!(verify.execute(" A@x.com", " 012345 ").await.unwrap());
    assert!(store.snapshot().await.verifications["a@x.com"].verified_at.is_some());
}

#[tokio::test]
async fn should_reject_expired_code() {
    let store = MemoryStore::new();
    store
        .put_verification(VerificationRecord::issue(
            "a@x.com".into(),
            "012345".into(),
            Utc::now() - Duration::hours(2),
        ))
        .await;
    let verify = VerifyCodeUseCase {
        verifications: store.clone(),
    };

    assert!(!verify.execute("a@x.com", "012345").await.unwrap());
    assert_eq!(store.snapshot().await.verifications["a@x.com"].verified_at, None);
}

/// Hands back the record it read, then lets a resend overwrite it before the
/// caller gets to write.
struct ResendAfterRead {
    store: MemoryStore,
}

impl VerificationRepository for ResendAfterRead {
    async fn find(&self, email: &str) -> Result<Option<VerificationRecord>, BoardServiceError> {
        let seen = self.store.find(email).await?;
        self.store
            .upsert(&VerificationRecord::issue(
                email.to_owned(),
                "999999".into(),
                Utc::now(),
            ))
            .await?;
        Ok(seen)
    }

    async fn upsert(&self, record: &VerificationRecord) -> Result<(), BoardServiceError> {
        self.store.upsert(record).await
    }

    async fn mark_verified(
        &self,
        email: &str,
        code: &str,
        at: DateTime<Utc>,
    ) -> Result<bool, BoardServiceError> {
        self.store.mark_verified(email, code, at).await
    }
}

#[tokio::test]
async fn should_not_verify_code_replaced_by_resend() {
    let store = MemoryStore::new();
    store
        .put_verification(VerificationRecord::issue(
            "a@x.com".into(),
            "111111".into(),
            Utc::now(),
        ))
        .await;
    let verify = VerifyCodeUseCase {
        verifications: ResendAfterRead {
            store: store.clone(),
        },
    };

    assert!(!verify.execute("a@x.com", "111111").await.unwrap());

    let record = store.snapshot().await.verifications["a@x.com"].clone();
    assert_eq!(record.code, "999999");
    assert_eq!(record.verified_at, None);
}

// ── Signup ───────────────────────────────────────────────────────────────────

#[tokio::test]
async fn should_store_normalized_account_with_hashed_password() {
    let store = MemoryStore::new();
    let id = signup_usecase(&store, false)
        .execute(input("  Foo@X.COM ", "s3cret", " Foo "))
        .await
        .unwrap();

    let account = store.account(id).await;
    assert_eq!(account.email, "foo@x.com");
    assert_eq!(account.activity_id, "foo");
    assert_eq!(account.role, Role::User);
    assert_eq!(account.lifecycle, Lifecycle::active());
    assert_ne!(account.password_hash, "s3cret");
    assert!(account.password_hash.starts_with("$argon2id$"));
}

#[tokio::test]
async fn should_reject_duplicate_email_in_any_case() {
    let store = MemoryStore::new();
    signed_up(&store, "a@x.com", "first").await;

    let err = signup_usecase(&store, false)
        .execute(input("A@X.com", "pw", "second"))
        .await
        .unwrap_err();
    assert!(matches!(err, BoardServiceError::EmailAlreadyRegistered));
}

#[tokio::test]
async fn should_reject_duplicate_activity_id_in_any_case() {
    let store = MemoryStore::new();
    signed_up(&store, "a@x.com", "Taken").await;

    let err = signup_usecase(&store, false)
        .execute(input("b@x.com", "pw", " TAKEN"))
        .await
        .unwrap_err();
    assert!(matches!(err, BoardServiceError::ActivityIdTaken));
}

#[tokio::test]
async fn should_validate_signup_fields() {
    let store = MemoryStore::new();
    let usecase = signup_usecase(&store, false);

    let err = usecase.execute(input("", "pw", "foo")).await.unwrap_err();
    assert!(matches!(err, BoardServiceError::InvalidInput(_)));

    let err = usecase.execute(input("a@x.com", "pw", "  ")).await.unwrap_err();
    assert!(matches!(err, BoardServiceError::InvalidActivityId(_)));

    let err = usecase
        .execute(input("a@x.com", "pw", &"x".repeat(65)))
        .await
        .unwrap_err();
    assert!(matches!(err, BoardServiceError::InvalidActivityId(_)));

    let err = usecase.execute(input("a@x.com", "", "foo")).await.unwrap_err();
    assert!(matches!(err, BoardServiceError::InvalidInput(_)));

    assert!(store.snapshot().await.accounts.is_empty());
}

#[tokio::test]
async fn should_require_verified_email_when_enabled() {
    let store = MemoryStore::new();
    let usecase = signup_usecase(&store, true);

    let err = usecase.execute(input("a@x.com", "pw", "foo")).await.unwrap_err();
    assert!(matches!(err, BoardServiceError::VerificationRequired));

    store
        .put_verification(VerificationRecord::issue(
            "a@x.com".into(),
            "012345".into(),
            Utc::now(),
        ))
        .await;
    let err = usecase.execute(input("a@x.com", "pw", "foo")).await.unwrap_err();
    assert!(matches!(err, BoardServiceError::VerificationRequired));
}

#[tokio::test]
async fn should_reject_stale_verification() {
    let store = MemoryStore::new();
    let mut record = VerificationRecord::issue(
        "a@x.com".into(),
        "012345".into(),
        Utc::now() - Duration::hours(3),
    );
    record.verified_at = Some(Utc::now() - Duration::hours(2));
    store.put_verification(record).await;

    let err = signup_usecase(&store, true)
        .execute(input("a@x.com", "pw", "foo"))
        .await
        .unwrap_err();
    assert!(matches!(err, BoardServiceError::VerificationExpired));
}

#[tokio::test]
async fn should_consume_verification_on_signup() {
    let store = MemoryStore::new();
    let mut record = VerificationRecord::issue("a@x.com".into(), "012345".into(), Utc::now());
    record.verified_at = Some(Utc::now());
    store.put_verification(record).await;

    signup_usecase(&store, true)
        .execute(input("a@x.com", "pw", "foo"))
        .await
        .unwrap();

    assert!(store.snapshot().await.verifications.is_empty());
}

#[tokio::test]
async fn should_admit_exactly_one_of_concurrent_signups_for_same_activity_id() {
    let store = MemoryStore::new();
    let a = signup_usecase(&store, false);
    let b = signup_usecase(&store, false);

    let (ra, rb) = tokio::join!(
        a.execute(input("a@x.com", "pw", "race")),
        b.execute(input("b@x.com", "pw", "RACE")),
    );

    let oks = [&ra, &rb].iter().filter(|r| r.is_ok()).count();
    assert_eq!(oks, 1);
    let loser = if ra.is_err() { ra } else { rb };
    assert!(matches!(loser, Err(BoardServiceError::ActivityIdTaken)));
    assert_eq!(store.snapshot().await.accounts.len(), 1);
}

// ── Login ────────────────────────────────────────────────────────────────────

#[tokio::test]
async fn should_issue_token_carrying_activity_id_and_role() {
    let store = MemoryStore::new();
    let codec = Arc::new(test_codec());
    signed_up(&store, "a@x.com", "Foo").await;

    let out = login_usecase(&store, codec.clone())
        .execute(login_input(" A@x.com", "pw"))
        .await
        .unwrap();
    assert_eq!(out.activity_id, "foo");
    assert_eq!(out.role, Role::User);

    let verified = codec.verify(&out.token).unwrap();
    assert_eq!(verified.subject, "a@x.com");
    assert_eq!(verified.activity_id.as_deref(), Some("foo"));
    assert_eq!(verified.role.as_deref(), Some("USER"));
    assert_eq!(verified.expires_at, out.expires_at);
}

#[tokio::test]
async fn should_distinguish_unknown_email_from_wrong_password_internally() {
    let store = MemoryStore::new();
    signed_up(&store, "a@x.com", "foo").await;
    let usecase = login_usecase(&store, Arc::new(test_codec()));

    let err = usecase.execute(login_input("nobody@x.com", "pw")).await.unwrap_err();
    assert!(matches!(err, BoardServiceError::AccountNotFound));

    let err = usecase.execute(login_input("a@x.com", "nope")).await.unwrap_err();
    assert!(matches!(err, BoardServiceError::BadCredentials));
}

#[tokio::test]
async fn should_pay_hash_cost_for_unknown_email() {
    let store = MemoryStore::new();
    let hashing = cheap_hashing();
    let usecase = LoginUseCase {
        accounts: store.clone(),
        hashing: hashing.clone(),
        codec: Arc::new(test_codec()),
    };
    assert!(!hashing.dummy_ready());

    let err = usecase.execute(login_input("nobody@x.com", "pw")).await.unwrap_err();
    assert!(matches!(err, BoardServiceError::AccountNotFound));
    assert_eq!(err.kind(), "INVALID_CREDENTIALS");
    assert!(hashing.dummy_ready());
}

/// Account store where an admin removes the account right before login's
/// reactivation write lands.
struct DeletedBeforeReactivate {
    store: MemoryStore,
}

impl AccountRepository for DeletedBeforeReactivate {
    async fn find_by_email(&self, email: &str) -> Result<Option<Account>, BoardServiceError> {
        self.store.find_by_email(email).await
    }

    async fn find_by_id(&self, id: i64) -> Result<Option<Account>, BoardServiceError> {
        self.store.find_by_id(id).await
    }

    async fn activity_id_exists(&self, activity_id: &str) -> Result<bool, BoardServiceError> {
        self.store.activity_id_exists(activity_id).await
    }

    async fn create(
        &self,
        account: &NewAccount,
        consume_verification: bool,
    ) -> Result<Account, BoardServiceError> {
        self.store.create(account, consume_verification).await
    }

    async fn reactivate(&self, id: i64, now: DateTime<Utc>) -> Result<bool, BoardServiceError> {
        if let Some(a) = self.store.tables.lock().await.accounts.get_mut(&id) {
            a.lifecycle = a.lifecycle.apply(StatusChange::Delete, now);
        }
        self.store.reactivate(id, now).await
    }

    async fn update_activity_id(
        &self,
        id: i64,
        activity_id: &str,
    ) -> Result<(), BoardServiceError> {
        self.store.update_activity_id(id, activity_id).await
    }

    async fn update_role(&self, id: i64, role: Role) -> Result<bool, BoardServiceError> {
        self.store.update_role(id, role).await
    }

    async fn search(
        &self,
        query: Option<&str>,
        page: PageRequest,
    ) -> Result<Page<Account>, BoardServiceError> {
        self.store.search(query, page).await
    }
}

#[tokio::test]
async fn should_refuse_token_when_account_deleted_during_reactivation() {
    let store = MemoryStore::new();
    let id = signed_up(&store, "a@x.com", "foo").await;
    store.tables.lock().await.accounts.get_mut(&id).unwrap().lifecycle = Lifecycle {
        status: AccountStatus::Suspended,
        suspended_until: Some(Utc::now() - Duration::minutes(1)),
        deleted_at: None,
    };
    let usecase = LoginUseCase {
        accounts: DeletedBeforeReactivate {
            store: store.clone(),
        },
        hashing: cheap_hashing(),
        codec: Arc::new(test_codec()),
    };

    let err = usecase.execute(login_input("a@x.com", "pw")).await.unwrap_err();
    assert!(matches!(err, BoardServiceError::AccountDeleted));
    assert_eq!(store.account(id).await.lifecycle.status, AccountStatus::Deleted);
}

#[tokio::test]
async fn should_never_admit_deleted_account() {
    let store = MemoryStore::new();
    let id = signed_up(&store, "a@x.com", "foo").await;
    store.tables.lock().await.accounts.get_mut(&id).unwrap().lifecycle =
        Lifecycle::active().apply(StatusChange::Delete, Utc::now());
    let usecase = login_usecase(&store, Arc::new(test_codec()));

    let err = usecase.execute(login_input("a@x.com", "pw")).await.unwrap_err();
    assert!(matches!(err, BoardServiceError::AccountDeleted));

    // Wrong password still reads as bad credentials; status stays hidden.
    let err = usecase.execute(login_input("a@x.com", "bad")).await.unwrap_err();
    assert!(matches!(err, BoardServiceError::BadCredentials));
}

#[tokio::test]
async fn should_reject_active_suspension_with_its_end() {
    let store = MemoryStore::new();
    let id = signed_up(&store, "a@x.com", "foo").await;
    let until = Utc::now() + Duration::days(3);
    store.tables.lock().await.accounts.get_mut(&id).unwrap().lifecycle = Lifecycle {
        status: AccountStatus::Suspended,
        suspended_until: Some(until),
        deleted_at: None,
    };

    let err = login_usecase(&store, Arc::new(test_codec()))
        .execute(login_input("a@x.com", "pw"))
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        BoardServiceError::AccountSuspended { until: Some(u) } if u == until
    ));
    assert_eq!(store.account(id).await.lifecycle.status, AccountStatus::Suspended);
}

#[tokio::test]
async fn should_reactivate_lapsed_suspension_on_login() {
    let store = MemoryStore::new();
    let id = signed_up(&store, "a@x.com", "foo").await;
    store.tables.lock().await.accounts.get_mut(&id).unwrap().lifecycle = Lifecycle {
        status: AccountStatus::Suspended,
        suspended_until: Some(Utc::now() - Duration::minutes(1)),
        deleted_at: None,
    };

    login_usecase(&store, Arc::new(test_codec()))
        .execute(login_input("a@x.com", "pw"))
        .await
        .unwrap();

    let account = store.account(id).await;
    assert_eq!(account.lifecycle.status, AccountStatus::Active);
    assert_eq!(account.lifecycle.suspended_until, None);
}

#[tokio::test]
async fn should_leave_lapsed_suspension_alone_on_wrong_password() {
    let store = MemoryStore::new();
    let id = signed_up(&store, "a@x.com", "foo").await;
    store.tables.lock().await.accounts.get_mut(&id).unwrap().lifecycle = Lifecycle {
        status: AccountStatus::Suspended,
        suspended_until: Some(Utc::now() - Duration::minutes(1)),
        deleted_at: None,
    };

    let err = login_usecase(&store, Arc::new(test_codec()))
        .execute(login_input("a@x.com", "wrong"))
        .await
        .unwrap_err();
    assert!(matches!(err, BoardServiceError::BadCredentials));
    assert_eq!(store.account(id).await.lifecycle.status, AccountStatus::Suspended);
}

// ── Me ───────────────────────────────────────────────────────────────────────

#[tokio::test]
async fn should_rename_activity_id_under_signup_rules() {
    let store = MemoryStore::new();
    signed_up(&store, "a@x.com", "alpha").await;
    signed_up(&store, "b@x.com", "beta").await;
    let rename = UpdateActivityIdUseCase {
        accounts: store.clone(),
    };

    let err = rename.execute("a@x.com", "BETA").await.unwrap_err();
    assert!(matches!(err, BoardServiceError::ActivityIdTaken));

    let err = rename.execute("a@x.com", " ").await.unwrap_err();
    assert!(matches!(err, BoardServiceError::InvalidActivityId(_)));

    let same = rename.execute("a@x.com", " ALPHA").await.unwrap();
    assert_eq!(same.activity_id, "alpha");

    let renamed = rename.execute("a@x.com", " Gamma ").await.unwrap();
    assert_eq!(renamed.activity_id, "gamma");

    let me = GetMeUseCase {
        accounts: store.clone(),
    };
    assert_eq!(me.execute("a@x.com").await.unwrap().activity_id, "gamma");
}

#[tokio::test]
async fn should_treat_deleted_caller_as_unauthenticated() {
    let store = MemoryStore::new();
    let id = signed_up(&store, "a@x.com", "foo").await;
    store.tables.lock().await.accounts.get_mut(&id).unwrap().lifecycle.status =
        AccountStatus::Deleted;

    let me = GetMeUseCase {
        accounts: store.clone(),
    };
    assert!(matches!(
        me.execute("a@x.com").await,
        Err(BoardServiceError::Unauthorized)
    ));
    assert!(matches!(
        me.execute("ghost@x.com").await,
        Err(BoardServiceError::Unauthorized)
    ));
}
