//! Tests for auth module
//!
//! These tests verify the session model end to end:
//! - Token issuance records the token in the user's list
//! - Lookup by token, including forged and revoked tokens
//! - Sign-up, login, current user and logout over HTTP

#[cfg(test)]
mod tests {
    use super::super::*;
    use crate::auth::models::{Claims, CreateUserRequest, LoginRequest, User, AUTH_ACCESS};
    use crate::auth::services::{is_duplicate_email, UsersService};
    use crate::auth::sessions::SessionService;
    use crate::common::migrations::test_support::setup_test_db;
    use crate::common::{ApiError, Validator};
    use crate::test_app::{TestApp, TEST_SECRET};
    use axum::http::StatusCode;
    use jsonwebtoken::{encode, Algorithm, EncodingKey, Header};
    use serde_json::json;
    use sqlx::SqlitePool;

    fn sessions_for(pool: &SqlitePool) -> SessionService {
        SessionService::new(pool.clone(), TEST_SECRET.to_string(), None)
    }

    async fn create_user(pool: &SqlitePool, email: &str) -> User {
        UsersService::new(pool.clone())
            .create_user(CreateUserRequest {
                email: email.to_string(),
                password: "password123".to_string(),
            })
            .await
            .expect("Failed to create user")
    }

    // ============================================================================
    // Session Tests
    // ============================================================================

    #[tokio::test]
    async fn test_issue_then_find_returns_same_user() {
        let pool = setup_test_db().await;
        let sessions = sessions_for(&pool);
        let mut user = create_user(&pool, "a@b.com").await;

        let token = sessions.issue_token(&mut user).await.unwrap();

        assert_eq!(user.tokens.len(), 1);
        assert_eq!(user.tokens[0].access, AUTH_ACCESS);
        assert_eq!(user.tokens[0].token, token);

        let found = sessions
            .find_user_by_token(&token)
            .await
            .unwrap()
            .expect("issued token should resolve");
        assert_eq!(found.id, user.id);
        assert_eq!(found.email, "a@b.com");
        assert_eq!(found.tokens.len(), 1);
        assert_eq!(found.tokens[0].token, token);
    }

    #[tokio::test]
    async fn test_issued_token_is_persisted() {
        let pool = setup_test_db().await;
        let sessions = sessions_for(&pool);
        let mut user = create_user(&pool, "persist@example.com").await;

        let token = sessions.issue_token(&mut user).await.unwrap();

        let stored = UsersService::new(pool.clone())
            .find_by_id(&user.id)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(stored.tokens.len(), 1);
        assert_eq!(stored.tokens[0].access, "auth");
        assert_eq!(stored.tokens[0].token, token);
    }

    #[tokio::test]
    async fn test_unknown_token_is_not_found() {
        let pool = setup_test_db().await;
        let sessions = sessions_for(&pool);
        let user = create_user(&pool, "unknown@example.com").await;

        // Correctly signed, but never recorded in the token list
        let token = sessions.sign(&user.id, AUTH_ACCESS).unwrap();
        assert!(sessions.verify(&token).is_some());
        assert!(sessions.find_user_by_token(&token).await.unwrap().is_none());

        // Garbage
        assert!(sessions
            .find_user_by_token("not-a-token")
            .await
            .unwrap()
            .is_none());
    }

    #[tokio::test]
    async fn test_revoking_one_session_keeps_the_other() {
        let pool = setup_test_db().await;
        let sessions = sessions_for(&pool);
        let mut user = create_user(&pool, "two@example.com").await;

        let phone = sessions.issue_token(&mut user).await.unwrap();
        let laptop = sessions.issue_token(&mut user).await.unwrap();
        assert_ne!(phone, laptop);
        assert_eq!(user.tokens.len(), 2);

        sessions.remove_token(&user.id, &phone).await.unwrap();

        assert!(sessions.find_user_by_token(&phone).await.unwrap().is_none());
        let found = sessions.find_user_by_token(&laptop).await.unwrap().unwrap();
        assert_eq!(found.tokens.len(), 1);
        assert_eq!(found.tokens[0].token, laptop);
    }

    #[tokio::test]
    async fn test_removed_token_is_revoked() {
        let pool = setup_test_db().await;
        let sessions = sessions_for(&pool);
        let mut user = create_user(&pool, "revoke@example.com").await;

        let token = sessions.issue_token(&mut user).await.unwrap();
        assert!(sessions.remove_token(&user.id, &token).await.unwrap());

        // Signature still verifies, lookup no longer does
        assert!(sessions.verify(&token).is_some());
        assert!(sessions.find_user_by_token(&token).await.unwrap().is_none());

        // Nothing left to remove
        assert!(!sessions.remove_token(&user.id, &token).await.unwrap());
    }

    #[tokio::test]
    async fn test_token_signed_with_other_secret_is_rejected() {
        let pool = setup_test_db().await;
        let sessions = sessions_for(&pool);
        let mut user = create_user(&pool, "forged@example.com").await;
        let token = sessions.issue_token(&mut user).await.unwrap();

        let other = SessionService::new(pool.clone(), "wrong_secret_key".to_string(), None);
        assert!(other.verify(&token).is_none());
        assert!(other.find_user_by_token(&token).await.unwrap().is_none());

        // Same claims, signed by the wrong key
        let forged = other.sign(&user.id, AUTH_ACCESS).unwrap();
        assert!(sessions.verify(&forged).is_none());
    }

    #[tokio::test]
    async fn test_other_access_tag_is_rejected() {
        let pool = setup_test_db().await;
        let sessions = sessions_for(&pool);
        let user = create_user(&pool, "access@example.com").await;

        let token = sessions.sign(&user.id, "reset").unwrap();
        sqlx::query("INSERT INTO user_tokens (user_id, access, token) VALUES (?, 'reset', ?)")
            .bind(&user.id)
            .bind(&token)
            .execute(&pool)
            .await
            .unwrap();

        assert!(sessions.find_user_by_token(&token).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_expired_token_is_rejected() {
        let pool = setup_test_db().await;
        let sessions = sessions_for(&pool);

        let claims = Claims {
            sub: "U_000000".to_string(),
            access: AUTH_ACCESS.to_string(),
            jti: "0123456789AB".to_string(),
            iat: 1_000_000,
            exp: Some(1_000_100),
        };
        let token = encode(
            &Header::new(Algorithm::HS256),
            &claims,
            &EncodingKey::from_secret(TEST_SECRET.as_bytes()),
        )
        .unwrap();

        assert!(sessions.verify(&token).is_none());
    }

    #[tokio::test]
    async fn test_ttl_adds_expiry_claim() {
        let pool = setup_test_db().await;
        let sessions = SessionService::new(pool, TEST_SECRET.to_string(), Some(24));

        let claims = sessions
            .verify(&sessions.sign("U_000000", AUTH_ACCESS).unwrap())
            .unwrap();
        let exp = claims.exp.expect("ttl should set exp");
        assert_eq!(exp - claims.iat, 24 * 3600);

        let no_ttl = sessions_for(&setup_test_db().await);
        let claims = no_ttl
            .verify(&no_ttl.sign("U_000000", AUTH_ACCESS).unwrap())
            .unwrap();
        assert_eq!(claims.exp, None);
    }

    #[tokio::test]
    async fn test_store_failure_is_an_error_not_a_rejection() {
        let pool = setup_test_db().await;
        let sessions = sessions_for(&pool);
        let mut user = create_user(&pool, "closed@example.com").await;
        let token = sessions.issue_token(&mut user).await.unwrap();

        pool.close().await;

        let result = sessions.find_user_by_token(&token).await;
        assert!(matches!(result, Err(ApiError::DatabaseError(_))));
    }

    // ============================================================================
    // User Service Tests
    // ============================================================================

    #[tokio::test]
    async fn test_create_user_hashes_password_and_normalizes_email() {
        let pool = setup_test_db().await;
        let user = UsersService::new(pool)
            .create_user(CreateUserRequest {
                email: "  Mixed@Example.COM ".to_string(),
                password: "password123".to_string(),
            })
            .await
            .unwrap();

        assert!(user.id.starts_with("U_"));
        assert_eq!(user.email, "mixed@example.com");
        assert_ne!(user.password, "password123");
        assert!(user.tokens.is_empty());
    }

    #[tokio::test]
    async fn test_duplicate_email_is_rejected() {
        let pool = setup_test_db().await;
        create_user(&pool, "dup@example.com").await;

        let result = UsersService::new(pool)
            .create_user(CreateUserRequest {
                email: "DUP@example.com".to_string(),
                password: "password123".to_string(),
            })
            .await;

        match result {
            Err(ApiError::ValidationError(errors)) => assert_eq!(errors[0].field, "email"),
            other => panic!("expected validation error, got {:?}", other.map(|u| u.id)),
        }
    }

    #[tokio::test]
    async fn test_only_email_collisions_count_as_duplicate_email() {
        let pool = setup_test_db().await;
        let insert = "INSERT INTO users (id, email, password) VALUES (?, ?, 'hash')";

        sqlx::query(insert)
            .bind("U_AAAAAA")
            .bind("first@example.com")
            .execute(&pool)
            .await
            .unwrap();

        let id_clash = sqlx::query(insert)
            .bind("U_AAAAAA")
            .bind("second@example.com")
            .execute(&pool)
            .await
            .unwrap_err();
        assert!(!is_duplicate_email(&id_clash));

        let email_clash = sqlx::query(insert)
            .bind("U_BBBBBB")
            .bind("first@example.com")
            .execute(&pool)
            .await
            .unwrap_err();
        assert!(is_duplicate_email(&email_clash));

        assert!(!is_duplicate_email(&sqlx::Error::RowNotFound));
    }

    #[tokio::test]
    async fn test_concurrent_signups_and_logins_complete() {
        let pool = setup_test_db().await;
        let service = UsersService::new(pool);
        let signup = |email: &str| CreateUserRequest {
            email: email.to_string(),
            password: "password123".to_string(),
        };

        let (first, second) = tokio::join!(
            service.create_user(signup("one@example.com")),
            service.create_user(signup("two@example.com")),
        );
        let (first, second) = (first.unwrap(), second.unwrap());
        assert_ne!(first.id, second.id);

        let login = |email: &str| LoginRequest {
            email: email.to_string(),
            password: "password123".to_string(),
        };
        let (login_one, login_two) = (login("one@example.com"), login("two@example.com"));
        let (one, two) = tokio::join!(
            service.find_by_credentials(&login_one),
            service.find_by_credentials(&login_two),
        );
        assert_eq!(one.unwrap().id, first.id);
        assert_eq!(two.unwrap().id, second.id);
    }

    #[tokio::test]
    async fn test_find_by_credentials() {
        let pool = setup_test_db().await;
        let created = create_user(&pool, "login@example.com").await;
        let service = UsersService::new(pool);

        let user = service
            .find_by_credentials(&LoginRequest {
                email: "login@example.com".to_string(),
                password: "password123".to_string(),
            })
            .await
            .unwrap();
        assert_eq!(user.id, created.id);

        let wrong = service
            .find_by_credentials(&LoginRequest {
                email: "login@example.com".to_string(),
                password: "password124".to_string(),
            })
            .await;
        assert!(matches!(wrong, Err(ApiError::BadRequest(_))));

        let missing = service
            .find_by_credentials(&LoginRequest {
                email: "nobody@example.com".to_string(),
                password: "password123".to_string(),
            })
            .await;
        assert!(matches!(missing, Err(ApiError::BadRequest(_))));
    }

    // ============================================================================
    // Validator Tests
    // ============================================================================

    #[test]
    fn test_user_validator() {
        let validator = validators::UserValidator;

        let valid = CreateUserRequest {
            email: "a@b.com".to_string(),
            password: "12345678".to_string(),
        };
        assert!(validator.validate(&valid).is_valid);

        let short = CreateUserRequest {
            email: "a@b.com".to_string(),
            password: "1234567".to_string(),
        };
        let result = validator.validate(&short);
        assert!(!result.is_valid);
        assert!(result.errors.iter().any(|e| e.field == "password"));

        let bad_email = CreateUserRequest {
            email: "not-an-email".to_string(),
            password: "12345678".to_string(),
        };
        let result = validator.validate(&bad_email);
        assert!(result.errors.iter().any(|e| e.field == "email"));

        let empty = CreateUserRequest {
            email: "   ".to_string(),
            password: String::new(),
        };
        assert_eq!(validator.validate(&empty).errors.len(), 2);
    }

    #[test]
    fn test_email_format() {
        assert!(validators::is_valid_email("a@b.com"));
        assert!(validators::is_valid_email("first.last+tag@sub.example.org"));
        assert!(!validators::is_valid_email("a@b"));
        assert!(!validators::is_valid_email("a b@c.com"));
        assert!(!validators::is_valid_email("@example.com"));
    }

    #[test]
    fn test_token_from_headers() {
        use axum::http::{header::AUTHORIZATION, HeaderMap, HeaderValue};

        let mut headers = HeaderMap::new();
        assert_eq!(extractors::token_from_headers(&headers), None);

        headers.insert(AUTHORIZATION, HeaderValue::from_static("Bearer abc.def"));
        assert_eq!(
            extractors::token_from_headers(&headers),
            Some("abc.def".to_string())
        );

        headers.insert("x-auth", HeaderValue::from_static("xyz.uvw"));
        assert_eq!(
            extractors::token_from_headers(&headers),
            Some("xyz.uvw".to_string())
        );
    }

    // ============================================================================
    // HTTP Tests
    // ============================================================================

    #[tokio::test]
    async fn test_signup_returns_token_header() {
        let app = TestApp::new().await;

        let res = app
            .request(
                "POST",
                "/users",
                Some(json!({ "email": "a@b.com", "password": "password123" })),
                None,
            )
            .await;

        assert_eq!(res.status, StatusCode::OK);
        assert_eq!(res.body["email"], "a@b.com");
        assert!(res.body.get("password").is_none());

        let token = res.headers.get("x-auth").unwrap().to_str().unwrap();
        let user = app
            .state
            .sessions()
            .find_user_by_token(token)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(user.id, res.body["id"]);
        assert_eq!(user.tokens.len(), 1);
    }

    #[tokio::test]
    async fn test_signup_invalid_body() {
        let app = TestApp::new().await;

        let res = app
            .request(
                "POST",
                "/users",
                Some(json!({ "email": "nope", "password": "short" })),
                None,
            )
            .await;

        assert_eq!(res.status, StatusCode::BAD_REQUEST);
        assert_eq!(res.body["code"], "VALIDATION_ERROR");
        assert_eq!(res.body["fields"].as_array().unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_signup_and_login_with_mistyped_fields_are_bad_request() {
        let app = TestApp::new().await;

        for path in ["/users", "/users/login"] {
            let res = app
                .request(
                    "POST",
                    path,
                    Some(json!({ "email": ["a@b.com"], "password": 12345678 })),
                    None,
                )
                .await;

            assert_eq!(res.status, StatusCode::BAD_REQUEST);
            assert_eq!(res.body["code"], "BAD_REQUEST");
            assert!(res.headers.get("x-auth").is_none());
        }
    }

    #[tokio::test]
    async fn test_login_me_and_logout() {
        let app = TestApp::new().await;
        let credentials = json!({ "email": "flow@example.com", "password": "password123" });

        let signup = app
            .request("POST", "/users", Some(credentials.clone()), None)
            .await;
        assert_eq!(signup.status, StatusCode::OK);

        let login = app
            .request("POST", "/users/login", Some(credentials), None)
            .await;
        assert_eq!(login.status, StatusCode::OK);
        let token = login
            .headers
            .get("x-auth")
            .unwrap()
            .to_str()
            .unwrap()
            .to_string();

        let me = app.request("GET", "/users/me", None, Some(&token)).await;
        assert_eq!(me.status, StatusCode::OK);
        assert_eq!(me.body["id"], signup.body["id"]);

        let logout = app
            .request("DELETE", "/users/me/token", None, Some(&token))
            .await;
        assert_eq!(logout.status, StatusCode::OK);

        let me = app.request("GET", "/users/me", None, Some(&token)).await;
        assert_eq!(me.status, StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn test_login_with_wrong_password() {
        let app = TestApp::new().await;
        app.request(
            "POST",
            "/users",
            Some(json!({ "email": "wp@example.com", "password": "password123" })),
            None,
        )
        .await;

        let res = app
            .request(
                "POST",
                "/users/login",
                Some(json!({ "email": "wp@example.com", "password": "password999" })),
                None,
            )
            .await;

        assert_eq!(res.status, StatusCode::BAD_REQUEST);
        assert!(res.headers.get("x-auth").is_none());
    }

    #[tokio::test]
    async fn test_me_requires_token() {
        let app = TestApp::new().await;

        let res = app.request("GET", "/users/me", None, None).await;
        assert_eq!(res.status, StatusCode::UNAUTHORIZED);

        let res = app
            .request("GET", "/users/me", None, Some("forged.token.value"))
            .await;
        assert_eq!(res.status, StatusCode::UNAUTHORIZED);
    }
}
