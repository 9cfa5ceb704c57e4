#[cfg(test)]
mod test {
    use std::time::Duration;

    use httpmock::Method::POST;
    use httpmock::MockServer;
    use serde_json::json;

    use crate::errors::{DecodeError, RenewalError};
    use crate::query::types::Variables;
    use crate::tests::common::{established_session, expired_claims, fresh_claims, jwt, quoted};
    use crate::token::codec::decode;
    use crate::utils::constants::{GRAPHQL_ROUTE, REFRESH_ROUTE};

    #[tokio::test]
    async fn renewal_posts_current_claims_and_installs_new_token() {
        let server = MockServer::start_async().await;
        let old_claims = expired_claims("4242");
        let new_raw = jwt(&fresh_claims("4242", 3600));
        let session = established_session(&server, &jwt(&old_claims)).await;

        let refresh = server
            .mock_async(|when, then| {
                when.method(POST)
                    .path(REFRESH_ROUTE)
                    .json_body(json!({"x-jwt-token": old_claims}));
                then.status(200).body(quoted(&new_raw));
            })
            .await;

        session.renew().await.unwrap();

        refresh.assert_async().await;
        let (raw, token) = session.snapshot().await;
        assert_eq!(raw, new_raw);
        assert_eq!(token, decode(new_raw.as_bytes()).unwrap());
    }

    #[tokio::test]
    async fn failed_renewal_keeps_current_token() {
        let server = MockServer::start_async().await;
        let old_raw = jwt(&expired_claims("4242"));
        let session = established_session(&server, &old_raw).await;
        let before = session.snapshot().await;

        let mut refresh = server
            .mock_async(|when, then| {
                when.method(POST).path(REFRESH_ROUTE);
                then.status(500);
            })
            .await;
        let err = session.renew().await.unwrap_err();
        assert!(matches!(err, RenewalError::BadResponse(_)), "{err}");
        assert_eq!(session.snapshot().await, before);
        refresh.delete_async().await;

        refresh = server
            .mock_async(|when, then| {
                when.method(POST).path(REFRESH_ROUTE);
                then.status(200).body("\"a.b\"");
            })
            .await;
        let err = session.renew().await.unwrap_err();
        assert!(matches!(
            err,
            RenewalError::InvalidToken(DecodeError::MalformedStructure { segments: 2 })
        ));
        assert_eq!(session.snapshot().await, before);
        refresh.delete_async().await;

        server
            .mock_async(|when, then| {
                when.method(POST).path(REFRESH_ROUTE);
                then.status(200).json_body(json!({"token": old_raw}));
            })
            .await;
        let err = session.renew().await.unwrap_err();
        assert!(matches!(err, RenewalError::BadResponse(_)));
        assert_eq!(session.snapshot().await, before);
    }

    #[tokio::test]
    async fn already_expired_reissue_is_rejected() {
        let server = MockServer::start_async().await;
        let old_raw = jwt(&expired_claims("4242"));
        let session = established_session(&server, &old_raw).await;
        let before = session.snapshot().await;
        let mut refresh = server
            .mock_async(|when, then| {
                when.method(POST).path(REFRESH_ROUTE);
                then.status(200).body(quoted(&jwt(&expired_claims("4242-reissued"))));
            })
            .await;

        let err = session.renew().await.unwrap_err();
        assert!(matches!(err, RenewalError::InvalidToken(DecodeError::InvalidClaims(_))), "{err}");
        assert_eq!(session.snapshot().await, before);
        refresh.delete_async().await;

        // valid for an hour, so only a margin shorter than that accepts it
        let new_raw = jwt(&fresh_claims("4242", 3600));
        server
            .mock_async(|when, then| {
                when.method(POST).path(REFRESH_ROUTE);
                then.status(200).body(quoted(&new_raw));
            })
            .await;

        let err = session.renew_ahead(7200).await.unwrap_err();
        assert!(matches!(err, RenewalError::InvalidToken(_)));
        assert_eq!(session.snapshot().await, before);

        session.renew_ahead(60).await.unwrap();
        assert_eq!(session.snapshot().await.0, new_raw);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn concurrent_readers_never_see_a_mixed_token() {
        let server = MockServer::start_async().await;
        let old_raw = jwt(&expired_claims("old-subject"));
        let new_raw = jwt(&fresh_claims("new-subject", 3600));
        let session = established_session(&server, &old_raw).await;

        server
            .mock_async(|when, then| {
                when.method(POST).path(REFRESH_ROUTE);
                then.status(200)
                    .delay(Duration::from_millis(200))
                    .body(quoted(&new_raw));
            })
            .await;
        for (raw, who) in [(&old_raw, "old"), (&new_raw, "new")] {
            server
                .mock_async(|when, then| {
                    when.method(POST)
                        .path(GRAPHQL_ROUTE)
                        .header("Authorization", format!("Bearer {}", raw));
                    then.status(200).json_body(json!({"data": {"who": who}}));
                })
                .await;
        }

        let renewal = tokio::spawn({
            let session = session.clone();
            async move { session.renew().await }
        });

        let mut readers = Vec::new();
        for i in 0..16 {
            let session = session.clone();
            readers.push(tokio::spawn(async move {
                tokio::time::sleep(Duration::from_millis(i * 20)).await;
                let (raw, token) = session.snapshot().await;
                assert_eq!(decode(raw.as_bytes()).unwrap(), token);

                let result = session.execute("query { who }", Variables::new()).await;
                assert!(!result.has_errors(), "{:?}", result.errors());
            }));
        }

        renewal.await.unwrap().unwrap();
        for reader in readers {
            reader.await.unwrap();
        }

        let (raw, token) = session.snapshot().await;
        assert_eq!(raw, new_raw);
        assert_eq!(token.subject(), "new-subject");
    }
}
