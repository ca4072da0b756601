//! Integration tests for the ledger API endpoints

mod test_utils;

#[cfg(test)]
mod tests {
    use axum::{
        Router,
        body::Body,
        http::{Request, StatusCode},
    };
    use serde_json::{Value, json};
    use serial_test::serial;
    use tower::util::ServiceExt;

    use crate::test_utils::{body_to_string, test_app};

    async fn post_json(app: &Router, uri: &str, body: Value) -> (StatusCode, String) {
        let response = app
            .clone()
            .oneshot(
                Request::builder()
                    .uri(uri)
                    .method("POST")
                    .header("content-type", "application/json")
                    .body(Body::from(body.to_string()))
                    .unwrap(),
            )
            .await
            .unwrap();
        let status = response.status();
        (status, body_to_string(response.into_body()).await)
    }

    async fn get(app: &Router, uri: &str) -> (StatusCode, String) {
        let response = app
            .clone()
            .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
            .await
            .unwrap();
        let status = response.status();
        (status, body_to_string(response.into_body()).await)
    }

    fn billed(cost: f64, baseline: f64, cached: bool, tokens_in: u64) -> Value {
        json!({
            "model": "google/gemini-2.5-flash-lite",
            "cost_g": cost,
            "baseline_g": baseline,
            "saved_g": baseline - cost,
            "cached": cached,
            "cache_hit_tokens": if cached { tokens_in } else { 0 },
            "compressed": false,
            "compression_ratio": 1.0,
            "tokens_in": tokens_in,
            "tokens_out": 120,
            "latency_ms": 900,
            "region": "us-west1",
            "cfe_percent": 92.0
        })
    }

    /// Two chats: one with a cached and an uncached reply, one with a
    /// single reply
    async fn seed_two_chats(app: &Router) {
        for (chat_id, prompt, carbon) in [
            ("chat-a", "what is pue", billed(0.2, 0.8, true, 40)),
            ("chat-a", "and wue", billed(0.1, 0.5, false, 0)),
            ("chat-b", "route me somewhere clean", billed(0.3, 0.6, false, 0)),
        ] {
            let (status, _) = post_json(
                app,
                "/api/ledger/messages",
                json!({"chat_id": chat_id, "role": "user", "content": prompt}),
            )
            .await;
            assert_eq!(status, StatusCode::CREATED);
            let (status, _) = post_json(
                app,
                "/api/ledger/messages",
                json!({"chat_id": chat_id, "role": "assistant", "content": "answer", "carbon": carbon}),
            )
            .await;
            assert_eq!(status, StatusCode::CREATED);
        }
    }

    #[tokio::test]
    #[serial]
    async fn it_returns_zeroed_stats_for_an_empty_ledger() {
        let app = test_app().await;

        let (status, body) = get(&app, "/api/ledger/stats").await;
        assert_eq!(status, StatusCode::OK);

        let resp: Value = serde_json::from_str(&body).unwrap();
        assert_eq!(
            resp["stats"],
            json!({
                "totalChats": 0,
                "totalPrompts": 0,
                "totalCarbonSaved_g": 0.0,
                "avgReduction": 0.0,
                "totalCacheHitTokens": 0,
                "avgCompressionRatio": 0.0
            })
        );
        assert_eq!(resp["ticker"].as_array().unwrap().len(), 4);
    }

    #[tokio::test]
    #[serial]
    async fn it_aggregates_appended_messages() {
        let app = test_app().await;
        seed_two_chats(&app).await;

        let (_, body) = get(&app, "/api/ledger/stats").await;
        let resp: Value = serde_json::from_str(&body).unwrap();
        let stats = &resp["stats"];
        assert_eq!(stats["totalChats"], 2);
        assert_eq!(stats["totalPrompts"], 3);
        assert_eq!(stats["totalCacheHitTokens"], 40);
        let saved = stats["totalCarbonSaved_g"].as_f64().unwrap();
        assert!((saved - 1.3).abs() < 1e-9);

        let (_, body) = get(&app, "/api/ledger/stats?chat_id=chat-b").await;
        let resp: Value = serde_json::from_str(&body).unwrap();
        assert_eq!(resp["stats"]["totalChats"], 1);
        assert_eq!(resp["stats"]["totalPrompts"], 1);
        let reduction = resp["stats"]["avgReduction"].as_f64().unwrap();
        assert!((reduction - 50.0).abs() < 1e-9);
    }

    #[tokio::test]
    #[serial]
    async fn it_lists_messages_in_append_order() {
        let app = test_app().await;
        seed_two_chats(&app).await;

        let (status, body) = get(&app, "/api/ledger/messages?chat_id=chat-a").await;
        assert_eq!(status, StatusCode::OK);
        let messages: Vec<Value> = serde_json::from_str(&body).unwrap();
        let contents: Vec<&str> = messages
            .iter()
            .map(|m| m["content"].as_str().unwrap())
            .collect();
        assert_eq!(contents, vec!["what is pue", "answer", "and wue", "answer"]);
        assert_eq!(messages[0]["role"], "user");
    }

    #[tokio::test]
    #[serial]
    async fn it_rejects_unbalanced_carbon_records() {
        let app = test_app().await;

        let mut carbon = billed(0.2, 0.8, false, 0);
        carbon["saved_g"] = json!(0.9);
        let (status, body) = post_json(
            &app,
            "/api/ledger/messages",
            json!({"chat_id": "chat-a", "role": "assistant", "content": "x", "carbon": carbon}),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(body.contains("saved_g"));

        let (_, body) = get(&app, "/api/ledger/messages").await;
        assert_eq!(body, "[]");
    }

    #[tokio::test]
    #[serial]
    async fn it_rejects_malformed_messages() {
        let app = test_app().await;

        let (status, _) = post_json(
            &app,
            "/api/ledger/messages",
            json!({"chat_id": "chat-a", "role": "system", "content": "x"}),
        )
        .await;
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    }

    #[tokio::test]
    #[serial]
    async fn it_builds_the_cache_timeline() {
        let app = test_app().await;
        seed_two_chats(&app).await;

        let (status, body) = get(&app, "/api/ledger/timeline/chat-a").await;
        assert_eq!(status, StatusCode::OK);
        let timeline: Value = serde_json::from_str(&body).unwrap();
        assert_eq!(
            timeline,
            json!({
                "entries": [
                    {"index": 1, "cached": true, "tokens": 40},
                    {"index": 2, "cached": false, "tokens": 0}
                ],
                "hit_count": 1,
                "hit_rate": 50
            })
        );
    }

    #[tokio::test]
    #[serial]
    async fn it_creates_fetches_and_deletes_chats() {
        let app = test_app().await;

        let (status, body) =
            post_json(&app, "/api/ledger/chats", json!({"id": "chat-z", "title": "Grid talk"})).await;
        assert_eq!(status, StatusCode::CREATED);
        let chat: Value = serde_json::from_str(&body).unwrap();
        assert_eq!(chat["title"], "Grid talk");
        assert_eq!(chat["prompt_count"], 0);

        let (status, body) = get(&app, "/api/ledger/chats/chat-z").await;
        assert_eq!(status, StatusCode::OK);
        let detail: Value = serde_json::from_str(&body).unwrap();
        assert_eq!(detail["chat"]["id"], "chat-z");
        assert_eq!(detail["messages"], json!([]));

        let response = app
            .clone()
            .oneshot(
                Request::builder()
                    .uri("/api/ledger/chats/chat-z")
                    .method("DELETE")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::NO_CONTENT);

        let (status, _) = get(&app, "/api/ledger/chats/chat-z").await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    #[serial]
    async fn it_clears_the_ledger() {
        let app = test_app().await;
        seed_two_chats(&app).await;

        let response = app
            .clone()
            .oneshot(
                Request::builder()
                    .uri("/api/ledger/messages")
                    .method("DELETE")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::NO_CONTENT);

        let (_, body) = get(&app, "/api/ledger/stats").await;
        let resp: Value = serde_json::from_str(&body).unwrap();
        assert_eq!(resp["stats"]["totalPrompts"], 0);
    }

    #[tokio::test]
    #[serial]
    async fn it_scores_the_ledger() {
        let app = test_app().await;
        seed_two_chats(&app).await;

        let (status, body) = get(&app, "/api/ledger/score?eco_mode_percent=50").await;
        assert_eq!(status, StatusCode::OK);
        let resp: Value = serde_json::from_str(&body).unwrap();
        // 1.3g is negligible against 500kg, 50% eco = 20, 3/1000*20 = 0.06
        assert_eq!(resp["score"], 20);
        assert_eq!(resp["badges"].as_array().unwrap().len(), 13);
    }
}
